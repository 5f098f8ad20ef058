//! 鋼坯長度優化

use crate::OptimizationResult;
use pcp_calc::yield_loss::STEEL_DENSITY_KG_PER_MM2_M;
use pcp_calc::{BilletInputs, BilletYield, YieldLossCalculator};
use pcp_core::CutMode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 加熱爐可接受的鋼坯長度預設上限（m）
const DEFAULT_MAX_BILLET_LENGTH: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// 最佳鋼坯方案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilletPlan {
    /// 一支鋼坯可出的定尺支數
    pub bars: u32,
    /// 建議鋼坯長度（m，取到公分）
    pub billet_length_m: Decimal,
    /// 長度上限（m）
    pub max_billet_length_m: Decimal,
    /// 建議長度下的收得率明細
    pub projected: BilletYield,
}

/// 鋼坯長度優化器
pub struct BilletLengthOptimizer;

impl BilletLengthOptimizer {
    /// 在長度上限內找出可出最多定尺的鋼坯長度
    ///
    /// 上限為目前鋼坯長度的 105%，未設定時為 12 m。
    /// 飛剪的精整損耗固定為刀數 × 0.25 m，鋸切為每支 0.5 m。
    pub fn optimize(inputs: &BilletInputs) -> OptimizationResult<BilletPlan> {
        let billet_linear_mass = inputs.billet_area_mm2 * STEEL_DENSITY_KG_PER_MM2_M;
        if billet_linear_mass <= Decimal::ZERO {
            return OptimizationResult::infeasible("鋼坯斷面積必須大於 0".to_string());
        }
        if inputs.customer_length_m <= Decimal::ZERO || inputs.product_linear_mass <= Decimal::ZERO {
            return OptimizationResult::infeasible("缺少成品單重或客戶定尺".to_string());
        }
        if inputs.fire_loss_pct >= Decimal::ONE_HUNDRED {
            return OptimizationResult::infeasible(format!("燒損 {}% 無效", inputs.fire_loss_pct));
        }

        let max_billet_length_m = if inputs.billet_length_m > Decimal::ZERO {
            inputs.billet_length_m * Decimal::new(105, 2)
        } else {
            DEFAULT_MAX_BILLET_LENGTH
        };

        let head_crop_kg = inputs.head_crop_mm / Decimal::ONE_THOUSAND * billet_linear_mass;
        let net_factor = Decimal::ONE - inputs.fire_loss_pct / Decimal::ONE_HUNDRED;

        let required_length = |n: u32| {
            let n = Decimal::from(n);
            let finishing_m = match inputs.shear.mode {
                CutMode::Navalha => inputs.shear.total_loss_meters(),
                CutMode::Serra => n * CutMode::Serra.loss_per_cut_meters(),
            };
            let product_weight = (n * inputs.customer_length_m + finishing_m) * inputs.product_linear_mass;
            (product_weight + head_crop_kg) / net_factor / billet_linear_mass
        };

        // 所需長度隨支數嚴格遞增，超過上限即停止
        let mut best: Option<(u32, Decimal)> = None;
        let mut n = 1u32;
        loop {
            let length = required_length(n);
            if length > max_billet_length_m {
                break;
            }
            best = Some((n, length));
            n += 1;
        }

        let Some((bars, length)) = best else {
            return OptimizationResult::infeasible(format!(
                "長度上限 {} m 內放不下任何一支 {} m 定尺",
                max_billet_length_m, inputs.customer_length_m
            ));
        };

        let billet_length_m = (length * Decimal::ONE_HUNDRED).floor() / Decimal::ONE_HUNDRED;
        let projected = YieldLossCalculator::billet_yield(&BilletInputs {
            billet_length_m,
            ..*inputs
        });

        tracing::debug!("最佳鋼坯：{} 支 × {} m，長度 {} m", bars, inputs.customer_length_m, billet_length_m);

        let result = OptimizationResult::feasible(BilletPlan {
            bars,
            billet_length_m,
            max_billet_length_m,
            projected,
        });

        // 目前長度與建議差超過 5 公分時提示
        if inputs.billet_length_m > Decimal::ZERO
            && (inputs.billet_length_m - billet_length_m).abs() > Decimal::new(5, 2)
        {
            result.with_message(format!(
                "建議鋼坯長度 {} m（目前 {} m）",
                billet_length_m, inputs.billet_length_m
            ))
        } else {
            result
        }
    }
}
