//! 收得率與剪切損耗計算

use pcp_core::ShearLossModel;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 鋼的線密度係數（kg / (mm² · m)）
pub const STEEL_DENSITY_KG_PER_MM2_M: Decimal = Decimal::from_parts(785, 0, 0, false, 5);

/// 剪切損耗
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShearLoss {
    /// 總損耗長度（m）
    pub total_loss_meters: Decimal,
    /// 損耗重量（kg）
    pub loss_weight_kg: Decimal,
}

/// 定尺切割結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutToLength {
    /// 整支數
    pub pieces: u32,
    /// 剩餘長度（m）
    pub remainder_m: Decimal,
}

/// 鋼坯收得率輸入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilletInputs {
    /// 成品單重（kg/m）
    pub product_linear_mass: Decimal,
    /// 鋼坯斷面積（mm²）
    pub billet_area_mm2: Decimal,
    /// 鋼坯長度（m）
    pub billet_length_m: Decimal,
    /// 燒損（%）
    pub fire_loss_pct: Decimal,
    /// 頭端切除 SH1（mm）
    pub head_crop_mm: Decimal,
    /// 客戶定尺（m）
    pub customer_length_m: Decimal,
    /// 精整剪切
    pub shear: ShearLossModel,
}

/// 鋼坯收得率明細
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilletYield {
    pub billet_linear_mass: Decimal,
    pub raw_billet_weight: Decimal,
    pub fire_loss_kg: Decimal,
    pub head_crop_kg: Decimal,
    pub available_weight: Decimal,
    /// 理論軋製總長（m）
    pub total_bar_length: Decimal,
    /// 冷床 SH2 切出的整支數
    pub commercial_bars: u32,
    pub sh2_remainder_m: Decimal,
    pub sh2_loss_kg: Decimal,
    pub finishing_loss_m: Decimal,
    pub finishing_loss_kg: Decimal,
    pub final_product_weight: Decimal,
    pub total_loss_kg: Decimal,
    /// 軋機收得率（%，不含精整損耗）
    pub laminator_yield_pct: Decimal,
    /// 最終收得率（%）
    pub final_yield_pct: Decimal,
}

/// 收得率計算器
pub struct YieldLossCalculator;

impl YieldLossCalculator {
    /// 剪切損耗：長度由模式常數即時算出，重量 = 長度 × 成品單重
    pub fn shear_loss(model: &ShearLossModel, product_linear_mass: Decimal) -> ShearLoss {
        let total_loss_meters = model.total_loss_meters();
        ShearLoss {
            total_loss_meters,
            loss_weight_kg: total_loss_meters * product_linear_mass,
        }
    }

    /// 把總長切成定尺
    pub fn cut_to_length(total_length_m: Decimal, customer_length_m: Decimal) -> CutToLength {
        if customer_length_m <= Decimal::ZERO || total_length_m <= Decimal::ZERO {
            return CutToLength {
                pieces: 0,
                remainder_m: total_length_m.max(Decimal::ZERO),
            };
        }

        let pieces = (total_length_m / customer_length_m).floor();
        CutToLength {
            pieces: pieces.to_u32().unwrap_or(u32::MAX),
            remainder_m: total_length_m - pieces * customer_length_m,
        }
    }

    /// 鋼坯收得率明細
    ///
    /// 燒損 → 頭端切除 → 冷床定尺剩料 → 精整剪切，依序扣除。
    pub fn billet_yield(inputs: &BilletInputs) -> BilletYield {
        let billet_linear_mass = inputs.billet_area_mm2 * STEEL_DENSITY_KG_PER_MM2_M;
        let raw_billet_weight = inputs.billet_length_m * billet_linear_mass;

        let fire_loss_kg = raw_billet_weight * inputs.fire_loss_pct / Decimal::ONE_HUNDRED;
        let head_crop_kg = inputs.head_crop_mm / Decimal::ONE_THOUSAND * billet_linear_mass;
        let available_weight = raw_billet_weight - fire_loss_kg - head_crop_kg;

        let total_bar_length = if inputs.product_linear_mass > Decimal::ZERO {
            available_weight / inputs.product_linear_mass
        } else {
            Decimal::ZERO
        };

        let cut = Self::cut_to_length(total_bar_length, inputs.customer_length_m);
        let sh2_loss_kg = cut.remainder_m * inputs.product_linear_mass;

        let finishing = Self::shear_loss(&inputs.shear, inputs.product_linear_mass);

        let sold_weight =
            Decimal::from(cut.pieces) * inputs.customer_length_m * inputs.product_linear_mass;
        let final_product_weight = sold_weight - finishing.loss_weight_kg;
        let total_loss_kg = fire_loss_kg + head_crop_kg + sh2_loss_kg + finishing.loss_weight_kg;

        let pct_of_raw = |weight: Decimal| {
            if raw_billet_weight > Decimal::ZERO {
                weight / raw_billet_weight * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            }
        };

        BilletYield {
            billet_linear_mass,
            raw_billet_weight,
            fire_loss_kg,
            head_crop_kg,
            available_weight,
            total_bar_length,
            commercial_bars: cut.pieces,
            sh2_remainder_m: cut.remainder_m,
            sh2_loss_kg,
            finishing_loss_m: finishing.total_loss_meters,
            finishing_loss_kg: finishing.loss_weight_kg,
            final_product_weight,
            total_loss_kg,
            laminator_yield_pct: pct_of_raw(available_weight - sh2_loss_kg),
            final_yield_pct: pct_of_raw(final_product_weight),
        }
    }
}
