//! 冷床定尺選擇（SH2）

use crate::OptimizationResult;
use pcp_calc::{BilletYield, YieldLossCalculator};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 單一候選定尺的評估
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedOption {
    pub target_length_m: Decimal,
    pub bars: u32,
    pub remainder_m: Decimal,
    /// 以此定尺切割時的預估收得率（%）
    pub projected_yield_pct: Decimal,
}

/// 選擇結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedSelection {
    pub chosen: BedOption,
    /// 所有候選（依輸入順序）
    pub options: Vec<BedOption>,
    /// 是否符合收得率與剩料門檻
    pub meets_target: bool,
}

/// 冷床定尺選擇器
pub struct CoolingBedSelector {
    /// 收得率門檻（%）
    pub min_yield_pct: Decimal,
    /// 剩料上限（m）
    pub max_remainder_m: Decimal,
}

impl Default for CoolingBedSelector {
    fn default() -> Self {
        Self {
            min_yield_pct: Decimal::new(964, 1),
            max_remainder_m: Decimal::new(50, 2),
        }
    }
}

impl CoolingBedSelector {
    pub fn new(min_yield_pct: Decimal, max_remainder_m: Decimal) -> Self {
        Self {
            min_yield_pct,
            max_remainder_m,
        }
    }

    /// 評估候選定尺
    ///
    /// 以目前的收得率明細為基準，把冷床剩料換成候選定尺的剩料重算收得率。
    pub fn evaluate(
        current: &BilletYield,
        product_linear_mass: Decimal,
        target_length_m: Decimal,
    ) -> BedOption {
        let cut = YieldLossCalculator::cut_to_length(current.total_bar_length, target_length_m);
        let projected_sh2_kg = cut.remainder_m * product_linear_mass;
        let adjusted_loss = current.total_loss_kg - current.sh2_loss_kg + projected_sh2_kg;

        let projected_yield_pct = if current.raw_billet_weight > Decimal::ZERO {
            (current.raw_billet_weight - adjusted_loss) / current.raw_billet_weight
                * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        BedOption {
            target_length_m,
            bars: cut.pieces,
            remainder_m: cut.remainder_m,
            projected_yield_pct,
        }
    }

    /// 選擇定尺
    ///
    /// 先找符合門檻中最長的定尺；都不符合時取預估收得率最高者。
    pub fn select(
        &self,
        current: &BilletYield,
        product_linear_mass: Decimal,
        candidates: &[Decimal],
    ) -> OptimizationResult<BedSelection> {
        let options: Vec<BedOption> = candidates
            .iter()
            .filter(|len| **len > Decimal::ZERO)
            .map(|len| Self::evaluate(current, product_linear_mass, *len))
            .collect();

        let qualifying = options
            .iter()
            .filter(|o| {
                o.projected_yield_pct >= self.min_yield_pct && o.remainder_m <= self.max_remainder_m
            })
            .max_by_key(|o| o.target_length_m);

        let (chosen, meets_target) = match qualifying {
            Some(option) => (*option, true),
            None => match options.iter().max_by_key(|o| o.projected_yield_pct) {
                Some(option) => (*option, false),
                None => return OptimizationResult::infeasible("沒有有效的候選定尺".to_string()),
            },
        };

        tracing::debug!(
            "冷床定尺 {} m，預估收得率 {}%",
            chosen.target_length_m,
            chosen.projected_yield_pct.round_dp(2)
        );

        let result = OptimizationResult::feasible(BedSelection {
            chosen,
            options,
            meets_target,
        });

        if meets_target {
            result
        } else {
            result.with_message(format!(
                "沒有定尺同時達到收得率 {}% 與剩料 {} m",
                self.min_yield_pct, self.max_remainder_m
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcp_calc::BilletInputs;
    use pcp_core::{CutMode, ShearLossModel};

    fn current() -> BilletYield {
        // 總軋製長度 154.645 m
        YieldLossCalculator::billet_yield(&BilletInputs {
            product_linear_mass: Decimal::from(10),
            billet_area_mm2: Decimal::from(20_000),
            billet_length_m: Decimal::from(10),
            fire_loss_pct: Decimal::ONE,
            head_crop_mm: Decimal::from(50),
            customer_length_m: Decimal::from(12),
            shear: ShearLossModel::new(CutMode::Navalha, 1),
        })
    }

    fn lengths(values: &[&str]) -> Vec<Decimal> {
        values.iter().map(|v| v.parse().unwrap()).collect()
    }

    #[test]
    fn test_evaluate_option() {
        let base = current();
        assert_eq!(base.total_bar_length, "154.645".parse::<Decimal>().unwrap());

        let option = CoolingBedSelector::evaluate(&base, Decimal::from(10), Decimal::new(773, 2));
        assert_eq!(option.bars, 20);
        assert_eq!(option.remainder_m, Decimal::new(45, 3));
    }

    #[test]
    fn test_longest_qualifying_length_wins() {
        let selector = CoolingBedSelector::default();
        let candidates = lengths(&["12", "7.73", "6.4", "5.15"]);

        let result = selector.select(&current(), Decimal::from(10), &candidates);

        let selection = result.solution.unwrap();
        assert!(selection.meets_target);
        assert_eq!(selection.chosen.target_length_m, Decimal::new(773, 2));
        assert_eq!(selection.options.len(), 4);
    }

    #[test]
    fn test_fallback_to_best_yield() {
        let selector = CoolingBedSelector::default();
        let candidates = lengths(&["12", "6.4"]);

        let result = selector.select(&current(), Decimal::from(10), &candidates);

        assert!(result.feasible);
        assert_eq!(result.messages.len(), 1);
        let selection = result.solution.unwrap();
        assert!(!selection.meets_target);
        assert_eq!(selection.chosen.target_length_m, Decimal::new(64, 1));
    }

    #[test]
    fn test_no_candidates() {
        let selector = CoolingBedSelector::default();
        let result = selector.select(&current(), Decimal::from(10), &lengths(&["0"]));
        assert!(!result.feasible);
    }
}
