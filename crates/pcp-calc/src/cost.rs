//! 成本計算

use pcp_core::{ConsumptionTargets, UnitCostConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

const KG_PER_TON: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// 成本計算輸入（耗用與損耗量）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostInputs {
    /// 天然氣（m³）
    pub gas_consumption: Decimal,
    /// 電力（kWh）
    pub energy_consumption: Decimal,
    /// 金屬料耗用（t）
    pub metallic_charge_tons: Decimal,
    /// 損耗重量（kg）
    pub loss_weight_kg: Decimal,
}

/// 分項成本
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub gas_cost: Decimal,
    pub energy_cost: Decimal,
    pub metallic_charge_cost: Decimal,
    pub waste_cost: Decimal,
}

impl CostBreakdown {
    /// 全零成本
    pub fn zero() -> Self {
        Self::default()
    }

    /// 合計
    pub fn total(&self) -> Decimal {
        self.gas_cost + self.energy_cost + self.metallic_charge_cost + self.waste_cost
    }
}

impl Add for CostBreakdown {
    type Output = CostBreakdown;

    fn add(self, rhs: CostBreakdown) -> CostBreakdown {
        CostBreakdown {
            gas_cost: self.gas_cost + rhs.gas_cost,
            energy_cost: self.energy_cost + rhs.energy_cost,
            metallic_charge_cost: self.metallic_charge_cost + rhs.metallic_charge_cost,
            waste_cost: self.waste_cost + rhs.waste_cost,
        }
    }
}

impl AddAssign for CostBreakdown {
    fn add_assign(&mut self, rhs: CostBreakdown) {
        *self = *self + rhs;
    }
}

/// 彙總後的耗用量（估算超耗成本用）
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsumptionTotals {
    /// 產量（t）
    pub production: Decimal,
    /// 天然氣（m³）
    pub gas: Decimal,
    /// 有天然氣讀值的記錄產量（t）
    pub gas_production: Decimal,
    /// 電力（kWh）
    pub energy: Decimal,
    /// 有電力讀值的記錄產量（t）
    pub energy_production: Decimal,
    /// 平均收得率（%），0 表示無資料
    pub yield_pct: Decimal,
}

/// 成本計算器
pub struct CostEngine;

impl CostEngine {
    /// 依生效中單價計算分項成本
    pub fn compute(inputs: &CostInputs, config: &UnitCostConfig) -> CostBreakdown {
        CostBreakdown {
            gas_cost: inputs.gas_consumption * config.gas_price_per_unit,
            energy_cost: inputs.energy_consumption * config.energy_price_per_unit,
            metallic_charge_cost: inputs.metallic_charge_tons
                * config.metallic_charge_price_per_ton,
            waste_cost: inputs.loss_weight_kg / KG_PER_TON * config.metallic_charge_price_per_ton,
        }
    }

    /// 產出某產量所需的金屬料（t）= 產量 / 收得率
    ///
    /// 收得率為 0 時回傳 0。
    pub fn metallic_charge_tons(output_tons: Decimal, yield_pct: Decimal) -> Decimal {
        if yield_pct <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        output_tons * Decimal::ONE_HUNDRED / yield_pct
    }

    /// 收得率造成的金屬損耗（t）= 投料 − 產量，不為負
    pub fn yield_loss_tons(output_tons: Decimal, yield_pct: Decimal) -> Decimal {
        let charge = Self::metallic_charge_tons(output_tons, yield_pct);
        (charge - output_tons).max(Decimal::ZERO)
    }

    /// 估算超耗成本
    ///
    /// 天然氣與電力：實際耗用超過「有讀值記錄的產量 × 目標單耗」的部分。
    /// 收得率：設定目標且低於目標時，實際投料與理論投料之差以金屬料單價計價。
    pub fn estimated_extra_cost(
        totals: &ConsumptionTotals,
        targets: &ConsumptionTargets,
        config: &UnitCostConfig,
    ) -> Decimal {
        if totals.production <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let excess = |actual: Decimal, basis: Decimal, target_per_ton: Option<Decimal>| {
            target_per_ton
                .map(|t| (actual - basis * t).max(Decimal::ZERO))
                .unwrap_or(Decimal::ZERO)
        };

        let yield_loss_tons = match targets.yield_pct {
            Some(target) if totals.yield_pct > Decimal::ZERO && totals.yield_pct < target => {
                Self::metallic_charge_tons(totals.production, totals.yield_pct)
                    - Self::metallic_charge_tons(totals.production, target)
            }
            _ => Decimal::ZERO,
        };

        let inputs = CostInputs {
            gas_consumption: excess(totals.gas, totals.gas_production, targets.gas_per_ton),
            energy_consumption: excess(
                totals.energy,
                totals.energy_production,
                targets.energy_per_ton,
            ),
            metallic_charge_tons: Decimal::ZERO,
            loss_weight_kg: yield_loss_tons * KG_PER_TON,
        };

        Self::compute(&inputs, config).total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn prices() -> UnitCostConfig {
        UnitCostConfig::new(
            Decimal::new(300, 2),
            Decimal::new(60, 2),
            Decimal::from(2000),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        )
    }

    #[test]
    fn test_itemized_costs() {
        let inputs = CostInputs {
            gas_consumption: Decimal::from(1000),
            energy_consumption: Decimal::from(5000),
            metallic_charge_tons: Decimal::from(10),
            loss_weight_kg: Decimal::from(250),
        };

        let cost = CostEngine::compute(&inputs, &prices());

        assert_eq!(cost.gas_cost, Decimal::from(3000));
        assert_eq!(cost.energy_cost, Decimal::from(3000));
        assert_eq!(cost.metallic_charge_cost, Decimal::from(20_000));
        // 250 kg = 0.25 t × 2000
        assert_eq!(cost.waste_cost, Decimal::from(500));
        assert_eq!(cost.total(), Decimal::from(26_500));
    }

    #[test]
    fn test_zero_inputs() {
        let cost = CostEngine::compute(&CostInputs::default(), &prices());
        assert_eq!(cost, CostBreakdown::zero());
        assert_eq!(cost.total(), Decimal::ZERO);
    }

    #[test]
    fn test_metallic_charge_guard() {
        assert_eq!(
            CostEngine::metallic_charge_tons(Decimal::from(96), Decimal::from(96)),
            Decimal::from(100)
        );
        assert_eq!(
            CostEngine::metallic_charge_tons(Decimal::from(96), Decimal::ZERO),
            Decimal::ZERO
        );
        assert_eq!(
            CostEngine::yield_loss_tons(Decimal::from(96), Decimal::from(96)),
            Decimal::from(4)
        );
    }

    #[test]
    fn test_breakdown_addition() {
        let a = CostBreakdown {
            gas_cost: Decimal::ONE,
            energy_cost: Decimal::ONE,
            metallic_charge_cost: Decimal::ONE,
            waste_cost: Decimal::ONE,
        };
        let mut sum = a + a;
        sum += a;
        assert_eq!(sum.total(), Decimal::from(12));
    }

    #[test]
    fn test_extra_cost_against_targets() {
        let totals = ConsumptionTotals {
            production: Decimal::from(100),
            gas: Decimal::from(4500),
            gas_production: Decimal::from(100),
            energy: Decimal::from(7000),
            energy_production: Decimal::from(100),
            yield_pct: Decimal::from(96),
        };
        let targets = ConsumptionTargets::new()
            .with_gas_per_ton(Decimal::from(40))
            .with_energy_per_ton(Decimal::from(75))
            .with_yield_pct(Decimal::from(96));

        // 天然氣超耗 500 m³ × 3.00；電力未超耗；收得率達標
        assert_eq!(
            CostEngine::estimated_extra_cost(&totals, &targets, &prices()),
            Decimal::from(1500)
        );
    }

    #[test]
    fn test_extra_cost_yield_below_target() {
        let totals = ConsumptionTotals {
            production: Decimal::from(96),
            yield_pct: Decimal::from(96),
            ..Default::default()
        };

        // 目標 100%：損耗 4 t × 2000
        let targets = ConsumptionTargets::new().with_yield_pct(Decimal::ONE_HUNDRED);
        let extra = CostEngine::estimated_extra_cost(&totals, &targets, &prices());
        assert_eq!(extra, Decimal::from(8000));

        // 未設定目標不計收得率損耗
        let extra = CostEngine::estimated_extra_cost(&totals, &ConsumptionTargets::new(), &prices());
        assert_eq!(extra, Decimal::ZERO);
    }

    #[test]
    fn test_extra_cost_uses_production_with_readings() {
        // 700 t 有 28000 m³；另 700 t 沒有天然氣讀值
        let totals = ConsumptionTotals {
            production: Decimal::from(1400),
            gas: Decimal::from(28_000),
            gas_production: Decimal::from(700),
            ..Default::default()
        };
        let targets = ConsumptionTargets::new().with_gas_per_ton(Decimal::from(38));

        // 700 t × (40 − 38) m³/t × 3.00
        assert_eq!(
            CostEngine::estimated_extra_cost(&totals, &targets, &prices()),
            Decimal::from(4200)
        );
    }

    #[test]
    fn test_extra_cost_without_production() {
        let totals = ConsumptionTotals::default();
        assert_eq!(
            CostEngine::estimated_extra_cost(&totals, &ConsumptionTargets::new(), &prices()),
            Decimal::ZERO
        );
    }
}
