//! KPI 彙總

use crate::cost::{ConsumptionTotals, CostEngine};
use pcp_core::{ConsumptionTargets, DateRange, ProductionRecord, UnitCostConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 區間 KPI
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub period: Option<DateRange>,

    /// 總產量（t）
    pub total_production: Decimal,
    /// 平均天然氣耗用（m³/日）
    pub avg_gas_consumption: Decimal,
    /// 平均電力耗用（kWh/日）
    pub avg_energy_consumption: Decimal,
    /// 平均收得率（%）
    pub avg_yield_pct: Decimal,
    /// 生產力（t / 換線分鐘）
    pub productivity: Decimal,
    /// 平均換線時間（分鐘）
    pub avg_setup_time: Decimal,
    /// 估算超耗成本
    pub estimated_extra_cost: Decimal,

    /// 區間內記錄數
    pub record_count: usize,
    /// 天然氣單耗（m³/t）
    pub specific_gas_consumption: Decimal,
    /// 電力單耗（kWh/t）
    pub specific_energy_consumption: Decimal,
}

impl KpiSnapshot {
    /// 全零快照
    pub fn zero(period: DateRange) -> Self {
        Self {
            period: Some(period),
            ..Default::default()
        }
    }
}

/// 只計非空值的平均
#[derive(Default)]
struct MeanAccumulator {
    sum: Decimal,
    count: u32,
}

impl MeanAccumulator {
    fn push(&mut self, value: Option<Decimal>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Decimal {
        if self.count == 0 {
            Decimal::ZERO
        } else {
            self.sum / Decimal::from(self.count)
        }
    }
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// KPI 彙總器
pub struct KpiAggregator;

impl KpiAggregator {
    /// 彙總區間內（含頭尾）的有效記錄
    pub fn aggregate(
        records: &[ProductionRecord],
        period: DateRange,
        cost_config: &UnitCostConfig,
        targets: &ConsumptionTargets,
    ) -> KpiSnapshot {
        let in_range: Vec<&ProductionRecord> =
            records.iter().filter(|r| period.contains(r.date)).collect();

        tracing::debug!(
            "彙總 KPI：{} ~ {}，{} 筆記錄",
            period.start,
            period.end,
            in_range.len()
        );

        if in_range.is_empty() {
            return KpiSnapshot::zero(period);
        }

        let mut gas = MeanAccumulator::default();
        let mut energy = MeanAccumulator::default();
        let mut yields = MeanAccumulator::default();
        let mut setup = MeanAccumulator::default();
        let mut total_production = Decimal::ZERO;
        let mut gas_production = Decimal::ZERO;
        let mut energy_production = Decimal::ZERO;

        for record in &in_range {
            let volume = record.executed_volume.unwrap_or_default();
            total_production += volume;
            // 單耗只以有讀值的記錄產量為分母
            if record.gas_consumption.is_some() {
                gas_production += volume;
            }
            if record.energy_consumption.is_some() {
                energy_production += volume;
            }
            gas.push(record.gas_consumption);
            energy.push(record.energy_consumption);
            yields.push(record.metallic_yield_pct);
            setup.push(record.setup_time_minutes);
        }

        let totals = ConsumptionTotals {
            production: total_production,
            gas: gas.sum,
            gas_production,
            energy: energy.sum,
            energy_production,
            yield_pct: yields.mean(),
        };

        KpiSnapshot {
            period: Some(period),
            total_production,
            avg_gas_consumption: gas.mean(),
            avg_energy_consumption: energy.mean(),
            avg_yield_pct: yields.mean(),
            productivity: ratio(total_production, setup.sum),
            avg_setup_time: setup.mean(),
            estimated_extra_cost: CostEngine::estimated_extra_cost(&totals, targets, cost_config),
            record_count: in_range.len(),
            specific_gas_consumption: ratio(gas.sum, gas_production),
            specific_energy_consumption: ratio(energy.sum, energy_production),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pcp_core::RecordSource;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn prices() -> UnitCostConfig {
        UnitCostConfig::new(Decimal::new(300, 2), Decimal::new(60, 2), Decimal::from(2000), day(1))
    }

    fn uniform(d: u32) -> ProductionRecord {
        ProductionRecord::new(day(d), RecordSource::Imported)
            .with_executed_volume(Decimal::from(700))
            .with_gas_consumption(Decimal::from(28_000))
            .with_energy_consumption(Decimal::from(52_500))
            .with_metallic_yield_pct(Decimal::from(96))
            .with_setup_time_minutes(Decimal::from(70))
    }

    #[test]
    fn test_empty_range_is_zero() {
        let records: Vec<_> = (1..=5).map(uniform).collect();
        let march = DateRange::month(2026, 3).unwrap();

        let kpi = KpiAggregator::aggregate(&records, march, &prices(), &ConsumptionTargets::new());

        assert_eq!(kpi, KpiSnapshot::zero(march));
        assert_eq!(kpi.total_production, Decimal::ZERO);
        assert_eq!(kpi.productivity, Decimal::ZERO);
    }

    #[test]
    fn test_uniform_month_means() {
        let records: Vec<_> = (1..=28).map(uniform).collect();
        let february = DateRange::month(2026, 2).unwrap();

        let kpi = KpiAggregator::aggregate(&records, february, &prices(), &ConsumptionTargets::new());

        assert_eq!(kpi.record_count, 28);
        assert_eq!(kpi.total_production, Decimal::from(700 * 28));
        assert_eq!(kpi.avg_gas_consumption, Decimal::from(28_000));
        assert_eq!(kpi.avg_energy_consumption, Decimal::from(52_500));
        assert_eq!(kpi.avg_yield_pct, Decimal::from(96));
        assert_eq!(kpi.avg_setup_time, Decimal::from(70));
        assert_eq!(kpi.productivity, Decimal::from(10));
        assert_eq!(kpi.specific_gas_consumption, Decimal::from(40));
        assert_eq!(kpi.specific_energy_consumption, Decimal::from(75));
    }

    #[test]
    fn test_null_fields_excluded_from_means() {
        let mut partial = uniform(2);
        partial.gas_consumption = None;
        partial.metallic_yield_pct = None;
        let mut other = uniform(3);
        other.gas_consumption = Some(Decimal::from(30_000));
        other.metallic_yield_pct = Some(Decimal::from(94));

        let range = DateRange::new(day(1), day(10)).unwrap();
        let kpi =
            KpiAggregator::aggregate(&[partial, other], range, &prices(), &ConsumptionTargets::new());

        assert_eq!(kpi.avg_gas_consumption, Decimal::from(30_000));
        assert_eq!(kpi.avg_yield_pct, Decimal::from(94));
        assert_eq!(kpi.total_production, Decimal::from(1400));
    }

    #[test]
    fn test_no_setup_time_productivity_zero() {
        let mut record = uniform(1);
        record.setup_time_minutes = None;
        let range = DateRange::new(day(1), day(1)).unwrap();

        let kpi = KpiAggregator::aggregate(&[record], range, &prices(), &ConsumptionTargets::new());

        assert_eq!(kpi.productivity, Decimal::ZERO);
        assert_eq!(kpi.avg_setup_time, Decimal::ZERO);
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let records: Vec<_> = (1..=10).map(uniform).collect();
        let range = DateRange::new(day(3), day(5)).unwrap();

        let kpi = KpiAggregator::aggregate(&records, range, &prices(), &ConsumptionTargets::new());
        assert_eq!(kpi.record_count, 3);
    }

    #[test]
    fn test_extra_cost_from_targets() {
        let records: Vec<_> = (1..=2).map(uniform).collect();
        let range = DateRange::new(day(1), day(2)).unwrap();
        let targets = ConsumptionTargets::new()
            .with_gas_per_ton(Decimal::from(38))
            .with_yield_pct(Decimal::from(96));

        let kpi = KpiAggregator::aggregate(&records, range, &prices(), &targets);

        // 1400 t × (40 − 38) m³/t × 3.00
        assert_eq!(kpi.estimated_extra_cost, Decimal::from(8400));
    }

    #[test]
    fn test_missing_consumption_excluded_from_specific() {
        let mut unread = uniform(2);
        unread.gas_consumption = None;
        unread.energy_consumption = None;
        let range = DateRange::new(day(1), day(2)).unwrap();
        let targets = ConsumptionTargets::new().with_gas_per_ton(Decimal::from(38));

        let kpi = KpiAggregator::aggregate(&[uniform(1), unread], range, &prices(), &targets);

        assert_eq!(kpi.total_production, Decimal::from(1400));
        assert_eq!(kpi.specific_gas_consumption, Decimal::from(40));
        assert_eq!(kpi.specific_energy_consumption, Decimal::from(75));
        // 只有 2/1 有讀值：700 t × 2 m³/t × 3.00
        assert_eq!(kpi.estimated_extra_cost, Decimal::from(4200));
    }

    proptest! {
        #[test]
        fn prop_uniform_means_equal_value(
            days in 1u32..=28,
            volume in 1i64..2000,
            yield_tenths in 800i64..=1000,
        ) {
            let value = Decimal::new(yield_tenths, 1);
            let records: Vec<_> = (1..=days)
                .map(|d| {
                    uniform(d)
                        .with_executed_volume(Decimal::from(volume))
                        .with_metallic_yield_pct(value)
                })
                .collect();
            let range = DateRange::month(2026, 2).unwrap();

            let kpi = KpiAggregator::aggregate(&records, range, &prices(), &ConsumptionTargets::new());

            prop_assert_eq!(kpi.avg_yield_pct, value);
            prop_assert_eq!(kpi.total_production, Decimal::from(volume) * Decimal::from(days));
        }
    }
}
