//! 混合月底預測
//!
//! 截至日（含）以前用實績，之後用計劃產量乘上耗用率推估。

use crate::cost::{CostBreakdown, CostEngine, CostInputs};
use chrono::NaiveDate;
use pcp_core::{DateRange, PlannedOrder, ProductionRecord, ProjectionRates, UnitCostConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Add;

/// 日別所屬階段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    /// 已執行（實績）
    Executed,
    /// 預測
    Projected,
}

/// 單日貢獻
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayContribution {
    pub date: NaiveDate,
    pub phase: DayPhase,
    /// 產量（t）
    pub volume: Decimal,
    /// 天然氣（m³）
    pub gas: Decimal,
    /// 電力（kWh）
    pub energy: Decimal,
    /// 收得率（%）
    pub yield_pct: Decimal,
    /// 金屬料投入（t）
    pub metallic_charge_tons: Decimal,
    pub cost: CostBreakdown,
}

impl DayContribution {
    /// 實績日
    ///
    /// 缺少收得率時使用預測耗用率的收得率；缺少耗用量時視為 0。
    pub fn executed(
        record: &ProductionRecord,
        rates: &ProjectionRates,
        cost_config: &UnitCostConfig,
    ) -> Self {
        let volume = record.executed_volume.unwrap_or_default();
        let yield_pct = record.metallic_yield_pct.unwrap_or(rates.yield_pct);
        Self::build(
            record.date,
            DayPhase::Executed,
            volume,
            record.gas_consumption.unwrap_or_default(),
            record.energy_consumption.unwrap_or_default(),
            yield_pct,
            cost_config,
        )
    }

    /// 預測日：計劃產量 × 耗用率
    pub fn projected(
        date: NaiveDate,
        volume: Decimal,
        rates: &ProjectionRates,
        cost_config: &UnitCostConfig,
    ) -> Self {
        Self::build(
            date,
            DayPhase::Projected,
            volume,
            volume * rates.gas_per_ton,
            volume * rates.energy_per_ton,
            rates.yield_pct,
            cost_config,
        )
    }

    fn build(
        date: NaiveDate,
        phase: DayPhase,
        volume: Decimal,
        gas: Decimal,
        energy: Decimal,
        yield_pct: Decimal,
        cost_config: &UnitCostConfig,
    ) -> Self {
        let metallic_charge_tons = CostEngine::metallic_charge_tons(volume, yield_pct);
        let loss_tons = (metallic_charge_tons - volume).max(Decimal::ZERO);

        let cost = CostEngine::compute(
            &CostInputs {
                gas_consumption: gas,
                energy_consumption: energy,
                metallic_charge_tons,
                loss_weight_kg: loss_tons * Decimal::ONE_THOUSAND,
            },
            cost_config,
        );

        Self {
            date,
            phase,
            volume,
            gas,
            energy,
            yield_pct,
            metallic_charge_tons,
            cost,
        }
    }
}

/// 階段合計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTotals {
    pub volume: Decimal,
    pub gas: Decimal,
    pub energy: Decimal,
    pub metallic_charge_tons: Decimal,
    pub cost: CostBreakdown,
    pub day_count: usize,
}

impl PhaseTotals {
    /// 累加單日
    pub fn add_day(&mut self, day: &DayContribution) {
        self.volume += day.volume;
        self.gas += day.gas;
        self.energy += day.energy;
        self.metallic_charge_tons += day.metallic_charge_tons;
        self.cost += day.cost;
        self.day_count += 1;
    }

    /// 由日別合計
    pub fn from_days<'a>(days: impl IntoIterator<Item = &'a DayContribution>) -> Self {
        let mut totals = Self::default();
        for day in days {
            totals.add_day(day);
        }
        totals
    }

    /// 每噸成本（無產量時為 0）
    pub fn cost_per_ton(&self) -> Decimal {
        if self.volume.is_zero() {
            Decimal::ZERO
        } else {
            self.cost.total() / self.volume
        }
    }

    /// 平均收得率 = 產量 / 投料
    pub fn yield_pct(&self) -> Decimal {
        if self.metallic_charge_tons.is_zero() {
            Decimal::ZERO
        } else {
            self.volume / self.metallic_charge_tons * Decimal::ONE_HUNDRED
        }
    }
}

impl Add for PhaseTotals {
    type Output = PhaseTotals;

    fn add(self, rhs: PhaseTotals) -> PhaseTotals {
        PhaseTotals {
            volume: self.volume + rhs.volume,
            gas: self.gas + rhs.gas,
            energy: self.energy + rhs.energy,
            metallic_charge_tons: self.metallic_charge_tons + rhs.metallic_charge_tons,
            cost: self.cost + rhs.cost,
            day_count: self.day_count + rhs.day_count,
        }
    }
}

/// 預測結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub period: DateRange,

    /// 截至日；`None` 表示整個期間都是預測
    pub as_of: Option<NaiveDate>,

    /// 預測使用的耗用率
    pub rates: ProjectionRates,

    /// 日別貢獻（依日期排序）
    pub days: Vec<DayContribution>,

    pub executed_to_date: PhaseTotals,
    pub projected_remaining: PhaseTotals,
    pub month_end: PhaseTotals,
}

impl ForecastResult {
    /// 由日別貢獻組出結果
    pub fn from_days(
        period: DateRange,
        as_of: Option<NaiveDate>,
        rates: ProjectionRates,
        mut days: Vec<DayContribution>,
    ) -> Self {
        days.sort_by_key(|d| (d.date, d.phase == DayPhase::Projected));

        let executed_to_date =
            PhaseTotals::from_days(days.iter().filter(|d| d.phase == DayPhase::Executed));
        let projected_remaining =
            PhaseTotals::from_days(days.iter().filter(|d| d.phase == DayPhase::Projected));

        Self {
            period,
            as_of,
            rates,
            days,
            executed_to_date,
            projected_remaining,
            month_end: executed_to_date + projected_remaining,
        }
    }

    /// 預測日
    pub fn projected_days(&self) -> impl Iterator<Item = &DayContribution> {
        self.days.iter().filter(|d| d.phase == DayPhase::Projected)
    }

    /// 實績日
    pub fn executed_days(&self) -> impl Iterator<Item = &DayContribution> {
        self.days.iter().filter(|d| d.phase == DayPhase::Executed)
    }

    /// 月底預測產量
    pub fn month_end_volume(&self) -> Decimal {
        self.month_end.volume
    }
}

/// 混合預測計算器
pub struct HybridForecast;

impl HybridForecast {
    /// 計算預測
    ///
    /// 截至日每次重新推導，呼叫端不需維護。
    pub fn compute(
        records: &[ProductionRecord],
        planned_orders: &[PlannedOrder],
        period: DateRange,
        cost_config: &UnitCostConfig,
        default_rates: &ProjectionRates,
    ) -> ForecastResult {
        let as_of = Self::derive_as_of(records, period);
        let rates = Self::projection_rates(records, period, as_of, default_rates);

        tracing::debug!(
            "預測期間 {} ~ {}，截至日 {:?}",
            period.start,
            period.end,
            as_of
        );

        let mut days: Vec<DayContribution> = Self::executed_records(records, period, as_of)
            .map(|r| DayContribution::executed(r, &rates, cost_config))
            .collect();

        days.extend(
            Self::planned_by_day(planned_orders, period, as_of)
                .into_iter()
                .map(|(date, volume)| DayContribution::projected(date, volume, &rates, cost_config)),
        );

        ForecastResult::from_days(period, as_of, rates, days)
    }

    /// 截至日 = 期間內有實際產量的最晚日期
    pub fn derive_as_of(records: &[ProductionRecord], period: DateRange) -> Option<NaiveDate> {
        records
            .iter()
            .filter(|r| r.is_executed() && period.contains(r.date))
            .map(|r| r.date)
            .max()
    }

    /// 預測耗用率
    ///
    /// 取截至日前最後一筆有產量的實績換算單耗，缺項使用預設值。
    pub fn projection_rates(
        records: &[ProductionRecord],
        period: DateRange,
        as_of: Option<NaiveDate>,
        defaults: &ProjectionRates,
    ) -> ProjectionRates {
        let Some(as_of) = as_of else {
            return *defaults;
        };

        let latest = records
            .iter()
            .filter(|r| r.date >= period.start && r.date <= as_of)
            .filter(|r| r.executed_volume.is_some_and(|v| v > Decimal::ZERO))
            .max_by_key(|r| r.date);

        let Some(latest) = latest else {
            return *defaults;
        };
        let volume = latest.executed_volume.unwrap_or_default();

        ProjectionRates {
            yield_pct: latest
                .metallic_yield_pct
                .filter(|y| *y > Decimal::ZERO)
                .unwrap_or(defaults.yield_pct),
            gas_per_ton: latest
                .gas_consumption
                .map(|g| g / volume)
                .unwrap_or(defaults.gas_per_ton),
            energy_per_ton: latest
                .energy_consumption
                .map(|e| e / volume)
                .unwrap_or(defaults.energy_per_ton),
        }
    }

    /// 實績階段的記錄（期間內且不晚於截至日）
    pub fn executed_records<'a>(
        records: &'a [ProductionRecord],
        period: DateRange,
        as_of: Option<NaiveDate>,
    ) -> impl Iterator<Item = &'a ProductionRecord> {
        records.iter().filter(move |r| {
            r.is_executed() && period.contains(r.date) && as_of.is_some_and(|d| r.date <= d)
        })
    }

    /// 預測階段的日別計劃量（晚於截至日，同日加總）
    pub fn planned_by_day(
        planned_orders: &[PlannedOrder],
        period: DateRange,
        as_of: Option<NaiveDate>,
    ) -> BTreeMap<NaiveDate, Decimal> {
        let mut by_day = BTreeMap::new();
        for order in planned_orders {
            if !period.contains(order.date) || as_of.is_some_and(|d| order.date <= d) {
                continue;
            }
            *by_day.entry(order.date).or_insert(Decimal::ZERO) += order.planned_volume;
        }
        by_day
    }
}
