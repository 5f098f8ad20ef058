//! 增量預測
//!
//! 編輯實績只重算當日，編輯計劃只重算該日以後的預測日；
//! 截至日或耗用率因編輯而改變時退回全部重算。

use crate::dirty_tracking::DirtyTracker;
use chrono::NaiveDate;
use pcp_calc::{DayContribution, DayPhase, ForecastResult, HybridForecast};
use pcp_core::{DateRange, PlannedOrder, ProductionRecord, ProjectionRates, UnitCostConfig};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 重算統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecomputeStats {
    /// 全部重算次數
    pub full_recomputes: usize,
    /// 增量重算次數
    pub partial_recomputes: usize,
    /// 增量重算過的日數
    pub days_recomputed: usize,
}

/// 增量預測
pub struct IncrementalForecast {
    records: Vec<ProductionRecord>,
    planned_orders: Vec<PlannedOrder>,
    period: DateRange,
    cost_config: UnitCostConfig,
    default_rates: ProjectionRates,
    result: ForecastResult,
    tracker: DirtyTracker,
    stats: RecomputeStats,
}

impl IncrementalForecast {
    /// 以完整計算建立
    pub fn new(
        records: Vec<ProductionRecord>,
        planned_orders: Vec<PlannedOrder>,
        period: DateRange,
        cost_config: UnitCostConfig,
        default_rates: ProjectionRates,
    ) -> Self {
        let result = HybridForecast::compute(
            &records,
            &planned_orders,
            period,
            &cost_config,
            &default_rates,
        );

        Self {
            records,
            planned_orders,
            period,
            cost_config,
            default_rates,
            result,
            tracker: DirtyTracker::new(),
            stats: RecomputeStats {
                full_recomputes: 1,
                ..Default::default()
            },
        }
    }

    /// 目前的預測結果
    pub fn result(&self) -> &ForecastResult {
        &self.result
    }

    pub fn records(&self) -> &[ProductionRecord] {
        &self.records
    }

    pub fn planned_orders(&self) -> &[PlannedOrder] {
        &self.planned_orders
    }

    pub fn stats(&self) -> RecomputeStats {
        self.stats
    }

    /// 以新記錄取代同 id 的記錄（沒有則新增）
    pub fn update_record(&mut self, record: ProductionRecord) -> &ForecastResult {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                if existing.date != record.date {
                    self.tracker.mark_day(existing.date);
                }
                self.tracker.mark_day(record.date);
                *existing = record;
            }
            None => {
                self.tracker.mark_day(record.date);
                self.records.push(record);
            }
        }
        self.refresh()
    }

    /// 移除記錄
    pub fn remove_record(&mut self, id: Uuid) -> &ForecastResult {
        if let Some(pos) = self.records.iter().position(|r| r.id == id) {
            let removed = self.records.remove(pos);
            self.tracker.mark_day(removed.date);
        }
        self.refresh()
    }

    /// 以新計劃取代同 id 的計劃（沒有則新增）
    pub fn update_planned_order(&mut self, order: PlannedOrder) -> &ForecastResult {
        match self.planned_orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => {
                self.tracker.mark_from(existing.date.min(order.date));
                *existing = order;
            }
            None => {
                self.tracker.mark_from(order.date);
                self.planned_orders.push(order);
            }
        }
        self.refresh()
    }

    /// 替換單價：所有日別成本都會變，全部重算
    pub fn set_cost_config(&mut self, cost_config: UnitCostConfig) -> &ForecastResult {
        self.cost_config = cost_config;
        self.tracker.mark_all();
        self.refresh()
    }

    /// 全部重算
    pub fn full_recompute(&mut self) -> &ForecastResult {
        self.result = HybridForecast::compute(
            &self.records,
            &self.planned_orders,
            self.period,
            &self.cost_config,
            &self.default_rates,
        );
        self.tracker.clear();
        self.stats.full_recomputes += 1;
        &self.result
    }

    fn refresh(&mut self) -> &ForecastResult {
        if self.tracker.is_clean() {
            return &self.result;
        }

        let as_of = HybridForecast::derive_as_of(&self.records, self.period);
        let rates =
            HybridForecast::projection_rates(&self.records, self.period, as_of, &self.default_rates);

        if self.tracker.needs_full_recompute() || as_of != self.result.as_of || rates != self.result.rates
        {
            tracing::debug!("截至日或耗用率改變，全部重算");
            return self.full_recompute();
        }

        let mut days: Vec<DayContribution> = self
            .result
            .days
            .iter()
            .filter(|d| !self.is_dirty(d))
            .cloned()
            .collect();
        let before = days.len();

        for date in self.tracker.dirty_days().collect::<Vec<NaiveDate>>() {
            days.extend(
                HybridForecast::executed_records(&self.records, self.period, as_of)
                    .filter(|r| r.date == date)
                    .map(|r| DayContribution::executed(r, &rates, &self.cost_config)),
            );
        }

        if let Some(from) = self.tracker.dirty_from() {
            days.extend(
                HybridForecast::planned_by_day(&self.planned_orders, self.period, as_of)
                    .range(from..)
                    .map(|(date, volume)| {
                        DayContribution::projected(*date, *volume, &rates, &self.cost_config)
                    }),
            );
        }

        let recomputed = days.len() - before;
        tracing::debug!("增量重算 {} 日", recomputed);

        self.result = ForecastResult::from_days(self.period, as_of, rates, days);
        self.tracker.clear();
        self.stats.partial_recomputes += 1;
        self.stats.days_recomputed += recomputed;
        &self.result
    }

    /// 日別貢獻是否需要重算
    fn is_dirty(&self, day: &DayContribution) -> bool {
        match day.phase {
            DayPhase::Executed => self.tracker.dirty_days().any(|d| d == day.date),
            DayPhase::Projected => self.tracker.dirty_from().is_some_and(|from| day.date >= from),
        }
    }
}
