//! 情境模擬（What-if）
//!
//! 在基準預測上覆寫預測期的輸入，重新推估，不改動任何記錄。

use crate::forecast::{DayContribution, ForecastResult};
use crate::kpi::KpiSnapshot;
use chrono::NaiveDate;
use pcp_core::{ProjectionRates, UnitCostConfig, ValidationIssue, WorkCalendar};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 模擬情境
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationScenario {
    pub label: Option<String>,

    /// 每日產量（t），取代所有剩餘日的計劃量
    pub daily_volume_override: Option<Decimal>,

    /// 收得率（%），取代剩餘日的收得率
    pub expected_yield_override: Option<Decimal>,

    /// 剩餘工作天數；少於現有預測日時截斷，多於時依工作日曆往後補
    pub remaining_workdays_override: Option<i64>,

    /// 產量變動（%）
    pub volume_change_pct: Option<Decimal>,

    /// 天然氣單耗變動（%，負值表示改善）
    pub gas_intensity_change_pct: Option<Decimal>,

    /// 電力單耗變動（%，負值表示改善）
    pub energy_intensity_change_pct: Option<Decimal>,

    /// 收得率變動（百分點）
    pub yield_delta_pp: Option<Decimal>,
}

impl SimulationScenario {
    /// 創建空情境（不變更任何輸入）
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_daily_volume(mut self, volume: Decimal) -> Self {
        self.daily_volume_override = Some(volume);
        self
    }

    pub fn with_expected_yield(mut self, yield_pct: Decimal) -> Self {
        self.expected_yield_override = Some(yield_pct);
        self
    }

    pub fn with_remaining_workdays(mut self, days: i64) -> Self {
        self.remaining_workdays_override = Some(days);
        self
    }

    pub fn with_volume_change_pct(mut self, pct: Decimal) -> Self {
        self.volume_change_pct = Some(pct);
        self
    }

    pub fn with_gas_intensity_change_pct(mut self, pct: Decimal) -> Self {
        self.gas_intensity_change_pct = Some(pct);
        self
    }

    pub fn with_energy_intensity_change_pct(mut self, pct: Decimal) -> Self {
        self.energy_intensity_change_pct = Some(pct);
        self
    }

    pub fn with_yield_delta_pp(mut self, delta: Decimal) -> Self {
        self.yield_delta_pp = Some(delta);
        self
    }
}

/// 模擬結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub label: Option<String>,

    /// 情境月底總成本
    pub projected_total_cost: Decimal,

    /// 可節省金額 = 基準成本 − 情境成本（正值為節省）
    pub potential_savings: Decimal,

    /// 情境每噸成本
    pub cost_per_ton: Decimal,

    /// 成本變動（%），基準成本為 0 時為 0
    pub variance_pct: Decimal,

    pub baseline_cost: Decimal,
    pub baseline_cost_per_ton: Decimal,
    pub month_end_volume: Decimal,
    pub baseline_month_end_volume: Decimal,

    /// 情境預測
    pub forecast: ForecastResult,

    /// 被修正的覆寫值
    pub findings: Vec<ValidationIssue>,
}

/// 每日產量覆寫上限（t）
const MAX_DAILY_VOLUME: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// 相對變動上限（%）
const MAX_CHANGE_PCT: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// 修正後的覆寫值
#[derive(Debug, Default)]
struct ClampedScenario {
    daily_volume: Option<Decimal>,
    expected_yield: Option<Decimal>,
    remaining_workdays: Option<usize>,
    volume_factor: Option<Decimal>,
    gas_factor: Option<Decimal>,
    energy_factor: Option<Decimal>,
    yield_delta_pp: Option<Decimal>,
    findings: Vec<ValidationIssue>,
}

impl ClampedScenario {
    fn from_scenario(scenario: &SimulationScenario) -> Self {
        let mut c = Self::default();

        let daily_volume = scenario
            .daily_volume_override
            .map(|v| c.bounded("每日產量", v, Decimal::ZERO, MAX_DAILY_VOLUME));
        let expected_yield = scenario
            .expected_yield_override
            .map(|y| c.bounded("收得率", y, Decimal::ZERO, Decimal::ONE_HUNDRED));
        let remaining_workdays = scenario.remaining_workdays_override.map(|days| {
            if days < 0 {
                c.report(format!("剩餘工作天數 {} 已修正為 0", days));
                0
            } else {
                usize::try_from(days).unwrap_or(usize::MAX)
            }
        });

        let volume_factor = scenario
            .volume_change_pct
            .filter(|p| !p.is_zero())
            .map(|p| c.change_factor("產量變動", p));
        let gas_factor = scenario
            .gas_intensity_change_pct
            .filter(|p| !p.is_zero())
            .map(|p| c.change_factor("天然氣單耗變動", p));
        let energy_factor = scenario
            .energy_intensity_change_pct
            .filter(|p| !p.is_zero())
            .map(|p| c.change_factor("電力單耗變動", p));

        let yield_delta_pp = scenario
            .yield_delta_pp
            .filter(|d| !d.is_zero())
            .map(|d| c.bounded("收得率變動", d, -Decimal::ONE_HUNDRED, Decimal::ONE_HUNDRED));

        c.daily_volume = daily_volume;
        c.expected_yield = expected_yield;
        c.remaining_workdays = remaining_workdays;
        c.volume_factor = volume_factor;
        c.gas_factor = gas_factor;
        c.energy_factor = energy_factor;
        c.yield_delta_pp = yield_delta_pp;
        c
    }

    fn report(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.findings.push(ValidationIssue::clamped_override(message));
    }

    fn bounded(&mut self, name: &str, value: Decimal, min: Decimal, max: Decimal) -> Decimal {
        let bounded = value.clamp(min, max);
        if bounded != value {
            self.report(format!("{} {} 已修正為 {}", name, value, bounded));
        }
        bounded
    }

    /// 百分比變動換成倍率，限制在 −100% ~ +1000%
    fn change_factor(&mut self, name: &str, pct: Decimal) -> Decimal {
        let pct = self.bounded(name, pct, -Decimal::ONE_HUNDRED, MAX_CHANGE_PCT);
        Decimal::ONE + pct / Decimal::ONE_HUNDRED
    }
}

/// 情境模擬器
pub struct ScenarioSimulator {
    cost_config: UnitCostConfig,
    calendar: WorkCalendar,
}

impl ScenarioSimulator {
    /// 創建新的模擬器
    pub fn new(cost_config: UnitCostConfig, calendar: WorkCalendar) -> Self {
        Self {
            cost_config,
            calendar,
        }
    }

    /// 模擬單一情境
    pub fn simulate(
        &self,
        baseline: &ForecastResult,
        kpi: &KpiSnapshot,
        scenario: &SimulationScenario,
    ) -> SimulationResult {
        let mut clamped = ClampedScenario::from_scenario(scenario);
        let rates = Self::scenario_rates(&baseline.rates, kpi, &mut clamped);

        let window = self.projected_window(baseline, kpi, &mut clamped);

        let mut days: Vec<DayContribution> = baseline.executed_days().cloned().collect();
        days.extend(window.into_iter().map(|(date, volume)| {
            let volume = clamped.volume_factor.map_or(volume, |f| volume * f);
            DayContribution::projected(date, volume, &rates, &self.cost_config)
        }));

        let forecast = ForecastResult::from_days(baseline.period, baseline.as_of, rates, days);

        let baseline_cost = baseline.month_end.cost.total();
        let projected_total_cost = forecast.month_end.cost.total();
        let variance_pct = if baseline_cost.is_zero() {
            Decimal::ZERO
        } else {
            (projected_total_cost - baseline_cost) / baseline_cost * Decimal::ONE_HUNDRED
        };

        tracing::debug!(
            "情境 {:?}：成本 {} → {}",
            scenario.label,
            baseline_cost,
            projected_total_cost
        );

        SimulationResult {
            label: scenario.label.clone(),
            projected_total_cost,
            potential_savings: baseline_cost - projected_total_cost,
            cost_per_ton: forecast.month_end.cost_per_ton(),
            variance_pct,
            baseline_cost,
            baseline_cost_per_ton: baseline.month_end.cost_per_ton(),
            month_end_volume: forecast.month_end.volume,
            baseline_month_end_volume: baseline.month_end.volume,
            forecast,
            findings: clamped.findings,
        }
    }

    /// 並行比較多個情境，結果依輸入順序
    pub fn compare(
        &self,
        baseline: &ForecastResult,
        kpi: &KpiSnapshot,
        scenarios: &[SimulationScenario],
    ) -> Vec<SimulationResult> {
        tracing::info!("比較 {} 個情境", scenarios.len());

        scenarios
            .par_iter()
            .map(|scenario| self.simulate(baseline, kpi, scenario))
            .collect()
    }

    /// 情境耗用率
    ///
    /// 收得率：覆寫值優先；只有百分點變動時以 KPI 平均收得率為基準（無資料時用預測收得率）。
    fn scenario_rates(
        base: &ProjectionRates,
        kpi: &KpiSnapshot,
        clamped: &mut ClampedScenario,
    ) -> ProjectionRates {
        let yield_pct = match (clamped.expected_yield, clamped.yield_delta_pp) {
            (Some(y), None) => y,
            (Some(y), Some(delta)) => {
                clamped.bounded("收得率", y + delta, Decimal::ZERO, Decimal::ONE_HUNDRED)
            }
            (None, Some(delta)) => {
                let reference = if kpi.avg_yield_pct > Decimal::ZERO {
                    kpi.avg_yield_pct
                } else {
                    base.yield_pct
                };
                clamped.bounded("收得率", reference + delta, Decimal::ZERO, Decimal::ONE_HUNDRED)
            }
            (None, None) => base.yield_pct,
        };

        ProjectionRates {
            yield_pct,
            gas_per_ton: clamped
                .gas_factor
                .map_or(base.gas_per_ton, |f| base.gas_per_ton * f),
            energy_per_ton: clamped
                .energy_factor
                .map_or(base.energy_per_ton, |f| base.energy_per_ton * f),
        }
    }

    /// 預測期的日別產量
    ///
    /// 延長只補到期間結束日為止，超過的工作天數修正並回報。
    fn projected_window(
        &self,
        baseline: &ForecastResult,
        kpi: &KpiSnapshot,
        clamped: &mut ClampedScenario,
    ) -> Vec<(NaiveDate, Decimal)> {
        let mut window: Vec<(NaiveDate, Decimal)> = baseline
            .projected_days()
            .map(|d| (d.date, d.volume))
            .collect();

        if let Some(target) = clamped.remaining_workdays {
            if target <= window.len() {
                window.truncate(target);
            } else {
                let fill = Self::fill_volume(&window, kpi);
                let after = window
                    .last()
                    .map(|(date, _)| *date)
                    .or(baseline.as_of)
                    .unwrap_or_else(|| baseline.period.start.pred_opt().unwrap_or(baseline.period.start));

                let available = after
                    .succ_opt()
                    .map(|start| self.calendar.working_days_in(start, baseline.period.end))
                    .unwrap_or_default();

                let wanted = target - window.len();
                if wanted > available.len() {
                    clamped.report(format!(
                        "剩餘工作天數 {} 已修正為 {}（期間結束於 {}）",
                        target,
                        window.len() + available.len(),
                        baseline.period.end
                    ));
                }
                window.extend(available.into_iter().take(wanted).map(|date| (date, fill)));
            }
        }

        if let Some(volume) = clamped.daily_volume {
            for (_, v) in window.iter_mut() {
                *v = volume;
            }
        }

        window
    }

    /// 延長日的產量：現有預測日平均，無預測日時用 KPI 日均產量
    fn fill_volume(window: &[(NaiveDate, Decimal)], kpi: &KpiSnapshot) -> Decimal {
        if !window.is_empty() {
            let total: Decimal = window.iter().map(|(_, v)| *v).sum();
            return total / Decimal::from(window.len());
        }
        if kpi.record_count > 0 {
            return kpi.total_production / Decimal::from(kpi.record_count);
        }
        Decimal::ZERO
    }
}
