//! # PCP Calculation Engine
//!
//! 驗證、KPI、成本、混合預測與情境模擬

pub mod bucketing;
pub mod cost;
pub mod engine;
pub mod forecast;
pub mod health;
pub mod kpi;
pub mod scenario;
pub mod validation;
pub mod yield_loss;

// Re-export 主要類型
pub use bucketing::{BucketingCalculator, BucketingStrategy, PeriodBucket};
pub use cost::{ConsumptionTotals, CostBreakdown, CostEngine, CostInputs};
pub use engine::PcpEngine;
pub use forecast::{DayContribution, DayPhase, ForecastResult, HybridForecast, PhaseTotals};
pub use health::{DataHealth, HealthDeduction, HealthFactor, HealthGrade, HealthScore};
pub use kpi::{KpiAggregator, KpiSnapshot};
pub use scenario::{ScenarioSimulator, SimulationResult, SimulationScenario};
pub use validation::{MissingItemsReport, ValidationOutcome, Validator};
pub use yield_loss::{BilletInputs, BilletYield, CutToLength, ShearLoss, YieldLossCalculator};

/// PCP 計算結果
#[derive(Debug, Clone)]
pub struct PcpResult {
    /// 驗證結果
    pub validation: ValidationOutcome,

    /// 缺漏項目報告
    pub missing_items: MissingItemsReport,

    /// 區間 KPI
    pub kpi: KpiSnapshot,

    /// 月底預測
    pub forecast: ForecastResult,

    /// 資料健康度
    pub health: HealthScore,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl PcpResult {
    /// 是否有阻擋級問題
    pub fn has_blocking_issues(&self) -> bool {
        self.validation.blocking_count() > 0
    }
}
