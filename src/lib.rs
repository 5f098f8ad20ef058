//! # PCP
//!
//! 軋鋼精整線生產計劃與控制（PCP）計算引擎
//!
//! 正規化後的生產記錄與成本參數 → 驗證、KPI、混合月底預測、情境模擬。

pub mod logging;

pub use pcp_cache as cache;
pub use pcp_calc as calc;
pub use pcp_optimizer as optimizer;

pub use pcp_cache::IncrementalForecast;
pub use pcp_calc::{
    CostBreakdown, CostEngine, DataHealth, ForecastResult, HealthScore, HybridForecast,
    KpiAggregator, KpiSnapshot, MissingItemsReport, PcpEngine, PcpResult, ScenarioSimulator,
    SimulationResult, SimulationScenario, ValidationOutcome, Validator, YieldLossCalculator,
};
pub use pcp_core::{
    ConsumptionTargets, CostConfigStore, CutMode, DateRange, EngineConfig, IssueKind, PcpError,
    PlannedOrder, ProductionRecord, ProjectionRates, RecordSource, Result, Severity,
    ShearLossModel, UnitCostConfig, ValidationIssue, WorkCalendar,
};
pub use pcp_optimizer::{BilletLengthOptimizer, CoolingBedSelector, OptimizationResult};
