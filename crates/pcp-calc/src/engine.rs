//! PCP 主計算器

use chrono::NaiveDate;
use pcp_core::{
    DateRange, EngineConfig, PlannedOrder, ProductionRecord, UnitCostConfig, WorkCalendar,
};

use crate::forecast::{ForecastResult, HybridForecast};
use crate::health::{DataHealth, HealthScore};
use crate::kpi::{KpiAggregator, KpiSnapshot};
use crate::scenario::{ScenarioSimulator, SimulationResult, SimulationScenario};
use crate::validation::{ValidationOutcome, Validator};
use crate::PcpResult;

/// PCP 計算器
///
/// 持有配置與生效中的單價，所有操作都是輸入快照的純函數。
pub struct PcpEngine {
    /// 引擎配置
    config: EngineConfig,

    /// 生效中的單位成本
    cost_config: UnitCostConfig,

    /// 工作日曆（情境延長工作天用）
    calendar: WorkCalendar,
}

impl PcpEngine {
    /// 創建新的 PCP 計算器
    pub fn new(config: EngineConfig, cost_config: UnitCostConfig) -> Self {
        Self {
            config,
            cost_config,
            calendar: WorkCalendar::default(),
        }
    }

    /// 建構器模式：設置工作日曆
    pub fn with_calendar(mut self, calendar: WorkCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cost_config(&self) -> &UnitCostConfig {
        &self.cost_config
    }

    /// 替換生效中的單價（由配置存放區儲存成功後呼叫）
    pub fn set_cost_config(&mut self, cost_config: UnitCostConfig) {
        self.cost_config = cost_config;
    }

    /// 驗證批次
    pub fn validate(&self, records: &[ProductionRecord]) -> ValidationOutcome {
        Validator::validate(records, &self.config)
    }

    /// 區間 KPI；起日晚於迄日為錯誤
    pub fn kpis(
        &self,
        records: &[ProductionRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> pcp_core::Result<KpiSnapshot> {
        let period = DateRange::new(start, end)?;
        Ok(KpiAggregator::aggregate(
            records,
            period,
            &self.cost_config,
            &self.config.targets,
        ))
    }

    /// 混合預測；起日晚於迄日為錯誤
    pub fn forecast(
        &self,
        records: &[ProductionRecord],
        planned_orders: &[PlannedOrder],
        start: NaiveDate,
        end: NaiveDate,
    ) -> pcp_core::Result<ForecastResult> {
        let period = DateRange::new(start, end)?;
        Ok(HybridForecast::compute(
            records,
            planned_orders,
            period,
            &self.cost_config,
            &self.config.default_rates,
        ))
    }

    /// 資料健康度
    pub fn health(&self, records: &[ProductionRecord]) -> HealthScore {
        DataHealth::score(records, &self.config)
    }

    fn simulator(&self) -> ScenarioSimulator {
        ScenarioSimulator::new(self.cost_config.clone(), self.calendar.clone())
    }

    /// 模擬單一情境
    pub fn simulate(
        &self,
        baseline: &ForecastResult,
        kpi: &KpiSnapshot,
        scenario: &SimulationScenario,
    ) -> SimulationResult {
        self.simulator().simulate(baseline, kpi, scenario)
    }

    /// 比較多個情境
    pub fn compare(
        &self,
        baseline: &ForecastResult,
        kpi: &KpiSnapshot,
        scenarios: &[SimulationScenario],
    ) -> Vec<SimulationResult> {
        self.simulator().compare(baseline, kpi, scenarios)
    }

    /// 主計算入口：驗證 → KPI → 預測 → 健康度
    ///
    /// 未提供計劃訂單時由有效記錄的計劃產量推導。
    pub fn calculate(
        &self,
        records: &[ProductionRecord],
        planned_orders: Option<&[PlannedOrder]>,
        period: DateRange,
    ) -> PcpResult {
        tracing::info!(
            "開始 PCP 計算：記錄 {} 筆，期間 {} ~ {}",
            records.len(),
            period.start,
            period.end
        );

        let start_time = std::time::Instant::now();

        // Step 1: 驗證
        tracing::debug!("Step 1: 驗證");
        let validation = self.validate(records);
        tracing::debug!(
            "有效記錄 {} 筆，問題 {} 個",
            validation.valid_records.len(),
            validation.issues.len()
        );

        // Step 2: KPI
        tracing::debug!("Step 2: KPI 彙總");
        let kpi = KpiAggregator::aggregate(
            &validation.valid_records,
            period,
            &self.cost_config,
            &self.config.targets,
        );

        // Step 3: 預測
        tracing::debug!("Step 3: 混合預測");
        let derived;
        let orders = match planned_orders {
            Some(orders) => orders,
            None => {
                derived = PlannedOrder::from_records(&validation.valid_records);
                derived.as_slice()
            }
        };
        let forecast = HybridForecast::compute(
            &validation.valid_records,
            orders,
            period,
            &self.cost_config,
            &self.config.default_rates,
        );

        // Step 4: 健康度（以原始批次評分）
        tracing::debug!("Step 4: 資料健康度");
        let health = self.health(records);

        let result = PcpResult {
            missing_items: validation.missing_items_report(),
            validation,
            kpi,
            forecast,
            health,
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        };

        tracing::info!("PCP 計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "月底預測 {} t，健康度 {}",
            result.forecast.month_end.volume,
            result.health.score
        );

        result
    }
}
