//! 引擎配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 預測用的單位耗用率
///
/// 預測期（尚未執行的日子）以計劃產量乘上這些比率推估耗用與投料。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRates {
    /// 金屬收得率（%）
    pub yield_pct: Decimal,

    /// 天然氣單耗（m³/t）
    pub gas_per_ton: Decimal,

    /// 電力單耗（kWh/t）
    pub energy_per_ton: Decimal,
}

impl ProjectionRates {
    /// 創建新的耗用率
    pub fn new(yield_pct: Decimal, gas_per_ton: Decimal, energy_per_ton: Decimal) -> Self {
        Self {
            yield_pct,
            gas_per_ton,
            energy_per_ton,
        }
    }
}

impl Default for ProjectionRates {
    /// 預設值取自 TL1 年度預算（一月）；收得率 94.5% 為儀表板無資料時的保底值
    fn default() -> Self {
        Self {
            yield_pct: Decimal::new(945, 1),
            gas_per_ton: Decimal::new(4183, 2),
            energy_per_ton: Decimal::new(7519, 2),
        }
    }
}

/// 耗用目標（預算／標準）
///
/// 用於估算超耗成本，未設定的項目不計入。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionTargets {
    /// 天然氣單耗目標（m³/t）
    pub gas_per_ton: Option<Decimal>,

    /// 電力單耗目標（kWh/t）
    pub energy_per_ton: Option<Decimal>,

    /// 收得率目標（%）；未設定時以 100% 計算金屬損耗
    pub yield_pct: Option<Decimal>,
}

impl ConsumptionTargets {
    /// 創建空目標
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置天然氣單耗目標
    pub fn with_gas_per_ton(mut self, target: Decimal) -> Self {
        self.gas_per_ton = Some(target);
        self
    }

    /// 建構器模式：設置電力單耗目標
    pub fn with_energy_per_ton(mut self, target: Decimal) -> Self {
        self.energy_per_ton = Some(target);
        self
    }

    /// 建構器模式：設置收得率目標
    pub fn with_yield_pct(mut self, target: Decimal) -> Self {
        self.yield_pct = Some(target);
        self
    }
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 計劃與實際偏差門檻（%）；`None` 表示不檢查偏差
    pub divergence_threshold_pct: Option<Decimal>,

    /// 偏差檢查的最小實際產量（t），低於此值不檢查
    pub divergence_min_executed: Decimal,

    /// 預測預設耗用率（無實績時使用）
    pub default_rates: ProjectionRates,

    /// 耗用目標
    pub targets: ConsumptionTargets,

    /// 換線時間異常門檻（分鐘）
    pub long_setup_minutes: Decimal,
}

impl EngineConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            divergence_threshold_pct: Some(Decimal::from(20)),
            divergence_min_executed: Decimal::from(5),
            default_rates: ProjectionRates::default(),
            targets: ConsumptionTargets::default(),
            long_setup_minutes: Decimal::from(600),
        }
    }

    /// 建構器模式：設置偏差門檻
    pub fn with_divergence_threshold_pct(mut self, threshold: Option<Decimal>) -> Self {
        self.divergence_threshold_pct = threshold;
        self
    }

    /// 建構器模式：設置預設耗用率
    pub fn with_default_rates(mut self, rates: ProjectionRates) -> Self {
        self.default_rates = rates;
        self
    }

    /// 建構器模式：設置耗用目標
    pub fn with_targets(mut self, targets: ConsumptionTargets) -> Self {
        self.targets = targets;
        self
    }

    /// 建構器模式：設置換線異常門檻
    pub fn with_long_setup_minutes(mut self, minutes: Decimal) -> Self {
        self.long_setup_minutes = minutes;
        self
    }

    /// 從 JSON 載入配置
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 輸出為 JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::new();

        assert_eq!(config.divergence_threshold_pct, Some(Decimal::from(20)));
        assert_eq!(config.default_rates.yield_pct, Decimal::new(945, 1));
        assert_eq!(config.long_setup_minutes, Decimal::from(600));
        assert!(config.targets.gas_per_ton.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new()
            .with_divergence_threshold_pct(None)
            .with_default_rates(ProjectionRates::new(
                Decimal::from(96),
                Decimal::from(40),
                Decimal::from(75),
            ))
            .with_targets(ConsumptionTargets::new().with_gas_per_ton(Decimal::new(4183, 2)));

        assert!(config.divergence_threshold_pct.is_none());
        assert_eq!(config.default_rates.yield_pct, Decimal::from(96));
        assert_eq!(config.targets.gas_per_ton, Some(Decimal::new(4183, 2)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::new().with_long_setup_minutes(Decimal::from(480));
        let json = config.to_json().unwrap();
        let loaded = EngineConfig::from_json(&json).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(EngineConfig::from_json("{ not json").is_err());
    }
}
