//! 生產日報記錄模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 記錄來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordSource {
    /// 由匯入服務產生（試算表）
    Imported,
    /// 人工補登
    Manual,
}

/// 生產記錄（單日）
///
/// 數值欄位皆為可空：匯入服務無法解析的欄位以 `None` 表示，
/// 而不是 0，讓平均值計算可以排除缺值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// 記錄ID（重新匯入時沿用，以取代舊記錄）
    pub id: Uuid,

    /// 生產日期
    pub date: NaiveDate,

    /// 計劃產量（t）
    pub planned_volume: Option<Decimal>,

    /// 實際產量（t）
    pub executed_volume: Option<Decimal>,

    /// 天然氣耗用（m³）
    pub gas_consumption: Option<Decimal>,

    /// 電力耗用（kWh）
    pub energy_consumption: Option<Decimal>,

    /// 金屬收得率（%，0-100）
    pub metallic_yield_pct: Option<Decimal>,

    /// 換線時間（分鐘）
    pub setup_time_minutes: Option<Decimal>,

    /// SAP 物料代碼
    pub sap_code: Option<String>,

    /// 來源
    pub source: RecordSource,
}

impl ProductionRecord {
    /// 創建新的生產記錄（所有數值欄位為空）
    pub fn new(date: NaiveDate, source: RecordSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            planned_volume: None,
            executed_volume: None,
            gas_consumption: None,
            energy_consumption: None,
            metallic_yield_pct: None,
            setup_time_minutes: None,
            sap_code: None,
            source,
        }
    }

    /// 建構器模式：設置計劃產量
    pub fn with_planned_volume(mut self, volume: Decimal) -> Self {
        self.planned_volume = Some(volume);
        self
    }

    /// 建構器模式：設置實際產量
    pub fn with_executed_volume(mut self, volume: Decimal) -> Self {
        self.executed_volume = Some(volume);
        self
    }

    /// 建構器模式：設置天然氣耗用
    pub fn with_gas_consumption(mut self, gas: Decimal) -> Self {
        self.gas_consumption = Some(gas);
        self
    }

    /// 建構器模式：設置電力耗用
    pub fn with_energy_consumption(mut self, energy: Decimal) -> Self {
        self.energy_consumption = Some(energy);
        self
    }

    /// 建構器模式：設置金屬收得率
    pub fn with_metallic_yield_pct(mut self, yield_pct: Decimal) -> Self {
        self.metallic_yield_pct = Some(yield_pct);
        self
    }

    /// 建構器模式：設置換線時間
    pub fn with_setup_time_minutes(mut self, minutes: Decimal) -> Self {
        self.setup_time_minutes = Some(minutes);
        self
    }

    /// 建構器模式：設置 SAP 代碼
    pub fn with_sap_code(mut self, sap_code: impl Into<String>) -> Self {
        self.sap_code = Some(sap_code.into());
        self
    }

    /// 建構器模式：沿用既有ID（重新匯入取代舊記錄）
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// SAP 代碼是否缺失（空白字串視同缺失）
    pub fn is_missing_sap_code(&self) -> bool {
        self.sap_code
            .as_deref()
            .map(|code| code.trim().is_empty())
            .unwrap_or(true)
    }

    /// 是否有實際產量
    pub fn is_executed(&self) -> bool {
        self.executed_volume.is_some()
    }

    /// 收得率是否落在 [0, 100]（缺值視為合法）
    pub fn has_valid_yield(&self) -> bool {
        match self.metallic_yield_pct {
            Some(pct) => pct >= Decimal::ZERO && pct <= Decimal::ONE_HUNDRED,
            None => true,
        }
    }
}
