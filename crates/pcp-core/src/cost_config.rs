//! 單位成本配置與配置存放區

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{PcpError, Result};

/// 單位成本配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCostConfig {
    /// 天然氣單價（R$/m³）
    pub gas_price_per_unit: Decimal,

    /// 電力單價（R$/kWh）
    pub energy_price_per_unit: Decimal,

    /// 金屬料單價（R$/t）
    pub metallic_charge_price_per_ton: Decimal,

    /// 生效日
    pub effective_from: NaiveDate,
}

impl UnitCostConfig {
    /// 創建新的成本配置（不做檢查，存入時才驗證）
    pub fn new(
        gas_price_per_unit: Decimal,
        energy_price_per_unit: Decimal,
        metallic_charge_price_per_ton: Decimal,
        effective_from: NaiveDate,
    ) -> Self {
        Self {
            gas_price_per_unit,
            energy_price_per_unit,
            metallic_charge_price_per_ton,
            effective_from,
        }
    }

    /// 從表單文字建立配置，非數值直接拒絕
    pub fn parse(gas: &str, energy: &str, metallic: &str, effective_from: NaiveDate) -> Result<Self> {
        Ok(Self::new(
            parse_price("gás", gas)?,
            parse_price("energia", energy)?,
            parse_price("carga metálica", metallic)?,
            effective_from,
        ))
    }

    /// 檢查所有單價非負
    pub fn validate(&self) -> Result<()> {
        let prices = [
            ("gás", self.gas_price_per_unit),
            ("energia", self.energy_price_per_unit),
            ("carga metálica", self.metallic_charge_price_per_ton),
        ];

        for (field, price) in prices {
            if price < Decimal::ZERO {
                return Err(PcpError::ConfigurationRejected(format!(
                    "{} 單價不可為負: {}",
                    field, price
                )));
            }
        }

        Ok(())
    }
}

fn parse_price(field: &str, raw: &str) -> Result<Decimal> {
    let cleaned = raw.trim().replace(',', ".");
    Decimal::from_str(&cleaned).map_err(|_| {
        PcpError::ConfigurationRejected(format!("{} 單價不是數值: {:?}", field, raw))
    })
}

/// 成本配置存放區
///
/// 任一時間只有一份「生效中」配置。儲存是整份取代：驗證失敗時原配置完全不變。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfigStore {
    active: UnitCostConfig,
    history: Vec<UnitCostConfig>,
}

impl CostConfigStore {
    /// 以初始配置創建存放區
    pub fn new(initial: UnitCostConfig) -> Result<Self> {
        initial.validate()?;
        Ok(Self {
            active: initial,
            history: Vec::new(),
        })
    }

    /// 目前生效的配置
    pub fn active(&self) -> &UnitCostConfig {
        &self.active
    }

    /// 已被取代的配置（依儲存順序）
    pub fn history(&self) -> &[UnitCostConfig] {
        &self.history
    }

    /// 儲存新配置（整份取代）
    ///
    /// 與生效中配置完全相同時不產生歷史記錄，重複儲存結果一致。
    pub fn save(&mut self, candidate: UnitCostConfig) -> Result<&UnitCostConfig> {
        if let Err(err) = candidate.validate() {
            tracing::warn!("成本配置被拒絕，保留原配置: {}", err);
            return Err(err);
        }

        if candidate != self.active {
            let previous = std::mem::replace(&mut self.active, candidate);
            self.history.push(previous);
            tracing::info!(
                "成本配置已更新：gás {} / energia {} / carga {}",
                self.active.gas_price_per_unit,
                self.active.energy_price_per_unit,
                self.active.metallic_charge_price_per_ton
            );
        }

        Ok(&self.active)
    }

    /// 取得某日生效的配置
    ///
    /// 在所有配置中取 `effective_from <= date` 且最晚生效者；
    /// 生效日相同時以較晚儲存者為準。都不符合時回傳最早的配置。
    pub fn active_at(&self, date: NaiveDate) -> &UnitCostConfig {
        let all = || self.history.iter().chain(std::iter::once(&self.active));

        let mut best: Option<&UnitCostConfig> = None;
        for config in all() {
            if config.effective_from <= date
                && best.map_or(true, |b| config.effective_from >= b.effective_from)
            {
                best = Some(config);
            }
        }

        best.or_else(|| all().min_by_key(|c| c.effective_from))
            .unwrap_or(&self.active)
    }

    /// 輸出快照（交給持久化服務）
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 從快照還原，並重新驗證生效中配置
    pub fn from_json(json: &str) -> Result<Self> {
        let store: CostConfigStore = serde_json::from_str(json)?;
        store.active.validate()?;
        Ok(store)
    }
}
