//! 計劃訂單模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ProductionRecord;

/// 計劃訂單（PCP 排程中尚未執行的產量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedOrder {
    /// 計劃訂單ID
    pub id: Uuid,

    /// 計劃生產日期
    pub date: NaiveDate,

    /// 計劃產量（t）
    pub planned_volume: Decimal,

    /// SAP 物料代碼
    pub sap_code: Option<String>,
}

impl PlannedOrder {
    /// 創建新的計劃訂單
    pub fn new(date: NaiveDate, planned_volume: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            planned_volume,
            sap_code: None,
        }
    }

    /// 建構器模式：設置 SAP 代碼
    pub fn with_sap_code(mut self, sap_code: impl Into<String>) -> Self {
        self.sap_code = Some(sap_code.into());
        self
    }

    /// 建構器模式：沿用既有ID
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// 從生產記錄擷取計劃訂單
    ///
    /// 只取有計劃產量的記錄；沿用記錄ID，方便追溯回原始列。
    pub fn from_records(records: &[ProductionRecord]) -> Vec<PlannedOrder> {
        let mut orders: Vec<PlannedOrder> = records
            .iter()
            .filter_map(|record| {
                record.planned_volume.map(|volume| PlannedOrder {
                    id: record.id,
                    date: record.date,
                    planned_volume: volume,
                    sap_code: record.sap_code.clone(),
                })
            })
            .collect();

        orders.sort_by_key(|order| order.date);
        orders
    }
}
