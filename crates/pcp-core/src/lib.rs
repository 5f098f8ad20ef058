//! # PCP Core
//!
//! 核心資料模型與類型定義

pub mod calendar;
pub mod config;
pub mod cost_config;
pub mod issue;
pub mod plan;
pub mod record;
pub mod shear;

// Re-export 主要類型
pub use calendar::WorkCalendar;
pub use config::{ConsumptionTargets, EngineConfig, ProjectionRates};
pub use cost_config::{CostConfigStore, UnitCostConfig};
pub use issue::{IssueKind, RecordRef, Severity, ValidationIssue};
pub use plan::PlannedOrder;
pub use record::{ProductionRecord, RecordSource};
pub use shear::{CutMode, ShearLossModel};

use chrono::NaiveDate;

/// PCP 錯誤類型
///
/// 只涵蓋呼叫端可控制的契約違反與配置拒絕；資料品質問題以 [`ValidationIssue`] 回報。
#[derive(Debug, thiserror::Error)]
pub enum PcpError {
    #[error("成本配置被拒絕: {0}")]
    ConfigurationRejected(String),

    #[error("無效的日期區間: {start} > {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("無效的預測期間: {0}")]
    InvalidPeriod(String),

    #[error("無效的輸入: {0}")]
    InvalidInput(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PcpError>;

/// 日期區間（含頭尾）
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// 創建日期區間，起日晚於迄日時回傳錯誤
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(PcpError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// 整個月份
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| PcpError::InvalidPeriod(format!("{}-{:02}", year, month)))?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next_month
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| PcpError::InvalidPeriod(format!("{}-{:02}", year, month)))?;
        Ok(Self { start, end })
    }

    /// 日期是否在區間內
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// 區間天數
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_range_is_error() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        assert!(matches!(
            DateRange::new(start, end),
            Err(PcpError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_month_range() {
        let february = DateRange::month(2026, 2).unwrap();
        assert_eq!(february.end, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert_eq!(february.num_days(), 28);

        let december = DateRange::month(2026, 12).unwrap();
        assert_eq!(december.end, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());

        assert!(DateRange::month(2026, 13).is_err());
    }

    #[test]
    fn test_contains() {
        let range = DateRange::month(2026, 2).unwrap();
        assert!(range.contains(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
    }
}
