//! 資料品質發現（驗證結果）

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 問題類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueKind {
    /// 缺少 SAP 代碼
    MissingSapCode,
    /// 計劃與實際產量不一致
    InconsistentQuantity,
    /// 同批次重複日期
    DuplicateDate,
    /// 收得率超出 [0, 100]
    OutOfRangeYield,
    /// 模擬覆寫值被修正到合法範圍
    ClampedOverride,
}

impl IssueKind {
    /// 是否計入「缺漏項目」報告
    pub fn is_missing_item(&self) -> bool {
        matches!(self, IssueKind::MissingSapCode | IssueKind::InconsistentQuantity)
    }
}

/// 嚴重度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// 警告：記錄保留
    Warning,
    /// 阻擋：記錄排除於彙總之外
    Blocking,
}

/// 記錄參照（批次內序號 + 記錄ID）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub index: usize,
    pub id: Uuid,
}

/// 驗證問題
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// 來源記錄（模擬覆寫的修正沒有來源記錄）
    pub record_ref: Option<RecordRef>,

    /// 相關日期
    pub date: Option<NaiveDate>,

    /// 問題類型
    pub kind: IssueKind,

    /// 嚴重度
    pub severity: Severity,

    /// 說明
    pub message: String,
}

impl ValidationIssue {
    /// 創建針對單筆記錄的問題
    pub fn for_record(
        record_ref: RecordRef,
        date: NaiveDate,
        kind: IssueKind,
        severity: Severity,
        message: String,
    ) -> Self {
        Self {
            record_ref: Some(record_ref),
            date: Some(date),
            kind,
            severity,
            message,
        }
    }

    /// 創建模擬覆寫修正的提示
    pub fn clamped_override(message: String) -> Self {
        Self {
            record_ref: None,
            date: None,
            kind: IssueKind::ClampedOverride,
            severity: Severity::Warning,
            message,
        }
    }

    /// 是否為阻擋級
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}
