//! 批次驗證

use chrono::NaiveDate;
use pcp_core::{
    EngineConfig, IssueKind, ProductionRecord, RecordRef, Severity, ValidationIssue,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

/// 驗證結果
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// 可進入彙總的記錄（保持原順序）
    pub valid_records: Vec<ProductionRecord>,

    /// 所有問題（依記錄順序）
    pub issues: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    /// 缺漏項目報告
    pub fn missing_items_report(&self) -> MissingItemsReport {
        MissingItemsReport::from_issues(&self.issues)
    }

    /// 阻擋級問題數
    pub fn blocking_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_blocking()).count()
    }
}

/// 缺漏項目報告（缺 SAP 代碼、計劃／實際不一致）
#[derive(Debug, Clone, Serialize)]
pub struct MissingItemsReport {
    pub items: Vec<ValidationIssue>,
    pub label: String,
}

impl MissingItemsReport {
    /// 從問題清單取出缺漏項目（保持順序）
    pub fn from_issues(issues: &[ValidationIssue]) -> Self {
        let items: Vec<ValidationIssue> = issues
            .iter()
            .filter(|issue| issue.kind.is_missing_item())
            .cloned()
            .collect();
        let label = format!("{} itens sem meta encontrada", items.len());
        Self { items, label }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// 批次驗證器
pub struct Validator;

impl Validator {
    /// 驗證一個匯入批次
    ///
    /// 先逐筆檢查，再做跨記錄的重複日期檢查。已因收得率超限排除的記錄
    /// 不佔用日期；其餘記錄中第二次以後出現的日期被排除。
    pub fn validate(records: &[ProductionRecord], config: &EngineConfig) -> ValidationOutcome {
        tracing::debug!("驗證批次：{} 筆記錄", records.len());

        let mut issues = Vec::new();
        let mut valid_records = Vec::new();
        let mut seen_dates: HashSet<NaiveDate> = HashSet::new();

        for (index, record) in records.iter().enumerate() {
            let record_ref = RecordRef {
                index,
                id: record.id,
            };
            let mut excluded = false;

            if record.is_missing_sap_code() {
                issues.push(ValidationIssue::for_record(
                    record_ref,
                    record.date,
                    IssueKind::MissingSapCode,
                    Severity::Warning,
                    format!("{} 缺少 SAP 代碼", record.date),
                ));
            }

            if let Some(message) = Self::quantity_inconsistency(record, config) {
                issues.push(ValidationIssue::for_record(
                    record_ref,
                    record.date,
                    IssueKind::InconsistentQuantity,
                    Severity::Warning,
                    message,
                ));
            }

            if !record.has_valid_yield() {
                issues.push(ValidationIssue::for_record(
                    record_ref,
                    record.date,
                    IssueKind::OutOfRangeYield,
                    Severity::Blocking,
                    format!(
                        "{} 收得率超出範圍: {}",
                        record.date,
                        record.metallic_yield_pct.unwrap_or_default()
                    ),
                ));
                excluded = true;
            }

            if !excluded && !seen_dates.insert(record.date) {
                issues.push(ValidationIssue::for_record(
                    record_ref,
                    record.date,
                    IssueKind::DuplicateDate,
                    Severity::Blocking,
                    format!("{} 日期重複", record.date),
                ));
                excluded = true;
            }

            if !excluded {
                valid_records.push(record.clone());
            }
        }

        if !issues.is_empty() {
            tracing::warn!(
                "驗證發現 {} 個問題，排除 {} 筆記錄",
                issues.len(),
                records.len() - valid_records.len()
            );
        }

        ValidationOutcome {
            valid_records,
            issues,
        }
    }

    /// 計劃／實際產量一致性
    ///
    /// 只有一邊有值即不一致；兩邊都有值時，實際產量超過下限且偏差超過門檻也算不一致。
    fn quantity_inconsistency(record: &ProductionRecord, config: &EngineConfig) -> Option<String> {
        match (record.planned_volume, record.executed_volume) {
            (Some(_), None) => Some(format!("{} 有計劃產量但無實際產量", record.date)),
            (None, Some(_)) => Some(format!("{} 有實際產量但無計劃產量", record.date)),
            (Some(planned), Some(executed)) => {
                let threshold = config.divergence_threshold_pct?;
                if executed <= config.divergence_min_executed || planned <= Decimal::ZERO {
                    return None;
                }
                let diff_pct = (executed - planned).abs() / planned * Decimal::ONE_HUNDRED;
                (diff_pct > threshold).then(|| {
                    format!(
                        "{} 偏差 {}%（實際 {} / 計劃 {}）",
                        record.date,
                        diff_pct.round_dp(0),
                        executed,
                        planned
                    )
                })
            }
            (None, None) => None,
        }
    }
}
