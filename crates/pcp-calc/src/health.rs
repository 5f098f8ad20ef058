//! 資料健康度評分

use pcp_core::{EngineConfig, ProductionRecord};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// 健康度等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthGrade {
    /// ≥ 90
    Excellent,
    /// ≥ 70
    Attention,
    Critical,
}

impl HealthGrade {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => HealthGrade::Excellent,
            70..=89 => HealthGrade::Attention,
            _ => HealthGrade::Critical,
        }
    }
}

/// 扣分原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthFactor {
    MissingSapCode,
    ZeroProduction,
    LongSetup,
}

/// 單項扣分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDeduction {
    pub factor: HealthFactor,
    /// 受影響記錄數
    pub count: usize,
    pub points: u32,
    pub message: String,
}

/// 健康度評分結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u32,
    pub grade: HealthGrade,
    pub deductions: Vec<HealthDeduction>,
}

/// 健康度評分器
pub struct DataHealth;

impl DataHealth {
    const MISSING_SAP_WEIGHT: i64 = 400;
    const MISSING_SAP_CAP: u32 = 60;
    const ZERO_PRODUCTION_WEIGHT: i64 = 100;
    const ZERO_PRODUCTION_CAP: u32 = 20;
    const LONG_SETUP_POINTS: u32 = 5;

    /// 從 100 分開始扣，最低 0 分；空批次為 100 分
    pub fn score(records: &[ProductionRecord], config: &EngineConfig) -> HealthScore {
        if records.is_empty() {
            return HealthScore {
                score: 100,
                grade: HealthGrade::Excellent,
                deductions: Vec::new(),
            };
        }

        let total = records.len();
        let mut deductions = Vec::new();

        let missing = records.iter().filter(|r| r.is_missing_sap_code()).count();
        if missing > 0 {
            deductions.push(HealthDeduction {
                factor: HealthFactor::MissingSapCode,
                count: missing,
                points: Self::proportional(missing, total, Self::MISSING_SAP_WEIGHT)
                    .min(Self::MISSING_SAP_CAP),
                message: format!("{} 筆記錄缺少 SAP 代碼", missing),
            });
        }

        let zero = records
            .iter()
            .filter(|r| r.executed_volume.map_or(true, |v| v <= Decimal::ZERO))
            .count();
        if zero > 0 {
            deductions.push(HealthDeduction {
                factor: HealthFactor::ZeroProduction,
                count: zero,
                points: Self::proportional(zero, total, Self::ZERO_PRODUCTION_WEIGHT)
                    .min(Self::ZERO_PRODUCTION_CAP),
                message: format!("{} 筆記錄產量為零", zero),
            });
        }

        let long_setup = records
            .iter()
            .filter(|r| {
                r.setup_time_minutes
                    .is_some_and(|m| m > config.long_setup_minutes)
            })
            .count();
        if long_setup > 0 {
            deductions.push(HealthDeduction {
                factor: HealthFactor::LongSetup,
                count: long_setup,
                points: Self::LONG_SETUP_POINTS,
                message: format!(
                    "{} 筆記錄換線超過 {} 分鐘",
                    long_setup, config.long_setup_minutes
                ),
            });
        }

        let deducted: u32 = deductions.iter().map(|d| d.points).sum();
        let score = 100u32.saturating_sub(deducted);

        if score < 70 {
            tracing::warn!("資料健康度 {}，扣分項 {}", score, deductions.len());
        }

        HealthScore {
            score,
            grade: HealthGrade::from_score(score),
            deductions,
        }
    }

    /// round(count / total × weight)，四捨五入
    fn proportional(count: usize, total: usize, weight: i64) -> u32 {
        let pct = Decimal::from(count) / Decimal::from(total);
        (pct * Decimal::from(weight))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pcp_core::RecordSource;
    use rstest::rstest;

    fn record(d: u32) -> ProductionRecord {
        ProductionRecord::new(
            NaiveDate::from_ymd_opt(2026, 2, d).unwrap(),
            RecordSource::Imported,
        )
        .with_executed_volume(Decimal::from(700))
        .with_setup_time_minutes(Decimal::from(60))
        .with_sap_code(format!("0001{:04}", d))
    }

    #[test]
    fn test_empty_batch_is_perfect() {
        let health = DataHealth::score(&[], &EngineConfig::new());
        assert_eq!(health.score, 100);
        assert_eq!(health.grade, HealthGrade::Excellent);
    }

    #[test]
    fn test_clean_batch() {
        let records: Vec<_> = (1..=20).map(record).collect();
        let health = DataHealth::score(&records, &EngineConfig::new());
        assert_eq!(health.score, 100);
        assert!(health.deductions.is_empty());
    }

    #[test]
    fn test_missing_sap_proportional() {
        // 20 筆中 1 筆缺代碼：5% × 400 = 20 分
        let mut records: Vec<_> = (1..=20).map(record).collect();
        records[0].sap_code = None;

        let health = DataHealth::score(&records, &EngineConfig::new());
        assert_eq!(health.score, 80);
        assert_eq!(health.grade, HealthGrade::Attention);
        assert_eq!(health.deductions[0].factor, HealthFactor::MissingSapCode);
    }

    #[test]
    fn test_deductions_are_capped() {
        let records: Vec<_> = (1..=10)
            .map(|d| {
                let mut r = record(d);
                r.sap_code = None;
                r.executed_volume = None;
                r.setup_time_minutes = Some(Decimal::from(700));
                r
            })
            .collect();

        let health = DataHealth::score(&records, &EngineConfig::new());
        // 60 + 20 + 5
        assert_eq!(health.score, 15);
        assert_eq!(health.grade, HealthGrade::Critical);
        assert_eq!(health.deductions.len(), 3);
    }

    #[test]
    fn test_long_setup_threshold_configurable() {
        let records = vec![record(1).with_setup_time_minutes(Decimal::from(300))];

        let default = DataHealth::score(&records, &EngineConfig::new());
        assert_eq!(default.score, 100);

        let strict = EngineConfig::new().with_long_setup_minutes(Decimal::from(240));
        assert_eq!(DataHealth::score(&records, &strict).score, 95);
    }

    #[rstest]
    #[case(100, HealthGrade::Excellent)]
    #[case(90, HealthGrade::Excellent)]
    #[case(89, HealthGrade::Attention)]
    #[case(70, HealthGrade::Attention)]
    #[case(69, HealthGrade::Critical)]
    #[case(0, HealthGrade::Critical)]
    fn test_grade_bands(#[case] score: u32, #[case] expected: HealthGrade) {
        assert_eq!(HealthGrade::from_score(score), expected);
    }
}
