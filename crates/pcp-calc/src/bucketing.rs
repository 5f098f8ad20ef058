//! 時間分桶

use crate::forecast::{DayContribution, DayPhase, PhaseTotals};
use chrono::{Datelike, Duration, NaiveDate};
use pcp_core::DateRange;
use serde::{Deserialize, Serialize};

/// 時間分桶策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketingStrategy {
    /// 每日分桶
    Daily,
    /// 每週分桶（週一開始）
    Weekly,
    /// 每月分桶
    Monthly,
}

/// 單一時間桶
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub executed: PhaseTotals,
    pub projected: PhaseTotals,
}

impl PeriodBucket {
    fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            executed: PhaseTotals::default(),
            projected: PhaseTotals::default(),
        }
    }

    /// 桶內合計
    pub fn total(&self) -> PhaseTotals {
        self.executed + self.projected
    }
}

/// 時間分桶計算器
pub struct BucketingCalculator;

impl BucketingCalculator {
    /// 依策略切出期間的時間桶（頭尾桶截在期間內）
    pub fn create_buckets(period: DateRange, strategy: BucketingStrategy) -> Vec<PeriodBucket> {
        let mut buckets = Vec::new();
        let mut current = period.start;

        while current <= period.end {
            let natural_end = match strategy {
                BucketingStrategy::Daily => Some(current),
                BucketingStrategy::Weekly => {
                    let to_sunday = 6 - i64::from(current.weekday().num_days_from_monday());
                    current.checked_add_signed(Duration::days(to_sunday))
                }
                BucketingStrategy::Monthly => Self::month_end(current),
            };
            let end = natural_end.map_or(period.end, |d| d.min(period.end));
            buckets.push(PeriodBucket::new(current, end));

            match end.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        buckets
    }

    /// 把日別貢獻放入時間桶，期間外的日子忽略
    pub fn bucket_days(
        days: &[DayContribution],
        period: DateRange,
        strategy: BucketingStrategy,
    ) -> Vec<PeriodBucket> {
        let mut buckets = Self::create_buckets(period, strategy);

        for day in days {
            let index = buckets.partition_point(|b| b.end < day.date);
            let Some(bucket) = buckets.get_mut(index) else {
                continue;
            };
            if day.date < bucket.start {
                continue;
            }
            match day.phase {
                DayPhase::Executed => bucket.executed.add_day(day),
                DayPhase::Projected => bucket.projected.add_day(day),
            }
        }

        buckets
    }

    fn month_end(date: NaiveDate) -> Option<NaiveDate> {
        let (year, month) = if date.month() == 12 {
            (date.year() + 1, 1)
        } else {
            (date.year(), date.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.pred_opt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcp_core::{ProjectionRates, UnitCostConfig};
    use rust_decimal::Decimal;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn test_create_buckets_daily() {
        let period = DateRange::new(date(2, 1), date(2, 5)).unwrap();
        let buckets = BucketingCalculator::create_buckets(period, BucketingStrategy::Daily);

        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets[0].start, date(2, 1));
        assert_eq!(buckets[4].end, date(2, 5));
    }

    #[test]
    fn test_weekly_buckets_clipped_to_period() {
        // 2026-02-01 是週日
        let period = DateRange::month(2026, 2).unwrap();
        let buckets = BucketingCalculator::create_buckets(period, BucketingStrategy::Weekly);

        assert_eq!(buckets.len(), 5);
        assert_eq!((buckets[0].start, buckets[0].end), (date(2, 1), date(2, 1)));
        assert_eq!((buckets[1].start, buckets[1].end), (date(2, 2), date(2, 8)));
        assert_eq!((buckets[4].start, buckets[4].end), (date(2, 23), date(3, 1).pred_opt().unwrap()));
    }

    #[test]
    fn test_monthly_buckets() {
        let period = DateRange::new(date(1, 15), date(3, 10)).unwrap();
        let buckets = BucketingCalculator::create_buckets(period, BucketingStrategy::Monthly);

        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].end, date(1, 31));
        assert_eq!(buckets[1].end, date(2, 28));
        assert_eq!(buckets[2].end, date(3, 10));
    }

    #[test]
    fn test_bucket_days_by_phase() {
        let prices = UnitCostConfig::new(Decimal::ONE, Decimal::ONE, Decimal::ONE, date(2, 1));
        let rates = ProjectionRates::default();
        let mut days: Vec<_> = (2..=4)
            .map(|d| DayContribution::projected(date(2, d), Decimal::from(100), &rates, &prices))
            .collect();
        days[0].phase = DayPhase::Executed;
        days.push(DayContribution::projected(date(3, 5), Decimal::from(100), &rates, &prices));

        let period = DateRange::month(2026, 2).unwrap();
        let buckets = BucketingCalculator::bucket_days(&days, period, BucketingStrategy::Weekly);

        assert_eq!(buckets[1].executed.volume, Decimal::from(100));
        assert_eq!(buckets[1].projected.volume, Decimal::from(200));
        assert_eq!(buckets[1].total().day_count, 3);
        let total: Decimal = buckets.iter().map(|b| b.total().volume).sum();
        assert_eq!(total, Decimal::from(300));
    }
}
