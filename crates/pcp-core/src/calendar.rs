//! 工作日曆模型

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// 工作日曆
///
/// 用於決定預測期有哪些生產日，以及模擬延長剩餘工作天時往後補哪幾天。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkCalendar {
    /// 工作日（週一到週日，true表示工作日）
    /// 索引 0 = 週一, 1 = 週二, ..., 6 = 週日
    pub working_days: [bool; 7],

    /// 停機日（節假日、計劃性大修）
    pub holidays: Vec<NaiveDate>,

    /// 日曆ID
    pub calendar_id: String,
}

impl WorkCalendar {
    /// 創建新的工作日曆（預設週一到週五為工作日）
    pub fn new(calendar_id: String) -> Self {
        Self {
            working_days: [true, true, true, true, true, false, false],
            calendar_id,
            holidays: Vec::new(),
        }
    }

    /// 創建連續生產日曆（軋線 24/7）
    pub fn continuous(calendar_id: String) -> Self {
        Self {
            working_days: [true; 7],
            calendar_id,
            holidays: Vec::new(),
        }
    }

    /// 建構器模式：設置工作日
    pub fn with_working_days(mut self, working_days: [bool; 7]) -> Self {
        self.working_days = working_days;
        self
    }

    /// 建構器模式：設置停機日
    pub fn with_holidays(mut self, holidays: Vec<NaiveDate>) -> Self {
        self.holidays = holidays;
        self
    }

    /// 檢查是否為工作日
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        if self.holidays.contains(&date) {
            return false;
        }

        let weekday_index = date.weekday().num_days_from_monday() as usize;
        self.working_days[weekday_index]
    }

    /// 區間內的工作日（含頭尾）
    pub fn working_days_in(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_working_day(*d))
            .collect()
    }
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::continuous("DEFAULT".to_string())
    }
}
