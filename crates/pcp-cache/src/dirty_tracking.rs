//! 髒標記追蹤

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// 髒標記追蹤器
///
/// 實績編輯標記單日；計劃編輯標記某日以後的所有預測日。
#[derive(Debug, Default)]
pub struct DirtyTracker {
    dirty_days: BTreeSet<NaiveDate>,
    dirty_from: Option<NaiveDate>,
    full: bool,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記單日為髒
    pub fn mark_day(&mut self, date: NaiveDate) {
        self.dirty_days.insert(date);
    }

    /// 標記某日（含）以後的預測日為髒
    pub fn mark_from(&mut self, date: NaiveDate) {
        self.dirty_from = Some(self.dirty_from.map_or(date, |d| d.min(date)));
    }

    /// 標記需要全部重算
    pub fn mark_all(&mut self) {
        self.full = true;
    }

    /// 檢查某日是否為髒
    pub fn is_dirty(&self, date: NaiveDate) -> bool {
        self.full
            || self.dirty_days.contains(&date)
            || self.dirty_from.is_some_and(|from| date >= from)
    }

    pub fn needs_full_recompute(&self) -> bool {
        self.full
    }

    pub fn is_clean(&self) -> bool {
        !self.full && self.dirty_days.is_empty() && self.dirty_from.is_none()
    }

    /// 髒的單日
    pub fn dirty_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dirty_days.iter().copied()
    }

    /// 預測日的髒起點
    pub fn dirty_from(&self) -> Option<NaiveDate> {
        self.dirty_from
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_days.clear();
        self.dirty_from = None;
        self.full = false;
    }
}
