//! 剪切損耗模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 精整線切斷模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutMode {
    /// 飛剪（Navalha）：每刀 0.250 m
    Navalha,
    /// 鋸切（Serra）：每刀 0.500 m
    Serra,
}

impl CutMode {
    /// 每刀損耗長度（m，三位小數）
    pub fn loss_per_cut_meters(&self) -> Decimal {
        match self {
            CutMode::Navalha => Decimal::new(250, 3),
            CutMode::Serra => Decimal::new(500, 3),
        }
    }
}

/// 剪切損耗模型
///
/// 每刀損耗只由模式決定，不另外儲存，切換模式後的計算一定使用新模式的常數。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShearLossModel {
    /// 切斷模式
    pub mode: CutMode,

    /// 刀數
    pub cuts_count: u32,
}

impl ShearLossModel {
    /// 創建新的剪切損耗模型
    pub fn new(mode: CutMode, cuts_count: u32) -> Self {
        Self { mode, cuts_count }
    }

    /// 建構器模式：切換模式
    pub fn with_mode(mut self, mode: CutMode) -> Self {
        self.mode = mode;
        self
    }

    /// 每刀損耗長度
    pub fn loss_per_cut_meters(&self) -> Decimal {
        self.mode.loss_per_cut_meters()
    }

    /// 總損耗長度 = 刀數 × 每刀損耗（精確到三位小數）
    pub fn total_loss_meters(&self) -> Decimal {
        let mut total = Decimal::from(self.cuts_count) * self.loss_per_cut_meters();
        total.rescale(3);
        total
    }
}
