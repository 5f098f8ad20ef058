//! # PCP Optimizer
//!
//! 優化算法模組（鋼坯長度、冷床定尺）

pub mod bed;
pub mod billet;

// Re-export 主要類型
pub use bed::{BedOption, BedSelection, CoolingBedSelector};
pub use billet::{BilletLengthOptimizer, BilletPlan};

/// 優化結果
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult<T> {
    /// 是否可行
    pub feasible: bool,

    /// 優化後的方案
    pub solution: Option<T>,

    /// 優化信息
    pub messages: Vec<String>,
}

impl<T> OptimizationResult<T> {
    /// 創建可行的優化結果
    pub fn feasible(solution: T) -> Self {
        Self {
            feasible: true,
            solution: Some(solution),
            messages: Vec::new(),
        }
    }

    /// 創建不可行的優化結果
    pub fn infeasible(message: String) -> Self {
        tracing::debug!("不可行: {}", message);
        Self {
            feasible: false,
            solution: None,
            messages: vec![message],
        }
    }

    /// 添加信息
    pub fn with_message(mut self, message: String) -> Self {
        self.messages.push(message);
        self
    }
}
