//! # Tracko Calculation Engine
//!
//! 混合計算、單位換算、價格走勢、庫存投影與統計

pub mod blending;
pub mod conversion;
pub mod projection;
pub mod stats;
pub mod trend;

// Re-export 主要類型
pub use blending::{BlendCalculator, BlendLine, BlendResult, LotUsage};
pub use conversion::{OrderDerivation, KG_TO_LB};
pub use projection::StockProjector;
pub use stats::StatsCalculator;
pub use trend::TrendCalculator;

use serde::Serialize;

/// 計算警告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalcWarning {
    pub lot_id: Option<String>,
    pub message: String,
    pub severity: WarningSeverity,
}

impl CalcWarning {
    pub fn new(lot_id: Option<String>, message: String, severity: WarningSeverity) -> Self {
        Self {
            lot_id,
            message,
            severity,
        }
    }

    pub fn info(lot_id: Option<String>, message: String) -> Self {
        Self::new(lot_id, message, WarningSeverity::Info)
    }

    pub fn warning(lot_id: Option<String>, message: String) -> Self {
        Self::new(lot_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}
