//! # Tracko Core
//!
//! 核心資料模型、設定與格式化工具

pub mod analysis;
pub mod blend;
pub mod config;
pub mod format;
pub mod market;
pub mod order;

// Re-export 主要類型
pub use analysis::{ExitAnalysis, QualityAnalysis};
pub use blend::{BlendHistory, BlendHistoryItem, BlendInput, StockLot};
pub use config::{GradeQuality, TrackerConfig};
pub use market::{FreightRecord, PriceRecord, PriceTrend};
pub use order::{
    AntrepoStatus, ContainerType, ContractFile, Grade, Order, PackagingType, PaymentStatus, Stage,
};

/// Tracko 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum TrackoError {
    #[error("找不到訂單: {0}")]
    OrderNotFound(String),

    #[error("找不到紀錄: {0}")]
    RecordNotFound(String),

    #[error("混合比例不可為負數: 批次 {lot_id} 比例 {ratio}")]
    NegativeRatio {
        lot_id: String,
        ratio: rust_decimal::Decimal,
    },

    #[error("同一混合中重複選擇批次: {0}")]
    DuplicateLot(String),

    #[error("混合比例總和必須為 100，目前為 {0}")]
    InvalidBlend(rust_decimal::Decimal),

    #[error("混合產量為 0，無法儲存")]
    EmptyBlend,

    #[error("無效的混合條件: {0}")]
    InvalidConstraint(String),

    #[error("無法辨識的值: {0}")]
    UnknownValue(String),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TrackoError>;
