//! 儲存層錯誤

use tracko_core::TrackoError;

/// 儲存層錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("讀寫檔案失敗: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化失敗: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] TrackoError),

    #[error("無效的儲存鍵: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
