//! 匯入/匯出錯誤類型

use std::fmt;
use thiserror::Error;

/// 匯入/匯出錯誤
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("檔案不存在: {0}")]
    FileNotFound(String),

    #[error("檔案格式不支援: {0}（僅支援 .xlsx/.xls/.xlsm/.ods）")]
    UnsupportedFormat(String),

    #[error("Excel 解析失敗: {0}")]
    Excel(#[from] calamine::Error),

    #[error("CSV 寫入失敗: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO 錯誤: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;

/// 單列資料的問題（不中斷整批匯入）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 工作表名稱
    pub sheet: String,
    /// 試算表列號（標題列為第 1 列）
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn new(sheet: &str, row: usize, message: String) -> Self {
        Self {
            sheet: sheet.to_string(),
            row,
            message,
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 第 {} 列: {}", self.sheet, self.row, self.message)
    }
}
