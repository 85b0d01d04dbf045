//! 市場價格與運費紀錄

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order::Grade;

/// 價格走勢
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTrend {
    Up,
    Down,
    #[default]
    Stable,
}

impl PriceTrend {
    /// 依價差判斷走勢
    pub fn from_diff(diff: Decimal) -> Self {
        if diff > Decimal::ZERO {
            PriceTrend::Up
        } else if diff < Decimal::ZERO {
            PriceTrend::Down
        } else {
            PriceTrend::Stable
        }
    }

    /// CSV 匯出使用的狀態文字
    pub fn csv_label(&self) -> &'static str {
        match self {
            PriceTrend::Up => "Artis",
            PriceTrend::Down => "Azalis",
            PriceTrend::Stable => "Stabil",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            PriceTrend::Up => "↑",
            PriceTrend::Down => "↓",
            PriceTrend::Stable => "-",
        }
    }
}

/// 等級價格紀錄（$/lb）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRecord {
    /// 紀錄ID
    pub id: String,

    /// 日期
    pub date: NaiveDate,

    /// 等級
    pub grade: Grade,

    /// 價格
    pub price: Decimal,

    /// 與前一筆的價差文字（例如 "+0,05"）
    #[serde(default)]
    pub change: String,

    /// 走勢
    #[serde(default)]
    pub trend: PriceTrend,
}

impl PriceRecord {
    /// 創建新的價格紀錄（走勢預設為持平）
    pub fn new(date: NaiveDate, grade: Grade, price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            grade,
            price,
            change: String::new(),
            trend: PriceTrend::Stable,
        }
    }

    /// 建構器模式：設置走勢與價差文字
    pub fn with_trend(mut self, trend: PriceTrend, change: String) -> Self {
        self.trend = trend;
        self.change = change;
        self
    }
}

/// 運費紀錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreightRecord {
    /// 紀錄ID
    pub id: String,

    /// 日期
    pub date: NaiveDate,

    /// 運費
    pub price: Decimal,

    /// 與前一筆的價差文字
    #[serde(default)]
    pub change: String,

    /// 走勢
    #[serde(default)]
    pub trend: PriceTrend,
}

impl FreightRecord {
    pub fn new(date: NaiveDate, price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            price,
            change: String::new(),
            trend: PriceTrend::Stable,
        }
    }

    pub fn with_trend(mut self, trend: PriceTrend, change: String) -> Self {
        self.trend = trend;
        self.change = change;
        self
    }
}
