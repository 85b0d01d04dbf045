//! 混合（拼配）相關模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 可用於混合的庫存批次（由倉庫訂單投影而來，唯讀）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLot {
    /// 批次ID（即訂單ID）
    pub id: String,

    /// 合約號
    pub contract_no: String,

    /// 卡車號
    pub truck_no: String,

    /// 可用數量（公斤）
    pub available_kg: Decimal,

    /// 粒徑
    pub caliber: Decimal,

    /// 破損率（半粒 + 碎粒，%）
    pub breakage_percent: Decimal,
}

impl StockLot {
    /// 創建新的庫存批次
    pub fn new(id: String, available_kg: Decimal, caliber: Decimal, breakage_percent: Decimal) -> Self {
        Self {
            id,
            contract_no: String::new(),
            truck_no: String::new(),
            available_kg,
            caliber,
            breakage_percent,
        }
    }

    /// 建構器模式：設置合約號與卡車號
    pub fn with_reference(mut self, contract_no: String, truck_no: String) -> Self {
        self.contract_no = contract_no;
        self.truck_no = truck_no;
        self
    }
}

/// 混合輸入列：批次參照 + 比例（%）
///
/// `lot_id` 為 `None` 代表尚未選擇批次，計算前會被略過。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendInput {
    pub lot_id: Option<String>,
    pub ratio: Decimal,
}

impl BlendInput {
    pub fn new(lot_id: impl Into<String>, ratio: Decimal) -> Self {
        Self {
            lot_id: Some(lot_id.into()),
            ratio,
        }
    }

    /// 尚未選擇批次的輸入列
    pub fn unselected(ratio: Decimal) -> Self {
        Self { lot_id: None, ratio }
    }
}

/// 混合歷史明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendHistoryItem {
    /// 訂單ID
    pub order_id: String,

    /// 合約號
    pub contract_no: String,

    /// 比例（%）
    pub ratio: Decimal,

    /// 使用量（公斤）
    pub kg: Decimal,
}

/// 已確認的混合紀錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendHistory {
    /// 紀錄ID
    pub id: String,

    /// 日期
    pub date: NaiveDate,

    /// 明細
    pub items: Vec<BlendHistoryItem>,

    /// 產出總量（公斤）
    pub total_kg: Decimal,

    /// 參與批次的剩餘比例（%）
    pub waste_percent: Decimal,

    /// 加權粒徑
    pub caliber: Decimal,

    /// 加權破損率
    pub broken_total: Decimal,

    /// 備註
    #[serde(default)]
    pub note: String,
}

impl BlendHistory {
    pub fn new(date: NaiveDate, items: Vec<BlendHistoryItem>) -> Self {
        let total_kg = items.iter().map(|item| item.kg).sum();
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            items,
            total_kg,
            waste_percent: Decimal::ZERO,
            caliber: Decimal::ZERO,
            broken_total: Decimal::ZERO,
            note: String::new(),
        }
    }

    /// 建構器模式：設置品質結果
    pub fn with_quality(mut self, caliber: Decimal, broken_total: Decimal) -> Self {
        self.caliber = caliber;
        self.broken_total = broken_total;
        self
    }

    /// 建構器模式：設置剩餘比例
    pub fn with_waste_percent(mut self, waste_percent: Decimal) -> Self {
        self.waste_percent = waste_percent;
        self
    }

    /// 建構器模式：設置備註
    pub fn with_note(mut self, note: String) -> Self {
        self.note = note;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_history_totals_items() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let history = BlendHistory::new(
            date,
            vec![
                BlendHistoryItem {
                    order_id: "1".to_string(),
                    contract_no: "CONT-1".to_string(),
                    ratio: Decimal::from(60),
                    kg: Decimal::from(600),
                },
                BlendHistoryItem {
                    order_id: "2".to_string(),
                    contract_no: "CONT-2".to_string(),
                    ratio: Decimal::from(40),
                    kg: Decimal::from(400),
                },
            ],
        )
        .with_note("test".to_string());

        assert_eq!(history.total_kg, Decimal::from(1000));
        assert_eq!(history.note, "test");
    }

    #[test]
    fn test_unselected_input() {
        let input = BlendInput::unselected(Decimal::from(50));
        assert!(input.lot_id.is_none());
    }
}
