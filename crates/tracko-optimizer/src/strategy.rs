//! 批次優先順序策略

use serde::Serialize;
use std::fmt;
use tracko_core::StockLot;

/// 選擇主批次的優先順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LotPolicy {
    /// 庫存量最大者優先
    HighestStockFirst,
    /// 依使用者輸入順序
    UserPriority,
    /// 粒徑最小者優先
    LowCaliberFirst,
    /// 破損率最低者優先
    LowBreakageFirst,
    /// 粒徑最大者優先
    HighCaliberFirst,
}

impl LotPolicy {
    /// 全部策略（情境編號順序）
    pub const ALL: [LotPolicy; 5] = [
        LotPolicy::HighestStockFirst,
        LotPolicy::UserPriority,
        LotPolicy::LowCaliberFirst,
        LotPolicy::LowBreakageFirst,
        LotPolicy::HighCaliberFirst,
    ];

    /// 情境顯示名稱
    pub fn label(&self) -> &'static str {
        match self {
            LotPolicy::HighestStockFirst => "En Yüksek Stok İlk",
            LotPolicy::UserPriority => "Kullanıcı Önceliği",
            LotPolicy::LowCaliberFirst => "Düşük Kalibre İlk",
            LotPolicy::LowBreakageFirst => "Düşük Şak+Kırık İlk",
            LotPolicy::HighCaliberFirst => "Yüksek Kalibre İlk",
        }
    }

    /// 依策略排序後的批次索引（穩定排序，同值保留輸入順序）
    pub fn order(&self, lots: &[StockLot]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..lots.len()).collect();
        match self {
            LotPolicy::HighestStockFirst => {
                indices.sort_by(|&a, &b| lots[b].available_kg.cmp(&lots[a].available_kg))
            }
            LotPolicy::UserPriority => {}
            LotPolicy::LowCaliberFirst => indices.sort_by(|&a, &b| lots[a].caliber.cmp(&lots[b].caliber)),
            LotPolicy::LowBreakageFirst => {
                indices.sort_by(|&a, &b| lots[a].breakage_percent.cmp(&lots[b].breakage_percent))
            }
            LotPolicy::HighCaliberFirst => indices.sort_by(|&a, &b| lots[b].caliber.cmp(&lots[a].caliber)),
        }
        indices
    }
}

impl fmt::Display for LotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
