//! 髒標記追蹤

use std::collections::HashSet;
use std::fmt;

/// 持久化集合（每個集合對應一個儲存鍵）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Orders,
    Analyses,
    ExitAnalyses,
    Prices,
    Freight,
    Blends,
}

impl CollectionKey {
    /// 全部集合（固定順序）
    pub const ALL: [CollectionKey; 6] = [
        CollectionKey::Orders,
        CollectionKey::Analyses,
        CollectionKey::ExitAnalyses,
        CollectionKey::Prices,
        CollectionKey::Freight,
        CollectionKey::Blends,
    ];

    /// 儲存鍵
    pub fn key(&self) -> &'static str {
        match self {
            CollectionKey::Orders => "tracko_orders",
            CollectionKey::Analyses => "tracko_analyses",
            CollectionKey::ExitAnalyses => "tracko_exit_analyses",
            CollectionKey::Prices => "tracko_prices",
            CollectionKey::Freight => "tracko_freight",
            CollectionKey::Blends => "tracko_blends",
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 髒標記追蹤器：記錄上次儲存後有變動的集合
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    dirty_collections: HashSet<CollectionKey>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self {
            dirty_collections: HashSet::new(),
        }
    }

    /// 標記集合為髒
    pub fn mark_dirty(&mut self, key: CollectionKey) {
        self.dirty_collections.insert(key);
    }

    /// 檢查集合是否為髒
    pub fn is_dirty(&self, key: CollectionKey) -> bool {
        self.dirty_collections.contains(&key)
    }

    /// 是否沒有任何變動
    pub fn is_clean(&self) -> bool {
        self.dirty_collections.is_empty()
    }

    /// 清除單一集合的髒標記
    pub fn mark_clean(&mut self, key: CollectionKey) {
        self.dirty_collections.remove(&key);
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_collections.clear();
    }

    /// 獲取所有髒集合（依 `CollectionKey::ALL` 順序）
    pub fn dirty_collections(&self) -> Vec<CollectionKey> {
        CollectionKey::ALL
            .into_iter()
            .filter(|key| self.dirty_collections.contains(key))
            .collect()
    }
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_tracking() {
        let mut tracker = DirtyTracker::new();
        assert!(tracker.is_clean());

        tracker.mark_dirty(CollectionKey::Prices);
        tracker.mark_dirty(CollectionKey::Orders);
        tracker.mark_dirty(CollectionKey::Prices);

        assert!(tracker.is_dirty(CollectionKey::Orders));
        assert!(!tracker.is_dirty(CollectionKey::Blends));
        assert_eq!(
            tracker.dirty_collections(),
            vec![CollectionKey::Orders, CollectionKey::Prices]
        );

        tracker.mark_clean(CollectionKey::Orders);
        assert_eq!(tracker.dirty_collections(), vec![CollectionKey::Prices]);

        tracker.clear();
        assert!(tracker.is_clean());
    }

    #[test]
    fn test_collection_keys() {
        assert_eq!(CollectionKey::ExitAnalyses.key(), "tracko_exit_analyses");
        assert_eq!(CollectionKey::Freight.to_string(), "tracko_freight");
    }
}
