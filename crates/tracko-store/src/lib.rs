//! # Tracko Store
//!
//! 鍵值儲存、髒標記追蹤與追蹤器資料集合

pub mod dirty_tracking;
pub mod error;
pub mod model;
pub mod query;
pub mod storage;
pub mod tracker;

// Re-export 主要類型
pub use dirty_tracking::{CollectionKey, DirtyTracker};
pub use error::{Result, StoreError};
pub use model::{NewOrder, OrderPatch, StageDetails};
pub use query::{OrderQuery, OrderSort};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use tracker::TrackerStore;
