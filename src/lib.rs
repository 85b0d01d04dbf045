//! # Tracko
//!
//! 腰果/核桃貿易追蹤：訂單物流、價格紀錄、品質分析與混合計算。
//!
//! 各子 crate 的統一入口：
//!
//! - [`core`]：領域模型與格式化
//! - [`calc`]：混合計算、衍生欄位、趨勢與統計
//! - [`optimizer`]：混合情境規劃
//! - [`store`]：持久化與資料集合
//! - [`io`]：Excel 匯入與 CSV 匯出

pub use tracko_calc as calc;
pub use tracko_core as core;
pub use tracko_io as io;
pub use tracko_optimizer as optimizer;
pub use tracko_store as store;

pub use tracko_calc::{BlendCalculator, BlendResult};
pub use tracko_core::{BlendInput, Grade, Order, Stage, StockLot, TrackerConfig, TrackoError};
pub use tracko_optimizer::{BlendConstraints, ScenarioPlanner};
pub use tracko_store::{FileStorage, MemoryStorage, TrackerStore};
