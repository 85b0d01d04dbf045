//! 追蹤資料存放區
//!
//! 所有集合都保存在記憶體中，透過 [`TrackerStore::save`] 寫回儲存後端。

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracko_calc::{BlendResult, OrderDerivation, StockProjector, TrendCalculator};
use tracko_core::{
    BlendHistory, ExitAnalysis, FreightRecord, Grade, Order, PriceRecord, QualityAnalysis, Stage,
    StockLot, TrackerConfig, TrackoError,
};

use crate::dirty_tracking::{CollectionKey, DirtyTracker};
use crate::model::{NewOrder, OrderPatch, StageDetails};
use crate::query::OrderQuery;
use crate::storage::KeyValueStorage;
use crate::Result;

/// 追蹤資料存放區
pub struct TrackerStore<S: KeyValueStorage> {
    storage: S,
    config: TrackerConfig,
    orders: Vec<Order>,
    analyses: Vec<QualityAnalysis>,
    exit_analyses: Vec<ExitAnalysis>,
    prices: Vec<PriceRecord>,
    freight: Vec<FreightRecord>,
    blends: Vec<BlendHistory>,
    dirty: DirtyTracker,
}

impl<S: KeyValueStorage> TrackerStore<S> {
    /// 從儲存後端載入所有集合
    ///
    /// 鍵不存在時集合為空；內容損毀時記錄警告並以空集合繼續。
    pub fn open(storage: S, config: TrackerConfig) -> Result<Self> {
        let orders = load(&storage, CollectionKey::Orders)?;
        let analyses = load(&storage, CollectionKey::Analyses)?;
        let exit_analyses = load(&storage, CollectionKey::ExitAnalyses)?;
        let prices = load(&storage, CollectionKey::Prices)?;
        let freight = load(&storage, CollectionKey::Freight)?;
        let blends = load(&storage, CollectionKey::Blends)?;

        let store = Self {
            storage,
            config,
            orders,
            analyses,
            exit_analyses,
            prices,
            freight,
            blends,
            dirty: DirtyTracker::new(),
        };

        tracing::info!(
            "已載入 {} 筆訂單、{} 筆分析、{} 筆價格紀錄",
            store.orders.len(),
            store.analyses.len(),
            store.prices.len()
        );

        Ok(store)
    }

    /// 寫回有變動的集合，回傳已寫入的集合
    pub fn save(&mut self) -> Result<Vec<CollectionKey>> {
        let dirty = self.dirty.dirty_collections();

        for key in &dirty {
            let json = match key {
                CollectionKey::Orders => to_json(&self.orders)?,
                CollectionKey::Analyses => to_json(&self.analyses)?,
                CollectionKey::ExitAnalyses => to_json(&self.exit_analyses)?,
                CollectionKey::Prices => to_json(&self.prices)?,
                CollectionKey::Freight => to_json(&self.freight)?,
                CollectionKey::Blends => to_json(&self.blends)?,
            };
            self.storage.set(key.key(), &json)?;
            self.dirty.mark_clean(*key);
            tracing::debug!("已寫入 {}", key);
        }

        Ok(dirty)
    }

    /// 是否有尚未儲存的變動
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_clean()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn analyses(&self) -> &[QualityAnalysis] {
        &self.analyses
    }

    pub fn exit_analyses(&self) -> &[ExitAnalysis] {
        &self.exit_analyses
    }

    pub fn prices(&self) -> &[PriceRecord] {
        &self.prices
    }

    pub fn freight(&self) -> &[FreightRecord] {
        &self.freight
    }

    pub fn blends(&self) -> &[BlendHistory] {
        &self.blends
    }

    /// 依 ID 取得訂單
    pub fn order(&self, id: &str) -> Result<&Order> {
        self.orders
            .iter()
            .find(|order| order.id == id)
            .ok_or_else(|| TrackoError::OrderNotFound(id.to_string()).into())
    }

    fn order_index(&self, id: &str) -> Result<usize> {
        self.orders
            .iter()
            .position(|order| order.id == id)
            .ok_or_else(|| TrackoError::OrderNotFound(id.to_string()).into())
    }

    // ===== 訂單 =====

    /// 新增訂單（階段為「Sipariş」），並記錄該等級的價格
    pub fn create_order(&mut self, new_order: NewOrder) -> &Order {
        let mut order = Order::new(new_order.contract_no, new_order.supplier, new_order.grade)
            .with_order_date(new_order.order_date);
        order.eta = new_order.eta;
        order.note = new_order.note;
        order.packaging_type = new_order.packaging_type;
        order.shipment_month = new_order.shipment_month;
        order.container_type = new_order.container_type;
        order.harvest_year = new_order.harvest_year;
        order.fob_price = new_order.fob_price;
        order.cnf_price = new_order.cnf_price;
        order.freight_price = new_order.freight_price;
        order.contract_file = new_order.contract_file;
        if let Some(fcl_count) = new_order.fcl_count {
            order.fcl_count = fcl_count;
        }

        order.unit_price = new_order.unit_price;
        match (new_order.total_kg, new_order.total_lb) {
            (Some(kg), _) => OrderDerivation::apply_kg(&mut order, kg),
            (None, Some(lb)) => OrderDerivation::apply_lb(&mut order, lb),
            (None, None) => OrderDerivation::refresh_total_price(&mut order),
        }

        self.add_price(new_order.order_date, order.grade, order.unit_price);

        tracing::info!("新增訂單 {} ({})", order.contract_no, order.id);
        self.orders.push(order);
        self.dirty.mark_dirty(CollectionKey::Orders);

        &self.orders[self.orders.len() - 1]
    }

    /// 修改訂單；單價變動時記錄新價格
    pub fn update_order(&mut self, id: &str, patch: OrderPatch) -> Result<&Order> {
        let index = self.order_index(id)?;
        let order = &mut self.orders[index];
        let old_price = order.unit_price;

        patch.apply_fields(order);
        if let Some(unit_price) = patch.unit_price {
            order.unit_price = unit_price;
        }
        match (patch.total_kg, patch.total_lb) {
            (Some(kg), _) => OrderDerivation::apply_kg(order, kg),
            (None, Some(lb)) => OrderDerivation::apply_lb(order, lb),
            (None, None) => OrderDerivation::refresh_total_price(order),
        }

        let price_changed = order.unit_price != old_price;
        let grade = order.grade;
        let unit_price = order.unit_price;
        let date = order.order_date.unwrap_or_else(|| Local::now().date_naive());

        if price_changed {
            self.add_price(date, grade, unit_price);
        }
        self.dirty.mark_dirty(CollectionKey::Orders);
        tracing::info!("已修改訂單 {}", id);

        Ok(&self.orders[index])
    }

    /// 移動訂單到指定階段並套用轉移資料
    ///
    /// 已在該階段時不做任何事並回傳 `false`。
    pub fn move_stage(&mut self, id: &str, stage: Stage, details: StageDetails) -> Result<bool> {
        let index = self.order_index(id)?;
        let order = &mut self.orders[index];

        if order.stage == stage {
            return Ok(false);
        }

        tracing::info!("訂單 {}: {} → {}", order.contract_no, order.stage, stage);
        details.apply(order);
        order.stage = stage;
        self.dirty.mark_dirty(CollectionKey::Orders);

        Ok(true)
    }

    /// 批次移動（不填轉移資料），回傳實際移動的數量
    ///
    /// 任一 ID 不存在時不移動任何訂單。
    pub fn move_many(&mut self, ids: &[String], stage: Stage) -> Result<usize> {
        let indices = ids
            .iter()
            .map(|id| self.order_index(id))
            .collect::<Result<Vec<_>>>()?;

        let mut moved = 0;
        for index in indices {
            let order = &mut self.orders[index];
            if order.stage != stage {
                order.stage = stage;
                moved += 1;
            }
        }

        if moved > 0 {
            self.dirty.mark_dirty(CollectionKey::Orders);
        }
        tracing::info!("批次移動 {} 筆訂單到 {}", moved, stage);

        Ok(moved)
    }

    /// 切換封存狀態，回傳新的狀態
    pub fn toggle_archive(&mut self, id: &str) -> Result<bool> {
        let index = self.order_index(id)?;
        let order = &mut self.orders[index];
        order.is_archived = !order.is_archived;
        self.dirty.mark_dirty(CollectionKey::Orders);

        Ok(order.is_archived)
    }

    /// 刪除訂單
    pub fn delete_order(&mut self, id: &str) -> Result<Order> {
        let index = self.order_index(id)?;
        let order = self.orders.remove(index);
        self.dirty.mark_dirty(CollectionKey::Orders);
        tracing::info!("已刪除訂單 {}", order.contract_no);

        Ok(order)
    }

    /// 以匯入資料取代所有訂單與分析
    pub fn replace_all(&mut self, orders: Vec<Order>, analyses: Vec<QualityAnalysis>) {
        tracing::info!(
            "匯入資料取代現有資料：{} 筆訂單、{} 筆分析",
            orders.len(),
            analyses.len()
        );
        self.orders = orders;
        self.analyses = analyses;
        self.dirty.mark_dirty(CollectionKey::Orders);
        self.dirty.mark_dirty(CollectionKey::Analyses);
    }

    /// 查詢訂單
    pub fn query_orders(&self, query: &OrderQuery, today: NaiveDate) -> Vec<&Order> {
        query.apply(&self.orders, today)
    }

    // ===== 價格與運費 =====

    /// 新增價格紀錄（走勢與前一筆同等級紀錄比較）
    pub fn add_price(&mut self, date: NaiveDate, grade: Grade, price: Decimal) -> &PriceRecord {
        let (trend, change) = TrendCalculator::price_trend(&self.prices, grade, price, date, None);
        self.prices
            .push(PriceRecord::new(date, grade, price).with_trend(trend, change));
        self.dirty.mark_dirty(CollectionKey::Prices);

        &self.prices[self.prices.len() - 1]
    }

    /// 修改價格紀錄並重新計算走勢
    pub fn update_price(&mut self, id: &str, date: NaiveDate, grade: Grade, price: Decimal) -> Result<&PriceRecord> {
        let index = self
            .prices
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| TrackoError::RecordNotFound(id.to_string()))?;

        let (trend, change) = TrendCalculator::price_trend(&self.prices, grade, price, date, Some(id));
        let record = &mut self.prices[index];
        record.date = date;
        record.grade = grade;
        record.price = price;
        record.trend = trend;
        record.change = change;
        self.dirty.mark_dirty(CollectionKey::Prices);

        Ok(&self.prices[index])
    }

    /// 刪除價格紀錄
    pub fn delete_price(&mut self, id: &str) -> Result<()> {
        let before = self.prices.len();
        self.prices.retain(|record| record.id != id);
        if self.prices.len() == before {
            return Err(TrackoError::RecordNotFound(id.to_string()).into());
        }
        self.dirty.mark_dirty(CollectionKey::Prices);
        Ok(())
    }

    /// 新增運費紀錄
    pub fn add_freight(&mut self, date: NaiveDate, price: Decimal) -> &FreightRecord {
        let (trend, change) = TrendCalculator::freight_trend(&self.freight, price, date, None);
        self.freight
            .push(FreightRecord::new(date, price).with_trend(trend, change));
        self.dirty.mark_dirty(CollectionKey::Freight);

        &self.freight[self.freight.len() - 1]
    }

    /// 修改運費紀錄並重新計算走勢
    pub fn update_freight(&mut self, id: &str, date: NaiveDate, price: Decimal) -> Result<&FreightRecord> {
        let index = self
            .freight
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| TrackoError::RecordNotFound(id.to_string()))?;

        let (trend, change) = TrendCalculator::freight_trend(&self.freight, price, date, Some(id));
        let record = &mut self.freight[index];
        record.date = date;
        record.price = price;
        record.trend = trend;
        record.change = change;
        self.dirty.mark_dirty(CollectionKey::Freight);

        Ok(&self.freight[index])
    }

    /// 刪除運費紀錄
    pub fn delete_freight(&mut self, id: &str) -> Result<()> {
        let before = self.freight.len();
        self.freight.retain(|record| record.id != id);
        if self.freight.len() == before {
            return Err(TrackoError::RecordNotFound(id.to_string()).into());
        }
        self.dirty.mark_dirty(CollectionKey::Freight);
        Ok(())
    }

    /// 最新運費（日期最新；同日取較晚加入者）
    pub fn latest_freight_price(&self) -> Option<Decimal> {
        self.freight
            .iter()
            .fold(None, |latest: Option<&FreightRecord>, record| match latest {
                Some(current) if current.date > record.date => latest,
                _ => Some(record),
            })
            .map(|record| record.price)
    }

    // ===== 品質分析 =====

    /// 新增入庫分析
    pub fn add_analysis(&mut self, analysis: QualityAnalysis) {
        self.analyses.push(analysis);
        self.dirty.mark_dirty(CollectionKey::Analyses);
    }

    /// 刪除入庫分析
    pub fn delete_analysis(&mut self, id: &str) -> Result<()> {
        let before = self.analyses.len();
        self.analyses.retain(|analysis| analysis.id != id);
        if self.analyses.len() == before {
            return Err(TrackoError::RecordNotFound(id.to_string()).into());
        }
        self.dirty.mark_dirty(CollectionKey::Analyses);
        Ok(())
    }

    /// 搜尋入庫分析（合約號、貨櫃號、批號、卡車號）
    pub fn search_analyses(&self, term: &str) -> Vec<&QualityAnalysis> {
        self.analyses.iter().filter(|analysis| analysis.matches(term)).collect()
    }

    /// 新增出庫分析
    pub fn add_exit_analysis(&mut self, analysis: ExitAnalysis) {
        self.exit_analyses.push(analysis);
        self.dirty.mark_dirty(CollectionKey::ExitAnalyses);
    }

    /// 刪除出庫分析
    pub fn delete_exit_analysis(&mut self, id: &str) -> Result<()> {
        let before = self.exit_analyses.len();
        self.exit_analyses.retain(|analysis| analysis.base.id != id);
        if self.exit_analyses.len() == before {
            return Err(TrackoError::RecordNotFound(id.to_string()).into());
        }
        self.dirty.mark_dirty(CollectionKey::ExitAnalyses);
        Ok(())
    }

    /// 搜尋出庫分析
    pub fn search_exit_analyses(&self, term: &str) -> Vec<&ExitAnalysis> {
        self.exit_analyses
            .iter()
            .filter(|analysis| analysis.matches(term))
            .collect()
    }

    // ===== 混合 =====

    /// 目前可用於混合的倉庫庫存
    pub fn stock_lots(&self) -> Vec<StockLot> {
        StockProjector::project(&self.orders, &self.analyses, &self.config)
    }

    /// 確認混合並加入歷史紀錄
    pub fn commit_blend(&mut self, result: &BlendResult, note: String, date: NaiveDate) -> Result<&BlendHistory> {
        let history = result.commit(note, date)?;
        self.blends.push(history);
        self.dirty.mark_dirty(CollectionKey::Blends);

        Ok(&self.blends[self.blends.len() - 1])
    }
}

fn load<S: KeyValueStorage, T: DeserializeOwned>(storage: &S, key: CollectionKey) -> Result<Vec<T>> {
    let Some(json) = storage.get(key.key())? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(&json) {
        Ok(items) => Ok(items),
        Err(err) => {
            tracing::warn!("{} 內容無法解析，改用空集合: {}", key, err);
            Ok(Vec::new())
        }
    }
}

fn to_json<T: Serialize>(items: &[T]) -> Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}
