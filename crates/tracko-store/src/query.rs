//! 訂單篩選與排序

use chrono::NaiveDate;
use std::cmp::Ordering;
use tracko_core::format::is_within_next_days;
use tracko_core::{Grade, Order, Stage};

/// 排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    /// 下單日期新到舊（無日期者在後）
    #[default]
    OrderDateDesc,
    /// 到港日近到遠（無 ETA 者在後）
    EtaNearest,
}

/// 訂單查詢條件
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// 階段；`None` 為所有階段
    pub stage: Option<Stage>,
    /// 是否查詢封存訂單
    pub archived: bool,
    /// 搜尋字串（合約號、供應商、提單號、船名；不分大小寫）
    pub search: Option<String>,
    pub grade: Option<Grade>,
    /// 只顯示 N 天內到港
    pub eta_within_days: Option<u32>,
    pub sort: OrderSort,
}

impl OrderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置階段
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// 建構器模式：查詢封存訂單
    pub fn archived(mut self) -> Self {
        self.archived = true;
        self
    }

    /// 建構器模式：設置搜尋字串
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// 建構器模式：設置等級
    pub fn with_grade(mut self, grade: Grade) -> Self {
        self.grade = Some(grade);
        self
    }

    /// 建構器模式：只顯示 N 天內到港
    pub fn with_eta_within(mut self, days: u32) -> Self {
        self.eta_within_days = Some(days);
        self
    }

    /// 建構器模式：設置排序方式
    pub fn with_sort(mut self, sort: OrderSort) -> Self {
        self.sort = sort;
        self
    }

    /// 訂單是否符合條件
    pub fn matches(&self, order: &Order, today: NaiveDate) -> bool {
        if order.is_archived != self.archived {
            return false;
        }
        if self.stage.is_some_and(|stage| order.stage != stage) {
            return false;
        }
        if self.grade.is_some_and(|grade| order.grade != grade) {
            return false;
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = [
                Some(order.contract_no.as_str()),
                Some(order.supplier.as_str()),
                order.bl_no.as_deref(),
                order.vessel_name.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(days) = self.eta_within_days {
            let within = order.eta.is_some_and(|eta| is_within_next_days(eta, today, days));
            if !within {
                return false;
            }
        }
        true
    }

    /// 篩選並排序
    pub fn apply<'a>(&self, orders: &'a [Order], today: NaiveDate) -> Vec<&'a Order> {
        let mut result: Vec<&Order> = orders.iter().filter(|order| self.matches(order, today)).collect();

        match self.sort {
            OrderSort::OrderDateDesc => result.sort_by(|a, b| b.order_date.cmp(&a.order_date)),
            OrderSort::EtaNearest => result.sort_by(|a, b| match (a.eta, b.eta) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
        }
        result
    }
}
