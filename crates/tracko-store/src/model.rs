//! 訂單新增、修改與階段轉移的輸入資料

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracko_core::{AntrepoStatus, ContainerType, ContractFile, Grade, Order, PackagingType, PaymentStatus};

/// 新訂單
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub contract_no: String,
    pub supplier: String,
    pub grade: Grade,
    pub order_date: NaiveDate,
    #[serde(default)]
    pub eta: Option<NaiveDate>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub packaging_type: PackagingType,
    /// 單價（$/lb）
    #[serde(default)]
    pub unit_price: Decimal,
    /// 數量（公斤）；同時給公斤與磅時以公斤為準
    #[serde(default)]
    pub total_kg: Option<Decimal>,
    #[serde(default)]
    pub total_lb: Option<Decimal>,
    #[serde(default)]
    pub shipment_month: String,
    #[serde(default)]
    pub fcl_count: Option<u32>,
    #[serde(default)]
    pub container_type: ContainerType,
    #[serde(default)]
    pub harvest_year: Option<String>,
    #[serde(default)]
    pub fob_price: Option<Decimal>,
    #[serde(default)]
    pub cnf_price: Option<Decimal>,
    #[serde(default)]
    pub freight_price: Option<Decimal>,
    #[serde(default)]
    pub contract_file: Option<ContractFile>,
}

impl NewOrder {
    pub fn new(contract_no: String, supplier: String, grade: Grade, order_date: NaiveDate) -> Self {
        Self {
            contract_no,
            supplier,
            grade,
            order_date,
            eta: None,
            note: String::new(),
            packaging_type: PackagingType::default(),
            unit_price: Decimal::ZERO,
            total_kg: None,
            total_lb: None,
            shipment_month: String::new(),
            fcl_count: None,
            container_type: ContainerType::default(),
            harvest_year: None,
            fob_price: None,
            cnf_price: None,
            freight_price: None,
            contract_file: None,
        }
    }

    /// 建構器模式：設置單價
    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// 建構器模式：設置公斤數
    pub fn with_total_kg(mut self, kg: Decimal) -> Self {
        self.total_kg = Some(kg);
        self
    }

    /// 建構器模式：設置磅數
    pub fn with_total_lb(mut self, lb: Decimal) -> Self {
        self.total_lb = Some(lb);
        self
    }

    /// 建構器模式：設置預計到港日
    pub fn with_eta(mut self, eta: NaiveDate) -> Self {
        self.eta = Some(eta);
        self
    }

    /// 建構器模式：設置備註
    pub fn with_note(mut self, note: String) -> Self {
        self.note = note;
        self
    }
}

/// 訂單修改（`None` 表示不變）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPatch {
    pub contract_no: Option<String>,
    pub supplier: Option<String>,
    pub grade: Option<Grade>,
    pub order_date: Option<NaiveDate>,
    pub eta: Option<NaiveDate>,
    pub note: Option<String>,
    pub packaging_type: Option<PackagingType>,
    pub unit_price: Option<Decimal>,
    pub total_kg: Option<Decimal>,
    pub total_lb: Option<Decimal>,
    pub shipment_month: Option<String>,
    pub fcl_count: Option<u32>,
    pub container_type: Option<ContainerType>,
    pub harvest_year: Option<String>,
    pub fob_price: Option<Decimal>,
    pub cnf_price: Option<Decimal>,
    pub freight_price: Option<Decimal>,
    pub contract_file: Option<ContractFile>,
}

impl OrderPatch {
    /// 套用非數量欄位；數量與單價由呼叫端透過衍生欄位規則處理
    pub(crate) fn apply_fields(&self, order: &mut Order) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut order.contract_no, &self.contract_no);
        set(&mut order.supplier, &self.supplier);
        set(&mut order.grade, &self.grade);
        set_opt(&mut order.order_date, &self.order_date);
        set_opt(&mut order.eta, &self.eta);
        set(&mut order.note, &self.note);
        set(&mut order.packaging_type, &self.packaging_type);
        set(&mut order.shipment_month, &self.shipment_month);
        set(&mut order.fcl_count, &self.fcl_count);
        set(&mut order.container_type, &self.container_type);
        set_opt(&mut order.harvest_year, &self.harvest_year);
        set_opt(&mut order.fob_price, &self.fob_price);
        set_opt(&mut order.cnf_price, &self.cnf_price);
        set_opt(&mut order.freight_price, &self.freight_price);
        set_opt(&mut order.contract_file, &self.contract_file);
    }
}

/// 階段轉移時填寫的資料（`None` 表示不變）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageDetails {
    // 裝運
    pub etd: Option<NaiveDate>,
    pub eta: Option<NaiveDate>,
    pub loading_date: Option<NaiveDate>,
    pub booking_no: Option<String>,
    pub bl_no: Option<String>,
    pub container_no: Option<String>,
    pub vessel_name: Option<String>,

    // 到港
    pub payment_status: Option<PaymentStatus>,
    pub port_note: Option<String>,

    // 保稅倉
    pub antrepo_entry_date: Option<NaiveDate>,
    pub antrepo_declaration_no: Option<String>,
    pub agriculture_analysis_date: Option<NaiveDate>,
    pub is_agriculture_approved: Option<bool>,
    pub antrepo_exit_date: Option<NaiveDate>,
    pub antrepo_status: Option<AntrepoStatus>,
    pub an_ref_no: Option<String>,

    // 倉庫
    pub truck_no: Option<String>,
    pub batch_no: Option<String>,
}

impl StageDetails {
    /// 是否沒有填寫任何資料
    pub fn is_empty(&self) -> bool {
        self.etd.is_none()
            && self.eta.is_none()
            && self.loading_date.is_none()
            && self.booking_no.is_none()
            && self.bl_no.is_none()
            && self.container_no.is_none()
            && self.vessel_name.is_none()
            && self.payment_status.is_none()
            && self.port_note.is_none()
            && self.antrepo_entry_date.is_none()
            && self.antrepo_declaration_no.is_none()
            && self.agriculture_analysis_date.is_none()
            && self.is_agriculture_approved.is_none()
            && self.antrepo_exit_date.is_none()
            && self.antrepo_status.is_none()
            && self.an_ref_no.is_none()
            && self.truck_no.is_none()
            && self.batch_no.is_none()
    }

    pub(crate) fn apply(&self, order: &mut Order) {
        fn set<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut order.etd, &self.etd);
        set(&mut order.eta, &self.eta);
        set(&mut order.loading_date, &self.loading_date);
        set(&mut order.booking_no, &self.booking_no);
        set(&mut order.bl_no, &self.bl_no);
        set(&mut order.container_no, &self.container_no);
        set(&mut order.vessel_name, &self.vessel_name);
        set(&mut order.payment_status, &self.payment_status);
        set(&mut order.port_note, &self.port_note);
        set(&mut order.antrepo_entry_date, &self.antrepo_entry_date);
        set(&mut order.antrepo_declaration_no, &self.antrepo_declaration_no);
        set(&mut order.agriculture_analysis_date, &self.agriculture_analysis_date);
        set(&mut order.is_agriculture_approved, &self.is_agriculture_approved);
        set(&mut order.antrepo_exit_date, &self.antrepo_exit_date);
        set(&mut order.antrepo_status, &self.antrepo_status);
        set(&mut order.an_ref_no, &self.an_ref_no);
        set(&mut order.truck_no, &self.truck_no);
        set(&mut order.batch_no, &self.batch_no);
    }
}
