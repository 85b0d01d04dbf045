//! 採購訂單模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::TrackoError;

/// 物流階段（固定順序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// 已下單
    #[serde(rename = "Sipariş")]
    Ordered,
    /// 已裝櫃
    #[serde(rename = "Yüklendi")]
    Loaded,
    /// 海運途中
    #[serde(rename = "Yolda")]
    InTransit,
    /// 已到港
    #[serde(rename = "Limanda")]
    AtPort,
    /// 保稅倉
    #[serde(rename = "Antrepoda")]
    Bonded,
    /// 入庫
    #[serde(rename = "Depoda")]
    Warehouse,
}

impl Stage {
    /// 全部階段（依流程順序）
    pub const ALL: [Stage; 6] = [
        Stage::Ordered,
        Stage::Loaded,
        Stage::InTransit,
        Stage::AtPort,
        Stage::Bonded,
        Stage::Warehouse,
    ];

    /// 顯示名稱
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Ordered => "Sipariş",
            Stage::Loaded => "Yüklendi",
            Stage::InTransit => "Yolda",
            Stage::AtPort => "Limanda",
            Stage::Bonded => "Antrepoda",
            Stage::Warehouse => "Depoda",
        }
    }

    /// 是否仍屬「預計到貨」（尚未進入保稅倉或倉庫）
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Stage::Ordered | Stage::Loaded | Stage::InTransit | Stage::AtPort
        )
    }

    /// 進入此階段時是否需要填寫轉移資料
    pub fn requires_details(&self) -> bool {
        matches!(
            self,
            Stage::Loaded | Stage::InTransit | Stage::Bonded | Stage::Warehouse
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Stage {
    type Err = TrackoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.trim().to_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.label().to_lowercase() == v)
            .or(match v.as_str() {
                "ordered" | "siparis" => Some(Stage::Ordered),
                "loaded" | "yuklendi" => Some(Stage::Loaded),
                "transit" | "in-transit" => Some(Stage::InTransit),
                "port" | "at-port" => Some(Stage::AtPort),
                "bonded" | "antrepo" => Some(Stage::Bonded),
                "warehouse" | "depo" => Some(Stage::Warehouse),
                _ => None,
            })
            .ok_or_else(|| TrackoError::UnknownValue(s.to_string()))
    }
}

/// 腰果等級
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    WW320,
    WW240,
    WW180,
}

impl Grade {
    /// 全部等級
    pub const ALL: [Grade; 3] = [Grade::WW320, Grade::WW240, Grade::WW180];

    pub fn label(&self) -> &'static str {
        match self {
            Grade::WW320 => "WW320",
            Grade::WW240 => "WW240",
            Grade::WW180 => "WW180",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Grade {
    type Err = TrackoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WW320" | "320" => Ok(Grade::WW320),
            "WW240" | "240" => Ok(Grade::WW240),
            "WW180" | "180" => Ok(Grade::WW180),
            _ => Err(TrackoError::UnknownValue(s.to_string())),
        }
    }
}

/// 包裝方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PackagingType {
    /// 真空袋
    #[default]
    #[serde(rename = "Vakum")]
    Vacuum,
    /// 鐵罐
    #[serde(rename = "Teneke")]
    Tin,
    /// 紙箱
    #[serde(rename = "Koli")]
    Carton,
    /// 麻袋
    #[serde(rename = "Çuval")]
    Bag,
}

impl PackagingType {
    pub fn label(&self) -> &'static str {
        match self {
            PackagingType::Vacuum => "Vakum",
            PackagingType::Tin => "Teneke",
            PackagingType::Carton => "Koli",
            PackagingType::Bag => "Çuval",
        }
    }
}

impl fmt::Display for PackagingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for PackagingType {
    type Err = TrackoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vakum" | "vacuum" => Ok(PackagingType::Vacuum),
            "teneke" | "tin" => Ok(PackagingType::Tin),
            "koli" | "carton" => Ok(PackagingType::Carton),
            "çuval" | "cuval" | "bag" => Ok(PackagingType::Bag),
            _ => Err(TrackoError::UnknownValue(s.to_string())),
        }
    }
}

/// 貨櫃尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContainerType {
    #[serde(rename = "20'")]
    Twenty,
    #[default]
    #[serde(rename = "40'")]
    Forty,
}

impl ContainerType {
    pub fn label(&self) -> &'static str {
        match self {
            ContainerType::Twenty => "20'",
            ContainerType::Forty => "40'",
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for ContainerType {
    type Err = TrackoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('\'') {
            "20" => Ok(ContainerType::Twenty),
            "40" => Ok(ContainerType::Forty),
            _ => Err(TrackoError::UnknownValue(s.to_string())),
        }
    }
}

/// 付款狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "Ödendi")]
    Paid,
    #[serde(rename = "Ödeme bekliyor")]
    Pending,
}

/// 保稅倉處理狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntrepoStatus {
    #[serde(rename = "Hazır")]
    Ready,
    #[serde(rename = "Düşümlü Hazır")]
    ReadyWithDeduction,
    #[serde(rename = "Kontrol")]
    Inspection,
    #[serde(rename = "Analizde")]
    InAnalysis,
    #[serde(rename = "İşlem Yapılmadı")]
    Untouched,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Ödendi",
            PaymentStatus::Pending => "Ödeme bekliyor",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = TrackoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ödendi" | "paid" => Ok(PaymentStatus::Paid),
            "ödeme bekliyor" | "pending" => Ok(PaymentStatus::Pending),
            _ => Err(TrackoError::UnknownValue(s.to_string())),
        }
    }
}

impl AntrepoStatus {
    pub const ALL: [AntrepoStatus; 5] = [
        AntrepoStatus::Ready,
        AntrepoStatus::ReadyWithDeduction,
        AntrepoStatus::Inspection,
        AntrepoStatus::InAnalysis,
        AntrepoStatus::Untouched,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AntrepoStatus::Ready => "Hazır",
            AntrepoStatus::ReadyWithDeduction => "Düşümlü Hazır",
            AntrepoStatus::Inspection => "Kontrol",
            AntrepoStatus::InAnalysis => "Analizde",
            AntrepoStatus::Untouched => "İşlem Yapılmadı",
        }
    }
}

impl FromStr for AntrepoStatus {
    type Err = TrackoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.trim().to_lowercase();
        AntrepoStatus::ALL
            .into_iter()
            .find(|status| status.label().to_lowercase() == v)
            .or(match v.as_str() {
                "ready" => Some(AntrepoStatus::Ready),
                "ready-with-deduction" => Some(AntrepoStatus::ReadyWithDeduction),
                "inspection" => Some(AntrepoStatus::Inspection),
                "in-analysis" => Some(AntrepoStatus::InAnalysis),
                "untouched" => Some(AntrepoStatus::Untouched),
                _ => None,
            })
            .ok_or_else(|| TrackoError::UnknownValue(s.to_string()))
    }
}

/// 合約附件資訊（只保存中繼資料）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
}

/// 採購訂單
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// 訂單ID
    pub id: String,

    /// 合約號
    pub contract_no: String,

    /// 供應商
    pub supplier: String,

    /// 等級
    pub grade: Grade,

    /// 下單日期
    #[serde(default)]
    pub order_date: Option<NaiveDate>,

    /// 預計到港日
    #[serde(default)]
    pub eta: Option<NaiveDate>,

    /// 備註
    #[serde(default)]
    pub note: String,

    /// 目前階段
    pub stage: Stage,

    /// 包裝方式
    #[serde(default)]
    pub packaging_type: PackagingType,

    /// 是否已封存
    #[serde(default)]
    pub is_archived: bool,

    /// 單價（$/lb）
    #[serde(default)]
    pub unit_price: Decimal,

    /// 出貨月份
    #[serde(default)]
    pub shipment_month: String,

    /// 貨櫃數量
    #[serde(default = "default_fcl_count")]
    pub fcl_count: u32,

    /// 貨櫃尺寸
    #[serde(default)]
    pub container_type: ContainerType,

    /// 收成年份
    #[serde(default)]
    pub harvest_year: Option<String>,

    /// FOB 價格（$/kg）
    #[serde(default)]
    pub fob_price: Option<Decimal>,

    /// CNF 價格（$/kg）
    #[serde(default)]
    pub cnf_price: Option<Decimal>,

    /// 運費（$）
    #[serde(default)]
    pub freight_price: Option<Decimal>,

    /// 總磅數（衍生欄位）
    #[serde(default)]
    pub total_lb: Decimal,

    /// 總公斤數（衍生欄位）
    #[serde(default)]
    pub total_kg: Decimal,

    /// 總金額 = 單價 × 總磅數（衍生欄位）
    #[serde(default)]
    pub total_price: Decimal,

    /// 合約附件
    #[serde(default)]
    pub contract_file: Option<ContractFile>,

    // ===== 裝運階段 =====
    #[serde(default)]
    pub bl_no: Option<String>,
    #[serde(default)]
    pub booking_no: Option<String>,
    #[serde(default)]
    pub container_no: Option<String>,
    #[serde(default)]
    pub etd: Option<NaiveDate>,
    #[serde(default)]
    pub loading_date: Option<NaiveDate>,
    #[serde(default)]
    pub vessel_name: Option<String>,

    // ===== 到港階段 =====
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub port_note: Option<String>,

    // ===== 保稅倉階段 =====
    #[serde(default)]
    pub antrepo_entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub antrepo_declaration_no: Option<String>,
    #[serde(default)]
    pub agriculture_analysis_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_agriculture_approved: Option<bool>,
    #[serde(default)]
    pub antrepo_exit_date: Option<NaiveDate>,
    #[serde(default)]
    pub antrepo_status: Option<AntrepoStatus>,
    #[serde(default)]
    pub an_ref_no: Option<String>,

    // ===== 倉庫階段 =====
    #[serde(default)]
    pub truck_no: Option<String>,
    #[serde(default)]
    pub batch_no: Option<String>,
}

fn default_fcl_count() -> u32 {
    1
}

impl Order {
    /// 創建新的訂單（階段為「已下單」）
    pub fn new(contract_no: String, supplier: String, grade: Grade) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            contract_no,
            supplier,
            grade,
            order_date: None,
            eta: None,
            note: String::new(),
            stage: Stage::Ordered,
            packaging_type: PackagingType::default(),
            is_archived: false,
            unit_price: Decimal::ZERO,
            shipment_month: String::new(),
            fcl_count: default_fcl_count(),
            container_type: ContainerType::default(),
            harvest_year: None,
            fob_price: None,
            cnf_price: None,
            freight_price: None,
            total_lb: Decimal::ZERO,
            total_kg: Decimal::ZERO,
            total_price: Decimal::ZERO,
            contract_file: None,
            bl_no: None,
            booking_no: None,
            container_no: None,
            etd: None,
            loading_date: None,
            vessel_name: None,
            payment_status: None,
            port_note: None,
            antrepo_entry_date: None,
            antrepo_declaration_no: None,
            agriculture_analysis_date: None,
            is_agriculture_approved: None,
            antrepo_exit_date: None,
            antrepo_status: None,
            an_ref_no: None,
            truck_no: None,
            batch_no: None,
        }
    }

    /// 建構器模式：設置階段
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// 建構器模式：設置下單日期
    pub fn with_order_date(mut self, date: NaiveDate) -> Self {
        self.order_date = Some(date);
        self
    }

    /// 建構器模式：設置預計到港日
    pub fn with_eta(mut self, eta: NaiveDate) -> Self {
        self.eta = Some(eta);
        self
    }

    /// 建構器模式：設置單價與數量（不重算衍生欄位）
    pub fn with_quantities(mut self, unit_price: Decimal, total_kg: Decimal, total_lb: Decimal) -> Self {
        self.unit_price = unit_price;
        self.total_kg = total_kg;
        self.total_lb = total_lb;
        self
    }

    /// 建構器模式：設置貨櫃號
    pub fn with_container_no(mut self, container_no: String) -> Self {
        self.container_no = Some(container_no);
        self
    }

    /// 建構器模式：設置卡車號
    pub fn with_truck_no(mut self, truck_no: String) -> Self {
        self.truck_no = Some(truck_no);
        self
    }

    /// 檢查是否為可用於混合的倉庫庫存
    pub fn is_in_stock(&self, warehouse_stage: Stage) -> bool {
        self.stage == warehouse_stage && !self.is_archived
    }

    /// 總公噸數
    pub fn total_tonnes(&self) -> Decimal {
        self.total_kg / Decimal::ONE_THOUSAND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order() {
        let order = Order::new(
            "CONT-2024-001".to_string(),
            "Vietnam Cashew Ltd.".to_string(),
            Grade::WW320,
        );

        assert_eq!(order.stage, Stage::Ordered);
        assert_eq!(order.fcl_count, 1);
        assert_eq!(order.container_type, ContainerType::Forty);
        assert!(!order.is_archived);
        assert!(!order.id.is_empty());
    }

    #[test]
    fn test_stage_serialization_uses_turkish_labels() {
        let json = serde_json::to_string(&Stage::Warehouse).unwrap();
        assert_eq!(json, "\"Depoda\"");

        let stage: Stage = serde_json::from_str("\"Antrepoda\"").unwrap();
        assert_eq!(stage, Stage::Bonded);
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!("depoda".parse::<Stage>().unwrap(), Stage::Warehouse);
        assert_eq!("Sipariş".parse::<Stage>().unwrap(), Stage::Ordered);
        assert_eq!("bonded".parse::<Stage>().unwrap(), Stage::Bonded);
        assert!("unknown".parse::<Stage>().is_err());
    }

    #[test]
    fn test_parse_order_enums() {
        assert_eq!("teneke".parse::<PackagingType>().unwrap(), PackagingType::Tin);
        assert_eq!("20'".parse::<ContainerType>().unwrap(), ContainerType::Twenty);
        assert_eq!("pending".parse::<PaymentStatus>().unwrap(), PaymentStatus::Pending);
        assert_eq!(
            "düşümlü hazır".parse::<AntrepoStatus>().unwrap(),
            AntrepoStatus::ReadyWithDeduction
        );
        assert!("45".parse::<ContainerType>().is_err());
    }

    #[test]
    fn test_stage_groups() {
        assert!(Stage::AtPort.is_expected());
        assert!(!Stage::Bonded.is_expected());
        assert!(Stage::Warehouse.requires_details());
        assert!(!Stage::AtPort.requires_details());
        assert!(Stage::Ordered < Stage::Warehouse);
    }

    #[test]
    fn test_order_deserialize_with_missing_optional_fields() {
        let json = r#"{
            "id": "1",
            "contract_no": "CONT-2024-003",
            "supplier": "Africa Nut Trading",
            "grade": "WW180",
            "stage": "Depoda",
            "packaging_type": "Çuval",
            "container_type": "20'",
            "total_kg": 16000,
            "total_lb": 35274
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.grade, Grade::WW180);
        assert_eq!(order.packaging_type, PackagingType::Bag);
        assert_eq!(order.container_type, ContainerType::Twenty);
        assert_eq!(order.total_kg, Decimal::from(16000));
        assert_eq!(order.fcl_count, 1);
        assert!(order.is_in_stock(Stage::Warehouse));
    }
}
