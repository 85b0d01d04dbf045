//! 品質分析紀錄（入庫與出庫）

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order::Grade;

/// 入庫品質分析
///
/// 百分比欄位皆為 0-100 的百分數。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAnalysis {
    /// 分析ID
    pub id: String,

    /// 合約號
    #[serde(default)]
    pub contract_no: String,

    /// 貨櫃號
    #[serde(default)]
    pub container_no: String,

    /// 卡車號
    #[serde(default)]
    pub truck_no: Option<String>,

    /// 批號
    #[serde(default)]
    pub batch_no: Option<String>,

    /// 分析日期
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// 分析人員
    #[serde(default)]
    pub analyst: String,

    /// 等級
    pub grade: Grade,

    /// 水分
    #[serde(default)]
    pub moisture: Decimal,

    /// 雜質
    #[serde(default)]
    pub foreign_matter: Decimal,

    /// 粒徑（每磅粒數）
    #[serde(default)]
    pub caliber: Decimal,

    /// 半粒
    #[serde(default)]
    pub halves_ratio: Decimal,

    /// 碎粒
    #[serde(default)]
    pub broken_ratio: Decimal,

    /// 半粒 + 碎粒
    #[serde(default)]
    pub total_h_b: Decimal,

    /// 尖端破損
    #[serde(default)]
    pub tip_broken: Decimal,

    /// 帶皮
    #[serde(default)]
    pub skin_on: Decimal,

    /// 斑點
    #[serde(default)]
    pub spotted: Decimal,

    /// 未熟
    #[serde(default)]
    pub immature: Decimal,

    /// 蟲蛀
    #[serde(default)]
    pub insect_bored: Decimal,

    /// 異色
    #[serde(default)]
    pub off_color: Decimal,

    /// 小粒徑比例
    #[serde(default)]
    pub small_caliber: Decimal,

    /// 大粒徑比例
    #[serde(default)]
    pub large_caliber: Decimal,

    /// 備註
    #[serde(default)]
    pub note: Option<String>,
}

impl QualityAnalysis {
    /// 創建新的分析紀錄（數值欄位為 0）
    pub fn new(contract_no: String, container_no: String, grade: Grade) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            contract_no,
            container_no,
            truck_no: None,
            batch_no: None,
            date: None,
            analyst: String::new(),
            grade,
            moisture: Decimal::ZERO,
            foreign_matter: Decimal::ZERO,
            caliber: Decimal::ZERO,
            halves_ratio: Decimal::ZERO,
            broken_ratio: Decimal::ZERO,
            total_h_b: Decimal::ZERO,
            tip_broken: Decimal::ZERO,
            skin_on: Decimal::ZERO,
            spotted: Decimal::ZERO,
            immature: Decimal::ZERO,
            insect_bored: Decimal::ZERO,
            off_color: Decimal::ZERO,
            small_caliber: Decimal::ZERO,
            large_caliber: Decimal::ZERO,
            note: None,
        }
    }

    /// 建構器模式：設置粒徑與破損（半粒、碎粒）
    pub fn with_defects(mut self, caliber: Decimal, halves: Decimal, broken: Decimal) -> Self {
        self.caliber = caliber;
        self.halves_ratio = halves;
        self.broken_ratio = broken;
        self.total_h_b = halves + broken;
        self
    }

    /// 建構器模式：設置分析日期
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// 半粒 + 碎粒；未填時由兩者相加
    pub fn breakage_total(&self) -> Decimal {
        if self.total_h_b > Decimal::ZERO {
            self.total_h_b
        } else {
            self.halves_ratio + self.broken_ratio
        }
    }

    /// 是否符合搜尋字串（合約號、貨櫃號、批號、卡車號）
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [
            Some(self.contract_no.as_str()),
            Some(self.container_no.as_str()),
            self.batch_no.as_deref(),
            self.truck_no.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// 出庫品質分析
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitAnalysis {
    /// 共用的分析欄位
    #[serde(flatten)]
    pub base: QualityAnalysis,

    /// 出貨批
    #[serde(default)]
    pub lot: String,

    /// 部門
    #[serde(default)]
    pub department: String,

    /// 客戶 / 出貨地
    #[serde(default)]
    pub customer: String,

    /// 損壞
    #[serde(default)]
    pub damaged: Decimal,

    /// 深色粒
    #[serde(default)]
    pub dark_grain: Decimal,

    /// 偏光值
    #[serde(default)]
    pub polarization: Decimal,

    /// 烘烤時間
    #[serde(default)]
    pub frying_time: String,

    /// 烘烤溫度
    #[serde(default)]
    pub frying_temp: Decimal,

    /// 鹽分
    #[serde(default)]
    pub salt_ratio: Decimal,
}

impl ExitAnalysis {
    pub fn new(base: QualityAnalysis, lot: String, customer: String) -> Self {
        Self {
            base,
            lot,
            department: String::new(),
            customer,
            damaged: Decimal::ZERO,
            dark_grain: Decimal::ZERO,
            polarization: Decimal::ZERO,
            frying_time: String::new(),
            frying_temp: Decimal::ZERO,
            salt_ratio: Decimal::ZERO,
        }
    }

    pub fn matches(&self, term: &str) -> bool {
        self.base.matches(term)
            || self.lot.to_lowercase().contains(&term.to_lowercase())
            || self.customer.to_lowercase().contains(&term.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakage_total_falls_back_to_sum() {
        let mut analysis = QualityAnalysis::new("C-1".to_string(), "MSKU1234567".to_string(), Grade::WW320);
        analysis.halves_ratio = Decimal::new(15, 1);
        analysis.broken_ratio = Decimal::new(5, 1);

        assert_eq!(analysis.breakage_total(), Decimal::from(2));

        analysis.total_h_b = Decimal::new(25, 1);
        assert_eq!(analysis.breakage_total(), Decimal::new(25, 1));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let mut analysis = QualityAnalysis::new("CONT-2024-001".to_string(), "MSKU1234567".to_string(), Grade::WW240);
        analysis.truck_no = Some("34 ABC 123".to_string());

        assert!(analysis.matches("msku"));
        assert!(analysis.matches("abc"));
        assert!(!analysis.matches("xyz"));
    }

    #[test]
    fn test_exit_analysis_flattens_base_fields() {
        let base = QualityAnalysis::new("C-9".to_string(), "TGHU0000001".to_string(), Grade::WW180)
            .with_defects(Decimal::from(185), Decimal::ONE, Decimal::ONE);
        let exit = ExitAnalysis::new(base, "LOT-7".to_string(), "Istanbul".to_string());

        let json = serde_json::to_value(&exit).unwrap();
        assert_eq!(json["contract_no"], "C-9");
        assert_eq!(json["lot"], "LOT-7");

        let back: ExitAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(back.base.total_h_b, Decimal::from(2));
        assert!(back.matches("istanbul"));
    }
}
