//! 追蹤器設定

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::order::{Grade, Stage};

/// 等級的預設品質（無分析紀錄時使用）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeQuality {
    /// 粒徑
    pub caliber: Decimal,

    /// 破損率（%）
    pub breakage_percent: Decimal,
}

impl GradeQuality {
    pub fn new(caliber: Decimal, breakage_percent: Decimal) -> Self {
        Self {
            caliber,
            breakage_percent,
        }
    }
}

/// 追蹤器設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// 資料目錄（每個集合一個 JSON 檔）
    pub data_dir: PathBuf,

    /// 「即將到港」篩選視窗（天）
    pub eta_window_days: u32,

    /// 混合比例總和容許誤差
    pub ratio_tolerance: Decimal,

    /// 視為可混合庫存的階段
    pub warehouse_stage: Stage,

    /// 各等級預設品質
    pub grade_quality: HashMap<Grade, GradeQuality>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("tracko-data"))
    }
}

impl TrackerConfig {
    /// 創建新的設定
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            eta_window_days: 10,
            ratio_tolerance: Decimal::new(1, 2),
            warehouse_stage: Stage::Warehouse,
            grade_quality: default_grade_quality(),
        }
    }

    /// 建構器模式：設置資料目錄
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    /// 建構器模式：設置到港視窗
    pub fn with_eta_window_days(mut self, days: u32) -> Self {
        self.eta_window_days = days;
        self
    }

    /// 建構器模式：設置比例容許誤差
    pub fn with_ratio_tolerance(mut self, tolerance: Decimal) -> Self {
        self.ratio_tolerance = tolerance;
        self
    }

    /// 建構器模式：設置某等級的預設品質
    pub fn with_grade_quality(mut self, grade: Grade, quality: GradeQuality) -> Self {
        self.grade_quality.insert(grade, quality);
        self
    }

    /// 取得等級的預設品質
    pub fn quality_for(&self, grade: Grade) -> GradeQuality {
        self.grade_quality
            .get(&grade)
            .copied()
            .unwrap_or_else(|| builtin_quality(grade))
    }
}

fn builtin_quality(grade: Grade) -> GradeQuality {
    match grade {
        Grade::WW320 => GradeQuality::new(Decimal::from(309), Decimal::ONE),
        Grade::WW240 => GradeQuality::new(Decimal::from(299), Decimal::TWO),
        Grade::WW180 => GradeQuality::new(Decimal::from(185), Decimal::TWO),
    }
}

fn default_grade_quality() -> HashMap<Grade, GradeQuality> {
    Grade::ALL
        .into_iter()
        .map(|grade| (grade, builtin_quality(grade)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();

        assert_eq!(config.eta_window_days, 10);
        assert_eq!(config.ratio_tolerance, Decimal::new(1, 2));
        assert_eq!(config.warehouse_stage, Stage::Warehouse);
        assert_eq!(config.quality_for(Grade::WW320).caliber, Decimal::from(309));
        assert_eq!(config.quality_for(Grade::WW180).breakage_percent, Decimal::TWO);
    }

    #[test]
    fn test_builder_overrides() {
        let config = TrackerConfig::default()
            .with_eta_window_days(14)
            .with_grade_quality(Grade::WW240, GradeQuality::new(Decimal::from(250), Decimal::new(15, 1)));

        assert_eq!(config.eta_window_days, 14);
        assert_eq!(config.quality_for(Grade::WW240).caliber, Decimal::from(250));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrackerConfig = serde_json::from_str(r#"{"eta_window_days": 7}"#).unwrap();

        assert_eq!(config.eta_window_days, 7);
        assert_eq!(config.ratio_tolerance, Decimal::new(1, 2));
        assert_eq!(config.quality_for(Grade::WW240).caliber, Decimal::from(299));
    }
}
