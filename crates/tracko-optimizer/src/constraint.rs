//! 混合情境的品質與數量條件

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracko_core::TrackoError;

/// 混合條件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConstraints {
    /// 最小粒徑
    pub min_caliber: Decimal,

    /// 最大粒徑
    pub max_caliber: Decimal,

    /// 最大破損率（%）
    pub max_breakage: Decimal,

    /// 雙批次混合時每個批次的最低比例（%）
    pub min_mix_ratio: Decimal,

    /// 單批最低產量（公斤）
    pub min_batch_kg: Decimal,

    /// 總產量上限（公斤），`None` 為不限
    pub production_limit_kg: Option<Decimal>,

    /// 比例搜尋步距（%）
    pub ratio_step: Decimal,
}

impl Default for BlendConstraints {
    fn default() -> Self {
        Self {
            min_caliber: Decimal::from(290),
            max_caliber: Decimal::from(320),
            max_breakage: Decimal::from(5),
            min_mix_ratio: Decimal::TEN,
            min_batch_kg: Decimal::ONE_THOUSAND,
            production_limit_kg: None,
            ratio_step: Decimal::ONE,
        }
    }
}

impl BlendConstraints {
    /// 建構器模式：設置粒徑範圍
    pub fn with_caliber_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.min_caliber = min;
        self.max_caliber = max;
        self
    }

    /// 建構器模式：設置最大破損率
    pub fn with_max_breakage(mut self, max_breakage: Decimal) -> Self {
        self.max_breakage = max_breakage;
        self
    }

    /// 建構器模式：設置最低混合比例
    pub fn with_min_mix_ratio(mut self, ratio: Decimal) -> Self {
        self.min_mix_ratio = ratio;
        self
    }

    /// 建構器模式：設置單批最低產量
    pub fn with_min_batch_kg(mut self, kg: Decimal) -> Self {
        self.min_batch_kg = kg;
        self
    }

    /// 建構器模式：設置總產量上限
    pub fn with_production_limit(mut self, limit_kg: Decimal) -> Self {
        self.production_limit_kg = Some(limit_kg);
        self
    }

    /// 建構器模式：設置比例步距
    pub fn with_ratio_step(mut self, step: Decimal) -> Self {
        self.ratio_step = step;
        self
    }

    /// 檢查條件是否合理
    pub fn validate(&self) -> tracko_core::Result<()> {
        if self.min_caliber > self.max_caliber {
            return Err(TrackoError::InvalidConstraint(format!(
                "最小粒徑 {} 大於最大粒徑 {}",
                self.min_caliber, self.max_caliber
            )));
        }
        if self.max_breakage < Decimal::ZERO {
            return Err(TrackoError::InvalidConstraint("最大破損率不可為負數".to_string()));
        }
        if self.min_mix_ratio <= Decimal::ZERO || self.min_mix_ratio > Decimal::from(50) {
            return Err(TrackoError::InvalidConstraint(format!(
                "最低混合比例必須介於 0 與 50 之間，目前為 {}",
                self.min_mix_ratio
            )));
        }
        if self.ratio_step <= Decimal::ZERO {
            return Err(TrackoError::InvalidConstraint("比例步距必須大於 0".to_string()));
        }
        if self.min_batch_kg < Decimal::ZERO {
            return Err(TrackoError::InvalidConstraint("單批最低產量不可為負數".to_string()));
        }
        if self.production_limit_kg.is_some_and(|limit| limit <= Decimal::ZERO) {
            return Err(TrackoError::InvalidConstraint("總產量上限必須大於 0".to_string()));
        }
        Ok(())
    }

    /// 品質是否符合條件
    pub fn accepts(&self, caliber: Decimal, breakage: Decimal) -> bool {
        caliber >= self.min_caliber && caliber <= self.max_caliber && breakage <= self.max_breakage
    }

    /// 雙批次混合時主批次可用的比例（由小到大）
    pub fn pair_ratios(&self) -> Vec<Decimal> {
        let upper = Decimal::ONE_HUNDRED - self.min_mix_ratio;
        let mut ratios = Vec::new();
        let mut ratio = self.min_mix_ratio;
        while ratio <= upper {
            ratios.push(ratio);
            ratio += self.ratio_step;
        }
        ratios
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints_are_valid() {
        let constraints = BlendConstraints::default();

        assert!(constraints.validate().is_ok());
        assert!(constraints.accepts(Decimal::from(300), Decimal::from(2)));
        assert!(!constraints.accepts(Decimal::from(185), Decimal::from(2)));
        assert!(!constraints.accepts(Decimal::from(300), Decimal::from(6)));
    }

    #[test]
    fn test_pair_ratios() {
        let constraints = BlendConstraints::default()
            .with_min_mix_ratio(Decimal::from(40))
            .with_ratio_step(Decimal::from(5));

        assert_eq!(
            constraints.pair_ratios(),
            vec![Decimal::from(40), Decimal::from(45), Decimal::from(50), Decimal::from(55), Decimal::from(60)]
        );
    }

    #[test]
    fn test_invalid_constraints() {
        let reversed = BlendConstraints::default().with_caliber_range(Decimal::from(320), Decimal::from(290));
        assert!(matches!(reversed.validate(), Err(TrackoError::InvalidConstraint(_))));

        let zero_step = BlendConstraints::default().with_ratio_step(Decimal::ZERO);
        assert!(zero_step.validate().is_err());

        let zero_limit = BlendConstraints::default().with_production_limit(Decimal::ZERO);
        assert!(zero_limit.validate().is_err());
    }
}
