//! 混合比例計算（產量上限與瓶頸偵測）

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use tracko_core::{BlendHistory, BlendHistoryItem, BlendInput, StockLot, TrackerConfig, TrackoError};

use crate::CalcWarning;

/// 已解析的混合列：庫存批次 + 比例（%）
#[derive(Debug, Clone, PartialEq)]
pub struct BlendLine {
    pub lot: StockLot,
    pub ratio: Decimal,
}

impl BlendLine {
    pub fn new(lot: StockLot, ratio: Decimal) -> Self {
        Self { lot, ratio }
    }
}

/// 單一批次的使用量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotUsage {
    /// 批次ID
    pub lot_id: String,

    /// 合約號
    pub contract_no: String,

    /// 卡車號
    pub truck_no: String,

    /// 比例（%）
    pub ratio: Decimal,

    /// 可用數量（公斤）
    pub available_kg: Decimal,

    /// 使用量（公斤）
    pub used_kg: Decimal,

    /// 剩餘量（公斤）
    pub remaining_kg: Decimal,

    /// 是否為瓶頸批次
    pub is_bottleneck: bool,
}

/// 混合計算結果（衍生值，不會直接持久化）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendResult {
    /// 比例總和
    pub total_ratio: Decimal,

    /// 加權粒徑
    pub weighted_caliber: Decimal,

    /// 加權破損率
    pub weighted_breakage: Decimal,

    /// 最大產量（公斤）
    pub max_production_kg: Decimal,

    /// 瓶頸批次
    pub bottleneck_lot_id: Option<String>,

    /// 各批次使用量（依輸入順序）
    pub per_lot_usage: Vec<LotUsage>,

    /// 比例總和是否為 100
    pub is_valid: bool,

    /// 警告信息
    pub warnings: Vec<CalcWarning>,
}

impl BlendResult {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            total_ratio: Decimal::ZERO,
            weighted_caliber: Decimal::ZERO,
            weighted_breakage: Decimal::ZERO,
            max_production_kg: Decimal::ZERO,
            bottleneck_lot_id: None,
            per_lot_usage: Vec::new(),
            is_valid: false,
            warnings: Vec::new(),
        }
    }

    /// 參與批次（比例 > 0）在此產量下未使用的庫存比例（%）
    pub fn waste_percent(&self) -> Decimal {
        let participating = self.per_lot_usage.iter().filter(|u| u.ratio > Decimal::ZERO);
        let (available, remaining) = participating.fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(available, remaining), usage| (available + usage.available_kg, remaining + usage.remaining_kg),
        );

        if available > Decimal::ZERO {
            remaining / available * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }

    /// 將有效的混合結果轉為歷史紀錄
    ///
    /// 比例總和不為 100 時回傳 `InvalidBlend`，產量為 0 時回傳 `EmptyBlend`。
    pub fn commit(&self, note: String, date: NaiveDate) -> tracko_core::Result<BlendHistory> {
        if !self.is_valid {
            return Err(TrackoError::InvalidBlend(self.total_ratio));
        }
        if self.max_production_kg <= Decimal::ZERO {
            return Err(TrackoError::EmptyBlend);
        }

        let items = self
            .per_lot_usage
            .iter()
            .filter(|usage| usage.ratio > Decimal::ZERO)
            .map(|usage| BlendHistoryItem {
                order_id: usage.lot_id.clone(),
                contract_no: usage.contract_no.clone(),
                ratio: usage.ratio,
                kg: usage.used_kg.round_dp(2),
            })
            .collect();

        let history = BlendHistory::new(date, items)
            .with_quality(self.weighted_caliber.round_dp(2), self.weighted_breakage.round_dp(2))
            .with_waste_percent(self.waste_percent().round_dp(2))
            .with_note(note);

        tracing::info!(
            "混合已確認：{} 個批次，產量 {} kg",
            history.items.len(),
            history.total_kg
        );

        Ok(history)
    }
}

/// 混合計算器
///
/// 純函數：不修改任何批次或訂單，相同輸入得到相同結果。
#[derive(Debug, Clone)]
pub struct BlendCalculator {
    /// 比例總和容許誤差
    tolerance: Decimal,
}

impl Default for BlendCalculator {
    fn default() -> Self {
        Self::new(Decimal::new(1, 2))
    }
}

impl BlendCalculator {
    /// 創建新的混合計算器
    pub fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    /// 依設定創建
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.ratio_tolerance)
    }

    /// 將輸入列對應到庫存批次；未選擇批次的列會被略過
    pub fn resolve(inputs: &[BlendInput], lots: &[StockLot]) -> tracko_core::Result<Vec<BlendLine>> {
        inputs
            .iter()
            .filter_map(|input| input.lot_id.as_ref().map(|id| (id, input.ratio)))
            .map(|(id, ratio)| {
                lots.iter()
                    .find(|lot| &lot.id == id)
                    .map(|lot| BlendLine::new(lot.clone(), ratio))
                    .ok_or_else(|| TrackoError::RecordNotFound(id.clone()))
            })
            .collect()
    }

    /// 解析並計算
    pub fn preview(&self, inputs: &[BlendInput], lots: &[StockLot]) -> tracko_core::Result<BlendResult> {
        let lines = Self::resolve(inputs, lots)?;
        self.calculate(&lines)
    }

    /// 修改某列比例；若只有另一個已選擇的列，自動補足為 100
    pub fn apply_ratio_edit(inputs: &mut [BlendInput], index: usize, ratio: Decimal) {
        let Some(target) = inputs.get_mut(index) else {
            return;
        };
        target.ratio = ratio;

        let others: Vec<usize> = inputs
            .iter()
            .enumerate()
            .filter(|(i, input)| *i != index && input.lot_id.is_some())
            .map(|(i, _)| i)
            .collect();

        if let [other] = others.as_slice() {
            inputs[*other].ratio = (Decimal::ONE_HUNDRED - ratio).max(Decimal::ZERO);
        }
    }

    /// 計算混合結果
    pub fn calculate(&self, lines: &[BlendLine]) -> tracko_core::Result<BlendResult> {
        tracing::debug!("開始混合計算：{} 個批次", lines.len());

        if lines.is_empty() {
            return Ok(BlendResult::empty());
        }

        // Step 1: 驗證輸入
        tracing::debug!("Step 1: 驗證比例與批次");
        let mut seen = HashSet::new();
        for line in lines {
            if line.ratio < Decimal::ZERO {
                return Err(TrackoError::NegativeRatio {
                    lot_id: line.lot.id.clone(),
                    ratio: line.ratio,
                });
            }
            if !seen.insert(line.lot.id.as_str()) {
                return Err(TrackoError::DuplicateLot(line.lot.id.clone()));
            }
        }

        let total_ratio: Decimal = lines.iter().map(|line| line.ratio).sum();
        let mut warnings = Vec::new();

        // Step 2: 各批次可支撐的產量，取最小值為瓶頸
        tracing::debug!("Step 2: 計算產量上限");
        let mut bottleneck: Option<(usize, Decimal)> = None;
        for (index, line) in lines.iter().enumerate() {
            let Some(capacity) = Self::capacity(line)? else {
                if line.ratio.is_zero() {
                    warnings.push(CalcWarning::info(
                        Some(line.lot.id.clone()),
                        "比例為 0，不參與混合".to_string(),
                    ));
                }
                continue;
            };

            if capacity.is_zero() {
                warnings.push(CalcWarning::warning(
                    Some(line.lot.id.clone()),
                    "批次無可用庫存，產量為 0".to_string(),
                ));
            }

            // 平手時保留較早的批次
            if bottleneck.map_or(true, |(_, min)| capacity < min) {
                bottleneck = Some((index, capacity));
            }
        }

        let max_production_kg = bottleneck.map_or(Decimal::ZERO, |(_, capacity)| capacity);
        let bottleneck_index = bottleneck.map(|(index, _)| index);
        tracing::debug!("最大產量: {} kg，瓶頸: {:?}", max_production_kg, bottleneck_index);

        // Step 3: 各批次使用量
        tracing::debug!("Step 3: 分配使用量");
        let per_lot_usage: Vec<LotUsage> = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let is_bottleneck = bottleneck_index == Some(index);
                let used_kg = if is_bottleneck {
                    line.lot.available_kg
                } else {
                    max_production_kg
                        .checked_mul(line.ratio)
                        .map(|scaled| scaled / Decimal::ONE_HUNDRED)
                        .ok_or_else(|| overflow(line))?
                        .min(line.lot.available_kg)
                };

                Ok(LotUsage {
                    lot_id: line.lot.id.clone(),
                    contract_no: line.lot.contract_no.clone(),
                    truck_no: line.lot.truck_no.clone(),
                    ratio: line.ratio,
                    available_kg: line.lot.available_kg,
                    used_kg,
                    remaining_kg: line.lot.available_kg - used_kg,
                    is_bottleneck,
                })
            })
            .collect::<tracko_core::Result<_>>()?;

        // Step 4: 加權品質（以比例總和正規化）
        tracing::debug!("Step 4: 計算加權品質");
        let (weighted_caliber, weighted_breakage) = if total_ratio > Decimal::ZERO {
            lines.iter().fold((Decimal::ZERO, Decimal::ZERO), |(caliber, breakage), line| {
                let weight = line.ratio / total_ratio;
                (
                    caliber + weight * line.lot.caliber,
                    breakage + weight * line.lot.breakage_percent,
                )
            })
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        // Step 5: 比例總和檢查（容許誤差含邊界）
        let is_valid = (total_ratio - Decimal::ONE_HUNDRED).abs() <= self.tolerance;
        if !is_valid {
            warnings.push(CalcWarning::warning(
                None,
                format!("比例總和為 {}，必須為 100", total_ratio.normalize()),
            ));
        }

        tracing::debug!(
            "混合計算完成：比例總和 {}，最大產量 {} kg",
            total_ratio.normalize(),
            max_production_kg.round_dp(2)
        );

        Ok(BlendResult {
            total_ratio,
            weighted_caliber,
            weighted_breakage,
            max_production_kg,
            bottleneck_lot_id: bottleneck_index.map(|index| lines[index].lot.id.clone()),
            per_lot_usage,
            is_valid,
            warnings,
        })
    }

    /// 批次可支撐的產量：`available / (ratio / 100)`；比例 ≤ 0 時不受限
    fn capacity(line: &BlendLine) -> tracko_core::Result<Option<Decimal>> {
        if line.ratio <= Decimal::ZERO {
            return Ok(None);
        }
        line.lot
            .available_kg
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(line.ratio))
            .map(Some)
            .ok_or_else(|| overflow(line))
    }
}

fn overflow(line: &BlendLine) -> TrackoError {
    TrackoError::Other(format!(
        "混合計算數值溢位: 批次 {} 庫存 {} 比例 {}",
        line.lot.id, line.lot.available_kg, line.ratio
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn lot(id: &str, kg: i64, caliber: i64, breakage: Decimal) -> StockLot {
        StockLot::new(id.to_string(), Decimal::from(kg), Decimal::from(caliber), breakage)
            .with_reference(format!("CONT-{id}"), format!("34 ABC {id}"))
    }

    fn line(id: &str, kg: i64, ratio: i64) -> BlendLine {
        BlendLine::new(lot(id, kg, 300, Decimal::ONE), Decimal::from(ratio))
    }

    #[test]
    fn test_two_lot_bottleneck() {
        let lines = vec![line("A", 16000, 55), line("B", 24000, 45)];

        let result = BlendCalculator::default().calculate(&lines).unwrap();

        assert_eq!(result.max_production_kg.round_dp(2), Decimal::new(2909091, 2));
        assert_eq!(result.bottleneck_lot_id.as_deref(), Some("A"));
        assert_eq!(result.per_lot_usage[0].used_kg, Decimal::from(16000));
        assert!(result.per_lot_usage[0].is_bottleneck);
        assert_eq!(result.per_lot_usage[1].used_kg.round_dp(2), Decimal::new(1309091, 2));
        assert_eq!(result.per_lot_usage[1].remaining_kg.round_dp(2), Decimal::new(1090909, 2));
        assert!(!result.per_lot_usage[1].is_bottleneck);
        assert!(result.is_valid);
    }

    #[test]
    fn test_weighted_quality_uses_normalized_ratio() {
        let lines = vec![
            BlendLine::new(lot("A", 1000, 300, Decimal::ONE), Decimal::from(30)),
            BlendLine::new(lot("B", 1000, 200, Decimal::from(3)), Decimal::from(20)),
        ];

        let result = BlendCalculator::default().calculate(&lines).unwrap();

        // 30/50 * 300 + 20/50 * 200
        assert_eq!(result.weighted_caliber, Decimal::from(260));
        assert_eq!(result.weighted_breakage, Decimal::new(18, 1));
        // 容量使用未正規化的比例：1000 / 0.3
        assert_eq!(result.max_production_kg.round_dp(2), Decimal::new(333333, 2));
        assert!(!result.is_valid);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_empty_blend() {
        let result = BlendCalculator::default().calculate(&[]).unwrap();

        assert_eq!(result.max_production_kg, Decimal::ZERO);
        assert!(result.per_lot_usage.is_empty());
        assert!(result.bottleneck_lot_id.is_none());
    }

    #[test]
    fn test_all_zero_ratios() {
        let lines = vec![line("A", 1000, 0), line("B", 2000, 0)];

        let result = BlendCalculator::default().calculate(&lines).unwrap();

        assert_eq!(result.max_production_kg, Decimal::ZERO);
        assert!(result.bottleneck_lot_id.is_none());
        assert!(result.per_lot_usage.iter().all(|u| u.used_kg.is_zero()));
        assert_eq!(result.weighted_caliber, Decimal::ZERO);
    }

    #[test]
    fn test_zero_ratio_lot_excluded() {
        let lines = vec![line("A", 10, 0), line("B", 5000, 100)];

        let result = BlendCalculator::default().calculate(&lines).unwrap();

        assert_eq!(result.max_production_kg, Decimal::from(5000));
        assert_eq!(result.bottleneck_lot_id.as_deref(), Some("B"));
        assert_eq!(result.per_lot_usage[0].used_kg, Decimal::ZERO);
        assert!(!result.per_lot_usage[0].is_bottleneck);
    }

    #[test]
    fn test_tie_picks_first_lot() {
        let lines = vec![line("A", 5000, 50), line("B", 5000, 50)];

        let result = BlendCalculator::default().calculate(&lines).unwrap();

        assert_eq!(result.bottleneck_lot_id.as_deref(), Some("A"));
        assert_eq!(result.per_lot_usage[1].used_kg, Decimal::from(5000));
        assert_eq!(result.per_lot_usage[1].remaining_kg, Decimal::ZERO);
    }

    #[test]
    fn test_capacity_overflow_is_error() {
        let huge = StockLot::new("H".to_string(), Decimal::MAX, Decimal::from(300), Decimal::ONE);
        let lines = vec![BlendLine::new(huge, Decimal::from(50)), line("A", 1000, 50)];

        let result = BlendCalculator::default().calculate(&lines);

        assert!(matches!(result, Err(TrackoError::Other(_))));
    }

    #[test]
    fn test_negative_ratio_rejected() {
        let lines = vec![line("A", 1000, -10), line("B", 1000, 110)];

        let err = BlendCalculator::default().calculate(&lines).unwrap_err();
        assert!(matches!(err, TrackoError::NegativeRatio { .. }));
    }

    #[test]
    fn test_duplicate_lot_rejected() {
        let lines = vec![line("A", 1000, 50), line("A", 1000, 50)];

        let err = BlendCalculator::default().calculate(&lines).unwrap_err();
        assert!(matches!(err, TrackoError::DuplicateLot(id) if id == "A"));
    }

    #[rstest]
    #[case(Decimal::from(100), true)]
    #[case(Decimal::new(9999, 2), true)]
    #[case(Decimal::new(10001, 2), true)]
    #[case(Decimal::new(9998, 2), false)]
    #[case(Decimal::from(90), false)]
    fn test_validity_flag(#[case] total: Decimal, #[case] expected: bool) {
        let lines = vec![BlendLine::new(lot("A", 1000, 300, Decimal::ONE), total)];

        let result = BlendCalculator::default().calculate(&lines).unwrap();
        assert_eq!(result.is_valid, expected);
    }

    #[test]
    fn test_resolve_skips_unselected_and_rejects_unknown() {
        let lots = vec![lot("A", 1000, 300, Decimal::ONE), lot("B", 2000, 290, Decimal::TWO)];
        let inputs = vec![
            BlendInput::new("A", Decimal::from(60)),
            BlendInput::unselected(Decimal::from(10)),
            BlendInput::new("B", Decimal::from(40)),
        ];

        let lines = BlendCalculator::resolve(&inputs, &lots).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].lot.id, "B");

        let unknown = vec![BlendInput::new("Z", Decimal::from(100))];
        assert!(matches!(
            BlendCalculator::resolve(&unknown, &lots),
            Err(TrackoError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_apply_ratio_edit_complements_other_lot() {
        let mut inputs = vec![
            BlendInput::new("A", Decimal::from(50)),
            BlendInput::new("B", Decimal::from(50)),
            BlendInput::unselected(Decimal::ZERO),
        ];

        BlendCalculator::apply_ratio_edit(&mut inputs, 0, Decimal::from(70));
        assert_eq!(inputs[1].ratio, Decimal::from(30));

        BlendCalculator::apply_ratio_edit(&mut inputs, 0, Decimal::from(120));
        assert_eq!(inputs[1].ratio, Decimal::ZERO);
    }

    #[test]
    fn test_commit_valid_blend() {
        let lines = vec![line("A", 16000, 55), line("B", 24000, 45)];
        let result = BlendCalculator::default().calculate(&lines).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

        let history = result.commit("Haftalık harman".to_string(), date).unwrap();

        assert_eq!(history.items.len(), 2);
        assert_eq!(history.items[0].kg, Decimal::from(16000));
        assert_eq!(history.total_kg, Decimal::new(2909091, 2));
        // 剩餘 10909.09 / 40000
        assert_eq!(history.waste_percent, Decimal::new(2727, 2));
        assert_eq!(history.caliber, Decimal::from(300));
    }

    #[test]
    fn test_commit_invalid_blend_rejected() {
        let lines = vec![line("A", 1000, 60), line("B", 1000, 30)];
        let result = BlendCalculator::default().calculate(&lines).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

        assert!(matches!(
            result.commit(String::new(), date),
            Err(TrackoError::InvalidBlend(_))
        ));
    }

    #[test]
    fn test_commit_empty_stock_rejected() {
        let lines = vec![line("A", 0, 100)];
        let result = BlendCalculator::default().calculate(&lines).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

        assert!(matches!(result.commit(String::new(), date), Err(TrackoError::EmptyBlend)));
    }

    fn arb_lines() -> impl Strategy<Value = Vec<BlendLine>> {
        prop::collection::vec((0i64..100_000, 0i64..=100), 1..6).prop_map(|pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (kg, ratio))| line(&format!("L{i}"), kg, ratio))
                .collect()
        })
    }

    #[test]
    fn test_result_json_shape() {
        let lines = vec![line("A", 16000, 55), line("B", 24000, 45)];
        let result = BlendCalculator::default().calculate(&lines).unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["bottleneck_lot_id"], "A");
        assert_eq!(json["is_valid"], true);
        assert_eq!(json["per_lot_usage"][0]["is_bottleneck"], true);
        assert_eq!(json["per_lot_usage"][1]["contract_no"], "CONT-B");
    }

    proptest! {
        #[test]
        fn prop_bottleneck_is_fully_used(lines in arb_lines()) {
            let result = BlendCalculator::default().calculate(&lines).unwrap();

            for usage in &result.per_lot_usage {
                prop_assert!(usage.used_kg <= usage.available_kg);
                prop_assert!(usage.remaining_kg >= Decimal::ZERO);
            }
            if let Some(id) = &result.bottleneck_lot_id {
                let usage = result.per_lot_usage.iter().find(|u| &u.lot_id == id).unwrap();
                prop_assert_eq!(usage.used_kg, usage.available_kg);
                prop_assert!(usage.ratio > Decimal::ZERO);
            }
        }

        #[test]
        fn prop_usage_is_proportional(lines in arb_lines()) {
            let result = BlendCalculator::default().calculate(&lines).unwrap();
            let tolerance = Decimal::new(1, 6);

            for usage in &result.per_lot_usage {
                let expected = result.max_production_kg * usage.ratio / Decimal::ONE_HUNDRED;
                prop_assert!((usage.used_kg - expected).abs() < tolerance);
            }
        }

        #[test]
        fn prop_more_stock_never_lowers_production(lines in arb_lines(), index in 0usize..6, extra in 0i64..10_000) {
            let before = BlendCalculator::default().calculate(&lines).unwrap();

            let mut grown = lines.clone();
            let index = index % grown.len();
            grown[index].lot.available_kg += Decimal::from(extra);
            let after = BlendCalculator::default().calculate(&grown).unwrap();

            prop_assert!(after.max_production_kg >= before.max_production_kg);
        }

        #[test]
        fn prop_zero_ratio_lots_are_ignored(lines in arb_lines(), kg in 0i64..100_000) {
            let before = BlendCalculator::default().calculate(&lines).unwrap();

            let mut extended = lines.clone();
            extended.push(line("ZERO", kg, 0));
            let after = BlendCalculator::default().calculate(&extended).unwrap();

            prop_assert_eq!(after.max_production_kg, before.max_production_kg);
            prop_assert_eq!(after.bottleneck_lot_id, before.bottleneck_lot_id);
            prop_assert_eq!(after.per_lot_usage.last().unwrap().used_kg, Decimal::ZERO);
        }

        #[test]
        fn prop_calculation_is_idempotent(lines in arb_lines()) {
            let calculator = BlendCalculator::default();
            prop_assert_eq!(calculator.calculate(&lines).unwrap(), calculator.calculate(&lines).unwrap());
        }
    }
}
