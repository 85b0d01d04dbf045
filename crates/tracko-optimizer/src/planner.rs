//! 混合情境規劃器（貪婪法）

use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracko_calc::{BlendCalculator, BlendLine, BlendResult};
use tracko_core::{StockLot, TrackoError};

use crate::{BatchItem, BatchStep, BlendConstraints, LotPolicy, PlanResult, Scenario};

/// 候選批次：計算結果 + 參與批次索引（與 `BlendResult::per_lot_usage` 同順序）
struct Candidate {
    result: BlendResult,
    lots: Vec<usize>,
}

/// 情境規劃器
///
/// 每個策略各自產生一個情境，策略之間以 rayon 平行計算，結果排序後輸出。
#[derive(Debug, Clone)]
pub struct ScenarioPlanner {
    constraints: BlendConstraints,
    calculator: BlendCalculator,
}

impl ScenarioPlanner {
    /// 創建新的規劃器（條件不合理時回傳錯誤）
    pub fn new(constraints: BlendConstraints) -> tracko_core::Result<Self> {
        constraints.validate()?;
        Ok(Self {
            constraints,
            calculator: BlendCalculator::default(),
        })
    }

    /// 建構器模式：設置混合計算器
    pub fn with_calculator(mut self, calculator: BlendCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn constraints(&self) -> &BlendConstraints {
        &self.constraints
    }

    /// 執行全部策略並排序
    pub fn plan(&self, lots: &[StockLot]) -> tracko_core::Result<PlanResult> {
        tracing::info!("開始混合情境規劃：{} 個批次，{} 個策略", lots.len(), LotPolicy::ALL.len());

        let mut seen = HashSet::new();
        for lot in lots {
            if !seen.insert(lot.id.as_str()) {
                return Err(TrackoError::DuplicateLot(lot.id.clone()));
            }
        }

        let mut messages = Vec::new();
        if lots.iter().all(|lot| lot.available_kg <= Decimal::ZERO) {
            messages.push("沒有可用庫存".to_string());
        }

        let mut scenarios = LotPolicy::ALL
            .par_iter()
            .map(|policy| self.run_policy(lots, *policy))
            .collect::<tracko_core::Result<Vec<_>>>()?;

        // 產量高者優先，其次剩餘庫存少者；完全相同時保留策略順序
        scenarios.sort_by(|a, b| {
            b.total_production_kg
                .cmp(&a.total_production_kg)
                .then(a.remaining_kg.cmp(&b.remaining_kg))
        });
        if let Some(best) = scenarios.first_mut() {
            best.is_best = true;
            messages.push(format!(
                "最佳策略: {}，產量 {} kg",
                best.policy.label(),
                best.total_production_kg.round_dp(2)
            ));
        }

        tracing::info!("情境規劃完成");
        Ok(PlanResult { scenarios, messages })
    }

    /// 以單一策略產生情境
    pub fn run_policy(&self, lots: &[StockLot], policy: LotPolicy) -> tracko_core::Result<Scenario> {
        tracing::debug!("策略 {}：開始", policy.label());

        // Step 1: 依策略排序，剩餘量 = 可用量
        let order = policy.order(lots);
        let mut remaining: Vec<Decimal> = lots.iter().map(|lot| lot.available_kg.max(Decimal::ZERO)).collect();
        let initial_kg: Decimal = remaining.iter().copied().sum();
        let mut set_aside: HashSet<usize> = HashSet::new();
        let mut produced = Decimal::ZERO;
        let mut steps = Vec::new();

        loop {
            if let Some(limit) = self.constraints.production_limit_kg {
                if produced >= limit {
                    tracing::debug!("策略 {}：已達產量上限", policy.label());
                    break;
                }
            }

            // Step 2: 主批次 = 第一個仍有庫存且未被擱置的批次
            let Some(anchor_pos) = order
                .iter()
                .position(|&index| remaining[index] > Decimal::ZERO && !set_aside.contains(&index))
            else {
                break;
            };
            let anchor = order[anchor_pos];

            // Step 3-4: 候選批次中取產量最大者
            let candidate = self.best_candidate(lots, &remaining, &order, anchor_pos)?;
            let Some(candidate) = candidate.filter(|c| {
                c.result.max_production_kg > Decimal::ZERO
                    && c.result.max_production_kg >= self.constraints.min_batch_kg
            }) else {
                tracing::debug!("策略 {}：批次 {} 無法組成合格混合，擱置", policy.label(), lots[anchor].id);
                set_aside.insert(anchor);
                continue;
            };

            // Step 5: 依產量上限縮放並扣除使用量
            let mut batch_kg = candidate.result.max_production_kg;
            let mut scale = Decimal::ONE;
            if let Some(limit) = self.constraints.production_limit_kg {
                let allowed = limit - produced;
                if batch_kg > allowed {
                    scale = allowed / batch_kg;
                    batch_kg = allowed;
                }
            }

            let items: Vec<BatchItem> = candidate
                .lots
                .iter()
                .zip(&candidate.result.per_lot_usage)
                .map(|(&index, usage)| {
                    let used_kg = if scale == Decimal::ONE {
                        usage.used_kg
                    } else {
                        (usage.used_kg * scale).min(remaining[index])
                    };
                    remaining[index] -= used_kg;
                    BatchItem {
                        lot_id: usage.lot_id.clone(),
                        contract_no: usage.contract_no.clone(),
                        truck_no: usage.truck_no.clone(),
                        ratio: usage.ratio,
                        used_kg,
                        remaining_kg: remaining[index],
                    }
                })
                .collect();

            produced += batch_kg;
            steps.push(BatchStep {
                index: steps.len() + 1,
                caliber: candidate.result.weighted_caliber,
                breakage: candidate.result.weighted_breakage,
                total_kg: batch_kg,
                items,
            });
        }

        let remaining_kg: Decimal = remaining.iter().copied().sum();
        let scenario = Scenario::from_steps(policy, steps, initial_kg, remaining_kg);
        tracing::debug!(
            "策略 {}：{} 個批次，產量 {} kg",
            policy.label(),
            scenario.batch_count(),
            scenario.total_production_kg.round_dp(2)
        );

        Ok(scenario)
    }

    /// 主批次單獨（100%）或與後續批次配對的最佳候選
    ///
    /// 同產量時保留先找到者：單獨優先，其次較早的配對批次，再其次較小的主批次比例。
    fn best_candidate(
        &self,
        lots: &[StockLot],
        remaining: &[Decimal],
        order: &[usize],
        anchor_pos: usize,
    ) -> tracko_core::Result<Option<Candidate>> {
        let anchor = order[anchor_pos];
        let mut best: Option<Candidate> = None;

        let mut consider = |candidate: Candidate| {
            let accepted = self
                .constraints
                .accepts(candidate.result.weighted_caliber, candidate.result.weighted_breakage);
            let better = best
                .as_ref()
                .map_or(true, |b| candidate.result.max_production_kg > b.result.max_production_kg);
            if accepted && better {
                best = Some(candidate);
            }
        };

        let solo = self.evaluate(lots, remaining, &[(anchor, Decimal::ONE_HUNDRED)])?;
        consider(solo);

        let partners = order[anchor_pos + 1..]
            .iter()
            .copied()
            .filter(|&index| remaining[index] > Decimal::ZERO);
        for partner in partners {
            for ratio in self.constraints.pair_ratios() {
                let pair = [(anchor, ratio), (partner, Decimal::ONE_HUNDRED - ratio)];
                consider(self.evaluate(lots, remaining, &pair)?);
            }
        }

        Ok(best)
    }

    /// 以剩餘量作為可用量，交由混合計算器評估
    fn evaluate(
        &self,
        lots: &[StockLot],
        remaining: &[Decimal],
        ratios: &[(usize, Decimal)],
    ) -> tracko_core::Result<Candidate> {
        let lines: Vec<BlendLine> = ratios
            .iter()
            .map(|&(index, ratio)| {
                let mut lot = lots[index].clone();
                lot.available_kg = remaining[index];
                BlendLine::new(lot, ratio)
            })
            .collect();

        let result = self.calculator.calculate(&lines)?;
        Ok(Candidate {
            result,
            lots: ratios.iter().map(|&(index, _)| index).collect(),
        })
    }
}
