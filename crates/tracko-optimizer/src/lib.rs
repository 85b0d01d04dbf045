//! # Tracko Optimizer
//!
//! 混合情境規劃（依不同批次優先順序產生批量混合計劃）

pub mod constraint;
pub mod planner;
pub mod strategy;

// Re-export 主要類型
pub use constraint::BlendConstraints;
pub use planner::ScenarioPlanner;
pub use strategy::LotPolicy;

use rust_decimal::Decimal;
use serde::Serialize;

/// 批次中單一庫存的使用情形
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub lot_id: String,
    pub contract_no: String,
    pub truck_no: String,
    pub ratio: Decimal,
    pub used_kg: Decimal,
    /// 此批次後的剩餘量
    pub remaining_kg: Decimal,
}

/// 情境中的一個混合批次
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStep {
    /// 批次序號（從 1 開始）
    pub index: usize,
    pub caliber: Decimal,
    pub breakage: Decimal,
    pub total_kg: Decimal,
    pub items: Vec<BatchItem>,
}

impl BatchStep {
    pub fn title(&self) -> String {
        format!("{}. HARMAN", self.index)
    }
}

/// 單一策略的規劃結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    /// 使用的策略
    pub policy: LotPolicy,

    /// 是否為最佳情境
    pub is_best: bool,

    /// 總產量（公斤）
    pub total_production_kg: Decimal,

    /// 產量加權平均粒徑
    pub avg_caliber: Decimal,

    /// 產量加權平均破損率
    pub avg_breakage: Decimal,

    /// 剩餘庫存（公斤）
    pub remaining_kg: Decimal,

    /// 產量 / 初始庫存（%）
    pub efficiency_percent: Decimal,

    /// 批次明細
    pub steps: Vec<BatchStep>,
}

impl Scenario {
    /// 由批次明細彙總情境指標
    pub fn from_steps(policy: LotPolicy, steps: Vec<BatchStep>, initial_kg: Decimal, remaining_kg: Decimal) -> Self {
        let total_production_kg: Decimal = steps.iter().map(|step| step.total_kg).sum();
        let (avg_caliber, avg_breakage, efficiency_percent) = if total_production_kg.is_zero() {
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
        } else {
            let caliber: Decimal = steps.iter().map(|step| step.caliber * step.total_kg).sum();
            let breakage: Decimal = steps.iter().map(|step| step.breakage * step.total_kg).sum();
            let efficiency = if initial_kg.is_zero() {
                Decimal::ZERO
            } else {
                total_production_kg / initial_kg * Decimal::ONE_HUNDRED
            };
            (caliber / total_production_kg, breakage / total_production_kg, efficiency)
        };

        Self {
            policy,
            is_best: false,
            total_production_kg,
            avg_caliber,
            avg_breakage,
            remaining_kg,
            efficiency_percent,
            steps,
        }
    }

    /// 批次數
    pub fn batch_count(&self) -> usize {
        self.steps.len()
    }

    /// 情境名稱，例如 "1. Senaryo (En Yüksek Stok İlk)"
    pub fn name(&self, rank: usize) -> String {
        format!("{}. Senaryo ({})", rank, self.policy.label())
    }
}

/// 規劃結果（已排序，第一個為最佳）
#[derive(Debug, Clone, Serialize)]
pub struct PlanResult {
    pub scenarios: Vec<Scenario>,

    /// 規劃信息
    pub messages: Vec<String>,
}

impl PlanResult {
    /// 最佳情境
    pub fn best(&self) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.is_best)
    }
}
