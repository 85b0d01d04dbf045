//! 儀表板統計

use rust_decimal::Decimal;
use serde::Serialize;
use tracko_core::{Grade, Order, PriceRecord, PriceTrend, Stage};

/// 單一等級的價格統計
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub grade: Grade,
    pub max: Decimal,
    pub min: Decimal,
    pub average: Decimal,
    /// 日期最新的一筆
    pub current: Decimal,
    /// 目前價格相對平均的差異（%）
    pub diff_from_average_percent: Decimal,
}

/// 等級價格看板：最新一筆與前一筆
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTicker {
    pub grade: Grade,
    pub previous: Decimal,
    pub current: Decimal,
    pub trend: PriceTrend,
}

/// 庫存平均成本（$/lb）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryStats {
    /// 倉庫庫存平均單價
    pub warehouse_avg_price: Decimal,
    /// 倉庫庫存總磅數
    pub warehouse_lb: Decimal,
    /// 保稅倉 + 倉庫平均單價
    pub combined_avg_price: Decimal,
    /// 保稅倉 + 倉庫總磅數
    pub combined_lb: Decimal,
}

/// 分佈項目（等級或供應商）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub name: String,
    pub kg: Decimal,
    pub percent: Decimal,
}

/// 採購量統計
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionStats {
    pub total_kg: Decimal,
    pub total_lb: Decimal,
    pub total_fcl: u32,
    pub grades: Vec<Share>,
    /// 前五大供應商（依公斤數）
    pub top_suppliers: Vec<Share>,
}

/// 各等級數量（公噸）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityRow {
    pub grade: Option<Grade>,
    /// 預計到貨（已下單至已到港）
    pub expected_t: Decimal,
    /// 保稅倉
    pub bonded_t: Decimal,
    /// 倉庫
    pub warehouse_t: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantitySummary {
    pub rows: Vec<QuantityRow>,
    pub totals: QuantityRow,
}

/// 等級 × 階段訂單數
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageMatrixRow {
    pub grade: Option<Grade>,
    /// 依 `Stage::ALL` 順序
    pub counts: Vec<usize>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageMatrix {
    pub rows: Vec<StageMatrixRow>,
    pub totals: StageMatrixRow,
}

/// 統計計算器
///
/// 訂單統計只計入未封存的訂單。
pub struct StatsCalculator;

impl StatsCalculator {
    /// 等級價格統計；沒有紀錄時回傳 `None`
    pub fn price_stats(history: &[PriceRecord], grade: Grade) -> Option<PriceStats> {
        let records: Vec<&PriceRecord> = history.iter().filter(|r| r.grade == grade).collect();
        let current = Self::newest(&records)?.price;

        let max = records.iter().map(|r| r.price).max()?;
        let min = records.iter().map(|r| r.price).min()?;
        let sum: Decimal = records.iter().map(|r| r.price).sum();
        let average = sum / Decimal::from(records.len());

        let diff_from_average_percent = if average.is_zero() {
            Decimal::ZERO
        } else {
            (current - average) / average * Decimal::ONE_HUNDRED
        };

        Some(PriceStats {
            grade,
            max,
            min,
            average,
            current,
            diff_from_average_percent,
        })
    }

    /// 各等級的最新與前一筆價格
    pub fn price_tickers(history: &[PriceRecord]) -> Vec<PriceTicker> {
        Grade::ALL
            .into_iter()
            .map(|grade| {
                let mut records: Vec<&PriceRecord> = history.iter().filter(|r| r.grade == grade).collect();
                // 新到舊；同日期時較晚加入者在前
                records.reverse();
                records.sort_by(|a, b| b.date.cmp(&a.date));

                let current = records.first();
                let previous = records.get(1).or(current);
                PriceTicker {
                    grade,
                    previous: previous.map_or(Decimal::ZERO, |r| r.price),
                    current: current.map_or(Decimal::ZERO, |r| r.price),
                    trend: current.map_or(PriceTrend::Stable, |r| r.trend),
                }
            })
            .collect()
    }

    /// 庫存平均成本，可依等級篩選
    pub fn inventory_stats(orders: &[Order], grade: Option<Grade>) -> InventoryStats {
        let in_scope = |order: &&Order| !order.is_archived && grade.map_or(true, |g| order.grade == g);

        let (warehouse_value, warehouse_lb) = Self::value_and_lb(
            orders
                .iter()
                .filter(in_scope)
                .filter(|order| order.stage == Stage::Warehouse),
        );
        let (combined_value, combined_lb) = Self::value_and_lb(
            orders
                .iter()
                .filter(in_scope)
                .filter(|order| matches!(order.stage, Stage::Bonded | Stage::Warehouse)),
        );

        InventoryStats {
            warehouse_avg_price: Self::safe_div(warehouse_value, warehouse_lb),
            warehouse_lb,
            combined_avg_price: Self::safe_div(combined_value, combined_lb),
            combined_lb,
        }
    }

    /// 採購量、等級分佈與前五大供應商
    pub fn production_stats(orders: &[Order]) -> ProductionStats {
        let active: Vec<&Order> = orders.iter().filter(|o| !o.is_archived).collect();

        let total_kg: Decimal = active.iter().map(|o| o.total_kg).sum();
        let total_lb: Decimal = active.iter().map(|o| o.total_lb).sum();
        let total_fcl: u32 = active.iter().map(|o| o.fcl_count).sum();

        let share = |name: String, kg: Decimal| Share {
            name,
            kg,
            percent: Self::safe_div(kg, total_kg) * Decimal::ONE_HUNDRED,
        };

        let grades = Grade::ALL
            .into_iter()
            .map(|grade| {
                let kg = active.iter().filter(|o| o.grade == grade).map(|o| o.total_kg).sum();
                share(grade.to_string(), kg)
            })
            .collect();

        // 依首次出現順序彙總，排序穩定
        let mut suppliers: Vec<(String, Decimal)> = Vec::new();
        for order in &active {
            match suppliers.iter_mut().find(|(name, _)| name == &order.supplier) {
                Some((_, kg)) => *kg += order.total_kg,
                None => suppliers.push((order.supplier.clone(), order.total_kg)),
            }
        }
        suppliers.sort_by(|a, b| b.1.cmp(&a.1));
        let top_suppliers = suppliers
            .into_iter()
            .take(5)
            .map(|(name, kg)| share(name, kg))
            .collect();

        ProductionStats {
            total_kg,
            total_lb,
            total_fcl,
            grades,
            top_suppliers,
        }
    }

    /// 各等級預計 / 保稅倉 / 倉庫數量（公噸）
    pub fn quantity_summary(orders: &[Order]) -> QuantitySummary {
        let active: Vec<&Order> = orders.iter().filter(|o| !o.is_archived).collect();

        let row = |grade: Option<Grade>| {
            let tonnes = |stage_filter: &dyn Fn(Stage) -> bool| -> Decimal {
                active
                    .iter()
                    .filter(|o| grade.map_or(true, |g| o.grade == g) && stage_filter(o.stage))
                    .map(|o| o.total_tonnes())
                    .sum()
            };
            QuantityRow {
                grade,
                expected_t: tonnes(&|stage| stage.is_expected()),
                bonded_t: tonnes(&|stage| stage == Stage::Bonded),
                warehouse_t: tonnes(&|stage| stage == Stage::Warehouse),
            }
        };

        QuantitySummary {
            rows: Grade::ALL.into_iter().map(|grade| row(Some(grade))).collect(),
            totals: row(None),
        }
    }

    /// 等級 × 階段訂單數
    pub fn stage_matrix(orders: &[Order]) -> StageMatrix {
        let active: Vec<&Order> = orders.iter().filter(|o| !o.is_archived).collect();

        let row = |grade: Option<Grade>| {
            let counts: Vec<usize> = Stage::ALL
                .iter()
                .map(|stage| {
                    active
                        .iter()
                        .filter(|o| o.stage == *stage && grade.map_or(true, |g| o.grade == g))
                        .count()
                })
                .collect();
            let total = counts.iter().sum();
            StageMatrixRow { grade, counts, total }
        };

        StageMatrix {
            rows: Grade::ALL.into_iter().map(|grade| row(Some(grade))).collect(),
            totals: row(None),
        }
    }

    fn newest<'a>(records: &[&'a PriceRecord]) -> Option<&'a PriceRecord> {
        records.iter().copied().fold(None, |latest: Option<&'a PriceRecord>, record| match latest {
            Some(current) if current.date > record.date => Some(current),
            _ => Some(record),
        })
    }

    fn value_and_lb<'a>(orders: impl Iterator<Item = &'a Order>) -> (Decimal, Decimal) {
        orders.fold((Decimal::ZERO, Decimal::ZERO), |(value, lb), order| {
            (value + order.unit_price * order.total_lb, lb + order.total_lb)
        })
    }

    fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
        if denominator.is_zero() {
            Decimal::ZERO
        } else {
            numerator / denominator
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn order(supplier: &str, grade: Grade, stage: Stage, kg: i64, lb: i64, price: Decimal) -> Order {
        Order::new(format!("C-{supplier}-{kg}"), supplier.to_string(), grade)
            .with_stage(stage)
            .with_quantities(price, Decimal::from(kg), Decimal::from(lb))
    }

    fn orders() -> Vec<Order> {
        let mut archived = order("Z Corp", Grade::WW320, Stage::Warehouse, 99000, 218257, Decimal::from(9));
        archived.is_archived = true;
        vec![
            order("Vietnam Cashew", Grade::WW320, Stage::Warehouse, 16000, 35274, Decimal::new(350, 2)),
            order("Africa Nut", Grade::WW240, Stage::Bonded, 24000, 52911, Decimal::new(400, 2)),
            order("Vietnam Cashew", Grade::WW180, Stage::InTransit, 10000, 22046, Decimal::new(450, 2)),
            archived,
        ]
    }

    #[test]
    fn test_price_stats() {
        let history = vec![
            PriceRecord::new(date(5), Grade::WW320, Decimal::new(380, 2)),
            PriceRecord::new(date(20), Grade::WW320, Decimal::new(390, 2)),
            PriceRecord::new(date(10), Grade::WW320, Decimal::new(370, 2)),
            PriceRecord::new(date(10), Grade::WW240, Decimal::new(410, 2)),
        ];

        let stats = StatsCalculator::price_stats(&history, Grade::WW320).unwrap();

        assert_eq!(stats.max, Decimal::new(390, 2));
        assert_eq!(stats.min, Decimal::new(370, 2));
        assert_eq!(stats.average, Decimal::new(380, 2));
        assert_eq!(stats.current, Decimal::new(390, 2));
        assert_eq!(stats.diff_from_average_percent.round_dp(2), Decimal::new(263, 2));

        assert!(StatsCalculator::price_stats(&history, Grade::WW180).is_none());
    }

    #[test]
    fn test_price_tickers() {
        let history = vec![
            PriceRecord::new(date(5), Grade::WW320, Decimal::new(380, 2)),
            PriceRecord::new(date(20), Grade::WW320, Decimal::new(385, 2)).with_trend(PriceTrend::Up, "+0,05".to_string()),
            PriceRecord::new(date(10), Grade::WW240, Decimal::new(410, 2)),
        ];

        let tickers = StatsCalculator::price_tickers(&history);

        assert_eq!(tickers[0].current, Decimal::new(385, 2));
        assert_eq!(tickers[0].previous, Decimal::new(380, 2));
        assert_eq!(tickers[0].trend, PriceTrend::Up);
        assert_eq!(tickers[1].previous, tickers[1].current);
        assert_eq!(tickers[2].current, Decimal::ZERO);
    }

    #[test]
    fn test_inventory_stats() {
        let stats = StatsCalculator::inventory_stats(&orders(), None);

        assert_eq!(stats.warehouse_avg_price, Decimal::new(350, 2));
        assert_eq!(stats.warehouse_lb, Decimal::from(35274));
        assert_eq!(stats.combined_lb, Decimal::from(35274 + 52911));
        let expected = (Decimal::new(350, 2) * Decimal::from(35274) + Decimal::from(4) * Decimal::from(52911))
            / Decimal::from(35274 + 52911);
        assert_eq!(stats.combined_avg_price, expected);

        let filtered = StatsCalculator::inventory_stats(&orders(), Some(Grade::WW180));
        assert_eq!(filtered.warehouse_avg_price, Decimal::ZERO);
        assert_eq!(filtered.combined_lb, Decimal::ZERO);
    }

    #[test]
    fn test_production_stats() {
        let stats = StatsCalculator::production_stats(&orders());

        assert_eq!(stats.total_kg, Decimal::from(50000));
        assert_eq!(stats.total_fcl, 3);
        assert_eq!(stats.grades[0].percent, Decimal::from(32));
        assert_eq!(stats.top_suppliers[0].name, "Vietnam Cashew");
        assert_eq!(stats.top_suppliers[0].kg, Decimal::from(26000));
        assert_eq!(stats.top_suppliers.len(), 2);
    }

    #[test]
    fn test_quantity_summary() {
        let summary = StatsCalculator::quantity_summary(&orders());

        assert_eq!(summary.rows[0].warehouse_t, Decimal::from(16));
        assert_eq!(summary.rows[1].bonded_t, Decimal::from(24));
        assert_eq!(summary.rows[2].expected_t, Decimal::from(10));
        assert_eq!(summary.totals.expected_t, Decimal::from(10));
        assert_eq!(summary.totals.warehouse_t, Decimal::from(16));
    }

    #[test]
    fn test_stage_matrix() {
        let matrix = StatsCalculator::stage_matrix(&orders());

        assert_eq!(matrix.rows[0].counts[5], 1);
        assert_eq!(matrix.rows[1].counts[4], 1);
        assert_eq!(matrix.rows[2].counts[2], 1);
        assert_eq!(matrix.totals.total, 3);
        assert_eq!(matrix.totals.counts.len(), Stage::ALL.len());
    }
}
