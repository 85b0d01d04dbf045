//! 倉庫訂單 → 可混合庫存批次

use tracko_core::{Order, QualityAnalysis, StockLot, TrackerConfig};

/// 無卡車號時顯示的文字
pub const NO_TRUCK: &str = "Tır Yok";

/// 庫存投影器
pub struct StockProjector;

impl StockProjector {
    /// 將倉庫中、未封存的訂單投影為庫存批次
    ///
    /// 品質取自最新一筆相符的入庫分析（先比對貨櫃號，再比對合約號），
    /// 沒有分析時使用設定中的等級預設值。
    pub fn project(orders: &[Order], analyses: &[QualityAnalysis], config: &TrackerConfig) -> Vec<StockLot> {
        let lots: Vec<StockLot> = orders
            .iter()
            .filter(|order| order.is_in_stock(config.warehouse_stage))
            .map(|order| Self::project_order(order, analyses, config))
            .collect();

        tracing::debug!("庫存投影：{} 筆訂單 → {} 個批次", orders.len(), lots.len());
        lots
    }

    fn project_order(order: &Order, analyses: &[QualityAnalysis], config: &TrackerConfig) -> StockLot {
        let defaults = config.quality_for(order.grade);
        let analysis = Self::find_analysis(order, analyses);

        let (caliber, breakage) = match analysis {
            Some(analysis) => {
                let caliber = if analysis.caliber.is_zero() {
                    defaults.caliber
                } else {
                    analysis.caliber
                };
                (caliber, analysis.breakage_total())
            }
            None => {
                tracing::debug!("訂單 {} 無入庫分析，使用 {} 預設品質", order.contract_no, order.grade);
                (defaults.caliber, defaults.breakage_percent)
            }
        };

        let truck_no = order
            .truck_no
            .as_deref()
            .map(str::trim)
            .filter(|truck| !truck.is_empty())
            .unwrap_or(NO_TRUCK)
            .to_string();

        StockLot::new(order.id.clone(), order.total_kg, caliber, breakage)
            .with_reference(order.contract_no.clone(), truck_no)
    }

    /// 相符的分析：先比對貨櫃號，再比對合約號
    fn find_analysis<'a>(order: &Order, analyses: &'a [QualityAnalysis]) -> Option<&'a QualityAnalysis> {
        let by_container = order
            .container_no
            .as_deref()
            .map(str::trim)
            .filter(|no| !no.is_empty())
            .and_then(|no| {
                Self::newest(analyses, |analysis| analysis.container_no.trim().eq_ignore_ascii_case(no))
            });

        by_container.or_else(|| {
            let contract = order.contract_no.trim();
            if contract.is_empty() {
                None
            } else {
                Self::newest(analyses, |analysis| analysis.contract_no.trim().eq_ignore_ascii_case(contract))
            }
        })
    }

    /// 最新一筆；日期相同時取較晚加入者
    fn newest<'a>(
        analyses: &'a [QualityAnalysis],
        matches: impl Fn(&QualityAnalysis) -> bool,
    ) -> Option<&'a QualityAnalysis> {
        analyses
            .iter()
            .filter(|analysis| matches(analysis))
            .fold(None, |latest: Option<&'a QualityAnalysis>, analysis| match latest {
                Some(current) if current.date > analysis.date => Some(current),
                _ => Some(analysis),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tracko_core::{Grade, Stage};

    fn warehouse_order(contract: &str, grade: Grade, kg: i64) -> Order {
        Order::new(contract.to_string(), "Supplier".to_string(), grade)
            .with_stage(Stage::Warehouse)
            .with_quantities(Decimal::new(350, 2), Decimal::from(kg), Decimal::ZERO)
    }

    #[test]
    fn test_only_warehouse_unarchived_orders_are_projected() {
        let mut archived = warehouse_order("C-2", Grade::WW320, 1000);
        archived.is_archived = true;
        let orders = vec![
            warehouse_order("C-1", Grade::WW320, 16000),
            archived,
            warehouse_order("C-3", Grade::WW240, 5000).with_stage(Stage::Bonded),
        ];

        let lots = StockProjector::project(&orders, &[], &TrackerConfig::default());

        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].contract_no, "C-1");
        assert_eq!(lots[0].available_kg, Decimal::from(16000));
        assert_eq!(lots[0].truck_no, NO_TRUCK);
    }

    #[test]
    fn test_grade_defaults_without_analysis() {
        let orders = vec![
            warehouse_order("C-1", Grade::WW320, 1000),
            warehouse_order("C-2", Grade::WW240, 1000),
            warehouse_order("C-3", Grade::WW180, 1000),
        ];

        let lots = StockProjector::project(&orders, &[], &TrackerConfig::default());

        assert_eq!(lots[0].caliber, Decimal::from(309));
        assert_eq!(lots[0].breakage_percent, Decimal::ONE);
        assert_eq!(lots[1].caliber, Decimal::from(299));
        assert_eq!(lots[1].breakage_percent, Decimal::TWO);
        assert_eq!(lots[2].caliber, Decimal::from(185));
    }

    #[test]
    fn test_newest_container_analysis_wins() {
        let order = warehouse_order("C-1", Grade::WW320, 1000)
            .with_container_no("MSKU1234567".to_string())
            .with_truck_no("34 ABC 101".to_string());

        let old = QualityAnalysis::new("C-1".to_string(), "MSKU1234567".to_string(), Grade::WW320)
            .with_defects(Decimal::from(320), Decimal::ONE, Decimal::ONE)
            .with_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let new = QualityAnalysis::new("C-1".to_string(), "MSKU1234567".to_string(), Grade::WW320)
            .with_defects(Decimal::from(305), Decimal::new(5, 1), Decimal::new(3, 1))
            .with_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        let contract_only = QualityAnalysis::new("C-1".to_string(), "OTHER".to_string(), Grade::WW320)
            .with_defects(Decimal::from(290), Decimal::ONE, Decimal::ONE)
            .with_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let lots = StockProjector::project(&[order], &[new, old, contract_only], &TrackerConfig::default());

        assert_eq!(lots[0].caliber, Decimal::from(305));
        assert_eq!(lots[0].breakage_percent, Decimal::new(8, 1));
        assert_eq!(lots[0].truck_no, "34 ABC 101");
    }

    #[test]
    fn test_contract_match_when_no_container() {
        let order = warehouse_order("C-9", Grade::WW240, 1000);
        let analysis = QualityAnalysis::new("c-9".to_string(), String::new(), Grade::WW240)
            .with_defects(Decimal::from(250), Decimal::TWO, Decimal::ONE);

        let lots = StockProjector::project(&[order], &[analysis], &TrackerConfig::default());

        assert_eq!(lots[0].caliber, Decimal::from(250));
        assert_eq!(lots[0].breakage_percent, Decimal::from(3));
    }
}
