//! 價格走勢計算

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracko_core::format::format_change_tr;
use tracko_core::{FreightRecord, Grade, PriceRecord, PriceTrend};

/// 走勢計算器
///
/// 新價格與「日期不晚於新紀錄的最新一筆」比較；同日期時取較晚加入者。
pub struct TrendCalculator;

impl TrendCalculator {
    /// 等級價格走勢（只比較同等級）
    pub fn price_trend(
        history: &[PriceRecord],
        grade: Grade,
        price: Decimal,
        date: NaiveDate,
        exclude_id: Option<&str>,
    ) -> (PriceTrend, String) {
        let previous = Self::latest_before(
            history
                .iter()
                .filter(|record| record.grade == grade)
                .map(|record| (record.id.as_str(), record.date, record.price)),
            date,
            exclude_id,
        );
        Self::compare(previous, price)
    }

    /// 運費走勢
    pub fn freight_trend(
        history: &[FreightRecord],
        price: Decimal,
        date: NaiveDate,
        exclude_id: Option<&str>,
    ) -> (PriceTrend, String) {
        let previous = Self::latest_before(
            history
                .iter()
                .map(|record| (record.id.as_str(), record.date, record.price)),
            date,
            exclude_id,
        );
        Self::compare(previous, price)
    }

    fn latest_before<'a>(
        records: impl Iterator<Item = (&'a str, NaiveDate, Decimal)>,
        date: NaiveDate,
        exclude_id: Option<&str>,
    ) -> Option<Decimal> {
        records
            .filter(|(id, record_date, _)| Some(*id) != exclude_id && *record_date <= date)
            .fold(None, |latest: Option<(NaiveDate, Decimal)>, (_, record_date, price)| {
                match latest {
                    Some((latest_date, _)) if latest_date > record_date => latest,
                    _ => Some((record_date, price)),
                }
            })
            .map(|(_, price)| price)
    }

    fn compare(previous: Option<Decimal>, price: Decimal) -> (PriceTrend, String) {
        match previous {
            Some(previous) => {
                let diff = price - previous;
                (PriceTrend::from_diff(diff), format_change_tr(diff))
            }
            None => (PriceTrend::Stable, format_change_tr(Decimal::ZERO)),
        }
    }
}
