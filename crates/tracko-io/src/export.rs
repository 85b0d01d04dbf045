//! CSV 匯出（`;` 分隔、UTF-8 BOM，可直接以 Excel 開啟）

use chrono::NaiveDate;
use csv::{Terminator, Writer, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracko_core::format::format_date_tr;
use tracko_core::{FreightRecord, Order, PriceRecord};

use crate::error::Result;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV 匯出器
pub struct CsvExporter;

impl CsvExporter {
    pub const PRICE_HEADERS: [&'static str; 5] = ["Tarih", "Grade", "Fiyat ($)", "Değişim", "Durum"];
    pub const FREIGHT_HEADERS: [&'static str; 4] = ["Tarih", "Fiyat ($)", "Değişim", "Durum"];
    pub const ORDER_HEADERS: [&'static str; 12] = [
        "Kontrat",
        "Tedarikçi",
        "Grade",
        "Aşama",
        "Sipariş Tarihi",
        "ETA",
        "Miktar (KG)",
        "Miktar (LB)",
        "Birim Fiyat ($)",
        "Toplam ($)",
        "Konteyner No",
        "B/L No",
    ];

    /// 價格紀錄
    pub fn write_prices<W: Write>(writer: W, records: &[PriceRecord]) -> Result<()> {
        let mut csv = Self::writer(writer)?;
        csv.write_record(Self::PRICE_HEADERS)?;
        for record in records {
            csv.write_record([
                format_date_tr(record.date),
                record.grade.to_string(),
                record.price.normalize().to_string(),
                record.change.clone(),
                record.trend.csv_label().to_string(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// 運費紀錄
    pub fn write_freight<W: Write>(writer: W, records: &[FreightRecord]) -> Result<()> {
        let mut csv = Self::writer(writer)?;
        csv.write_record(Self::FREIGHT_HEADERS)?;
        for record in records {
            csv.write_record([
                format_date_tr(record.date),
                record.price.normalize().to_string(),
                record.change.clone(),
                record.trend.csv_label().to_string(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// 訂單清單
    pub fn write_orders<W: Write>(writer: W, orders: &[&Order]) -> Result<()> {
        let mut csv = Self::writer(writer)?;
        csv.write_record(Self::ORDER_HEADERS)?;
        for order in orders {
            csv.write_record([
                order.contract_no.clone(),
                order.supplier.clone(),
                order.grade.to_string(),
                order.stage.to_string(),
                order.order_date.map(format_date_tr).unwrap_or_default(),
                order.eta.map(format_date_tr).unwrap_or_default(),
                order.total_kg.normalize().to_string(),
                order.total_lb.normalize().to_string(),
                order.unit_price.normalize().to_string(),
                order.total_price.round_dp(2).normalize().to_string(),
                order.container_no.clone().unwrap_or_default(),
                order.bl_no.clone().unwrap_or_default(),
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// 建立檔案並寫入
    pub fn to_path<F>(path: impl AsRef<Path>, write: F) -> Result<()>
    where
        F: FnOnce(File) -> Result<()>,
    {
        let path = path.as_ref();
        let file = File::create(path)?;
        write(file)?;
        tracing::info!("已匯出: {}", path.display());
        Ok(())
    }

    /// 預設檔名（例如 `kaju_fiyat_takip_2024-01-15.csv`）
    pub fn default_file_name(prefix: &str, date: NaiveDate) -> String {
        format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
    }

    fn writer<W: Write>(mut writer: W) -> Result<Writer<W>> {
        writer.write_all(UTF8_BOM)?;
        Ok(WriterBuilder::new()
            .delimiter(b';')
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer))
    }
}
