//! Excel 匯入
//!
//! 讀取 `SATIN ALMA`（採購訂單）與 `GİRİŞ ANALİZİ`（入庫分析）兩張工作表，
//! 其他工作表忽略。單列的問題收集為 [`RowError`]，不中斷整批匯入。

use calamine::{open_workbook_auto, Reader};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeSet;
use std::path::Path;
use tracko_calc::OrderDerivation;
use tracko_core::{Grade, Order, QualityAnalysis, Stage};

use crate::error::{ImportError, Result, RowError};
use crate::mapping::{AnalysisField, Column, OrderField};
use crate::normalize::{
    cell_date, cell_number, cell_text, normalize_container, normalize_grade, normalize_packaging,
};
use crate::sheet::{RawCell, SheetRow, SheetRows};

/// 匯入結果
#[derive(Debug, Default)]
pub struct ImportResult {
    pub orders: Vec<Order>,
    pub analyses: Vec<QualityAnalysis>,
    pub errors: Vec<RowError>,
}

impl ImportResult {
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.analyses.is_empty()
    }
}

/// 列出活頁簿中的工作表名稱
pub fn sheet_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = check_path(path.as_ref())?;
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names())
}

fn check_path(path: &Path) -> Result<&Path> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(path),
        _ => Err(ImportError::UnsupportedFormat(ext)),
    }
}

/// Excel 匯入器
pub struct ExcelImporter;

impl ExcelImporter {
    /// 採購訂單工作表
    pub const ORDER_SHEET: &'static str = "SATIN ALMA";
    /// 入庫分析工作表
    pub const ANALYSIS_SHEET: &'static str = "GİRİŞ ANALİZİ";

    /// 讀取活頁簿並轉換兩張工作表
    pub fn import_path(path: impl AsRef<Path>) -> Result<ImportResult> {
        let path = check_path(path.as_ref())?;
        tracing::info!("開始匯入: {}", path.display());

        let mut workbook = open_workbook_auto(path)?;
        let names = workbook.sheet_names();

        let mut read_sheet = |name: &str| -> Result<Option<SheetRows>> {
            if !names.iter().any(|n| n == name) {
                tracing::warn!("找不到工作表: {}", name);
                return Ok(None);
            }
            let range = workbook.worksheet_range(name)?;
            Ok(Some(SheetRows::from_range(name, &range)))
        };

        let orders = read_sheet(Self::ORDER_SHEET)?;
        let analyses = read_sheet(Self::ANALYSIS_SHEET)?;

        Ok(Self::import_sheets(orders.as_ref(), analyses.as_ref()))
    }

    /// 轉換已讀取的工作表
    pub fn import_sheets(orders: Option<&SheetRows>, analyses: Option<&SheetRows>) -> ImportResult {
        let mut result = ImportResult::default();

        if let Some(sheet) = orders {
            let (parsed, errors) = Self::parse_orders(sheet);
            result.orders = parsed;
            result.errors.extend(errors);
        }
        if let Some(sheet) = analyses {
            let (parsed, errors) = Self::parse_analyses(sheet);
            result.analyses = parsed;
            result.errors.extend(errors);
        }

        tracing::info!(
            "匯入完成：{} 筆訂單、{} 筆分析、{} 個問題",
            result.orders.len(),
            result.analyses.len(),
            result.errors.len()
        );

        result
    }

    /// 採購工作表 → 訂單（階段為 Depoda）
    ///
    /// 沒有合約號的列略過。
    pub fn parse_orders(sheet: &SheetRows) -> (Vec<Order>, Vec<RowError>) {
        log_unknown_headers(sheet, |h| OrderField::from_header(h).is_some());

        let mut orders = Vec::new();
        let mut errors = Vec::new();

        for row in &sheet.rows {
            let mut order = Order::new(String::new(), String::new(), Grade::WW320).with_stage(Stage::Warehouse);
            let mut fcl_count = Decimal::ZERO;

            for (header, cell) in ordered_cells(sheet, row) {
                let Some(Column::Field(field)) = OrderField::from_header(header) else {
                    continue;
                };

                match field {
                    OrderField::OrderDate => order.order_date = read_date(sheet, row, header, cell, &mut errors),
                    OrderField::Etd => order.etd = read_date(sheet, row, header, cell, &mut errors),
                    OrderField::Eta => order.eta = read_date(sheet, row, header, cell, &mut errors),
                    OrderField::ContractNo => order.contract_no = cell.as_text(),
                    OrderField::Supplier => order.supplier = cell.as_text(),
                    OrderField::Grade => order.grade = normalize_grade(cell),
                    OrderField::HarvestYear => order.harvest_year = cell_text(cell),
                    OrderField::Packaging => order.packaging_type = normalize_packaging(cell),
                    OrderField::ContainerType => order.container_type = normalize_container(cell),
                    OrderField::FobPrice => order.fob_price = Some(cell_number(cell)),
                    OrderField::CnfPrice => order.cnf_price = Some(cell_number(cell)),
                    OrderField::FreightPrice => order.freight_price = Some(cell_number(cell)),
                    OrderField::TotalLb => order.total_lb = cell_number(cell),
                    OrderField::TotalKg => order.total_kg = cell_number(cell),
                    OrderField::FclCount => fcl_count = cell_number(cell),
                    OrderField::ContainerNo => order.container_no = cell_text(cell),
                    OrderField::AntrepoDeclarationNo => order.antrepo_declaration_no = cell_text(cell),
                    OrderField::BlNo => order.bl_no = cell_text(cell),
                    OrderField::BookingNo => order.booking_no = cell_text(cell),
                    OrderField::AnRefNo => order.an_ref_no = cell_text(cell),
                    OrderField::TruckNo => order.truck_no = cell_text(cell),
                }
            }

            if order.contract_no.is_empty() {
                tracing::debug!("{} 第 {} 列沒有合約號，略過", sheet.name, row.number);
                continue;
            }

            order.fcl_count = fcl_count
                .round()
                .to_u32()
                .filter(|count| *count > 0)
                .unwrap_or(1);
            OrderDerivation::derive_imported(&mut order);

            orders.push(order);
        }

        (orders, errors)
    }

    /// 入庫分析工作表 → 品質分析
    ///
    /// 合約號與貨櫃號都沒有的列略過；未填 Şak-Kırık 時由半粒與碎粒相加。
    pub fn parse_analyses(sheet: &SheetRows) -> (Vec<QualityAnalysis>, Vec<RowError>) {
        log_unknown_headers(sheet, |h| AnalysisField::from_header(h).is_some());

        let mut analyses = Vec::new();
        let mut errors = Vec::new();

        for row in &sheet.rows {
            let mut analysis = QualityAnalysis::new(String::new(), String::new(), Grade::WW320);

            for (header, cell) in ordered_cells(sheet, row) {
                let Some(Column::Field(field)) = AnalysisField::from_header(header) else {
                    continue;
                };

                match field {
                    AnalysisField::Grade => analysis.grade = normalize_grade(cell),
                    AnalysisField::ContractNo => analysis.contract_no = cell.as_text(),
                    AnalysisField::ContainerNo => analysis.container_no = cell.as_text(),
                    AnalysisField::TruckNo => analysis.truck_no = cell_text(cell),
                    AnalysisField::BatchNo => analysis.batch_no = cell_text(cell),
                    AnalysisField::Date => analysis.date = read_date(sheet, row, header, cell, &mut errors),
                    AnalysisField::Analyst => analysis.analyst = cell.as_text(),
                    AnalysisField::Moisture => analysis.moisture = cell_number(cell),
                    AnalysisField::ForeignMatter => analysis.foreign_matter = cell_number(cell),
                    AnalysisField::Caliber => analysis.caliber = cell_number(cell),
                    AnalysisField::HalvesRatio => analysis.halves_ratio = cell_number(cell),
                    AnalysisField::BrokenRatio => analysis.broken_ratio = cell_number(cell),
                    AnalysisField::TotalHB => analysis.total_h_b = cell_number(cell),
                    AnalysisField::SkinOn => analysis.skin_on = cell_number(cell),
                    AnalysisField::Spotted => analysis.spotted = cell_number(cell),
                    AnalysisField::Immature => analysis.immature = cell_number(cell),
                    AnalysisField::TipBroken => analysis.tip_broken = cell_number(cell),
                    AnalysisField::InsectBored => analysis.insect_bored = cell_number(cell),
                    AnalysisField::OffColor => analysis.off_color = cell_number(cell),
                    AnalysisField::SmallCaliber => analysis.small_caliber = cell_number(cell),
                    AnalysisField::LargeCaliber => analysis.large_caliber = cell_number(cell),
                }
            }

            if analysis.contract_no.is_empty() && analysis.container_no.is_empty() {
                tracing::debug!("{} 第 {} 列沒有合約號與貨櫃號，略過", sheet.name, row.number);
                continue;
            }
            if analysis.total_h_b.is_zero() {
                analysis.total_h_b = analysis.halves_ratio + analysis.broken_ratio;
            }

            analyses.push(analysis);
        }

        (analyses, errors)
    }
}

/// 依標題順序走訪一列的儲存格
fn ordered_cells<'a>(sheet: &'a SheetRows, row: &'a SheetRow) -> impl Iterator<Item = (&'a str, &'a RawCell)> {
    sheet
        .headers
        .iter()
        .filter_map(move |header| row.get(header).map(|cell| (header.as_str(), cell)))
}

/// 無法辨識的日期記錄為列錯誤，欄位留空
fn read_date(
    sheet: &SheetRows,
    row: &SheetRow,
    header: &str,
    cell: &RawCell,
    errors: &mut Vec<RowError>,
) -> Option<chrono::NaiveDate> {
    match cell_date(cell) {
        Ok(date) => date,
        Err(raw) => {
            errors.push(RowError::new(
                &sheet.name,
                row.number,
                format!("{header}: 無法辨識的日期 '{raw}'"),
            ));
            None
        }
    }
}

fn log_unknown_headers(sheet: &SheetRows, known: impl Fn(&str) -> bool) {
    let unknown: BTreeSet<&str> = sheet
        .headers
        .iter()
        .map(String::as_str)
        .filter(|header| !header.is_empty() && !known(header))
        .collect();
    if !unknown.is_empty() {
        tracing::debug!("{} 未對應的欄位: {:?}", sheet.name, unknown);
    }
}
