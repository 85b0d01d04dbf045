//! 儲存格值正規化

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracko_core::format::{excel_serial_to_date, parse_date_tr, parse_number_tr};
use tracko_core::{ContainerType, Grade, PackagingType};

use crate::sheet::RawCell;

/// 等級：包含 320/240/180 者對應該等級，其餘為 WW320
pub fn normalize_grade(cell: &RawCell) -> Grade {
    let value = cell.as_text().to_uppercase();
    if value.contains("320") {
        Grade::WW320
    } else if value.contains("240") {
        Grade::WW240
    } else if value.contains("180") {
        Grade::WW180
    } else {
        Grade::WW320
    }
}

/// 包裝方式（土耳其文或英文），預設為真空包裝
pub fn normalize_packaging(cell: &RawCell) -> PackagingType {
    let value = cell.as_text().to_lowercase();
    if value.contains("vakum") || value.contains("vacuum") {
        PackagingType::Vacuum
    } else if value.contains("teneke") || value.contains("tin") {
        PackagingType::Tin
    } else if value.contains("koli") || value.contains("carton") {
        PackagingType::Carton
    } else if value.contains("çuval") || value.contains("bag") {
        PackagingType::Bag
    } else {
        PackagingType::Vacuum
    }
}

/// 貨櫃尺寸：包含 20 為 20'，其餘為 40'
pub fn normalize_container(cell: &RawCell) -> ContainerType {
    if cell.as_text().contains("20") {
        ContainerType::Twenty
    } else {
        ContainerType::Forty
    }
}

/// 數值；空白或無法解析時為 0
pub fn cell_number(cell: &RawCell) -> Decimal {
    match cell {
        RawCell::Number(value) => Decimal::from_str(&value.to_string())
            .or_else(|_| Decimal::try_from(*value))
            .unwrap_or(Decimal::ZERO),
        RawCell::Text(text) => parse_number_tr(text),
        RawCell::Empty | RawCell::Bool(_) => Decimal::ZERO,
    }
}

/// 非空白文字
pub fn cell_text(cell: &RawCell) -> Option<String> {
    let text = cell.as_text();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// 日期：Excel 序號或 `dd.mm.yyyy` / `dd/mm/yyyy` / ISO 文字
///
/// 空白為 `Ok(None)`；無法辨識時回傳原始文字。
pub fn cell_date(cell: &RawCell) -> Result<Option<NaiveDate>, String> {
    match cell {
        RawCell::Number(serial) => excel_serial_to_date(*serial)
            .map(Some)
            .ok_or_else(|| serial.to_string()),
        RawCell::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            // ISO 日期時間只取日期部分
            let date_part = text.split('T').next().unwrap_or(text);
            parse_date_tr(date_part).map(Some).ok_or_else(|| text.to_string())
        }
        RawCell::Empty => Ok(None),
        RawCell::Bool(value) => Err(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RawCell::text("W320"), Grade::WW320)]
    #[case(RawCell::text("ww240 cashew"), Grade::WW240)]
    #[case(RawCell::Number(180.0), Grade::WW180)]
    #[case(RawCell::text("LP"), Grade::WW320)]
    #[case(RawCell::Empty, Grade::WW320)]
    fn test_normalize_grade(#[case] cell: RawCell, #[case] expected: Grade) {
        assert_eq!(normalize_grade(&cell), expected);
    }

    #[rstest]
    #[case("Vacuum bag", PackagingType::Vacuum)]
    #[case("TENEKE", PackagingType::Tin)]
    #[case("carton", PackagingType::Carton)]
    #[case("Çuval", PackagingType::Bag)]
    #[case("", PackagingType::Vacuum)]
    fn test_normalize_packaging(#[case] raw: &str, #[case] expected: PackagingType) {
        assert_eq!(normalize_packaging(&RawCell::text(raw)), expected);
    }

    #[rstest]
    #[case(RawCell::Number(20.0), ContainerType::Twenty)]
    #[case(RawCell::text("20'DC"), ContainerType::Twenty)]
    #[case(RawCell::text("40HC"), ContainerType::Forty)]
    #[case(RawCell::Empty, ContainerType::Forty)]
    fn test_normalize_container(#[case] cell: RawCell, #[case] expected: ContainerType) {
        assert_eq!(normalize_container(&cell), expected);
    }

    #[rstest]
    #[case(RawCell::Number(3.85), Decimal::new(385, 2))]
    #[case(RawCell::text("3,85"), Decimal::new(385, 2))]
    #[case(RawCell::text("abc"), Decimal::ZERO)]
    #[case(RawCell::Empty, Decimal::ZERO)]
    fn test_cell_number(#[case] cell: RawCell, #[case] expected: Decimal) {
        assert_eq!(cell_number(&cell), expected);
    }

    #[test]
    fn test_cell_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);

        assert_eq!(cell_date(&RawCell::Number(45306.0)), Ok(expected));
        assert_eq!(cell_date(&RawCell::text("15.01.2024")), Ok(expected));
        assert_eq!(cell_date(&RawCell::text("2024-01-15T00:00:00")), Ok(expected));
        assert_eq!(cell_date(&RawCell::text(" ")), Ok(None));
        assert_eq!(cell_date(&RawCell::text("yakında")), Err("yakında".to_string()));
    }
}
