//! 土耳其語系格式化工具
//!
//! 數字使用 `.` 作為千分位、`,` 作為小數點；日期使用 `dd.mm.yyyy`。

use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Excel 1900 日期序號與 Unix epoch 的差距（天）
pub const EXCEL_EPOCH_OFFSET: i64 = 25569;

/// 固定兩位小數（`1234.5` → `1.234,50`）
pub fn format_number_tr(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    render_tr(&format!("{:.2}", rounded))
}

/// 千分位格式，最多三位小數並去除尾端 0（`16000` → `16.000`）
pub fn format_thousands_tr(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    render_tr(&rounded.to_string())
}

/// 將 `-1234.50` 形式的字串轉為 `-1.234,50`
fn render_tr(plain: &str) -> String {
    let (sign, digits) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    // -0,00 顯示為 0,00
    let sign = if grouped.chars().all(|c| c == '0' || c == '.')
        && frac_part.map_or(true, |f| f.chars().all(|c| c == '0'))
    {
        ""
    } else {
        sign
    };

    match frac_part {
        Some(f) => format!("{sign}{grouped},{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// 解析使用者輸入的數字；無法解析或空白時回傳 0
///
/// 接受 `1.234,56`、`3,85`、`3.85` 與前後空白。
pub fn parse_number_tr(input: &str) -> Decimal {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.matches('.').count() > 1 {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}

/// 解析 `dd.mm.yyyy` 或 `dd/mm/yyyy`（也接受 ISO `yyyy-mm-dd`）
pub fn parse_date_tr(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    let parts: Vec<&str> = trimmed.split(['.', '/']).collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year: i32 = parts[2].trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 日期輸出為 `dd.mm.yyyy`
pub fn format_date_tr(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// 輸入時自動補上日期分隔點（`131122` → `13.11.2022`）
pub fn auto_format_date(input: &str) -> String {
    let mut digits: String = input.chars().filter(|c| c.is_ascii_digit()).take(8).collect();

    if digits.len() == 6 && !input.contains('.') {
        digits = format!("{}{}20{}", &digits[0..2], &digits[2..4], &digits[4..6]);
    }

    let mut formatted = String::with_capacity(10);
    for (i, ch) in digits.chars().enumerate() {
        if i == 2 || i == 4 {
            formatted.push('.');
        }
        formatted.push(ch);
    }
    formatted
}

/// 日期是否落在 `[today, today + days]` 區間內；上界超出日期範圍時不設上限
pub fn is_within_next_days(date: NaiveDate, today: NaiveDate, days: u32) -> bool {
    date >= today
        && today
            .checked_add_days(Days::new(u64::from(days)))
            .map_or(true, |end| date <= end)
}

/// Excel 日期序號轉為日期（忽略時間部分）
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    let days = (serial.floor() as i64).saturating_sub(EXCEL_EPOCH_OFFSET);
    if days >= 0 {
        epoch.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// 價差文字：`+0,05`、`-0,10`、`0,00`
pub fn format_change_tr(diff: Decimal) -> String {
    let formatted = format_number_tr(diff.abs());
    if formatted == "0,00" {
        formatted
    } else if diff > Decimal::ZERO {
        format!("+{formatted}")
    } else {
        format!("-{formatted}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case("1234.5", "1.234,50")]
    #[case("0", "0,00")]
    #[case("3.855", "3,86")]
    #[case("-1234567.891", "-1.234.567,89")]
    #[case("999.999", "1.000,00")]
    #[case("-0.001", "0,00")]
    fn test_format_number_tr(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_number_tr(d(input)), expected);
    }

    #[rstest]
    #[case("16000", "16.000")]
    #[case("29090.9090", "29.090,909")]
    #[case("12.50", "12,5")]
    #[case("100", "100")]
    fn test_format_thousands_tr(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_thousands_tr(d(input)), expected);
    }

    #[rstest]
    #[case("1.234,56", "1234.56")]
    #[case("3,85", "3.85")]
    #[case("3.85", "3.85")]
    #[case(" 42 ", "42")]
    #[case("1.000.000", "1000000")]
    #[case("", "0")]
    #[case("abc", "0")]
    #[case("-5", "-5")]
    fn test_parse_number_tr(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_number_tr(input), d(expected));
    }

    #[test]
    fn test_parse_and_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

        assert_eq!(parse_date_tr("20.05.2024"), Some(date));
        assert_eq!(parse_date_tr("20/05/2024"), Some(date));
        assert_eq!(parse_date_tr("2024-05-20"), Some(date));
        assert_eq!(parse_date_tr("32.05.2024"), None);
        assert_eq!(parse_date_tr(""), None);
        assert_eq!(format_date_tr(date), "20.05.2024");
    }

    #[rstest]
    #[case("131122", "13.11.2022")]
    #[case("13112022", "13.11.2022")]
    #[case("13.11.22", "13.11.22")]
    #[case("1311", "13.11")]
    #[case("1", "1")]
    #[case("1311202299", "13.11.2022")]
    fn test_auto_format_date(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(auto_format_date(input), expected);
    }

    #[test]
    fn test_is_within_next_days_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        assert!(is_within_next_days(today, today, 10));
        assert!(is_within_next_days(NaiveDate::from_ymd_opt(2024, 5, 11).unwrap(), today, 10));
        assert!(!is_within_next_days(NaiveDate::from_ymd_opt(2024, 5, 12).unwrap(), today, 10));
        assert!(!is_within_next_days(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), today, 10));
    }

    #[test]
    fn test_is_within_next_days_huge_window() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        assert!(is_within_next_days(today, today, 100_000_000));
        assert!(is_within_next_days(NaiveDate::MAX, today, u32::MAX));
        assert!(!is_within_next_days(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), today, u32::MAX));
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45432.0), NaiveDate::from_ymd_opt(2024, 5, 20));
        assert_eq!(excel_serial_to_date(25569.75), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(1.0), NaiveDate::from_ymd_opt(1899, 12, 31));
    }

    #[rstest]
    #[case(1e15)]
    #[case(-1e15)]
    #[case(f64::MAX)]
    fn test_excel_serial_out_of_range(#[case] serial: f64) {
        assert_eq!(excel_serial_to_date(serial), None);
    }

    #[rstest]
    #[case("0.05", "+0,05")]
    #[case("-0.1", "-0,10")]
    #[case("0", "0,00")]
    #[case("200", "+200,00")]
    fn test_format_change_tr(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_change_tr(d(input)), expected);
    }
}
