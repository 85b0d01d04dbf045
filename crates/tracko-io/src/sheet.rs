//! 工作表資料：儲存格值與以標題為鍵的資料列

use calamine::{Data, Range};
use std::collections::HashMap;

/// 儲存格值
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl RawCell {
    pub fn text(value: impl Into<String>) -> Self {
        RawCell::Text(value.into())
    }

    /// 空白儲存格或只有空白字元的文字
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(text) => text.trim().is_empty(),
            RawCell::Number(_) | RawCell::Bool(_) => false,
        }
    }

    /// 轉為去除前後空白的文字；整數值不帶小數
    pub fn as_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(text) => text.trim().to_string(),
            RawCell::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            RawCell::Bool(value) => value.to_string(),
        }
    }
}

impl From<&Data> for RawCell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => RawCell::Empty,
            Data::String(text) => RawCell::Text(text.clone()),
            Data::Float(value) => RawCell::Number(*value),
            Data::Int(value) => RawCell::Number(*value as f64),
            Data::Bool(value) => RawCell::Bool(*value),
            Data::DateTime(value) => RawCell::Number(value.as_f64()),
            Data::DateTimeIso(text) | Data::DurationIso(text) => RawCell::Text(text.clone()),
            Data::Error(_) => RawCell::Empty,
        }
    }
}

/// 標題正規化：換行改為單一空白並去除前後空白
pub fn normalize_header(header: &str) -> String {
    header.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 一列資料（鍵為正規化後的標題）
#[derive(Debug, Clone)]
pub struct SheetRow {
    /// 試算表列號（從 1 起算）
    pub number: usize,
    pub cells: HashMap<String, RawCell>,
}

impl SheetRow {
    pub fn get(&self, header: &str) -> Option<&RawCell> {
        self.cells.get(header)
    }
}

/// 一張工作表的資料列
#[derive(Debug, Clone)]
pub struct SheetRows {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl SheetRows {
    /// 由標題與資料格建立；`header_row` 為標題所在的列號
    ///
    /// 完全空白的資料列會被略過。
    pub fn from_grid(name: &str, headers: Vec<String>, grid: Vec<Vec<RawCell>>, header_row: usize) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

        let rows = grid
            .into_iter()
            .enumerate()
            .filter_map(|(offset, cells)| {
                if cells.iter().all(RawCell::is_blank) {
                    return None;
                }
                let cells = headers
                    .iter()
                    .zip(cells)
                    .filter(|(header, _)| !header.is_empty())
                    .map(|(header, cell)| (header.clone(), cell))
                    .collect();
                Some(SheetRow {
                    number: header_row + 1 + offset,
                    cells,
                })
            })
            .collect();

        Self {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    /// 由 calamine 範圍建立（第一列為標題）
    pub fn from_range(name: &str, range: &Range<Data>) -> Self {
        let header_row = range.start().map_or(1, |(row, _)| row as usize + 1);

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|cells| cells.iter().map(|cell| RawCell::from(cell).as_text()).collect())
            .unwrap_or_default();
        let grid = rows
            .map(|cells| cells.iter().map(RawCell::from).collect())
            .collect();

        Self::from_grid(name, headers, grid, header_row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
