// ==========================================
// 表格数据装载 - 单元格与原始行
// ==========================================
// 职责: 定义表格读取器产出的原始数据形态
// 约定: 第 0 行为表头，其余为数据行
// ==========================================

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 弱类型单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// 空值判定（NULL 或空白文本）
    ///
    /// 自然键解析以此判断是否跳过查找
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Integer(_) | CellValue::Real(_) => false,
        }
    }

    /// 作为表头标签使用时的文本形式
    ///
    /// - 文本: 去除首尾空白，空白文本视为无标签
    /// - 数值: 按显示形式转为文本
    /// - NULL: 无标签
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Real(v) => write!(f, "{}", v),
            CellValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Integer(i64::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Real(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

// ===== SQLite 互转 =====

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
            CellValue::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            CellValue::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            CellValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        })
    }
}

impl FromSql for CellValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(CellValue::Null),
            ValueRef::Integer(v) => Ok(CellValue::Integer(v)),
            ValueRef::Real(v) => Ok(CellValue::Real(v)),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .map(|s| CellValue::Text(s.to_string()))
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

// ==========================================
// Cell / RawRow - 原始行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub column: usize, // 列位置（0 起）
    pub value: CellValue,
}

impl Cell {
    pub fn new(column: usize, value: impl Into<CellValue>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub cells: Vec<Cell>,
}

impl RawRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// 按顺序为每个值分配列位置 0..n
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            cells: values
                .into_iter()
                .enumerate()
                .map(|(column, value)| Cell::new(column, value))
                .collect(),
        }
    }

    /// 整行为空（所有单元格为 NULL 或空白）
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.value.is_blank())
    }
}

/// 列位置 → 表格列字母（0 → A, 26 → AA），用于错误信息
pub fn column_letter(column: usize) -> String {
    let mut n = column + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 构造原始行的便捷宏
///
/// ```
/// use sheet_loader::raw_row;
/// let row = raw_row!["NAME", 5_i64];
/// assert_eq!(row.cells.len(), 2);
/// ```
#[macro_export]
macro_rules! raw_row {
    ($($value:expr),* $(,)?) => {
        $crate::domain::RawRow::from_values(
            vec![$($crate::domain::CellValue::from($value)),*]
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(CellValue::Null.is_blank());
        assert!(CellValue::from("   ").is_blank());
        assert!(!CellValue::from("K1").is_blank());
        assert!(!CellValue::Integer(0).is_blank());
    }

    #[test]
    fn test_label_trims_and_renders_numbers() {
        assert_eq!(CellValue::from(" NAME ").as_label(), Some("NAME".to_string()));
        assert_eq!(CellValue::Integer(2024).as_label(), Some("2024".to_string()));
        assert_eq!(CellValue::Null.as_label(), None);
        assert_eq!(CellValue::from("").as_label(), None);
    }

    #[test]
    fn test_from_values_assigns_positions() {
        let row = RawRow::from_values(vec!["a", "b", "c"]);
        let columns: Vec<usize> = row.cells.iter().map(|c| c.column).collect();
        assert_eq!(columns, vec![0, 1, 2]);
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn test_sqlite_round_trip() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let value: CellValue = conn
            .query_row("SELECT ?1", [CellValue::from("MN1")], |row| row.get(0))
            .unwrap();
        assert_eq!(value, CellValue::from("MN1"));

        let value: CellValue = conn
            .query_row("SELECT NULL", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, CellValue::Null);
    }
}
