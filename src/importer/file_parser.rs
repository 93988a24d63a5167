// ==========================================
// 表格数据装载 - 文件解析器实现
// ==========================================
// 职责: 文件 → 原始行序列（第 0 行为表头，列位置从 0 开始）
// 支持: Excel (.xlsx/.xlsm/.xls/.ods) / CSV (.csv)
// 约定: 完全空白的数据行被跳过；空单元格读作 NULL
// ==========================================

use crate::domain::{Cell, CellValue, RawRow};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行序列（含表头）
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 追加一行：表头总是保留，数据行全空时跳过
fn push_row(rows: &mut Vec<RawRow>, row: RawRow) {
    if !rows.is_empty() && row.is_blank() {
        return;
    }
    rows.push(row);
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    fn text_value(raw: &str) -> CellValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            CellValue::Null
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }
}

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头作为第 0 行交给装载器
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let cells = record
                .iter()
                .enumerate()
                .map(|(column, value)| Cell::new(column, Self::text_value(value)))
                .collect();
            push_row(&mut rows, RawRow::new(cells));
        }

        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser {
    sheet: Option<String>, // 工作表名；为空时读取第一个工作表
}

impl ExcelParser {
    pub fn new() -> Self {
        Self { sheet: None }
    }

    pub fn with_sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: Some(sheet.into()),
        }
    }

    /// 单元格 → CellValue
    ///
    /// 整数值的浮点单元格转为整数（Excel 数值统一以浮点存储）
    fn cell_value(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Null,
            Data::Int(v) => CellValue::Integer(*v),
            Data::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => CellValue::Integer(*v as i64),
            Data::Float(v) => CellValue::Real(*v),
            Data::Bool(v) => CellValue::Integer(i64::from(*v)),
            Data::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    CellValue::Null
                } else {
                    CellValue::Text(trimmed.to_string())
                }
            }
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl Default for ExcelParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FileParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !matches!(ext.as_str(), "xlsx" | "xlsm" | "xls" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_name = match &self.sheet {
            Some(name) => {
                if !workbook.sheet_names().iter().any(|s| s == name) {
                    return Err(ImportError::SheetNotFound(name.clone()));
                }
                name.clone()
            }
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        // 区域不一定从 A 列开始，列位置按绝对列号计算
        let column_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

        let mut rows = Vec::new();
        for data_row in range.rows() {
            let cells = data_row
                .iter()
                .enumerate()
                .map(|(idx, cell)| Cell::new(column_offset + idx, Self::cell_value(cell)))
                .collect();
            push_row(&mut rows, RawRow::new(cells));
        }

        Ok(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
#[derive(Default)]
pub struct UniversalFileParser {
    sheet: Option<String>,
}

impl UniversalFileParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定 Excel 工作表名（CSV 忽略）
    pub fn with_sheet(sheet: Option<String>) -> Self {
        Self { sheet }
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        let ext = extension_of(path);

        match ext.as_str() {
            "csv" => CsvParser.parse_rows(path),
            "xlsx" | "xlsm" | "xls" | "ods" => {
                let parser = match &self.sheet {
                    Some(sheet) => ExcelParser::with_sheet(sheet.clone()),
                    None => ExcelParser::new(),
                };
                parser.parse_rows(path)
            }
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_csv_parser_keeps_header_as_first_row() {
        let temp_file = csv_file(&["NAME,ID_MAS", "N1,5", "N2,7"]);

        let rows = CsvParser.parse_rows(temp_file.path()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cells[1], Cell::new(1, "ID_MAS"));
        assert_eq!(rows[2].cells[0], Cell::new(0, "N2"));
    }

    #[test]
    fn test_csv_parser_empty_field_is_null() {
        let temp_file = csv_file(&["NAME,MAS_N", "N1,"]);

        let rows = CsvParser.parse_rows(temp_file.path()).unwrap();
        assert_eq!(rows[1].cells[1].value, CellValue::Null);
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let temp_file = csv_file(&["NAME,ID_MAS", "N1,5", ",", "N2,7"]);

        let rows = CsvParser.parse_rows(temp_file.path()).unwrap();

        // 应跳过空行
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_excel_cell_conversion() {
        assert_eq!(ExcelParser::cell_value(&Data::Empty), CellValue::Null);
        assert_eq!(ExcelParser::cell_value(&Data::Float(5.0)), CellValue::Integer(5));
        assert_eq!(ExcelParser::cell_value(&Data::Float(2.5)), CellValue::Real(2.5));
        assert_eq!(
            ExcelParser::cell_value(&Data::String(" MN1 ".to_string())),
            CellValue::from("MN1")
        );
        assert_eq!(ExcelParser::cell_value(&Data::Bool(true)), CellValue::Integer(1));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser::new().parse(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
