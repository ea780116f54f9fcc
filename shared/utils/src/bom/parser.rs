//! BOM File Parser
//!
//! Reads delimited text and Excel bill of materials files into an ordered table.
//! Column names are kept exactly as written in the header row because column
//! matching downstream is exact and case-sensitive.

use anyhow::{bail, Context, Result};
use diamond_models::RowFields;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

use crate::error::{DiamondError, DiamondResult};

/// Supported BOM file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BomFormat {
    Csv,
    Excel, // XLSX/XLS
}

impl BomFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Detect format from content type header; parameters such as `charset` are ignored
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match mime.as_str() {
            "text/csv" | "application/csv" | "text/plain" => Some(Self::Csv),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some(Self::Excel),
            "application/vnd.ms-excel" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Extension first, then the declared content type
    pub fn detect(filename: &str, content_type: Option<&str>) -> Option<Self> {
        Self::from_extension(Path::new(filename)).or_else(|| content_type.and_then(Self::from_content_type))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
        }
    }
}

/// One data row; `values` is aligned with `ParsedBom::column_headers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomRow {
    /// 1-based line number in the source file (header is line 1)
    pub row_number: usize,
    pub values: Vec<String>,
}

/// Complete parsed BOM with metadata
#[derive(Debug, Clone)]
pub struct ParsedBom {
    pub id: Uuid,
    pub filename: String,
    pub format: BomFormat,
    pub rows: Vec<BomRow>,
    pub column_headers: Vec<String>,
    pub total_rows: usize,
    pub parse_warnings: Vec<String>,
    column_index: HashMap<String, usize>,
}

/// Borrowed view of one row, resolving columns by header name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    bom: &'a ParsedBom,
    row: &'a BomRow,
}

impl<'a> RowView<'a> {
    pub fn row_number(&self) -> usize {
        self.row.row_number
    }
}

impl RowFields for RowView<'_> {
    fn field(&self, column: &str) -> Option<&str> {
        let idx = self.bom.column_position(column)?;
        // Short rows are padded at parse time, so a known column always has a cell.
        Some(self.row.values.get(idx).map(String::as_str).unwrap_or(""))
    }
}

impl ParsedBom {
    pub fn new(
        filename: impl Into<String>,
        format: BomFormat,
        column_headers: Vec<String>,
        rows: Vec<BomRow>,
        parse_warnings: Vec<String>,
    ) -> Self {
        let mut bom = Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            format,
            total_rows: rows.len(),
            rows,
            column_headers,
            parse_warnings,
            column_index: HashMap::new(),
        };
        bom.rebuild_index();
        bom
    }

    fn rebuild_index(&mut self) {
        self.column_index.clear();
        for (idx, header) in self.column_headers.iter().enumerate() {
            // First occurrence wins for duplicated header names
            self.column_index.entry(header.clone()).or_insert(idx);
        }
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    pub fn row_view(&self, idx: usize) -> Option<RowView<'_>> {
        self.rows.get(idx).map(|row| RowView { bom: self, row })
    }

    pub fn row_views(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        self.rows.iter().map(move |row| RowView { bom: self, row })
    }

    /// Appends `name` as a new last column, or overwrites it in place if present.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> DiamondResult<()> {
        if values.len() != self.rows.len() {
            return Err(DiamondError::internal(format!(
                "Column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        let idx = match self.column_position(name) {
            Some(idx) => idx,
            None => {
                self.column_headers.push(name.to_string());
                self.rebuild_index();
                self.column_headers.len() - 1
            }
        };

        let width = self.column_headers.len();
        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.values.len() < width {
                row.values.resize(width, String::new());
            }
            row.values[idx] = value;
        }

        Ok(())
    }
}

/// Main BOM parser
pub struct BomParser {
    delimiter: u8,
}

impl Default for BomParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl BomParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse BOM file from bytes
    pub fn parse_bytes(&self, filename: &str, data: &[u8], format: Option<BomFormat>) -> Result<ParsedBom> {
        let format = format
            .or_else(|| BomFormat::from_extension(Path::new(filename)))
            .context("Could not determine file format")?;

        match format {
            BomFormat::Csv => self.parse_csv(filename, data),
            BomFormat::Excel => self.parse_excel(filename, data),
        }
    }

    /// Parse delimited text format
    ///
    /// Every data record becomes a row: cells that are not valid UTF-8 are
    /// decoded lossily and reported as warnings, and a record that cannot be
    /// read at all fails the whole file.
    pub fn parse_csv(&self, filename: &str, data: &[u8]) -> Result<ParsedBom> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(data);

        let headers: Vec<String> = reader
            .byte_headers()
            .context("Failed to read CSV headers")?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let header = String::from_utf8_lossy(h);
                if i == 0 {
                    header.trim_start_matches('\u{feff}').to_string()
                } else {
                    header.into_owned()
                }
            })
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            bail!("CSV file has no header row");
        }

        let mut rows = Vec::new();
        let mut warnings = Vec::new();

        for (idx, result) in reader.byte_records().enumerate() {
            let record = result.with_context(|| format!("Failed to read CSV record {}", idx + 1))?;
            let row_number = record
                .position()
                .and_then(|pos| usize::try_from(pos.line()).ok())
                .unwrap_or(idx + 2);

            if record.iter().any(|cell| std::str::from_utf8(cell).is_err()) {
                warnings.push(format!(
                    "Row {}: invalid UTF-8 replaced with U+FFFD",
                    row_number
                ));
            }
            let cells: Vec<String> = record
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).into_owned())
                .collect();

            rows.push(BomRow {
                row_number,
                values: fit_to_headers(cells, headers.len(), row_number)?,
            });
        }

        Ok(ParsedBom::new(filename, BomFormat::Csv, headers, rows, warnings))
    }

    /// Parse Excel format
    pub fn parse_excel(&self, filename: &str, data: &[u8]) -> Result<ParsedBom> {
        use calamine::{open_workbook_auto_from_rs, DataType, Reader};

        let cursor = std::io::Cursor::new(data.to_vec());
        let mut workbook = open_workbook_auto_from_rs(cursor).context("Failed to open Excel workbook")?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .context("No sheets found in workbook")?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .context("Failed to read worksheet")??;

        let mut rows_iter = range.rows();

        // First row is headers
        let headers: Vec<String> = rows_iter
            .next()
            .context("Empty worksheet")?
            .iter()
            .map(|cell: &DataType| cell.to_string())
            .collect();

        if headers.iter().all(|h| h.trim().is_empty()) {
            bail!("Worksheet has no header row");
        }

        let mut rows = Vec::new();

        for (idx, row) in rows_iter.enumerate() {
            let row_number = idx + 2;
            let cells = row.iter().map(|cell: &DataType| cell.to_string()).collect();
            rows.push(BomRow {
                row_number,
                values: fit_to_headers(cells, headers.len(), row_number)?,
            });
        }

        Ok(ParsedBom::new(filename, BomFormat::Excel, headers, rows, Vec::new()))
    }
}

/// Pads a short row with blanks. Blank trailing cells past the header are
/// dropped; a non-blank one has no column to live in and fails the file.
fn fit_to_headers(mut cells: Vec<String>, width: usize, row_number: usize) -> Result<Vec<String>> {
    if let Some(extra) = cells.iter().skip(width).position(|cell| !cell.trim().is_empty()) {
        bail!(
            "Row {}: value '{}' in column {} has no header ({} columns)",
            row_number,
            cells[width + extra],
            width + extra + 1,
            width
        );
    }
    cells.resize(width, String::new());
    Ok(cells)
}
