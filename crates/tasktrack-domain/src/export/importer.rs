//! Reading task tables from CSV text and spreadsheet workbooks.

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use std::io::{Cursor, Read};
use std::path::Path;
use tasktrack_core::{TrackerError, TrackerResult};

use crate::field::FieldValue;
use crate::ingest::{BatchProcessor, ImportBatch, RawRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Excel,
}

impl ImportFormat {
    /// Picks the reader from a file name's extension.
    pub fn from_file_name(name: &str) -> TrackerResult<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "xlsx" | "xls" => Ok(Self::Excel),
            _ => Err(TrackerError::UnsupportedFileType(name.to_string())),
        }
    }
}

/// Parses text pasted by the user.
pub fn parse_csv_text(text: &str, project_id: Option<&str>) -> TrackerResult<ImportBatch> {
    if text.trim().is_empty() {
        return Err(TrackerError::Validation("Please enter some CSV data".into()));
    }
    let (headers, rows) = read_csv(text.as_bytes())?;
    BatchProcessor::process(&rows, &headers, project_id).require_tasks("the CSV data")
}

/// Parses an uploaded file's contents; the reader is chosen by `file_name`.
pub fn read_bytes(
    file_name: &str,
    bytes: Vec<u8>,
    project_id: Option<&str>,
) -> TrackerResult<ImportBatch> {
    let (headers, rows) = match ImportFormat::from_file_name(file_name)? {
        ImportFormat::Csv => read_csv(bytes.as_slice())?,
        ImportFormat::Excel => read_workbook(bytes)?,
    };
    tracing::debug!(
        "Read {} rows with {} headers from {}",
        rows.len(),
        headers.len(),
        file_name
    );
    BatchProcessor::process(&rows, &headers, project_id).require_tasks("the file")
}

pub fn read_path(path: &Path, project_id: Option<&str>) -> TrackerResult<ImportBatch> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    // Reject by extension before touching the disk.
    ImportFormat::from_file_name(&name)?;
    let bytes = std::fs::read(path)?;
    read_bytes(&name, bytes, project_id)
}

fn read_csv<R: Read>(source: R) -> TrackerResult<(Vec<String>, Vec<RawRow>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| TrackerError::Parse(format!("Error parsing CSV file: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| TrackerError::Parse(format!("Error parsing CSV file: {}", e)))?;
        let mut row = RawRow::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            row.push(header.as_str(), Some(FieldValue::text(value)));
        }
        rows.push(row);
    }
    Ok((headers, rows))
}

fn excel_error(detail: impl std::fmt::Display) -> TrackerError {
    TrackerError::Parse(format!(
        "Error parsing Excel file. Please check the format. ({})",
        detail
    ))
}

fn read_workbook(bytes: Vec<u8>) -> TrackerResult<(Vec<String>, Vec<RawRow>)> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(excel_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| excel_error("workbook has no worksheets"))?
        .map_err(excel_error)?;

    // The used range starts at the first non-empty cell; headers belong on row 1.
    if let Some((first_row, _)) = range.start() {
        if first_row > 0 {
            return Err(excel_error(format!(
                "row 1 must hold the column headers, the sheet starts at row {}",
                first_row + 1
            )));
        }
    }

    let mut lines = range.rows();
    let headers: Vec<String> = match lines.next() {
        Some(first) => first
            .iter()
            .map(|cell| cell_value(cell).map(|v| v.to_string()).unwrap_or_default())
            .map(|h| h.trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let rows: Vec<RawRow> = lines
        .map(|cells| {
            let mut row = RawRow::new();
            for (header, cell) in headers.iter().zip(cells) {
                if !header.is_empty() {
                    row.push(header.as_str(), cell_value(cell));
                }
            }
            row
        })
        .collect();

    if rows.is_empty() {
        return Err(TrackerError::Parse("No data found in the Excel file".into()));
    }
    Ok((headers, rows))
}

fn cell_value(cell: &Data) -> Option<FieldValue> {
    match cell {
        Data::Int(i) => Some(FieldValue::Number(*i as f64)),
        Data::Float(f) => Some(FieldValue::Number(*f)),
        Data::String(s) => Some(FieldValue::text(s.as_str())),
        Data::Bool(b) => Some(FieldValue::Bool(*b)),
        Data::DateTime(_) => cell.as_datetime().map(FieldValue::Date),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(FieldValue::text(s.as_str())),
        Data::Error(_) | Data::Empty => None,
    }
}
