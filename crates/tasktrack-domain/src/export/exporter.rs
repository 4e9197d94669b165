//! Writing a project's tasks out as a spreadsheet.
//!
//! Both formats share one column layout: `Status`, `Assignee`, then the
//! project's headers minus its own status and assignee columns. Reading an
//! export back therefore yields the same tasks.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tasktrack_core::{TrackerError, TrackerResult};

use crate::field::FieldValue;
use crate::ingest::normalizer::{is_assignee_alias, is_status_column};
use crate::project::Project;
use crate::task::Task;

const MIN_COLUMN_WIDTH: usize = 12;
const MAX_COLUMN_WIDTH: usize = 50;
const SHEET_NAME_MAX: usize = 31;

pub(crate) fn xlsx_error(err: XlsxError) -> TrackerError {
    TrackerError::Serialization(format!("Failed to write workbook: {}", err))
}

/// The exported column names for a project's header list.
pub fn export_columns(headers: &[String]) -> Vec<String> {
    let mut columns = vec!["Status".to_string(), "Assignee".to_string()];
    columns.extend(
        headers
            .iter()
            .filter(|h| !is_status_column(h) && !is_assignee_alias(h))
            .cloned(),
    );
    columns
}

fn cell<'a>(task: &'a Task, column_index: usize, column: &str) -> Option<CellRef<'a>> {
    match column_index {
        0 => Some(CellRef::Text(&task.status)),
        1 => Some(CellRef::Text(&task.assignee)),
        _ => task.fields.get(column).map(CellRef::Value),
    }
}

enum CellRef<'a> {
    Text(&'a str),
    Value(&'a FieldValue),
}

impl CellRef<'_> {
    fn width(&self) -> usize {
        match self {
            CellRef::Text(s) => s.chars().count(),
            CellRef::Value(v) => v.to_string().chars().count(),
        }
    }
}

/// Excel forbids some characters in sheet names and caps them at 31 characters.
pub fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(SHEET_NAME_MAX)
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').to_string();
    if cleaned.is_empty() {
        "Tasks".to_string()
    } else {
        cleaned
    }
}

/// `tasks-export-<date>.<ext>` without a project, `<sanitized name>-<date>.<ext>` with one.
pub fn export_filename(project: Option<&Project>, date: NaiveDate, extension: &str) -> String {
    let stem = match project {
        Some(project) => project.sanitized_name(),
        None => "tasks-export".to_string(),
    };
    format!("{}-{}.{}", stem, date.format("%Y-%m-%d"), extension)
}

fn column_widths(columns: &[String], tasks: &[&Task]) -> Vec<f64> {
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let longest = tasks
                .iter()
                .filter_map(|task| cell(task, index, column))
                .map(|c| c.width())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0);
            longest.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH) as f64
        })
        .collect()
}

pub(crate) fn write_field(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &FieldValue,
    date_format: &Format,
) -> Result<(), XlsxError> {
    match value {
        FieldValue::Text(s) => sheet.write_string(row, col, s)?,
        FieldValue::Number(n) => sheet.write_number(row, col, *n)?,
        FieldValue::Bool(b) => sheet.write_boolean(row, col, *b)?,
        FieldValue::Date(d) => sheet.write_datetime_with_format(row, col, d, date_format)?,
    };
    Ok(())
}

fn build_sheet(sheet_title: &str, headers: &[String], tasks: &[&Task]) -> Result<Worksheet, XlsxError> {
    let columns = export_columns(headers);
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let mut sheet = Worksheet::new();
    sheet.set_name(sheet_name(sheet_title))?;

    for (col, name) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }
    for (index, task) in tasks.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, name) in columns.iter().enumerate() {
            match cell(task, col, name) {
                Some(CellRef::Text(s)) => {
                    sheet.write_string(row, col as u16, s)?;
                }
                Some(CellRef::Value(value)) => {
                    write_field(&mut sheet, row, col as u16, value, &date_format)?;
                }
                None => {}
            }
        }
    }
    for (col, width) in column_widths(&columns, tasks).into_iter().enumerate() {
        sheet.set_column_width(col as u16, width)?;
    }
    Ok(sheet)
}

/// One worksheet named after the project, one row per task given.
pub fn export_xlsx(project: &Project, headers: &[String], tasks: &[&Task]) -> TrackerResult<Vec<u8>> {
    let sheet = build_sheet(&project.name, headers, tasks).map_err(xlsx_error)?;
    let mut workbook = Workbook::new();
    workbook.push_worksheet(sheet);
    let bytes = workbook.save_to_buffer().map_err(xlsx_error)?;
    tracing::debug!(
        "Exported {} tasks of project {} ({} bytes)",
        tasks.len(),
        project.id,
        bytes.len()
    );
    Ok(bytes)
}

pub fn export_csv(headers: &[String], tasks: &[&Task]) -> TrackerResult<String> {
    let columns = export_columns(headers);
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_error = |e: csv::Error| TrackerError::Serialization(e.to_string());

    writer.write_record(&columns).map_err(csv_error)?;
    for task in tasks {
        let record: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(index, column)| match cell(task, index, column) {
                Some(CellRef::Text(s)) => s.to_string(),
                Some(CellRef::Value(v)) => v.to_string(),
                None => String::new(),
            })
            .collect();
        writer.write_record(&record).map_err(csv_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TrackerError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TrackerError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_export_columns_skip_status_and_assignee() {
        let cols = export_columns(&headers(&["Plan", "Assigned To", "Status", "Due"]));
        assert_eq!(cols, vec!["Status", "Assignee", "Plan", "Due"]);
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(None, date, "xlsx"), "tasks-export-2024-03-09.xlsx");
        let project = Project::new("Q1 Plan!", None, "#3B82F6");
        assert_eq!(
            export_filename(Some(&project), date, "xlsx"),
            "Q1_Plan_-2024-03-09.xlsx"
        );
    }

    #[test]
    fn test_sheet_name_rules() {
        assert_eq!(sheet_name("a/b:c"), "abc");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), 31);
        assert_eq!(sheet_name("[]"), "Tasks");
    }

    #[test]
    fn test_column_widths_are_clamped() {
        let mut long = Task::new("p1");
        long.fields.insert("Notes", FieldValue::text("n".repeat(80)));
        let cols = export_columns(&headers(&["Notes"]));
        let widths = column_widths(&cols, &[&long]);
        assert_eq!(widths, vec![12.0, 12.0, 50.0]);
    }

    #[test]
    fn test_csv_export_layout() {
        let mut task = Task::new("p1");
        task.status = "Bugs".into();
        task.assignee = "Ana".into();
        task.fields.insert("Plan", FieldValue::text("Ship, then rest"));
        task.fields.insert("Effort", FieldValue::Number(3.0));

        let out = export_csv(&headers(&["Plan", "Effort", "Assigned To", "Status"]), &[&task]).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Status,Assignee,Plan,Effort"));
        assert_eq!(lines.next(), Some("Bugs,Ana,\"Ship, then rest\",3"));
    }

    #[test]
    fn test_xlsx_export_produces_a_zip() {
        let project = Project::new("Board", None, "#3B82F6");
        let task = Task::blank(&project.id);
        let bytes = export_xlsx(&project, &headers(&["Task Name"]), &[&task]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
