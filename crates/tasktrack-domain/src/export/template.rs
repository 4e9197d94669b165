//! The downloadable starter template.
//!
//! A fixed asset: the same headers and sample rows every time, as CSV or as a
//! styled workbook with an instructions sheet.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use tasktrack_core::{TrackerError, TrackerResult};

use super::exporter::xlsx_error;
use crate::status::{stage_labels, WorkflowStage};

pub const TEMPLATE_CSV_NAME: &str = "task-manager-template.csv";
pub const TEMPLATE_XLSX_NAME: &str = "task-manager-template.xlsx";

pub const TEMPLATE_HEADERS: [&str; 10] = [
    "Task Name",
    "Status",
    "Assigned To",
    "Priority",
    "Project",
    "Due Date",
    "Description",
    "Category",
    "Effort",
    "Tags",
];

const REQUIRED_COLUMNS: [&str; 3] = ["Task Name", "Status", "Assigned To"];
const RECOMMENDED_COLUMNS: [&str; 4] = ["Priority", "Project", "Due Date", "Description"];
const PRIORITY_OPTIONS: [&str; 3] = ["High", "Medium", "Low"];

const DESCRIPTION: &str = "This template includes all essential columns for effective task \
management with Kanban boards and project tracking.";

const SAMPLE_ROWS: [[&str; 10]; 10] = [
    [
        "Set up project repository",
        "Not Started",
        "John Doe",
        "High",
        "Website Redesign",
        "2024-12-31",
        "Initialize Git repository and set up basic project structure",
        "Setup",
        "3 hours",
        "setup, git, initialization",
    ],
    [
        "Design user interface mockups",
        "In Progress",
        "Jane Smith",
        "High",
        "Website Redesign",
        "2025-01-15",
        "Create wireframes and high-fidelity mockups for all main pages",
        "Design",
        "2 days",
        "design, ui, mockups",
    ],
    [
        "Implement user authentication",
        "Dev Completed",
        "Mike Johnson",
        "High",
        "Backend Services",
        "2025-01-10",
        "Build login/logout functionality with JWT tokens",
        "Feature",
        "1 week",
        "auth, backend, security",
    ],
    [
        "Write API documentation",
        "Tested",
        "Sarah Wilson",
        "Medium",
        "Backend Services",
        "2025-01-20",
        "Document all API endpoints with examples and parameters",
        "Documentation",
        "4 hours",
        "docs, api, documentation",
    ],
    [
        "Deploy to production",
        "Deployed",
        "DevOps Team",
        "High",
        "Website Redesign",
        "2025-01-25",
        "Deploy the completed website to production servers",
        "Deployment",
        "2 hours",
        "deployment, production, release",
    ],
    [
        "Fix mobile responsive issues",
        "Bugs",
        "Jane Smith",
        "Medium",
        "Website Redesign",
        "2025-01-12",
        "Resolve layout issues on mobile devices under 768px width",
        "Bug",
        "1 day",
        "mobile, responsive, css",
    ],
    [
        "Add search to product catalog",
        "Not Started",
        "Mike Johnson",
        "Low",
        "Backend Services",
        "2025-02-03",
        "Full-text search over product names and descriptions",
        "Enhancement",
        "5 story points",
        "search, catalog",
    ],
    [
        "Set up CI pipeline",
        "In Progress",
        "DevOps Team",
        "Medium",
        "Backend Services",
        "2025-01-18",
        "Run tests and linting on every pull request",
        "Setup",
        "1 day",
        "ci, automation, testing",
    ],
    [
        "Broken link on pricing page",
        "Bugs",
        "Sarah Wilson",
        "Low",
        "Website Redesign",
        "2025-01-14",
        "The \"Contact sales\" button points to a removed page",
        "Bug",
        "30 minutes",
        "links, content",
    ],
    [
        "Load test checkout flow",
        "Tested",
        "John Doe",
        "Medium",
        "Backend Services",
        "2025-01-28",
        "Simulate peak traffic against the checkout endpoints",
        "Testing",
        "3 story points",
        "performance, checkout",
    ],
];

const INSTRUCTIONS: [&str; 30] = [
    "Task Manager Template - Instructions",
    "",
    "REQUIRED COLUMNS (Do not remove):",
    "• Task Name: Primary identifier for each task",
    "• Status: Must be one of: Not Started, In Progress, Bugs, Dev Completed, Tested, Deployed",
    "• Assigned To: Person responsible for the task",
    "",
    "RECOMMENDED COLUMNS:",
    "• Priority: High, Medium, or Low",
    "• Project: Group related tasks together",
    "• Due Date: Target completion date (YYYY-MM-DD format)",
    "• Description: Detailed task information",
    "• Category: Type of work (Feature, Bug, Enhancement, etc.)",
    "• Effort: Time estimate or story points",
    "• Tags: Comma-separated keywords for filtering",
    "",
    "USAGE TIPS:",
    "• You can add more columns as needed",
    "• Dates should be in YYYY-MM-DD format",
    "• Keep task names concise but descriptive",
    "• Use consistent values for Status and Priority",
    "• Tags help with filtering and organization",
    "",
    "GETTING STARTED:",
    "1. Fill in your tasks using the sample data as a guide",
    "2. Save the file as CSV or keep as Excel",
    "3. Upload to your Task Manager project",
    "4. Start managing your tasks with Kanban boards!",
    "",
    "Need help? Check the application documentation.",
];

/// What the template offers, for display before download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub description: &'static str,
    pub column_count: usize,
    pub sample_row_count: usize,
    pub required_columns: Vec<&'static str>,
    pub recommended_columns: Vec<&'static str>,
    pub status_options: Vec<&'static str>,
    pub priority_options: Vec<&'static str>,
}

pub fn template_info() -> TemplateInfo {
    TemplateInfo {
        description: DESCRIPTION,
        column_count: TEMPLATE_HEADERS.len(),
        sample_row_count: SAMPLE_ROWS.len(),
        required_columns: REQUIRED_COLUMNS.to_vec(),
        recommended_columns: RECOMMENDED_COLUMNS.to_vec(),
        status_options: stage_labels().collect(),
        priority_options: PRIORITY_OPTIONS.to_vec(),
    }
}

pub fn template_csv() -> TrackerResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    let csv_error = |e: csv::Error| TrackerError::Serialization(e.to_string());

    writer.write_record(TEMPLATE_HEADERS).map_err(csv_error)?;
    for row in SAMPLE_ROWS {
        writer.write_record(row).map_err(csv_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TrackerError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TrackerError::Serialization(e.to_string()))
}

fn priority_fill(priority: &str) -> u32 {
    match priority {
        "High" => 0xFECACA,
        "Low" => 0xD1FAE5,
        _ => 0xFEF3C7,
    }
}

fn sample_sheet() -> Result<Worksheet, XlsxError> {
    let header_format = Format::new()
        .set_background_color(Color::RGB(0x3B82F6))
        .set_font_color(Color::White)
        .set_bold()
        .set_font_size(12)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xE5E7EB));

    let mut sheet = Worksheet::new();
    sheet.set_name("Task Manager Template")?;

    for (col, header) in TEMPLATE_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (index, row) in SAMPLE_ROWS.iter().enumerate() {
        let r = index as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            let fill = match TEMPLATE_HEADERS[col] {
                "Status" => Some(WorkflowStage::fill_for_label(value)),
                "Priority" => Some(priority_fill(value)),
                _ => None,
            };
            let format = match fill {
                Some(rgb) => cell_format
                    .clone()
                    .set_background_color(Color::RGB(rgb))
                    .set_bold(),
                None => cell_format.clone(),
            };
            sheet.write_string_with_format(r, col as u16, *value, &format)?;
        }
    }

    for (col, header) in TEMPLATE_HEADERS.iter().enumerate() {
        let longest = SAMPLE_ROWS
            .iter()
            .map(|row| row[col].chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0);
        sheet.set_column_width(col as u16, (longest + 2).clamp(12, 50) as f64)?;
    }
    Ok(sheet)
}

fn instructions_sheet() -> Result<Worksheet, XlsxError> {
    let title = Format::new()
        .set_bold()
        .set_font_size(16)
        .set_font_color(Color::RGB(0x1F2937));
    let section = Format::new()
        .set_bold()
        .set_font_size(12)
        .set_font_color(Color::RGB(0x374151));
    let body = Format::new()
        .set_font_size(11)
        .set_font_color(Color::RGB(0x4B5563));
    let plain = Format::new();

    let mut sheet = Worksheet::new();
    sheet.set_name("Instructions")?;
    for (row, line) in INSTRUCTIONS.iter().enumerate() {
        let is_bullet = line.starts_with('•');
        let is_numbered = line
            .split_once('.')
            .is_some_and(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
        let format = if row == 0 {
            &title
        } else if line.contains(':') && !is_bullet {
            &section
        } else if is_bullet || is_numbered {
            &body
        } else {
            &plain
        };
        sheet.write_string_with_format(row as u32, 0, *line, format)?;
    }
    sheet.set_column_width(0, 80)?;
    Ok(sheet)
}

pub fn template_xlsx() -> TrackerResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(sample_sheet().map_err(xlsx_error)?);
    workbook.push_worksheet(instructions_sheet().map_err(xlsx_error)?);
    workbook.save_to_buffer().map_err(xlsx_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::importer::{parse_csv_text, read_bytes};

    #[test]
    fn test_template_info() {
        let info = template_info();
        assert_eq!(info.column_count, 10);
        assert_eq!(info.sample_row_count, 10);
        assert_eq!(info.required_columns, vec!["Task Name", "Status", "Assigned To"]);
        assert_eq!(info.status_options.len(), 6);
        assert_eq!(info.priority_options, vec!["High", "Medium", "Low"]);
    }

    #[test]
    fn test_csv_template_quotes_cells() {
        let csv = template_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(TEMPLATE_HEADERS.join(",").as_str()));
        let first = lines.next().unwrap();
        assert!(first.ends_with("\"setup, git, initialization\""));
        assert!(csv.contains("\"The \"\"Contact sales\"\" button points to a removed page\""));
    }

    #[test]
    fn test_csv_template_imports_cleanly() {
        let batch = parse_csv_text(&template_csv().unwrap(), Some("p1")).unwrap();
        assert_eq!(batch.tasks.len(), 10);
        assert_eq!(batch.tasks[1].assignee, "Jane Smith");
        assert_eq!(batch.tasks[4].status, "Deployed");
        assert_eq!(batch.headers, TEMPLATE_HEADERS.to_vec());
    }

    #[test]
    fn test_xlsx_template_imports_first_sheet() {
        let bytes = template_xlsx().unwrap();
        let batch = read_bytes(TEMPLATE_XLSX_NAME, bytes, Some("p1")).unwrap();
        assert_eq!(batch.tasks.len(), 10);
        assert_eq!(
            batch.tasks[0].value_of("Task Name").as_deref(),
            Some("Set up project repository")
        );
    }

    #[test]
    fn test_priority_fill_defaults_to_medium() {
        assert_eq!(priority_fill("Urgent"), priority_fill("Medium"));
    }
}
