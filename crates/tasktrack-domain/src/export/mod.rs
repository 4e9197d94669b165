//! Spreadsheet import/export and JSON backups.
//!
//! Reading goes through the ingestion pipeline, so every source (CSV file,
//! pasted text, workbook) produces tasks the same way.

pub mod exporter;
pub mod importer;
pub mod models;
pub mod template;

pub use exporter::{export_csv, export_filename, export_xlsx, export_columns};
pub use importer::{parse_csv_text, read_bytes, read_path, ImportFormat};
pub use models::{BackupExport, BackupProject, ProjectExport, BACKUP_VERSION};
pub use template::{template_csv, template_info, template_xlsx, TemplateInfo};
