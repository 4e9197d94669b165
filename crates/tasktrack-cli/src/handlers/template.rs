use std::path::PathBuf;

use crate::cli::TemplateAction;
use crate::output;
use tasktrack_domain::export::template::{TEMPLATE_CSV_NAME, TEMPLATE_XLSX_NAME};
use tasktrack_domain::export::{template_csv, template_info, template_xlsx};

pub fn handle(action: TemplateAction) -> anyhow::Result<()> {
    match action {
        TemplateAction::Csv { output: path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(TEMPLATE_CSV_NAME));
            write(path, template_csv()?.into_bytes())?;
        }
        TemplateAction::Xlsx { output: path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(TEMPLATE_XLSX_NAME));
            write(path, template_xlsx()?)?;
        }
        TemplateAction::Info => output::output_success(template_info()),
    }
    Ok(())
}

fn write(path: PathBuf, bytes: Vec<u8>) -> anyhow::Result<()> {
    std::fs::write(&path, &bytes)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
    output::output_success(serde_json::json!({
        "path": path.display().to_string(),
        "bytes": bytes.len(),
    }));
    Ok(())
}
