use std::path::PathBuf;

use crate::cli::{BackupAction, ExportArgs, ExportFormat};
use crate::context::CliContext;
use crate::output;
use tasktrack_domain::export::{export_csv, export_filename, export_xlsx, BackupExport};
use tasktrack_domain::TrackerOperations;

pub fn handle_export(ctx: &CliContext, args: ExportArgs) -> anyhow::Result<()> {
    let project = ctx.require_current()?;
    let tasks = ctx.visible_tasks();
    let headers = &ctx.project_data().headers;
    if tasks.is_empty() {
        return output::output_error("No tasks to export");
    }

    let extension = match args.format {
        ExportFormat::Xlsx => "xlsx",
        ExportFormat::Csv => "csv",
    };
    let bytes = match args.format {
        ExportFormat::Xlsx => export_xlsx(&project, headers, &tasks)?,
        ExportFormat::Csv => export_csv(headers, &tasks)?.into_bytes(),
    };
    // A lone project gets the generic name; with several, the file says which.
    let named = (ctx.list_projects().len() > 1).then_some(&project);
    let path = args.output.unwrap_or_else(|| {
        PathBuf::from(export_filename(
            named,
            chrono::Local::now().date_naive(),
            extension,
        ))
    });
    std::fs::write(&path, &bytes)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;

    output::output_success(serde_json::json!({
        "path": path.display().to_string(),
        "tasks": tasks.len(),
        "bytes": bytes.len(),
    }));
    Ok(())
}

pub fn handle_backup(ctx: &mut CliContext, action: BackupAction) -> anyhow::Result<()> {
    match action {
        BackupAction::Create { output: path } => {
            let backup = ctx.storage().export_backup();
            let json = serde_json::to_string_pretty(&backup)?;
            std::fs::write(&path, json)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            output::output_success(serde_json::json!({
                "path": path.display().to_string(),
                "projects": backup.projects.len(),
            }));
        }
        BackupAction::Restore { input } => {
            let data = std::fs::read_to_string(&input)
                .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", input.display(), e))?;
            let backup: BackupExport = serde_json::from_str(&data)
                .map_err(|e| anyhow::anyhow!("Invalid backup file: {}", e))?;
            ctx.storage().import_backup(&backup)?;
            output::output_success(serde_json::json!({
                "restored": backup.projects.len(),
                "version": backup.version,
            }));
        }
    }
    Ok(())
}
