use std::io::Read;

use crate::cli::ImportArgs;
use crate::context::CliContext;
use crate::output;
use tasktrack_domain::export::{parse_csv_text, read_path};
use tasktrack_domain::TrackerOperations;

pub fn handle(ctx: &mut CliContext, args: ImportArgs) -> anyhow::Result<()> {
    let project = ctx.require_current()?;
    let batch = match &args.path {
        Some(path) => read_path(path, Some(project.id.as_str()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            parse_csv_text(&text, Some(project.id.as_str()))?
        }
    };
    let imported = ctx.import_batch(batch)?;
    tracing::info!("Imported {} tasks into {}", imported, project.name);

    output::output_success(serde_json::json!({
        "imported": imported,
        "projectId": project.id,
        "headers": ctx.project_data().headers,
        "taskCount": ctx.project_data().tasks.len(),
    }));
    Ok(())
}
