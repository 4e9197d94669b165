use crate::cli::{SettingsAction, StorageAction};
use crate::context::CliContext;
use crate::output;
use tasktrack_domain::TrackerOperations;

pub fn handle(ctx: &mut CliContext, action: StorageAction) -> anyhow::Result<()> {
    match action {
        StorageAction::Size => {
            output::output_success(serde_json::json!({
                "bytes": ctx.storage().total_storage_size(),
                "projects": ctx.list_projects().len(),
            }));
        }
        StorageAction::Clear { yes } => {
            if !yes {
                return output::output_error("Refusing to clear all data without --yes");
            }
            ctx.storage().clear_all_data()?;
            output::output_success(serde_json::json!({ "cleared": true }));
        }
    }
    Ok(())
}

pub fn handle_settings(ctx: &mut CliContext, action: SettingsAction) -> anyhow::Result<()> {
    match action {
        SettingsAction::DarkMode => {
            let enabled = ctx.toggle_dark_mode()?;
            output::output_success(serde_json::json!({ "darkMode": enabled }));
        }
        SettingsAction::Sidebar => {
            let collapsed = ctx.toggle_sidebar()?;
            output::output_success(serde_json::json!({ "sidebarCollapsed": collapsed }));
        }
    }
    Ok(())
}
