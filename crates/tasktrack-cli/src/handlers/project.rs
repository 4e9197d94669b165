use crate::cli::{ProjectAction, ProjectUpdateArgs};
use crate::context::CliContext;
use crate::output;
use tasktrack_domain::{FieldUpdate, Project, ProjectUpdate, TrackerOperations};

pub fn handle(ctx: &mut CliContext, action: ProjectAction) -> anyhow::Result<()> {
    match action {
        ProjectAction::Create { name, description } => {
            let project = ctx.create_project(&name, description.as_deref())?;
            output::output_success(&project);
        }
        ProjectAction::List => {
            output::output_list(ctx.list_projects());
        }
        ProjectAction::Current => match ctx.current_project() {
            Some(project) => output::output_success(&project),
            None => return output::output_error("No project selected"),
        },
        ProjectAction::Select { id } => {
            let target = ctx.resolve_project(&id)?;
            let project = ctx.select_project(&target.id)?;
            output::output_success(&project);
        }
        ProjectAction::Update(args) => {
            let project = handle_update(ctx, args)?;
            output::output_success(&project);
        }
        ProjectAction::Delete { id } => {
            let target = ctx.resolve_project(&id)?;
            ctx.delete_project(&target.id)?;
            output::output_success(serde_json::json!({
                "deleted": target.id,
                "currentProjectId": ctx.state().current_project_id,
            }));
        }
        ProjectAction::Dump { id } => {
            let target = match id {
                Some(id) => ctx.resolve_project(&id)?,
                None => ctx.require_current()?,
            };
            match ctx.storage().export_project_data(&target.id) {
                Some(export) => output::output_success(&export),
                None => {
                    return output::output_error(&format!("Project not found: {}", target.id))
                }
            }
        }
    }
    Ok(())
}

fn handle_update(ctx: &mut CliContext, args: ProjectUpdateArgs) -> anyhow::Result<Project> {
    let target = ctx.resolve_project(&args.id)?;
    let description = if args.clear_description {
        FieldUpdate::Clear
    } else {
        args.description
            .map(FieldUpdate::Set)
            .unwrap_or(FieldUpdate::NoChange)
    };
    let update = ProjectUpdate {
        name: args.name,
        description,
        color: args.color,
    };
    Ok(ctx.update_project(&target.id, update)?)
}
