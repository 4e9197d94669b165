use crate::cli::{TaskAction, TaskAddArgs};
use crate::context::CliContext;
use crate::output;
use serde::Serialize;
use tasktrack_domain::{FieldValue, Task, TrackerOperations, ViewMode};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskPage {
    items: Vec<Task>,
    count: usize,
    total: usize,
    view: ViewMode,
    current_page: usize,
    total_pages: usize,
}

pub fn handle(ctx: &mut CliContext, action: TaskAction) -> anyhow::Result<()> {
    match action {
        TaskAction::Add(args) => {
            let task = handle_add(ctx, args)?;
            output::output_success(&task);
        }
        TaskAction::List => {
            let (items, window) = ctx.list_tasks()?;
            let page = TaskPage {
                count: items.len(),
                total: ctx.visible_tasks().len(),
                items,
                view: ctx.project_data().view,
                current_page: window.current_page,
                total_pages: window.total_pages,
            };
            output::output_success(&page);
        }
        TaskAction::Get { id } => match ctx.get_task(&id)? {
            Some(task) => output::output_success(&task),
            None => return output::output_error(&format!("Task not found: {}", id)),
        },
        TaskAction::Status { id, status } => {
            let task = ctx.change_status(&id, &status)?;
            output::output_success(&task);
        }
        TaskAction::Edit { id, field, value } => {
            let task = ctx.edit_field(&id, &field, FieldValue::text(value))?;
            output::output_success(&task);
        }
        TaskAction::Delete { id } => {
            ctx.delete_task(&id)?;
            output::output_success(serde_json::json!({"deleted": id}));
        }
    }
    Ok(())
}

fn handle_add(ctx: &mut CliContext, args: TaskAddArgs) -> anyhow::Result<Task> {
    let mut task = ctx.add_task()?;
    if let Some(status) = args.status {
        task = ctx.change_status(&task.id, &status)?;
    }
    if let Some(assignee) = args.assignee {
        task = ctx.edit_field(&task.id, "Assigned To", FieldValue::text(assignee))?;
    }
    for (key, value) in args.fields {
        task = ctx.edit_field(&task.id, &key, FieldValue::text(value))?;
    }
    Ok(task)
}
