use crate::cli::{FilterArgs, ViewAction, ViewModeArg};
use crate::context::CliContext;
use crate::output;
use serde::Serialize;
use tasktrack_domain::{ProjectFilters, Task, TrackerOperations, ViewMode, WorkflowStage};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BoardColumn<'a> {
    status: &'static str,
    count: usize,
    tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StageCount {
    status: &'static str,
    count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsSummary {
    total: usize,
    completed: usize,
    completion_rate: u32,
    stages: Vec<StageCount>,
    other: usize,
}

pub fn handle(ctx: &mut CliContext, action: ViewAction) -> anyhow::Result<()> {
    match action {
        ViewAction::Filter(args) => {
            let filters = filters_from_args(args);
            ctx.set_filters(filters.clone())?;
            output::output_success(serde_json::json!({
                "filters": filters,
                "visible": ctx.visible_tasks().len(),
            }));
        }
        ViewAction::Mode { mode } => {
            let view = match mode {
                ViewModeArg::Kanban => ViewMode::Kanban,
                ViewModeArg::Table => ViewMode::Table,
            };
            ctx.set_view(view)?;
            output::output_success(serde_json::json!({ "view": view }));
        }
        ViewAction::Page { page } => {
            let window = ctx.set_page(page)?;
            output::output_success(serde_json::json!({
                "currentPage": window.current_page,
                "totalPages": window.total_pages,
                "hasPrevious": window.has_previous(),
                "hasNext": window.has_next(),
            }));
        }
        ViewAction::Board => {
            ctx.require_current()?;
            let columns: Vec<BoardColumn> = ctx
                .kanban_columns()
                .into_iter()
                .map(|(stage, tasks)| BoardColumn {
                    status: stage.as_str(),
                    count: tasks.len(),
                    tasks,
                })
                .collect();
            output::output_list(columns);
        }
        ViewAction::Assignees => {
            ctx.require_current()?;
            output::output_list(ctx.assignees());
        }
    }
    Ok(())
}

pub fn handle_stats(ctx: &CliContext) {
    if ctx.current_project().is_none() {
        return output::output_error("No project selected");
    }
    let stats = ctx.stats();
    let summary = StatsSummary {
        total: stats.total,
        completed: stats.completed(),
        completion_rate: stats.completion_rate(),
        stages: WorkflowStage::ALL
            .into_iter()
            .map(|stage| StageCount {
                status: stage.as_str(),
                count: stats.count(stage),
            })
            .collect(),
        other: stats.other,
    };
    output::output_success(&summary);
}

/// Blank flags mean "no filter", the same as leaving them out.
fn filters_from_args(args: FilterArgs) -> ProjectFilters {
    let keep = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();
    ProjectFilters {
        assignee: keep(args.assignee),
        search: keep(args.search),
        status: keep(args.status),
        priority: keep(args.priority),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filter_flags_are_dropped() {
        let filters = filters_from_args(FilterArgs {
            assignee: Some("Alex".into()),
            search: Some("  ".into()),
            status: None,
            priority: Some(String::new()),
        });
        assert_eq!(filters.assignee, "Alex");
        assert_eq!(filters.search, "");
        assert_eq!(filters.priority, "");
        assert!(!filters.is_empty());
        assert!(filters_from_args(FilterArgs {
            assignee: None,
            search: None,
            status: None,
            priority: None,
        })
        .is_empty());
    }
}
