use std::time::Duration;

use crate::cli::WatchArgs;
use crate::context::CliContext;
use crate::output;
use tasktrack_domain::TrackerOperations;
use tasktrack_persistence::{ChangeDetector, FileWatcher, ReloadEvent, ReloadListener};
use tokio::sync::broadcast::error::RecvError;

pub async fn handle(ctx: &mut CliContext, args: WatchArgs) -> anyhow::Result<()> {
    let store = ctx.store().clone();
    if !store.path().exists() {
        return output::output_error(&format!(
            "Storage file does not exist yet: {}",
            store.path().display()
        ));
    }

    let watcher = FileWatcher::new();
    let mut changes = watcher.subscribe();
    let mut listener = ReloadListener::new(store.as_ref());
    watcher.start_watching(store.path().to_path_buf()).await?;
    tracing::info!("Watching {}", store.path().display());

    let stop = async {
        match args.timeout {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            change = changes.recv() => match change {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    if let Err(e) = store.reload() {
                        tracing::warn!("Skipping unreadable storage file: {}", e);
                        continue;
                    }
                    for reload in listener.drain() {
                        ctx.apply_reload(&reload);
                        report(ctx, &reload);
                    }
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    watcher.stop_watching().await?;
    Ok(())
}

fn report(ctx: &CliContext, reload: &ReloadEvent) {
    let scope = match reload {
        ReloadEvent::AppState => "appState".to_string(),
        ReloadEvent::Projects => "projects".to_string(),
        ReloadEvent::ProjectData(id) => format!("projectData:{}", id),
        ReloadEvent::All => "all".to_string(),
    };
    output::output_success(serde_json::json!({
        "reload": scope,
        "currentProjectId": ctx.state().current_project_id,
        "projects": ctx.list_projects().len(),
        "tasks": ctx.project_data().tasks.len(),
    }));
}
