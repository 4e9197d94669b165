mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use tasktrack_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("TASKTRACK_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::output_error(&e.to_string());
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load();

    // Commands that never touch the storage file.
    let command = match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "tasktrack",
                &mut std::io::stdout(),
            );
            return Ok(());
        }
        Commands::Template(template_cmd) => {
            return handlers::template::handle(template_cmd.action);
        }
        other => other,
    };

    let file_path = cli
        .file
        .or_else(|| config.effective_data_file())
        .ok_or_else(|| anyhow::anyhow!("No storage file given and no data directory found"))?;
    tracing::debug!("Using storage file {}", file_path.display());

    let mut ctx = CliContext::load(&file_path, &config)?;

    match command {
        Commands::Project(project_cmd) => {
            handlers::project::handle(&mut ctx, project_cmd.action)?;
        }
        Commands::Task(task_cmd) => {
            handlers::task::handle(&mut ctx, task_cmd.action)?;
        }
        Commands::View(view_cmd) => {
            handlers::view::handle(&mut ctx, view_cmd.action)?;
        }
        Commands::Import(args) => {
            handlers::import::handle(&mut ctx, args)?;
        }
        Commands::Export(args) => {
            handlers::export::handle_export(&ctx, args)?;
        }
        Commands::Backup(backup_cmd) => {
            handlers::export::handle_backup(&mut ctx, backup_cmd.action)?;
        }
        Commands::Storage(storage_cmd) => {
            handlers::storage::handle(&mut ctx, storage_cmd.action)?;
        }
        Commands::Stats => {
            handlers::view::handle_stats(&ctx);
        }
        Commands::Settings(settings_cmd) => {
            handlers::storage::handle_settings(&mut ctx, settings_cmd.action)?;
        }
        Commands::Watch(args) => {
            handlers::watch::handle(&mut ctx, args).await?;
        }
        Commands::Completions { .. } | Commands::Template(_) => {}
    }

    Ok(())
}
