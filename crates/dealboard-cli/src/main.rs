mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use dealboard_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("DEALBOARD_DEBUG_LOG") {
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
        // stdout carries the JSON responses
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_env("DEALBOARD_LOG")
                    .unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .init();
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::output_error(&e.to_string());
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            "dealboard",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    let file_path = cli
        .file
        .ok_or_else(|| anyhow::anyhow!("--file is required for board operations"))?;
    let config = match cli.config {
        Some(path) => AppConfig::load_from(&path)?,
        None => AppConfig::load(),
    };

    let mut ctx = CliContext::load(&file_path, &config).await?;

    match cli.command {
        Commands::Board(board_cmd) => handlers::board::handle(&mut ctx, board_cmd.action).await,
        Commands::Pipeline(pipeline_cmd) => {
            handlers::pipeline::handle(&ctx, pipeline_cmd.action).await
        }
        Commands::Task(task_cmd) => handlers::task::handle(&mut ctx, task_cmd.action).await,
        Commands::Deal(deal_cmd) => handlers::deal::handle(&mut ctx, deal_cmd.action).await,
        Commands::Stage(stage_cmd) => handlers::stage::handle(&mut ctx, stage_cmd.action).await,
        Commands::Completions { .. } => Ok(()),
    }
}
