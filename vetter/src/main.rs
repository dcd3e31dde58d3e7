// vetter/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;
use vetter_core::application::CheckRequest;

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug vetter run ... to see every check firing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            definition,
            target,
            reference,
            output,
            report,
        } => commands::run::execute(
            project_dir,
            CheckRequest {
                target,
                definition_id: definition,
                references: reference,
                output,
                report,
            },
        ),
        Commands::Rules {
            project_dir,
            definition,
            target,
            reference,
        } => commands::rules::execute(project_dir, definition, target, reference),
    }
}
