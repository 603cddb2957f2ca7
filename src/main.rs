// src/main.rs

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Initialize tracing, either to stderr or to the requested log file
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter()).init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Some(Commands::Convert {
            input,
            store,
            arch,
            rules,
            archive_size,
            dry_run,
        }) => commands::cmd_convert(
            input.as_deref(),
            &store,
            &arch,
            rules.as_deref(),
            archive_size,
            dry_run,
        ),
        Some(Commands::Mirror {
            package,
            version,
            store,
            arch,
            mode,
            target_registry,
            authfile,
            config,
            workspace,
            archive_dir,
            oc_mirror_bin,
        }) => commands::cmd_mirror(
            &package,
            &version,
            &store,
            &arch,
            mode,
            target_registry,
            authfile,
            config,
            workspace,
            archive_dir,
            &oc_mirror_bin,
        ),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            println!("mirrorpak {}", env!("CARGO_PKG_VERSION"));
            println!("Run 'mirrorpak --help' for usage.");
            Ok(())
        }
    }
}
