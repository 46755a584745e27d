//! `taicho` command-line entry point.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use log::error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taicho_core::config::DEFAULT_DB_FILE_NAME;
use taicho_core::{AppContext, CoreConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);

    let mut ctx = match AppContext::open(&config) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("taicho: cannot open store: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    match commands::run(&mut ctx, cli.command, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> CoreConfig {
    let mut config =
        CoreConfig::with_db_path(cli.db.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME)));
    config.log_dir = cli.log_dir.as_deref().map(absolute);
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
