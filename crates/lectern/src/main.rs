// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lectern - guided reading comprehension service.
//!
//! This is the binary entry point: `lectern serve` runs the HTTP gateway,
//! `lectern config` prints the effective configuration.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lectern_config::LecternConfig;

/// Lectern - guided reading comprehension service.
#[derive(Parser, Debug)]
#[command(name = "lectern", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Print the effective configuration (secrets redacted).
    Config,
}

fn load(path: Option<&std::path::Path>) -> Result<LecternConfig, Vec<lectern_config::ConfigError>> {
    match path {
        Some(path) => lectern_config::load_and_validate_path(path),
        None => lectern_config::load_and_validate(),
    }
}

/// Render the configuration as TOML with the bearer token masked.
fn render_config(config: &LecternConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.server.bearer_token.is_some() {
        shown.server.bearer_token = Some("[redacted]".to_string());
    }
    toml::to_string_pretty(&shown)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            lectern_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("lectern: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match render_config(&config) {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("lectern: failed to render config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("lectern: use --help for available commands");
        }
    }
}
