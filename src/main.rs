// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! spack - command line front-end for the spacey bundler's default plugin
//!
//! ## Usage
//!
//! ```bash
//! # Resolve specifiers relative to a module
//! spack resolve ./util ./missing --importer src/main.js
//!
//! # Asset URL expression for a CommonJS chunk
//! spack asset-url img/logo.png --format cjs
//!
//! # import.meta emulation for an IIFE chunk
//! spack import-meta url --chunk-id bundle.js --format iife
//! ```

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, ConfigCommand};
use owo_colors::OwoColorize;
use spacey_pack_plugin::PackError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Main entry point - uses tokio runtime for concurrent resolution.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("spacey_pack=debug,spacey_pack_plugin=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let pack_error = e.downcast_ref::<PackError>();
            let code = pack_error.map(PackError::code).unwrap_or("ERROR");
            eprintln!("{}: {:#}", format!("error[{}]", code).red().bold(), e);
            if pack_error.is_some_and(PackError::is_environment) {
                eprintln!(
                    "{}: this host cannot back the default plugin; run spack from a readable working directory",
                    "hint".cyan().bold()
                );
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = commands::load_config(cli)?;

    match &cli.command {
        Commands::Resolve(args) => commands::resolve(args, cli, &config).await,
        Commands::Load(args) => commands::load(args, &config),
        Commands::DynamicImport(args) => commands::dynamic_import(args, cli, &config),
        Commands::AssetUrl(args) => commands::asset_url(args, cli, &config),
        Commands::ImportMeta(args) => commands::import_meta(args, cli, &config),
        Commands::Formats => commands::formats(cli),
        Commands::Config(ConfigCommand::Get(args)) => commands::config_get(args, cli, &config),
    }
}
