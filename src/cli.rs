// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CLI argument parsing for spack.

use clap::{Args, Parser, Subcommand};
use spacey_pack_plugin::VERSION;
use std::path::PathBuf;

/// spack - drive the spacey bundler's default resolution and URL mechanism plugin
#[derive(Parser, Debug)]
#[command(name = "spack")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory holding spack.toml (default: current directory)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve one or more specifiers to files
    Resolve(ResolveArgs),

    /// Print the contents of a module
    Load(LoadArgs),

    /// Resolve the target of a dynamic import()
    #[command(name = "dynamic-import")]
    DynamicImport(DynamicImportArgs),

    /// Print the runtime expression for an asset URL
    #[command(name = "asset-url")]
    AssetUrl(AssetUrlArgs),

    /// Print the runtime expression for import.meta or one of its properties
    #[command(name = "import-meta")]
    ImportMeta(ImportMetaArgs),

    /// List output formats and their mechanisms
    Formats,

    /// Inspect the effective configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print one key, or every key when omitted
    Get(ConfigGetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    /// Key to print (preserve-symlinks, format, external)
    pub key: Option<String>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Specifiers to resolve
    #[arg(required = true)]
    pub specifiers: Vec<String>,

    /// Importing module (omit for entry points)
    #[arg(long)]
    pub importer: Option<PathBuf>,

    /// Keep symlinked files at their own path
    #[arg(long)]
    pub preserve_symlinks: bool,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Module path
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct DynamicImportArgs {
    /// Imported specifier
    pub specifier: String,

    /// Module containing the import()
    #[arg(long)]
    pub importer: PathBuf,

    /// Treat the target as a non-literal expression
    #[arg(long)]
    pub expression: bool,

    /// Additional external specifiers
    #[arg(long = "external", value_delimiter = ',')]
    pub external: Vec<String>,

    /// Keep symlinked files at their own path
    #[arg(long)]
    pub preserve_symlinks: bool,
}

#[derive(Args, Debug)]
pub struct AssetUrlArgs {
    /// Asset path relative to the chunk
    pub relative_path: String,

    /// Output format (amd, cjs, es, iife, system, umd)
    #[arg(short, long)]
    pub format: Option<String>,
}

#[derive(Args, Debug)]
pub struct ImportMetaArgs {
    /// Property to access (omit for the import.meta object)
    pub property: Option<String>,

    /// Chunk the access is emitted into
    #[arg(long)]
    pub chunk_id: String,

    /// Output format (amd, cjs, es, iife, system, umd)
    #[arg(short, long)]
    pub format: Option<String>,
}
