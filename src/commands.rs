// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Subcommand implementations

use crate::cli::{self, Cli};
use anyhow::Context;
use owo_colors::OwoColorize;
use serde::Serialize;
use spacey_pack_plugin::config::KEYS;
use spacey_pack_plugin::{
    mechanisms, AssetUrlArgs, Config, DefaultPlugin, DynamicImportArgs, DynamicImportTarget,
    DynamicResolution, ExternalList, HostCapabilities, ImportMetaArgs, InputOptions, LoadArgs,
    OutputFormat, PackError, Plugin, ResolveArgs,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// One line of `spack resolve` output
#[derive(Debug, Serialize)]
struct Resolution {
    specifier: String,
    resolved: Option<PathBuf>,
}

/// Load config for the project the CLI points at
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let project = match &cli.project {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("reading current directory")?,
    };
    let config = Config::load(&project)?;
    debug!(?config, "Loaded configuration");
    Ok(config)
}

fn default_plugin(config: &Config, preserve_symlinks: bool) -> anyhow::Result<DefaultPlugin> {
    let options = InputOptions {
        preserve_symlinks: preserve_symlinks || config.input.preserve_symlinks,
    };
    let plugin = DefaultPlugin::new(&HostCapabilities::native(), &options)?;
    debug!(
        plugin = plugin.name(),
        preserve_symlinks = plugin.resolver().preserve_symlinks(),
        "Created plugin"
    );
    Ok(plugin)
}

fn output_format(config: &Config, flag: Option<&str>) -> anyhow::Result<OutputFormat> {
    match flag {
        Some(name) => Ok(name.parse()?),
        None => Ok(config.format),
    }
}

/// `spack resolve`: each specifier on a blocking worker
pub async fn resolve(args: &cli::ResolveArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let plugin = Arc::new(default_plugin(config, args.preserve_symlinks)?);

    let tasks: Vec<_> = args
        .specifiers
        .iter()
        .cloned()
        .map(|specifier| {
            let plugin = Arc::clone(&plugin);
            let importer = args.importer.clone();
            tokio::task::spawn_blocking(move || {
                let resolved = plugin.resolve_id(ResolveArgs {
                    specifier: &specifier,
                    importer: importer.as_deref(),
                })?;
                Ok::<_, anyhow::Error>(Resolution { specifier, resolved })
            })
        })
        .collect();

    let mut resolutions = Vec::with_capacity(tasks.len());
    for task in tasks {
        resolutions.push(task.await??);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&resolutions)?);
        return Ok(());
    }

    for resolution in &resolutions {
        match &resolution.resolved {
            Some(path) => println!("{} {} {}", resolution.specifier.cyan(), "->".dimmed(), path.display()),
            None => println!("{} {} {}", resolution.specifier.cyan(), "->".dimmed(), "unresolved".yellow()),
        }
    }
    Ok(())
}

/// `spack load`
pub fn load(args: &cli::LoadArgs, config: &Config) -> anyhow::Result<()> {
    let plugin = default_plugin(config, false)?;
    if let Some(source) = plugin.load(LoadArgs { id: &args.path })? {
        print!("{}", source);
    }
    Ok(())
}

/// `spack dynamic-import`
pub fn dynamic_import(args: &cli::DynamicImportArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let plugin = default_plugin(config, args.preserve_symlinks)?;
    let externals = ExternalList::new(config.external.iter().chain(&args.external).cloned());
    let target = if args.expression {
        DynamicImportTarget::Expression
    } else {
        DynamicImportTarget::Literal(&args.specifier)
    };

    let result = plugin.resolve_dynamic_import(
        &externals,
        DynamicImportArgs {
            target,
            importer: &args.importer,
        },
    )?;

    if cli.json {
        let value = match &result {
            DynamicResolution::Resolved(path) => serde_json::json!({ "resolved": path }),
            DynamicResolution::Unresolved => serde_json::json!({ "resolved": null }),
            DynamicResolution::Deferred => serde_json::json!({ "deferred": true }),
        };
        println!("{}", value);
        return Ok(());
    }

    match result {
        DynamicResolution::Resolved(path) => println!("{}", path.display()),
        DynamicResolution::Unresolved => println!("{}", "unresolved".yellow()),
        DynamicResolution::Deferred => println!("{}", "deferred (external or non-literal)".dimmed()),
    }
    Ok(())
}

/// `spack asset-url`
pub fn asset_url(args: &cli::AssetUrlArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let format = output_format(config, args.format.as_deref())?;
    let plugin = default_plugin(config, false)?;
    let expression = plugin.resolve_asset_url(AssetUrlArgs {
        relative_path: &args.relative_path,
        format,
    });
    print_expression(cli, format, expression)
}

/// `spack import-meta`
pub fn import_meta(args: &cli::ImportMetaArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let format = output_format(config, args.format.as_deref())?;
    let plugin = default_plugin(config, false)?;
    let expression = plugin.resolve_import_meta(ImportMetaArgs {
        property: args.property.as_deref(),
        chunk_id: &args.chunk_id,
        format,
    });
    print_expression(cli, format, expression)
}

fn print_expression(cli: &Cli, format: OutputFormat, expression: Option<String>) -> anyhow::Result<()> {
    if cli.json {
        println!(
            "{}",
            serde_json::json!({ "format": format, "expression": expression })
        );
        return Ok(());
    }
    match expression {
        Some(code) => println!("{}", code),
        None => println!("{}", format!("no mechanism for {}; native behavior applies", format).dimmed()),
    }
    Ok(())
}

/// `spack formats`
pub fn formats(cli: &Cli) -> anyhow::Result<()> {
    let rows: Vec<_> = OutputFormat::ALL
        .iter()
        .map(|&format| {
            let import_meta = mechanisms::import_meta_url_mechanism(format, "<chunk>").is_some();
            (format, import_meta)
        })
        .collect();

    if cli.json {
        let value: Vec<_> = rows
            .iter()
            .map(|(format, import_meta)| {
                serde_json::json!({ "format": format, "asset_url": true, "import_meta": import_meta })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{:<8} {:<10} {}", "FORMAT".bold(), "ASSET URL".bold(), "IMPORT.META".bold());
    for (format, import_meta) in rows {
        let meta = if import_meta { "emulated" } else { "native" };
        println!("{:<8} {:<10} {}", format.as_str().cyan(), "emulated", meta);
    }
    Ok(())
}

/// `spack config get`
pub fn config_get(args: &cli::ConfigGetArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let keys: Vec<&str> = match &args.key {
        Some(key) if KEYS.contains(&key.as_str()) => vec![key.as_str()],
        Some(key) => anyhow::bail!(PackError::Config(format!("unknown key '{}'", key))),
        None => KEYS.to_vec(),
    };

    if cli.json {
        let value: serde_json::Map<_, _> = keys
            .iter()
            .map(|&key| (key.to_string(), serde_json::json!(config.get(key))))
            .collect();
        println!("{}", serde_json::Value::Object(value));
        return Ok(());
    }

    for key in keys {
        let value = config.get(key).unwrap_or_default();
        if args.key.is_some() {
            println!("{}", value);
        } else {
            println!("{} = {}", key.cyan(), value);
        }
    }
    Ok(())
}
