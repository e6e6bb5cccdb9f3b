// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Options and layered configuration

use crate::error::{PackError, Result};
use crate::format::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the project and user config file
pub const CONFIG_FILE: &str = "spack.toml";

/// Keys accepted by [`Config::set`] and [`Config::get`]
pub const KEYS: [&str; 3] = ["preserve-symlinks", "format", "external"];

/// Input options consulted by the default plugin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InputOptions {
    /// Keep symlinked files at their own path instead of their target
    pub preserve_symlinks: bool,
}

/// Configuration for `spack`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Input options
    pub input: InputOptions,

    /// Specifiers treated as external
    pub external: Vec<String>,

    /// Output format used when none is given
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Later layers win: user config, project config, then `SPACK_*` variables.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let mut config = Config::default();

        if let Some(user_config_path) = user_config_path() {
            if user_config_path.is_file() {
                config.merge_from_file(&user_config_path)?;
            }
        }

        let project_config_path = project_dir.join(CONFIG_FILE);
        if project_config_path.is_file() {
            config.merge_from_file(&project_config_path)?;
        }

        config.load_from_env(std::env::vars())?;

        Ok(config)
    }

    /// Merge configuration from a TOML file.
    pub fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        self.merge_from_str(&content)
    }

    /// Merge keys present in a TOML document.
    pub fn merge_from_str(&mut self, content: &str) -> Result<()> {
        let table: toml::Table = content.parse()?;

        for (key, value) in table {
            match (key.as_str(), value) {
                ("input", toml::Value::Table(input)) => {
                    for (key, value) in input {
                        self.set(&key, &toml_scalar(&key, value)?)?;
                    }
                }
                ("external", toml::Value::Array(items)) => {
                    self.external = items
                        .into_iter()
                        .map(|item| match item {
                            toml::Value::String(s) => Ok(s),
                            other => Err(PackError::Config(format!(
                                "external entries must be strings, got {}",
                                other.type_str()
                            ))),
                        })
                        .collect::<Result<_>>()?;
                }
                (key, value) => self.set(key, &toml_scalar(key, value)?)?,
            }
        }

        Ok(())
    }

    /// Apply `SPACK_*` variables.
    ///
    /// Other tools share the prefix (`SPACK_ROOT` from the Spack package
    /// manager), so unknown keys are skipped rather than rejected.
    pub fn load_from_env(&mut self, vars: impl IntoIterator<Item = (String, String)>) -> Result<()> {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix("SPACK_") {
                let config_key = config_key.to_lowercase().replace('_', "-");
                if !KEYS.contains(&config_key.as_str()) {
                    debug!("Ignoring unrelated environment variable {}", key);
                    continue;
                }
                self.set(&config_key, &value)?;
            }
        }
        Ok(())
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "preserve-symlinks" => self.input.preserve_symlinks = parse_bool(key, value)?,
            "format" => self.format = value.parse()?,
            "external" => {
                self.external = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => return Err(PackError::Config(format!("unknown key '{}'", key))),
        }
        Ok(())
    }

    /// Get a configuration value.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "preserve-symlinks" => Some(self.input.preserve_symlinks.to_string()),
            "format" => Some(self.format.to_string()),
            "external" => Some(self.external.join(",")),
            _ => None,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(PackError::Config(format!("'{}' expects a boolean, got '{}'", key, value))),
    }
}

fn toml_scalar(key: &str, value: toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        other => Err(PackError::Config(format!(
            "unsupported value for '{}': {}",
            key,
            other.type_str()
        ))),
    }
}

/// Path of the per-user config file.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spacey-pack").join(CONFIG_FILE))
}
