// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the default plugin

use std::path::PathBuf;
use thiserror::Error;

/// Result type for plugin operations
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors surfaced by the default plugin
///
/// A specifier that cannot be mapped to a file is *not* an error; resolution
/// reports it as `Ok(None)` so the orchestrator can try other strategies.
#[derive(Debug, Error)]
pub enum PackError {
    /// The host did not provide filesystem access
    #[error(
        "No filesystem capability was provided. Without one the default plugin cannot \
         resolve or load modules; supply a plugin with custom resolve_id and load hooks"
    )]
    MissingFileSystem,

    /// The current working directory is unavailable for entry resolution
    #[error("Cannot determine the current working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    /// The load hook could not read a module
    #[error("Could not load {}: {source}", path.display())]
    Load {
        /// Module path
        path: PathBuf,
        /// Underlying read failure
        #[source]
        source: std::io::Error,
    },

    /// Output format name outside the supported set
    #[error("Unknown output format '{0}' (expected one of amd, cjs, es, iife, system, umd)")]
    UnknownFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML config parse error
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PackError {
    /// Create a load error for `path`
    pub fn load(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Load {
            path: path.into(),
            source,
        }
    }

    /// Stable code identifying the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFileSystem => "MISSING_FS",
            Self::WorkingDirectory(_) => "CWD_UNAVAILABLE",
            Self::Load { .. } => "LOAD_FAILED",
            Self::UnknownFormat(_) => "UNKNOWN_FORMAT",
            Self::Config(_) | Self::Toml(_) => "CONFIG",
            Self::Io(_) => "IO",
        }
    }

    /// Whether the error means the host environment cannot support resolution at all
    pub fn is_environment(&self) -> bool {
        matches!(self, Self::MissingFileSystem | Self::WorkingDirectory(_))
    }
}
