// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-pack-plugin
//!
//! The fallback plugin of the spacey bundler. When no other plugin has an
//! opinion it:
//!
//! - resolves relative and absolute specifiers to files on disk, inferring
//!   `.mjs` / `.js` extensions and rejecting names whose case differs from
//!   the directory listing
//! - reads module sources for the `load` hook
//! - emits runtime expressions for asset URLs and `import.meta` for the
//!   `amd`, `cjs`, `es`, `iife`, `system` and `umd` output formats
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spacey_pack_plugin::{DefaultPlugin, HostCapabilities, InputOptions, Plugin, ResolveArgs};
//! use std::path::Path;
//!
//! # fn main() -> spacey_pack_plugin::Result<()> {
//! let plugin = DefaultPlugin::new(&HostCapabilities::native(), &InputOptions::default())?;
//! let resolved = plugin.resolve_id(ResolveArgs {
//!     specifier: "./util",
//!     importer: Some(Path::new("/project/src/main.js")),
//! })?;
//! println!("{:?}", resolved);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod format;
pub mod fs;
pub mod mechanisms;
pub mod plugin;
pub mod resolver;

// Re-exports
pub use config::{Config, InputOptions};
pub use error::{PackError, Result};
pub use format::OutputFormat;
pub use fs::{EntryKind, FileSystem, HostCapabilities, OsFileSystem};
pub use plugin::{
    AssetUrlArgs, DefaultPlugin, DynamicImportArgs, DynamicImportTarget, DynamicResolution,
    ExternalList, ImportMetaArgs, LoadArgs, Plugin, PluginContext, ResolveArgs,
};
pub use resolver::{FileCheck, Resolver};

/// Version of the plugin crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
