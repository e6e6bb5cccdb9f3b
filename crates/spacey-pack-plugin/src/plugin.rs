// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Plugin hooks and the default plugin

use crate::config::InputOptions;
use crate::error::{PackError, Result};
use crate::format::OutputFormat;
use crate::fs::{FileSystem, HostCapabilities};
use crate::mechanisms;
use crate::resolver::Resolver;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments of `resolve_id`
#[derive(Debug, Clone, Copy)]
pub struct ResolveArgs<'a> {
    /// Specifier as written in the import
    pub specifier: &'a str,
    /// Importing module, `None` for entries
    pub importer: Option<&'a Path>,
}

/// Arguments of `load`
#[derive(Debug, Clone, Copy)]
pub struct LoadArgs<'a> {
    /// Resolved module id
    pub id: &'a Path,
}

/// Target of a dynamic `import()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicImportTarget<'a> {
    /// `import('./literal.js')`
    Literal(&'a str),
    /// Any other expression, e.g. `import(name)`
    Expression,
}

/// Arguments of `resolve_dynamic_import`
#[derive(Debug, Clone, Copy)]
pub struct DynamicImportArgs<'a> {
    /// What is being imported
    pub target: DynamicImportTarget<'a>,
    /// Module containing the `import()`
    pub importer: &'a Path,
}

/// Arguments of `resolve_asset_url`
#[derive(Debug, Clone, Copy)]
pub struct AssetUrlArgs<'a> {
    /// Asset path relative to the chunk
    pub relative_path: &'a str,
    /// Output format of the chunk
    pub format: OutputFormat,
}

/// Arguments of `resolve_import_meta`
#[derive(Debug, Clone, Copy)]
pub struct ImportMetaArgs<'a> {
    /// Accessed property, `None` for bare `import.meta`
    pub property: Option<&'a str>,
    /// Chunk the access is emitted into
    pub chunk_id: &'a str,
    /// Output format of the chunk
    pub format: OutputFormat,
}

/// Result of `resolve_dynamic_import`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicResolution {
    /// Resolved to a file
    Resolved(PathBuf),
    /// Looked at and could not be resolved
    Unresolved,
    /// No opinion; later plugins or the orchestrator decide
    Deferred,
}

/// Services the orchestrator offers to plugins
pub trait PluginContext {
    /// Whether `specifier` imported from `importer` is external
    fn is_external(&self, specifier: &str, importer: Option<&Path>, is_resolved: bool) -> bool;
}

/// Bundler plugin hooks
///
/// Every hook defaults to "no opinion".
pub trait Plugin: Send + Sync {
    /// Plugin name used in diagnostics
    fn name(&self) -> &str;

    /// Map a specifier to a module id
    fn resolve_id(&self, _args: ResolveArgs<'_>) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    /// Source text of a module
    fn load(&self, _args: LoadArgs<'_>) -> Result<Option<String>> {
        Ok(None)
    }

    /// Resolve the target of a dynamic `import()`
    fn resolve_dynamic_import(
        &self,
        _ctx: &dyn PluginContext,
        _args: DynamicImportArgs<'_>,
    ) -> Result<DynamicResolution> {
        Ok(DynamicResolution::Deferred)
    }

    /// Runtime expression for an asset URL
    fn resolve_asset_url(&self, _args: AssetUrlArgs<'_>) -> Option<String> {
        None
    }

    /// Runtime expression for `import.meta` or one of its properties
    fn resolve_import_meta(&self, _args: ImportMetaArgs<'_>) -> Option<String> {
        None
    }
}

/// Fallback plugin: filesystem resolution, plain reads, per-format URL mechanisms
#[derive(Clone)]
pub struct DefaultPlugin {
    resolver: Resolver,
    fs: Arc<dyn FileSystem>,
}

impl DefaultPlugin {
    /// Plugin name
    pub const NAME: &'static str = "spacey-pack:default";

    /// Create the default plugin for a host
    pub fn new(host: &HostCapabilities, options: &InputOptions) -> Result<Self> {
        let fs = host.fs.clone().ok_or(PackError::MissingFileSystem)?;
        Ok(Self {
            resolver: Resolver::new(host, options)?,
            fs,
        })
    }

    /// The underlying resolver
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

impl std::fmt::Debug for DefaultPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultPlugin")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Plugin for DefaultPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn resolve_id(&self, args: ResolveArgs<'_>) -> Result<Option<PathBuf>> {
        self.resolver.resolve(args.specifier, args.importer)
    }

    fn load(&self, args: LoadArgs<'_>) -> Result<Option<String>> {
        self.fs
            .read_to_string(args.id)
            .map(Some)
            .map_err(|err| PackError::load(args.id, err))
    }

    fn resolve_dynamic_import(
        &self,
        ctx: &dyn PluginContext,
        args: DynamicImportArgs<'_>,
    ) -> Result<DynamicResolution> {
        let DynamicImportTarget::Literal(specifier) = args.target else {
            return Ok(DynamicResolution::Deferred);
        };
        if ctx.is_external(specifier, Some(args.importer), false) {
            return Ok(DynamicResolution::Deferred);
        }

        let resolved = self.resolve_id(ResolveArgs {
            specifier,
            importer: Some(args.importer),
        })?;
        Ok(resolved.map_or(DynamicResolution::Unresolved, DynamicResolution::Resolved))
    }

    fn resolve_asset_url(&self, args: AssetUrlArgs<'_>) -> Option<String> {
        Some(mechanisms::resolve_asset_url(args.relative_path, args.format))
    }

    fn resolve_import_meta(&self, args: ImportMetaArgs<'_>) -> Option<String> {
        mechanisms::resolve_import_meta(args.property, args.chunk_id, args.format)
    }
}

/// [`PluginContext`] treating a fixed list of specifiers as external
#[derive(Debug, Clone, Default)]
pub struct ExternalList {
    specifiers: Vec<String>,
}

impl ExternalList {
    /// Create from specifiers
    pub fn new(specifiers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            specifiers: specifiers.into_iter().map(Into::into).collect(),
        }
    }
}

impl PluginContext for ExternalList {
    fn is_external(&self, specifier: &str, _importer: Option<&Path>, _is_resolved: bool) -> bool {
        self.specifiers.iter().any(|s| s == specifier)
    }
}
