// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Output module formats

use crate::error::PackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Module system a bundle is emitted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Asynchronous Module Definition (`define(...)`)
    Amd,
    /// CommonJS (`require` / `module.exports`)
    Cjs,
    /// Native ECMAScript modules
    #[default]
    Es,
    /// Immediately-invoked function expression for `<script>` tags
    Iife,
    /// SystemJS (`System.register`)
    System,
    /// Universal Module Definition
    Umd,
}

impl OutputFormat {
    /// Every supported format
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Amd,
        OutputFormat::Cjs,
        OutputFormat::Es,
        OutputFormat::Iife,
        OutputFormat::System,
        OutputFormat::Umd,
    ];

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Amd => "amd",
            OutputFormat::Cjs => "cjs",
            OutputFormat::Es => "es",
            OutputFormat::Iife => "iife",
            OutputFormat::System => "system",
            OutputFormat::Umd => "umd",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amd" => Ok(OutputFormat::Amd),
            "cjs" | "commonjs" => Ok(OutputFormat::Cjs),
            "es" | "esm" | "module" => Ok(OutputFormat::Es),
            "iife" => Ok(OutputFormat::Iife),
            "system" => Ok(OutputFormat::System),
            "umd" => Ok(OutputFormat::Umd),
            other => Err(PackError::UnknownFormat(other.to_string())),
        }
    }
}
