// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime URL mechanisms per output format
//!
//! Each function returns JavaScript source that is inlined into an emitted
//! chunk and computes a URL when the bundle *runs*. Formats that may load
//! in Node.js as well as in a browser (`cjs`, `umd`) branch on
//! `typeof document` at run time.
//!
//! Native ES modules have `import.meta` already, so there is no
//! `import.meta` mechanism for `es`.

use crate::format::OutputFormat;

/// `new URL(..).href`, optionally through a different `URL` constructor
fn resolve_url(args: &str, url_constructor: &str) -> String {
    format!("new {}({}).href", url_constructor, args)
}

/// `URL` looked up through `require` so browser-targeting tools do not shim it
const NODE_URL: &str = "(require('u' + 'rl').URL)";

fn url_from_document(chunk_id: &str) -> String {
    format!(
        "(document.currentScript && document.currentScript.src || new URL('{}', document.baseURI).href)",
        js_string(chunk_id)
    )
}

fn relative_url_from_document(relative_path: &str) -> String {
    resolve_url(
        &format!(
            "'{}', document.currentScript && document.currentScript.src || document.baseURI",
            js_string(relative_path)
        ),
        "URL",
    )
}

fn node_or_document(node: String, document: String) -> String {
    format!("(typeof document === 'undefined' ? {} : {})", node, document)
}

/// Expression evaluating to the absolute URL of an asset next to the chunk
pub fn resolve_asset_url(relative_path: &str, format: OutputFormat) -> String {
    let path = js_string(relative_path);
    match format {
        OutputFormat::Amd => resolve_url(&format!("require.toUrl('{}'), document.baseURI", path), "URL"),
        OutputFormat::Cjs | OutputFormat::Umd => node_or_document(
            resolve_url(&format!("'file:' + __dirname + '/{}'", path), NODE_URL),
            relative_url_from_document(relative_path),
        ),
        OutputFormat::Es => resolve_url(&format!("'{}', import.meta.url", path), "URL"),
        OutputFormat::Iife => relative_url_from_document(relative_path),
        OutputFormat::System => resolve_url(&format!("'{}', module.meta.url", path), "URL"),
    }
}

/// Expression standing in for `import.meta.url`, `None` for native ES modules
pub fn import_meta_url_mechanism(format: OutputFormat, chunk_id: &str) -> Option<String> {
    match format {
        OutputFormat::Amd => Some(resolve_url("module.uri, document.baseURI", "URL")),
        OutputFormat::Cjs | OutputFormat::Umd => Some(node_or_document(
            resolve_url("'file:' + __filename", NODE_URL),
            url_from_document(chunk_id),
        )),
        OutputFormat::Iife => Some(url_from_document(chunk_id)),
        OutputFormat::System => Some("module.meta.url".to_string()),
        OutputFormat::Es => None,
    }
}

/// Replacement for `import.meta` (`property == None`) or `import.meta.<property>`
///
/// `None` means "no opinion": leave `import.meta` to the host.
pub fn resolve_import_meta(property: Option<&str>, chunk_id: &str, format: OutputFormat) -> Option<String> {
    let mechanism = import_meta_url_mechanism(format, chunk_id)?;
    Some(match property {
        None => format!("({{ url: {} }})", mechanism),
        Some("url") => mechanism,
        Some(_) => "undefined".to_string(),
    })
}

/// Escape text for a single-quoted JavaScript string literal
fn js_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}
