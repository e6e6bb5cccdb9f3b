// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! End-to-end tests of the `spack` binary

use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn spack(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_spack"))
        .arg("--project")
        .arg(project)
        .args(args)
        .env_remove("SPACK_FORMAT")
        .env_remove("SPACK_EXTERNAL")
        .env_remove("SPACK_PRESERVE_SYMLINKS")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", project.join(".config"))
        .env("HOME", project)
        .output()
        .expect("spack binary runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_resolve_json() {
    let dir = tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    std::fs::write(root.join("util.mjs"), "").unwrap();
    let importer = root.join("main.js");

    let output = spack(
        &root,
        &["--json", "resolve", "./util", "./missing", "--importer", importer.to_str().unwrap()],
    );
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value[0]["specifier"], "./util");
    assert_eq!(value[0]["resolved"], root.join("util.mjs").to_str().unwrap());
    assert_eq!(value[1]["resolved"], serde_json::Value::Null);
}

#[test]
fn test_asset_url_uses_project_format() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("spack.toml"), "format = \"system\"\n").unwrap();

    let output = spack(dir.path(), &["asset-url", "img.png"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "new URL('img.png', module.meta.url).href");
}

#[test]
fn test_import_meta_es_has_no_mechanism() {
    let dir = tempdir().unwrap();

    let output = spack(dir.path(), &["--json", "import-meta", "url", "--chunk-id", "main.js", "--format", "es"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["format"], "es");
    assert_eq!(value["expression"], serde_json::Value::Null);
}

#[test]
fn test_unknown_format_fails() {
    let dir = tempdir().unwrap();

    let output = spack(dir.path(), &["asset-url", "img.png", "--format", "wasm"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("UNKNOWN_FORMAT"));
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.js");

    let output = spack(dir.path(), &["load", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("LOAD_FAILED"));
}

#[test]
fn test_config_get_defaults() {
    let dir = tempdir().unwrap();

    let output = spack(dir.path(), &["config", "get", "format"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "es");
}

#[test]
fn test_config_get_layers_user_and_project() {
    let dir = tempdir().unwrap();
    let user_dir = dir.path().join(".config").join("spacey-pack");
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(user_dir.join("spack.toml"), "format = \"amd\"\nexternal = [\"fs\"]\n").unwrap();
    std::fs::write(dir.path().join("spack.toml"), "format = \"cjs\"\n").unwrap();

    let output = spack(dir.path(), &["--json", "config", "get"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["format"], "cjs");
    assert_eq!(value["external"], "fs");
    assert_eq!(value["preserve-symlinks"], "false");
}

#[test]
fn test_config_get_unknown_key_fails() {
    let dir = tempdir().unwrap();

    let output = spack(dir.path(), &["config", "get", "root"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("CONFIG"));
}

#[test]
fn test_version_flag() {
    let dir = tempdir().unwrap();

    let output = spack(dir.path(), &["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}
