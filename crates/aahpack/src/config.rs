// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Project configuration read from `aah.project`.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::{Error, ExcludeSet, Result};

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

/// Excludes applied when `build.excludes` is not configured.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "*.go", "*_test.go", ".*", "*.bak", "*.tmp", "vendor", "app", "build", "tests", "logs",
];

/// Files stored uncompressed when `vfs.no_gzip` is not configured.
pub const DEFAULT_NO_GZIP: &[&str] = &[
    "*.gif", "*.png", "*.jpg", "*.jpeg", "*.ico", "*.woff", "*.woff2", "*.zip", "*.gz",
];

/// Key/value lookups over a configuration document, by dotted path.
pub trait ConfigSource {
    /// The list at `key`, or `None` when the key is absent.
    fn string_list(&self, key: &str) -> Option<Vec<String>>;

    /// The scalar at `key` as a string, or `fallback`.
    fn string_default(&self, key: &str, fallback: &str) -> String;

    /// Child keys of the mapping at `prefix`, in document order.
    fn keys_by_path(&self, prefix: &str) -> Vec<String>;
}

/// A custom `vfs.mount.<name>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub name: String,
    pub mount_path: String,
    pub physical_path: String,
}

/// Parsed YAML configuration document.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    root: Value,
    source_path: Option<PathBuf>,
}

impl ProjectConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::parse(yaml, None)
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        Self::parse(&yaml, Some(path))
    }

    fn parse(yaml: &str, path: Option<&Path>) -> Result<Self> {
        let root: Value = serde_yaml::from_str(yaml).map_err(|error| Error::InvalidConfig {
            path: path.map(Path::to_path_buf).unwrap_or_default(),
            error,
        })?;
        Ok(Self {
            root,
            source_path: path.map(Path::to_path_buf),
        })
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .filter(|part| !part.is_empty())
            .try_fold(&self.root, |value, part| value.as_mapping()?.get(part))
    }

    /// Configured application name, if any.
    pub fn name(&self) -> Option<String> {
        self.lookup("name").and_then(scalar).filter(|s| !s.is_empty())
    }

    /// Packaging excludes (`build.excludes`), validated.
    pub fn excludes(&self) -> Result<ExcludeSet> {
        self.pattern_list("build.excludes", DEFAULT_EXCLUDES)
    }

    /// Excludes for source scanning (`build.ast_excludes`), validated.
    pub fn ast_excludes(&self) -> Result<ExcludeSet> {
        self.pattern_list("build.ast_excludes", &["*_test.go", ".*", "*.bak", "*.tmp", "vendor"])
    }

    /// Files embedded without gzip (`vfs.no_gzip`), validated.
    pub fn no_gzip(&self) -> Result<ExcludeSet> {
        self.pattern_list("vfs.no_gzip", DEFAULT_NO_GZIP)
    }

    fn pattern_list(&self, key: &str, default: &[&str]) -> Result<ExcludeSet> {
        match self.string_list(key) {
            Some(patterns) => ExcludeSet::new(patterns),
            None => ExcludeSet::new(default),
        }
    }

    /// Custom mounts from `vfs.mount.*`, in document order.
    pub fn mounts(&self) -> Vec<MountEntry> {
        self.keys_by_path("vfs.mount")
            .into_iter()
            .map(|name| MountEntry {
                mount_path: self.string_default(&format!("vfs.mount.{name}.mount_path"), ""),
                physical_path: self.string_default(&format!("vfs.mount.{name}.physical_path"), ""),
                name,
            })
            .collect()
    }
}

impl ConfigSource for ProjectConfig {
    fn string_list(&self, key: &str) -> Option<Vec<String>> {
        match self.lookup(key)? {
            Value::Sequence(items) => Some(items.iter().filter_map(scalar).collect()),
            Value::Null => Some(Vec::new()),
            other => scalar(other).map(|s| vec![s]),
        }
    }

    fn string_default(&self, key: &str, fallback: &str) -> String {
        self.lookup(key)
            .and_then(scalar)
            .unwrap_or_else(|| fallback.to_string())
    }

    fn keys_by_path(&self, prefix: &str) -> Vec<String> {
        self.lookup(prefix)
            .and_then(Value::as_mapping)
            .map(|mapping| mapping.keys().filter_map(scalar).collect())
            .unwrap_or_default()
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
