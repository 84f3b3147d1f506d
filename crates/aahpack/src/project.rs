// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Locating an aah application and loading its project file.

use std::path::{Path, PathBuf};

use crate::config::{ConfigSource, ProjectConfig};
use crate::{Error, PROJECT_FILENAME, Result};

#[cfg(test)]
#[path = "./project_test.rs"]
mod project_test;

/// An application ready to be built.
#[derive(Debug, Clone)]
pub struct Project {
    /// Absolute application base directory (holds `aah.project`).
    pub base_dir: PathBuf,
    pub name: String,
    pub import_path: Option<String>,
    pub config: ProjectConfig,
}

impl Project {
    /// Load the project rooted exactly at `base_dir`.
    pub fn load<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = resolve_start_path(base_dir.as_ref());
        let project_file = base_dir.join(PROJECT_FILENAME);
        if !project_file.is_file() {
            return Err(Error::ProjectNotFound(base_dir));
        }
        let base_dir = dunce::canonicalize(&base_dir).map_err(|e| Error::read(&base_dir, e))?;
        let config = ProjectConfig::load(&project_file)?;
        let name = config.name().unwrap_or_else(|| dir_name(&base_dir));
        tracing::info!(path = %project_file.display(), "loaded aah project file");
        Ok(Self {
            base_dir,
            name,
            import_path: None,
            config,
        })
    }

    /// Walk up from `start` to the first directory holding `aah.project`.
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = resolve_start_path(start.as_ref());
        let mut current = start.clone();
        loop {
            if current.join(PROJECT_FILENAME).is_file() {
                return Self::load(&current);
            }
            if !current.pop() {
                return Err(Error::ProjectNotFound(start));
            }
        }
    }

    /// Resolve an import path against `$GOPATH/src`.
    pub fn from_import_path(import_path: &str) -> Result<Self> {
        let import_path = import_path.trim().trim_end_matches('/');
        let base_dir = gopath()?.join("src").join(import_path);
        let mut project = Self::load(&base_dir)?;
        project.import_path = Some(import_path.to_string());
        Ok(project)
    }

    /// Resolve by import path when one is given, else discover upward from `cwd`.
    pub fn resolve(import_path: Option<&str>, cwd: &Path) -> Result<Self> {
        match import_path.filter(|p| !p.trim().is_empty()) {
            Some(import_path) => Self::from_import_path(import_path),
            None => Self::discover(cwd),
        }
    }

    /// Output binary name (`build.binary_name`, else the app name).
    pub fn binary_name(&self) -> String {
        self.config.string_default("build.binary_name", &self.name)
    }

    /// Human-readable identity for log lines.
    pub fn display_name(&self) -> String {
        match &self.import_path {
            Some(import_path) => format!("'{}' [{}]", self.name, import_path),
            None => format!("'{}' [{}]", self.name, self.base_dir.display()),
        }
    }
}

/// First `GOPATH` entry, else `~/go`.
pub fn gopath() -> Result<PathBuf> {
    if let Some(first) = std::env::var_os("GOPATH")
        .as_ref()
        .and_then(|v| std::env::split_paths(v).find(|p| !p.as_os_str().is_empty()))
    {
        return Ok(first);
    }
    dirs::home_dir()
        .map(|home| home.join("go"))
        .ok_or_else(|| Error::ProjectNotFound(PathBuf::from("$GOPATH")))
}

/// Resolve starting path, preferring $PWD to preserve symlinks.
fn resolve_start_path(start_path: &Path) -> PathBuf {
    if start_path.is_absolute() {
        start_path.to_owned()
    } else {
        match std::env::var("PWD").ok() {
            Some(pwd) => PathBuf::from(pwd).join(start_path),
            None => std::env::current_dir()
                .unwrap_or_default()
                .join(start_path),
        }
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}
