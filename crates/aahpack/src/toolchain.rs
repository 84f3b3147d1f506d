// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! The Go toolchain collaborator and version resolution.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ConfigSource;
use crate::naming::target_goos;
use crate::{BUILD_DIR, Error, Project, Result};

#[cfg(test)]
#[path = "./toolchain_test.rs"]
mod toolchain_test;

/// Build tag that switches the application onto its embedded filesystem.
pub const EMBED_BUILD_TAG: &str = "aah_vfs";

/// Version used when neither the project nor git provides one.
pub const UNKNOWN_VERSION: &str = "unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Build for deployment packaging.
    pub pack: bool,
    /// Compile against the generated virtual filesystem source.
    pub embed: bool,
}

/// Something that turns application source into a binary.
pub trait Compiler {
    /// Compile the project and return the path of the produced binary.
    fn compile(&self, project: &Project, options: &CompileOptions) -> Result<PathBuf>;
}

/// Compiles with `go build`.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    go: PathBuf,
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self {
            go: PathBuf::from("go"),
        }
    }
}

impl GoToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `go` executable.
    pub fn with_executable<P: Into<PathBuf>>(go: P) -> Self {
        Self { go: go.into() }
    }

    /// Where the binary for `project` is written.
    pub fn output_path(project: &Project) -> PathBuf {
        let mut name = project.binary_name();
        if target_goos() == "windows" && !name.ends_with(".exe") {
            name.push_str(".exe");
        }
        project.base_dir.join(BUILD_DIR).join("bin").join(name)
    }

    /// Arguments passed to `go`, excluding the executable itself.
    pub fn build_args(project: &Project, options: &CompileOptions, output: &Path) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
        ];
        if options.pack {
            args.push("-trimpath".to_string());
        }
        if options.embed {
            args.push("-tags".to_string());
            args.push(EMBED_BUILD_TAG.to_string());
        }
        args.extend(project.config.string_list("build.flags").unwrap_or_default());
        args.push(".".to_string());
        args
    }
}

impl Compiler for GoToolchain {
    fn compile(&self, project: &Project, options: &CompileOptions) -> Result<PathBuf> {
        let output = Self::output_path(project);
        let args = Self::build_args(project, options, &output);
        tracing::info!(app = %project.name, embed = options.embed, "compiling application");
        tracing::debug!(go = %self.go.display(), ?args, "running go toolchain");

        let result = Command::new(&self.go)
            .args(&args)
            .current_dir(&project.base_dir)
            .output()
            .map_err(|e| Error::Compile(format!("unable to run {}: {e}", self.go.display())))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::Compile(format!(
                "go build exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }
        if !output.is_file() {
            return Err(Error::Compile(format!(
                "go build succeeded but {} was not produced",
                output.display()
            )));
        }
        Ok(output)
    }
}

/// Artifact version for `project`.
///
/// `build.version` is the baseline; `git describe --always --dirty` wins
/// when the base directory is a git checkout.
pub fn resolve_version(project: &Project) -> String {
    let configured = project.config.string_default("build.version", "");
    if let Some(described) = git_describe(&project.base_dir) {
        return described;
    }
    if configured.is_empty() {
        UNKNOWN_VERSION.to_string()
    } else {
        configured
    }
}

fn git_describe(base_dir: &Path) -> Option<String> {
    let git_dir = base_dir.join(".git");
    if !git_dir.exists() {
        return None;
    }
    let output = Command::new("git")
        .arg(format!("--git-dir={}", git_dir.display()))
        .args(["describe", "--always", "--dirty"])
        .current_dir(base_dir)
        .output()
        .ok()?;
    if !output.status.success() {
        tracing::debug!(
            "git describe failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}
