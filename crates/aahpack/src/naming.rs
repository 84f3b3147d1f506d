// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Canonical artifact naming: `<binary>-<version>-<goos>-<goarch>.zip`.

use std::path::{Path, PathBuf};

use crate::{BUILD_DIR, Result};

#[cfg(test)]
#[path = "./naming_test.rs"]
mod naming_test;

const ARCHIVE_EXT: &str = ".zip";

/// Inputs that fully determine the artifact destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTarget {
    pub binary_name: String,
    pub version: String,
    pub goos: String,
    pub goarch: String,
    pub explicit_output: Option<PathBuf>,
}

impl ArchiveTarget {
    pub fn new<P: AsRef<Path>>(
        binary_path: P,
        version: impl Into<String>,
        goos: impl Into<String>,
        goarch: impl Into<String>,
        explicit_output: Option<PathBuf>,
    ) -> Self {
        let binary_name = binary_path
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            binary_name,
            version: version.into(),
            goos: goos.into(),
            goarch: goarch.into(),
            explicit_output: explicit_output.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// `<binary base name without extension>-<version>-<goos>-<goarch>`
    pub fn canonical_name(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            strip_ext(&self.binary_name),
            self.version,
            self.goos,
            self.goarch
        )
    }

    /// Resolve the absolute archive path.
    ///
    /// No explicit output means `<app_base_dir>/build/<canonical>.zip`; an
    /// explicit output ending in `.zip` is the file itself; any other
    /// explicit output is a directory that receives `<canonical>.zip`.
    pub fn destination(&self, app_base_dir: &Path) -> Result<PathBuf> {
        let canonical = self.canonical_name();
        let dest = match &self.explicit_output {
            None => app_base_dir.join(BUILD_DIR).join(&canonical),
            Some(output) => {
                let output = std::path::absolute(output)?;
                if has_archive_ext(&output) {
                    output
                } else {
                    output.join(&canonical)
                }
            }
        };
        if has_archive_ext(&dest) {
            Ok(dest)
        } else {
            let mut dest = dest.into_os_string();
            dest.push(ARCHIVE_EXT);
            Ok(PathBuf::from(dest))
        }
    }
}

fn has_archive_ext(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().ends_with(ARCHIVE_EXT)
}

/// File name with its last extension removed (`app.exe` -> `app`).
pub fn strip_ext(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Target operating system in Go naming (`GOOS`, else the host).
pub fn target_goos() -> String {
    std::env::var("GOOS")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| go_os_name(std::env::consts::OS).to_string())
}

/// Target architecture in Go naming (`GOARCH`, else the host).
pub fn target_goarch() -> String {
    std::env::var("GOARCH")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| go_arch_name(std::env::consts::ARCH).to_string())
}

fn go_os_name(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn go_arch_name(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}
