// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Virtual filesystem embedding for single-binary builds.
//!
//! Each mount pairs a virtual path with an absolute physical directory.
//! Files under the directory are read (and gzipped unless they match the
//! no-gzip list), then rendered into one generated Go source file that the
//! compile step picks up. The generated file is owned by a
//! [`GeneratedSource`] guard and removed when the guard drops.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::{APP_PACKAGE_DIR, Error, ExcludeSet, Result, walk};

#[cfg(test)]
#[path = "./vfs_test.rs"]
mod vfs_test;

/// Name of the generated source file, written under the app package dir.
pub const VFS_SOURCE_FILENAME: &str = "aah_vfs_gen.go";

/// Virtual path of the mount that exposes the application base directory.
pub const DEFAULT_MOUNT_PATH: &str = "/app";

/// A (virtual path, physical path) pairing to embed.
#[derive(Debug, Clone)]
pub struct MountSpec {
    pub virtual_path: String,
    pub physical_path: PathBuf,
    pub excludes: ExcludeSet,
    pub no_gzip: ExcludeSet,
}

impl MountSpec {
    /// Build a mount, rejecting a relative physical path up front.
    pub fn new<V, P>(
        virtual_path: V,
        physical_path: P,
        excludes: ExcludeSet,
        no_gzip: ExcludeSet,
    ) -> Result<Self>
    where
        V: Into<String>,
        P: Into<PathBuf>,
    {
        let virtual_path = normalize_virtual(&virtual_path.into());
        let physical_path = physical_path.into();
        if !physical_path.is_absolute() {
            return Err(Error::MountPath {
                virtual_path,
                physical_path,
                reason: "physical path is not absolute".to_string(),
            });
        }
        Ok(Self {
            virtual_path,
            physical_path,
            excludes,
            no_gzip,
        })
    }

    /// Rewrite a physical path under this mount to its virtual path.
    pub fn to_virtual(&self, physical: &Path) -> Option<String> {
        let rel = physical.strip_prefix(&self.physical_path).ok()?;
        let mut virtual_path = self.virtual_path.clone();
        for component in rel.components() {
            if !virtual_path.ends_with('/') {
                virtual_path.push('/');
            }
            virtual_path.push_str(&component.as_os_str().to_string_lossy());
        }
        Some(virtual_path)
    }
}

fn normalize_virtual(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// A file captured by an embed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub virtual_path: String,
    pub physical_path: PathBuf,
    /// Size of the original file in bytes.
    pub size: u64,
    /// Whether `payload` holds gzip data.
    pub compressed: bool,
    pub payload: Vec<u8>,
}

/// A directory captured by an embed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirNode {
    pub virtual_path: String,
    pub physical_path: PathBuf,
}

/// Everything captured from a single mount.
#[derive(Debug, Clone)]
pub struct EmbeddedMount {
    pub virtual_path: String,
    pub physical_path: PathBuf,
    pub dirs: Vec<DirNode>,
    pub files: Vec<FileEntry>,
}

/// Accumulates mounts for one embed pass.
#[derive(Debug, Default)]
pub struct Embedder {
    mounts: Vec<EmbeddedMount>,
}

impl Embedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk a mount and capture its directories and files.
    ///
    /// A missing physical directory is a [`Error::MountPath`]; any read
    /// failure aborts the pass and leaves this embedder unchanged.
    pub fn process_mount(&mut self, mount: &MountSpec) -> Result<()> {
        if !mount.physical_path.is_dir() {
            return Err(Error::MountPath {
                virtual_path: mount.virtual_path.clone(),
                physical_path: mount.physical_path.clone(),
                reason: "physical path does not exist or is not a directory".to_string(),
            });
        }

        let mut embedded = EmbeddedMount {
            virtual_path: mount.virtual_path.clone(),
            physical_path: mount.physical_path.clone(),
            dirs: Vec::new(),
            files: Vec::new(),
        };

        for entry in walk::entries(&mount.physical_path, &mount.excludes) {
            let entry = entry?;
            let Some(virtual_path) = mount.to_virtual(entry.path()) else {
                continue;
            };
            if entry.file_type().is_dir() {
                embedded.dirs.push(DirNode {
                    virtual_path,
                    physical_path: entry.into_path(),
                });
            } else if entry.file_type().is_file() {
                let compress = !mount.no_gzip.matches(entry.path());
                let file = read_entry(entry.into_path(), virtual_path, compress)?;
                tracing::debug!(
                    path = %file.virtual_path,
                    size = file.size,
                    gzip = file.compressed,
                    "embedded file"
                );
                embedded.files.push(file);
            }
        }

        tracing::info!(
            mount = %mount.virtual_path,
            dirs = embedded.dirs.len(),
            files = embedded.files.len(),
            "processed mount"
        );
        self.mounts.push(embedded);
        Ok(())
    }

    pub fn mounts(&self) -> &[EmbeddedMount] {
        &self.mounts
    }

    /// All captured files across mounts, in capture order.
    pub fn files(&self) -> impl Iterator<Item = &FileEntry> {
        self.mounts.iter().flat_map(|m| m.files.iter())
    }

    /// Render the captured tree as Go source in the given package.
    pub fn render(&self, package: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// Code generated by aah build, DO NOT EDIT.");
        let _ = writeln!(out);
        let _ = writeln!(out, "package {package}");
        let _ = writeln!(out);
        let _ = writeln!(out, "import \"aahframework.org/vfs.v0\"");
        let _ = writeln!(out);
        let _ = writeln!(out, "func init() {{");
        for mount in &self.mounts {
            let _ = writeln!(
                out,
                "\t// Mount: {} <== {}",
                mount.virtual_path,
                mount.physical_path.display()
            );
            let _ = writeln!(
                out,
                "\tvfs.AddMount({}, {})",
                go_string(mount.virtual_path.as_bytes()),
                go_string(mount.physical_path.to_string_lossy().as_bytes())
            );
            for dir in &mount.dirs {
                let _ = writeln!(out, "\tvfs.AddDir({})", go_string(dir.virtual_path.as_bytes()));
            }
            for file in &mount.files {
                let _ = writeln!(
                    out,
                    "\tvfs.AddFile({}, {}, {}, {})",
                    go_string(file.virtual_path.as_bytes()),
                    file.size,
                    file.compressed,
                    go_string(&file.payload)
                );
            }
        }
        let _ = writeln!(out, "}}");
        out
    }

    /// Write the generated source into `<app_base_dir>/app/`.
    pub fn write_source(&self, app_base_dir: &Path, package: &str) -> Result<GeneratedSource> {
        let path = generated_source_path(app_base_dir);
        let package_dir = app_base_dir.join(APP_PACKAGE_DIR);
        let created_dir = if package_dir.is_dir() {
            None
        } else {
            std::fs::create_dir(&package_dir).map_err(|e| Error::write(&package_dir, e))?;
            Some(package_dir)
        };
        // the guard owns the directory from here, even if the write fails
        let generated = GeneratedSource { path, created_dir };
        std::fs::write(&generated.path, self.render(package))
            .map_err(|e| Error::write(&generated.path, e))?;
        tracing::debug!(path = %generated.path.display(), "wrote generated vfs source");
        Ok(generated)
    }
}

fn read_entry(physical_path: PathBuf, virtual_path: String, compress: bool) -> Result<FileEntry> {
    let data = std::fs::read(&physical_path).map_err(|e| Error::read(&physical_path, e))?;
    let size = data.len() as u64;
    let payload = if compress {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&data)
            .and_then(|_| encoder.finish())
            .map_err(|e| Error::read(&physical_path, e))?
    } else {
        data
    };
    Ok(FileEntry {
        virtual_path,
        physical_path,
        size,
        compressed: compress,
        payload,
    })
}

/// Quote bytes as a Go interpreted string literal.
fn go_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push('"');
    out
}

pub fn generated_source_path(app_base_dir: &Path) -> PathBuf {
    app_base_dir.join(APP_PACKAGE_DIR).join(VFS_SOURCE_FILENAME)
}

/// Remove a generated source file left behind by an interrupted build.
pub fn remove_generated_source(app_base_dir: &Path) -> Result<()> {
    let path = generated_source_path(app_base_dir);
    match std::fs::remove_file(&path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed stale vfs source");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::write(path, err)),
    }
}

/// Generated source file, removed on drop.
///
/// When writing it had to create the app package directory, that
/// directory is removed as well.
#[derive(Debug)]
pub struct GeneratedSource {
    path: PathBuf,
    created_dir: Option<PathBuf>,
}

impl GeneratedSource {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for GeneratedSource {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed generated vfs source"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(
                path = %self.path.display(),
                "failed to remove generated vfs source: {err}"
            ),
        }
        if let Some(dir) = &self.created_dir {
            if let Err(err) = std::fs::remove_dir(dir) {
                tracing::warn!(path = %dir.display(), "failed to remove created directory: {err}");
            }
        }
    }
}
