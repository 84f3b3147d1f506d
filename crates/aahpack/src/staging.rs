// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Assembly of the deployable directory tree.
//!
//! The staging root mirrors the final archive layout:
//!
//! ```text
//! <root>/
//!   bin/<binary>
//!   <app subdirectories, minus excludes and the app package>
//!   aah.sh
//!   aah.cmd
//! ```

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::naming::strip_ext;
use crate::scripts::{ScriptVars, write_startup_scripts};
use crate::{APP_PACKAGE_DIR, Error, ExcludeSet, Result, walk};

#[cfg(test)]
#[path = "./staging_test.rs"]
mod staging_test;

/// Directory inside the staging root that holds the binary.
pub const BIN_DIR: &str = "bin";

#[cfg(unix)]
const MODE_RWXRXRX: u32 = 0o755;

/// Layout of one assembled staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    pub build_root: PathBuf,
    pub bin_dir: PathBuf,
    pub binary: PathBuf,
    /// Application subtrees copied, as (source, destination) in copy order.
    pub copied_subtrees: Vec<(PathBuf, PathBuf)>,
    pub scripts: Vec<PathBuf>,
}

/// A staging root inside a per-invocation temporary directory.
///
/// Dropping it removes the whole tree on a best-effort basis; use
/// [`StagingRoot::close`] to observe cleanup failures.
#[derive(Debug)]
pub struct StagingRoot {
    layout: StagingLayout,
    tmp: TempDir,
}

impl StagingRoot {
    pub fn path(&self) -> &Path {
        &self.layout.build_root
    }

    pub fn layout(&self) -> &StagingLayout {
        &self.layout
    }

    /// Remove the temporary tree, reporting any failure.
    pub fn close(self) -> Result<()> {
        let path = self.tmp.path().to_path_buf();
        self.tmp.close().map_err(|e| Error::write(path, e))
    }
}

/// Assemble a staging root in a fresh, uniquely named temporary directory.
pub fn assemble(
    app_base_dir: &Path,
    compiled_binary: &Path,
    excludes: &ExcludeSet,
    profile: &str,
) -> Result<StagingRoot> {
    let binary_name = file_name(compiled_binary)?;
    let tmp = tempfile::Builder::new()
        .prefix(&format!("{}-", strip_ext(&binary_name)))
        .tempdir()
        .map_err(|e| Error::write(std::env::temp_dir(), e))?;
    let layout = assemble_in(tmp.path(), app_base_dir, compiled_binary, excludes, profile)?;
    Ok(StagingRoot { layout, tmp })
}

/// Assemble the staging root at `<parent>/<binary stem>`.
///
/// Anything already at that path is deleted first, so a rerun after an
/// interrupted build never carries stale content forward.
pub fn assemble_in(
    parent: &Path,
    app_base_dir: &Path,
    compiled_binary: &Path,
    excludes: &ExcludeSet,
    profile: &str,
) -> Result<StagingLayout> {
    let binary_name = file_name(compiled_binary)?;
    let app_name = strip_ext(&binary_name).to_string();
    let build_root = parent.join(&app_name);

    if build_root.exists() {
        tracing::debug!(path = %build_root.display(), "removing stale staging root");
        std::fs::remove_dir_all(&build_root).map_err(|e| Error::write(&build_root, e))?;
    }
    create_dir(&build_root)?;

    let bin_dir = build_root.join(BIN_DIR);
    create_dir(&bin_dir)?;
    let binary = bin_dir.join(&binary_name);
    copy_file(compiled_binary, &binary)?;
    set_executable(&binary)?;
    tracing::info!(binary = %binary_name, "staged application binary");

    let subtree_excludes = excludes.with_extra([APP_PACKAGE_DIR])?;
    let mut copied_subtrees = Vec::new();
    for src in walk::dirs(app_base_dir, excludes)? {
        let Some(name) = src.file_name() else {
            continue;
        };
        if name == APP_PACKAGE_DIR {
            continue;
        }
        let dest = build_root.join(name);
        copy_tree(&src, &dest, app_base_dir, &subtree_excludes)?;
        tracing::info!(dir = %name.to_string_lossy(), "staged application directory");
        copied_subtrees.push((src, dest));
    }

    let scripts = write_startup_scripts(
        &build_root,
        &ScriptVars {
            app_name,
            app_profile: profile.to_string(),
        },
    )?;

    Ok(StagingLayout {
        build_root,
        bin_dir,
        binary,
        copied_subtrees,
        scripts,
    })
}

/// Recursively copy `src` to `dest`, pruning excluded entries at every level.
///
/// Patterns are matched against paths relative to `anchor`, the directory
/// the excludes were configured for. Permission bits of copied files and
/// directories are preserved.
pub fn copy_tree(src: &Path, dest: &Path, anchor: &Path, excludes: &ExcludeSet) -> Result<()> {
    for entry in walk::entries_within(src, anchor, excludes) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            let permissions = entry
                .metadata()
                .map_err(|e| Error::read(entry.path(), e.into()))?
                .permissions();
            std::fs::create_dir_all(&target).map_err(|e| Error::write(&target, e))?;
            std::fs::set_permissions(&target, permissions).map_err(|e| Error::write(&target, e))?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::read(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::write(path, e))?;
    set_executable(path)
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    std::fs::copy(src, dest)
        .map(|_| ())
        .map_err(|error| Error::CopyFailed {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
            error,
        })
}

/// Set owner rwx, group/other rx.
pub fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(MODE_RWXRXRX))
            .map_err(|e| Error::write(path, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
