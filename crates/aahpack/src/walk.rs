// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Directory and file enumeration with exclude pruning.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::{Error, ExcludeSet, Result};

#[cfg(test)]
#[path = "./walk_test.rs"]
mod walk_test;

/// Direct, non-excluded subdirectories of `root`, sorted by name.
///
/// Patterns see each directory's name relative to `root`. Symlinks are
/// skipped, including links to directories.
pub fn dirs<P: AsRef<Path>>(root: P, excludes: &ExcludeSet) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root).map_err(|e| Error::read(root, e))? {
        let entry = entry.map_err(|e| Error::read(root, e))?;
        let file_type = entry.file_type().map_err(|e| Error::read(entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }
        let path = entry.path();
        if is_excluded(excludes, root, &path) {
            tracing::trace!(path = %path.display(), "excluded directory");
            continue;
        }
        dirs.push(path);
    }
    dirs.sort();
    Ok(dirs)
}

/// Walk everything under `root` that survives `excludes`.
///
/// An excluded directory is pruned before it is read, so nothing below it
/// is ever yielded. The root itself is never tested against the patterns.
pub fn entries<'a>(
    root: &Path,
    excludes: &'a ExcludeSet,
) -> impl Iterator<Item = Result<DirEntry>> + use<'a> {
    entries_within(root, root, excludes)
}

/// Like [`entries`], but patterns see paths relative to `anchor`.
///
/// Used when `root` is a subtree of the directory the excludes were
/// written for, so `static/*.map` still matches inside `static/`.
pub fn entries_within<'a>(
    root: &Path,
    anchor: &Path,
    excludes: &'a ExcludeSet,
) -> impl Iterator<Item = Result<DirEntry>> + use<'a> {
    let anchor = anchor.to_path_buf();
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| {
            entry.depth() == 0 || !is_excluded(excludes, &anchor, entry.path())
        })
        .filter_map(|entry| match entry {
            Ok(entry) if entry.path_is_symlink() => {
                tracing::trace!(path = %entry.path().display(), "skipping symlink");
                None
            }
            Ok(entry) => Some(Ok(entry)),
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                let io = err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                Some(Err(Error::read(path, io)))
            }
        })
}

/// Every non-excluded regular file under `root`, in walk order.
pub fn files<'a>(
    root: &Path,
    excludes: &'a ExcludeSet,
) -> impl Iterator<Item = Result<PathBuf>> + use<'a> {
    entries(root, excludes).filter_map(|entry| match entry {
        Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
        Ok(_) => None,
        Err(err) => Some(Err(err)),
    })
}

/// Test `path` as seen from `anchor`; paths outside it are tested whole.
fn is_excluded(excludes: &ExcludeSet, anchor: &Path, path: &Path) -> bool {
    excludes.matches(path.strip_prefix(anchor).unwrap_or(path))
}
