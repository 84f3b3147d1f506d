// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Zip artifact creation.

use std::collections::HashSet;
use std::fs::{File, Metadata};
use std::io::{self, BufWriter, Seek, Write};
use std::path::Path;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::{Error, ExcludeSet, Result, walk};

#[cfg(test)]
#[path = "./archive_test.rs"]
mod archive_test;

/// Zip `source` into `dest`, replacing any previous artifact.
///
/// A directory is archived recursively with paths relative to it; a single
/// file lands at the archive root. Every entry keeps its permission bits.
/// Directories get an entry of their own only when no file lies below them.
pub fn archive(source: &Path, dest: &Path) -> Result<()> {
    match std::fs::remove_file(dest) {
        Ok(()) => tracing::debug!(path = %dest.display(), "removed previous artifact"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(Error::archive(dest, err)),
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::archive(dest, e))?;
    }

    let file = File::create(dest).map_err(|e| Error::archive(dest, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    if source.is_dir() {
        let no_excludes = ExcludeSet::default();
        let entries = walk::entries(source, &no_excludes)
            .filter(|entry| !matches!(entry, Ok(e) if e.depth() == 0))
            .collect::<Result<Vec<_>>>()?;

        // directories holding a file are implied by the file's entry name
        let mut non_empty = HashSet::new();
        for entry in entries.iter().filter(|e| e.file_type().is_file()) {
            non_empty.extend(entry.path().ancestors().skip(1));
        }

        for entry in &entries {
            let Ok(rel) = entry.path().strip_prefix(source) else {
                continue;
            };
            if entry.file_type().is_file() {
                add_file(&mut zip, &entry_name(rel), entry.path(), options, dest)?;
            } else if entry.file_type().is_dir() && !non_empty.contains(entry.path()) {
                let metadata = entry
                    .metadata()
                    .map_err(|e| Error::read(entry.path(), e.into()))?;
                zip.add_directory(
                    entry_name(rel),
                    options.unix_permissions(unix_mode(&metadata)),
                )
                .map_err(|e| Error::archive(dest, e))?;
            }
        }
    } else {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        add_file(&mut zip, &name, source, options, dest)?;
    }

    let mut writer = zip.finish().map_err(|e| Error::archive(dest, e))?;
    writer.flush().map_err(|e| Error::archive(dest, e))?;
    tracing::info!(path = %dest.display(), "created archive");
    Ok(())
}

fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    path: &Path,
    options: SimpleFileOptions,
    dest: &Path,
) -> Result<()> {
    let mut file = File::open(path).map_err(|e| Error::read(path, e))?;
    let metadata = file.metadata().map_err(|e| Error::read(path, e))?;
    let options = options.unix_permissions(unix_mode(&metadata));
    zip.start_file(name, options)
        .map_err(|e| Error::archive(dest, e))?;
    io::copy(&mut file, zip).map_err(|e| Error::archive(dest, e))?;
    Ok(())
}

/// Zip entry names always use `/`.
fn entry_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn unix_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn unix_mode(metadata: &Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}
