// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Error types for packaging operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience Result type with aahpack Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building and packaging an application.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Exclude or no-gzip pattern is empty or malformed
    #[error("Invalid pattern {pattern:?}: {reason}")]
    #[diagnostic(
        code(aahpack::invalid_pattern),
        help("Check 'build.excludes' and 'vfs.no_gzip' in aah.project")
    )]
    InvalidPattern { pattern: String, reason: String },

    /// Mount physical path is missing or not absolute
    #[error("Invalid mount '{virtual_path}' <== {physical_path:?}: {reason}")]
    #[diagnostic(
        code(aahpack::mount_path),
        help("'vfs.mount.<name>.physical_path' must be an existing absolute directory")
    )]
    MountPath {
        virtual_path: String,
        physical_path: PathBuf,
        reason: String,
    },

    /// Failed to read a file or directory
    #[error("Failed to read {path:?}")]
    #[diagnostic(code(aahpack::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to create or write a file or directory
    #[error("Failed to write {path:?}")]
    #[diagnostic(code(aahpack::write_failed))]
    WriteFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to copy a file into the staging tree
    #[error("Failed to copy {src:?} to {dest:?}")]
    #[diagnostic(code(aahpack::copy_failed))]
    CopyFailed {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// The toolchain failed to produce a binary
    #[error("Compile failed: {0}")]
    #[diagnostic(
        code(aahpack::compile_failed),
        help("Run the build with -v to see the full toolchain invocation")
    )]
    Compile(String),

    /// The zip artifact could not be created
    #[error("Failed to create archive {dest:?}")]
    #[diagnostic(code(aahpack::archive_failed))]
    Archive {
        dest: PathBuf,
        #[source]
        error: zip::result::ZipError,
    },

    /// No aah.project found for the application
    #[error("No aah.project found in {0:?} or any parent directory")]
    #[diagnostic(
        code(aahpack::project_not_found),
        help("Run from inside the application directory or pass --importpath")
    )]
    ProjectNotFound(PathBuf),

    /// Invalid YAML in a project or grammar file
    #[error("Invalid configuration file {path:?}: {error}")]
    #[diagnostic(code(aahpack::invalid_config), help("Check the file's YAML syntax"))]
    InvalidConfig {
        path: PathBuf,
        #[source]
        error: serde_yaml::Error,
    },

    /// Startup script template could not be rendered
    #[error("Failed to render template '{name}'")]
    #[diagnostic(code(aahpack::template))]
    Template {
        name: String,
        #[source]
        error: tera::Error,
    },

    /// Migration grammar is unusable
    #[error("Invalid migrate grammar: {0}")]
    #[diagnostic(code(aahpack::grammar))]
    Grammar(String),

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(aahpack::io_error))]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::ReadFailed {
            path: path.into(),
            error,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            error,
        }
    }

    pub(crate) fn archive(dest: impl Into<PathBuf>, error: impl Into<zip::result::ZipError>) -> Self {
        Self::Archive {
            dest: dest.into(),
            error: error.into(),
        }
    }
}
