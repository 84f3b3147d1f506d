// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! aahpack - build and packaging pipeline for aah applications
//!
//! This crate turns an application directory into a deployable zip
//! artifact, either as a multi-file tree (binary, copied resources and
//! startup scripts) or as a single binary with its assets embedded.
//!
//! # Overview
//!
//! An application is identified by an `aah.project` file at its base
//! directory:
//!
//! ```yaml
//! # aah.project
//! name: website
//! build:
//!   binary_name: website
//!   version: 1.0.0
//!   excludes: ["*.go", "*_test.go", ".*", "vendor", "app", "build", "tests", "logs"]
//! vfs:
//!   no_gzip: ["*.png", "*.woff2"]
//!   mount:
//!     docs:
//!       mount_path: /docs
//!       physical_path: /srv/website/docs
//! ```
//!
//! [`Builder`] drives the pipeline; every stage is also usable on its own.

pub mod archive;
pub mod build;
pub mod config;
pub mod error;
pub mod excludes;
pub mod migrate;
pub mod naming;
pub mod project;
pub mod scripts;
pub mod staging;
pub mod toolchain;
pub mod vfs;
pub mod walk;

pub use archive::archive;
pub use build::{BuildMode, BuildOutcome, BuildRequest, BuildState, Builder};
pub use config::{ConfigSource, MountEntry, ProjectConfig};
pub use error::{Error, Result};
pub use excludes::ExcludeSet;
pub use migrate::{Grammar, Replacer};
pub use naming::ArchiveTarget;
pub use project::Project;
pub use staging::{StagingLayout, StagingRoot};
pub use toolchain::{CompileOptions, Compiler, GoToolchain};
pub use vfs::{Embedder, FileEntry, GeneratedSource, MountSpec};

/// Well-known filename identifying an application base directory.
pub const PROJECT_FILENAME: &str = "aah.project";

/// The application's own source package directory.
///
/// It is never copied into a deployment tree, whatever the excludes say.
pub const APP_PACKAGE_DIR: &str = "app";

/// Directory under the base directory that receives build output.
pub const BUILD_DIR: &str = "build";

/// Environment profile used when none is requested.
pub const DEFAULT_PROFILE: &str = "prod";
