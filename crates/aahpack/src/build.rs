// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! The build orchestrator.
//!
//! A build runs its stages strictly in sequence and stops at the first
//! error. Multi-file mode compiles, stages and archives a directory tree;
//! single-binary mode embeds assets, compiles against them and archives
//! the binary alone.

use std::path::{Path, PathBuf};

use crate::config::ConfigSource;
use crate::naming::{ArchiveTarget, target_goarch, target_goos};
use crate::toolchain::{CompileOptions, Compiler, resolve_version};
use crate::vfs::{DEFAULT_MOUNT_PATH, Embedder, MountSpec};
use crate::{DEFAULT_PROFILE, Error, Project, Result, archive, staging, vfs};

#[cfg(test)]
#[path = "./build_test.rs"]
mod build_test;

/// Go package the generated vfs source declares when `vfs.package` is unset.
pub const DEFAULT_VFS_PACKAGE: &str = "main";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Binary plus copied resources and startup scripts.
    #[default]
    MultiFile,
    /// One binary with every asset embedded.
    SingleBinary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Init,
    EmbeddingAssets,
    Compiling,
    Staging,
    Naming,
    Archiving,
    Done,
    Failed,
}

impl std::fmt::Display for BuildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BuildState::Init => "init",
            BuildState::EmbeddingAssets => "embedding-assets",
            BuildState::Compiling => "compiling",
            BuildState::Staging => "staging",
            BuildState::Naming => "naming",
            BuildState::Archiving => "archiving",
            BuildState::Done => "done",
            BuildState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub mode: BuildMode,
    /// Environment profile baked into the startup scripts.
    pub profile: String,
    /// Explicit archive file or directory.
    pub output: Option<PathBuf>,
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self {
            mode: BuildMode::default(),
            profile: DEFAULT_PROFILE.to_string(),
            output: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Absolute path of the written zip archive.
    pub artifact: PathBuf,
    /// Every state the build passed through, ending in `Done`.
    pub states: Vec<BuildState>,
}

/// Drives one build at a time through its stages.
#[derive(Debug)]
pub struct Builder<C> {
    compiler: C,
    version: Option<String>,
    target: Option<(String, String)>,
    states: Vec<BuildState>,
}

impl<C: Compiler> Builder<C> {
    pub fn new(compiler: C) -> Self {
        Self {
            compiler,
            version: None,
            target: None,
            states: Vec::new(),
        }
    }

    /// Use a fixed artifact version instead of resolving one.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Use a fixed target platform instead of the environment's.
    pub fn with_target(mut self, goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        self.target = Some((goos.into(), goarch.into()));
        self
    }

    /// States visited by the most recent build, including a failed one.
    pub fn states(&self) -> &[BuildState] {
        &self.states
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Build and package `project`.
    pub fn build(&mut self, project: &Project, request: &BuildRequest) -> Result<BuildOutcome> {
        self.states.clear();
        self.transition(BuildState::Init);
        tracing::info!(
            app = %project.display_name(),
            mode = ?request.mode,
            profile = %request.profile,
            "starting build"
        );

        let result = match request.mode {
            BuildMode::MultiFile => self.build_multi_file(project, request),
            BuildMode::SingleBinary => self.build_single_binary(project, request),
        };

        match result {
            Ok(artifact) => {
                self.transition(BuildState::Done);
                tracing::info!(artifact = %artifact.display(), "build complete");
                Ok(BuildOutcome {
                    artifact,
                    states: self.states.clone(),
                })
            }
            Err(err) => {
                let stage = self.states.last().copied().unwrap_or(BuildState::Init);
                self.transition(BuildState::Failed);
                tracing::error!(%stage, "build failed: {err}");
                Err(err)
            }
        }
    }

    fn build_multi_file(&mut self, project: &Project, request: &BuildRequest) -> Result<PathBuf> {
        let excludes = project.config.excludes()?;
        vfs::remove_generated_source(&project.base_dir)?;

        self.transition(BuildState::Compiling);
        let binary = self.compiler.compile(
            project,
            &CompileOptions {
                pack: true,
                embed: false,
            },
        )?;

        self.transition(BuildState::Staging);
        let staged = staging::assemble(&project.base_dir, &binary, &excludes, &request.profile)?;

        self.transition(BuildState::Naming);
        let dest = self.target(project, &binary, request).destination(&project.base_dir)?;

        self.transition(BuildState::Archiving);
        archive(staged.path(), &dest)?;

        if let Err(err) = staged.close() {
            tracing::warn!("unable to clean up staging root: {err}");
        }
        Ok(dest)
    }

    fn build_single_binary(
        &mut self,
        project: &Project,
        request: &BuildRequest,
    ) -> Result<PathBuf> {
        let excludes = project.config.excludes()?;
        let no_gzip = project.config.no_gzip()?;

        self.transition(BuildState::EmbeddingAssets);
        let mut embedder = Embedder::new();
        let default_mount = MountSpec::new(
            DEFAULT_MOUNT_PATH,
            project.base_dir.clone(),
            excludes.clone(),
            no_gzip.clone(),
        )?;
        embedder.process_mount(&default_mount)?;

        for entry in project.config.mounts() {
            if entry.mount_path.trim().is_empty() || entry.physical_path.trim().is_empty() {
                tracing::debug!(mount = %entry.name, "mount entry is incomplete, ignoring");
                continue;
            }
            let embedded = MountSpec::new(
                entry.mount_path.as_str(),
                entry.physical_path.as_str(),
                excludes.clone(),
                no_gzip.clone(),
            )
            .and_then(|mount| embedder.process_mount(&mount));
            match embedded {
                Ok(()) => {}
                Err(err @ Error::MountPath { .. }) => {
                    tracing::warn!(mount = %entry.name, "skipping mount: {err}");
                }
                Err(err) => return Err(err),
            }
        }

        let package = project
            .config
            .string_default("vfs.package", DEFAULT_VFS_PACKAGE);
        let generated = embedder.write_source(&project.base_dir, &package)?;

        self.transition(BuildState::Compiling);
        let compiled = self.compiler.compile(
            project,
            &CompileOptions {
                pack: true,
                embed: true,
            },
        );
        drop(generated);
        let binary = compiled?;

        self.transition(BuildState::Naming);
        let dest = self.target(project, &binary, request).destination(&project.base_dir)?;

        self.transition(BuildState::Archiving);
        archive(&binary, &dest)?;
        Ok(dest)
    }

    fn target(&self, project: &Project, binary: &Path, request: &BuildRequest) -> ArchiveTarget {
        let version = self
            .version
            .clone()
            .unwrap_or_else(|| resolve_version(project));
        let (goos, goarch) = self
            .target
            .clone()
            .unwrap_or_else(|| (target_goos(), target_goarch()));
        ArchiveTarget::new(binary, version, goos, goarch, request.output.clone())
    }

    fn transition(&mut self, state: BuildState) {
        tracing::debug!(%state, "build state");
        self.states.push(state);
    }
}
