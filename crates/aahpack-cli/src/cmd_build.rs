// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Implementation of the `aah build` command.

use std::path::PathBuf;

use aahpack::{BuildMode, BuildRequest, Builder, GoToolchain, Project};
use clap::Args;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

/// Build and package the application into a zip artifact
#[derive(Debug, Args)]
pub struct CmdBuild {
    /// Import path of the application, resolved under $GOPATH/src
    #[clap(short = 'i', long = "importpath")]
    pub importpath: Option<String>,

    /// Environment profile baked into the startup scripts
    #[clap(short = 'e', long = "envprofile", default_value = aahpack::DEFAULT_PROFILE)]
    pub envprofile: String,

    /// Archive file (ending in .zip) or directory to write the artifact to
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Embed static assets and ship a single binary
    #[clap(short = 's', long)]
    pub single: bool,
}

impl CmdBuild {
    pub fn request(&self) -> BuildRequest {
        BuildRequest {
            mode: if self.single {
                BuildMode::SingleBinary
            } else {
                BuildMode::MultiFile
            },
            profile: self.envprofile.clone(),
            output: self.output.clone(),
        }
    }

    pub fn run(&mut self) -> Result<i32> {
        let cwd = std::env::current_dir().into_diagnostic()?;
        let project = Project::resolve(self.importpath.as_deref(), &cwd)?;

        let mut builder = Builder::new(GoToolchain::new());
        let outcome = builder.build(&project, &self.request())?;

        println!(
            "{} for {}",
            "Packaging successful".green().bold(),
            project.display_name()
        );
        println!(
            "Deployable artifact: {}",
            outcome.artifact.display().to_string().cyan()
        );
        Ok(0)
    }
}
