// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! aah - build, package and migrate aah applications

use clap::{Parser, Subcommand};
use miette::Result;

mod cmd_build;
mod cmd_migrate;

use cmd_build::CmdBuild;
use cmd_migrate::CmdMigrate;

#[cfg(test)]
#[path = "./main_test.rs"]
mod main_test;

#[derive(Parser)]
#[clap(
    name = "aah",
    about = "Build and package aah applications",
    version,
    long_about = "Compile an aah application and package it as a versioned, deployable zip artifact"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

impl Logging {
    fn level(&self) -> tracing::Level {
        match (self.quiet, self.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::INFO,
            (false, 1) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Build and package the application into a zip artifact
    #[clap(visible_alias = "b")]
    Build(CmdBuild),

    /// Migrate the application codebase to the current aah version
    #[clap(visible_alias = "m")]
    Migrate(CmdMigrate),
}

impl Opt {
    fn run(self) -> Result<i32> {
        tracing_subscriber::fmt()
            .with_max_level(self.logging.level())
            .with_target(false)
            .init();

        match self.cmd {
            Command::Build(mut cmd) => cmd.run(),
            Command::Migrate(mut cmd) => cmd.run(),
        }
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run()?;
    std::process::exit(code);
}
