// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Implementation of the `aah migrate` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use aahpack::migrate::{Grammar, migrate_go_sources, migrate_view_files};
use aahpack::Project;
use clap::{Args, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

/// Migrate the application codebase to the current aah version
#[derive(Debug, Args)]
pub struct CmdMigrate {
    #[clap(subcommand)]
    pub cmd: MigrateCommand,
}

#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Rewrite Go sources and view files using the migrate grammar
    #[clap(visible_alias = "c")]
    Code(CmdMigrateCode),
}

impl CmdMigrate {
    pub fn run(&mut self) -> Result<i32> {
        match &mut self.cmd {
            MigrateCommand::Code(cmd) => cmd.run(),
        }
    }
}

/// Rewrite Go sources and view files using the migrate grammar
#[derive(Debug, Args)]
pub struct CmdMigrateCode {
    /// Import path of the application, resolved under $GOPATH/src
    #[clap(short = 'i', long = "importpath")]
    pub importpath: Option<String>,

    /// Grammar file (defaults to ~/.aah/migrate.conf)
    #[clap(long)]
    pub grammar: Option<PathBuf>,

    /// Answer yes to the confirmation prompt
    #[clap(short = 'y', long)]
    pub yes: bool,
}

impl CmdMigrateCode {
    pub fn grammar_path(&self) -> Result<PathBuf> {
        match &self.grammar {
            Some(path) => Ok(path.clone()),
            None => Grammar::default_path()
                .ok_or_else(|| miette::miette!("Unable to determine home directory")),
        }
    }

    pub fn run(&mut self) -> Result<i32> {
        let cwd = std::env::current_dir().into_diagnostic()?;
        let project = Project::resolve(self.importpath.as_deref(), &cwd)?;

        tracing::warn!(
            "Migrate does not take a file backup, it assumes the application uses version control"
        );
        if !self.yes && !confirm("Would you like to continue? [y/N]: ")? {
            println!("Okay, nothing was changed.");
            return Ok(0);
        }

        let grammar_path = self.grammar_path()?;
        let grammar = Grammar::load(&grammar_path)?;
        tracing::info!(path = %grammar_path.display(), "loaded migrate grammar");
        tracing::info!("migrate starts for {}", project.display_name());

        let go_count = migrate_go_sources(&project, &grammar)?;
        if go_count == 0 {
            println!("Go source code is up-to-date");
        }
        let view_count = migrate_view_files(&project, &grammar)?;
        if view_count == 0 {
            println!("View files are up-to-date");
        }

        println!(
            "{} for {} ({} Go sources, {} view files rewritten)",
            "Migrate successful".green().bold(),
            project.display_name(),
            go_count,
            view_count
        );
        Ok(0)
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question}");
    std::io::stdout().flush().into_diagnostic()?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .into_diagnostic()?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
