// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

//! Startup scripts rendered into the staging root.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./scripts_test.rs"]
mod scripts_test;

const SHELL_TEMPLATE: &str = include_str!("templates/aah.sh.tera");
const BATCH_TEMPLATE: &str = include_str!("templates/aah.cmd.tera");

/// Values substituted into every startup script.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptVars {
    /// Binary base name, extension stripped.
    pub app_name: String,
    /// Environment profile activated at startup.
    pub app_profile: String,
}

/// The startup scripts shipped with a deployment archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupScript {
    Shell,
    Batch,
}

impl StartupScript {
    pub const ALL: [StartupScript; 2] = [StartupScript::Shell, StartupScript::Batch];

    pub fn filename(self) -> &'static str {
        match self {
            Self::Shell => "aah.sh",
            Self::Batch => "aah.cmd",
        }
    }

    fn template(self) -> &'static str {
        match self {
            Self::Shell => SHELL_TEMPLATE,
            Self::Batch => BATCH_TEMPLATE,
        }
    }

    pub fn render(self, vars: &ScriptVars) -> Result<String> {
        let template_error = |error: tera::Error| Error::Template {
            name: self.filename().to_string(),
            error,
        };
        let context = tera::Context::from_serialize(vars).map_err(template_error)?;
        tera::Tera::one_off(self.template(), &context, false).map_err(template_error)
    }
}

/// Render every startup script into `dir` with mode 0755.
pub fn write_startup_scripts(dir: &Path, vars: &ScriptVars) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(StartupScript::ALL.len());
    for script in StartupScript::ALL {
        let path = dir.join(script.filename());
        let content = script.render(vars)?;
        std::fs::write(&path, content).map_err(|e| Error::write(&path, e))?;
        crate::staging::set_executable(&path)?;
        tracing::debug!(path = %path.display(), "rendered startup script");
        written.push(path);
    }
    Ok(written)
}
