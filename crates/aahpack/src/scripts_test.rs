// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn vars() -> ScriptVars {
    ScriptVars {
        app_name: "myapp".to_string(),
        app_profile: "qa".to_string(),
    }
}

#[rstest]
fn test_shell_script_substitutions() {
    let script = StartupScript::Shell.render(&vars()).unwrap();
    assert!(script.starts_with("#!/usr/bin/env bash\n"));
    assert!(script.contains("APP_NAME=\"myapp\""));
    assert!(script.contains("APP_ENV_PROFILE=\"qa\""));
    // backticks survive rendering untouched
    assert!(script.contains("ls=`ls -ld \"$PRG\"`"));
    assert!(!script.contains("{{"));
}

#[rstest]
fn test_batch_script_substitutions() {
    let script = StartupScript::Batch.render(&vars()).unwrap();
    assert!(script.starts_with("@ECHO OFF"));
    assert!(script.contains("SET APP_NAME=myapp\n"));
    assert!(script.contains("SET APP_ENV_PROFILE=qa\n"));
    assert!(script.contains("%APP_DIR%bin\\%APP_NAME%.exe"));
}

#[rstest]
fn test_write_startup_scripts() {
    let tmp = TempDir::new().unwrap();
    let written = write_startup_scripts(tmp.path(), &vars()).unwrap();
    assert_eq!(
        written,
        vec![tmp.path().join("aah.sh"), tmp.path().join("aah.cmd")]
    );

    #[cfg(unix)]
    for path in &written {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755, "{}", path.display());
    }
}
