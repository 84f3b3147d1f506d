// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use aahpack::BuildMode;
use rstest::rstest;

use super::*;
use crate::cmd_migrate::MigrateCommand;

fn parse(args: &[&str]) -> Opt {
    Opt::try_parse_from(args).expect("arguments should parse")
}

#[rstest]
fn test_build_defaults() {
    let opt = parse(&["aah", "build"]);
    let Command::Build(cmd) = opt.cmd else {
        panic!("Expected build command");
    };
    let request = cmd.request();
    assert_eq!(request.mode, BuildMode::MultiFile);
    assert_eq!(request.profile, "prod");
    assert_eq!(request.output, None);
    assert_eq!(cmd.importpath, None);
}

#[rstest]
fn test_build_flags() {
    let opt = parse(&[
        "aah",
        "build",
        "-i",
        "github.com/user/app",
        "-e",
        "qa",
        "-o",
        "/out/custom.zip",
        "-s",
    ]);
    let Command::Build(cmd) = opt.cmd else {
        panic!("Expected build command");
    };
    let request = cmd.request();
    assert_eq!(request.mode, BuildMode::SingleBinary);
    assert_eq!(request.profile, "qa");
    assert_eq!(request.output, Some(PathBuf::from("/out/custom.zip")));
    assert_eq!(cmd.importpath.as_deref(), Some("github.com/user/app"));
}

#[rstest]
#[case(&["aah", "build"], tracing::Level::INFO)]
#[case(&["aah", "-v", "build"], tracing::Level::DEBUG)]
#[case(&["aah", "build", "-vv"], tracing::Level::TRACE)]
#[case(&["aah", "build", "-q"], tracing::Level::ERROR)]
fn test_logging_level(#[case] args: &[&str], #[case] expected: tracing::Level) {
    assert_eq!(parse(args).logging.level(), expected);
}

#[rstest]
fn test_migrate_code() {
    let opt = parse(&["aah", "m", "c", "--grammar", "/tmp/migrate.conf", "-y"]);
    let Command::Migrate(cmd) = opt.cmd else {
        panic!("Expected migrate command");
    };
    let MigrateCommand::Code(code) = cmd.cmd;
    assert!(code.yes);
    assert_eq!(
        code.grammar_path().unwrap(),
        PathBuf::from("/tmp/migrate.conf")
    );
}
