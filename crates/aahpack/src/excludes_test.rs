// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

use rstest::rstest;

use super::*;

#[rstest]
#[case("vendor", "vendor", true)]
#[case("vendor", "/proj/vendor", true)]
#[case("vendor", "/proj/src/vendor", true)]
#[case("vendor", "/proj/vendors", false)]
#[case("*.go", "/proj/app/main.go", true)]
#[case("*.go", "/proj/app/main.gohtml", false)]
#[case(".*", "/proj/.git", true)]
#[case("*_test.go", "controllers/app_test.go", true)]
#[case("static/*.map", "/proj/static/app.js.map", true)]
#[case("static/*.map", "/proj/static/js/app.js.map", false)]
#[case("static/js", "/proj/static/js", true)]
#[case("static/js", "/proj/public/js", false)]
#[case("Logs", "/proj/logs", false)]
#[case("*/config", "config", false)]
#[case("*/config", "static/config", true)]
#[case("*/config", "static/theme/config", true)]
fn test_matches(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
    let set = ExcludeSet::new([pattern]).unwrap();
    assert_eq!(set.matches(path), expected, "{pattern} vs {path}");
}

#[rstest]
fn test_any_pattern_excludes() {
    let set = ExcludeSet::new(["*.bak", "tmp", "build"]).unwrap();
    assert!(set.matches("/proj/config/app.conf.bak"));
    assert!(set.matches("/proj/build"));
    assert!(!set.matches("/proj/config/app.conf"));
}

#[rstest]
fn test_empty_set_matches_nothing() {
    let set = ExcludeSet::default();
    assert!(set.is_empty());
    assert!(!set.matches("/anything/at/all"));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("[abc")]
#[case("a***b")]
fn test_invalid_pattern_rejected(#[case] pattern: &str) {
    match ExcludeSet::new(["ok", pattern]) {
        Err(Error::InvalidPattern { pattern: p, .. }) => assert_eq!(p, pattern),
        other => panic!("Expected InvalidPattern, got: {:?}", other),
    }
}

#[rstest]
fn test_with_extra_keeps_order_and_dedups() {
    let base = ExcludeSet::new(["vendor", "app"]).unwrap();
    let extended = base.with_extra(["app", "logs"]).unwrap();
    let patterns: Vec<_> = extended.patterns().collect();
    assert_eq!(patterns, vec!["vendor", "app", "logs"]);
    assert_eq!(base.len(), 2);
}
