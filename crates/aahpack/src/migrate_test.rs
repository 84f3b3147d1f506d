// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::PROJECT_FILENAME;

const GRAMMAR: &str = r#"
file:
  go:
    upgrade_replacer:
      - "aah.AppConfig()"
      - "aah.App().Config()"
      - "aah.AppLog()"
      - "aah.App().Log()"
  view:
    upgrade_replacer:
      - "{{ anitcsrftoken . }}"
      - "{{ anticsrftoken . }}"
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[rstest]
#[case(&["a", "1", "b", "2"], "abcab", "12c12")]
#[case(&["ab", "X", "a", "Y"], "aab", "YX")]
// first pair in list order wins at a position
#[case(&["a", "1", "ab", "2"], "ab", "1b")]
// replacements are not rescanned
#[case(&["a", "b", "b", "c"], "ab", "bc")]
#[case(&["é", "e"], "café au lait", "cafe au lait")]
fn test_replacer(#[case] list: &[&str], #[case] input: &str, #[case] expected: &str) {
    let replacer = Replacer::new(list.iter().copied()).unwrap();
    assert_eq!(replacer.replace(input), expected);
}

#[rstest]
fn test_replacer_borrows_when_unchanged() {
    let replacer = Replacer::new(["missing", "x"]).unwrap();
    assert!(matches!(replacer.replace("nothing here"), Cow::Borrowed(_)));
}

#[rstest]
#[case(&["a", "1", "b"])]
#[case(&["", "x"])]
fn test_replacer_invalid(#[case] list: &[&str]) {
    assert!(matches!(
        Replacer::new(list.iter().copied()),
        Err(Error::Grammar(_))
    ));
}

#[rstest]
fn test_grammar_replacers() {
    let grammar = Grammar::from_yaml(GRAMMAR).unwrap();
    assert_eq!(grammar.go_replacer().unwrap().unwrap().len(), 2);
    assert_eq!(grammar.view_replacer().unwrap().unwrap().len(), 1);

    let empty = Grammar::from_yaml("file: {}\n").unwrap();
    assert!(empty.go_replacer().unwrap().is_none());
}

#[rstest]
fn test_grammar_odd_list_names_key() {
    let grammar = Grammar::from_yaml("file:\n  go:\n    upgrade_replacer: [a]\n").unwrap();
    match grammar.go_replacer() {
        Err(Error::Grammar(reason)) => assert!(reason.contains("file.go.upgrade_replacer")),
        other => panic!("Expected Grammar error, got: {:?}", other),
    }
}

#[rstest]
fn test_grammar_missing_file() {
    let tmp = TempDir::new().unwrap();
    assert!(matches!(
        Grammar::load(tmp.path().join(GRAMMAR_FILENAME)),
        Err(Error::Grammar(_))
    ));
}

struct App {
    _tmp: TempDir,
    project: Project,
}

#[fixture]
fn app() -> App {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path();
    write(base, PROJECT_FILENAME, "name: blog\n");
    write(
        base,
        "app/controllers/app.go",
        "package controllers\n\nvar cfg = aah.AppConfig()\n",
    );
    write(base, "app/models/user.go", "package models\n");
    write(base, "app/controllers/app_test.go", "var c = aah.AppConfig()\n");
    write(base, "app/notes.txt", "aah.AppConfig()\n");
    write(base, "views/pages/index.html", "{{ anitcsrftoken . }}\n");
    write(base, "views/pages/index.tmpl", "{{ anitcsrftoken . }}\n");
    let project = Project::load(base).unwrap();
    App { _tmp: tmp, project }
}

#[rstest]
fn test_migrate_go_sources(app: App) {
    let grammar = Grammar::from_yaml(GRAMMAR).unwrap();
    let count = migrate_go_sources(&app.project, &grammar).unwrap();
    assert_eq!(count, 1);

    let base = &app.project.base_dir;
    let migrated = std::fs::read_to_string(base.join("app/controllers/app.go")).unwrap();
    assert!(migrated.contains("aah.App().Config()"));
    // test files fall under the default ast excludes
    let test_src = std::fs::read_to_string(base.join("app/controllers/app_test.go")).unwrap();
    assert!(test_src.contains("aah.AppConfig()"));
    let notes = std::fs::read_to_string(base.join("app/notes.txt")).unwrap();
    assert!(notes.contains("aah.AppConfig()"));

    // second pass has nothing left to do
    assert_eq!(migrate_go_sources(&app.project, &grammar).unwrap(), 0);
}

#[rstest]
fn test_migrate_view_files(app: App) {
    let grammar = Grammar::from_yaml(GRAMMAR).unwrap();
    assert_eq!(migrate_view_files(&app.project, &grammar).unwrap(), 1);

    let base = &app.project.base_dir;
    let html = std::fs::read_to_string(base.join("views/pages/index.html")).unwrap();
    assert_eq!(html, "{{ anticsrftoken . }}\n");
    let tmpl = std::fs::read_to_string(base.join("views/pages/index.tmpl")).unwrap();
    assert_eq!(tmpl, "{{ anitcsrftoken . }}\n");
}

#[rstest]
fn test_migrate_without_views_dir() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), PROJECT_FILENAME, "name: api\n");
    let project = Project::load(tmp.path()).unwrap();
    let grammar = Grammar::from_yaml(GRAMMAR).unwrap();
    assert_eq!(migrate_view_files(&project, &grammar).unwrap(), 0);
    assert_eq!(migrate_go_sources(&project, &grammar).unwrap(), 0);
}
