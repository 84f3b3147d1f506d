// Copyright (c) Contributors to the aahpack project.
// SPDX-License-Identifier: MIT

use std::io::Read;

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn entry_names(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[rstest]
fn test_archive_directory_relative_paths() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("stage");
    write(&src, "bin/myapp", "binary");
    write(&src, "config/app.conf", "conf");
    write(&src, "aah.sh", "#!/bin/sh");

    let dest = tmp.path().join("out/nested/artifact.zip");
    archive(&src, &dest).unwrap();

    assert_eq!(
        entry_names(&dest),
        vec!["aah.sh", "bin/myapp", "config/app.conf"]
    );

    let mut zip = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
    let mut content = String::new();
    zip.by_name("config/app.conf")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "conf");
}

#[rstest]
fn test_archive_single_file_at_root() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "build/bin/myapp", "binary");

    let dest = tmp.path().join("myapp-1-linux-amd64.zip");
    archive(&tmp.path().join("build/bin/myapp"), &dest).unwrap();

    assert_eq!(entry_names(&dest), vec!["myapp"]);
}

#[rstest]
fn test_archive_replaces_previous_artifact() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("artifact.zip");

    let first = tmp.path().join("first");
    write(&first, "old.txt", "old");
    archive(&first, &dest).unwrap();

    let second = tmp.path().join("second");
    write(&second, "new.txt", "new");
    archive(&second, &dest).unwrap();

    assert_eq!(entry_names(&dest), vec!["new.txt"]);
}

#[cfg(unix)]
#[rstest]
fn test_archive_preserves_permission_bits() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("stage");
    write(&src, "bin/myapp", "binary");
    write(&src, "config/app.conf", "conf");
    std::fs::set_permissions(
        src.join("bin/myapp"),
        std::fs::Permissions::from_mode(0o755),
    )
    .unwrap();
    std::fs::set_permissions(
        src.join("config/app.conf"),
        std::fs::Permissions::from_mode(0o640),
    )
    .unwrap();

    let dest = tmp.path().join("artifact.zip");
    archive(&src, &dest).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
    let mode = zip.by_name("bin/myapp").unwrap().unix_mode().unwrap();
    assert_eq!(mode & 0o777, 0o755);
    let mode = zip.by_name("config/app.conf").unwrap().unix_mode().unwrap();
    assert_eq!(mode & 0o777, 0o640);
}

#[rstest]
fn test_archive_keeps_empty_directories() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("stage");
    write(&src, "bin/myapp", "binary");
    write(&src, "config/app.conf", "conf");
    std::fs::create_dir_all(src.join("static/uploads")).unwrap();

    let dest = tmp.path().join("artifact.zip");
    archive(&src, &dest).unwrap();

    assert_eq!(
        entry_names(&dest),
        vec!["bin/myapp", "config/app.conf", "static/", "static/uploads/"]
    );
    let mut zip = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
    assert!(zip.by_name("static/uploads/").unwrap().is_dir());
}

#[cfg(unix)]
#[rstest]
fn test_archive_preserves_directory_permission_bits() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("stage");
    write(&src, "aah.sh", "#!/bin/sh");
    let uploads = src.join("uploads");
    std::fs::create_dir_all(&uploads).unwrap();
    std::fs::set_permissions(&uploads, std::fs::Permissions::from_mode(0o750)).unwrap();

    let dest = tmp.path().join("artifact.zip");
    archive(&src, &dest).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
    let mode = zip.by_name("uploads/").unwrap().unix_mode().unwrap();
    assert_eq!(mode & 0o777, 0o750);
}

#[cfg(unix)]
#[rstest]
fn test_unwritable_destination_is_archive_error() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("stage");
    write(&src, "a.txt", "a");
    // a regular file where the parent directory should be
    write(tmp.path(), "blocker", "x");

    let dest = tmp.path().join("blocker/artifact.zip");
    match archive(&src, &dest) {
        Err(Error::Archive { dest: d, .. }) => assert_eq!(d, dest),
        other => panic!("Expected Archive error, got: {:?}", other),
    }
}
