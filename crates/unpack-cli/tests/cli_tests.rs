//! Integration tests for unpack-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use flate2::Compression;
use flate2::write::GzEncoder;
use predicates::prelude::*;
use std::fs;
use std::io::Cursor;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn unpack_cmd() -> Command {
    cargo_bin_cmd!("unpack")
}

fn current_ids() -> (u32, u32) {
    (
        nix::unistd::getuid().as_raw(),
        nix::unistd::getgid().as_raw(),
    )
}

fn tar_header(mode: u32, size: u64) -> tar::Header {
    let (uid, gid) = current_ids();
    let mut header = tar::Header::new_gnu();
    header.set_mode(mode);
    header.set_size(size);
    header.set_uid(u64::from(uid));
    header.set_gid(u64::from(gid));
    header
}

/// Builds the `app-1.0/` fixture used by most tests.
fn sample_tar() -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());

    let mut dir = tar_header(0o755, 0);
    dir.set_entry_type(tar::EntryType::Directory);
    builder
        .append_data(&mut dir, "app-1.0/", std::io::empty())
        .unwrap();

    for (name, body) in [
        ("app-1.0/bin/run.sh", "#!/bin/sh\n"),
        ("app-1.0/README", "readme\n"),
        ("app-1.0/debug.log", "noise\n"),
    ] {
        let mut header = tar_header(0o644, body.len() as u64);
        builder
            .append_data(&mut header, name, body.as_bytes())
            .unwrap();
    }

    let mut link = tar_header(0o777, 0);
    link.set_entry_type(tar::EntryType::Symlink);
    builder
        .append_link(&mut link, "app-1.0/current", "README")
        .unwrap();

    builder.into_inner().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn sample_zip() -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::SimpleFileOptions::default().unix_permissions(0o640);
    zip.start_file("conf/app.properties", options).unwrap();
    zip.write_all(b"port=8080\n").unwrap();
    zip.finish().unwrap().into_inner()
}

fn write_fixture(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[test]
fn test_version_flag() {
    unpack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unpack"));
}

#[test]
fn test_help_flag() {
    unpack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--strip"))
        .stdout(predicate::str::contains("--exclude"));
}

#[test]
fn test_missing_destination_is_usage_error() {
    unpack_cmd().arg("file:///tmp/a.tar").assert().failure();
}

#[test]
fn test_extract_tar_creates_files() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_fixture(temp.path(), "app.tar", &sample_tar());
    let dest = temp.path().join("out");

    unpack_cmd()
        .arg(file_url(&archive))
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extraction complete"))
        .stdout(predicate::str::contains("Files extracted: 3"));

    assert_eq!(
        fs::read_to_string(dest.join("app-1.0/bin/run.sh")).unwrap(),
        "#!/bin/sh\n"
    );
    assert!(dest.join("app-1.0/README").is_file());
    assert!(!dest.join("app-1.0/current").exists());
}

#[test]
fn test_extract_reports_unsupported_entries() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_fixture(temp.path(), "app.tar", &sample_tar());

    unpack_cmd()
        .arg(file_url(&archive))
        .arg(temp.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("were not extracted"));
}

#[test]
fn test_extract_tgz_with_strip_and_exclude() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_fixture(temp.path(), "app.tgz", &gzip(&sample_tar()));
    let dest = temp.path().join("out");

    unpack_cmd()
        .arg(file_url(&archive))
        .arg(&dest)
        .args(["--strip", "1", "--exclude", "*.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped"));

    assert!(dest.join("bin/run.sh").is_file());
    assert!(dest.join("README").is_file());
    assert!(!dest.join("debug.log").exists());
    assert!(!dest.join("app-1.0").exists());
}

#[test]
fn test_include_overrides_exclude() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_fixture(temp.path(), "app.tar", &sample_tar());
    let dest = temp.path().join("out");

    unpack_cmd()
        .arg(file_url(&archive))
        .arg(&dest)
        .args(["-x", "app-1.0/*", "-i", "*/*.log"])
        .assert()
        .success();

    assert!(dest.join("app-1.0/debug.log").is_file());
    assert!(!dest.join("app-1.0/README").exists());
}

#[test]
fn test_mode_override() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_fixture(temp.path(), "app.tar", &sample_tar());
    let dest = temp.path().join("out");

    unpack_cmd()
        .arg(file_url(&archive))
        .arg(&dest)
        .args(["--mode", "600", "--dir-mode", "0o750"])
        .assert()
        .success();

    let file_mode = fs::metadata(dest.join("app-1.0/README"))
        .unwrap()
        .permissions()
        .mode();
    let dir_mode = fs::metadata(dest.join("app-1.0"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(file_mode & 0o7777, 0o600);
    assert_eq!(dir_mode & 0o7777, 0o750);
}

#[test]
fn test_owner_override_with_current_uid() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_fixture(temp.path(), "app.tar", &sample_tar());
    let (uid, gid) = current_ids();

    unpack_cmd()
        .arg(file_url(&archive))
        .arg(temp.path().join("out"))
        .args(["--owner", &uid.to_string(), "--group", &gid.to_string()])
        .assert()
        .success();
}

#[test]
fn test_extract_zip_from_bundle() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let bundle = temp.path().join("cookbooks/web");
    fs::create_dir_all(bundle.join("files/default")).unwrap();
    fs::write(bundle.join("files/default/conf.war"), sample_zip()).unwrap();
    let dest = temp.path().join("out");

    unpack_cmd()
        .arg("conf.war")
        .arg(&dest)
        .arg("--bundle")
        .arg(format!("web={}", bundle.display()))
        .args(["--from-bundle", "web", "--no-same-owner"])
        .assert()
        .success();

    let extracted = dest.join("conf/app.properties");
    assert_eq!(fs::read_to_string(&extracted).unwrap(), "port=8080\n");
    assert_eq!(
        fs::metadata(&extracted).unwrap().permissions().mode() & 0o777,
        0o640
    );
}

#[test]
fn test_bundled_source_without_bundle_fails() {
    let temp = TempDir::new().expect("failed to create temp dir");

    unpack_cmd()
        .arg("conf.zip")
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no bundle given"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_unsupported_format_fails_with_hint() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_fixture(temp.path(), "app.rar", b"Rar!");

    unpack_cmd()
        .arg(file_url(&archive))
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported"))
        .stderr(predicate::str::contains("HINT"));

    assert!(!temp.path().join("out").exists());
}

#[test]
fn test_missing_local_archive_fails() {
    let temp = TempDir::new().expect("failed to create temp dir");

    unpack_cmd()
        .arg(file_url(&temp.path().join("nope.tar")))
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read archive"));
}

#[test]
fn test_invalid_mode_is_rejected() {
    unpack_cmd()
        .args(["file:///tmp/a.tar", "/tmp/out", "--mode", "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid octal mode"));
}

#[test]
fn test_extract_json_output_format() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_fixture(temp.path(), "app.tar", &sample_tar());

    let output = unpack_cmd()
        .arg(file_url(&archive))
        .arg(temp.path().join("out"))
        .args(["--json", "-x", "*/*.log"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let mut documents = serde_json::Deserializer::from_slice(&output)
        .into_iter::<serde_json::Value>();
    let json = documents.next().unwrap().expect("invalid JSON output");
    assert_eq!(json["status"], "success");
    assert_eq!(json["operation"], "extract");
    assert_eq!(json["data"]["files_extracted"], 2);
    assert_eq!(json["data"]["entries_skipped"], 1);
    assert_eq!(json["data"]["unsupported_entries"], 1);

    let warning = documents.next().unwrap().expect("invalid JSON output");
    assert_eq!(warning["status"], "warning");
}

#[test]
fn test_json_error_output() {
    let temp = TempDir::new().expect("failed to create temp dir");

    let output = unpack_cmd()
        .arg("file:///nowhere/app.7z")
        .arg(temp.path().join("out"))
        .arg("--json")
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).expect("invalid JSON output");
    assert_eq!(json["status"], "error");
    assert!(json["error"].as_str().unwrap().contains("app.7z"));
}

#[test]
fn test_quiet_mode_prints_nothing_on_success() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let archive = write_fixture(temp.path(), "app.tar", &sample_tar());

    unpack_cmd()
        .arg(file_url(&archive))
        .arg(temp.path().join("out"))
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}
