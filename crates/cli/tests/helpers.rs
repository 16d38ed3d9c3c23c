use std::fs;

use exediff::{report_file_name, sha256_file};
use tempfile::tempdir;

#[test]
fn report_file_name_has_no_path_unsafe_characters() {
    let name = report_file_name();
    assert!(name.starts_with("executable_diffs_report_"));
    assert!(name.ends_with(".txt"));
    assert!(!name.contains('/'));
    assert!(!name.contains(':'));
    assert!(!name.contains(' '));
}

#[test]
fn sha256_file_hashes_known_content() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("input.bin");
    fs::write(&path, b"hello world").expect("write input");

    let digest = sha256_file(&path).expect("hash");
    assert_eq!(digest, "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");
}

#[test]
fn sha256_file_fails_for_missing_input() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("nope.bin");
    assert!(sha256_file(&missing).is_err());
}
