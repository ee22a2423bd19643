use std::fs;

use bytes::Bytes;
use scrape_engine::{ensure_output_dir, save_artifact, AtomicFileWriter, ExportArtifact};
use tempfile::TempDir;

fn artifact(filename: &str, body: &'static str) -> ExportArtifact {
    ExportArtifact {
        bytes: Bytes::from_static(body.as_bytes()),
        filename: filename.to_string(),
        server_filename: None,
        content_type: Some("text/csv".to_string()),
    }
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("exports");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn repeated_export_replaces_previous_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer
        .write_bytes("example.com_scraped_urls.csv", b"URL\nhttps://example.com/\n")
        .unwrap();
    assert_eq!(first.file_name().unwrap(), "example.com_scraped_urls.csv");

    let second = writer
        .write_bytes("example.com_scraped_urls.csv", b"URL\nhttps://example.com/about\n")
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(
        fs::read_to_string(&second).unwrap(),
        "URL\nhttps://example.com/about\n"
    );
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn output_path_that_is_a_file_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let result = save_artifact(&file_path, &artifact("data.csv", "URL\n"));
    assert!(result.is_err());
    assert!(!file_path.with_file_name("data.csv").exists());
}

#[test]
fn artifact_name_is_sanitized_before_writing() {
    let temp = TempDir::new().unwrap();
    let path = save_artifact(
        temp.path(),
        &artifact("../evil:name_scraped_urls.csv", "URL\n"),
    )
    .unwrap();

    assert_eq!(path.parent().unwrap(), temp.path());
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(!name.contains('/'));
    assert!(!name.contains(':'));
    assert!(name.ends_with("_scraped_urls.csv"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "URL\n");
}
