#![allow(missing_docs)]

mod support;

use bytes::Bytes;
use support::temp_path;
use vidup::{DiskSource, FileCandidate, FileSource, MemorySource};

#[tokio::test]
async fn memory_source_returns_its_body() {
    let source = MemorySource::new(Bytes::from_static(b"frames"));

    assert_eq!(source.len(), 6);
    assert!(!source.is_empty());
    assert_eq!(source.read().await.expect("read"), Bytes::from_static(b"frames"));
    assert!(MemorySource::default().is_empty());
}

#[tokio::test]
async fn disk_source_reads_file_and_reports_missing_path() {
    let path = temp_path("clip.mp4");
    tokio::fs::write(&path, b"on disk").await.expect("write temp file");

    let source = DiskSource::new(&path);
    assert_eq!(source.path(), path.as_path());
    assert_eq!(source.read().await.expect("read"), Bytes::from_static(b"on disk"));

    tokio::fs::remove_file(&path).await.expect("remove temp file");
    let err = source.read().await.expect_err("file was removed");
    assert!(err.to_string().contains("clip.mp4"));
}

#[tokio::test]
async fn from_path_takes_name_size_and_extension_from_disk() {
    let path = temp_path("holiday.MP4");
    tokio::fs::write(&path, vec![0_u8; 42]).await.expect("write temp file");

    let file = FileCandidate::from_path(&path).await.expect("candidate");

    assert!(file.name.ends_with("holiday.MP4"));
    assert_eq!(file.size, 42);
    assert_eq!(file.mime_or_extension, "MP4");
    assert_eq!(file.content_type().essence_str(), "video/mp4");
    assert_eq!(file.read().await.expect("read").len(), 42);

    tokio::fs::remove_file(&path).await.expect("remove temp file");
}

#[tokio::test]
async fn from_path_fails_for_missing_file() {
    let err = FileCandidate::from_path(temp_path("nowhere.mp4"))
        .await
        .expect_err("missing file");

    assert!(err.to_string().contains("nowhere.mp4"));
}

#[test]
fn content_type_prefers_full_mime_then_extension() {
    let cases = [
        ("a.mp4", "video/webm", "video/webm"),
        ("a.mp4", "mp4", "video/mp4"),
        ("a.m4v", ".m4v", "video/mp4"),
        ("a.mov", "mov", "video/quicktime"),
        ("a.ogv", "", "video/ogg"),
        ("a.mkv", "", "application/octet-stream"),
        ("noext", "", "application/octet-stream"),
    ];

    for (name, declared, expected) in cases {
        let file = FileCandidate::from_bytes(name, declared, &b"x"[..]);
        assert_eq!(file.content_type().essence_str(), expected, "{name} / {declared}");
    }
}

#[tokio::test]
async fn data_url_uses_content_type_and_standard_base64() {
    let file = FileCandidate::from_bytes("clip.webm", "webm", &b"\xff\xfe\xfd"[..]);

    assert_eq!(
        file.read_data_url().await.expect("read"),
        "data:video/webm;base64,//79"
    );
}
