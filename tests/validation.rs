#![allow(missing_docs)]

mod support;

use support::video;
use vidup::{validate, FileCandidate, MemorySource, ValidationError, ValidationRules};

#[test]
fn accepts_mp4_case_insensitively_and_keeps_order() {
    let files = vec![video("b.MP4", 3), video("a.mp4", 3), video("c.Mp4", 3)];
    let result = validate(&files, &ValidationRules::new(5));

    let names: Vec<&str> = result.accepted.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, ["b.MP4", "a.mp4", "c.Mp4"]);
    assert!(result.rejections.is_empty());
    assert!(!result.is_rejected());
}

#[test]
fn unsupported_format_is_rejected_per_file() {
    let files = vec![video("clip.mov", 3), video("clip.mp4", 3), video("mp4", 3)];
    let result = validate(&files, &ValidationRules::new(5));

    assert_eq!(result.accepted.len(), 1);
    assert_eq!(result.accepted[0].name, "clip.mp4");
    assert_eq!(result.rejections.len(), 2);
    assert!(result
        .rejections
        .iter()
        .all(|rejection| rejection.reason == ValidationError::UnsupportedFormat));
    assert!(!result.is_rejected());
}

#[test]
fn nameless_and_empty_files_are_dropped_silently() {
    let files = vec![
        FileCandidate::new("", 10, "video/mp4", MemorySource::new("0123456789")),
        FileCandidate::from_bytes("empty.mp4", "video/mp4", ""),
        video("ok.mp4", 1),
    ];
    let result = validate(&files, &ValidationRules::new(5));

    assert_eq!(result.dropped, 2);
    assert_eq!(result.accepted.len(), 1);
    assert!(result.rejections.is_empty());
}

#[test]
fn every_input_file_is_accounted_for_exactly_once() {
    let files = vec![
        video("a.mp4", 1),
        video("b.avi", 1),
        FileCandidate::from_bytes("c.mp4", "video/mp4", ""),
        video("d.mp4", 100),
        video("e.webm", 1),
    ];
    let rules = ValidationRules {
        max_size: Some(50),
        ..ValidationRules::new(1)
    };
    let result = validate(&files, &rules);

    assert_eq!(result.total(), files.len());
    assert_eq!(result.accepted.len(), 1);
    assert_eq!(result.rejections.len(), 3);
    assert_eq!(result.dropped, 1);
}

#[test]
fn too_many_files_rejects_the_whole_batch() {
    let files: Vec<_> = (0..6).map(|index| video(&format!("{index}.mp4"), 1)).collect();
    let result = validate(&files, &ValidationRules::new(5));

    assert_eq!(
        result.batch_rejection,
        Some(ValidationError::TooManyFiles {
            count: 6,
            max_count: 5
        })
    );
    assert_eq!(result.accepted.len(), 6, "batch is never truncated");
}

#[test]
fn oversized_files_are_rejected_with_limit() {
    let rules = ValidationRules {
        max_size: Some(4),
        ..ValidationRules::new(5)
    };
    let result = validate(&[video("big.mp4", 5), video("small.mp4", 4)], &rules);

    assert_eq!(result.accepted.len(), 1);
    assert!(matches!(
        result.rejections[0].reason,
        ValidationError::FileTooLarge { max_size: 4 }
    ));
}

#[test]
fn custom_extension_list_is_honoured() {
    let rules = ValidationRules {
        extensions: vec!["webm".to_owned(), "mp4".to_owned()],
        ..ValidationRules::new(5)
    };
    assert!(rules.is_extension_allowed("a.WEBM"));
    assert!(rules.is_extension_allowed("a.mp4"));
    assert!(!rules.is_extension_allowed("a.mp4.mov"));
    assert!(!rules.is_extension_allowed("mp4"));
}
