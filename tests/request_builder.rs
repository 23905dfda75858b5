#![allow(missing_docs)]

mod support;

use std::time::Duration;

use http::{HeaderValue, header};
use support::video;
use vidup::{
    build_request, request::append_query_params, request::field_names, EncodeError,
    FileCandidate, MultipartBody, UploadConfig,
};

fn config_with_server(url: &str) -> UploadConfig {
    UploadConfig {
        server_url: Some(url.to_owned()),
        ..UploadConfig::default()
    }
}

#[test]
fn no_server_url_builds_nothing() {
    assert!(build_request(&[video("a.mp4", 1)], &UploadConfig::default()).is_none());
}

#[test]
fn multiple_files_get_one_based_indices() {
    let files = vec![video("a.mp4", 1), video("b.mp4", 1)];
    assert_eq!(field_names(&files, None), ["a.mp41", "b.mp42"]);
    assert_eq!(field_names(&files, Some("video")), ["video1", "video2"]);
}

#[test]
fn single_file_gets_random_suffix() {
    let files = vec![video("clip.mp4", 1)];
    let first = field_names(&files, None).remove(0);
    let second = field_names(&files, None).remove(0);

    assert!(first.starts_with("clip.mp4"));
    assert_eq!(first.len(), "clip.mp4".len() + 10);
    assert_ne!(first, second);

    let templated = field_names(&files, Some("upload")).remove(0);
    assert!(templated.starts_with("upload"));
}

#[test]
fn params_go_to_payload_after_files() {
    let config = UploadConfig {
        extra_params: vec![("token".to_owned(), "abc".to_owned())],
        ..config_with_server("http://x/y")
    };
    let request = build_request(&[video("a.mp4", 1), video("b.mp4", 1)], &config)
        .expect("server url is configured");

    assert_eq!(request.url, "http://x/y");
    let names: Vec<&str> = request.payload.field_names().collect();
    assert_eq!(names, ["a.mp41", "b.mp42", "token"]);
    assert_eq!(request.payload.parts()[2].text(), Some("abc"));
    assert_eq!(
        request.payload.parts()[0].file().map(|file| file.name.as_str()),
        Some("a.mp4")
    );
}

#[test]
fn params_in_url_choose_separator_and_keep_fragment() {
    let config = UploadConfig {
        extra_params: vec![
            ("a".to_owned(), "1".to_owned()),
            ("b".to_owned(), "2".to_owned()),
        ],
        params_in_url: true,
        ..config_with_server("http://x/y?v=3#frag")
    };
    let request = build_request(&[video("a.mp4", 1)], &config).expect("request");

    assert_eq!(request.url, "http://x/y?v=3&a=1&b=2#frag");
    assert_eq!(request.payload.parts().len(), 3);
}

#[test]
fn trailing_question_mark_is_not_duplicated() {
    assert_eq!(append_query_params("http://x/y?", [("a", "1")]), "http://x/y?a=1");
    assert_eq!(append_query_params("http://x/y?q=1&", [("a", "1")]), "http://x/y?q=1&a=1");
}

#[test]
fn fragment_is_reattached_after_params() {
    assert_eq!(append_query_params("http://x/y#frag", [("a", "1")]), "http://x/y?a=1#frag");
    assert_eq!(append_query_params("http://x/y#", [("a", "1")]), "http://x/y?a=1");
    assert_eq!(append_query_params("http://x/y", std::iter::empty()), "http://x/y");
}

#[test]
fn params_are_appended_verbatim() {
    assert_eq!(
        append_query_params("http://x/y", [("q", "a b&c")]),
        "http://x/y?q=a b&c"
    );
}

#[test]
fn transport_settings_are_copied_from_config() {
    let mut config = UploadConfig {
        timeout: Duration::from_secs(3),
        with_credentials: true,
        ..config_with_server("http://x/y")
    };
    config
        .headers
        .insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));

    let request = build_request(&[video("a.mp4", 1)], &config).expect("request");
    assert_eq!(request.timeout, Duration::from_secs(3));
    assert!(request.with_credentials);
    assert_eq!(
        request.headers.get(header::AUTHORIZATION),
        Some(&HeaderValue::from_static("Bearer t"))
    );
}

#[tokio::test]
async fn encodes_multipart_form_data() {
    let mut body = MultipartBody::with_boundary("BOUND").expect("boundary is valid");
    body.append_file("clip1", FileCandidate::from_bytes("clip.mp4", "mp4", "DATA"));
    body.append_text("note", "hi");

    assert_eq!(body.content_type(), "multipart/form-data; boundary=BOUND");
    let encoded = body.encode().await.expect("encoding should succeed");
    let expected = concat!(
        "--BOUND\r\n",
        "Content-Disposition: form-data; name=\"clip1\"; filename=\"clip.mp4\"\r\n",
        "Content-Type: video/mp4\r\n",
        "\r\n",
        "DATA\r\n",
        "--BOUND\r\n",
        "Content-Disposition: form-data; name=\"note\"\r\n",
        "\r\n",
        "hi\r\n",
        "--BOUND--\r\n"
    );
    assert_eq!(encoded.as_ref(), expected.as_bytes());
}

#[tokio::test]
async fn quotes_in_names_are_escaped() {
    let mut body = MultipartBody::with_boundary("BOUND").expect("boundary is valid");
    body.append_file("a\"b", FileCandidate::from_bytes("x\"y.mp4", "video/mp4", "1"));

    let encoded = body.encode().await.expect("encoding should succeed");
    let text = String::from_utf8(encoded.to_vec()).expect("utf-8");
    assert!(text.contains("name=\"a%22b\"; filename=\"x%22y.mp4\""));
}

#[test]
fn rejects_invalid_boundaries() {
    let too_long = "x".repeat(71);
    for boundary in ["", "trailing ", "bad\"quote", too_long.as_str()] {
        assert!(
            matches!(
                MultipartBody::with_boundary(boundary),
                Err(EncodeError::InvalidBoundary { .. })
            ),
            "boundary {boundary:?} should be rejected"
        );
    }
}

#[test]
fn generated_boundaries_are_valid_and_unique() {
    let first = MultipartBody::new();
    let second = MultipartBody::new();
    assert!(vidup::request::validate_boundary(first.boundary()).is_ok());
    assert_ne!(first.boundary(), second.boundary());
}
