#![allow(missing_docs)]

use serde_json::json;
use vidup::{Errno, ResultError, UploadResult};

#[test]
fn zero_in_any_loose_form_is_success() {
    for body in [
        r#"{"errno":0,"data":{"url":"/v.mp4"}}"#,
        r#"{"errno":"0","data":{"url":"/v.mp4"}}"#,
        r#"{"errno":0.0,"data":{"url":"/v.mp4"}}"#,
        r#"{"errno":false,"data":{"url":"/v.mp4"}}"#,
    ] {
        let result = UploadResult::parse(body.as_bytes()).expect("valid result");
        assert_eq!(result.errno, Errno::Success, "body {body}");
        assert_eq!(result.data, json!({"url": "/v.mp4"}));
        assert!(result.check().is_ok());
    }
}

#[test]
fn other_codes_are_failures() {
    let cases = [
        (r#"{"errno":1}"#, "1"),
        (r#"{"errno":"1"}"#, "1"),
        (r#"{"errno":"E_QUOTA"}"#, "E_QUOTA"),
        (r#"{"errno":true}"#, "true"),
        (r#"{"data":{}}"#, "undefined"),
    ];

    for (body, code) in cases {
        let result = UploadResult::parse(body.as_bytes()).expect("valid result");
        assert_eq!(result.errno, Errno::Failure(code.to_owned()), "body {body}");
        assert!(!result.errno.is_success());
        assert_eq!(
            result.check(),
            Err(ResultError::NonZeroErrno {
                code: code.to_owned()
            })
        );
    }
}

#[test]
fn missing_data_defaults_to_null() {
    let result = UploadResult::parse(br#"{"errno":0}"#).expect("valid result");

    assert_eq!(result.data, serde_json::Value::Null);
}

#[test]
fn non_json_bodies_do_not_parse() {
    assert!(UploadResult::parse(b"").is_none());
    assert!(UploadResult::parse(b"<html></html>").is_none());
    assert!(UploadResult::parse(b"\"ok\"").is_none());
    assert!(UploadResult::parse(b"42").is_none());
}

#[test]
fn json_arrays_are_not_results() {
    assert!(UploadResult::parse(b"[0, null]").is_none());
    assert!(UploadResult::parse(br#"[0, {"url":"/v/1.mp4"}]"#).is_none());
    assert!(UploadResult::parse(b"[]").is_none());
}

#[test]
fn single_element_array_errno_compares_by_its_text() {
    for errno in ["[0]", r#"["0"]"#, "[[0]]"] {
        let body = format!(r#"{{"errno":{errno},"data":null}}"#);
        let result = UploadResult::parse(body.as_bytes()).expect("valid result");
        assert_eq!(result.errno, Errno::Success, "errno {errno}");
    }

    for errno in ["[]", "[false]", "[0,0]", "[1]"] {
        let body = format!(r#"{{"errno":{errno},"data":null}}"#);
        let result = UploadResult::parse(body.as_bytes()).expect("valid result");
        assert_eq!(result.errno, Errno::Failure(errno.to_owned()), "errno {errno}");
    }
}

#[test]
fn errno_displays_its_code() {
    assert_eq!(Errno::Success.to_string(), "0");
    assert_eq!(Errno::Failure("7".to_owned()).to_string(), "7");
}
