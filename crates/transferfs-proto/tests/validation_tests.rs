// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use transferfs_proto::*;

#[test]
fn test_valid_open_requests() {
    assert!(validate_request(&Request::get("/docs/report.txt")).is_ok());
    assert!(validate_request(&Request::put("/docs/report.txt")).is_ok());
    assert!(validate_request(&Request::open("/docs/report.txt")).is_ok());
}

#[test]
fn test_valid_command_requests() {
    assert!(validate_request(&Request::mkdir("/docs")).is_ok());
    assert!(validate_request(&Request::rename("/docs", "/archive")).is_ok());
    assert!(validate_request(&Request::link("/docs/a", "/docs/b")).is_ok());
    assert!(validate_request(&Request::symlink("/docs/a", "/docs/alias")).is_ok());
    assert!(validate_request(&Request::setstat("/docs/a", FileAttributes::with_size(0))).is_ok());
}

#[test]
fn test_empty_filepath_rejected() {
    let request = Request::new(Method::Stat, "");

    assert!(matches!(
        validate_request(&request),
        Err(ValidationError::EmptyFilepath)
    ));
}

#[test]
fn test_relative_filepath_rejected() {
    let request = Request::mkdir("tmp/new");

    assert!(matches!(
        validate_request(&request),
        Err(ValidationError::RelativePath("filepath"))
    ));
}

#[test]
fn test_relative_target_rejected() {
    let request = Request::symlink("/existing", "links/alias");

    assert!(matches!(
        validate_request(&request),
        Err(ValidationError::RelativePath("target"))
    ));
}

#[test]
fn test_missing_target_rejected() {
    let request = Request::new(Method::Rename, "/docs");

    assert!(matches!(
        validate_request(&request),
        Err(ValidationError::MissingTarget(Method::Rename))
    ));
}

#[test]
fn test_method_names_round_trip() {
    let methods = [
        Method::Get,
        Method::Put,
        Method::Open,
        Method::Setstat,
        Method::Rename,
        Method::Rmdir,
        Method::Remove,
        Method::Mkdir,
        Method::Link,
        Method::Symlink,
        Method::List,
        Method::Stat,
        Method::Lstat,
        Method::Readlink,
    ];
    for method in methods {
        assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
    }

    assert!("Realpath".parse::<Method>().is_err());
}

#[test]
fn test_request_round_trips_through_json() {
    let request = Request::rename("/old", "/new");
    let encoded = serde_json::to_string(&request).unwrap();
    let decoded: Request = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded.method, Method::Rename);
    assert_eq!(decoded.filepath, "/old");
    assert_eq!(decoded.target(), Some("/new"));
}

#[test]
fn test_builders_match_method_constructors() {
    let built = Request::new(Method::Setstat, "/f").with_attributes(FileAttributes::with_size(16));
    let direct = Request::setstat("/f", FileAttributes::with_size(16));
    assert_eq!(built.attributes, direct.attributes);
    assert_eq!(built.attributes.size, Some(16));

    let built = Request::new(Method::Rename, "/old").with_target("/new");
    assert_eq!(built.target(), Request::rename("/old", "/new").target());
}

#[test]
fn test_attributes_default_to_unset() {
    let decoded: Request = serde_json::from_str(
        r#"{"method":"Setstat","filepath":"/docs/a"}"#,
    )
    .unwrap();

    assert_eq!(decoded.attributes, FileAttributes::default());
    assert_eq!(decoded.attributes.size, None);
}

#[test]
fn test_context_cancellation_is_shared() {
    let request = Request::get("/f");
    let context = request.context.clone();

    assert!(!request.context.is_cancelled());
    context.cancel();
    assert!(request.context.is_cancelled());
}
