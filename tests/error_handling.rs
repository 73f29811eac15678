//! Validation errors on the subscribe/unsubscribe surface.

use proptest::prelude::*;
use rpc_notify::{Argument, ErrorKind, NotificationHandler, NotificationServer, NotifyError};
use serde_json::json;

fn noop() -> NotificationHandler {
    NotificationHandler::from_fn(|_| {})
}

const NOT_A_MAPPING: &str = "Subsciptions is not a mapping of names to handlers";
const EMPTY_NAME: &str = "Given notification name is empty";
const RESERVED: &str = "Notifications with prefix \"rpc.\" is for internal usage only";

// --- Subject type ---

#[test]
fn test_off_rejects_non_mapping_subjects() {
    let server = NotificationServer::default();

    let subjects = [
        Argument::from(42),
        Argument::from(true),
        Argument::Null,
        Argument::Undefined,
        Argument::from(json!([1, 2])),
        Argument::from(noop()),
    ];

    for subject in subjects {
        let err = server.off_notification(subject, noop()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.to_string(), NOT_A_MAPPING);
    }
}

#[test]
fn test_on_rejects_non_mapping_subjects() {
    let server = NotificationServer::default();
    let err = server.on_notification(3.5, noop()).unwrap_err();
    assert!(matches!(err, NotifyError::NotAMapping { .. }));
}

// --- Names ---

#[test]
fn test_off_empty_name() {
    let server = NotificationServer::default();

    let err = server.off_notification("", noop()).unwrap_err();
    assert_eq!(err.to_string(), EMPTY_NAME);

    let err = server
        .off_notifications(Argument::mapping([("", noop())]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyName);
    assert_eq!(err.to_string(), EMPTY_NAME);
}

#[test]
fn test_off_reserved_prefix() {
    let server = NotificationServer::default();

    for name in ["rpc.foo", "rpc."] {
        let err = server.off_notification(name, noop()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReservedPrefix);
        assert_eq!(err.to_string(), RESERVED);

        let err = server
            .off_notifications(Argument::mapping([(name, noop())]))
            .unwrap_err();
        assert_eq!(err.to_string(), RESERVED);
    }
}

#[test]
fn test_on_reserved_prefix() {
    let server = NotificationServer::default();
    let err = server.on_notification("rpc.on", noop()).unwrap_err();
    assert_eq!(err.to_string(), RESERVED);
    assert!(server.of("/").notification_names().is_empty());
}

// --- Handlers ---

#[test]
fn test_off_non_callable_handler() {
    let server = NotificationServer::default();

    let err = server.off_notification("x", 42).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(
        err.to_string(),
        "Expected function as notification handler, got number"
    );

    let err = server.off_notification("x", Argument::Null).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected function as notification handler, got null"
    );

    let err = server
        .off_notification("x", Argument::from(json!({"not": "callable"})))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected function as notification handler, got object"
    );
}

#[test]
fn test_bulk_entry_point_with_plain_name() {
    let server = NotificationServer::default();
    let err = server.on_notifications("lonely").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected function as notification handler, got undefined"
    );
}

// --- All-or-nothing ---

#[test]
fn test_bulk_on_with_one_invalid_pair_changes_nothing() {
    let server = NotificationServer::default();

    let err = server
        .on_notifications(Argument::Mapping(vec![
            ("a".to_string(), noop().into()),
            ("b".to_string(), noop().into()),
            ("c".to_string(), Argument::from(1)),
        ]))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert!(server.of("/").notification_names().is_empty());
}

#[test]
fn test_bulk_off_with_one_invalid_pair_removes_nothing() {
    let server = NotificationServer::default();
    let h = noop();
    server.on_notification("a", &h).unwrap();

    let err = server
        .off_notifications(Argument::Mapping(vec![
            ("a".to_string(), (&h).into()),
            ("rpc.b".to_string(), (&h).into()),
        ]))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReservedPrefix);
    assert_eq!(server.of("/").handler_count("a"), 1);
}

#[test]
fn test_json_mapping_reports_first_bad_key_in_document_order() {
    let server = NotificationServer::default();
    let subject: serde_json::Value = serde_json::from_str(r#"{"zeta": 1, "": 2}"#).unwrap();

    let err = server.on_notifications(subject).unwrap_err();

    // "zeta" comes first in the document, so its handler is checked first.
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(
        err.to_string(),
        "Expected function as notification handler, got number"
    );
}

// --- No-ops ---

#[test]
fn test_off_never_registered_is_noop() {
    let server = NotificationServer::default();
    let kept = noop();
    server.on_notification("kept", &kept).unwrap();

    server.off_notification("never", noop()).unwrap();
    server.off_notification("kept", noop()).unwrap();

    assert_eq!(server.of("/").notification_names(), vec!["kept".to_string()]);
    assert_eq!(server.of("/").handler_count("kept"), 1);
}

proptest! {
    #[test]
    fn prop_reserved_names_always_rejected(suffix in ".*") {
        let server = NotificationServer::default();
        let name = format!("rpc.{suffix}");
        let err = server.on_notification(name.as_str(), noop()).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::ReservedPrefix);
    }

    #[test]
    fn prop_numeric_subjects_rejected(n in any::<i64>()) {
        let server = NotificationServer::default();
        let err = server.off_notification(n, noop()).unwrap_err();
        prop_assert_eq!(err.to_string(), NOT_A_MAPPING);
    }
}
