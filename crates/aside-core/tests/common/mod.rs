#![allow(dead_code)]
use aside_core::{Key, Record};

/// Helper to create a Record from a JSON string slice.
/// Panics if the JSON is invalid (intended for tests).
pub fn record_from_json(json: &str) -> Record {
    Record::from_json(json).expect("Failed to create test record from JSON")
}

/// Helper to create a Key. Panics on blank input.
pub fn key(raw: &str) -> Key {
    Key::new(raw).expect("Failed to create test key")
}

/// Returns a nested user record fixture.
pub fn user_record() -> Record {
    record_from_json(
        r#"{
        "id": 7,
        "name": "x",
        "roles": ["admin", "ops"],
        "settings": {
            "theme": "dark",
            "notifications": {"email": true, "sms": false}
        }
    }"#,
    )
}
