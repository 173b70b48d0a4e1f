//! Unwrapping of Petfinder's top-level response objects.
//!
//! Every payload this crate reads is a JSON object whose interesting part sits
//! under one well-known key, `{"access_token": ...}` or `{"animals": [...]}`.

use anyhow::Result;
use serde_json::Value;

use crate::error::Error;

/// The response kinds this crate knows how to unwrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    AccessToken,
    Animals,
}

impl ResponseKind {
    /// Top-level key holding the payload for this kind.
    pub fn key(self) -> &'static str {
        match self {
            ResponseKind::AccessToken => "access_token",
            ResponseKind::Animals => "animals",
        }
    }
}

/// Decodes `body` as ASCII JSON and returns the value stored under
/// `kind`'s key.
pub fn load(body: &[u8], kind: ResponseKind) -> Result<Value> {
    if !body.is_ascii() {
        let at = body.iter().position(|b| !b.is_ascii()).unwrap_or_default();
        return Err(Error::Decode(format!("non-ASCII byte at offset {}", at)).into());
    }

    let mut json: Value = serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))?;

    json.get_mut(kind.key())
        .map(Value::take)
        .ok_or_else(|| Error::MissingField { field: kind.key() }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kind_of(err: &anyhow::Error) -> &Error {
        err.downcast_ref::<Error>().expect("crate error")
    }

    #[test]
    fn animals_envelope_yields_the_array() {
        let body = br#"{"animals":[{"name":"Rex"},{"name":"Ada"}],"pagination":{"count_per_page":20}}"#;
        let value = load(body, ResponseKind::Animals).unwrap();
        assert_eq!(value, json!([{"name": "Rex"}, {"name": "Ada"}]));
    }

    #[test]
    fn access_token_envelope_yields_the_string() {
        let body = br#"{"token_type":"Bearer","expires_in":3600,"access_token":"x"}"#;
        assert_eq!(load(body, ResponseKind::AccessToken).unwrap(), json!("x"));
    }

    #[test]
    fn wrong_key_is_missing_field() {
        let err = load(br#"{"access_token":"x"}"#, ResponseKind::Animals).unwrap_err();
        assert!(matches!(kind_of(&err), Error::MissingField { field: "animals" }));
    }

    #[test]
    fn non_object_is_missing_field() {
        let err = load(b"[1,2,3]", ResponseKind::AccessToken).unwrap_err();
        assert!(matches!(
            kind_of(&err),
            Error::MissingField { field: "access_token" }
        ));
    }

    #[test]
    fn invalid_json_is_decode_error() {
        let err = load(b"<html>502</html>", ResponseKind::Animals).unwrap_err();
        assert!(matches!(kind_of(&err), Error::Decode(_)));
    }

    #[test]
    fn non_ascii_is_decode_error() {
        let err = load("{\"animals\":[\"Bélo\"]}".as_bytes(), ResponseKind::Animals).unwrap_err();
        match kind_of(&err) {
            Error::Decode(msg) => assert!(msg.contains("offset 14")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn escaped_unicode_is_fine() {
        let value = load(br#"{"animals":["B\u00e9lo"]}"#, ResponseKind::Animals).unwrap();
        assert_eq!(value, json!(["Bélo"]));
    }
}
