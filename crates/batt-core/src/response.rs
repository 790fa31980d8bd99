//! Response envelope and the empty request marker.

use serde::{Deserialize, Serialize};

/// Acknowledgement-style reply body: `{"message": "..."}`.
///
/// Business logic is free to return any serializable type; this envelope is
/// only a convenience for status replies.
///
/// # Example
///
/// ```
/// use batt_core::MessageResponse;
///
/// let mut res = MessageResponse::noop();
/// assert_eq!(res.message, "");
///
/// res.ok();
/// assert_eq!(serde_json::to_string(&res).unwrap(), r#"{"message":"OK"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a response carrying `message`.
    #[must_use]
    pub fn base(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates a response with an empty message.
    #[must_use]
    pub fn noop() -> Self {
        Self::default()
    }

    /// Sets the message to `"OK"`.
    pub fn ok(&mut self) -> &mut Self {
        self.message = String::from("OK");
        self
    }
}

/// Marker request type for handlers that take no input.
///
/// Binding a `NoParam` never reads the query string, route parameters or
/// body, so malformed input in any of them is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoParam;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_and_ok() {
        let mut res = MessageResponse::base("created");
        assert_eq!(res.message, "created");

        res.ok();
        assert_eq!(res, MessageResponse::base("OK"));
    }

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(MessageResponse::base("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "hi" }));
    }
}
