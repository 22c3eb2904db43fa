//! Error types for the API client

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// No HTTP response was received (connect failure, timeout, reset)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request could not be built (bad URL, bad header value)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A header value (tenant id, token) is not a valid HTTP header value
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The server answered with a non-success status other than 401
    #[error("HTTP error ({status}): {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, parsed as JSON when possible
        body: Value,
    },

    /// The server answered 401; the session has already been torn down
    #[error("Unauthorized: {body}")]
    Unauthorized {
        /// Response body, parsed as JSON when possible
        body: Value,
    },

    /// The success body did not match the expected type
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential storage failed
    #[error("Credential storage error: {0}")]
    Storage(#[from] magicsaas_core::Error),
}

/// Coarse classification of [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response reached the client
    Network,
    /// Non-success HTTP status (401 excluded)
    Http,
    /// 401 Unauthorized
    Auth,
    /// Response body could not be decoded
    Decode,
    /// Local configuration, request-building or storage problem
    Client,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Http => "http",
            Self::Auth => "auth",
            Self::Decode => "decode",
            Self::Client => "client",
        };
        f.write_str(name)
    }
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error from a status and raw body
    pub fn http(status: u16, raw_body: &[u8]) -> Self {
        Self::Http {
            status,
            body: body_value(raw_body),
        }
    }

    /// A request body or query that could not be serialized
    pub fn encode(err: &serde_json::Error) -> Self {
        Self::InvalidRequest(format!("Failed to encode request: {err}"))
    }

    /// Map a transport failure; builder errors are not network failures
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Network(err)
        }
    }

    /// Classification of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Http { .. } => ErrorKind::Http,
            Self::Unauthorized { .. } => ErrorKind::Auth,
            Self::Decode(_) => ErrorKind::Decode,
            Self::InvalidRequest(_)
            | Self::InvalidHeader { .. }
            | Self::Config(_)
            | Self::Storage(_) => ErrorKind::Client,
        }
    }

    /// HTTP status, when a response was received
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    /// Response body, when a response was received
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } | Self::Unauthorized { body } => Some(body),
            _ => None,
        }
    }

    /// Retry iff no response arrived or the status is 5xx
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => (500..600).contains(status),
            Self::Unauthorized { .. }
            | Self::InvalidRequest(_)
            | Self::InvalidHeader { .. }
            | Self::Decode(_)
            | Self::Config(_)
            | Self::Storage(_) => false,
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }
}

/// JSON body when parseable, the text otherwise, `null` when empty
pub(crate) fn body_value(raw: &[u8]) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(raw)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(raw).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retry_classification() {
        assert!(ApiError::http(500, b"").is_retryable());
        assert!(ApiError::http(503, b"").is_retryable());
        assert!(!ApiError::http(404, b"").is_retryable());
        assert!(!ApiError::http(429, b"").is_retryable());
        assert!(!ApiError::Unauthorized { body: Value::Null }.is_retryable());
        assert!(!ApiError::config("x").is_retryable());
    }

    #[test]
    fn test_status_helpers() {
        let not_found = ApiError::http(404, br#"{"error":"missing"}"#);
        assert!(not_found.is_client_error());
        assert!(!not_found.is_server_error());
        assert_eq!(not_found.body(), Some(&json!({"error": "missing"})));
        assert_eq!(not_found.kind(), ErrorKind::Http);

        let auth = ApiError::Unauthorized { body: Value::Null };
        assert_eq!(auth.status(), Some(401));
        assert_eq!(auth.kind(), ErrorKind::Auth);
    }

    #[test]
    fn test_body_value() {
        assert_eq!(body_value(b""), Value::Null);
        assert_eq!(body_value(b"{\"a\":1}"), json!({"a": 1}));
        assert_eq!(body_value(b"Bad Gateway"), json!("Bad Gateway"));
    }
}
