//! Request descriptions passed to [`crate::UniversalApiClient::send`]

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// One logical API call; retries re-send the same description
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the vertical base path (or already prefixed)
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add query parameters from any struct or map serializing to a JSON object
    ///
    /// `null` fields are skipped and arrays become repeated keys.
    pub fn with_query<Q: Serialize + ?Sized>(mut self, params: &Q) -> ApiResult<Self> {
        match serde_json::to_value(params).map_err(|e| ApiError::encode(&e))? {
            Value::Object(map) => {
                for (key, value) in map {
                    push_query(&mut self.query, &key, value);
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(ApiError::InvalidRequest(format!(
                "query parameters must serialize to an object, got {other}"
            ))),
        }
    }

    /// Add a single query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body
    pub fn with_body<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ApiError::encode(&e))?);
        Ok(self)
    }
}

fn push_query(query: &mut Vec<(String, String)>, key: &str, value: Value) {
    match value {
        Value::Null => {}
        Value::String(s) => query.push((key.to_string(), s)),
        Value::Array(items) => {
            for item in items {
                push_query(query, key, item);
            }
        }
        other => query.push((key.to_string(), other.to_string())),
    }
}
