//! Shapes shared across resources

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Percent-encode an id for use as a single path segment
pub(crate) fn segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

/// Page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(alias = "data", default = "Vec::new")]
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> Paginated<T> {
    /// Whether another page exists after this one
    pub fn has_more(&self) -> bool {
        match (self.total, self.page, self.limit) {
            (Some(total), Some(page), Some(limit)) => u64::from(page) * u64::from(limit) < total,
            _ => false,
        }
    }
}

/// Pagination and sorting accepted by every list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub status: Option<String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Acknowledgement returned by commands with no resource body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Postal address, shared by customers and orders
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub street: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
