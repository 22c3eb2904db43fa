//! Products API endpoints
//!
//! Catalogue of the active Pétala:
//! - List, search and featured listings
//! - Listing by category
//! - Create, update and delete (back-office)

use crate::client::UniversalApiClient;
use crate::endpoints::common::{Paginated, segment};
use crate::error::ApiResult;
use crate::request::ApiRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Products API interface
#[derive(Clone)]
pub struct ProductsApi {
    client: UniversalApiClient,
}

impl ProductsApi {
    pub(crate) fn new(client: UniversalApiClient) -> Self {
        Self { client }
    }

    /// GET `products`
    pub async fn list(&self, params: &ListProductsParams) -> ApiResult<Paginated<Product>> {
        self.client.get_with_query("products", params).await
    }

    /// GET `products/:id`
    pub async fn get(&self, id: &str) -> ApiResult<Product> {
        self.client.get(&format!("products/{}", segment(id))).await
    }

    /// GET `products/search?q=`
    pub async fn search(&self, query: &str, params: &ListProductsParams) -> ApiResult<Paginated<Product>> {
        let request = ApiRequest::get("products/search")
            .with_query(params)?
            .with_param("q", query);
        self.client.request(request).await
    }

    /// GET `products/featured?limit=`
    pub async fn featured(&self, limit: Option<u32>) -> ApiResult<Vec<Product>> {
        self.client
            .get_with_query("products/featured", &serde_json::json!({ "limit": limit }))
            .await
    }

    /// GET `products/category/:slug`
    pub async fn by_category(
        &self,
        slug: &str,
        params: &ListProductsParams,
    ) -> ApiResult<Paginated<Product>> {
        self.client
            .get_with_query(&format!("products/category/{}", segment(slug)), params)
            .await
    }

    /// POST `products`
    pub async fn create(&self, product: &ProductInput) -> ApiResult<Product> {
        self.client.post("products", product).await
    }

    /// PATCH `products/:id`
    pub async fn update(&self, id: &str, changes: &ProductInput) -> ApiResult<Product> {
        self.client.patch(&format!("products/{}", segment(id)), changes).await
    }

    /// DELETE `products/:id`
    pub async fn delete(&self, id: &str) -> ApiResult<Value> {
        self.client.delete(&format!("products/{}", segment(id))).await
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Filters for product listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsParams {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: Option<bool>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListProductsParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    #[must_use]
    pub fn in_stock_only(mut self) -> Self {
        self.in_stock = Some(true);
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub rating: Option<f64>,
    /// Vertical-specific attributes (sizes, allergens, mileage...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Create or partial-update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
