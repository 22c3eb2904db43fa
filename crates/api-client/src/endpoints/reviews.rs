//! Reviews API endpoints

use crate::client::UniversalApiClient;
use crate::endpoints::common::{ListParams, Paginated, segment};
use crate::error::ApiResult;
use crate::request::ApiRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone)]
pub struct ReviewsApi {
    client: UniversalApiClient,
}

impl ReviewsApi {
    pub(crate) fn new(client: UniversalApiClient) -> Self {
        Self { client }
    }

    /// GET `products/:id/reviews`
    pub async fn list(&self, product_id: &str, params: &ListParams) -> ApiResult<Paginated<Review>> {
        self.client
            .get_with_query(&format!("products/{}/reviews", segment(product_id)), params)
            .await
    }

    /// POST `reviews`
    pub async fn create(&self, review: &NewReview) -> ApiResult<Review> {
        self.client.post("reviews", review).await
    }

    /// POST `reviews/:id/helpful`
    pub async fn mark_helpful(&self, review_id: &str) -> ApiResult<Value> {
        self.client
            .request(ApiRequest::post(format!("reviews/{}/helpful", segment(review_id))))
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: String,
    /// 1 to 5
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub product_id: Option<String>,
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub helpful_count: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
