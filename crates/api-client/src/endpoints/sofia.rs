//! Sofia assistant endpoints
//!
//! Routed through the API under the Pétala base path, so the assistant
//! receives the same tenant and vertical headers as every other call.

use crate::client::UniversalApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone)]
pub struct SofiaApi {
    client: UniversalApiClient,
}

impl SofiaApi {
    pub(crate) fn new(client: UniversalApiClient) -> Self {
        Self { client }
    }

    /// POST `sofia/chat`
    pub async fn chat(&self, message: &ChatMessage) -> ApiResult<ChatReply> {
        self.client.post("sofia/chat", message).await
    }

    /// GET `sofia/suggestions`
    pub async fn suggestions(&self, context: Option<&str>) -> ApiResult<Vec<String>> {
        self.client
            .get_with_query("sofia/suggestions", &serde_json::json!({ "context": context }))
            .await
    }

    /// GET `sofia/recommendations`
    pub async fn recommendations(&self, limit: Option<u32>) -> ApiResult<Vec<Value>> {
        self.client
            .get_with_query("sofia/recommendations", &serde_json::json!({ "limit": limit }))
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
}

impl ChatMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
            context: Map::new(),
        }
    }

    /// Continue an existing conversation
    #[must_use]
    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
