//! Appointments API endpoints
//!
//! Used by service verticals (healthcare, beauty, fitness, legal...).

use crate::client::UniversalApiClient;
use crate::endpoints::common::{ListParams, Paginated, segment};
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Clone)]
pub struct AppointmentsApi {
    client: UniversalApiClient,
}

impl AppointmentsApi {
    pub(crate) fn new(client: UniversalApiClient) -> Self {
        Self { client }
    }

    /// GET `appointments`
    pub async fn list(&self, params: &ListParams) -> ApiResult<Paginated<Appointment>> {
        self.client.get_with_query("appointments", params).await
    }

    /// GET `appointments/slots`
    pub async fn slots(&self, query: &SlotQuery) -> ApiResult<Vec<Slot>> {
        self.client.get_with_query("appointments/slots", query).await
    }

    /// POST `appointments`
    pub async fn book(&self, booking: &Booking) -> ApiResult<Appointment> {
        self.client.post("appointments", booking).await
    }

    /// PUT `appointments/:id/reschedule`
    pub async fn reschedule(&self, id: &str, starts_at: &str) -> ApiResult<Appointment> {
        self.client
            .put(
                &format!("appointments/{}/reschedule", segment(id)),
                &json!({ "startsAt": starts_at }),
            )
            .await
    }

    /// PUT `appointments/:id/cancel`
    pub async fn cancel(&self, id: &str, reason: Option<&str>) -> ApiResult<Value> {
        self.client
            .put(&format!("appointments/{}/cancel", segment(id)), &json!({ "reason": reason }))
            .await
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    pub service_id: Option<String>,
    pub professional_id: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub starts_at: String,
    pub ends_at: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    pub professional_id: Option<String>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub service_id: String,
    pub starts_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub status: String,
    pub starts_at: String,
    pub ends_at: Option<String>,
    pub service_id: Option<String>,
    pub professional_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
