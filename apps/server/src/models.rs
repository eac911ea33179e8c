use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Database models ──

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: i64,
    pub shop_id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub duration_min: i64,
    pub category: String,
    pub is_active: bool,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: i64,
    pub client_id: i64,
    pub shop_id: i64,
    pub service_id: i64,
    pub date: String,
    pub start_time: String,
    pub status: String,
    pub price_snapshot: i64,
    pub notes: String,
    pub rating: Option<i64>,
    pub rating_comment: Option<String>,
    pub created_at: String,
    pub cancelled_at: Option<String>,
}

/// Appointment row joined with its service, as returned by listings.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AppointmentDetail {
    pub id: i64,
    pub client_id: i64,
    pub shop_id: i64,
    pub service_id: i64,
    pub service_name: String,
    pub duration_min: i64,
    pub date: String,
    pub start_time: String,
    pub status: String,
    pub price_snapshot: i64,
    pub notes: String,
    pub rating: Option<i64>,
    pub created_at: String,
}

// ── API request/response types ──

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
    pub duration: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub slots: Vec<String>,
}

/// Intake payload. Every field is optional at the serde layer so missing
/// ones surface as MissingField instead of a deserialization reject.
#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub client_id: Option<i64>,
    pub shop_id: Option<i64>,
    pub service_id: Option<i64>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ShopAppointmentsQuery {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IntervalDto {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayScheduleDto {
    pub status: String,
    #[serde(default)]
    pub intervals: Vec<IntervalDto>,
}

/// Full weekly schedule keyed by weekday name (monday..sunday).
#[derive(Debug, Deserialize)]
pub struct SaveScheduleRequest {
    pub schedule: BTreeMap<String, DayScheduleDto>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub schedule: BTreeMap<&'static str, DayScheduleDto>,
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub duration_min: Option<i64>,
    pub category: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub duration_min: Option<i64>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
