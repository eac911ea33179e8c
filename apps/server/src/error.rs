use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiResponse;
use crate::status::AppointmentStatus;

/// Errors a single engine operation can surface. Each maps to one HTTP
/// status; none of them leaves partial state behind (every mutation is a
/// single transaction).
#[derive(Debug)]
pub enum ApiError {
    /// Caller contract violation (bad date, non-positive duration, unknown
    /// weekday). Never retried.
    InvalidArgument(String),
    /// A required intake field is absent.
    MissingField(&'static str),
    /// The referenced record does not exist (or is inactive).
    NotFound(&'static str),
    /// Booking-time conflict: the requested interval overlaps an active
    /// appointment.
    SlotUnavailable,
    /// Illegal status change under the transition table.
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    /// The store is unreachable; the caller may retry with backoff.
    Dependency(sqlx::Error),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                format!("Campo obrigatório ausente: {}", field),
            ),
            ApiError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado", what))
            }
            ApiError::SlotUnavailable => (
                StatusCode::CONFLICT,
                "Horário indisponível. Escolha outro horário.".into(),
            ),
            ApiError::InvalidTransition { from, to } => (
                StatusCode::CONFLICT,
                if from.is_terminal() {
                    format!("Agendamento {} não pode mais mudar de status", from.as_str())
                } else {
                    format!(
                        "Transição de status inválida: de {} para {}",
                        from.as_str(),
                        to.as_str()
                    )
                },
            ),
            ApiError::Dependency(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Erro de conexão com banco de dados".into(),
            ),
        }
    }

    /// Map an insert failure, turning a unique-index violation on the
    /// (shop, date, start) key into the booking conflict it means.
    pub fn from_insert(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::SlotUnavailable,
            _ => ApiError::Dependency(e),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Dependency(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Dependency(e) = &self {
            tracing::error!("store access failed: {}", e);
        }
        let (status, message) = self.status_and_message();
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
