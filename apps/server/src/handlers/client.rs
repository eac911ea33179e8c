use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::availability::{self, TimeRange, DEFAULT_DURATION_MIN};
use crate::error::ApiError;
use crate::models::*;
use crate::schedule;
use crate::status::AppointmentStatus;
use crate::AppState;

// ── Shared appointment query (used by shop.rs listings too) ──

/// The shared SELECT columns for appointment detail queries. Durations come
/// from the service row at query time, never from a cached copy, so editing
/// a service changes future availability without rewriting the ledger.
const APPOINTMENT_DETAIL_SELECT: &str =
    "SELECT a.id, a.client_id, a.shop_id, a.service_id,
            COALESCE(s.name, '') AS service_name,
            COALESCE(s.duration_min, 30) AS duration_min,
            a.date, a.start_time, a.status, a.price_snapshot, a.notes,
            a.rating, a.created_at
     FROM appointments a
     LEFT JOIN services s ON s.id = a.service_id";

/// The shared appointment detail SELECT string (used by shop.rs too).
pub fn appointment_detail_select() -> &'static str {
    APPOINTMENT_DETAIL_SELECT
}

/// Occupied intervals for a shop and date: every non-cancelled appointment,
/// widened to `[start, start + service duration)`. An appointment whose
/// service has since been deleted falls back to the 30-minute default.
pub async fn active_booked_intervals<'e, E>(
    db: E,
    shop_id: i64,
    date: &str,
) -> Result<Vec<TimeRange>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT a.start_time, COALESCE(s.duration_min, 30) AS duration_min
         FROM appointments a
         LEFT JOIN services s ON s.id = a.service_id
         WHERE a.shop_id = ? AND a.date = ? AND a.status != 'cancelled'",
    )
    .bind(shop_id)
    .bind(date)
    .fetch_all(db)
    .await?;

    Ok(rows
        .iter()
        .filter_map(|(start, duration_min)| {
            let start_min = availability::parse_hhmm(start)?;
            Some(TimeRange::from_start_duration(start_min, *duration_min))
        })
        .collect())
}

// ── Endpoints ──

/// GET /api/shops/{shop_id}/services — active services of a shop.
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Service>>>, ApiError> {
    let services = sqlx::query_as::<_, Service>(
        "SELECT id, shop_id, name, description, price, duration_min, category, is_active, sort_order
         FROM services WHERE shop_id = ? AND is_active = 1
         ORDER BY sort_order ASC, id ASC",
    )
    .bind(shop_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApiResponse::success(services)))
}

/// GET /api/shops/{shop_id}/availability?date=YYYY-MM-DD&duration=N
///
/// A closed day (or one without intervals) answers with an empty slot list,
/// not an error.
pub async fn availability(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<AvailabilityResponse>>, ApiError> {
    let date_str = query.date.as_deref().ok_or(ApiError::MissingField("date"))?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| ApiError::InvalidArgument("Formato de data inválido (YYYY-MM-DD)".into()))?;

    let duration_min = query.duration.unwrap_or(DEFAULT_DURATION_MIN);
    if duration_min <= 0 {
        return Err(ApiError::InvalidArgument(
            "Duração deve ser um número positivo de minutos".into(),
        ));
    }

    let day = schedule::day_config(&state.db, shop_id, schedule::weekday_key(date)).await?;
    if !day.open || day.intervals.is_empty() {
        return Ok(Json(ApiResponse::success(AvailabilityResponse {
            slots: Vec::new(),
        })));
    }

    let booked = active_booked_intervals(&state.db, shop_id, date_str).await?;
    let slots = availability::compute_slots(&day.intervals, &booked, duration_min);

    Ok(Json(ApiResponse::success(AvailabilityResponse { slots })))
}

/// POST /api/appointments — booking intake.
///
/// The overlap test runs inside the same transaction as the insert, so two
/// racing intakes cannot both pass it; the partial unique index on
/// (shop, date, start) backstops the exact-duplicate case.
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    let client_id = body.client_id.ok_or(ApiError::MissingField("client_id"))?;
    let shop_id = body.shop_id.ok_or(ApiError::MissingField("shop_id"))?;
    let service_id = body.service_id.ok_or(ApiError::MissingField("service_id"))?;
    let date = body.date.ok_or(ApiError::MissingField("date"))?;
    let start_raw = body.start_time.ok_or(ApiError::MissingField("start_time"))?;

    NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::InvalidArgument("Formato de data inválido (YYYY-MM-DD)".into()))?;
    let start_min = availability::parse_hhmm(&start_raw)
        .ok_or_else(|| ApiError::InvalidArgument("Formato de horário inválido (HH:MM)".into()))?;
    // Canonical zero-padded form, also the key the unique index guards.
    let start_time = availability::format_hhmm(start_min);

    let mut tx = state.db.begin().await?;

    let service = sqlx::query_as::<_, Service>(
        "SELECT id, shop_id, name, description, price, duration_min, category, is_active, sort_order
         FROM services WHERE id = ? AND shop_id = ? AND is_active = 1",
    )
    .bind(service_id)
    .bind(shop_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("Serviço"))?;

    let booked = active_booked_intervals(&mut *tx, shop_id, &date).await?;
    let candidate = TimeRange::from_start_duration(start_min, service.duration_min);
    if availability::conflicts(candidate, &booked) {
        return Err(ApiError::SlotUnavailable);
    }

    let id = sqlx::query(
        "INSERT INTO appointments (client_id, shop_id, service_id, date, start_time,
         status, price_snapshot, notes)
         VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(client_id)
    .bind(shop_id)
    .bind(service_id)
    .bind(&date)
    .bind(&start_time)
    .bind(service.price)
    .bind(body.notes.as_deref().unwrap_or(""))
    .execute(&mut *tx)
    .await
    .map_err(ApiError::from_insert)?
    .last_insert_rowid();

    tx.commit().await?;

    tracing::info!(
        "appointment {} created: shop {} {} {} ({} min)",
        id,
        shop_id,
        date,
        start_time,
        service.duration_min
    );

    let appointment = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(ApiResponse::success(appointment)))
}

/// GET /api/clients/{client_id}/appointments — the client's bookings,
/// newest first.
pub async fn client_appointments(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<AppointmentDetail>>>, ApiError> {
    let query = format!(
        "{} WHERE a.client_id = ? ORDER BY a.date DESC, a.start_time DESC",
        APPOINTMENT_DETAIL_SELECT
    );

    let appointments = sqlx::query_as::<_, AppointmentDetail>(&query)
        .bind(client_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(ApiResponse::success(appointments)))
}

/// PUT /api/appointments/{id}/status — validated lifecycle transition.
///
/// One atomic read-validate-write per call; cancellation stamps
/// `cancelled_at` and frees the interval for future availability queries
/// (the row itself is never deleted).
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    let requested = AppointmentStatus::parse(&body.status)
        .ok_or_else(|| ApiError::InvalidArgument(format!("Status inválido: {}", body.status)))?;

    let mut tx = state.db.begin().await?;

    let current_raw: String = sqlx::query_scalar("SELECT status FROM appointments WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("Agendamento"))?;

    let current = AppointmentStatus::parse(&current_raw).ok_or_else(|| {
        tracing::error!("appointment {}: unknown stored status {:?}", id, current_raw);
        ApiError::InvalidArgument(format!("Status armazenado inválido: {}", current_raw))
    })?;

    if !current.can_transition_to(requested) {
        return Err(ApiError::InvalidTransition {
            from: current,
            to: requested,
        });
    }

    if requested == AppointmentStatus::Cancelled {
        sqlx::query(
            "UPDATE appointments SET status = ?, cancelled_at = datetime('now') WHERE id = ?",
        )
        .bind(requested.as_str())
        .bind(id)
        .execute(&mut *tx)
        .await?;
    } else {
        sqlx::query("UPDATE appointments SET status = ? WHERE id = ?")
            .bind(requested.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let appointment = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(ApiResponse::success(appointment)))
}
