use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::handlers::client::appointment_detail_select;
use crate::models::*;
use crate::schedule;
use crate::AppState;

// ── Working-hours schedule ──

/// GET /api/shops/{shop_id}/schedule — the full 7-day schedule.
/// Unconfigured days read as closed with no intervals.
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<i64>,
) -> Result<Json<ApiResponse<ScheduleResponse>>, ApiError> {
    let schedule = schedule::full_schedule(&state.db, shop_id).await?;
    Ok(Json(ApiResponse::success(ScheduleResponse { schedule })))
}

/// POST /api/shops/{shop_id}/schedule — atomic replace of the whole weekly
/// schedule. The posted snapshot becomes the new truth; there is no
/// row-by-row patching.
pub async fn save_schedule(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<i64>,
    Json(body): Json<SaveScheduleRequest>,
) -> Result<Json<ApiResponse<&'static str>>, ApiError> {
    schedule::replace_schedule(&state.db, shop_id, &body.schedule).await?;
    Ok(Json(ApiResponse::success("Horários salvos com sucesso")))
}

// ── Service catalog ──

/// POST /api/shops/{shop_id}/services — create a service.
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<i64>,
    Json(body): Json<CreateServiceRequest>,
) -> Result<Json<ApiResponse<Service>>, ApiError> {
    let name = body.name.ok_or(ApiError::MissingField("name"))?;
    let price = body.price.ok_or(ApiError::MissingField("price"))?;
    let duration_min = body.duration_min.ok_or(ApiError::MissingField("duration_min"))?;

    if duration_min <= 0 {
        return Err(ApiError::InvalidArgument(
            "Duração deve ser um número positivo de minutos".into(),
        ));
    }

    let id = sqlx::query(
        "INSERT INTO services (shop_id, name, description, price, duration_min, category, sort_order)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(shop_id)
    .bind(&name)
    .bind(body.description.as_deref().unwrap_or(""))
    .bind(price)
    .bind(duration_min)
    .bind(body.category.as_deref().unwrap_or("outros"))
    .bind(body.sort_order.unwrap_or(0))
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    let service = sqlx::query_as::<_, Service>(
        "SELECT id, shop_id, name, description, price, duration_min, category, is_active, sort_order
         FROM services WHERE id = ?",
    )
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(ApiResponse::success(service)))
}

/// PUT /api/shops/{shop_id}/services/{id} — partial update. Duration edits
/// change future availability computations only; past appointments keep
/// their price snapshots untouched.
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path((shop_id, id)): Path<(i64, i64)>,
    Json(body): Json<UpdateServiceRequest>,
) -> Result<Json<ApiResponse<Service>>, ApiError> {
    if let Some(duration_min) = body.duration_min {
        if duration_min <= 0 {
            return Err(ApiError::InvalidArgument(
                "Duração deve ser um número positivo de minutos".into(),
            ));
        }
    }

    if let Some(name) = &body.name {
        sqlx::query("UPDATE services SET name = ? WHERE id = ? AND shop_id = ?")
            .bind(name)
            .bind(id)
            .bind(shop_id)
            .execute(&state.db)
            .await?;
    }
    if let Some(description) = &body.description {
        sqlx::query("UPDATE services SET description = ? WHERE id = ? AND shop_id = ?")
            .bind(description)
            .bind(id)
            .bind(shop_id)
            .execute(&state.db)
            .await?;
    }
    if let Some(price) = body.price {
        sqlx::query("UPDATE services SET price = ? WHERE id = ? AND shop_id = ?")
            .bind(price)
            .bind(id)
            .bind(shop_id)
            .execute(&state.db)
            .await?;
    }
    if let Some(duration_min) = body.duration_min {
        sqlx::query("UPDATE services SET duration_min = ? WHERE id = ? AND shop_id = ?")
            .bind(duration_min)
            .bind(id)
            .bind(shop_id)
            .execute(&state.db)
            .await?;
    }
    if let Some(category) = &body.category {
        sqlx::query("UPDATE services SET category = ? WHERE id = ? AND shop_id = ?")
            .bind(category)
            .bind(id)
            .bind(shop_id)
            .execute(&state.db)
            .await?;
    }
    if let Some(is_active) = body.is_active {
        sqlx::query("UPDATE services SET is_active = ? WHERE id = ? AND shop_id = ?")
            .bind(is_active)
            .bind(id)
            .bind(shop_id)
            .execute(&state.db)
            .await?;
    }
    if let Some(sort_order) = body.sort_order {
        sqlx::query("UPDATE services SET sort_order = ? WHERE id = ? AND shop_id = ?")
            .bind(sort_order)
            .bind(id)
            .bind(shop_id)
            .execute(&state.db)
            .await?;
    }

    let service = sqlx::query_as::<_, Service>(
        "SELECT id, shop_id, name, description, price, duration_min, category, is_active, sort_order
         FROM services WHERE id = ? AND shop_id = ?",
    )
    .bind(id)
    .bind(shop_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound("Serviço"))?;

    Ok(Json(ApiResponse::success(service)))
}

/// DELETE /api/shops/{shop_id}/services/{id} — remove from the catalog.
/// Ledger rows keep their service_id and price snapshot.
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path((shop_id, id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<&'static str>>, ApiError> {
    let affected = sqlx::query("DELETE FROM services WHERE id = ? AND shop_id = ?")
        .bind(id)
        .bind(shop_id)
        .execute(&state.db)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(ApiError::NotFound("Serviço"));
    }

    Ok(Json(ApiResponse::success("Serviço excluído com sucesso")))
}

// ── Appointment book ──

/// GET /api/shops/{shop_id}/appointments — the shop's book, optionally
/// filtered to a date (`?date=`) or an inclusive range (`?from=&to=`).
pub async fn shop_appointments(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<i64>,
    Query(query): Query<ShopAppointmentsQuery>,
) -> Result<Json<ApiResponse<Vec<AppointmentDetail>>>, ApiError> {
    let appointments = if let Some(date) = &query.date {
        let sql = format!(
            "{} WHERE a.shop_id = ? AND a.date = ?
             ORDER BY a.start_time ASC",
            appointment_detail_select()
        );
        sqlx::query_as::<_, AppointmentDetail>(&sql)
            .bind(shop_id)
            .bind(date)
            .fetch_all(&state.db)
            .await
    } else if let (Some(from), Some(to)) = (&query.from, &query.to) {
        let sql = format!(
            "{} WHERE a.shop_id = ? AND a.date BETWEEN ? AND ?
             ORDER BY a.date ASC, a.start_time ASC",
            appointment_detail_select()
        );
        sqlx::query_as::<_, AppointmentDetail>(&sql)
            .bind(shop_id)
            .bind(from)
            .bind(to)
            .fetch_all(&state.db)
            .await
    } else {
        let sql = format!(
            "{} WHERE a.shop_id = ?
             ORDER BY a.date DESC, a.start_time DESC",
            appointment_detail_select()
        );
        sqlx::query_as::<_, AppointmentDetail>(&sql)
            .bind(shop_id)
            .fetch_all(&state.db)
            .await
    }?;

    Ok(Json(ApiResponse::success(appointments)))
}
