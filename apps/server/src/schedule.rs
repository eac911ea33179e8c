//! Weekly working-hours schedule: the canonical weekday enumeration, the
//! per-day config read the availability calculator consumes, and the
//! atomic replace-on-save write.
//!
//! A missing status row means closed; callers cannot tell "unconfigured"
//! apart from "explicitly closed", and must not need to.

use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::availability::{format_hhmm, parse_hhmm, TimeRange};
use crate::error::ApiError;
use crate::models::{DayScheduleDto, IntervalDto};

/// Canonical weekday keys, shared by the store and the calculator.
pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Weekday key for a concrete date.
pub fn weekday_key(date: NaiveDate) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_monday() as usize]
}

/// One day's effective configuration.
#[derive(Debug)]
pub struct DayConfig {
    pub open: bool,
    /// Working intervals in store order (no disjointness or sort guarantee).
    pub intervals: Vec<TimeRange>,
}

/// Fetch the day config for a shop. Absent status row ≡ closed.
pub async fn day_config(
    db: &SqlitePool,
    shop_id: i64,
    weekday: &str,
) -> Result<DayConfig, sqlx::Error> {
    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM schedule_days WHERE shop_id = ? AND weekday = ?")
            .bind(shop_id)
            .bind(weekday)
            .fetch_optional(db)
            .await?;

    if !matches!(status.as_deref(), Some("open")) {
        return Ok(DayConfig {
            open: false,
            intervals: Vec::new(),
        });
    }

    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT start_time, end_time FROM schedule_intervals WHERE shop_id = ? AND weekday = ?",
    )
    .bind(shop_id)
    .bind(weekday)
    .fetch_all(db)
    .await?;

    let mut intervals = Vec::with_capacity(rows.len());
    for (start, end) in &rows {
        match (parse_hhmm(start), parse_hhmm(end)) {
            (Some(s), Some(e)) => intervals.push(TimeRange::new(s, e)),
            _ => tracing::warn!(
                "shop {} {}: skipping unparseable interval {}-{}",
                shop_id,
                weekday,
                start,
                end
            ),
        }
    }

    Ok(DayConfig {
        open: true,
        intervals,
    })
}

/// A day entry validated and normalized for storage.
#[derive(Debug, PartialEq)]
pub struct ValidDay {
    pub weekday: &'static str,
    pub status: &'static str,
    /// (start, end) pairs normalized to zero-padded `HH:MM`.
    pub intervals: Vec<(String, String)>,
}

/// Validate one posted day against the canonical weekday set and time
/// format. Times are re-formatted so storage only ever holds `HH:MM`.
pub fn validate_day(weekday: &str, dto: &DayScheduleDto) -> Result<ValidDay, ApiError> {
    let canonical = WEEKDAYS
        .iter()
        .copied()
        .find(|w| *w == weekday)
        .ok_or_else(|| ApiError::InvalidArgument(format!("Dia da semana inválido: {}", weekday)))?;

    let status = match dto.status.as_str() {
        "open" => "open",
        "closed" => "closed",
        other => {
            return Err(ApiError::InvalidArgument(format!(
                "Status de dia inválido: {}",
                other
            )))
        }
    };

    let mut intervals = Vec::with_capacity(dto.intervals.len());
    for interval in &dto.intervals {
        let start = parse_hhmm(&interval.start).ok_or_else(|| {
            ApiError::InvalidArgument(format!("Horário inválido: {}", interval.start))
        })?;
        let end = parse_hhmm(&interval.end).ok_or_else(|| {
            ApiError::InvalidArgument(format!("Horário inválido: {}", interval.end))
        })?;
        intervals.push((format_hhmm(start), format_hhmm(end)));
    }

    Ok(ValidDay {
        weekday: canonical,
        status,
        intervals,
    })
}

/// Replace a shop's whole schedule in one transaction (delete-then-insert).
/// The posted map is the new truth: omitted days end up absent, i.e. closed.
pub async fn replace_schedule(
    db: &SqlitePool,
    shop_id: i64,
    schedule: &BTreeMap<String, DayScheduleDto>,
) -> Result<(), ApiError> {
    let mut days = Vec::with_capacity(schedule.len());
    for (weekday, dto) in schedule {
        days.push(validate_day(weekday, dto)?);
    }

    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM schedule_intervals WHERE shop_id = ?")
        .bind(shop_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM schedule_days WHERE shop_id = ?")
        .bind(shop_id)
        .execute(&mut *tx)
        .await?;

    for day in &days {
        sqlx::query("INSERT INTO schedule_days (shop_id, weekday, status) VALUES (?, ?, ?)")
            .bind(shop_id)
            .bind(day.weekday)
            .bind(day.status)
            .execute(&mut *tx)
            .await?;
        for (start, end) in &day.intervals {
            sqlx::query(
                "INSERT INTO schedule_intervals (shop_id, weekday, start_time, end_time)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(shop_id)
            .bind(day.weekday)
            .bind(start)
            .bind(end)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Read the full 7-day schedule, filling unconfigured days as closed.
pub async fn full_schedule(
    db: &SqlitePool,
    shop_id: i64,
) -> Result<BTreeMap<&'static str, DayScheduleDto>, sqlx::Error> {
    let status_rows: Vec<(String, String)> =
        sqlx::query_as("SELECT weekday, status FROM schedule_days WHERE shop_id = ?")
            .bind(shop_id)
            .fetch_all(db)
            .await?;

    let interval_rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT weekday, start_time, end_time FROM schedule_intervals
         WHERE shop_id = ? ORDER BY start_time ASC",
    )
    .bind(shop_id)
    .fetch_all(db)
    .await?;

    let mut schedule = BTreeMap::new();
    for weekday in WEEKDAYS {
        let status = status_rows
            .iter()
            .find(|(day, _)| day == weekday)
            .map(|(_, status)| status.clone())
            .unwrap_or_else(|| "closed".into());
        let intervals = interval_rows
            .iter()
            .filter(|(day, _, _)| day == weekday)
            .map(|(_, start, end)| IntervalDto {
                start: start.clone(),
                end: end.clone(),
            })
            .collect();
        schedule.insert(weekday, DayScheduleDto { status, intervals });
    }
    Ok(schedule)
}

// ── Tests ──
