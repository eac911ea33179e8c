mod availability;
mod db;
mod error;
mod handlers;
mod models;
mod rate_limit;
mod schedule;
mod status;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use rate_limit::{
    rate_limit_booking, rate_limit_client, rate_limit_public, rate_limit_shop, RateLimitConfig,
    RateLimiter,
};

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub started_at: Instant,
}

/// Rate limit cleanup interval (seconds).
const RATE_LIMIT_CLEANUP_SECS: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:navalha.db?mode=rwc".into());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let allowed_origin = std::env::var("ALLOWED_ORIGIN").ok();

    // ── Tracing ──
    let env_filter = EnvFilter::from_default_env().add_directive("info".parse()?);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── Database ──
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    db::run_migrations(&pool).await?;

    let state = Arc::new(AppState {
        db: pool,
        started_at: Instant::now(),
    });

    // ── Rate limiter ──
    let rate_limiter = RateLimiter::new();
    rate_limiter.add_tier(
        "public",
        RateLimitConfig {
            max_requests: 60,
            window: Duration::from_secs(60),
        },
    );
    rate_limiter.add_tier(
        "booking",
        RateLimitConfig {
            max_requests: 5,
            window: Duration::from_secs(300),
        },
    );
    rate_limiter.add_tier(
        "client",
        RateLimitConfig {
            max_requests: 30,
            window: Duration::from_secs(60),
        },
    );
    rate_limiter.add_tier(
        "shop",
        RateLimitConfig {
            max_requests: 120,
            window: Duration::from_secs(60),
        },
    );

    // ── Background task: cleanup stale rate limit entries ──
    let cleanup_limiter = rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(RATE_LIMIT_CLEANUP_SECS));
        loop {
            interval.tick().await;
            cleanup_limiter.cleanup();
        }
    });

    // ── CORS: whitelist ALLOWED_ORIGIN when configured, otherwise allow any ──
    let cors = if let Some(origin) = &allowed_origin {
        let origins: Vec<axum::http::HeaderValue> = vec![
            origin.parse().expect("ALLOWED_ORIGIN must be a valid URL"),
            "http://localhost:5173".parse().unwrap(), // Vite dev server
        ];
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // ── Router (tiers with per-tier rate limits) ──

    // 1. No-limit: health checks
    let no_limit_routes = Router::new().route("/api/health", get(handlers::health::health));

    // 2. Public: availability queries (60 req/min)
    let public_routes = Router::new()
        .route(
            "/api/shops/{shop_id}/availability",
            get(handlers::client::availability),
        )
        .layer(from_fn_with_state(rate_limiter.clone(), rate_limit_public));

    // 3. Booking intake: strictest limit (5 req/5min)
    let booking_routes = Router::new()
        .route(
            "/api/appointments",
            post(handlers::client::create_appointment),
        )
        .layer(from_fn_with_state(rate_limiter.clone(), rate_limit_booking));

    // 4. Client account endpoints (30 req/min)
    let client_routes = Router::new()
        .route(
            "/api/clients/{client_id}/appointments",
            get(handlers::client::client_appointments),
        )
        .route(
            "/api/appointments/{id}/status",
            put(handlers::client::update_status),
        )
        .layer(from_fn_with_state(rate_limiter.clone(), rate_limit_client));

    // 5. Shop management endpoints (120 req/min)
    let shop_routes = Router::new()
        .route(
            "/api/shops/{shop_id}/schedule",
            get(handlers::shop::get_schedule).post(handlers::shop::save_schedule),
        )
        .route(
            "/api/shops/{shop_id}/services",
            get(handlers::client::list_services).post(handlers::shop::create_service),
        )
        .route(
            "/api/shops/{shop_id}/services/{id}",
            put(handlers::shop::update_service).delete(handlers::shop::delete_service),
        )
        .route(
            "/api/shops/{shop_id}/appointments",
            get(handlers::shop::shop_appointments),
        )
        .layer(from_fn_with_state(rate_limiter.clone(), rate_limit_shop));

    let app = Router::new()
        .merge(no_limit_routes)
        .merge(public_routes)
        .merge(booking_routes)
        .merge(client_routes)
        .merge(shop_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    tracing::info!("Navalha server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
