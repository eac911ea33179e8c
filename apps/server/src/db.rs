use sqlx::SqlitePool;

pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    // Enable WAL mode for better concurrent access
    sqlx::query("PRAGMA journal_mode=WAL").execute(pool).await?;

    // Create migrations tracking table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .execute(pool)
    .await?;

    // Run 001_init only if not already applied
    let applied: bool =
        sqlx::query_scalar("SELECT COUNT(*) > 0 FROM _migrations WHERE name = '001_init'")
            .fetch_one(pool)
            .await?;

    if !applied {
        let migration_sql = include_str!("../migrations/001_init.sql");
        for statement in migration_sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(pool).await?;
            }
        }
        sqlx::query("INSERT INTO _migrations (name) VALUES ('001_init')")
            .execute(pool)
            .await?;
        tracing::info!("Applied migration: 001_init");
    }

    // 002: lookup indexes plus the double-booking guard. The partial unique
    // index keeps at most one non-cancelled appointment per exact
    // (shop, date, start) key; overlap between different starts is handled
    // by the intake transaction.
    let indexes_applied: bool =
        sqlx::query_scalar("SELECT COUNT(*) > 0 FROM _migrations WHERE name = '002_indexes'")
            .fetch_one(pool)
            .await?;

    if !indexes_applied {
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_active_slot
             ON appointments(shop_id, date, start_time)
             WHERE status != 'cancelled'",
        )
        .execute(pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_appointments_shop_date
             ON appointments(shop_id, date)",
        )
        .execute(pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_appointments_client ON appointments(client_id)",
        )
        .execute(pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_services_shop ON services(shop_id)")
            .execute(pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_schedule_intervals_shop_day
             ON schedule_intervals(shop_id, weekday)",
        )
        .execute(pool)
        .await?;

        sqlx::query("INSERT INTO _migrations (name) VALUES ('002_indexes')")
            .execute(pool)
            .await?;
        tracing::info!("Applied migration: 002_indexes");
    }

    tracing::info!("Database migrations up to date");
    Ok(())
}
