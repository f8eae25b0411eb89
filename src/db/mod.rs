//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data. The catalog
//! collections (races, classes, abilities, equipment, monsters) are seeded
//! at startup and treated as immutable reference data afterwards.

mod repository;
mod seed;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool, run migrations and seed the
/// catalog collections.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations, then seed reference data
    run_migrations(&pool).await?;
    seed::seed_catalog(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            user_name TEXT NOT NULL UNIQUE,
            race_id TEXT NOT NULL,
            class_id TEXT NOT NULL,
            ability_scores TEXT NOT NULL DEFAULT '[]',
            equipment_ids TEXT NOT NULL DEFAULT '[]',
            favorite_monster_ids TEXT NOT NULL DEFAULT '[]',
            dungeon_name TEXT NOT NULL DEFAULT 'My Dungeon',
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS races (
            id TEXT PRIMARY KEY,
            idx TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            speed INTEGER NOT NULL,
            alignment TEXT NOT NULL,
            size TEXT NOT NULL,
            size_description TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS classes (
            id TEXT PRIMARY KEY,
            idx TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            hit_die INTEGER NOT NULL,
            skills TEXT NOT NULL DEFAULT '[]'
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS abilities (
            id TEXT PRIMARY KEY,
            idx TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS equipments (
            id TEXT PRIMARY KEY,
            idx TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            value INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monsters (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            size TEXT NOT NULL,
            type TEXT NOT NULL,
            alignment TEXT NOT NULL,
            hit_points INTEGER NOT NULL,
            image TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            monster_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            difficulty INTEGER NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, monster_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_monsters_name ON monsters(name);
        CREATE INDEX IF NOT EXISTS idx_monsters_type ON monsters(type);
        CREATE INDEX IF NOT EXISTS idx_monsters_hit_points ON monsters(hit_points);
        CREATE INDEX IF NOT EXISTS idx_equipments_name ON equipments(name);
        CREATE INDEX IF NOT EXISTS idx_reviews_monster ON reviews(monster_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
