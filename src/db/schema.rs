use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: "001",
    name: "initial",
    sql: include_str!("migrations/001_initial.sql"),
}];

/// Bring the schema up to date. Each pending migration runs in its own
/// transaction together with its bookkeeping row.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    let applied = applied_versions(conn)?;
    let pending = MIGRATIONS
        .iter()
        .filter(|m| !applied.iter().any(|v| v == m.version));

    for migration in pending {
        apply(conn, migration).with_context(|| {
            format!("Failed to apply migration {}_{}", migration.version, migration.name)
        })?;
    }
    Ok(())
}

fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(versions)
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::info!("Applying migration {}_{}", migration.version, migration.name);

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        (migration.version, migration.name, Utc::now().to_rfc3339()),
    )?;
    tx.commit()?;
    Ok(())
}
