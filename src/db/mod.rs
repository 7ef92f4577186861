//! Postgres pool and schema bootstrap.

pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::{Duration, Instant};
use tracing::{Instrument, info, info_span, warn};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));
const SCHEMA_RETRY_INTERVAL: Duration = Duration::from_millis(1500);

/// Build the connection pool. Connections are opened lazily so the server can
/// come up while the database is still starting; `init_schema` waits for it.
///
/// # Errors
/// Returns an error if the DSN cannot be parsed.
pub fn connect(dsn: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect_lazy(dsn)
        .context("Failed to configure database pool")
}

/// Apply `sql/schema.sql`, retrying until the database accepts connections.
///
/// # Errors
/// Returns the last error once `timeout` has elapsed.
pub async fn init_schema(pool: &PgPool, timeout: Duration) -> Result<()> {
    let started = Instant::now();
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match apply_schema(pool).await {
            Ok(()) => {
                info!("Database schema ready after {attempt} attempt(s)");
                return Ok(());
            }
            Err(err) if started.elapsed() + SCHEMA_RETRY_INTERVAL < timeout => {
                warn!("Database not ready (attempt {attempt}): {err:#}");
                tokio::time::sleep(SCHEMA_RETRY_INTERVAL).await;
            }
            Err(err) => {
                return Err(err.context(format!(
                    "Database schema initialization timed out after {}s",
                    timeout.as_secs()
                )));
            }
        }
    }
}

async fn apply_schema(pool: &PgPool) -> Result<()> {
    let mut conn = pool
        .acquire()
        .await
        .context("failed to acquire connection for schema setup")?;

    for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
        let span = info_span!("db.query", db.system = "postgresql", db.operation = "DDL");
        sqlx::query(statement)
            .execute(&mut *conn)
            .instrument(span)
            .await
            .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
    }
    Ok(())
}

/// Split a SQL script on statement-terminating `;` lines, dropping comments.
#[must_use]
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

/// `23505`, Postgres `unique_violation`.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}
