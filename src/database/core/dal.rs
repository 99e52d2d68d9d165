//! Data access layer
//!
//! [`Dal`] is the only path other components use to read or mutate persisted
//! state. It accepts statement text with positional placeholders plus a list of
//! scalar parameters, and returns either rows or an [`ExecuteSummary`].
//!
//! # Failure handling
//!
//! Every error is logged before it is returned. A connection-refused failure
//! makes the DAL re-establish the pool and retry the statement once, provided
//! the retry cannot apply a mutation twice:
//!
//! | Operation | Refused while acquiring | Refused by the statement |
//! |-----------|-------------------------|--------------------------|
//! | `query`   | retry                   | retry                    |
//! | `execute` | retry                   | surface to caller        |
//!
//! Constraint violations and malformed statements are never retried.

use anyhow::{anyhow, Result};
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::error::{classify, DbErrorKind};
use super::provider::ConnectionProvider;
use super::row::{ExecuteSummary, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Query,
    Execute,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Execute => "execute",
        }
    }
}

/// Where an attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Before the statement reached the engine
    Acquire,
    /// After the statement was dispatched
    Statement,
}

struct Failure {
    stage: Stage,
    error: anyhow::Error,
}

type StatementFn<T> = fn(&Connection, &str, &[Value]) -> Result<T>;

/// Query/execute front door over a [`ConnectionProvider`]
#[derive(Clone)]
pub struct Dal {
    provider: Arc<ConnectionProvider>,
}

impl Dal {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &ConnectionProvider {
        &self.provider
    }

    /// Run a read-only statement and collect the rows it yields
    ///
    /// Rows come back in engine order; add `ORDER BY` when order matters.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.run(Operation::Query, sql, params, run_query).await
    }

    /// Run an INSERT, UPDATE, DELETE or DDL statement
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecuteSummary> {
        self.run(Operation::Execute, sql, params, run_execute).await
    }

    /// Run a query expected to yield exactly one integer, e.g. `COUNT(*)`
    pub async fn query_scalar(&self, sql: &str, params: &[Value]) -> Result<i64> {
        let rows = self.query(sql, params).await?;
        let row = rows
            .first()
            .ok_or_else(|| anyhow!("Scalar query returned no rows"))?;
        row.get_index(0)
    }

    async fn run<T: Send + 'static>(
        &self,
        op: Operation,
        sql: &str,
        params: &[Value],
        f: StatementFn<T>,
    ) -> Result<T> {
        let failure = match self.attempt(sql, params, f).await {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };

        let kind = classify(&failure.error);
        error!(
            op = op.name(),
            kind = %kind,
            "Database {} error: {:#}",
            op.name(),
            failure.error
        );

        if kind != DbErrorKind::ConnectionRefused {
            return Err(failure.error);
        }

        if op == Operation::Execute && failure.stage == Stage::Statement {
            warn!("Not retrying execute: the statement may already have been applied");
            return Err(failure.error);
        }

        warn!("Retrying {} after connection retry...", op.name());
        if let Err(e) = self.provider.reconnect().await {
            error!(
                op = op.name(),
                kind = %classify(&e),
                "Database {} error: {:#}",
                op.name(),
                e
            );
            return Err(e);
        }

        match self.attempt(sql, params, f).await {
            Ok(value) => Ok(value),
            Err(retry) => {
                error!(
                    op = op.name(),
                    kind = %classify(&retry.error),
                    "Database {} error on retry: {:#}",
                    op.name(),
                    retry.error
                );
                Err(retry.error)
            }
        }
    }

    async fn attempt<T: Send + 'static>(
        &self,
        sql: &str,
        params: &[Value],
        f: StatementFn<T>,
    ) -> std::result::Result<T, Failure> {
        let conn = self
            .provider
            .get_connection()
            .await
            .map_err(|error| Failure {
                stage: Stage::Acquire,
                error,
            })?;

        debug!("dispatching statement: {}", sql.trim());
        let sql = sql.to_owned();
        let params = params.to_vec();

        tokio::task::spawn_blocking(move || f(&conn, &sql, &params))
            .await
            .map_err(|e| Failure {
                stage: Stage::Statement,
                error: anyhow!("Statement task failed: {}", e),
            })?
            .map_err(|error| Failure {
                stage: Stage::Statement,
                error,
            })
    }
}

fn run_query(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(sql.trim())?;
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = stmt.query(params_from_iter(params))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..columns.len())
            .map(|i| row.get::<_, Value>(i))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        out.push(Row::new(columns.clone(), values));
    }
    Ok(out)
}

fn run_execute(conn: &Connection, sql: &str, params: &[Value]) -> Result<ExecuteSummary> {
    let mut stmt = conn.prepare(sql.trim())?;
    let last_before = conn.last_insert_rowid();
    let rows_affected = stmt.execute(params_from_iter(params))?;
    let last_after = conn.last_insert_rowid();
    let inserted_id = (rows_affected > 0 && last_after != last_before).then_some(last_after);
    Ok(ExecuteSummary {
        rows_affected,
        inserted_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::provider::testing::{fast_options, FlakyConnector};
    use crate::sql_params;

    async fn setup(dir: &tempfile::TempDir) -> (Dal, Arc<FlakyConnector>) {
        let connector = Arc::new(FlakyConnector::new(&dir.path().join("dal.sqlite3"), 0));
        let provider = Arc::new(ConnectionProvider::new(connector.clone(), fast_options()));
        let dal = Dal::new(provider);
        dal.execute(
            "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE)",
            &[],
        )
        .await
        .unwrap();
        (dal, connector)
    }

    #[tokio::test]
    async fn test_execute_insert_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, _) = setup(&dir).await;

        let summary = dal
            .execute(
                "INSERT INTO items (name) VALUES (?1)",
                &sql_params!["first".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(
            summary,
            ExecuteSummary {
                rows_affected: 1,
                inserted_id: Some(1)
            }
        );

        let rows = dal
            .query("SELECT id, name FROM items WHERE id = ?1", &sql_params![1i64])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<String>("name").unwrap(), "first");
        assert_eq!(rows[0].columns(), &["id".to_string(), "name".to_string()]);
    }

    #[tokio::test]
    async fn test_inserted_id_ignores_statement_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, _) = setup(&dir).await;

        let summary = dal
            .execute("-- add one\nINSERT INTO items (name) VALUES ('commented')", &[])
            .await
            .unwrap();
        assert_eq!(summary.inserted_id, Some(1));

        let summary = dal
            .execute(
                "WITH src(n) AS (SELECT 'from-cte') INSERT INTO items (name) SELECT n FROM src",
                &[],
            )
            .await
            .unwrap();
        assert_eq!(
            summary,
            ExecuteSummary {
                rows_affected: 1,
                inserted_id: Some(2)
            }
        );

        let summary = dal
            .execute("DELETE FROM items WHERE name = 'commented'", &[])
            .await
            .unwrap();
        assert_eq!(summary.inserted_id, None);
    }

    #[tokio::test]
    async fn test_syntax_error_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, connector) = setup(&dir).await;

        let err = dal.execute("INSRT INTO items (name) VALUES ('x')", &[]).await.unwrap_err();
        assert_eq!(classify(&err), DbErrorKind::MalformedStatement);
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn test_update_has_no_inserted_id() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, _) = setup(&dir).await;
        dal.execute("INSERT INTO items (name) VALUES ('a'), ('b')", &[])
            .await
            .unwrap();

        let summary = dal
            .execute("UPDATE items SET name = name || '!'", &[])
            .await
            .unwrap();
        assert_eq!(summary.rows_affected, 2);
        assert_eq!(summary.inserted_id, None);
    }

    #[tokio::test]
    async fn test_constraint_violation_surfaces_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, connector) = setup(&dir).await;
        let params = sql_params!["dup".to_string()];
        dal.execute("INSERT INTO items (name) VALUES (?1)", &params)
            .await
            .unwrap();

        let err = dal
            .execute("INSERT INTO items (name) VALUES (?1)", &params)
            .await
            .unwrap_err();
        assert_eq!(classify(&err), DbErrorKind::ConstraintViolation);
        assert_eq!(dal.query_scalar("SELECT COUNT(*) FROM items", &[]).await.unwrap(), 1);
        // no reconnect happened
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn test_malformed_statement() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, _) = setup(&dir).await;

        let err = dal.query("SELECT * FROM nowhere", &[]).await.unwrap_err();
        assert_eq!(classify(&err), DbErrorKind::MalformedStatement);

        let err = dal
            .execute("INSERT INTO items (name) VALUES (?1)", &[])
            .await
            .unwrap_err();
        assert_ne!(classify(&err), DbErrorKind::ConnectionRefused);
    }

    #[tokio::test]
    async fn test_query_retries_after_refused_connection() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, connector) = setup(&dir).await;
        dal.execute("INSERT INTO items (name) VALUES ('kept')", &[])
            .await
            .unwrap();

        // hold the only idle connection so the next call must open a new one
        let held = dal.provider().get_connection().await.unwrap();
        connector.fail_next(1);
        let before = connector.attempts();

        let rows = dal.query("SELECT name FROM items", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<String>("name").unwrap(), "kept");
        // failed open, then the rebuilt pool's first connection
        assert_eq!(connector.attempts(), before + 2);
        drop(held);
    }

    #[tokio::test]
    async fn test_query_retry_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, connector) = setup(&dir).await;

        let held = dal.provider().get_connection().await.unwrap();
        // acquire fails, then both pool-creation attempts fail
        connector.fail_next(3);

        let err = dal.query("SELECT name FROM items", &[]).await.unwrap_err();
        assert_eq!(classify(&err), DbErrorKind::ConnectionRefused);
        drop(held);
    }

    #[tokio::test]
    async fn test_execute_retries_when_refused_before_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, connector) = setup(&dir).await;

        let held = dal.provider().get_connection().await.unwrap();
        connector.fail_next(1);

        let summary = dal
            .execute("INSERT INTO items (name) VALUES ('once')", &[])
            .await
            .unwrap();
        assert_eq!(summary.rows_affected, 1);
        drop(held);

        let count = dal
            .query_scalar("SELECT COUNT(*) FROM items WHERE name = 'once'", &[])
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_execute_not_retried_after_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, connector) = setup(&dir).await;
        let before = connector.attempts();

        // ATTACH of an unreachable file fails with SQLITE_CANTOPEN inside the statement
        let err = dal
            .execute(
                "ATTACH DATABASE '/nonexistent-librarylook-dir/other.db' AS other",
                &[],
            )
            .await
            .unwrap_err();
        assert_eq!(classify(&err), DbErrorKind::ConnectionRefused);
        assert_eq!(connector.attempts(), before);
    }

    #[tokio::test]
    async fn test_query_scalar_requires_a_row() {
        let dir = tempfile::tempdir().unwrap();
        let (dal, _) = setup(&dir).await;

        assert!(dal
            .query_scalar("SELECT id FROM items WHERE 0", &[])
            .await
            .is_err());
    }
}
