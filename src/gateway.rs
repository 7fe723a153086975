//! Single point of contact with the SQLite store.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use serde_json::{Map, Number, Value};

use crate::db;
use crate::error::GatewayError;

pub use rusqlite::types::Value as Param;

/// Column name to value, one per result row.
pub type Row = Map<String, Value>;

pub fn text(s: impl Into<String>) -> Param {
    Param::Text(s.into())
}

/// A managed session. If the database cannot be opened the gateway stays
/// disconnected and every later call retries the open once before failing
/// with [`GatewayError::NotConnected`].
#[derive(Debug)]
pub struct Gateway {
    path: PathBuf,
    conn: Option<Connection>,
}

impl Gateway {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let conn = match db::open_db(&path) {
            Ok(conn) => {
                tracing::info!(path = %path.display(), "connected to database");
                Some(conn)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "database connection failed");
                None
            }
        };
        Self { path, conn }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn connection(&mut self) -> Result<&Connection, GatewayError> {
        if self.conn.is_none() {
            match db::open_db(&self.path) {
                Ok(conn) => {
                    tracing::info!(path = %self.path.display(), "reconnected to database");
                    self.conn = Some(conn);
                }
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "reconnect failed");
                    return Err(GatewayError::NotConnected {
                        path: self.path.clone(),
                    });
                }
            }
        }
        self.conn.as_ref().ok_or_else(|| GatewayError::NotConnected {
            path: self.path.clone(),
        })
    }

    /// Runs one mutating statement and commits it. Returns the number of
    /// affected rows.
    pub fn execute(&mut self, sql: &str, params: &[Param]) -> Result<usize, GatewayError> {
        let conn = self.connection()?;
        let run = || -> Result<usize, rusqlite::Error> {
            let tx = conn.unchecked_transaction()?;
            let changed = tx.execute(sql, params_from_iter(params.iter()))?;
            tx.commit()?;
            Ok(changed)
        };
        match run() {
            Ok(changed) => {
                tracing::debug!(sql, changed, "statement executed");
                Ok(changed)
            }
            Err(e) => {
                tracing::error!(sql, error = %e, "execution error");
                Err(e.into())
            }
        }
    }

    /// Runs a SELECT. An empty vector means no rows; a failed query is an
    /// `Err`, never an empty result.
    pub fn fetch(&mut self, sql: &str, params: &[Param]) -> Result<Vec<Row>, GatewayError> {
        let conn = self.connection()?;
        let run = || -> Result<Vec<Row>, rusqlite::Error> {
            let mut stmt = conn.prepare(sql)?;
            let names: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let rows = stmt
                .query_map(params_from_iter(params.iter()), |row| {
                    let mut out = Row::new();
                    for (i, name) in names.iter().enumerate() {
                        out.insert(name.clone(), to_json(row.get_ref(i)?));
                    }
                    Ok(out)
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        };
        run().map_err(|e| {
            tracing::error!(sql, error = %e, "fetch error");
            e.into()
        })
    }

    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            match conn.close() {
                Ok(()) => tracing::info!(path = %self.path.display(), "database connection closed"),
                Err((_, e)) => tracing::warn!(error = %e, "database close failed"),
            }
        }
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.close();
    }
}

fn to_json(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Array(b.iter().map(|x| Value::from(*x)).collect()),
    }
}
