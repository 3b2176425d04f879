//! SQLite-backed explored point store.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use super::{BoxFuture, ExploredStore, StoreError};
use crate::coord::Coordinate;
use crate::model::{from_millis, ExploredPoint, NewPoint};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS explored_points (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        timestamp INTEGER NOT NULL
    );
";

/// Explored point store backed by a single SQLite connection.
///
/// The connection sits behind a mutex and every statement runs on tokio's
/// blocking pool, so statements never overlap and never stall the reactor.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    label: String,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the table exists.
    ///
    /// Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn, path.display().to_string())?;
        info!(path = %path.display(), "Opened explored point database");
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, ":memory:".to_string())
    }

    fn from_connection(conn: Connection, label: String) -> Result<Self, StoreError> {
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            label,
        })
    }

    /// Location of the database, or `:memory:`.
    pub fn location(&self) -> &str {
        &self.label
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("location", &self.label)
            .finish()
    }
}

fn insert_row(conn: &mut Connection, point: NewPoint) -> Result<ExploredPoint, StoreError> {
    conn.execute(
        "INSERT INTO explored_points (latitude, longitude, timestamp) VALUES (?1, ?2, ?3)",
        params![
            point.coordinate.latitude(),
            point.coordinate.longitude(),
            point.recorded_at.timestamp_millis()
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, coordinate = %point.coordinate, "Inserted explored point");
    Ok(ExploredPoint::from_new(id, point))
}

fn select_all(conn: &mut Connection) -> Result<Vec<ExploredPoint>, StoreError> {
    let mut stmt = conn
        .prepare("SELECT id, latitude, longitude, timestamp FROM explored_points ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, f64>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, i64>(3)?,
        ))
    })?;

    let mut points = Vec::new();
    for row in rows {
        let (id, lat, lon, ts) = row?;
        let coordinate = Coordinate::new(lat, lon).map_err(|e| StoreError::CorruptRow {
            id,
            reason: e.to_string(),
        })?;
        points.push(ExploredPoint {
            id,
            coordinate,
            recorded_at: from_millis(ts),
        });
    }
    Ok(points)
}

fn delete_rows(conn: &mut Connection) -> Result<u64, StoreError> {
    let removed = conn.execute("DELETE FROM explored_points", [])?;
    Ok(removed as u64)
}

impl ExploredStore for SqliteStore {
    fn insert(&self, point: NewPoint) -> BoxFuture<'_, Result<ExploredPoint, StoreError>> {
        Box::pin(self.with_conn(move |conn| insert_row(conn, point)))
    }

    fn load_all(&self) -> BoxFuture<'_, Result<Vec<ExploredPoint>, StoreError>> {
        Box::pin(self.with_conn(select_all))
    }

    fn delete_all(&self) -> BoxFuture<'_, Result<u64, StoreError>> {
        Box::pin(self.with_conn(delete_rows))
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
