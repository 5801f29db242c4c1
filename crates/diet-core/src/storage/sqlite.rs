use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{MealStore, OwnerScope};
use crate::error::{DietError, Result};
use crate::model::*;

const MEAL_COLUMNS: &str = "id, owner, name, description, occurred_at, is_on_diet";

/// SQLite-backed meal store.
///
/// Uses a single `Connection` behind `Arc<Mutex<>>` so it can be shared
/// across async tasks. All blocking SQLite calls go through
/// [`with_conn`](Self::with_conn) which runs them on the Tokio blocking
/// thread-pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) a file-backed SQLite database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)
            .map_err(|e| DietError::Storage(format!("failed to open SQLite database: {e}")))?;

        Self::configure_and_init(conn, path)
    }

    /// Open an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DietError::Storage(format!("failed to open in-memory SQLite database: {e}"))
        })?;

        Self::configure_and_init(conn, PathBuf::from(":memory:"))
    }

    /// Return the path this database was opened with (`:memory:` for in-memory).
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ── helpers ────────────────────────────────────────────────────────

    fn configure_and_init(conn: Connection, path: PathBuf) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| DietError::Storage(format!("failed to set WAL mode: {e}")))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };

        store.create_tables()?;
        Ok(store)
    }

    /// Create all tables and indexes (idempotent).
    fn create_tables(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DietError::Storage(format!("failed to acquire database lock: {e}")))?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS meals (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                owner TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                occurred_at INTEGER NOT NULL,
                is_on_diet INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
                session_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_meals_owner ON meals(owner);
            CREATE INDEX IF NOT EXISTS idx_meals_owner_occurred_at ON meals(owner, occurred_at DESC);
            ",
        )
        .map_err(|e| DietError::Storage(format!("failed to create tables: {e}")))?;

        Ok(())
    }

    /// Run a blocking closure against the SQLite connection on the Tokio
    /// blocking thread-pool.
    pub(crate) async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| DietError::Storage(format!("failed to acquire database lock: {e}")))?;
            f(&conn)
        })
        .await
        .map_err(|e| DietError::Storage(format!("task join error: {e}")))?
    }

    fn query_meals(conn: &Connection, sql: &str, owner: &str) -> Result<Vec<Meal>> {
        let mut stmt = conn.prepare(sql)?;
        let meals = stmt
            .query_map(params![owner], row_to_meal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(meals)
    }
}

fn row_to_meal(row: &Row<'_>) -> rusqlite::Result<Meal> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let owner: String = row.get(1)?;
    let owner = SessionId::parse(&owner).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(DietError::Storage(format!("invalid owner token '{owner}'"))),
        )
    })?;

    Ok(Meal {
        id,
        owner,
        name: row.get(2)?,
        description: row.get(3)?,
        occurred_at: row.get(4)?,
        is_on_diet: row.get(5)?,
    })
}

fn not_found(id: Uuid) -> DietError {
    DietError::NotFound(format!("meal {id}"))
}

impl MealStore for SqliteStore {
    async fn create_meal(&self, owner: &SessionId, input: &MealInput) -> Result<Uuid> {
        let meal = Meal::new(owner.clone(), input.clone());
        let id = meal.id;

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO meals (id, owner, name, description, occurred_at, is_on_diet, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    meal.id.to_string(),
                    meal.owner.as_str(),
                    meal.name,
                    meal.description,
                    meal.occurred_at,
                    meal.is_on_diet,
                    Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await?;

        tracing::info!(meal_id = %id, owner = %owner, "meal created");
        Ok(id)
    }

    async fn list_meals(&self, owner: &SessionId) -> Result<Vec<Meal>> {
        let owner = owner.as_str().to_string();
        self.with_conn(move |conn| {
            Self::query_meals(
                conn,
                &format!("SELECT {MEAL_COLUMNS} FROM meals WHERE owner = ?1 ORDER BY seq ASC"),
                &owner,
            )
        })
        .await
    }

    async fn get_meal(&self, id: Uuid, scope: OwnerScope<'_>) -> Result<Meal> {
        let owner = scope.owner();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {MEAL_COLUMNS} FROM meals
                     WHERE id = ?1 AND (?2 IS NULL OR owner = ?2)"
                ),
                params![id.to_string(), owner],
                row_to_meal,
            )
            .optional()?
            .ok_or_else(|| not_found(id))
        })
        .await
    }

    async fn update_meal(&self, id: Uuid, scope: OwnerScope<'_>, input: &MealInput) -> Result<()> {
        let owner = scope.owner();
        let input = input.clone();
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE meals SET name = ?1, description = ?2, occurred_at = ?3, is_on_diet = ?4
                 WHERE id = ?5 AND (?6 IS NULL OR owner = ?6)",
                params![
                    input.name,
                    input.description,
                    input.occurred_at,
                    input.is_on_diet,
                    id.to_string(),
                    owner,
                ],
            )?;
            if changed == 0 {
                return Err(not_found(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_meal(&self, id: Uuid, scope: OwnerScope<'_>) -> Result<()> {
        let owner = scope.owner();
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM meals WHERE id = ?1 AND (?2 IS NULL OR owner = ?2)",
                params![id.to_string(), owner],
            )?;
            if removed == 0 {
                return Err(not_found(id));
            }
            Ok(())
        })
        .await?;

        tracing::info!(meal_id = %id, "meal deleted");
        Ok(())
    }

    async fn ordered_history(&self, owner: &SessionId) -> Result<Vec<Meal>> {
        let owner = owner.as_str().to_string();
        self.with_conn(move |conn| {
            Self::query_meals(
                conn,
                &format!(
                    "SELECT {MEAL_COLUMNS} FROM meals WHERE owner = ?1
                     ORDER BY occurred_at DESC, seq ASC"
                ),
                &owner,
            )
        })
        .await
    }

    async fn save_profile(&self, session: &SessionId, profile: &UserProfile) -> Result<()> {
        let session = session.as_str().to_string();
        let profile = profile.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO users (session_id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(session_id) DO UPDATE SET
                    name = excluded.name,
                    email = excluded.email,
                    created_at = excluded.created_at",
                params![
                    session,
                    profile.name,
                    profile.email,
                    profile.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_profile(&self, session: &SessionId) -> Result<UserProfile> {
        let key = session.as_str().to_string();
        let row = self
            .with_conn(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT name, email, created_at FROM users WHERE session_id = ?1",
                        params![key],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, String>(2)?,
                            ))
                        },
                    )
                    .optional()?;
                Ok(row)
            })
            .await?;

        let (name, email, created_at) =
            row.ok_or_else(|| DietError::NotFound(format!("profile for session {session}")))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DietError::Storage(format!("corrupt profile timestamp: {e}")))?;

        Ok(UserProfile {
            name,
            email,
            created_at,
        })
    }

    async fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}
