mod sqlite;

pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::config::StorageConfig;
use crate::error::{DietError, Result};
use crate::model::*;
use uuid::Uuid;

/// Which callers an id-scoped operation (get/update/delete) applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope<'a> {
    /// Any holder of the id. Records of other sessions are reachable.
    Any,
    /// Only records owned by this session. Others look like they don't exist.
    Only(&'a SessionId),
}

impl OwnerScope<'_> {
    pub(crate) fn owner(&self) -> Option<String> {
        match self {
            Self::Any => None,
            Self::Only(session) => Some(session.as_str().to_string()),
        }
    }
}

/// Persistence for meal records and session profiles.
///
/// `update_meal` and `delete_meal` are single conditional statements: they
/// report [`DietError::NotFound`] when no row matched and leave the store
/// untouched in that case.
pub trait MealStore: Send + Sync {
    // -- Meal CRUD --

    /// Persist a new meal for `owner`, returning its freshly assigned id.
    fn create_meal(
        &self,
        owner: &SessionId,
        input: &MealInput,
    ) -> impl std::future::Future<Output = Result<Uuid>> + Send;

    /// All of `owner`'s meals in insertion order.
    fn list_meals(
        &self,
        owner: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<Meal>>> + Send;

    fn get_meal(
        &self,
        id: Uuid,
        scope: OwnerScope<'_>,
    ) -> impl std::future::Future<Output = Result<Meal>> + Send;

    fn update_meal(
        &self,
        id: Uuid,
        scope: OwnerScope<'_>,
        input: &MealInput,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn delete_meal(
        &self,
        id: Uuid,
        scope: OwnerScope<'_>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    // -- Metrics --

    /// All of `owner`'s meals, most recent `occurred_at` first; ties keep
    /// insertion order. This is the order the streak is measured in.
    fn ordered_history(
        &self,
        owner: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<Meal>>> + Send;

    // -- Profiles --

    /// Create or replace the profile registered for `session`.
    fn save_profile(
        &self,
        session: &SessionId,
        profile: &UserProfile,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn get_profile(
        &self,
        session: &SessionId,
    ) -> impl std::future::Future<Output = Result<UserProfile>> + Send;

    // -- Health --

    fn ping(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Open the configured SQLite store.
pub fn open_store(config: &StorageConfig) -> Result<SqliteStore> {
    match config.path.as_deref() {
        Some(":memory:") => SqliteStore::open_in_memory(),
        Some(path) => SqliteStore::open(path),
        None => {
            let path = default_sqlite_path()?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DietError::Storage(format!("failed to create data directory: {e}"))
                })?;
            }
            SqliteStore::open(path)
        }
    }
}

/// Default SQLite path: `~/.config/daily-diet/diet.db`
fn default_sqlite_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("daily-diet").join("diet.db"))
        .ok_or_else(|| DietError::Config("cannot determine config directory".to_string()))
}
