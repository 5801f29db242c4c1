use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Meal, SessionId};
use crate::storage::MealStore;

/// Aggregate nutrition statistics for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealMetrics {
    pub total_meals: usize,
    pub meals_on_diet: usize,
    pub meals_off_diet: usize,
    pub best_on_diet_sequence: usize,
}

impl MealMetrics {
    /// Compute metrics over a history already in streak order
    /// (most recent first, see [`MealStore::ordered_history`]).
    pub fn from_history(history: &[Meal]) -> Self {
        let meals_on_diet = history.iter().filter(|m| m.is_on_diet).count();
        Self {
            total_meals: history.len(),
            meals_on_diet,
            meals_off_diet: history.len() - meals_on_diet,
            best_on_diet_sequence: best_on_diet_sequence(history.iter().map(|m| m.is_on_diet)),
        }
    }
}

/// Longest run of adjacent `true` flags.
///
/// Adjacency is positional in the given order, not calendar adjacency.
pub fn best_on_diet_sequence(flags: impl IntoIterator<Item = bool>) -> usize {
    let (_, best) = flags
        .into_iter()
        .fold((0usize, 0usize), |(current, best), on_diet| {
            let current = if on_diet { current + 1 } else { 0 };
            (current, best.max(current))
        });
    best
}

/// Metrics for everything `owner` has recorded.
pub async fn owner_metrics(store: &impl MealStore, owner: &SessionId) -> Result<MealMetrics> {
    let history = store.ordered_history(owner).await?;
    Ok(MealMetrics::from_history(&history))
}
