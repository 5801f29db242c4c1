//! End-to-end flows through the public API: identify a caller, record meals,
//! read them back and compute metrics. Runs against an in-memory SQLite store.

use diet_core::error::DietError;
use diet_core::metrics::{owner_metrics, MealMetrics};
use diet_core::model::*;
use diet_core::session::identify;
use diet_core::storage::{MealStore, OwnerScope, SqliteStore};

fn meal(name: &str, occurred_at: i64, is_on_diet: bool) -> MealInput {
    MealInput::new(name, "Meal Description", occurred_at, is_on_diet)
}

#[tokio::test]
async fn test_three_meals_report_expected_metrics() {
    let store = SqliteStore::open_in_memory().unwrap();
    let caller = identify(None);
    assert!(caller.is_new);

    let now = 1_700_000_000_000;
    for (name, on_diet) in [("Meal 1", true), ("Meal 2", true), ("Meal 3", false)] {
        store
            .create_meal(&caller.session, &meal(name, now, on_diet))
            .await
            .unwrap();
    }

    let metrics = owner_metrics(&store, &caller.session).await.unwrap();
    assert_eq!(
        metrics,
        MealMetrics {
            total_meals: 3,
            meals_on_diet: 2,
            meals_off_diet: 1,
            best_on_diet_sequence: 2,
        }
    );
}

#[tokio::test]
async fn test_returning_caller_sees_own_meals_only() {
    let store = SqliteStore::open_in_memory().unwrap();
    let alice = identify(None).session;
    let bob = identify(None).session;

    store.create_meal(&alice, &meal("Oats", 1, true)).await.unwrap();
    store.create_meal(&bob, &meal("Pizza", 2, false)).await.unwrap();

    let returning = identify(Some(alice.as_str()));
    assert!(!returning.is_new);

    let meals = store.list_meals(&returning.session).await.unwrap();
    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].name, "Oats");
    assert!(meals.iter().all(|m| m.owner == alice));

    let bob_metrics = owner_metrics(&store, &bob).await.unwrap();
    assert_eq!(bob_metrics.total_meals, 1);
    assert_eq!(bob_metrics.best_on_diet_sequence, 0);
}

#[tokio::test]
async fn test_full_lifecycle() {
    let store = SqliteStore::open_in_memory().unwrap();
    let owner = identify(None).session;

    let id = store
        .create_meal(&owner, &meal("Meal", 10, true))
        .await
        .unwrap();

    store
        .update_meal(id, OwnerScope::Only(&owner), &meal("Apple", 20, false))
        .await
        .unwrap();
    let updated = store.get_meal(id, OwnerScope::Only(&owner)).await.unwrap();
    assert_eq!(updated.id, id);
    assert_eq!(updated.owner, owner);
    assert_eq!(updated.name, "Apple");

    let metrics = owner_metrics(&store, &owner).await.unwrap();
    assert_eq!(metrics.meals_off_diet, 1);

    store.delete_meal(id, OwnerScope::Only(&owner)).await.unwrap();
    let err = store.get_meal(id, OwnerScope::Any).await.unwrap_err();
    assert!(matches!(err, DietError::NotFound(_)));

    let metrics = owner_metrics(&store, &owner).await.unwrap();
    assert_eq!(metrics, MealMetrics::default());
}
