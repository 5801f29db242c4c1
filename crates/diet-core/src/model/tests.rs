use crate::model::meal::{validate_meal_input, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH};
use crate::model::session::validate_profile_input;
use crate::model::*;

fn lunch() -> MealInput {
    MealInput::new("Lunch", "Rice and beans", 1_700_000_000_000, true)
}

#[test]
fn test_meal_creation() {
    let owner = SessionId::mint();
    let meal = Meal::new(owner.clone(), lunch());

    assert_eq!(meal.owner, owner);
    assert_eq!(meal.name, "Lunch");
    assert_eq!(meal.description, "Rice and beans");
    assert_eq!(meal.occurred_at, 1_700_000_000_000);
    assert!(meal.is_on_diet);
}

#[test]
fn test_identical_inputs_get_distinct_ids() {
    let owner = SessionId::mint();
    let a = Meal::new(owner.clone(), lunch());
    let b = Meal::new(owner, lunch());
    assert_ne!(a.id, b.id);
}

#[test]
fn test_meal_json_is_camel_case() {
    let meal = Meal::new(SessionId::parse("owner-1").unwrap(), lunch());
    let json = serde_json::to_value(&meal).unwrap();
    assert_eq!(json["owner"], "owner-1");
    assert_eq!(json["occurredAt"], 1_700_000_000_000_i64);
    assert_eq!(json["isOnDiet"], true);
    assert!(json.get("is_on_diet").is_none());
}

#[test]
fn test_input_accepts_epoch_millis() {
    let json = r#"{"name":"M","description":"d","occurredAt":1700000000000,"isOnDiet":true}"#;
    let input: MealInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.occurred_at, 1_700_000_000_000);
}

#[test]
fn test_input_accepts_rfc3339_date_alias() {
    let json = r#"{"name":"M","description":"d","date":"2023-11-14T22:13:20Z","isOnDiet":false}"#;
    let input: MealInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.occurred_at, 1_700_000_000_000);
    assert!(!input.is_on_diet);
}

#[test]
fn test_input_accepts_offset_date() {
    let json = r#"{"name":"M","description":"d","date":"2023-11-15T00:13:20+02:00","isOnDiet":true}"#;
    let input: MealInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.occurred_at, 1_700_000_000_000);
}

#[test]
fn test_input_rejects_garbage_date() {
    let json = r#"{"name":"M","description":"d","date":"yesterday","isOnDiet":true}"#;
    assert!(serde_json::from_str::<MealInput>(json).is_err());
}

#[test]
fn test_input_requires_on_diet_flag() {
    let json = r#"{"name":"M","description":"d","date":0}"#;
    assert!(serde_json::from_str::<MealInput>(json).is_err());
}

#[test]
fn test_parse_instant_numeric_string() {
    assert_eq!(parse_instant(" 42 ").unwrap(), 42);
}

#[test]
fn test_parse_instant_date_only_is_utc_midnight() {
    assert_eq!(parse_instant("2023-11-14").unwrap(), 1_699_920_000_000);
    assert_eq!(parse_instant("1970-01-01").unwrap(), 0);
}

#[test]
fn test_input_accepts_date_only_string() {
    let json = r#"{"name":"M","description":"d","date":"2023-11-14","isOnDiet":true}"#;
    let input: MealInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.occurred_at, 1_699_920_000_000);
}

#[test]
fn test_input_rejects_out_of_range_dates() {
    for date in [
        "1e30",
        "-1e30",
        "18446744073709551615",
        "8640000000000001",
        "-8640000000000001",
        "9223372036854775807",
        "\"9223372036854775807\"",
    ] {
        let json = format!(r#"{{"name":"M","description":"d","date":{date},"isOnDiet":true}}"#);
        assert!(
            serde_json::from_str::<MealInput>(&json).is_err(),
            "date {date} should be rejected"
        );
    }
}

#[test]
fn test_input_accepts_range_boundaries() {
    for (date, expected) in [
        ("8640000000000000", MAX_INSTANT_MILLIS),
        ("-8640000000000000", -MAX_INSTANT_MILLIS),
        ("1700000000000.9", 1_700_000_000_000),
    ] {
        let json = format!(r#"{{"name":"M","description":"d","date":{date},"isOnDiet":true}}"#);
        let input: MealInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input.occurred_at, expected);
    }
}

#[test]
fn test_checked_instant_rejects_beyond_range() {
    assert!(checked_instant(MAX_INSTANT_MILLIS).is_ok());
    assert!(checked_instant(MAX_INSTANT_MILLIS + 1).is_err());
    assert!(checked_instant(i64::MIN).is_err());
}

#[test]
fn test_validate_meal_input_ok() {
    assert!(validate_meal_input(&lunch()).is_ok());
}

#[test]
fn test_validate_meal_input_empty_name() {
    let input = MealInput::new("   ", "d", 0, true);
    let err = validate_meal_input(&input).unwrap_err();
    assert!(err.to_string().contains("name cannot be empty"));
}

#[test]
fn test_validate_meal_input_long_name() {
    let input = MealInput::new("x".repeat(MAX_NAME_LENGTH + 1), "d", 0, true);
    assert!(validate_meal_input(&input).is_err());

    let input = MealInput::new("x".repeat(MAX_NAME_LENGTH), "d", 0, true);
    assert!(validate_meal_input(&input).is_ok());
}

#[test]
fn test_validate_meal_input_long_description() {
    let input = MealInput::new("M", "x".repeat(MAX_DESCRIPTION_LENGTH + 1), 0, true);
    assert!(validate_meal_input(&input).is_err());
}

#[test]
fn test_empty_description_is_allowed() {
    let input = MealInput::new("M", "", 0, false);
    assert!(validate_meal_input(&input).is_ok());
}

#[test]
fn test_session_id_serializes_as_plain_string() {
    let id = SessionId::parse("abc").unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
}

#[test]
fn test_validate_profile_input() {
    assert!(validate_profile_input("User", "user@example.com").is_ok());
    assert!(validate_profile_input("", "user@example.com").is_err());
    assert!(validate_profile_input("User", "not-an-email").is_err());
    assert!(validate_profile_input("User", "user@localhost").is_err());
    assert!(validate_profile_input("User", "@example.com").is_err());
    assert!(validate_profile_input("User", "a@b@example.com").is_err());
    assert!(validate_profile_input("User", "us er@example.com").is_err());
}
