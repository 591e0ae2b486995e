use pretty_assertions::assert_eq;
use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use seller_finance_core::scenarios::{JsonFileScenarioRepository, ScenarioRepository};
use seller_finance_core::share::{decode_share_link, encode_share_link, inputs_from_url, share_url};
use seller_finance_core::{CalcError, DealInputs};
use std::fs;

// ===========================================================================
// JSON file repository
// ===========================================================================

#[test]
fn test_file_repository_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("scenarios.json");
    let mut repo = JsonFileScenarioRepository::new(&path);

    assert!(repo.load_all().unwrap().is_empty());

    let mut inputs = DealInputs::default();
    inputs.interest_rate = dec!(7.125);
    repo.save("Oak Street", &inputs).unwrap();
    repo.save("Elm Street", &DealInputs::default()).unwrap();
    assert!(path.exists());

    // A fresh handle sees the same data
    let reopened = JsonFileScenarioRepository::new(&path);
    let all = reopened.load_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Elm Street");
    assert_eq!(all[1].inputs, inputs);

    assert!(repo.delete("Elm Street").unwrap());
    assert_eq!(repo.load_all().unwrap().len(), 1);
    assert!(!repo.delete("Elm Street").unwrap());
}

#[test]
fn test_file_repository_overwrites_same_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = JsonFileScenarioRepository::new(dir.path().join("scenarios.json"));

    repo.save("deal", &DealInputs::default()).unwrap();
    let mut changed = DealInputs::default();
    changed.balloon = dec!(250_000);
    repo.save("deal", &changed).unwrap();

    let loaded = repo.load("deal").unwrap().unwrap();
    assert_eq!(loaded.inputs.balloon, dec!(250_000));
    assert_eq!(repo.load_all().unwrap().len(), 1);
}

#[test]
fn test_file_repository_corrupt_file_reads_empty_but_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenarios.json");
    fs::write(&path, "{ this is not json").unwrap();

    let mut repo = JsonFileScenarioRepository::new(&path);
    assert!(repo.load_all().unwrap().is_empty());

    // Writing would discard whatever the file still holds
    let err = repo.save("fresh", &DealInputs::default()).unwrap_err();
    assert!(matches!(err, CalcError::Storage(_)));
    assert!(repo.delete("fresh").is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ this is not json");
}

#[test]
fn test_file_repository_bad_timestamp_keeps_other_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenarios.json");
    fs::write(
        &path,
        r#"{
            "Elm": {"inputs": {"price": "800000"}, "saved_at": "yesterday"},
            "Oak": {"inputs": {"price": "900000"}, "saved_at": "2024-05-01T12:00:00Z"}
        }"#,
    )
    .unwrap();

    let mut repo = JsonFileScenarioRepository::new(&path);
    let all = repo.load_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].inputs.price, dec!(800_000));
    assert_eq!(all[0].saved_at, DateTime::<Utc>::default());

    repo.save("Pine", &DealInputs::default()).unwrap();
    let names: Vec<String> = repo.load_all().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Elm", "Oak", "Pine"]);
}

#[test]
fn test_share_link_keeps_long_holdback_horizon() {
    let mut inputs = DealInputs::default();
    inputs.holdback_release_months = 5000;
    let token = encode_share_link(&inputs).unwrap();
    assert_eq!(decode_share_link(&token).unwrap(), inputs);

    inputs.holdback_release_months = u32::MAX;
    let token = encode_share_link(&inputs).unwrap();
    assert_eq!(decode_share_link(&token).unwrap(), inputs);
}

#[test]
fn test_file_repository_bad_field_uses_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenarios.json");
    fs::write(
        &path,
        r#"{"hand edited": {"inputs": {"price": "oops", "basis": 500000}}}"#,
    )
    .unwrap();

    let repo = JsonFileScenarioRepository::new(&path);
    let all = repo.load_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].inputs.price, DealInputs::default().price);
    assert_eq!(all[0].inputs.basis, dec!(500_000));
}

// ===========================================================================
// Share links
// ===========================================================================

#[test]
fn test_share_link_round_trip_law() {
    let mut inputs = DealInputs::default();
    inputs.price = dec!(987_654.32);
    inputs.term_years = dec!(7.5);
    inputs.discount_rate = dec!(0);
    let token = encode_share_link(&inputs).unwrap();
    assert_eq!(decode_share_link(&token).unwrap(), inputs);
}

#[test]
fn test_share_url_keeps_prior_on_bad_token() {
    let prior = DealInputs {
        price: dec!(42),
        ..DealInputs::default()
    };
    assert_eq!(inputs_from_url("https://x.test/?s=@@@", &prior), prior);

    let url = share_url("https://x.test/calc", &DealInputs::default()).unwrap();
    assert_eq!(inputs_from_url(&url, &prior), DealInputs::default());
}
