use phoenix_core::{
    GAME_VERSION, PlayerState, SaveError, UpgradeKey, export_save, import_save,
    restore_or_default, restore_save,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SAMPLE_SIZE: usize = 200;

#[test]
fn export_then_import_keeps_progress() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5A7E);
    for _ in 0..SAMPLE_SIZE {
        let mut state = PlayerState::new(rng.gen_range(1..1_000_000));
        state.sparks = rng.gen_range(0.0..1e12);
        state.rebirths = rng.gen_range(0..100);
        state.phoenix_ash = rng.gen_range(0..10_000);
        for key in UpgradeKey::ALL {
            state.upgrades.insert(key, rng.gen_range(0..200));
        }

        let token = export_save(&state).unwrap();
        let now = state.last_tick_ms + rng.gen_range(1..10_000_000);
        let imported = import_save(&token, now).unwrap();

        assert!((imported.sparks - state.sparks).abs() <= 1e-9 * state.sparks.max(1.0));
        assert_eq!(imported.rebirths, state.rebirths);
        assert_eq!(imported.phoenix_ash, state.phoenix_ash);
        assert_eq!(imported.upgrades, state.upgrades);
        assert_eq!(imported.last_tick_ms, now);
        assert_eq!(imported.version, GAME_VERSION);
    }
}

#[test]
fn persisted_json_uses_camel_case_fields() {
    let mut state = PlayerState::new(1_234);
    state.phoenix_ash = 3;
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["phoenixAsh"], 3);
    assert_eq!(json["lastTickMs"], 1_234);
    assert_eq!(json["upgrades"]["flare"], 0);
}

#[test]
fn legacy_save_without_version_restores() {
    let legacy = r#"{ "sparks": 900, "upgrades": { "feather": 2 }, "lastTickMs": 0 }"#;
    let state = restore_save(legacy, 77).unwrap();
    assert_eq!(state.version, GAME_VERSION);
    assert_eq!(state.level(UpgradeKey::Feather), 2);
    assert_eq!(state.level(UpgradeKey::Spark), 0);
    assert_eq!(state.last_tick_ms, 77);
}

#[test]
fn malformed_inputs_are_reported_or_recovered() {
    assert!(matches!(import_save("not base64!", 1), Err(SaveError::Token(_))));
    assert!(restore_save("{", 1).is_err());
    assert_eq!(restore_or_default(Some("{"), 9), PlayerState::new(9));
}
