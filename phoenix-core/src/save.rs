//! Save snapshots: persistence decoding, schema migration and export tokens.
//!
//! Persisted saves are plain JSON objects. Restoring one runs it through an
//! explicit migration chain (one step per schema version) and then decodes
//! it over a fresh default state, so missing fields take defaults and
//! unknown fields are ignored. Export tokens are base64 over the same JSON.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::constants::GAME_VERSION;
use crate::numbers::{exact_integer, floor_f64_to_u64, non_negative};
use crate::state::PlayerState;
use crate::upgrades::UpgradeKey;

/// Failures while decoding a persisted save or an import token.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save token is not valid base64: {0}")]
    Token(#[from] base64::DecodeError),
    #[error("save token is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("save payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save payload must be a JSON object")]
    NotAnObject,
}

type Migration = fn(&mut Map<String, Value>);

/// Migration steps indexed by the version they upgrade *from*.
const MIGRATIONS: [Migration; GAME_VERSION as usize] = [migrate_v0_to_v1];

/// Pre-versioned saves: fill every economy field the v1 schema requires.
fn migrate_v0_to_v1(obj: &mut Map<String, Value>) {
    obj.entry("sparks").or_insert_with(|| Value::from(0.0));
    obj.entry("rebirths").or_insert_with(|| Value::from(0));
    obj.entry("phoenixAsh").or_insert_with(|| Value::from(0));
    obj.entry("upgrades")
        .or_insert_with(|| Value::Object(Map::new()));
    obj.insert("version".to_string(), Value::from(1));
}

fn stored_version(obj: &Map<String, Value>) -> u32 {
    obj.get("version")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Run every migration from the stored version up to [`GAME_VERSION`].
///
/// Saves from a newer schema pass through untouched.
pub fn migrate(mut obj: Map<String, Value>) -> Map<String, Value> {
    let from = stored_version(&obj);
    for (step_from, step) in MIGRATIONS.iter().enumerate().skip(from as usize) {
        log::debug!("migrating save from schema v{step_from}");
        step(&mut obj);
    }
    obj
}

/// Read a non-negative count, accepting whole or fractional JSON numbers.
fn count_field(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = obj.get(key)?;
    let count = value
        .as_u64()
        .or_else(|| value.as_f64().map(floor_f64_to_u64));
    if count.is_none() {
        log::debug!("ignoring mistyped save field '{key}': {value}");
    }
    count
}

fn timestamp_field(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = obj.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().and_then(|ms| exact_integer(ms.floor())))
}

/// Merge the fields of a migrated save over a fresh state, one at a time.
///
/// A field of the wrong type keeps its default; the rest of the save
/// survives.
fn merge_over_defaults(obj: &Map<String, Value>, now_ms: i64) -> PlayerState {
    let mut state = PlayerState::new(now_ms);
    if let Some(sparks) = obj.get("sparks").and_then(Value::as_f64) {
        state.sparks = non_negative(sparks);
    }
    state.rebirths = count_field(obj, "rebirths").unwrap_or(0);
    state.phoenix_ash = count_field(obj, "phoenixAsh").unwrap_or(0);
    if let Some(Value::Object(upgrades)) = obj.get("upgrades") {
        for raw_key in upgrades.keys() {
            let Ok(key) = raw_key.parse::<UpgradeKey>() else {
                log::debug!("dropping unknown upgrade '{raw_key}' from save");
                continue;
            };
            let level = count_field(upgrades, raw_key)
                .and_then(|lvl| u32::try_from(lvl).ok())
                .unwrap_or(0);
            state.upgrades.insert(key, level);
        }
    }
    if let Some(ms) = timestamp_field(obj, "lastTickMs").filter(|ms| *ms > 0) {
        state.last_tick_ms = ms;
    }
    state
}

fn decode_value(value: Value, now_ms: i64) -> Result<PlayerState, SaveError> {
    let Value::Object(obj) = value else {
        return Err(SaveError::NotAnObject);
    };
    Ok(merge_over_defaults(&migrate(obj), now_ms))
}

/// Restore a persisted JSON save.
///
/// Keeps the stored `lastTickMs` when it is positive, otherwise stamps
/// `now_ms`. The version is always the current schema version.
///
/// # Errors
///
/// Returns an error if the text is not a JSON object.
pub fn restore_save(json: &str, now_ms: i64) -> Result<PlayerState, SaveError> {
    decode_value(serde_json::from_str(json)?, now_ms)
}

/// Like [`restore_save`] but recovers from any failure with a fresh state.
#[must_use]
pub fn restore_or_default(json: Option<&str>, now_ms: i64) -> PlayerState {
    let Some(json) = json else {
        return PlayerState::new(now_ms);
    };
    restore_save(json, now_ms).unwrap_or_else(|err| {
        log::warn!("discarding unreadable save: {err}");
        PlayerState::new(now_ms)
    })
}

/// Serialize a state for persistence.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn persist_save(state: &PlayerState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

/// Encode a state as a portable text token.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_save(state: &PlayerState) -> Result<String, serde_json::Error> {
    Ok(STANDARD.encode(persist_save(state)?))
}

/// Decode an export token. The result is always stamped with `now_ms` so an
/// imported save never accrues backdated time.
///
/// # Errors
///
/// Returns an error for tokens that are not base64-encoded JSON save objects.
pub fn import_save(token: &str, now_ms: i64) -> Result<PlayerState, SaveError> {
    let bytes = STANDARD.decode(token.trim())?;
    let json = String::from_utf8(bytes)?;
    let mut state = restore_save(&json, now_ms)?;
    state.last_tick_ms = now_ms;
    Ok(state)
}
