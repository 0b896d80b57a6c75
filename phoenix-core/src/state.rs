//! Player economy state
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::GAME_VERSION;
use crate::upgrades::UpgradeKey;

/// Complete economy snapshot for one player.
///
/// Serialized field names match the persisted save format
/// (`version`, `sparks`, `rebirths`, `phoenixAsh`, `upgrades`, `lastTickMs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub version: u32,
    /// Spendable resource balance; never negative.
    pub sparks: f64,
    pub rebirths: u64,
    /// Permanent prestige currency; only ever grows.
    pub phoenix_ash: u64,
    /// Purchased level per upgrade. Missing keys read as level 0.
    pub upgrades: BTreeMap<UpgradeKey, u32>,
    /// Wall-clock milliseconds of the last accrual.
    pub last_tick_ms: i64,
}

impl PlayerState {
    /// Fresh economy with every upgrade at level 0.
    #[must_use]
    pub fn new(now_ms: i64) -> Self {
        Self {
            version: GAME_VERSION,
            sparks: 0.0,
            rebirths: 0,
            phoenix_ash: 0,
            upgrades: zeroed_upgrades(),
            last_tick_ms: now_ms,
        }
    }

    /// Purchased level of `key`, 0 when never bought.
    #[must_use]
    pub fn level(&self, key: UpgradeKey) -> u32 {
        self.upgrades.get(&key).copied().unwrap_or(0)
    }

    /// Total purchased levels across the catalog.
    #[must_use]
    pub fn total_levels(&self) -> u64 {
        self.upgrades.values().map(|&lvl| u64::from(lvl)).sum()
    }
}

pub(crate) fn zeroed_upgrades() -> BTreeMap<UpgradeKey, u32> {
    UpgradeKey::ALL.into_iter().map(|key| (key, 0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_zeroed() {
        let state = PlayerState::new(1_234);
        assert_eq!(state.version, GAME_VERSION);
        assert_eq!(state.last_tick_ms, 1_234);
        assert_eq!(state.rebirths, 0);
        assert_eq!(state.phoenix_ash, 0);
        assert!(state.sparks.abs() < f64::EPSILON);
        for key in UpgradeKey::ALL {
            assert_eq!(state.level(key), 0);
        }
    }

    #[test]
    fn missing_upgrade_reads_as_zero() {
        let mut state = PlayerState::new(0);
        state.upgrades.clear();
        assert_eq!(state.level(UpgradeKey::Flare), 0);
        assert_eq!(state.total_levels(), 0);
    }

    #[test]
    fn serializes_with_save_field_names() {
        let mut state = PlayerState::new(99);
        state.phoenix_ash = 3;
        state.upgrades.insert(UpgradeKey::Spark, 2);
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["phoenixAsh"], 3);
        assert_eq!(value["lastTickMs"], 99);
        assert_eq!(value["upgrades"]["spark"], 2);
    }
}
