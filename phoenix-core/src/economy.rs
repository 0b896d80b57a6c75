//! Progression engine: accrual, purchases, taps and rebirth.
//!
//! Every operation takes the current [`PlayerState`] by reference and
//! returns the next one. A returned value equal to the input signals a
//! no-op (insufficient sparks, or a rebirth below the ash threshold).

use crate::constants::{ASH_DIVISOR, MAX_ACCRUAL_SECONDS, TAP_BASE_SPARKS};
use crate::numbers::{floor_f64_to_u64, millis_to_seconds, non_negative, u64_to_f64};
use crate::settings::BonusRates;
use crate::state::{PlayerState, zeroed_upgrades};
use crate::upgrades::{UPGRADE_DEFS, UpgradeKey};

/// Cost of the next level of `key`: `base_cost * growth^level`.
#[must_use]
pub fn upgrade_cost(state: &PlayerState, key: UpgradeKey) -> f64 {
    let def = key.definition();
    let level = i32::try_from(state.level(key)).unwrap_or(i32::MAX);
    def.base_cost * def.cost_growth.powi(level)
}

/// Multiplier applied by ash at the given per-ash bonus rate.
#[must_use]
pub fn ash_multiplier(phoenix_ash: u64, bonus_per_ash: f64) -> f64 {
    1.0 + u64_to_f64(phoenix_ash) * bonus_per_ash
}

/// Passive sparks per second, including the ash multiplier.
#[must_use]
pub fn sparks_per_second(state: &PlayerState, passive_bonus_per_ash: f64) -> f64 {
    let base: f64 = UPGRADE_DEFS
        .iter()
        .map(|def| def.gain_per_sec * f64::from(state.level(def.key)))
        .sum();
    base * ash_multiplier(state.phoenix_ash, passive_bonus_per_ash)
}

/// Seconds of accrual credited for a tick at `now_ms`, clamped to `[0, 60]`.
#[must_use]
pub fn accrual_seconds(last_tick_ms: i64, now_ms: i64) -> f64 {
    let elapsed = millis_to_seconds(now_ms.saturating_sub(last_tick_ms));
    elapsed.clamp(0.0, MAX_ACCRUAL_SECONDS)
}

/// Accrue passive income up to `now_ms`.
///
/// `last_tick_ms` always moves to `now_ms`, so clamped time is forfeited
/// rather than carried into the next call.
#[must_use]
pub fn advance_time(state: &PlayerState, now_ms: i64, passive_bonus_per_ash: f64) -> PlayerState {
    let seconds = accrual_seconds(state.last_tick_ms, now_ms);
    let gain = sparks_per_second(state, passive_bonus_per_ash) * seconds;
    PlayerState {
        sparks: non_negative(state.sparks + gain),
        last_tick_ms: now_ms,
        ..state.clone()
    }
}

/// Buy a single level of `key`, or return the state unchanged if unaffordable.
#[must_use]
pub fn purchase_upgrade(state: &PlayerState, key: UpgradeKey) -> PlayerState {
    let cost = upgrade_cost(state, key);
    if state.sparks < cost {
        return state.clone();
    }
    let mut next = state.clone();
    next.sparks = non_negative(state.sparks - cost);
    *next.upgrades.entry(key).or_insert(0) += 1;
    log::debug!(
        "purchased {key} level {} for {cost:.2} sparks",
        next.level(key)
    );
    next
}

/// Whether the next level of `key` is affordable right now.
#[must_use]
pub fn can_afford(state: &PlayerState, key: UpgradeKey) -> bool {
    state.sparks >= upgrade_cost(state, key)
}

/// Manual tap: one spark scaled by the tap ash multiplier.
#[must_use]
pub fn apply_tap(state: &PlayerState, tap_bonus_per_ash: f64) -> PlayerState {
    let gain = TAP_BASE_SPARKS * ash_multiplier(state.phoenix_ash, tap_bonus_per_ash);
    PlayerState {
        sparks: non_negative(state.sparks + gain),
        ..state.clone()
    }
}

/// Ash a rebirth would grant right now: `floor(sqrt(sparks / 1000))`.
#[must_use]
pub fn estimate_ash_gain(state: &PlayerState) -> u64 {
    floor_f64_to_u64((non_negative(state.sparks) / ASH_DIVISOR).sqrt())
}

/// Rebirth: trade sparks and upgrades for ash. No-op when the gain is zero.
#[must_use]
pub fn perform_rebirth(state: &PlayerState, now_ms: i64) -> PlayerState {
    let gain = estimate_ash_gain(state);
    if gain == 0 {
        return state.clone();
    }
    log::debug!(
        "rebirth #{} converts {:.2} sparks into {gain} ash",
        state.rebirths + 1,
        state.sparks
    );
    PlayerState {
        version: state.version,
        sparks: 0.0,
        rebirths: state.rebirths.saturating_add(1),
        phoenix_ash: state.phoenix_ash.saturating_add(gain),
        upgrades: zeroed_upgrades(),
        last_tick_ms: now_ms,
    }
}

/// Convenience wrapper binding the bonus rates for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Economy {
    pub rates: BonusRates,
}

impl Economy {
    #[must_use]
    pub const fn new(rates: BonusRates) -> Self {
        Self { rates }
    }

    #[must_use]
    pub fn tick(&self, state: &PlayerState, now_ms: i64) -> PlayerState {
        advance_time(state, now_ms, self.rates.passive_per_ash)
    }

    #[must_use]
    pub fn tap(&self, state: &PlayerState) -> PlayerState {
        apply_tap(state, self.rates.tap_per_ash)
    }

    #[must_use]
    pub fn sparks_per_second(&self, state: &PlayerState) -> f64 {
        sparks_per_second(state, self.rates.passive_per_ash)
    }

    /// Cheapest upgrade by next-level cost.
    #[must_use]
    pub fn cheapest_upgrade(&self, state: &PlayerState) -> UpgradeKey {
        UpgradeKey::ALL
            .into_iter()
            .min_by(|a, b| upgrade_cost(state, *a).total_cmp(&upgrade_cost(state, *b)))
            .unwrap_or(UpgradeKey::Spark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn cost_follows_growth_curve() {
        let mut state = PlayerState::new(0);
        assert!(approx(upgrade_cost(&state, UpgradeKey::Spark), 10.0));
        state.upgrades.insert(UpgradeKey::Spark, 2);
        assert!(approx(upgrade_cost(&state, UpgradeKey::Spark), 10.0 * 1.15 * 1.15));
        assert!(approx(upgrade_cost(&state, UpgradeKey::Feather), 75.0));
    }

    #[test]
    fn yield_applies_ash_multiplier() {
        let mut state = PlayerState::new(0);
        state.upgrades.insert(UpgradeKey::Spark, 5);
        state.upgrades.insert(UpgradeKey::Feather, 1);
        assert!(approx(sparks_per_second(&state, 0.05), 2.0));
        state.phoenix_ash = 4;
        assert!(approx(sparks_per_second(&state, 0.05), 2.0 * 1.2));
    }

    #[test]
    fn advance_time_clamps_elapsed() {
        let mut state = PlayerState::new(0);
        state.upgrades.insert(UpgradeKey::Feather, 1);

        let later = advance_time(&state, 10_000, 0.05);
        assert!(approx(later.sparks, 10.0));
        assert_eq!(later.last_tick_ms, 10_000);

        let far = advance_time(&state, 3_600_000, 0.05);
        assert!(approx(far.sparks, 60.0));
        assert_eq!(far.last_tick_ms, 3_600_000);

        let backwards = advance_time(&later, 5_000, 0.05);
        assert!(approx(backwards.sparks, later.sparks));
        assert_eq!(backwards.last_tick_ms, 5_000);
    }

    #[test]
    fn purchase_deducts_or_noops() {
        let mut state = PlayerState::new(0);
        state.sparks = 9.99;
        let unchanged = purchase_upgrade(&state, UpgradeKey::Spark);
        assert_eq!(unchanged, state);

        state.sparks = 12.0;
        let bought = purchase_upgrade(&state, UpgradeKey::Spark);
        assert_eq!(bought.level(UpgradeKey::Spark), 1);
        assert!(approx(bought.sparks, 2.0));
    }

    #[test]
    fn purchase_creates_missing_level_entry() {
        let mut state = PlayerState::new(0);
        state.upgrades.clear();
        state.sparks = 100.0;
        let bought = purchase_upgrade(&state, UpgradeKey::Feather);
        assert_eq!(bought.level(UpgradeKey::Feather), 1);
    }

    #[test]
    fn tap_scales_with_ash() {
        let mut state = PlayerState::new(0);
        assert!(approx(apply_tap(&state, 0.02).sparks, 1.0));
        state.phoenix_ash = 10;
        assert!(approx(apply_tap(&state, 0.02).sparks, 1.2));
    }

    #[test]
    fn ash_estimate_uses_square_root() {
        let mut state = PlayerState::new(0);
        state.sparks = 999.0;
        assert_eq!(estimate_ash_gain(&state), 0);
        state.sparks = 1_000.0;
        assert_eq!(estimate_ash_gain(&state), 1);
        state.sparks = 16_000.0;
        assert_eq!(estimate_ash_gain(&state), 4);
    }

    #[test]
    fn rebirth_resets_economy_and_keeps_version() {
        let mut state = PlayerState::new(0);
        state.sparks = 4_500.0;
        state.phoenix_ash = 1;
        state.rebirths = 2;
        state.upgrades.insert(UpgradeKey::Ember, 3);

        let reborn = perform_rebirth(&state, 777);
        assert!(approx(reborn.sparks, 0.0));
        assert_eq!(reborn.rebirths, 3);
        assert_eq!(reborn.phoenix_ash, 3);
        assert_eq!(reborn.level(UpgradeKey::Ember), 0);
        assert_eq!(reborn.last_tick_ms, 777);
        assert_eq!(reborn.version, state.version);
    }

    #[test]
    fn rebirth_below_threshold_is_noop() {
        let mut state = PlayerState::new(0);
        state.sparks = 500.0;
        assert_eq!(perform_rebirth(&state, 10), state);
    }

    #[test]
    fn cheapest_upgrade_tracks_growth() {
        let economy = Economy::new(BonusRates::default());
        let mut state = PlayerState::new(0);
        assert_eq!(economy.cheapest_upgrade(&state), UpgradeKey::Spark);
        state.upgrades.insert(UpgradeKey::Spark, 15);
        assert_eq!(economy.cheapest_upgrade(&state), UpgradeKey::Feather);
    }
}
