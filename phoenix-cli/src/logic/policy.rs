use std::fmt;

use clap::ValueEnum;
use phoenix_core::{
    Economy, PlayerState, UPGRADE_DEFS, UpgradeKey, can_afford, estimate_ash_gain, upgrade_cost,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// What a policy wants to do on the current frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDecision {
    pub taps: u32,
    pub purchase: Option<UpgradeKey>,
    pub rebirth: bool,
    pub rationale: Option<String>,
}

/// Policy interface for automated idle sessions.
pub trait PurchasePolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Decide taps, an optional purchase and whether to rebirth.
    fn decide(&mut self, state: &PlayerState, economy: &Economy) -> PolicyDecision;
}

/// Built-in strategies for simulated sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStrategy {
    /// Never touch anything; passive income only
    Idle,
    /// Always buy the cheapest affordable upgrade
    Cheapest,
    /// Buy the best income per spark and rebirth when ash would double
    Efficient,
    /// Tap in random bursts and buy the cheapest upgrade
    Tapper,
}

impl SessionStrategy {
    pub const ALL: [Self; 4] = [Self::Idle, Self::Cheapest, Self::Efficient, Self::Tapper];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Cheapest => "Cheapest",
            Self::Efficient => "Efficient",
            Self::Tapper => "Tapper",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PurchasePolicy + Send> {
        match self {
            Self::Idle => Box::new(IdlePolicy),
            Self::Cheapest => Box::new(CheapestPolicy),
            Self::Efficient => Box::new(EfficientPolicy),
            Self::Tapper => Box::new(TapperPolicy::new(seed)),
        }
    }
}

impl fmt::Display for SessionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct IdlePolicy;
struct CheapestPolicy;
struct EfficientPolicy;

struct TapperPolicy {
    rng: ChaCha20Rng,
    max_burst: u32,
}

impl TapperPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            max_burst: 8,
        }
    }
}

impl PurchasePolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn decide(&mut self, _state: &PlayerState, _economy: &Economy) -> PolicyDecision {
        PolicyDecision::default()
    }
}

impl PurchasePolicy for CheapestPolicy {
    fn name(&self) -> &'static str {
        "Cheapest"
    }

    fn decide(&mut self, state: &PlayerState, economy: &Economy) -> PolicyDecision {
        let key = economy.cheapest_upgrade(state);
        let taps = u32::from(state.total_levels() == 0);
        PolicyDecision {
            taps,
            purchase: can_afford(state, key).then_some(key),
            rebirth: false,
            rationale: Some(format!("cost {:.2}", upgrade_cost(state, key))),
        }
    }
}

impl PurchasePolicy for EfficientPolicy {
    fn name(&self) -> &'static str {
        "Efficient"
    }

    fn decide(&mut self, state: &PlayerState, _economy: &Economy) -> PolicyDecision {
        let gain = estimate_ash_gain(state);
        if gain > 0 && gain >= state.phoenix_ash.max(1) {
            return PolicyDecision {
                rebirth: true,
                rationale: Some(format!("ash +{gain}")),
                ..PolicyDecision::default()
            };
        }

        let best = UPGRADE_DEFS
            .iter()
            .map(|def| (def.key, def.gain_per_sec / upgrade_cost(state, def.key)))
            .max_by(|(_, a), (_, b)| a.total_cmp(b));
        let Some((key, score)) = best else {
            return PolicyDecision::default();
        };
        PolicyDecision {
            taps: u32::from(state.total_levels() == 0),
            purchase: can_afford(state, key).then_some(key),
            rebirth: false,
            rationale: Some(format!("yield {score:.5}/spark")),
        }
    }
}

impl PurchasePolicy for TapperPolicy {
    fn name(&self) -> &'static str {
        "Tapper"
    }

    fn decide(&mut self, state: &PlayerState, economy: &Economy) -> PolicyDecision {
        let taps = self.rng.gen_range(0..=self.max_burst);
        let key = economy.cheapest_upgrade(state);
        let rebirth = estimate_ash_gain(state) >= 2;
        PolicyDecision {
            taps,
            purchase: can_afford(state, key).then_some(key),
            rebirth,
            rationale: Some(format!("burst {taps}")),
        }
    }
}
