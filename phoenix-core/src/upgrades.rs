//! Upgrade catalog
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a purchasable upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKey {
    Spark,
    Feather,
    Ember,
    Flare,
}

impl UpgradeKey {
    /// Every key in catalog order (cheapest first).
    pub const ALL: [Self; 4] = [Self::Spark, Self::Feather, Self::Ember, Self::Flare];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spark => "spark",
            Self::Feather => "feather",
            Self::Ember => "ember",
            Self::Flare => "flare",
        }
    }

    /// Catalog entry for this key.
    #[must_use]
    pub fn definition(self) -> &'static UpgradeDefinition {
        // ALL and UPGRADE_DEFS share an order.
        &UPGRADE_DEFS[self as usize]
    }
}

impl fmt::Display for UpgradeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when text does not name a catalog upgrade.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown upgrade '{0}'")]
pub struct UpgradeKeyError(pub String);

impl FromStr for UpgradeKey {
    type Err = UpgradeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UpgradeKeyError(needle.to_string()))
    }
}

/// Immutable catalog entry describing one upgrade line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeDefinition {
    pub key: UpgradeKey,
    pub name: &'static str,
    pub description: &'static str,
    pub base_cost: f64,
    /// Multiplicative cost growth per purchased level; always above 1.
    pub cost_growth: f64,
    /// Flat sparks per second contributed by each level.
    pub gain_per_sec: f64,
}

pub static UPGRADE_DEFS: [UpgradeDefinition; 4] = [
    UpgradeDefinition {
        key: UpgradeKey::Spark,
        name: "Spark Collector",
        description: "+0.2 sparks/sec",
        base_cost: 10.0,
        cost_growth: 1.15,
        gain_per_sec: 0.2,
    },
    UpgradeDefinition {
        key: UpgradeKey::Feather,
        name: "Phoenix Feather",
        description: "+1.0 sparks/sec",
        base_cost: 75.0,
        cost_growth: 1.17,
        gain_per_sec: 1.0,
    },
    UpgradeDefinition {
        key: UpgradeKey::Ember,
        name: "Ember Engine",
        description: "+5.0 sparks/sec",
        base_cost: 400.0,
        cost_growth: 1.18,
        gain_per_sec: 5.0,
    },
    UpgradeDefinition {
        key: UpgradeKey::Flare,
        name: "Flare Core",
        description: "+20 sparks/sec",
        base_cost: 2000.0,
        cost_growth: 1.20,
        gain_per_sec: 20.0,
    },
];
