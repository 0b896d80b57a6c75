//! Settings document and the bonus rates derived from it.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ASH_PASSIVE_BONUS, DEFAULT_ASH_TAP_BONUS, DEFAULT_TAGLINE, DEFAULT_THEME_ACCENT,
    DEFAULT_THEME_BACKGROUND, DEFAULT_TITLE,
};

/// Read-only presentation and tuning document served to the host.
///
/// Every field is optional in JSON; anything missing takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub title: String,
    pub tagline: String,
    pub theme: Theme,
    pub numbers: Numbers,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            tagline: DEFAULT_TAGLINE.to_string(),
            theme: Theme::default(),
            numbers: Numbers::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub accent: String,
    pub background: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: DEFAULT_THEME_ACCENT.to_string(),
            background: DEFAULT_THEME_BACKGROUND.to_string(),
        }
    }
}

/// Economy tuning numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Numbers {
    #[serde(default = "Numbers::default_passive")]
    pub ash_passive_bonus_per_ash: f64,
    #[serde(default = "Numbers::default_tap")]
    pub ash_tap_bonus_per_ash: f64,
}

impl Numbers {
    const fn default_passive() -> f64 {
        DEFAULT_ASH_PASSIVE_BONUS
    }

    const fn default_tap() -> f64 {
        DEFAULT_ASH_TAP_BONUS
    }
}

impl Default for Numbers {
    fn default() -> Self {
        Self {
            ash_passive_bonus_per_ash: Self::default_passive(),
            ash_tap_bonus_per_ash: Self::default_tap(),
        }
    }
}

impl Settings {
    /// Parse a settings document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse a settings document, falling back to defaults on any failure.
    #[must_use]
    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|err| {
            log::warn!("settings document rejected, using defaults: {err}");
            Self::default()
        })
    }

    #[must_use]
    pub fn bonus_rates(&self) -> BonusRates {
        BonusRates::from(self.numbers)
    }
}

/// Per-ash bonus rates consumed by the progression engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusRates {
    pub passive_per_ash: f64,
    pub tap_per_ash: f64,
}

impl Default for BonusRates {
    fn default() -> Self {
        Numbers::default().into()
    }
}

impl From<Numbers> for BonusRates {
    fn from(numbers: Numbers) -> Self {
        Self {
            passive_per_ash: sanitize_rate(
                numbers.ash_passive_bonus_per_ash,
                DEFAULT_ASH_PASSIVE_BONUS,
            ),
            tap_per_ash: sanitize_rate(numbers.ash_tap_bonus_per_ash, DEFAULT_ASH_TAP_BONUS),
        }
    }
}

fn sanitize_rate(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}
