//! Centralized balance and tuning constants for VoidPhoenix game logic.
//!
//! Economy numbers that designers tune live in the settings document; the
//! values here define the fixed math of the engine and its fallbacks.

// Save schema ---------------------------------------------------------------
/// Schema version stamped on every state the engine produces.
pub const GAME_VERSION: u32 = 1;

// Accrual -------------------------------------------------------------------
/// Upper bound on seconds accrued by a single `advance_time` call.
pub const MAX_ACCRUAL_SECONDS: f64 = 60.0;
pub(crate) const MILLIS_PER_SECOND: f64 = 1000.0;
/// Sparks granted by one tap before the ash multiplier.
pub const TAP_BASE_SPARKS: f64 = 1.0;

// Rebirth -------------------------------------------------------------------
/// Sparks per unit under the square root of the ash estimate.
pub const ASH_DIVISOR: f64 = 1000.0;

// Settings fallbacks --------------------------------------------------------
pub const DEFAULT_ASH_PASSIVE_BONUS: f64 = 0.05;
pub const DEFAULT_ASH_TAP_BONUS: f64 = 0.02;
pub const DEFAULT_TITLE: &str = "VoidPhoenix";
pub const DEFAULT_TAGLINE: &str = "Ignite. Ascend. Rebirth.";
pub const DEFAULT_THEME_ACCENT: &str = "#ff7a1a";
pub const DEFAULT_THEME_BACKGROUND: &str = "#09090b";

// Autosave ------------------------------------------------------------------
pub const AUTOSAVE_QUIET_MS: i64 = 250;
pub const AUTOSAVE_MAX_WAIT_MS: i64 = 5_000;

// Milestones ----------------------------------------------------------------
pub const FIRST_MILESTONE_KEY: &str = "mvp_milestone_1";
pub const FIRST_MILESTONE_MESSAGE: &str =
    "The Phoenix cuts through the ember drift… a sealed sigil lands in your hand.";
pub const FIRST_MILESTONE_QUEST: &str = "first_flame_first_oath";
