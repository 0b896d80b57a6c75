//! VoidPhoenix Game Engine
//!
//! Platform-agnostic core logic for the VoidPhoenix idle game: the spark
//! economy with its rebirth loop, and the branching dialogue interpreter.
//! This crate performs no I/O; hosts supply data and persistence through
//! [`DataLoader`] and [`GameStorage`].

pub mod autosave;
pub mod constants;
pub mod economy;
pub mod format;
pub mod milestone;
pub mod numbers;
pub mod save;
pub mod settings;
pub mod state;
pub mod story;
pub mod upgrades;

// Re-export commonly used types
pub use autosave::SaveDebouncer;
pub use constants::GAME_VERSION;
pub use economy::{
    Economy, advance_time, apply_tap, can_afford, estimate_ash_gain, perform_rebirth,
    purchase_upgrade, sparks_per_second, upgrade_cost,
};
pub use format::format_amount;
pub use milestone::{MilestoneEvent, MilestoneTracker};
pub use save::{SaveError, export_save, import_save, restore_or_default, restore_save};
pub use settings::{BonusRates, Settings};
pub use state::PlayerState;
pub use story::{InterpreterState, StoryError, StoryPack};
pub use upgrades::{UPGRADE_DEFS, UpgradeDefinition, UpgradeKey};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the settings document
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be fetched or parsed.
    fn load_settings(&self) -> Result<Settings, Self::Error>;

    /// Load a story pack by identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the pack cannot be fetched or parsed.
    fn load_story_pack(&self, pack_id: &str) -> Result<StoryPack, Self::Error>;
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the persisted save payload, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn read_save(&self) -> Result<Option<String>, Self::Error>;

    /// Replace the persisted save payload
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be written.
    fn write_save(&self, payload: &str) -> Result<(), Self::Error>;

    /// Remove the persisted save
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn clear_save(&self) -> Result<(), Self::Error>;
}

/// Main game engine wiring content and persistence for a host
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    #[must_use]
    pub const fn data_loader(&self) -> &L {
        &self.data_loader
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the settings, falling back to defaults when they are unavailable
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.data_loader.load_settings().unwrap_or_else(|err| {
            log::warn!("settings unavailable, using defaults: {err}");
            Settings::default()
        })
    }

    /// Restore the saved game, or start fresh when there is no usable save
    #[must_use]
    pub fn load_game(&self, now_ms: i64) -> PlayerState {
        match self.storage.read_save() {
            Ok(payload) => restore_or_default(payload.as_deref(), now_ms),
            Err(err) => {
                log::warn!("save storage unreadable, starting fresh: {err}");
                PlayerState::new(now_ms)
            }
        }
    }

    /// Persist a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    pub fn save_game(&self, state: &PlayerState) -> Result<(), anyhow::Error> {
        let payload = save::persist_save(state)?;
        self.storage.write_save(&payload)?;
        Ok(())
    }

    /// Hard reset: delete the save and return a fresh state
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn reset_game(&self, now_ms: i64) -> Result<PlayerState, S::Error> {
        self.storage.clear_save()?;
        Ok(PlayerState::new(now_ms))
    }

    /// Load and validate a story pack, positioned at its start node
    ///
    /// # Errors
    ///
    /// Returns an error if the pack cannot be loaded or fails validation.
    pub fn open_story(&self, pack_id: &str) -> Result<InterpreterState, anyhow::Error> {
        let pack = self.data_loader.load_story_pack(pack_id)?;
        for (from, to) in pack.dangling_links() {
            log::warn!("story '{pack_id}': node '{from}' links to missing node '{to}'");
        }
        Ok(InterpreterState::load(pack)?)
    }
}
