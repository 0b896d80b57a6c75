//! File-backed implementations of the engine ports.
//!
//! Saves live in a single JSON file; the milestone seen-set sits beside it in
//! `<save>.milestones.json`. Content is read from an asset root laid out as
//! `settings.json` plus `story/<id>.dialogue.json`.

use phoenix_core::{DataLoader, GameEngine, GameStorage, MilestoneTracker, Settings, StoryPack};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> FileStorageError + '_ {
    move |source| FileStorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Save slot stored as a plain JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn milestones_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".milestones.json");
        PathBuf::from(name)
    }

    /// Load the milestone seen-set; a missing file means nothing has fired.
    pub fn read_milestones(&self) -> Result<MilestoneTracker, FileStorageError> {
        let path = self.milestones_path();
        match fs::read_to_string(&path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(MilestoneTracker::new()),
            Err(err) => Err(io_error(&path)(err)),
        }
    }

    pub fn write_milestones(&self, tracker: &MilestoneTracker) -> Result<(), FileStorageError> {
        let path = self.milestones_path();
        let json = serde_json::to_string_pretty(tracker)?;
        fs::write(&path, json).map_err(io_error(&path))
    }
}

impl GameStorage for FileStorage {
    type Error = FileStorageError;

    fn read_save(&self) -> Result<Option<String>, Self::Error> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&self.path)(err)),
        }
    }

    fn write_save(&self, payload: &str) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(&self.path, payload).map_err(io_error(&self.path))
    }

    fn clear_save(&self) -> Result<(), Self::Error> {
        for path in [self.path.clone(), self.milestones_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(io_error(&path)(err)),
            }
        }
        Ok(())
    }
}

/// Content loader reading settings and story packs from an asset directory.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, relative: &Path) -> Result<String, FileStorageError> {
        let path = self.root.join(relative);
        fs::read_to_string(&path).map_err(io_error(&path))
    }
}

impl DataLoader for FileLoader {
    type Error = FileStorageError;

    fn load_settings(&self) -> Result<Settings, Self::Error> {
        let json = self.read(Path::new("settings.json"))?;
        Ok(Settings::from_json(&json)?)
    }

    fn load_story_pack(&self, pack_id: &str) -> Result<StoryPack, Self::Error> {
        let relative = Path::new("story").join(format!("{pack_id}.dialogue.json"));
        let json = self.read(&relative)?;
        Ok(serde_json::from_str(&json)?)
    }
}

pub type FileEngine = GameEngine<FileLoader, FileStorage>;

/// Engine wired to the file system.
pub fn create_file_engine(assets: impl Into<PathBuf>, save: impl Into<PathBuf>) -> FileEngine {
    GameEngine::new(FileLoader::new(assets), FileStorage::new(save))
}
