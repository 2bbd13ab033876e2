//! Saved locations: an ordered, id-unique list mirrored to local storage.

use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{error::StorageError, model::Location};

/// Where the saved-location list lives between runs.
pub trait LocationStorage: Send + Sync + Debug {
    fn load(&self) -> Result<Vec<Location>, StorageError>;

    fn save(&self, locations: &[Location]) -> Result<(), StorageError>;
}

/// A JSON array in a single file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocationStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Location>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, locations: &[Location]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(locations)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Keeps everything in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    locations: Mutex<Vec<Location>>,
}

impl MemoryStorage {
    pub fn with_locations(locations: Vec<Location>) -> Self {
        Self { locations: Mutex::new(locations) }
    }

    pub fn snapshot(&self) -> Vec<Location> {
        self.locations.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl LocationStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<Location>, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, locations: &[Location]) -> Result<(), StorageError> {
        if let Ok(mut stored) = self.locations.lock() {
            *stored = locations.to_vec();
        }
        Ok(())
    }
}

/// The in-memory list plus write-through persistence.
///
/// Most recently used first. No size cap.
#[derive(Debug)]
pub struct LocationStore {
    locations: Vec<Location>,
    storage: Box<dyn LocationStorage>,
}

impl LocationStore {
    /// Read the persisted list; unreadable data counts as an empty list.
    pub fn load(storage: Box<dyn LocationStorage>) -> Self {
        let locations = storage.load().unwrap_or_else(|err| {
            warn!(error = %err, "discarding unreadable saved locations");
            Vec::new()
        });
        debug!(count = locations.len(), "loaded saved locations");

        Self { locations, storage }
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn first(&self) -> Option<&Location> {
        self.locations.first()
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Prepend unless the id is already saved. Returns whether it was added.
    pub fn add(&mut self, location: Location) -> bool {
        if self.contains(&location.id) {
            return false;
        }
        self.locations.insert(0, location);
        self.persist();
        true
    }

    /// Drop the entry with `id`; unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.locations.len();
        self.locations.retain(|l| l.id != id);

        let removed = self.locations.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Move an existing entry to the front.
    pub fn promote(&mut self, id: &str) -> bool {
        match self.locations.iter().position(|l| l.id == id) {
            Some(0) => true,
            Some(idx) => {
                let loc = self.locations.remove(idx);
                self.locations.insert(0, loc);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Write the whole list back. Failures are logged, never fatal.
    pub fn persist(&self) {
        if let Err(err) = self.storage.save(&self.locations) {
            warn!(error = %err, "failed to persist saved locations");
        }
    }
}
