//! Settings store holding the known configuration records.
//!
//! The store is handed to the engine as a handle; there is no global
//! instance. Writers replace the current record under a single write lock
//! and then broadcast a [`ConfigEvent`], so readers see either the old or the
//! new record, never a half-merged one.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, trace};

use super::record::{BgType, ConfigRecord, DisplayMode, is_valid_hex_color};
use crate::error::{BundleError, Result, ResultExt};

/// Fewest records the store will keep.
pub const MIN_RECORD_COUNT: usize = 1;

const EVENT_CAPACITY: usize = 16;

fn check_color(hex: &str) -> Result<()> {
    if is_valid_hex_color(hex) {
        Ok(())
    } else {
        Err(BundleError::ConfigInvalid(format!(
            "Invalid color '{hex}': expected #RRGGBB or #AARRGGBB"
        )))
    }
}

/// Change notification sent to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    /// The current record changed. `reload` is set when the whole record was
    /// swapped (import, selection, deletion) rather than edited in place.
    Updated { reload: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    current: usize,
    #[serde(default)]
    records: Vec<ConfigRecord>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            current: 0,
            records: vec![ConfigRecord::default()],
        }
    }
}

impl StoreState {
    fn normalize(&mut self) {
        if self.records.is_empty() {
            self.records.push(ConfigRecord::default());
        }
        if self.current >= self.records.len() {
            self.current = 0;
        }
    }
}

/// Process-wide configuration store.
pub struct ConfigStore {
    state: RwLock<StoreState>,
    path: Option<PathBuf>,
    events: broadcast::Sender<ConfigEvent>,
}

impl ConfigStore {
    /// A store that is not backed by a file.
    pub fn in_memory(initial: ConfigRecord) -> Self {
        Self::with_state(
            StoreState {
                current: 0,
                records: vec![initial],
            },
            None,
        )
    }

    /// Open a store file, starting with one default record if it is absent.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let state = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            let mut state: StoreState = serde_json::from_str(&text).map_err(|e| {
                BundleError::ConfigParse(format!("Invalid store {}: {e}", path.display()))
            })?;
            state.normalize();
            info!(records = state.records.len(), "Opened config store");
            state
        } else {
            debug!("Store file absent, starting with defaults");
            StoreState::default()
        };
        Ok(Self::with_state(state, Some(path.to_path_buf())))
    }

    fn with_state(state: StoreState, path: Option<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(state),
            path,
            events,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().expect("config store lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().expect("config store lock poisoned")
    }

    fn notify(&self, reload: bool) {
        // No subscribers is fine.
        let _ = self.events.send(ConfigEvent::Updated { reload });
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.events.subscribe()
    }

    /// Copy of the current record.
    pub fn current(&self) -> ConfigRecord {
        let state = self.read();
        state.records[state.current].clone()
    }

    pub fn current_index(&self) -> usize {
        self.read().current
    }

    /// Copies of all known records.
    pub fn records(&self) -> Vec<ConfigRecord> {
        self.read().records.clone()
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    /// Replace the current record and notify observers.
    #[instrument(skip_all, fields(name = %record.name))]
    pub fn replace(&self, record: ConfigRecord) {
        {
            let mut state = self.write();
            let current = state.current;
            state.records[current] = record;
        }
        info!("Current configuration replaced");
        self.notify(true);
    }

    /// Edit the current record in place and notify observers.
    pub fn update_current<F>(&self, f: F)
    where
        F: FnOnce(&mut ConfigRecord),
    {
        {
            let mut state = self.write();
            let current = state.current;
            f(&mut state.records[current]);
        }
        trace!("Current configuration edited");
        self.notify(false);
    }

    /// Rename the current record.
    pub fn rename_current(&self, name: impl Into<String>) {
        let name = name.into();
        debug!(name = %name, "Renaming current configuration");
        self.update_current(|record| record.name = name);
    }

    /// Set a mode's text color. `hex` must be `#RRGGBB` or `#AARRGGBB`.
    pub fn set_text_color(&self, mode: DisplayMode, hex: &str) -> Result<()> {
        check_color(hex)?;
        self.update_current(|record| record.set_text_color(mode, hex));
        Ok(())
    }

    /// Give a mode a solid color background.
    pub fn set_background_color(&self, mode: DisplayMode, hex: &str) -> Result<()> {
        check_color(hex)?;
        self.update_current(|record| record.set_background(mode, BgType::Color, hex));
        Ok(())
    }

    /// Append a record and return its index.
    pub fn add(&self, record: ConfigRecord) -> usize {
        let index = {
            let mut state = self.write();
            state.records.push(record);
            state.records.len() - 1
        };
        debug!(index, "Added configuration");
        index
    }

    /// Make another record current.
    pub fn select(&self, index: usize) -> Result<()> {
        {
            let mut state = self.write();
            if index >= state.records.len() {
                return Err(BundleError::StoreRule(format!(
                    "No configuration at index {index} (have {})",
                    state.records.len()
                )));
            }
            state.current = index;
        }
        info!(index, "Selected configuration");
        self.notify(true);
        Ok(())
    }

    /// Delete the current record; the previous one becomes current.
    pub fn delete_current(&self) -> Result<ConfigRecord> {
        let removed = {
            let mut state = self.write();
            if state.records.len() <= MIN_RECORD_COUNT {
                return Err(BundleError::StoreRule(
                    "Configuration count is already at the minimum, cannot delete".to_string(),
                ));
            }
            let current = state.current;
            let removed = state.records.remove(current);
            state.current = current.saturating_sub(1);
            removed
        };
        info!(name = %removed.name, "Deleted configuration");
        self.notify(true);
        Ok(removed)
    }

    /// Persist to the backing file, if any.
    #[instrument(skip(self))]
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = {
            let state = self.read();
            serde_json::to_string_pretty(&*state).with_context(|| "Serializing config store")?
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "Config store saved");
        Ok(())
    }
}
