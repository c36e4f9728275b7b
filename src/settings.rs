//! Process-wide global settings shared by every card.
//!
//! Settings live under one namespaced key in a key-value store as a JSON
//! document with four sections: `button`, `header`, `navigation` and
//! `popup`. A [`SettingsService`] is constructed once and handed to every
//! card; it caches the document in memory and notifies subscribers on every
//! write.
//!
//! Store failures are never surfaced. A failed read behaves like an empty
//! store and a failed write only loses cross-session persistence; both are
//! logged at warn level.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::merge::deep_merge;

/// Store key of the settings document.
pub const SETTINGS_KEY: &str = "hki-settings";

/// The global settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default)]
    pub button: Map<String, Value>,
    #[serde(default)]
    pub header: Map<String, Value>,
    #[serde(default)]
    pub navigation: Map<String, Value>,
    #[serde(default)]
    pub popup: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSection {
    Button,
    Header,
    Navigation,
    Popup,
}

impl GlobalSettings {
    pub fn section(&self, section: SettingsSection) -> &Map<String, Value> {
        match section {
            SettingsSection::Button => &self.button,
            SettingsSection::Header => &self.header,
            SettingsSection::Navigation => &self.navigation,
            SettingsSection::Popup => &self.popup,
        }
    }

    pub fn section_mut(&mut self, section: SettingsSection) -> &mut Map<String, Value> {
        match section {
            SettingsSection::Button => &mut self.button,
            SettingsSection::Header => &mut self.header,
            SettingsSection::Navigation => &mut self.navigation,
            SettingsSection::Popup => &mut self.popup,
        }
    }
}

/// Parse a stored settings document. Unknown sections are reported and
/// ignored; an unreadable document yields empty settings.
pub fn parse_settings(text: &str) -> GlobalSettings {
    let mut de = serde_json::Deserializer::from_str(text);
    let parsed = serde_ignored::deserialize(&mut de, |path| {
        tracing::debug!(section = %path, "ignoring unknown settings section");
    });
    match parsed {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "stored settings are unreadable, using empty settings");
            GlobalSettings::default()
        }
    }
}

/// A persistent key-value store.
pub trait SettingsStore: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`.
    fn read(&self, key: &str) -> io::Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as `{dir}/{key}.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// A store in the platform data directory for `app_name`
    /// (e.g. `~/.local/share/{app_name}/` on Linux).
    pub fn platform(app_name: &str) -> Option<Self> {
        let proj = directories::ProjectDirs::from("", "", app_name)?;
        Some(Self::new(proj.data_dir()))
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SettingsStore for FileStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }
}

/// In-memory store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Handle returned by [`SettingsService::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&GlobalSettings) + Send + Sync>;

/// Cached access to the global settings document.
pub struct SettingsService {
    store: Box<dyn SettingsStore>,
    key: String,
    cache: RwLock<Option<GlobalSettings>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl SettingsService {
    pub fn new(store: impl SettingsStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            key: SETTINGS_KEY.to_string(),
            cache: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Use a different store key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// The current settings, loaded from the store on first access.
    pub fn get(&self) -> GlobalSettings {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return cached.clone();
        }
        let loaded = self.load();
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        loaded
    }

    fn load(&self) -> GlobalSettings {
        match self.store.read(&self.key) {
            Ok(Some(text)) => parse_settings(&text),
            Ok(None) => GlobalSettings::default(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read settings store");
                GlobalSettings::default()
            }
        }
    }

    /// Replace the settings, write them through and notify subscribers.
    pub fn set(&self, settings: GlobalSettings) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(settings.clone());
        match serde_json::to_string(&settings) {
            Ok(text) => {
                if let Err(e) = self.store.write(&self.key, &text) {
                    tracing::warn!(key = %self.key, error = %e, "failed to write settings store");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize settings"),
        }
        self.notify(&settings);
    }

    /// Deep-merge `patch` into one section and store the result.
    pub fn update_section(&self, section: SettingsSection, patch: Map<String, Value>) -> GlobalSettings {
        let mut settings = self.get();
        let merged = deep_merge(settings.section(section).clone(), patch);
        *settings.section_mut(section) = merged;
        self.set(settings.clone());
        settings
    }

    /// Drop the cache so the next [`get`](Self::get) re-reads the store.
    pub fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn subscribe(&self, listener: impl Fn(&GlobalSettings) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn notify(&self, settings: &GlobalSettings) {
        // Listeners may call back into the service.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(settings);
        }
    }
}

impl std::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
