//! Configuration normalization and migration for the HKI header card.
//!
//! A header card configuration arrives in one of three shapes and leaves as
//! one canonical, fully defaulted flat object:
//!
//! ```ignore
//! let config = normalize_config(&raw)?;
//! let slots = resolve_slots(&config);
//! let minimal = strip_to_minimal(&config);
//! ```
//!
//! # Shapes
//!
//! - **Legacy**: the oldest flat shape, with keys such as
//!   `top_bar_left_weather_entity` and top-level person actions.
//! - **Nested**: the human-authored shape, with `top_bar`/`bottom_bar`
//!   objects holding one object per slot, global setting groups and a
//!   `persons` object.
//! - **Canonical**: the flat shape every consumer reads. Each slot field is
//!   a `{bar}_{position}_{field}` key.
//!
//! [`detect_format`] classifies raw input. An explicit `schema_version` tag
//! wins; otherwise nested sub-objects mark the nested shape and legacy-only
//! keys mark the legacy shape.
//!
//! # Pipeline
//!
//! ```text
//! raw object
//!     → detect_format
//!     → migrate_legacy_to_nested + flatten_nested   (legacy)
//!       flatten_nested                              (nested)
//!     → overlay on the default table
//!     → per-field rules: coerce, clamp, restrict, clean actions
//!     → CanonicalConfig
//! ```
//!
//! Normalization is self-healing. A malformed field falls back to its
//! default or is clamped into range, and is never reported; only input that
//! is not an object at all is an error. The output is a fixed point:
//! normalizing a canonical configuration returns it unchanged.
//!
//! # Persisting
//!
//! [`strip_to_minimal`] reduces a canonical configuration to the values that
//! differ from the defaults (plus a few always-written keys) and re-nests
//! them. Normalizing the minimal document reproduces the configuration.
//! [`persist_minimal`] writes it as JSON, or as TOML that keeps the comments
//! of an existing file.
//!
//! # Global settings
//!
//! Cards share one [`SettingsService`]: the `{button, header, navigation,
//! popup}` document stored under the `hki-settings` key, cached in memory
//! and broadcast to subscribers on every write.
//!
//! # CLI
//!
//! The `cli` module (behind the `clap` Cargo feature, on by default)
//! provides `detect|normalize|migrate|flatten|strip` subcommands over JSON
//! and TOML documents. Without clap, build a [`ConfigAction`] directly and
//! pass it to [`ops::handle`].

pub mod action;
pub mod card;
pub mod defaults;
pub mod error;
pub mod keys;
pub mod ops;
pub mod person;
pub mod resolve;
pub mod settings;
pub mod states;
pub mod types;

#[cfg(feature = "clap")]
mod cli;
mod detect;
mod document;
mod flatten;
pub(crate) mod merge;
mod migrate;
mod normalize;
mod persist;
mod popup;
mod strip;
mod validate;

#[cfg(test)]
mod fixtures;

pub use action::{Action, cleanup_action};
pub use card::HeaderCard;
#[cfg(feature = "clap")]
pub use cli::{CardConfigArgs, CardConfigSubcommand};
pub use detect::{SCHEMA_VERSION_KEY, detect_format, is_legacy_format, looks_nested, schema_tag};
pub use document::{load_document, parse_document};
pub use error::CardConfigError;
pub use flatten::flatten_nested;
pub use merge::deep_merge;
pub use migrate::migrate_legacy_to_nested;
pub use normalize::{CanonicalConfig, normalize_config, to_flat};
pub use ops::ConfigResult;
pub use persist::{persist_minimal, set_in_toml_document, to_json_document};
pub use popup::{resolve_popup, slot_popup};
pub use resolve::{ResolvedSlot, SlotContent, resolve_bar, resolve_persons, resolve_slot, resolve_slots};
pub use settings::{GlobalSettings, SettingsService, SettingsStore};
pub use strip::{strip_flat, strip_to_minimal};
pub use types::{Align, Bar, ConfigAction, ConfigFormat, DocumentFormat, SlotId, SlotPosition, SlotType};
pub use validate::Rule;
