//! # hki-card-config demo application
//!
//! A small CLI that loads a header card document, runs it through the
//! normalization pipeline and prints what the card would render. It exists
//! to exercise the crate by hand.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example card_config_demo -- slots card.toml
//! cargo run --example card_config_demo -- config normalize card.json
//! RUST_LOG=hki_card_config=debug cargo run --example card_config_demo -- config strip card.json
//! ```
//!
//! | Feature                  | How to exercise it                                              |
//! |--------------------------|-----------------------------------------------------------------|
//! | Format detection         | `config detect card.json`                                       |
//! | Canonical output         | `config normalize card.json`                                    |
//! | Nested / flat conversion | `config migrate card.json`, `config flatten card.toml`          |
//! | Minimal persisting       | `config strip card.json -o card.toml`                           |
//! | Resolved slots           | `slots card.json`                                               |
//! | Global settings          | `settings`, `settings --popup-width wide`                       |
//! | Debug logging            | `RUST_LOG=hki_card_config=debug`                                |

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use hki_card_config::settings::{FileStore, SettingsSection};
use hki_card_config::{
    CardConfigArgs, HeaderCard, SettingsService, SlotContent, load_document, ops,
};

/// hki-card-config demo: inspect and convert header card configurations.
#[derive(Parser, Debug)]
#[command(name = "hki-card-config-demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the resolved content of every slot.
    Slots { file: PathBuf },
    /// Show or update the global settings document.
    Settings {
        /// Directory holding the settings store (defaults to the platform data dir).
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Set the global popup width.
        #[arg(long)]
        popup_width: Option<String>,
    },
    /// Document operations (detect, normalize, migrate, flatten, strip).
    Config(CardConfigArgs),
}

fn content_label(content: &SlotContent) -> String {
    match content {
        SlotContent::None => "none".into(),
        SlotContent::Spacer => "spacer".into(),
        SlotContent::Weather(w) => format!("weather {}", w.entity.as_deref().unwrap_or("<unset>")),
        SlotContent::DateTime(d) => format!("datetime ({}, {})", d.time_format, d.date_format),
        SlotContent::Notifications(n) => format!("notifications {}", n.icon),
        SlotContent::Card(Some(card)) => format!(
            "card {}",
            card.get("type").and_then(Value::as_str).unwrap_or("<untyped>")
        ),
        SlotContent::Card(None) => "card <empty>".into(),
        SlotContent::Button(b) => format!(
            "button {}",
            b.label.as_deref().or(b.entity.as_deref()).unwrap_or("<unset>")
        ),
    }
}

fn print_slots(file: &Path) -> Result<(), hki_card_config::CardConfigError> {
    let mut card = HeaderCard::new();
    card.set_config(&load_document(file)?)?;
    for slot in card.slots() {
        let (x, y) = slot.offsets.effective(false);
        println!(
            "{:<18} {:<32} align={:<7} offset=({x}, {y})",
            slot.id.to_string(),
            content_label(&slot.content),
            slot.align.as_str(),
        );
    }
    Ok(())
}

fn settings(dir: Option<PathBuf>, popup_width: Option<String>) -> ExitCode {
    let store = match dir.map(FileStore::new).or_else(|| FileStore::platform("hki-card-config")) {
        Some(store) => store,
        None => {
            eprintln!("Error: no settings directory available");
            return ExitCode::FAILURE;
        }
    };
    let service = SettingsService::new(store);
    service.subscribe(|settings| {
        tracing::info!(popup_keys = settings.popup.len(), "settings changed");
    });
    if let Some(width) = popup_width {
        let mut patch = Map::new();
        patch.insert("popup_width".into(), Value::String(width));
        service.update_section(SettingsSection::Popup, patch);
    }
    match serde_json::to_string_pretty(&service.get()) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Slots { file } => match print_slots(&file) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Settings { dir, popup_width } => settings(dir, popup_width),
        Commands::Config(args) => match ops::handle(args.into_action()) {
            Ok(result) => {
                println!("{result}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}
