//! Clap adapter for the document operations.
//!
//! Compiled only when the `clap` Cargo feature is enabled (on by default).
//! [`CardConfigArgs`] can be embedded in an application's clap derive to get
//! `detect|normalize|migrate|flatten|strip` subcommands. The only bridge to
//! the core is [`CardConfigArgs::into_action()`], which converts parsed
//! arguments into a [`ConfigAction`](crate::ConfigAction) for
//! [`ops::handle`](crate::ops::handle).

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::types::ConfigAction;

/// Clap-derived args for the card config subcommand group.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     card: CardConfigArgs,
/// }
/// ```
#[derive(Debug, Args)]
pub struct CardConfigArgs {
    #[command(subcommand)]
    pub action: CardConfigSubcommand,
}

/// Available subcommands. Each reads a `.json` or `.toml` document.
#[derive(Debug, Subcommand)]
pub enum CardConfigSubcommand {
    /// Print the detected shape of a document (legacy, nested or canonical).
    Detect { file: PathBuf },
    /// Print the fully defaulted, validated flat configuration.
    Normalize { file: PathBuf },
    /// Print the document converted to the nested shape, without defaults.
    Migrate { file: PathBuf },
    /// Print the document converted to flat keys, without defaults.
    Flatten { file: PathBuf },
    /// Print or write the minimal nested configuration.
    Strip {
        file: PathBuf,
        /// Write to a file instead of stdout. Existing TOML files keep their comments.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl CardConfigArgs {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    pub fn into_action(self) -> ConfigAction {
        match self.action {
            CardConfigSubcommand::Detect { file } => ConfigAction::Detect { path: file },
            CardConfigSubcommand::Normalize { file } => ConfigAction::Normalize { path: file },
            CardConfigSubcommand::Migrate { file } => ConfigAction::Migrate { path: file },
            CardConfigSubcommand::Flatten { file } => ConfigAction::Flatten { path: file },
            CardConfigSubcommand::Strip { file, output } => ConfigAction::Strip { path: file, output },
        }
    }
}
