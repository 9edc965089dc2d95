//! # editorfont
//!
//! editorfont installs a bundled font for the current user and points a code
//! editor at it. It has two halves:
//!
//! - **Fonts**: [`fonts::FontInstaller`] copies the profile's font files into
//!   the user font directory and, on Windows, registers them under
//!   `HKCU\Software\Microsoft\Windows NT\CurrentVersion\Fonts`.
//! - **Settings**: [`settings::SettingsManager`] adds or removes the
//!   `editor.fontFamily`, `editor.fontLigatures` and
//!   `terminal.integrated.fontFamily` keys in the editor's `settings.json`.
//!
//! ## Editing settings without reformatting them
//!
//! Settings files are owned by the user and are often not strict JSON
//! (comments, trailing commas). Rather than parse and reserialize them,
//! [`patcher`] edits them line by line: a property is replaced in place,
//! inserted before the closing brace, or deleted, and only the lines it
//! touches change.
//!
//! ```
//! use editorfont::patcher::{remove, upsert};
//!
//! let text = "{\n    \"a\": \"1\"\n}";
//! let text = upsert(text, "b", "true");
//! assert_eq!(text, "{\n    \"a\": \"1\",\n    \"b\": true\n}");
//! assert_eq!(remove(&text, "a"), "{\n    \"b\": true\n}");
//! ```
//!
//! ## Edit chains
//!
//! Edits implement [`edits::SettingsEdit`] and are applied in order:
//!
//! ```no_run
//! use editorfont::edits::{RemoveProperty, SetProperty, SettingsEdit};
//! use editorfont::settings::SettingsManager;
//! use editorfont::store::FsStore;
//! use editorfont::EditorFontError;
//!
//! fn main() -> Result<(), EditorFontError> {
//!     let store = FsStore;
//!     let manager = SettingsManager::new(&store, "settings.json");
//!     let edits: Vec<Box<dyn SettingsEdit>> = vec![
//!         Box::new(SetProperty::new("editor.fontFamily", "Monocraft")),
//!         Box::new(RemoveProperty::new("editor.fontSize")),
//!     ];
//!     manager.apply(&edits)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli`: Build the `editorfont` command-line tool (default: enabled)

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

pub mod config;
pub mod edits;
mod error;
pub mod fonts;
pub mod patcher;
pub mod runner;
pub mod settings;
pub mod store;

pub use crate::{
    config::{FontFile, FontProfile, LocationOverrides, Locations},
    error::EditorFontError,
    fonts::{FontInstaller, InstallOutcome},
    patcher::{KeyMatch, Patcher, PropertyValue},
    settings::{SettingsChange, SettingsManager},
};
