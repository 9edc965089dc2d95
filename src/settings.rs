//! Reading and rewriting the editor settings file.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use crate::edits::{apply_edits, SettingsEdit};
use crate::patcher::Patcher;
use crate::store::FileStore;
use crate::{EditorFontError, FontProfile};

/// Whether applying edits changed the settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    /// The file was rewritten
    Updated,
    /// The edits were already in effect; nothing was written
    Unchanged,
}

/// Applies edits to an editor settings file held in a [`FileStore`]
pub struct SettingsManager<'a, S: FileStore> {
    store: &'a S,
    path: PathBuf,
    patcher: Patcher,
}

impl<'a, S: FileStore> SettingsManager<'a, S> {
    /// Manage the settings file at `path`
    pub fn new(store: &'a S, path: impl Into<PathBuf>) -> Self {
        SettingsManager {
            store,
            path: path.into(),
            patcher: Patcher::new(),
        }
    }

    /// Use the given patcher, e.g. one with a stricter key match
    pub fn with_patcher(mut self, patcher: Patcher) -> Self {
        self.patcher = patcher;
        self
    }

    /// The settings file being managed
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add the profile's font settings, or remove them
    pub fn modify(&self, profile: &FontProfile, add: bool) -> Result<SettingsChange, EditorFontError> {
        self.apply(&profile.edits(add))
    }

    /// Apply a chain of edits, writing the file back only if it changed
    pub fn apply(&self, edits: &[Box<dyn SettingsEdit>]) -> Result<SettingsChange, EditorFontError> {
        let (before, after) = self.patched(edits)?;
        if before == after {
            log::info!("{} already up to date", self.path.display());
            return Ok(SettingsChange::Unchanged);
        }
        self.store.write(&self.path, &after)?;
        log::info!("Updated {}", self.path.display());
        Ok(SettingsChange::Updated)
    }

    /// A unified diff of what [`SettingsManager::apply`] would change
    ///
    /// Empty when the edits are already in effect.
    pub fn preview(&self, edits: &[Box<dyn SettingsEdit>]) -> Result<String, EditorFontError> {
        let (before, after) = self.patched(edits)?;
        if before == after {
            return Ok(String::new());
        }
        let name = self.path.display().to_string();
        Ok(TextDiff::from_lines(&before, &after)
            .unified_diff()
            .header(&name, &name)
            .to_string())
    }

    fn patched(&self, edits: &[Box<dyn SettingsEdit>]) -> Result<(String, String), EditorFontError> {
        if !self.store.exists(&self.path) {
            return Err(EditorFontError::MissingFile {
                path: self.path.clone(),
            });
        }
        let before = self.store.read(&self.path)?;
        let after = apply_edits(&self.patcher, &before, edits)?;
        Ok((before, after))
    }
}
