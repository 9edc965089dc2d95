//! What gets installed, and where.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::edits::{RemoveProperty, SetProperty, SettingsEdit};
use crate::EditorFontError;

/// Settings key for the editor font stack
pub const EDITOR_FONT_FAMILY: &str = "editor.fontFamily";
/// Settings key for the editor's ligature switch
pub const EDITOR_FONT_LIGATURES: &str = "editor.fontLigatures";
/// Settings key for the integrated terminal font
pub const TERMINAL_FONT_FAMILY: &str = "terminal.integrated.fontFamily";
/// Per-user font registrations on Windows
pub const REGISTRY_FONTS_KEY: &str = r"HKCU\Software\Microsoft\Windows NT\CurrentVersion\Fonts";

/// Environment variable overriding the settings file path
pub const SETTINGS_ENV: &str = "EDITORFONT_SETTINGS";
/// Environment variable overriding the user font directory
pub const FONTS_DIR_ENV: &str = "EDITORFONT_FONTS_DIR";
/// Environment variable overriding the font source directory
pub const SOURCE_DIR_ENV: &str = "EDITORFONT_SOURCE_DIR";

const DEFAULT_SOURCE_DIR: &str = "resources/fonts/Monocraft-font";

/// A font file shipped with the installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFile {
    /// File name in the user font directory
    pub file_name: String,
    /// Value name under [`REGISTRY_FONTS_KEY`]
    pub registry_name: String,
    /// Location relative to the source directory
    pub source: PathBuf,
}

/// The fonts to install and the settings values that select them
///
/// Every field has a default, so a profile file only needs to name what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontProfile {
    /// Value for `editor.fontFamily`
    pub editor_font_family: String,
    /// Value for `editor.fontLigatures`
    pub ligatures: bool,
    /// Value for `terminal.integrated.fontFamily`
    pub terminal_font_family: String,
    /// Font files to copy into the user font directory
    pub fonts: Vec<FontFile>,
    /// Whether to add registry entries for installed fonts
    pub register_fonts: bool,
}

impl Default for FontProfile {
    fn default() -> Self {
        FontProfile {
            editor_font_family:
                "Monocraft, 'Monocraft Nerd Font', Consolas, 'Courier New', monospace".to_string(),
            ligatures: true,
            terminal_font_family: "Monocraft Nerd Font".to_string(),
            fonts: vec![
                FontFile {
                    file_name: "Monocraft-nerd-fonts-patched.ttc".to_string(),
                    registry_name: "Monocraft Nerd Font (TrueType)".to_string(),
                    source: PathBuf::from("Monocraft-nerd-fonts-patched.ttc"),
                },
                FontFile {
                    file_name: "Monocraft.ttf".to_string(),
                    registry_name: "Monocraft".to_string(),
                    source: ["Monocraft-ttf-otf", "other-formats", "Monocraft.ttf"]
                        .iter()
                        .collect(),
                },
            ],
            register_fonts: cfg!(windows),
        }
    }
}

impl FontProfile {
    /// Load a profile from a JSON file
    pub fn load(path: &Path) -> Result<Self, EditorFontError> {
        log::debug!("Loading profile {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The settings edits that add this profile's fonts, or remove them
    pub fn edits(&self, add: bool) -> Vec<Box<dyn SettingsEdit>> {
        if add {
            vec![
                Box::new(SetProperty::new(
                    EDITOR_FONT_FAMILY,
                    self.editor_font_family.as_str(),
                )),
                Box::new(SetProperty::new(EDITOR_FONT_LIGATURES, self.ligatures)),
                Box::new(SetProperty::new(
                    TERMINAL_FONT_FAMILY,
                    self.terminal_font_family.as_str(),
                )),
            ]
        } else {
            vec![
                Box::new(RemoveProperty::new(EDITOR_FONT_FAMILY)),
                Box::new(RemoveProperty::new(EDITOR_FONT_LIGATURES)),
                Box::new(RemoveProperty::new(TERMINAL_FONT_FAMILY)),
            ]
        }
    }
}

/// Paths given explicitly, typically on the command line
#[derive(Debug, Clone, Default)]
pub struct LocationOverrides {
    /// The settings file
    pub settings: Option<PathBuf>,
    /// The user font directory
    pub fonts_dir: Option<PathBuf>,
    /// Where the bundled fonts are read from
    pub source_dir: Option<PathBuf>,
}

/// Where the settings file and fonts live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    /// The editor's settings file
    pub settings: PathBuf,
    /// The current user's font directory
    pub fonts_dir: PathBuf,
    /// Where the bundled fonts are read from
    pub source_dir: PathBuf,
}

impl Locations {
    /// Resolve each path from the overrides, then the environment, then the
    /// platform default
    pub fn resolve(overrides: LocationOverrides) -> Result<Self, EditorFontError> {
        Self::resolve_with(overrides, |name| std::env::var_os(name))
    }

    /// [`Locations::resolve`] with a custom environment lookup
    pub fn resolve_with(
        overrides: LocationOverrides,
        env: impl Fn(&str) -> Option<OsString>,
    ) -> Result<Self, EditorFontError> {
        let pick = |given: Option<PathBuf>, var: &str| {
            given.or_else(|| env(var).filter(|v| !v.is_empty()).map(PathBuf::from))
        };
        let settings = match pick(overrides.settings, SETTINGS_ENV) {
            Some(path) => path,
            None => default_settings_path()?,
        };
        let fonts_dir = match pick(overrides.fonts_dir, FONTS_DIR_ENV) {
            Some(path) => path,
            None => default_fonts_dir()?,
        };
        let source_dir = pick(overrides.source_dir, SOURCE_DIR_ENV).unwrap_or_else(|| {
            let exe = std::env::current_exe().ok();
            default_source_dir(exe.as_deref().and_then(Path::parent))
        });
        log::debug!(
            "Settings: {}, fonts: {}, source: {}",
            settings.display(),
            fonts_dir.display(),
            source_dir.display()
        );
        Ok(Locations {
            settings,
            fonts_dir,
            source_dir,
        })
    }
}

/// The bundled fonts next to the working directory, else next to the
/// executable. Falls back to the working-directory path when neither exists.
fn default_source_dir(exe_dir: Option<&Path>) -> PathBuf {
    let relative = PathBuf::from(DEFAULT_SOURCE_DIR);
    if relative.is_dir() {
        return relative;
    }
    match exe_dir.map(|dir| dir.join(DEFAULT_SOURCE_DIR)) {
        Some(beside_exe) if beside_exe.is_dir() => beside_exe,
        _ => relative,
    }
}

fn default_settings_path() -> Result<PathBuf, EditorFontError> {
    let config = dirs::config_dir().ok_or(EditorFontError::NoDirectory("configuration"))?;
    Ok(config.join("Code").join("User").join("settings.json"))
}

fn default_fonts_dir() -> Result<PathBuf, EditorFontError> {
    if cfg!(windows) {
        let local = dirs::data_local_dir().ok_or(EditorFontError::NoDirectory("local data"))?;
        Ok(local.join("Microsoft").join("Windows").join("Fonts"))
    } else {
        dirs::font_dir().ok_or(EditorFontError::NoDirectory("font"))
    }
}
