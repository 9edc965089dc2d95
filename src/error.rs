use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while installing fonts or editing settings
///
/// The property patcher itself never fails; everything here comes from the
/// I/O around it.
#[derive(Debug, Error)]
pub enum EditorFontError {
    /// The settings file does not exist
    #[error("Settings file not found at {path:?}")]
    MissingFile {
        /// The path that was looked up
        path: PathBuf,
    },

    #[error("IO Error: {0}")]
    /// IO error
    IO(#[from] io::Error),

    /// The profile file could not be parsed
    #[error("Error parsing profile: {0}")]
    Config(#[from] serde_json::Error),

    /// None of the profile's font files could be found
    #[error("Font files not found; looked for {searched:?}")]
    FontsNotFound {
        /// Every source path that was tried
        searched: Vec<PathBuf>,
    },

    /// An existing font file could not be replaced
    #[error("Cannot overwrite {path:?}; the file may be in use. Close any applications using this font and try again")]
    FileInUse {
        /// The destination that could not be removed
        path: PathBuf,
    },

    /// An external command exited unsuccessfully
    #[error("Command `{command}` failed with exit code {code:?}")]
    CommandFailed {
        /// The command line, joined with spaces
        command: String,
        /// The exit code, if the process was not killed by a signal
        code: Option<i32>,
    },

    /// A settings edit could not be built from its argument
    #[error("Invalid settings edit: {0}")]
    InvalidEdit(String),

    /// A platform directory could not be determined
    #[error("Could not determine the {0} directory for this platform")]
    NoDirectory(&'static str),
}
