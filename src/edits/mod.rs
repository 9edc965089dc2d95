//! Edits that can be applied to a settings document.

use crate::patcher::Patcher;
use crate::EditorFontError;

/// Macro to declare settings edits with less boilerplate
///
/// Usage: `declare_edits! { TypeName(module_name) => "cli_name", ... }`
macro_rules! declare_edits {
    ($($(#[$meta:meta])* $type:ident($module:ident) => $name:literal),* $(,)?) => {
        $(
            $(#[$meta])*
            mod $module;
        )*

        $(
            $(#[$meta])*
            pub use $module::$type;
        )*

        #[cfg(feature = "cli")]
        #[doc="Add settings edit arguments to a clap Command"]
        pub fn edit_group(mut command: clap::Command) -> clap::Command {
            command = command.next_help_heading("Settings edits");
            let mut ids = Vec::new();
            $(
                $(#[$meta])*
                {
                    let arg = $type::arg();
                    ids.push(arg.get_id().clone());
                    command = command.arg(arg);
                }
            )*
            command.group(clap::ArgGroup::new("edits").args(ids).multiple(true))
        }

        #[doc="Convert a CLI edit name and argument to a SettingsEdit instance"]
        pub fn cli_to_edit(name: &str, arg: &str) -> Result<Box<dyn SettingsEdit>, EditorFontError> {
            Ok(match name {
                $(
                    $(#[$meta])*
                    $name => Box::new($type::from_str(arg)?),
                )*
                _ => {
                    return Err(EditorFontError::InvalidEdit(format!(
                        "Unknown edit: {}",
                        name
                    )))
                }
            })
        }
    };
}

declare_edits! {
    SetProperty(setproperty) => "set",
    RemoveProperty(removeproperty) => "unset",
}

/// A change that can be applied to the text of a settings document
pub trait SettingsEdit {
    /// Apply the edit to the document in place
    fn apply(&self, patcher: &Patcher, document: &mut String) -> Result<(), EditorFontError>;

    /// Parse a SettingsEdit from a string argument
    fn from_str(s: &str) -> Result<Self, EditorFontError>
    where
        Self: Sized;

    #[cfg(feature = "cli")]
    /// Get the clap argument for this edit
    fn arg() -> clap::Arg
    where
        Self: Sized;
}

/// Apply a chain of edits in order, returning the edited text
pub fn apply_edits(
    patcher: &Patcher,
    text: &str,
    edits: &[Box<dyn SettingsEdit>],
) -> Result<String, EditorFontError> {
    let mut document = text.to_string();
    for edit in edits {
        edit.apply(patcher, &mut document)?;
    }
    Ok(document)
}

/// Collect the edits given on the command line, in the order they were given
///
/// Clap stores `--set a=1 --unset b --set c=2` as `"set": ["a=1", "c=2"],
/// "unset": ["b"]`, so the order is recovered from the raw occurrences of the
/// `edits` group.
#[cfg(feature = "cli")]
pub fn edits_from_matches(
    matches: &clap::ArgMatches,
) -> Result<Vec<Box<dyn SettingsEdit>>, EditorFontError> {
    let Some(group) = matches.get_raw("edits") else {
        return Ok(vec![]);
    };
    let mut counter = std::collections::HashMap::new();
    let mut edits = vec![];
    for id in group {
        let name = id.to_string_lossy().into_owned();
        let count = counter.entry(name.clone()).or_insert(0);
        let value = matches
            .get_raw_occurrences(&name)
            .and_then(|mut occurrences| occurrences.nth(*count))
            .map(|values| {
                values
                    .map(|v| v.to_string_lossy().into_owned())
                    .collect::<String>()
            })
            .ok_or_else(|| EditorFontError::InvalidEdit(format!("Missing value for --{}", name)))?;
        *count += 1;
        edits.push(cli_to_edit(&name, &value)?);
    }
    Ok(edits)
}
