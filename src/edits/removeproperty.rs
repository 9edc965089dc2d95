use crate::edits::SettingsEdit;
use crate::patcher::Patcher;

/// An edit that removes every line holding a property
#[derive(Debug, Clone)]
pub struct RemoveProperty {
    key: String,
}

impl RemoveProperty {
    /// Create a new RemoveProperty edit
    pub fn new(key: impl Into<String>) -> Self {
        RemoveProperty { key: key.into() }
    }
}

impl SettingsEdit for RemoveProperty {
    fn apply(&self, patcher: &Patcher, document: &mut String) -> Result<(), crate::EditorFontError> {
        log::info!("Removing {:?}", self.key);
        *document = patcher.remove(document, &self.key);
        Ok(())
    }

    fn from_str(s: &str) -> Result<Self, crate::EditorFontError>
    where
        Self: Sized,
    {
        let key = s.trim();
        if key.is_empty() {
            return Err(crate::EditorFontError::InvalidEdit(
                "Empty key for --unset".to_string(),
            ));
        }
        Ok(RemoveProperty::new(key))
    }

    #[cfg(feature = "cli")]
    fn arg() -> clap::Arg
    where
        Self: Sized,
    {
        clap::Arg::new("unset")
            .long("unset")
            .value_name("KEY")
            .help("Remove a property")
            .action(clap::ArgAction::Append)
    }
}
