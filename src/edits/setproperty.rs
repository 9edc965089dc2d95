use crate::edits::SettingsEdit;
use crate::patcher::{Patcher, PropertyValue};

/// An edit that adds a property, or updates it in place if already present
#[derive(Debug, Clone)]
pub struct SetProperty {
    key: String,
    value: PropertyValue,
}

impl SetProperty {
    /// Create a new SetProperty edit
    pub fn new(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        SetProperty {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The property name
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl SettingsEdit for SetProperty {
    fn apply(&self, patcher: &Patcher, document: &mut String) -> Result<(), crate::EditorFontError> {
        log::info!("Setting {:?} to {}", self.key, self.value);
        *document = patcher.upsert(document, &self.key, self.value.clone());
        Ok(())
    }

    fn from_str(s: &str) -> Result<Self, crate::EditorFontError>
    where
        Self: Sized,
    {
        let (key, value) = s.split_once('=').ok_or_else(|| {
            crate::EditorFontError::InvalidEdit(format!("Expected KEY=VALUE, got {:?}", s))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(crate::EditorFontError::InvalidEdit(format!(
                "Empty key in {:?}",
                s
            )));
        }
        Ok(SetProperty::new(key, value))
    }

    #[cfg(feature = "cli")]
    fn arg() -> clap::Arg
    where
        Self: Sized,
    {
        clap::Arg::new("set")
            .long("set")
            .value_name("KEY=VALUE")
            .help("Add or update a property; `true` and `false` are written unquoted")
            .action(clap::ArgAction::Append)
    }
}
