//! Configs: named collections of settings

use super::fields::Audit;
use super::setting::Setting;
use crate::error::Result;
use crate::name::validate_name;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use time::OffsetDateTime;

/// Backend-assigned identifier of a persisted config
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(i64);

impl ConfigId {
    /// Wrap a raw backend identifier
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw backend identifier
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, described collection of [`Setting`]s.
///
/// Setting names are unique within a config, not globally.
///
/// # Example
///
/// ```
/// use cfgstore::{Config, Error, Value};
///
/// let mut config = Config::new("billing", "billing settings")?;
/// config.set("max_retries", 3i32)?;
///
/// // The type of a setting never changes
/// assert!(matches!(config.set("max_retries", "three"), Err(Error::TypeMismatch { .. })));
/// assert_eq!(config.setting("max_retries").unwrap().value(), &Value::Int32(3));
/// # Ok::<(), cfgstore::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub(crate) id: Option<ConfigId>,
    pub(crate) name: String,
    pub(crate) description: String,
    #[serde(flatten)]
    pub(crate) audit: Audit,
    pub(crate) settings: BTreeMap<String, Setting>,
}

impl Config {
    /// Create a detached config with no settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`](crate::Error::InvalidName) if `name` does
    /// not follow the naming rule.
    pub fn new(name: &str, desc: &str) -> Result<Self> {
        validate_name(name)?;

        Ok(Self {
            id: None,
            name: name.to_string(),
            description: desc.to_string(),
            audit: Audit::default(),
            settings: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> Option<ConfigId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.audit.created_at
    }

    pub fn created_by(&self) -> &str {
        &self.audit.created_by
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.audit.updated_at
    }

    pub fn updated_by(&self) -> &str {
        &self.audit.updated_by
    }

    /// Look up a setting by name
    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.get(name)
    }

    /// Look up several settings at once, in the order asked for.
    /// Names with no setting are skipped.
    pub fn settings_named(&self, names: &[&str]) -> Vec<&Setting> {
        names.iter().filter_map(|name| self.setting(name)).collect()
    }

    /// All settings, ordered by name
    pub fn settings(&self) -> impl Iterator<Item = &Setting> {
        self.settings.values()
    }

    /// Number of settings in this config
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Replace the description. Returns whether it changed.
    pub fn set_desc(&mut self, desc: &str) -> bool {
        if self.description == desc {
            return false;
        }
        self.description = desc.to_string();
        self.audit.touch();
        true
    }

    /// Set the value of the setting `name`, creating it if it does not exist.
    ///
    /// A new setting takes the type of `value`. An existing setting keeps its
    /// type and only accepts values of that type.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidName`](crate::Error::InvalidName) if a new setting's
    ///   name does not follow the naming rule
    /// * [`Error::TypeMismatch`](crate::Error::TypeMismatch) if the existing
    ///   setting has a different type; it is left unchanged
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&Setting> {
        let value = value.into();

        match self.settings.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let setting = entry.into_mut();
                setting.set_value(value)?;
                Ok(&*setting)
            }
            Entry::Vacant(entry) => {
                let mut setting = Setting::new(name, value)?;
                setting.config_id = self.id;
                setting.config_name = self.name.clone();
                Ok(&*entry.insert(setting))
            }
        }
    }

    /// Like [`set`](Self::set), for a dynamically-typed value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`](crate::Error::UnsupportedType) if the
    /// value is not one of the registered types, otherwise the errors of
    /// [`set`](Self::set).
    pub fn set_any(&mut self, name: &str, value: &dyn Any) -> Result<&Setting> {
        let value = Value::from_any(value)?;
        self.set(name, value)
    }

    /// Deprecate the setting `name`. Returns `None` if there is no such setting.
    pub fn deprecate(&mut self, name: &str, reason: Option<&str>) -> Option<&Setting> {
        let setting = self.settings.get_mut(name)?;
        setting.deprecate(reason);
        Some(&*setting)
    }

    /// Attach a setting loaded from a store
    pub(crate) fn insert_setting(&mut self, setting: Setting) {
        self.settings.insert(setting.name.clone(), setting);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Type;

    #[test]
    fn test_new_config_is_empty() {
        let config = Config::new("billing", "billing settings").unwrap();

        assert_eq!(config.name(), "billing");
        assert_eq!(config.description(), "billing settings");
        assert!(config.id().is_none());
        assert!(config.is_empty());
        assert_eq!(config.created_at(), OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_settings_named_keeps_request_order() {
        let mut config = Config::new("billing", "").unwrap();
        config.set("currency", "EUR").unwrap();
        config.set("max_retries", 3i32).unwrap();

        let found: Vec<&str> = config
            .settings_named(&["max_retries", "absent", "currency"])
            .into_iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(found, vec!["max_retries", "currency"]);
        assert!(config.settings_named(&[]).is_empty());
    }

    #[test]
    fn test_new_config_rejects_invalid_names() {
        for name in ["", "1st", "has space", "semi;colon", "-dash"] {
            assert!(
                matches!(Config::new(name, ""), Err(Error::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_set_creates_with_inferred_type() {
        let mut config = Config::new("billing", "").unwrap();
        let setting = config.set("currency", "EUR").unwrap();

        assert_eq!(setting.value_type(), Type::String);
        assert_eq!(setting.config_name(), "billing");
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn test_set_type_is_immutable() {
        let mut config = Config::new("billing", "").unwrap();
        config.set("x", 1i32).unwrap();

        let err = config.set("x", "a string").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(config.setting("x").unwrap().value(), &Value::Int32(1));
    }

    #[test]
    fn test_set_existing_updates_value() {
        let mut config = Config::new("billing", "").unwrap();
        config.set("x", 1i32).unwrap();
        config.set("x", 2i32).unwrap();

        assert_eq!(config.setting("x").unwrap().value(), &Value::Int32(2));
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn test_set_rejects_invalid_setting_name() {
        let mut config = Config::new("billing", "").unwrap();
        assert!(matches!(
            config.set("bad name", 1u8),
            Err(Error::InvalidName(_))
        ));
        assert!(config.is_empty());
    }

    #[test]
    fn test_set_any_rejects_unsupported() {
        let mut config = Config::new("billing", "").unwrap();

        assert!(matches!(
            config.set_any("tiers", &vec![1, 2, 3]),
            Err(Error::UnsupportedType)
        ));
        assert!(config.setting("tiers").is_none());

        let setting = config.set_any("tier", &2u16).unwrap();
        assert_eq!(setting.value(), &Value::Uint16(2));
    }

    #[test]
    fn test_deprecate_by_name() {
        let mut config = Config::new("billing", "").unwrap();
        config.set("legacy", true).unwrap();

        assert!(config.deprecate("missing", None).is_none());
        let setting = config.deprecate("legacy", Some("unused")).unwrap();
        assert!(setting.is_deprecated());
        assert_eq!(setting.deprecation_reason(), "unused");
    }

    #[test]
    fn test_set_desc_reports_change() {
        let mut config = Config::new("billing", "old").unwrap();

        assert!(!config.set_desc("old"));
        assert!(config.set_desc("new"));
        assert_eq!(config.description(), "new");
    }

    #[test]
    fn test_settings_are_ordered_by_name() {
        let mut config = Config::new("billing", "").unwrap();
        config.set("zeta", 1u8).unwrap();
        config.set("alpha", 2u8).unwrap();

        let names: Vec<&str> = config.settings().map(Setting::name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
