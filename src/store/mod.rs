//! Store contract and its implementations
//!
//! [`Store`] is the persistence seam between the domain model and a concrete
//! backend. Two backends implement it:
//!
//! - [`SqlStore`] - durable, SQLite-backed (requires the `sqlite` feature)
//! - [`MemoryStore`] - non-durable, for tests and embedding

use crate::error::{Error, Result};
use crate::model::{Config, ConfigId, Setting, SettingId};
use crate::name::validate_name;
use crate::types::{Type, Value};

mod memory;
#[cfg(feature = "sqlite")]
pub mod sql;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sql::{SqlStore, SqlStoreOptions, SqlStoreOptionsBuilder};

/// Trait for store implementations
///
/// All operations are synchronous request/response calls. Lookups of absent
/// configs or settings return `Ok(None)`; operations addressing an id that
/// does not exist fail with a not-found error.
pub trait Store: Send + Sync {
    /// Create a config with the given name and description.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidName`] if the name does not follow the naming rule
    /// * [`Error::ConfigExists`] if the name is taken
    fn create_config(&self, name: &str, desc: &str) -> Result<Config>;

    /// Get the config with the given name, including its settings.
    fn get_config(&self, name: &str) -> Result<Option<Config>>;

    /// Get all configs, including their settings.
    fn get_configs(&self) -> Result<Vec<Config>>;

    /// Replace a config's description. Returns whether it changed.
    fn set_config_desc(&self, config: ConfigId, desc: &str) -> Result<bool>;

    /// Create a setting of type `typ` in a config.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidName`] if the name does not follow the naming rule
    /// * [`Error::UnsupportedType`] if `typ` is [`Type::Unsupported`]
    /// * [`Error::TypeMismatch`] if `value` is not of type `typ`
    /// * [`Error::ConfigNotFound`] if the config does not exist
    /// * [`Error::SettingExists`] if the config already has a setting named `name`
    fn create_setting(
        &self,
        config: ConfigId,
        name: &str,
        typ: Type,
        value: Value,
    ) -> Result<Setting>;

    /// Get a config's setting by name.
    fn get_setting(&self, config: ConfigId, name: &str) -> Result<Option<Setting>>;

    /// Replace a setting's value. Returns `Ok(false)` if the value is unchanged.
    ///
    /// # Errors
    ///
    /// * [`Error::SettingNotFound`] if the setting does not exist
    /// * [`Error::TypeMismatch`] if the value's type differs from the setting's
    fn set_setting_value(&self, setting: SettingId, value: Value) -> Result<bool>;

    /// Replace a setting's description. Returns whether it changed.
    fn set_setting_desc(&self, setting: SettingId, desc: &str) -> Result<bool>;

    /// Deprecate a setting, optionally recording why.
    ///
    /// Idempotent: deprecating a deprecated setting succeeds and replaces the
    /// reason when one is given. Returns true on success.
    fn deprecate_setting(&self, setting: SettingId, reason: Option<&str>) -> Result<bool>;

    /// Replace the deprecation reason of a deprecated setting.
    ///
    /// Returns `Ok(false)` if the setting is not deprecated or the reason is
    /// unchanged.
    fn set_setting_deprecation_reason(&self, setting: SettingId, reason: &str) -> Result<bool>;

    /// Set the value of the setting `name`, creating it with the value's type
    /// if it does not exist.
    ///
    /// Safe to call concurrently for the same name: when another caller
    /// creates the setting first, the value is applied as an update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the setting exists with another type,
    /// otherwise the errors of [`create_setting`](Self::create_setting) and
    /// [`set_setting_value`](Self::set_setting_value).
    fn set(&self, config: ConfigId, name: &str, value: Value) -> Result<Setting> {
        let existing = match self.get_setting(config, name)? {
            Some(existing) => existing,
            None => {
                let typ = value.value_type();
                match self.create_setting(config, name, typ, value.clone()) {
                    Err(Error::SettingExists { .. }) => self
                        .get_setting(config, name)?
                        .ok_or_else(|| Error::SettingNotFound(name.to_string()))?,
                    created => return created,
                }
            }
        };

        let id = existing
            .id()
            .ok_or_else(|| Error::SettingNotFound(name.to_string()))?;
        self.set_setting_value(id, value)?;

        self.get_setting(config, name)?
            .ok_or_else(|| Error::SettingNotFound(name.to_string()))
    }
}

/// Checks shared by every backend before a setting is created
pub(crate) fn check_new_setting(name: &str, typ: Type, value: &Value) -> Result<()> {
    validate_name(name)?;

    if !typ.is_storable() {
        return Err(Error::UnsupportedType);
    }

    if value.value_type() != typ {
        return Err(Error::TypeMismatch {
            setting: name.to_string(),
            expected: typ,
            actual: value.value_type(),
        });
    }

    Ok(())
}
