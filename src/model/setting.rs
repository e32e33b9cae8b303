//! Settings: named, typed values owned by a config

use super::config::ConfigId;
use super::fields::{Audit, Deprecation, now};
use crate::error::{Error, Result};
use crate::name::validate_name;
use crate::types::{Type, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Backend-assigned identifier of a persisted setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingId(i64);

impl SettingId {
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

impl fmt::Display for SettingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named value inside a [`Config`](super::Config).
///
/// The value's [`Type`] is fixed when the setting is created. Storing a value
/// of another type requires a new setting.
///
/// # Example
///
/// ```
/// use cfgstore::{Setting, Type};
///
/// let mut setting = Setting::new("max_retries", 3i32)?;
/// assert_eq!(setting.value_type(), Type::Int32);
///
/// assert!(setting.set_value(5i32)?);
/// assert!(!setting.set_value(5i32)?);
/// assert!(setting.set_value("five").is_err());
/// # Ok::<(), cfgstore::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub(crate) id: Option<SettingId>,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) value: Value,
    #[serde(flatten)]
    pub(crate) deprecation: Deprecation,
    #[serde(flatten)]
    pub(crate) audit: Audit,
    pub(crate) config_id: Option<ConfigId>,
    pub(crate) config_name: String,
}

impl Setting {
    /// Create a detached setting. It gets an id and an owning config once a
    /// store persists it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if `name` does not follow the naming rule.
    pub fn new(name: &str, value: impl Into<Value>) -> Result<Self> {
        validate_name(name)?;

        Ok(Self {
            id: None,
            name: name.to_string(),
            description: String::new(),
            value: value.into(),
            deprecation: Deprecation::default(),
            audit: Audit::default(),
            config_id: None,
            config_name: String::new(),
        })
    }

    /// Set the description while building a detached setting
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn id(&self) -> Option<SettingId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The type fixed at creation
    pub fn value_type(&self) -> Type {
        self.value.value_type()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation.deprecated
    }

    /// When the setting was first deprecated. Only meaningful if
    /// [`is_deprecated`](Self::is_deprecated) returns true.
    pub fn deprecated_at(&self) -> Option<OffsetDateTime> {
        self.deprecation.deprecated_at
    }

    pub fn deprecation_reason(&self) -> &str {
        &self.deprecation.reason
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

    /// Id of the owning config, once persisted
    pub fn config_id(&self) -> Option<ConfigId> {
        self.config_id
    }

    /// Name of the owning config (empty for detached settings)
    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    /// Returns true if `value` can be stored in this setting
    pub fn is_valid_value(&self, value: &Value) -> bool {
        value.value_type() == self.value_type()
    }

    /// Replace the value.
    ///
    /// Returns `Ok(false)` without touching the setting if the new value equals
    /// the current one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value's type differs from the
    /// setting's type. The setting is left unchanged.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<bool> {
        let value = value.into();

        if !self.is_valid_value(&value) {
            return Err(Error::TypeMismatch {
                setting: self.name.clone(),
                expected: self.value_type(),
                actual: value.value_type(),
            });
        }

        if self.value == value {
            return Ok(false);
        }

        self.value = value;
        self.audit.touch();
        Ok(true)
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

    /// Deprecate this setting, optionally recording why.
    ///
    /// Deprecating an already deprecated setting succeeds and replaces the
    /// reason when one is given. Always returns true.
    pub fn deprecate(&mut self, reason: Option<&str>) -> bool {
        if self.deprecation.mark(reason, now()) {
            self.audit.touch();
        }
        true
    }

    /// Replace the deprecation reason.
    ///
    /// Returns false if the setting is not deprecated or the reason is unchanged.
    pub fn set_deprecation_reason(&mut self, reason: &str) -> bool {
        let changed = self.deprecation.set_reason(reason);
        if changed {
            self.audit.touch();
        }
        changed
    }
}
