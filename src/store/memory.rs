//! In-memory store for testing and embedding

use super::{Store, check_new_setting};
use crate::error::{Error, Result};
use crate::model::{Audit, Config, ConfigId, Setting, SettingId, now};
use crate::name::validate_name;
use crate::sync::RwLockExt;
use crate::types::{Type, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

#[derive(Default)]
struct State {
    last_config_id: i64,
    last_setting_id: i64,
    configs: BTreeMap<ConfigId, Config>,
    config_ids: HashMap<String, ConfigId>,
    setting_index: HashMap<SettingId, (ConfigId, String)>,
}

impl State {
    fn setting_mut(&mut self, id: SettingId) -> Result<&mut Setting> {
        let not_found = || Error::SettingNotFound(id.to_string());
        let (config, name) = self.setting_index.get(&id).ok_or_else(not_found)?;

        self.configs
            .get_mut(config)
            .and_then(|c| c.settings.get_mut(name))
            .ok_or_else(not_found)
    }
}

/// In-memory [`Store`] (not persisted)
///
/// Follows the same contract as [`SqlStore`](super::SqlStore), except that
/// float NaN and negative zero values are accepted.
pub struct MemoryStore {
    state: RwLock<State>,
    actor: String,
}

impl MemoryStore {
    /// Create an empty store that records writes as the default actor
    #[must_use]
    pub fn new() -> Self {
        Self::with_actor("system")
    }

    /// Create an empty store that records writes as `actor`
    #[must_use]
    pub fn with_actor(actor: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(State::default()),
            actor: actor.into(),
        }
    }

    /// Name recorded in `created_by`/`updated_by`
    pub fn actor(&self) -> &str {
        &self.actor
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn create_config(&self, name: &str, desc: &str) -> Result<Config> {
        let mut config = Config::new(name, desc)?;
        let mut state = self.state.write_recovered();

        if state.config_ids.contains_key(name) {
            return Err(Error::ConfigExists(name.to_string()));
        }

        state.last_config_id += 1;
        let id = ConfigId::new(state.last_config_id);
        config.id = Some(id);
        config.audit = Audit::created(now(), &self.actor);

        state.config_ids.insert(name.to_string(), id);
        state.configs.insert(id, config.clone());
        Ok(config)
    }

    fn get_config(&self, name: &str) -> Result<Option<Config>> {
        let state = self.state.read_recovered();
        Ok(state
            .config_ids
            .get(name)
            .and_then(|id| state.configs.get(id))
            .cloned())
    }

    fn get_configs(&self) -> Result<Vec<Config>> {
        Ok(self.state.read_recovered().configs.values().cloned().collect())
    }

    fn set_config_desc(&self, config: ConfigId, desc: &str) -> Result<bool> {
        let mut state = self.state.write_recovered();
        let entry = state
            .configs
            .get_mut(&config)
            .ok_or_else(|| Error::ConfigNotFound(config.to_string()))?;

        if !entry.set_desc(desc) {
            return Ok(false);
        }
        entry.audit.record_update(now(), &self.actor);
        Ok(true)
    }

    fn create_setting(
        &self,
        config: ConfigId,
        name: &str,
        typ: Type,
        value: Value,
    ) -> Result<Setting> {
        check_new_setting(name, typ, &value)?;
        let mut setting = Setting::new(name, value)?;

        let mut state = self.state.write_recovered();
        let next_id = SettingId::new(state.last_setting_id + 1);

        let owner = state
            .configs
            .get_mut(&config)
            .ok_or_else(|| Error::ConfigNotFound(config.to_string()))?;
        if owner.setting(name).is_some() {
            return Err(Error::SettingExists {
                config: owner.name().to_string(),
                name: name.to_string(),
            });
        }

        setting.id = Some(next_id);
        setting.config_id = Some(config);
        setting.config_name = owner.name().to_string();
        setting.audit = Audit::created(now(), &self.actor);
        owner.insert_setting(setting.clone());

        state.last_setting_id = next_id.get();
        state
            .setting_index
            .insert(next_id, (config, name.to_string()));
        Ok(setting)
    }

    fn get_setting(&self, config: ConfigId, name: &str) -> Result<Option<Setting>> {
        validate_name(name)?;
        let state = self.state.read_recovered();
        Ok(state
            .configs
            .get(&config)
            .and_then(|c| c.setting(name))
            .cloned())
    }

    fn set_setting_value(&self, id: SettingId, value: Value) -> Result<bool> {
        let mut state = self.state.write_recovered();
        let setting = state.setting_mut(id)?;

        if !setting.set_value(value)? {
            return Ok(false);
        }
        setting.audit.record_update(now(), &self.actor);
        Ok(true)
    }

    fn set_setting_desc(&self, id: SettingId, desc: &str) -> Result<bool> {
        let mut state = self.state.write_recovered();
        let setting = state.setting_mut(id)?;

        if !setting.set_desc(desc) {
            return Ok(false);
        }
        setting.audit.record_update(now(), &self.actor);
        Ok(true)
    }

    fn deprecate_setting(&self, id: SettingId, reason: Option<&str>) -> Result<bool> {
        let mut state = self.state.write_recovered();
        let setting = state.setting_mut(id)?;

        let before = setting.deprecation.clone();
        setting.deprecate(reason);
        if setting.deprecation != before {
            setting.audit.record_update(now(), &self.actor);
        }
        Ok(true)
    }

    fn set_setting_deprecation_reason(&self, id: SettingId, reason: &str) -> Result<bool> {
        let mut state = self.state.write_recovered();
        let setting = state.setting_mut(id)?;

        if !setting.set_deprecation_reason(reason) {
            return Ok(false);
        }
        setting.audit.record_update(now(), &self.actor);
        Ok(true)
    }
}

// =============================================================================
// Tests
// =============================================================================
