//! SQL statements run by the store
//!
//! Every statement is listed in [`ALL`] and prepared into the connection's
//! statement cache when the store is opened.

use crate::error::{Error, Result};
use rusqlite::Connection;

macro_rules! config_columns {
    () => {
        "id, name, description, created_at, created_by, updated_at, updated_by"
    };
}

macro_rules! setting_columns {
    () => {
        "id, name, description, created_at, created_by, updated_at, updated_by, \
         deprecated, deprecation_reason, deprecated_at, config_id, config_name, value_type, \
         uint8_value, uint16_value, uint32_value, uint64_value, \
         int8_value, int16_value, int32_value, int64_value, \
         float32_value, float64_value, bool_value, string_value"
    };
}

macro_rules! value_assignments {
    () => {
        "uint8_value = ?1, uint16_value = ?2, uint32_value = ?3, uint64_value = ?4, \
         int8_value = ?5, int16_value = ?6, int32_value = ?7, int64_value = ?8, \
         float32_value = ?9, float64_value = ?10, bool_value = ?11, string_value = ?12"
    };
}

// -----------------------------------------------------------------------------
// Configs
// -----------------------------------------------------------------------------

pub(crate) const GET_CONFIG: &str =
    concat!("SELECT ", config_columns!(), " FROM configs WHERE name = ?1");

pub(crate) const GET_CONFIG_BY_ID: &str =
    concat!("SELECT ", config_columns!(), " FROM configs WHERE id = ?1");

pub(crate) const GET_CONFIGS: &str =
    concat!("SELECT ", config_columns!(), " FROM configs ORDER BY id");

pub(crate) const CREATE_CONFIG: &str = "INSERT INTO configs \
     (name, description, created_at, created_by, updated_at, updated_by) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

pub(crate) const SET_CONFIG_DESC: &str =
    "UPDATE configs SET description = ?1, updated_at = ?2, updated_by = ?3 WHERE id = ?4";

// -----------------------------------------------------------------------------
// Settings
// -----------------------------------------------------------------------------

pub(crate) const GET_CONFIG_SETTINGS: &str = concat!(
    "SELECT ",
    setting_columns!(),
    " FROM settings WHERE config_id = ?1 ORDER BY name"
);

pub(crate) const GET_ALL_SETTINGS: &str = concat!(
    "SELECT ",
    setting_columns!(),
    " FROM settings ORDER BY config_id, name"
);

pub(crate) const GET_SETTING: &str = concat!(
    "SELECT ",
    setting_columns!(),
    " FROM settings WHERE config_id = ?1 AND name = ?2"
);

pub(crate) const GET_SETTING_BY_ID: &str =
    concat!("SELECT ", setting_columns!(), " FROM settings WHERE id = ?1");

pub(crate) const CREATE_SETTING: &str = "INSERT INTO settings \
     (name, description, created_at, created_by, updated_at, updated_by, \
      deprecated, deprecation_reason, deprecated_at, config_id, config_name, value_type, \
      uint8_value, uint16_value, uint32_value, uint64_value, \
      int8_value, int16_value, int32_value, int64_value, \
      float32_value, float64_value, bool_value, string_value) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, \
             ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)";

pub(crate) const SET_SETTING_VALUE: &str = concat!(
    "UPDATE settings SET ",
    value_assignments!(),
    ", updated_at = ?13, updated_by = ?14 WHERE id = ?15"
);

pub(crate) const SET_SETTING_DESC: &str =
    "UPDATE settings SET description = ?1, updated_at = ?2, updated_by = ?3 WHERE id = ?4";

pub(crate) const SET_SETTING_DEPRECATION: &str = "UPDATE settings \
     SET deprecated = ?1, deprecation_reason = ?2, deprecated_at = ?3, \
         updated_at = ?4, updated_by = ?5 \
     WHERE id = ?6";

/// Every statement with the name used in [`Error::Prepare`]
pub(crate) const ALL: &[(&str, &str)] = &[
    ("get_config", GET_CONFIG),
    ("get_config_by_id", GET_CONFIG_BY_ID),
    ("get_configs", GET_CONFIGS),
    ("create_config", CREATE_CONFIG),
    ("set_config_desc", SET_CONFIG_DESC),
    ("get_config_settings", GET_CONFIG_SETTINGS),
    ("get_all_settings", GET_ALL_SETTINGS),
    ("get_setting", GET_SETTING),
    ("get_setting_by_id", GET_SETTING_BY_ID),
    ("create_setting", CREATE_SETTING),
    ("set_setting_value", SET_SETTING_VALUE),
    ("set_setting_desc", SET_SETTING_DESC),
    ("set_setting_deprecation", SET_SETTING_DEPRECATION),
];

/// Size the statement cache to hold every statement and prepare them all.
///
/// # Errors
///
/// Returns [`Error::Prepare`] naming the first statement that fails.
pub(crate) fn prepare_all(conn: &Connection) -> Result<()> {
    conn.set_prepared_statement_cache_capacity(ALL.len());

    for &(statement, sql) in ALL {
        conn.prepare_cached(sql)
            .map_err(|source| Error::Prepare { statement, source })?;
    }

    Ok(())
}
