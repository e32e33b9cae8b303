//! Row scanning for the column lists in [`statements`](super::statements)

use super::codec::{self, VALUE_COLUMN_COUNT};
use crate::error::Result;
use crate::model::{Audit, Config, ConfigId, Deprecation, Setting, SettingId};
use rusqlite::Row;
use rusqlite::types::{Type as SqlType, Value as SqlValue};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Index of the first value column in a settings row
const FIRST_VALUE_COLUMN: usize = 13;

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<OffsetDateTime> {
    let secs: i64 = row.get(idx)?;
    from_unix(idx, secs)
}

fn from_unix(idx: usize, secs: i64) -> rusqlite::Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(secs)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, SqlType::Integer, Box::new(e)))
}

/// Scan a configs row. Settings are attached by the caller.
pub(crate) fn scan_config(row: &Row<'_>) -> rusqlite::Result<Config> {
    Ok(Config {
        id: Some(ConfigId::new(row.get(0)?)),
        name: row.get(1)?,
        description: row.get(2)?,
        audit: Audit {
            created_at: timestamp(row, 3)?,
            created_by: row.get(4)?,
            updated_at: timestamp(row, 5)?,
            updated_by: row.get(6)?,
        },
        settings: BTreeMap::new(),
    })
}

/// A settings row with its value columns still undecoded.
///
/// Scanning only fails on storage-level problems; whether the value columns
/// make sense is checked by [`into_setting`](Self::into_setting).
pub(crate) struct SettingRow {
    id: i64,
    name: String,
    description: String,
    audit: Audit,
    deprecation: Deprecation,
    config_id: i64,
    config_name: String,
    value_type: i64,
    values: [SqlValue; VALUE_COLUMN_COUNT],
}

impl SettingRow {
    pub(crate) fn scan(row: &Row<'_>) -> rusqlite::Result<Self> {
        let deprecated_at = row
            .get::<_, Option<i64>>(9)?
            .map(|secs| from_unix(9, secs))
            .transpose()?;

        let mut values: [SqlValue; VALUE_COLUMN_COUNT] = std::array::from_fn(|_| SqlValue::Null);
        for (offset, value) in values.iter_mut().enumerate() {
            *value = row.get(FIRST_VALUE_COLUMN + offset)?;
        }

        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            audit: Audit {
                created_at: timestamp(row, 3)?,
                created_by: row.get(4)?,
                updated_at: timestamp(row, 5)?,
                updated_by: row.get(6)?,
            },
            deprecation: Deprecation {
                deprecated: row.get(7)?,
                reason: row.get(8)?,
                deprecated_at,
            },
            config_id: row.get(10)?,
            config_name: row.get(11)?,
            value_type: row.get(12)?,
            values,
        })
    }

    /// Owning config id
    pub(crate) fn config_id(&self) -> i64 {
        self.config_id
    }

    /// Decode the value columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowCorrupt`](crate::Error::RowCorrupt) if the value
    /// columns disagree with `value_type`.
    pub(crate) fn into_setting(self) -> Result<Setting> {
        let value = codec::decode(self.id, self.value_type, self.values)?;

        Ok(Setting {
            id: Some(SettingId::new(self.id)),
            name: self.name,
            description: self.description,
            value,
            deprecation: self.deprecation,
            audit: self.audit,
            config_id: Some(ConfigId::new(self.config_id)),
            config_name: self.config_name,
        })
    }
}
