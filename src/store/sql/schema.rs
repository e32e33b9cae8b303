//! Table definitions and bootstrap
//!
//! Bootstrap runs once per table, each in its own transaction. Every statement
//! is guarded by `IF NOT EXISTS`, so opening an existing database is a no-op.

use crate::error::{Error, Result};
use log::debug;
use rusqlite::Connection;

/// Tables in creation order. `settings` references `configs`.
pub(crate) const TABLES: &[(&str, &[&str])] = &[("configs", CONFIGS), ("settings", SETTINGS)];

const CONFIGS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS configs (
        id          INTEGER PRIMARY KEY,
        name        TEXT    NOT NULL,
        description TEXT    NOT NULL DEFAULT '',
        created_at  INTEGER NOT NULL,
        created_by  TEXT    NOT NULL DEFAULT '',
        updated_at  INTEGER NOT NULL,
        updated_by  TEXT    NOT NULL DEFAULT ''
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS configs_name_idx ON configs(name)",
];

const SETTINGS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS settings (
        id                 INTEGER PRIMARY KEY,
        name               TEXT    NOT NULL,
        description        TEXT    NOT NULL DEFAULT '',
        created_at         INTEGER NOT NULL,
        created_by         TEXT    NOT NULL DEFAULT '',
        updated_at         INTEGER NOT NULL,
        updated_by         TEXT    NOT NULL DEFAULT '',
        deprecated         INTEGER NOT NULL DEFAULT 0,
        deprecation_reason TEXT    NOT NULL DEFAULT '',
        deprecated_at      INTEGER,
        config_id          INTEGER NOT NULL REFERENCES configs(id),
        config_name        TEXT    NOT NULL,
        value_type         INTEGER NOT NULL,
        uint8_value        INTEGER,
        uint16_value       INTEGER,
        uint32_value       INTEGER,
        uint64_value       INTEGER,
        int8_value         INTEGER,
        int16_value        INTEGER,
        int32_value        INTEGER,
        int64_value        INTEGER,
        float32_value      REAL,
        float64_value      REAL,
        bool_value         INTEGER,
        string_value       TEXT
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS settings_config_name_idx ON settings(config_name, name)",
    "CREATE INDEX IF NOT EXISTS settings_config_id_idx ON settings(config_id)",
];

/// Create every table that does not exist yet.
///
/// Tables created before a failing one stay created.
///
/// # Errors
///
/// Returns [`Error::Bootstrap`] naming the table whose statements failed.
///
/// # Panics
///
/// Panics if a failed table transaction cannot be rolled back, since the
/// connection state is then unknown.
pub(crate) fn bootstrap(conn: &mut Connection) -> Result<()> {
    for (table, statements) in TABLES {
        create_table(conn, table, statements)?;
    }
    Ok(())
}

fn create_table(conn: &mut Connection, table: &'static str, statements: &[&str]) -> Result<()> {
    let tx = conn
        .transaction()
        .map_err(|source| Error::Bootstrap { table, source })?;

    for sql in statements {
        if let Err(source) = tx.execute_batch(sql) {
            if let Err(rollback) = tx.rollback() {
                panic!("failed to roll back {table} table creation: {rollback}");
            }
            return Err(Error::Bootstrap { table, source });
        }
    }

    tx.commit()
        .map_err(|source| Error::Bootstrap { table, source })?;

    debug!("Ensured {table} table");
    Ok(())
}
