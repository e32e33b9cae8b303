//! SQLite-backed store
//!
//! [`SqlStore`] keeps configs and settings in two tables of a single SQLite
//! database. Opening a store bootstraps missing tables and prepares every
//! statement it will run; any failure there fails the open.
//!
//! # Example
//!
//! ```rust
//! use cfgstore::{SqlStore, Store, Type, Value};
//!
//! let store = SqlStore::in_memory()?;
//! let billing = store.create_config("billing", "billing settings")?;
//! let id = billing.id().unwrap();
//!
//! store.create_setting(id, "max_retries", Type::Int32, Value::Int32(3))?;
//! let setting = store.get_setting(id, "max_retries")?.unwrap();
//! assert_eq!(setting.value(), &Value::Int32(3));
//! # Ok::<(), cfgstore::Error>(())
//! ```

mod codec;
mod options;
mod rows;
mod schema;
mod statements;

pub use options::{DEFAULT_ACTOR, DEFAULT_DB_FILE, SqlStoreOptions, SqlStoreOptionsBuilder};

use crate::error::{Error, Result};
use crate::model::{Audit, Config, ConfigId, Setting, SettingId, now};
use crate::name::validate_name;
use crate::store::{Store, check_new_setting};
use crate::sync::MutexExt;
use crate::types::{Type, Value};
use log::{debug, info, warn};
use rows::SettingRow;
use rusqlite::types::ToSql;
use rusqlite::{CachedStatement, Connection, Params, Row, params};
use std::collections::BTreeMap;
use std::sync::Mutex;
use time::OffsetDateTime;

/// Durable [`Store`] backed by a SQLite database
pub struct SqlStore {
    /// Serializes use of the connection handle. Isolation is SQLite's.
    conn: Mutex<Connection>,
    actor: String,
}

impl std::fmt::Debug for SqlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlStore")
            .field("actor", &self.actor)
            .finish_non_exhaustive()
    }
}

impl SqlStore {
    /// Open (or create) the database described by `options`.
    ///
    /// Creates the parent directory of a database file if needed.
    ///
    /// # Errors
    ///
    /// * [`Error::Options`] if the options are invalid
    /// * [`Error::DirectoryCreate`] if the parent directory cannot be created
    /// * [`Error::Open`] if the database cannot be opened or configured
    /// * [`Error::Bootstrap`] if a table cannot be created
    /// * [`Error::Prepare`] if a statement does not compile against the schema
    pub fn new(options: SqlStoreOptions) -> Result<Self> {
        options.validate()?;
        let location = options.location();
        let open_err = |source: rusqlite::Error| Error::Open {
            path: location.clone(),
            source,
        };

        let conn = match &options.path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                Connection::open(path).map_err(open_err)?
            }
            None => Connection::open_in_memory().map_err(open_err)?,
        };

        conn.busy_timeout(options.busy_timeout).map_err(open_err)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(open_err)?;

        if options.wal && options.path.is_some() {
            let mode: String = conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                .map_err(open_err)?;
            debug!("Journal mode for {location}: {mode}");
        }

        let store = Self::with_connection(conn, options.actor)?;
        info!("Opened settings store at {location}");
        Ok(store)
    }

    /// Open a private in-memory store with default options
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn in_memory() -> Result<Self> {
        Self::new(SqlStoreOptions::in_memory())
    }

    /// Wrap an already-open connection.
    ///
    /// Bootstraps missing tables and prepares every statement. The
    /// connection's pragmas are left as they are.
    ///
    /// # Errors
    ///
    /// * [`Error::Bootstrap`] if a table cannot be created
    /// * [`Error::Prepare`] if a statement does not compile against the schema
    pub fn with_connection(mut conn: Connection, actor: impl Into<String>) -> Result<Self> {
        schema::bootstrap(&mut conn)?;
        statements::prepare_all(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            actor: actor.into(),
        })
    }

    /// Name recorded in `created_by`/`updated_by` for writes through this store
    pub fn actor(&self) -> &str {
        &self.actor
    }
}

// =============================================================================
// Statement helpers
// =============================================================================

fn cached<'c>(
    conn: &'c Connection,
    statement: &'static str,
    sql: &str,
) -> Result<CachedStatement<'c>> {
    conn.prepare_cached(sql)
        .map_err(|source| Error::Prepare { statement, source })
}

/// Run a query expected to return at most one row
fn query_opt<T, P: Params>(
    conn: &Connection,
    (statement, sql): (&'static str, &str),
    params: P,
    entity: &'static str,
    scan: impl FnOnce(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Option<T>> {
    let mut stmt = cached(conn, statement, sql)?;
    let mut rows = stmt.query(params).map_err(|source| Error::Execute {
        operation: statement,
        source,
    })?;

    match rows.next().map_err(|source| Error::Scan { entity, source })? {
        Some(row) => scan(row)
            .map(Some)
            .map_err(|source| Error::Scan { entity, source }),
        None => Ok(None),
    }
}

/// Run a query and scan every row
fn query_all<T, P: Params>(
    conn: &Connection,
    (statement, sql): (&'static str, &str),
    params: P,
    entity: &'static str,
    scan: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = cached(conn, statement, sql)?;
    let mut rows = stmt.query(params).map_err(|source| Error::Execute {
        operation: statement,
        source,
    })?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(|source| Error::Scan { entity, source })? {
        out.push(scan(row).map_err(|source| Error::Scan { entity, source })?);
    }
    Ok(out)
}

/// Run a write and return the number of affected rows
fn execute<P: Params>(
    conn: &Connection,
    (statement, sql): (&'static str, &str),
    params: P,
    operation: &'static str,
) -> std::result::Result<usize, Execution> {
    let mut stmt = cached(conn, statement, sql).map_err(Execution::Failed)?;
    stmt.execute(params).map_err(|source| {
        if is_unique_violation(&source) {
            Execution::UniqueViolation
        } else {
            Execution::Failed(Error::Execute { operation, source })
        }
    })
}

/// Why a write did not complete
enum Execution {
    UniqueViolation,
    Failed(Error),
}

impl Execution {
    fn or_exists(self, exists: impl FnOnce() -> Error) -> Error {
        match self {
            Execution::UniqueViolation => exists(),
            Execution::Failed(err) => err,
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Updates that address a row by id must hit exactly that row
fn expect_one_row(changed: usize, missing: impl FnOnce() -> Error) -> Result<()> {
    if changed == 0 {
        return Err(missing());
    }
    Ok(())
}

fn unix(at: OffsetDateTime) -> i64 {
    at.unix_timestamp()
}

// =============================================================================
// Loading
// =============================================================================

fn config_by_name(conn: &Connection, name: &str) -> Result<Option<Config>> {
    query_opt(
        conn,
        ("get_config", statements::GET_CONFIG),
        [name],
        "config",
        rows::scan_config,
    )
}

fn config_by_id(conn: &Connection, id: ConfigId) -> Result<Option<Config>> {
    query_opt(
        conn,
        ("get_config_by_id", statements::GET_CONFIG_BY_ID),
        [id.get()],
        "config",
        rows::scan_config,
    )
}

fn attach_settings(conn: &Connection, config: &mut Config) -> Result<()> {
    let Some(id) = config.id else {
        return Ok(());
    };

    let rows = query_all(
        conn,
        ("get_config_settings", statements::GET_CONFIG_SETTINGS),
        [id.get()],
        "setting",
        SettingRow::scan,
    )?;

    for row in rows {
        config.insert_setting(row.into_setting()?);
    }
    Ok(())
}

fn setting_by_name(conn: &Connection, config: ConfigId, name: &str) -> Result<Option<Setting>> {
    query_opt(
        conn,
        ("get_setting", statements::GET_SETTING),
        params![config.get(), name],
        "setting",
        SettingRow::scan,
    )?
    .map(SettingRow::into_setting)
    .transpose()
}

fn setting_by_id(conn: &Connection, id: SettingId) -> Result<Setting> {
    query_opt(
        conn,
        ("get_setting_by_id", statements::GET_SETTING_BY_ID),
        [id.get()],
        "setting",
        SettingRow::scan,
    )?
    .ok_or_else(|| Error::SettingNotFound(id.to_string()))?
    .into_setting()
}

// =============================================================================
// Writing
// =============================================================================

impl SqlStore {
    fn write_deprecation(&self, conn: &Connection, id: SettingId, setting: &Setting) -> Result<()> {
        let at = now();
        let changed = execute(
            conn,
            ("set_setting_deprecation", statements::SET_SETTING_DEPRECATION),
            params![
                setting.is_deprecated(),
                setting.deprecation_reason(),
                setting.deprecated_at().map(unix),
                unix(at),
                self.actor,
                id.get(),
            ],
            "update setting deprecation",
        )
        .map_err(|e| e.or_exists(|| Error::SettingNotFound(id.to_string())))?;

        expect_one_row(changed, || Error::SettingNotFound(id.to_string()))
    }
}

impl Store for SqlStore {
    fn create_config(&self, name: &str, desc: &str) -> Result<Config> {
        let mut config = Config::new(name, desc)?;
        let conn = self.conn.lock_recovered();

        if config_by_name(&conn, name)?.is_some() {
            return Err(Error::ConfigExists(name.to_string()));
        }

        let at = now();
        let changed = execute(
            &conn,
            ("create_config", statements::CREATE_CONFIG),
            params![name, desc, unix(at), self.actor, unix(at), self.actor],
            "create config",
        )
        .map_err(|e| e.or_exists(|| Error::ConfigExists(name.to_string())))?;

        if changed == 0 {
            warn!("Creating config '{name}' affected no rows");
        }

        config.id = Some(ConfigId::new(conn.last_insert_rowid()));
        config.audit = Audit::created(at, &self.actor);

        info!("Created config '{name}'");
        Ok(config)
    }

    fn get_config(&self, name: &str) -> Result<Option<Config>> {
        let conn = self.conn.lock_recovered();

        let Some(mut config) = config_by_name(&conn, name)? else {
            return Ok(None);
        };
        attach_settings(&conn, &mut config)?;
        Ok(Some(config))
    }

    fn get_configs(&self) -> Result<Vec<Config>> {
        let conn = self.conn.lock_recovered();

        let mut configs = query_all(
            &conn,
            ("get_configs", statements::GET_CONFIGS),
            params![],
            "config",
            rows::scan_config,
        )?;

        let mut by_id: BTreeMap<i64, usize> = BTreeMap::new();
        for (index, config) in configs.iter().enumerate() {
            if let Some(id) = config.id {
                by_id.insert(id.get(), index);
            }
        }

        let settings = query_all(
            &conn,
            ("get_all_settings", statements::GET_ALL_SETTINGS),
            params![],
            "setting",
            SettingRow::scan,
        )?;

        for row in settings {
            match by_id.get(&row.config_id()) {
                Some(&index) => configs[index].insert_setting(row.into_setting()?),
                None => warn!("Skipping setting of unknown config {}", row.config_id()),
            }
        }

        debug!("Loaded {} configs", configs.len());
        Ok(configs)
    }

    fn set_config_desc(&self, config: ConfigId, desc: &str) -> Result<bool> {
        let conn = self.conn.lock_recovered();

        let current = config_by_id(&conn, config)?
            .ok_or_else(|| Error::ConfigNotFound(config.to_string()))?;
        if current.description() == desc {
            return Ok(false);
        }

        let changed = execute(
            &conn,
            ("set_config_desc", statements::SET_CONFIG_DESC),
            params![desc, unix(now()), self.actor, config.get()],
            "update config description",
        )
        .map_err(|e| e.or_exists(|| Error::ConfigNotFound(config.to_string())))?;
        expect_one_row(changed, || Error::ConfigNotFound(config.to_string()))?;

        debug!("Updated description of config '{}'", current.name());
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
        let columns = codec::encode(&value)?;

        let conn = self.conn.lock_recovered();

        let owner = config_by_id(&conn, config)?
            .ok_or_else(|| Error::ConfigNotFound(config.to_string()))?;
        let exists = || Error::SettingExists {
            config: owner.name().to_string(),
            name: name.to_string(),
        };
        if setting_by_name(&conn, config, name)?.is_some() {
            return Err(exists());
        }

        let at = unix(now());
        let deprecated_at: Option<i64> = None;
        let value_type = i64::from(typ.discriminant());
        let config_raw = config.get();

        let mut params: Vec<&dyn ToSql> = vec![
            &name as &dyn ToSql,
            &"",
            &at,
            &self.actor,
            &at,
            &self.actor,
            &false,
            &"",
            &deprecated_at,
            &config_raw,
            &owner.name,
            &value_type,
        ];
        params.extend(columns.iter().map(|c| c as &dyn ToSql));

        let changed = execute(
            &conn,
            ("create_setting", statements::CREATE_SETTING),
            params.as_slice(),
            "create setting",
        )
        .map_err(|e| e.or_exists(exists))?;

        if changed == 0 {
            warn!("Creating setting '{}.{name}' affected no rows", owner.name());
        }

        let id = SettingId::new(conn.last_insert_rowid());
        info!("Created {typ} setting '{}.{name}'", owner.name());

        setting_by_id(&conn, id)
    }

    fn get_setting(&self, config: ConfigId, name: &str) -> Result<Option<Setting>> {
        validate_name(name)?;
        let conn = self.conn.lock_recovered();
        setting_by_name(&conn, config, name)
    }

    fn set_setting_value(&self, id: SettingId, value: Value) -> Result<bool> {
        let conn = self.conn.lock_recovered();

        let mut setting = setting_by_id(&conn, id)?;
        if !setting.set_value(value)? {
            return Ok(false);
        }
        let columns = codec::encode(setting.value())?;

        let at = unix(now());
        let id_raw = id.get();
        let mut params: Vec<&dyn ToSql> = columns.iter().map(|c| c as &dyn ToSql).collect();
        params.extend([&at as &dyn ToSql, &self.actor, &id_raw]);

        let changed = execute(
            &conn,
            ("set_setting_value", statements::SET_SETTING_VALUE),
            params.as_slice(),
            "update setting value",
        )
        .map_err(|e| e.or_exists(|| Error::SettingNotFound(id.to_string())))?;
        expect_one_row(changed, || Error::SettingNotFound(id.to_string()))?;

        debug!("Updated value of setting '{}.{}'", setting.config_name(), setting.name());
        Ok(true)
    }

    fn set_setting_desc(&self, id: SettingId, desc: &str) -> Result<bool> {
        let conn = self.conn.lock_recovered();

        let mut setting = setting_by_id(&conn, id)?;
        if !setting.set_desc(desc) {
            return Ok(false);
        }

        let changed = execute(
            &conn,
            ("set_setting_desc", statements::SET_SETTING_DESC),
            params![desc, unix(now()), self.actor, id.get()],
            "update setting description",
        )
        .map_err(|e| e.or_exists(|| Error::SettingNotFound(id.to_string())))?;
        expect_one_row(changed, || Error::SettingNotFound(id.to_string()))?;

        debug!("Updated description of setting '{}.{}'", setting.config_name(), setting.name());
        Ok(true)
    }

    fn deprecate_setting(&self, id: SettingId, reason: Option<&str>) -> Result<bool> {
        let conn = self.conn.lock_recovered();

        let mut setting = setting_by_id(&conn, id)?;
        let before = setting.deprecation.clone();
        setting.deprecate(reason);
        if setting.deprecation == before {
            return Ok(true);
        }

        self.write_deprecation(&conn, id, &setting)?;
        info!("Deprecated setting '{}.{}'", setting.config_name(), setting.name());
        Ok(true)
    }

    fn set_setting_deprecation_reason(&self, id: SettingId, reason: &str) -> Result<bool> {
        let conn = self.conn.lock_recovered();

        let mut setting = setting_by_id(&conn, id)?;
        if !setting.set_deprecation_reason(reason) {
            return Ok(false);
        }

        self.write_deprecation(&conn, id, &setting)?;
        debug!(
            "Updated deprecation reason of setting '{}.{}'",
            setting.config_name(),
            setting.name()
        );
        Ok(true)
    }
}
