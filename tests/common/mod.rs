//! Common test utilities for cfgstore integration tests
//!
//! Provides an on-disk store fixture, raw database access and sample values.

#![allow(dead_code)]

use cfgstore::{SqlStore, SqlStoreOptions, Value};
use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::TempDir;

/// Value columns of the settings table, in type order
pub const VALUE_COLUMNS: [&str; 12] = [
    "uint8_value",
    "uint16_value",
    "uint32_value",
    "uint64_value",
    "int8_value",
    "int16_value",
    "int32_value",
    "int64_value",
    "float32_value",
    "float64_value",
    "bool_value",
    "string_value",
];

// =============================================================================
// Test Fixtures
// =============================================================================

/// Test fixture that provides a temporary directory and a store on a database file in it
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub store: SqlStore,
}

impl TestFixture {
    /// Create a new test fixture with a fresh database
    pub fn new() -> Self {
        init_logging();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = open_store(&temp_dir.path().join("settings.db"));

        Self { temp_dir, store }
    }

    /// Path of the database file
    pub fn db_path(&self) -> PathBuf {
        self.temp_dir.path().join("settings.db")
    }

    /// Drop the current store and open the same database again
    pub fn reopen(self) -> Self {
        let Self { temp_dir, store } = self;
        drop(store);

        let store = open_store(&temp_dir.path().join("settings.db"));
        Self { temp_dir, store }
    }

    /// A second connection to the database, bypassing the store
    pub fn raw(&self) -> Connection {
        Connection::open(self.db_path()).expect("Failed to open raw connection")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Route store logs to the test output (`RUST_LOG=debug cargo test`)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn open_store(path: &std::path::Path) -> SqlStore {
    let options = SqlStoreOptions::builder()
        .path(path)
        .actor("tests")
        .build();
    SqlStore::new(options).expect("Failed to open store")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// One value of every storable type, at the edges of its range
pub fn edge_values() -> Vec<Value> {
    vec![
        Value::Uint8(u8::MAX),
        Value::Uint16(u16::MAX),
        Value::Uint32(u32::MAX),
        Value::Uint64(u64::MAX),
        Value::Int8(i8::MIN),
        Value::Int16(i16::MIN),
        Value::Int32(i32::MIN),
        Value::Int64(i64::MIN),
        Value::Float32(f32::MIN_POSITIVE),
        Value::Float64(-1.5e300),
        Value::Bool(true),
        Value::String("ünïcödé ✓".to_string()),
    ]
}

/// Names of the value columns that are not NULL for a settings row
pub fn populated_columns(conn: &Connection, setting_id: i64) -> Vec<String> {
    VALUE_COLUMNS
        .iter()
        .filter(|column| {
            let sql = format!("SELECT {column} IS NOT NULL FROM settings WHERE id = ?1");
            conn.query_row(&sql, [setting_id], |row| row.get::<_, bool>(0))
                .expect("Failed to query value column")
        })
        .map(|column| column.to_string())
        .collect()
}
