//! # cfgstore - typed configuration store
//!
//! Named configs holding typed settings, persisted in a relational store.
//!
//! ## Features
//!
//! - **Typed Settings**: Every setting has one of twelve scalar types, fixed at creation
//! - **Naming Rule**: Config and setting names start with a letter followed by letters, digits or underscores
//! - **Deprecation**: Settings can be deprecated with a reason; deprecation is one-way
//! - **Audit Fields**: Creation and update time and actor on every config and setting
//! - **SQLite Store**: Durable storage with prepared statements (requires `sqlite` feature)
//! - **Memory Store**: Same contract, no persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use cfgstore::{SqlStore, SqlStoreOptions, Store, Type, Value};
//!
//! # fn main() -> cfgstore::Result<()> {
//! let store = SqlStore::new(
//!     SqlStoreOptions::builder()
//!         .in_memory()
//!         .actor("billing-service")
//!         .build(),
//! )?;
//!
//! let billing = store.create_config("billing", "billing settings")?;
//! let id = billing.id().unwrap();
//!
//! store.create_setting(id, "max_retries", Type::Int32, Value::Int32(3))?;
//! store.set(id, "currency", Value::from("EUR"))?;
//!
//! let billing = store.get_config("billing")?.unwrap();
//! assert_eq!(billing.len(), 2);
//! assert_eq!(billing.setting("max_retries").unwrap().value(), &Value::Int32(3));
//! # Ok(())
//! # }
//! ```
//!
//! ## Type Immutability
//!
//! A setting keeps the type it was created with. Writing a value of another
//! type fails with [`Error::TypeMismatch`] and leaves the setting unchanged:
//!
//! ```rust
//! use cfgstore::{Error, MemoryStore, Store, Value};
//!
//! # fn main() -> cfgstore::Result<()> {
//! let store = MemoryStore::new();
//! let id = store.create_config("billing", "")?.id().unwrap();
//! let retries = store.set(id, "max_retries", Value::Int32(3))?;
//!
//! let err = store
//!     .set_setting_value(retries.id().unwrap(), Value::from("three"))
//!     .unwrap_err();
//! assert!(matches!(err, Error::TypeMismatch { .. }));
//! # Ok(())
//! # }
//! ```
//!
//! ## Dynamic Values
//!
//! [`type_of`] and [`Value::from_any`] map Rust values to setting types at
//! runtime; [`Value::parse`] and [`Value::from_json`] convert text and JSON
//! input.

// Core modules
mod error;
mod name;
mod sync;

pub mod model;
pub mod store;
pub mod types;

// Re-exports from core
pub use error::{Error, Result};
pub use model::{Config, ConfigId, Setting, SettingId};
pub use name::{is_valid_name, validate_name};
pub use store::{MemoryStore, Store};
pub use types::{Type, Value, type_of};

// SQLite re-exports (feature-gated)
#[cfg(feature = "sqlite")]
pub use store::{SqlStore, SqlStoreOptions, SqlStoreOptionsBuilder};
