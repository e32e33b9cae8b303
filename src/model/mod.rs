//! Domain model: configs and their typed settings
//!
//! - [`Config`] - a named collection of settings
//! - [`Setting`] - a named value whose [`Type`](crate::Type) never changes
//!
//! Both are plain in-memory values. Changes made through their methods are
//! local until a [`Store`](crate::Store) persists them.

mod config;
mod fields;
mod setting;

pub use config::{Config, ConfigId};
pub use setting::{Setting, SettingId};

pub(crate) use fields::{Audit, Deprecation, now};
