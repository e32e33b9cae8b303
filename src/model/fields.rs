//! Field groups shared by configs and settings
//!
//! Each group is a plain struct embedded in the owning entity; the entity
//! exposes the accessors itself.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Current time truncated to whole seconds, the precision timestamps are
/// persisted with.
pub(crate) fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

// =============================================================================
// Audit
// =============================================================================

/// Creation and last-update bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
    pub(crate) created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
    pub(crate) updated_by: String,
}

impl Default for Audit {
    fn default() -> Self {
        Self {
            created_at: OffsetDateTime::UNIX_EPOCH,
            created_by: String::new(),
            updated_at: OffsetDateTime::UNIX_EPOCH,
            updated_by: String::new(),
        }
    }
}

impl Audit {
    /// Audit data for something created by `by` at `at`
    pub(crate) fn created(at: OffsetDateTime, by: &str) -> Self {
        Self {
            created_at: at,
            created_by: by.to_string(),
            updated_at: at,
            updated_by: by.to_string(),
        }
    }

    /// Mark an in-place change made now. The updater is stamped by the store.
    pub(crate) fn touch(&mut self) {
        self.updated_at = now();
    }

    /// Record an update made by `by` at `at`
    pub(crate) fn record_update(&mut self, at: OffsetDateTime, by: &str) {
        self.updated_at = at;
        self.updated_by = by.to_string();
    }
}

// =============================================================================
// Deprecation
// =============================================================================

/// One-way deprecation status with an optional reason
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deprecation {
    pub(crate) deprecated: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub(crate) deprecated_at: Option<OffsetDateTime>,
    pub(crate) reason: String,
}

impl Deprecation {
    /// Mark as deprecated. Already-deprecated entries keep their original
    /// timestamp; the reason is replaced when one is given.
    ///
    /// Returns true if anything changed.
    pub(crate) fn mark(&mut self, reason: Option<&str>, at: OffsetDateTime) -> bool {
        let mut changed = false;

        if !self.deprecated {
            self.deprecated = true;
            self.deprecated_at = Some(at);
            changed = true;
        }

        if let Some(reason) = reason {
            if self.reason != reason {
                self.reason = reason.to_string();
                changed = true;
            }
        }

        changed
    }

    /// Replace the reason of a deprecated entry.
    ///
    /// Returns false for entries that are not deprecated or when the reason is
    /// unchanged.
    pub(crate) fn set_reason(&mut self, reason: &str) -> bool {
        if !self.deprecated || self.reason == reason {
            return false;
        }
        self.reason = reason.to_string();
        true
    }
}
