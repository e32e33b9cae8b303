//! Store Workflow Integration Tests
//!
//! Tests for the config and setting lifecycle against an on-disk database:
//! - Creating, reading and updating configs and settings
//! - Per-type persistence in the sparse value columns
//! - Reopening an existing database
//! - Type immutability and deprecation

#![cfg(feature = "sqlite")]

mod common;

use cfgstore::{Error, SettingId, Store, Type, Value};
use common::{TestFixture, VALUE_COLUMNS, edge_values, populated_columns};

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_billing_scenario() {
    let fixture = TestFixture::new();
    let store = &fixture.store;

    let billing = store.create_config("billing", "billing settings").unwrap();
    let config = billing.id().unwrap();
    assert_eq!(billing.created_by(), "tests");

    let retries = store
        .create_setting(config, "max_retries", Type::Int32, Value::Int32(3))
        .unwrap();
    let retries_id = retries.id().unwrap();
    assert_eq!(retries.config_name(), "billing");
    assert_eq!(retries.config_id(), Some(config));

    let loaded = store.get_setting(config, "max_retries").unwrap().unwrap();
    assert_eq!(loaded.value(), &Value::Int32(3));
    assert_eq!(loaded.value_type(), Type::Int32);

    assert!(store.set_setting_value(retries_id, Value::Int32(5)).unwrap());
    assert!(!store.set_setting_value(retries_id, Value::Int32(5)).unwrap());

    let err = store
        .set_setting_value(retries_id, Value::from("five"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch {
            expected: Type::Int32,
            actual: Type::String,
            ..
        }
    ));

    let billing = store.get_config("billing").unwrap().unwrap();
    assert_eq!(billing.len(), 1);
    assert_eq!(
        billing.setting("max_retries").unwrap().value(),
        &Value::Int32(5)
    );
}

#[test]
fn test_get_configs_includes_settings() {
    let fixture = TestFixture::new();
    let store = &fixture.store;

    let billing = store.create_config("billing", "").unwrap().id().unwrap();
    let shipping = store.create_config("shipping", "").unwrap().id().unwrap();
    store.set(billing, "currency", Value::from("EUR")).unwrap();
    store.set(billing, "max_retries", Value::Int32(3)).unwrap();
    store.set(shipping, "express", Value::Bool(true)).unwrap();

    let configs = store.get_configs().unwrap();
    let names: Vec<&str> = configs.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["billing", "shipping"]);
    assert_eq!(configs[0].len(), 2);
    assert_eq!(configs[1].len(), 1);
    assert_eq!(
        configs[1].setting("express").unwrap().config_name(),
        "shipping"
    );
}

#[test]
fn test_missing_entities_are_none() {
    let fixture = TestFixture::new();
    let store = &fixture.store;
    let config = store.create_config("billing", "").unwrap().id().unwrap();

    assert!(store.get_config("shipping").unwrap().is_none());
    assert!(store.get_setting(config, "absent").unwrap().is_none());
}

// =============================================================================
// Value Persistence
// =============================================================================

#[test]
fn test_every_type_populates_one_column() {
    let fixture = TestFixture::new();
    let store = &fixture.store;
    let config = store.create_config("types", "").unwrap().id().unwrap();
    let raw = fixture.raw();

    for (index, value) in edge_values().into_iter().enumerate() {
        let typ = value.value_type();
        let name = format!("{typ}_setting");

        let created = store
            .create_setting(config, &name, typ, value.clone())
            .unwrap();
        let id = created.id().unwrap().get();

        let loaded = store.get_setting(config, &name).unwrap().unwrap();
        assert_eq!(loaded.value(), &value, "{typ} did not round trip");

        assert_eq!(
            populated_columns(&raw, id),
            vec![VALUE_COLUMNS[index].to_string()],
            "{typ} populated the wrong columns"
        );

        let stored_type: i64 = raw
            .query_row("SELECT value_type FROM settings WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(stored_type, i64::from(typ.discriminant()));
    }
}

#[test]
fn test_value_update_moves_nothing_between_columns() {
    let fixture = TestFixture::new();
    let store = &fixture.store;
    let config = store.create_config("billing", "").unwrap().id().unwrap();

    let limit = store.set(config, "limit", Value::Uint64(1)).unwrap();
    let id = limit.id().unwrap();
    store.set_setting_value(id, Value::Uint64(u64::MAX)).unwrap();

    assert_eq!(
        populated_columns(&fixture.raw(), id.get()),
        vec!["uint64_value".to_string()]
    );
    assert_eq!(
        store.get_setting(config, "limit").unwrap().unwrap().value(),
        &Value::Uint64(u64::MAX)
    );
}

#[test]
fn test_signed_zero_round_trips_or_is_rejected() {
    let fixture = TestFixture::new();
    let store = &fixture.store;
    let config = store.create_config("billing", "").unwrap().id().unwrap();

    let err = store
        .create_setting(config, "offset", Type::Float64, Value::Float64(-0.0))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { typ: Type::Float64, .. }));
    assert!(err.is_caller_error());
    assert!(store.get_setting(config, "offset").unwrap().is_none());

    let id = store
        .set(config, "offset", Value::Float64(0.0))
        .unwrap()
        .id()
        .unwrap();
    assert_eq!(
        store.get_setting(config, "offset").unwrap().unwrap().value(),
        &Value::Float64(0.0)
    );
    assert!(!store.set_setting_value(id, Value::Float64(0.0)).unwrap());

    assert!(matches!(
        store.set_setting_value(id, Value::Float64(-0.0)),
        Err(Error::InvalidValue { .. })
    ));
    assert!(matches!(
        store.set(config, "scale", Value::Float32(-0.0)),
        Err(Error::InvalidValue { typ: Type::Float32, .. })
    ));
}

// =============================================================================
// Persistence Across Sessions
// =============================================================================

#[test]
fn test_reopen_keeps_data() {
    let fixture = TestFixture::new();
    let config = fixture
        .store
        .create_config("billing", "billing settings")
        .unwrap();
    let config_id = config.id().unwrap();
    let setting = fixture
        .store
        .set(config_id, "max_retries", Value::Int32(3))
        .unwrap();
    fixture
        .store
        .deprecate_setting(setting.id().unwrap(), Some("use retry_policy"))
        .unwrap();

    let fixture = fixture.reopen();

    let loaded = fixture.store.get_config("billing").unwrap().unwrap();
    assert_eq!(loaded.id(), Some(config_id));
    assert_eq!(loaded.description(), "billing settings");
    assert_eq!(loaded.created_at(), config.created_at());

    let retries = loaded.setting("max_retries").unwrap();
    assert_eq!(retries.value(), &Value::Int32(3));
    assert!(retries.is_deprecated());
    assert_eq!(retries.deprecation_reason(), "use retry_policy");
}

#[test]
fn test_bootstrap_is_idempotent_on_reopen() {
    let fixture = TestFixture::new();
    fixture.store.create_config("billing", "").unwrap();

    let count = |conn: &rusqlite::Connection, kind: &str| -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1",
            [kind],
            |row| row.get(0),
        )
        .unwrap()
    };
    let indexes_before = count(&fixture.raw(), "index");

    let fixture = fixture.reopen().reopen();
    let raw = fixture.raw();

    let tables: i64 = raw
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('configs', 'settings')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 2);
    assert_eq!(count(&raw, "index"), indexes_before);

    let named: i64 = raw
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name IN \
             ('configs_name_idx', 'settings_config_name_idx', 'settings_config_id_idx')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(named, 3);
    assert_eq!(fixture.store.get_configs().unwrap().len(), 1);
}

// =============================================================================
// Descriptions and Audit Fields
// =============================================================================

#[test]
fn test_descriptions_report_change() {
    let fixture = TestFixture::new();
    let store = &fixture.store;
    let config = store.create_config("billing", "old").unwrap().id().unwrap();

    assert!(!store.set_config_desc(config, "old").unwrap());
    assert!(store.set_config_desc(config, "new").unwrap());
    assert_eq!(
        store.get_config("billing").unwrap().unwrap().description(),
        "new"
    );

    let setting = store.set(config, "region", Value::from("eu")).unwrap();
    let id = setting.id().unwrap();
    assert!(store.set_setting_desc(id, "Deployment region").unwrap());
    assert!(!store.set_setting_desc(id, "Deployment region").unwrap());
    assert_eq!(
        store.get_setting(config, "region").unwrap().unwrap().description(),
        "Deployment region"
    );
}

#[test]
fn test_updates_stamp_audit_fields() {
    let fixture = TestFixture::new();
    let store = &fixture.store;
    let config = store.create_config("billing", "").unwrap().id().unwrap();
    let created = store.set(config, "max_retries", Value::Int32(3)).unwrap();

    store
        .set_setting_value(created.id().unwrap(), Value::Int32(4))
        .unwrap();

    let updated = store.get_setting(config, "max_retries").unwrap().unwrap();
    assert_eq!(updated.created_at(), created.created_at());
    assert!(updated.updated_at() >= created.updated_at());
    assert_eq!(updated.created_by(), "tests");
    assert_eq!(updated.updated_by(), "tests");
}

// =============================================================================
// Type Immutability and Deprecation
// =============================================================================

#[test]
fn test_upsert_keeps_type() {
    let fixture = TestFixture::new();
    let store = &fixture.store;
    let config = store.create_config("billing", "").unwrap().id().unwrap();

    store.set(config, "x", Value::Int32(1)).unwrap();
    let err = store.set(config, "x", Value::from("a string")).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    let setting = store.get_setting(config, "x").unwrap().unwrap();
    assert_eq!(setting.value_type(), Type::Int32);
    assert_eq!(setting.value(), &Value::Int32(1));
}

#[test]
fn test_deprecation_is_monotonic() {
    let fixture = TestFixture::new();
    let store = &fixture.store;
    let config = store.create_config("billing", "").unwrap().id().unwrap();
    let id = store
        .set(config, "legacy_mode", Value::Bool(false))
        .unwrap()
        .id()
        .unwrap();

    assert!(!store.set_setting_deprecation_reason(id, "too early").unwrap());

    assert!(store.deprecate_setting(id, None).unwrap());
    let first = store.get_setting(config, "legacy_mode").unwrap().unwrap();
    assert!(first.is_deprecated());
    assert!(first.deprecated_at().is_some());

    assert!(store.deprecate_setting(id, Some("superseded")).unwrap());
    assert!(store.set_setting_deprecation_reason(id, "replaced by mode").unwrap());

    let last = store.get_setting(config, "legacy_mode").unwrap().unwrap();
    assert!(last.is_deprecated());
    assert_eq!(last.deprecation_reason(), "replaced by mode");
    assert_eq!(last.deprecated_at(), first.deprecated_at());
}

#[test]
fn test_unknown_setting_id_is_not_found() {
    let fixture = TestFixture::new();
    let missing = SettingId::new(404);

    for err in [
        fixture
            .store
            .set_setting_value(missing, Value::Bool(true))
            .unwrap_err(),
        fixture.store.set_setting_desc(missing, "x").unwrap_err(),
        fixture.store.deprecate_setting(missing, None).unwrap_err(),
    ] {
        assert!(matches!(err, Error::SettingNotFound(_)), "{err}");
    }
}
