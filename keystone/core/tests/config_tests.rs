// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::io::Write;

use keystone_core::domain::config::{DECODE_POLICY_ENV, TABLE_PREFIX_ENV};
use keystone_core::{DecodePolicy, PersistenceConfig};
use tempfile::NamedTempFile;

#[test]
fn test_load_from_yaml_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "decode_policy: strict").unwrap();
    writeln!(file, "table_prefix: staging_").unwrap();
    writeln!(file, "event_bus_capacity: 64").unwrap();

    let config = PersistenceConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.decode_policy, DecodePolicy::Strict);
    assert_eq!(config.table_prefix.as_deref(), Some("staging_"));
    assert_eq!(config.event_bus_capacity, 64);
}

#[test]
fn test_yaml_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keystone.yaml");

    let config = PersistenceConfig {
        decode_policy: DecodePolicy::Strict,
        table_prefix: Some("prod_".to_string()),
        event_bus_capacity: 256,
    };
    config.to_yaml_file(&path).unwrap();

    let parsed = PersistenceConfig::from_yaml_file(&path).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_explicit_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    let err = PersistenceConfig::load_or_default(Some(missing)).unwrap_err();
    assert!(err.to_string().contains("Failed to load persistence config"));
}

#[test]
fn test_invalid_file_contents_fail_validation() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "event_bus_capacity: 0").unwrap();
    assert!(PersistenceConfig::load_or_default(Some(file.path().to_path_buf())).is_err());
}

// Environment variables are process-wide; every env assertion lives in this
// one test so parallel tests never observe a half-applied override.
#[test]
fn test_env_overrides() {
    std::env::set_var(DECODE_POLICY_ENV, "STRICT");
    std::env::set_var(TABLE_PREFIX_ENV, "ci_");
    let config = PersistenceConfig::load_or_default(None).unwrap();
    assert_eq!(config.decode_policy, DecodePolicy::Strict);
    assert_eq!(config.table_prefix.as_deref(), Some("ci_"));

    std::env::set_var(DECODE_POLICY_ENV, "sloppy");
    let mut config = PersistenceConfig::default();
    config.apply_env_overrides();
    assert_eq!(config.decode_policy, DecodePolicy::Lenient);

    std::env::remove_var(DECODE_POLICY_ENV);
    std::env::remove_var(TABLE_PREFIX_ENV);
}
