// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Vaultkeep configuration system.

use figment::Jail;
use vaultkeep_config::diagnostic::ConfigError;
use vaultkeep_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
    validate_for_serve,
};

const MASTER_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
const SIGNING_KEY: &str = "an-hmac-secret-that-is-long-enough-to-use";

#[test]
fn full_toml_deserializes() {
    let toml = format!(
        r#"
[server]
bind_address = "0.0.0.0"
port = 9443
request_timeout_secs = 5
shutdown_grace_secs = 3

[storage]
database_path = "/tmp/vault.db"
wal_mode = false

[keys]
master_key = "{MASTER_KEY}"

[session]
signing_key = "{SIGNING_KEY}"
lifetime_minutes = 15
header = "x-session"

[password]
memory_cost = 4096
iterations = 3
parallelism = 2

[logging]
level = "debug"

[client]
server_url = "http://vault.internal:9443"
token_path = "/tmp/token"
"#
    );

    let config = load_config_from_str(&toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.server.port, 9443);
    assert_eq!(config.server.request_timeout_secs, 5);
    assert_eq!(config.server.shutdown_grace_secs, 3);
    assert_eq!(config.storage.database_path, "/tmp/vault.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.keys.master_key.as_deref(), Some(MASTER_KEY));
    assert_eq!(config.session.signing_key.as_deref(), Some(SIGNING_KEY));
    assert_eq!(config.session.lifetime_minutes, 15);
    assert_eq!(config.session.header, "x-session");
    assert_eq!(config.password.memory_cost, 4096);
    assert_eq!(config.password.iterations, 3);
    assert_eq!(config.password.parallelism, 2);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.client.server_url, "http://vault.internal:9443");
    assert_eq!(config.client.token_path, "/tmp/token");
    assert!(validate_for_serve(&config).is_ok());
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("empty config is valid");
    assert_eq!(config.server.bind_address, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.session.lifetime_minutes, 60);
    assert!(config.storage.wal_mode);
}

#[test]
fn unknown_field_suggests_correction() {
    let toml = "[server]\nprot = 9000\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert_eq!(key, "prot");
            assert_eq!(suggestion.as_deref(), Some("port"));
            assert!(span.is_some());
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telemetry]\nenabled = true\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[server]\nport = \"eighty\"\n").unwrap_err();
    match &errors[0] {
        ConfigError::InvalidType { key, .. } => assert_eq!(key, "server.port"),
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn validation_errors_surface_through_loader() {
    let errors = load_and_validate_str("[keys]\nmaster_key = \"abcd\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn env_overrides_file_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "vaultkeep.toml",
            "[server]\nport = 7000\n[session]\nlifetime_minutes = 5\n",
        )?;
        jail.set_env("VAULTKEEP_SERVER_PORT", "7100");
        jail.set_env("VAULTKEEP_KEYS_MASTER_KEY", MASTER_KEY);
        jail.set_env("VAULTKEEP_SESSION_SIGNING_KEY", SIGNING_KEY);

        let config = load_config_from_path(std::path::Path::new("vaultkeep.toml"))?;
        assert_eq!(config.server.port, 7100);
        assert_eq!(config.session.lifetime_minutes, 5);
        assert_eq!(config.keys.master_key.as_deref(), Some(MASTER_KEY));
        assert_eq!(config.session.signing_key.as_deref(), Some(SIGNING_KEY));
        Ok(())
    });
}

#[test]
fn explicit_path_errors_carry_source_spans() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[session]\nlifetme_minutes = 5\n")?;
        let errors = load_and_validate_path(std::path::Path::new("custom.toml")).unwrap_err();
        match &errors[0] {
            ConfigError::UnknownKey {
                suggestion, src, ..
            } => {
                assert_eq!(suggestion.as_deref(), Some("lifetime_minutes"));
                assert!(src.is_some());
            }
            other => panic!("expected UnknownKey, got {other:?}"),
        }
        Ok(())
    });
}
