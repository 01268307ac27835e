// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! `validate_config` checks what every command needs. `validate_for_serve`
//! adds the key material the server cannot start without.

use crate::diagnostic::ConfigError;
use crate::model::VaultkeepConfig;

/// Minimum length of the session signing secret.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// Length in bytes of the decoded master key.
pub const MASTER_KEY_LEN: usize = 32;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &VaultkeepConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        errors.push(invalid("server.bind_address must not be empty"));
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(invalid(format!(
                "server.bind_address `{addr}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(invalid("server.request_timeout_secs must be at least 1"));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(invalid("storage.database_path must not be empty"));
    }

    if config.session.lifetime_minutes == 0 {
        errors.push(invalid("session.lifetime_minutes must be at least 1"));
    }

    if config.session.header.trim().is_empty() {
        errors.push(invalid("session.header must not be empty"));
    }

    if config.password.memory_cost < 8 * config.password.parallelism.max(1) {
        errors.push(invalid(format!(
            "password.memory_cost must be at least 8 KiB per lane, got {}",
            config.password.memory_cost
        )));
    }

    if config.password.iterations < 1 {
        errors.push(invalid("password.iterations must be at least 1"));
    }

    if config.password.parallelism < 1 {
        errors.push(invalid("password.parallelism must be at least 1"));
    }

    if let Some(key) = &config.keys.master_key {
        if let Err(message) = check_master_key(key) {
            errors.push(invalid(message));
        }
    }

    if let Some(key) = &config.session.signing_key {
        if key.len() < MIN_SIGNING_KEY_LEN {
            errors.push(invalid(format!(
                "session.signing_key must be at least {MIN_SIGNING_KEY_LEN} characters"
            )));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate the configuration for running the server.
///
/// Both the master key and the session signing key are required.
pub fn validate_for_serve(config: &VaultkeepConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = match validate_config(config) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    if config.keys.master_key.is_none() {
        errors.push(ConfigError::MissingKey {
            key: "keys.master_key".to_string(),
        });
    }

    if config.session.signing_key.is_none() {
        errors.push(ConfigError::MissingKey {
            key: "session.signing_key".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_master_key(key: &str) -> Result<(), String> {
    let bytes = hex::decode(key.trim())
        .map_err(|e| format!("keys.master_key must be hex encoded: {e}"))?;
    if bytes.len() != MASTER_KEY_LEN {
        return Err(format!(
            "keys.master_key must decode to {MASTER_KEY_LEN} bytes, got {}",
            bytes.len()
        ));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}
