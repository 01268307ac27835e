// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vaultkeep.toml` > `~/.config/vaultkeep/vaultkeep.toml`
//! > `/etc/vaultkeep/vaultkeep.toml` with environment variable overrides via
//! the `VAULTKEEP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::VaultkeepConfig;

/// Config sections that environment variables can address.
const SECTIONS: &[&str] = &[
    "server", "storage", "keys", "session", "password", "logging", "client",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vaultkeep/vaultkeep.toml` (system-wide)
/// 3. `~/.config/vaultkeep/vaultkeep.toml` (user XDG config)
/// 4. `./vaultkeep.toml` (local directory)
/// 5. `VAULTKEEP_*` environment variables
pub fn load_config() -> Result<VaultkeepConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<VaultkeepConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VaultkeepConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VaultkeepConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VaultkeepConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(VaultkeepConfig::default()))
        .merge(Toml::file("/etc/vaultkeep/vaultkeep.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("vaultkeep/vaultkeep.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("vaultkeep.toml"))
        .merge(env_provider())
}

/// Map `VAULTKEEP_<SECTION>_<KEY>` onto `<section>.<key>`.
///
/// Uses `Env::map()` rather than `Env::split("_")` so keys that contain
/// underscores survive: `VAULTKEEP_KEYS_MASTER_KEY` -> `keys.master_key`.
fn env_provider() -> Env {
    Env::prefixed("VAULTKEEP_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
