// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret acquisition via environment variable or TTY prompt.

use secrecy::SecretString;

/// Environment variable holding the account password for non-interactive use.
pub const PASSWORD_ENV_VAR: &str = "VAULTKEEP_PASSWORD";

/// Environment variable holding the secret stored by `add-password`.
pub const SECRET_ENV_VAR: &str = "VAULTKEEP_SECRET";

/// Read a secret from `env_var`, falling back to an interactive prompt.
pub fn read_secret(label: &str, env_var: &str) -> Result<SecretString, String> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Ok(SecretString::from(value));
        }
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("{label}: ");
        let value = rpassword::read_password().map_err(|e| format!("failed to read {label}: {e}"))?;
        if value.is_empty() {
            return Err(format!("empty {label} not allowed"));
        }
        return Ok(SecretString::from(value));
    }

    Err(format!(
        "no {label} provided. Set {env_var} or run interactively."
    ))
}
