// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config errors as miette diagnostics.
//!
//! Figment reports what went wrong but not where. This module points unknown
//! keys back at the TOML line that introduced them, proposes the closest
//! valid key, and keeps secret values out of type errors.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::{Error as FigmentError, Kind};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a key must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Dotted paths whose values never appear in an error message.
const SECRET_PATHS: &[&str] = &["keys.master_key", "session.signing_key"];

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key or section the config model does not have.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(vaultkeep::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a vaultkeep setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(vaultkeep::config::invalid_type), help("{hint}"))]
    InvalidType {
        key: String,
        detail: String,
        hint: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(vaultkeep::config::missing_key),
        help("set `{key}` in vaultkeep.toml or the matching VAULTKEEP_ variable")
    )]
    MissingKey { key: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(vaultkeep::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(vaultkeep::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Split a figment error into one diagnostic per underlying failure.
///
/// `toml_sources` pairs a display path with file contents and is used to
/// attach source spans to unknown keys.
pub fn figment_to_config_errors(
    err: FigmentError,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => unknown_key(&error, field, expected, toml_sources),
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: dotted(&error.path, field),
            },
            Kind::InvalidType(actual, expected) => {
                let key = error.path.join(".");
                let detail = if SECRET_PATHS.contains(&key.as_str()) {
                    format!("expected {expected}")
                } else {
                    format!("found {actual}, expected {expected}")
                };
                let hint = if from_env(&error) {
                    format!("check the {} environment variable", env_var_for(&error.path))
                } else {
                    format!("`{key}` takes {expected}")
                };
                ConfigError::InvalidType { key, detail, hint }
            }
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

fn unknown_key(
    error: &FigmentError,
    field: &str,
    expected: &[&str],
    toml_sources: &[(String, String)],
) -> ConfigError {
    let (span, src) = pick_source(error, toml_sources)
        .and_then(|(path, content)| {
            let offset = locate_key(content, error.path.first().map(String::as_str), field)?;
            Some((
                SourceSpan::new(offset.into(), field.len()),
                NamedSource::new(path, content.clone()),
            ))
        })
        .unzip();

    ConfigError::UnknownKey {
        key: field.to_string(),
        suggestion: closest_key(field, expected),
        valid_keys: expected.join(", "),
        span,
        src,
    }
}

/// The source that produced `error`. Without a file path (inline TOML or a
/// path figment resolved differently) a lone candidate is still unambiguous.
fn pick_source<'a>(
    error: &FigmentError,
    toml_sources: &'a [(String, String)],
) -> Option<&'a (String, String)> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    file.and_then(|path| toml_sources.iter().find(|(p, _)| *p == path))
        .or(match toml_sources {
            [only] => Some(only),
            _ => None,
        })
}

fn from_env(error: &FigmentError) -> bool {
    error
        .metadata
        .as_ref()
        .is_some_and(|m| m.name.contains("environment"))
}

/// `["server", "port"]` becomes `VAULTKEEP_SERVER_PORT`.
fn env_var_for(path: &[String]) -> String {
    let mut name = String::from("VAULTKEEP");
    for part in path {
        name.push('_');
        name.push_str(&part.to_ascii_uppercase());
    }
    name
}

fn dotted(path: &[String], field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", path.join("."))
    }
}

/// Byte offset of `key` inside the `[section]` table of a TOML document.
///
/// Only lines between that header and the next one are considered. With no
/// section the key is a top-level name, which in a vaultkeep config is a
/// table header, so `[key]` matches as well as `key = ...`.
pub fn locate_key(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();

        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.split(']').next()) {
            let header = header.trim();
            if section.is_none() && header == key {
                return line.find(key).map(|at| offset + at);
            }
            current = Some(header);
        } else if current == section {
            if let Some(rest) = trimmed.strip_prefix(key) {
                if rest.trim_start().starts_with('=') {
                    return Some(offset + indent);
                }
            }
        }

        offset += line.len();
    }

    None
}

/// The valid key most similar to `unknown`, if any is close enough.
pub fn closest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr with miette's graphical report handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
