// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed item shapes layered over the raw `(data_type, payload, meta)` triple.
//!
//! Metadata is cleartext JSON and should only hold what is safe to list.
//! Everything sensitive goes in the payload, which the server encrypts.

use serde::{Deserialize, Serialize};
use vaultkeep_core::DataType;

use crate::error::ClientError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordMeta {
    pub resource: String,
    pub login: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMeta {
    pub name: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankCardMeta {
    pub bank: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMeta {
    pub name: String,
    pub extension: String,
    pub comment: String,
}

/// Card details, serialized as JSON into the encrypted payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankCardData {
    pub number: String,
    pub valid_month: u8,
    pub valid_year: u16,
    pub holder: String,
    pub cvv: String,
}

impl BankCardData {
    /// Last four digits, for display.
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(char::is_ascii_digit).collect();
        let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        format!("**** {tail}")
    }
}

impl std::fmt::Debug for BankCardData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankCardData")
            .field("number", &self.masked_number())
            .field("valid_month", &self.valid_month)
            .field("valid_year", &self.valid_year)
            .field("holder", &self.holder)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// Item exactly as the server returns it, payload already decrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub data_type: DataType,
    pub payload: Vec<u8>,
    pub meta: String,
}

/// A decoded vault item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Password { meta: PasswordMeta, password: String },
    Text { meta: TextMeta, text: String },
    BankCard { meta: BankCardMeta, card: BankCardData },
    File { meta: FileMeta, content: Vec<u8> },
}

impl Item {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Password { .. } => DataType::Password,
            Self::Text { .. } => DataType::Text,
            Self::BankCard { .. } => DataType::BankCard,
            Self::File { .. } => DataType::File,
        }
    }

    /// Encode into the wire `(data_type, payload, meta)` triple.
    pub fn encode(&self) -> Result<RawItem, ClientError> {
        let (payload, meta) = match self {
            Self::Password { meta, password } => (password.as_bytes().to_vec(), to_json(meta)?),
            Self::Text { meta, text } => (text.as_bytes().to_vec(), to_json(meta)?),
            Self::BankCard { meta, card } => (
                serde_json::to_vec(card).map_err(|e| ClientError::InvalidInput(e.to_string()))?,
                to_json(meta)?,
            ),
            Self::File { meta, content } => (content.clone(), to_json(meta)?),
        };
        Ok(RawItem {
            data_type: self.data_type(),
            payload,
            meta,
        })
    }

    /// Replace the metadata with `json`, which must fit this item's type.
    pub fn set_meta_json(&mut self, json: &str) -> Result<(), ClientError> {
        match self {
            Self::Password { meta, .. } => *meta = strict_meta(json)?,
            Self::Text { meta, .. } => *meta = strict_meta(json)?,
            Self::BankCard { meta, .. } => *meta = strict_meta(json)?,
            Self::File { meta, .. } => *meta = strict_meta(json)?,
        }
        Ok(())
    }

    /// Decode a raw item according to its data type.
    pub fn decode(raw: RawItem) -> Result<Self, ClientError> {
        let RawItem {
            data_type,
            payload,
            meta,
        } = raw;
        Ok(match data_type {
            DataType::Password => Self::Password {
                meta: from_json(&meta)?,
                password: utf8(payload)?,
            },
            DataType::Text => Self::Text {
                meta: from_json(&meta)?,
                text: utf8(payload)?,
            },
            DataType::BankCard => Self::BankCard {
                meta: from_json(&meta)?,
                card: serde_json::from_slice(&payload)
                    .map_err(|e| ClientError::Decode(format!("bank card payload: {e}")))?,
            },
            DataType::File => Self::File {
                meta: from_json(&meta)?,
                content: payload,
            },
        })
    }
}

/// Parse replacement metadata for one item type. Unknown keys are refused
/// so a typo does not silently drop a field.
fn strict_meta<T>(json: &str) -> Result<T, ClientError>
where
    T: Serialize + for<'de> Deserialize<'de> + Default,
{
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ClientError::InvalidInput(format!("metadata is not JSON: {e}")))?;
    let Some(fields) = value.as_object() else {
        return Err(ClientError::InvalidInput("metadata must be a JSON object".to_string()));
    };
    let known = serde_json::to_value(T::default()).map_err(|e| ClientError::InvalidInput(e.to_string()))?;
    if let Some(unknown) = fields.keys().find(|key| known.get(key.as_str()).is_none()) {
        return Err(ClientError::InvalidInput(format!("unknown metadata field `{unknown}`")));
    }
    serde_json::from_value(value).map_err(|e| ClientError::InvalidInput(format!("metadata: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ClientError> {
    serde_json::to_string(value).map_err(|e| ClientError::InvalidInput(e.to_string()))
}

fn from_json<T: for<'de> Deserialize<'de> + Default>(meta: &str) -> Result<T, ClientError> {
    if meta.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(meta).map_err(|e| ClientError::Decode(format!("item metadata: {e}")))
}

fn utf8(payload: Vec<u8>) -> Result<String, ClientError> {
    String::from_utf8(payload).map_err(|e| ClientError::Decode(format!("payload is not UTF-8: {e}")))
}
