// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client subcommands. Output is plain stdout lines.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Subcommand;
use secrecy::ExposeSecret;
use vaultkeep_client::{
    BankCardData, BankCardMeta, ClientError, FileMeta, Item, PasswordMeta, TextMeta, TokenCache, VaultClient,
};
use vaultkeep_config::VaultkeepConfig;
use vaultkeep_core::DataType;

use crate::prompt::{read_secret, PASSWORD_ENV_VAR, SECRET_ENV_VAR};

/// Environment variable holding the card CVV for `add-card`.
pub const CVV_ENV_VAR: &str = "VAULTKEEP_CARD_CVV";

/// Subcommands that talk to a running server.
#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// Create an account and log in. The password is read from VAULTKEEP_PASSWORD or prompted.
    Register { login: String },
    /// Log in to an existing account.
    Login { login: String },
    /// Forget the cached session token.
    Logout,
    /// Store a password. The secret is read from VAULTKEEP_SECRET or prompted.
    AddPassword {
        #[arg(long)]
        resource: String,
        #[arg(long, default_value = "")]
        login: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Store a text note. Reads stdin when --text is omitted.
    AddText {
        #[arg(long)]
        name: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Store a bank card. The CVV is read from VAULTKEEP_CARD_CVV or prompted.
    AddCard {
        #[arg(long)]
        bank: String,
        #[arg(long)]
        number: String,
        #[arg(long)]
        month: u8,
        #[arg(long)]
        year: u16,
        #[arg(long)]
        holder: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Store a file.
    AddFile {
        path: PathBuf,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Show one item. File contents are written to --output.
    Get {
        id: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List ids and metadata of every item of a type.
    List {
        #[arg(value_parser = parse_data_type)]
        data_type: DataType,
    },
    /// Replace an item's payload and/or metadata.
    Update {
        id: String,
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Replacement metadata as a JSON document.
        #[arg(long)]
        meta: Option<String>,
    },
    /// Delete an item.
    Delete { id: String },
}

/// Accepts `password`, `bank-card`, `BANK_CARD` and similar spellings.
pub fn parse_data_type(value: &str) -> Result<DataType, String> {
    value
        .trim()
        .to_ascii_uppercase()
        .replace('-', "_")
        .parse()
        .map_err(|_| format!("unknown data type `{value}` (expected password, text, bank-card, or file)"))
}

/// Client configured from the `[client]` and `[session]` sections.
pub fn build_client(config: &VaultkeepConfig) -> Result<VaultClient, ClientError> {
    let tokens = TokenCache::persistent(&config.client.token_path)?;
    VaultClient::new(&config.client.server_url, tokens)?
        .with_session_header(&config.session.header)
        .map(|c| c.with_deadline(Duration::from_secs(config.server.request_timeout_secs)))
}

/// Runs one client subcommand.
pub async fn run(client: &VaultClient, command: ClientCommand) -> Result<(), ClientError> {
    match command {
        ClientCommand::Register { login } => {
            let password = read_secret("password", PASSWORD_ENV_VAR).map_err(ClientError::InvalidInput)?;
            client.register(&login, &password).await?;
            println!("registered {}", login.to_lowercase());
        }
        ClientCommand::Login { login } => {
            let password = read_secret("password", PASSWORD_ENV_VAR).map_err(ClientError::InvalidInput)?;
            client.login(&login, &password).await?;
            println!("logged in as {}", login.to_lowercase());
        }
        ClientCommand::Logout => {
            client.logout()?;
            println!("logged out");
        }
        ClientCommand::AddPassword {
            resource,
            login,
            comment,
        } => {
            let secret = read_secret("secret", SECRET_ENV_VAR).map_err(ClientError::InvalidInput)?;
            let meta = PasswordMeta {
                resource,
                login,
                comment,
            };
            println!("{}", client.add_password(meta, &secret).await?);
        }
        ClientCommand::AddText { name, text, comment } => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            println!("{}", client.add_text(TextMeta { name, comment }, &text).await?);
        }
        ClientCommand::AddCard {
            bank,
            number,
            month,
            year,
            holder,
            comment,
        } => {
            if !(1..=12).contains(&month) {
                return Err(ClientError::InvalidInput(format!("month {month} is not 1-12")));
            }
            let cvv = read_secret("cvv", CVV_ENV_VAR).map_err(ClientError::InvalidInput)?;
            let card = BankCardData {
                number,
                valid_month: month,
                valid_year: year,
                holder,
                cvv: cvv.expose_secret().to_owned(),
            };
            println!("{}", client.add_bank_card(BankCardMeta { bank, comment }, card).await?);
        }
        ClientCommand::AddFile { path, comment } => {
            let content = read_file(&path)?;
            println!("{}", client.add_file(file_meta(&path, comment), content).await?);
        }
        ClientCommand::Get { id, output } => {
            let item = client.get_item(&id).await?;
            if let (Item::File { content, .. }, Some(output)) = (&item, &output) {
                std::fs::write(output, content)
                    .map_err(|e| ClientError::InvalidInput(format!("cannot write {}: {e}", output.display())))?;
            }
            for line in render_item(&item) {
                println!("{line}");
            }
        }
        ClientCommand::List { data_type } => {
            for summary in client.get_all_by_type(data_type).await? {
                println!("{}\t{}", summary.id, summary.meta);
            }
        }
        ClientCommand::Update { id, text, file, meta } => {
            let current = client.get_item(&id).await?;
            let text = match text {
                None if file.is_none() && meta.is_none() && current.data_type() == DataType::Password => {
                    let secret = read_secret("secret", SECRET_ENV_VAR).map_err(ClientError::InvalidInput)?;
                    Some(secret.expose_secret().to_owned())
                }
                text => text,
            };
            let content = file.as_deref().map(read_file).transpose()?;
            let updated = apply_update(current, text, content, meta.as_deref())?;
            client.update_item(&id, &updated).await?;
            println!("updated {id}");
        }
        ClientCommand::Delete { id } => {
            client.delete_data(&id).await?;
            println!("deleted {id}");
        }
    }
    Ok(())
}

/// Apply `update` flags to a decoded item. `--text` fits password and text
/// items, `--file` fits file items, and `--meta` must match the item's type.
pub fn apply_update(
    mut item: Item,
    text: Option<String>,
    content: Option<Vec<u8>>,
    meta: Option<&str>,
) -> Result<Item, ClientError> {
    match (&mut item, text, content) {
        (_, Some(_), Some(_)) => {
            return Err(ClientError::InvalidInput("--text and --file are exclusive".to_string()));
        }
        (Item::Password { password, .. }, Some(new), None) => *password = new,
        (Item::Text { text, .. }, Some(new), None) => *text = new,
        (Item::File { content, .. }, None, Some(new)) => *content = new,
        (_, None, None) => {}
        (other, Some(_), None) => {
            return Err(ClientError::InvalidInput(format!(
                "--text does not apply to {} items",
                other.data_type()
            )));
        }
        (other, None, Some(_)) => {
            return Err(ClientError::InvalidInput(format!(
                "--file does not apply to {} items",
                other.data_type()
            )));
        }
    }
    if let Some(meta) = meta {
        item.set_meta_json(meta)?;
    }
    Ok(item)
}

/// Lines printed by `get`.
pub fn render_item(item: &Item) -> Vec<String> {
    match item {
        Item::Password { meta, password } => vec![
            "type: PASSWORD".to_string(),
            format!("resource: {}", meta.resource),
            format!("login: {}", meta.login),
            format!("password: {password}"),
            format!("comment: {}", meta.comment),
        ],
        Item::Text { meta, text } => vec![
            "type: TEXT".to_string(),
            format!("name: {}", meta.name),
            format!("comment: {}", meta.comment),
            text.clone(),
        ],
        Item::BankCard { meta, card } => vec![
            "type: BANK_CARD".to_string(),
            format!("bank: {}", meta.bank),
            format!("number: {}", card.number),
            format!("valid: {:02}/{}", card.valid_month, card.valid_year),
            format!("holder: {}", card.holder),
            format!("cvv: {}", card.cvv),
            format!("comment: {}", meta.comment),
        ],
        Item::File { meta, content } => vec![
            "type: FILE".to_string(),
            format!("name: {}", file_name(meta)),
            format!("size: {} bytes", content.len()),
            format!("comment: {}", meta.comment),
        ],
    }
}

fn file_name(meta: &FileMeta) -> String {
    if meta.extension.is_empty() {
        meta.name.clone()
    } else {
        format!("{}.{}", meta.name, meta.extension)
    }
}

fn file_meta(path: &Path, comment: String) -> FileMeta {
    FileMeta {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        extension: path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        comment,
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ClientError> {
    std::fs::read(path).map_err(|e| ClientError::InvalidInput(format!("cannot read {}: {e}", path.display())))
}

fn read_stdin() -> Result<String, ClientError> {
    use std::io::Read;
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| ClientError::InvalidInput(format!("cannot read stdin: {e}")))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_spellings() {
        assert_eq!(parse_data_type("password").unwrap(), DataType::Password);
        assert_eq!(parse_data_type("bank-card").unwrap(), DataType::BankCard);
        assert_eq!(parse_data_type("BANK_CARD").unwrap(), DataType::BankCard);
        assert!(parse_data_type("wallet").is_err());
    }

    #[test]
    fn file_meta_splits_name_and_extension() {
        let meta = file_meta(Path::new("/tmp/backup.tar"), "weekly".into());
        assert_eq!(meta.name, "backup");
        assert_eq!(meta.extension, "tar");
        assert_eq!(file_name(&meta), "backup.tar");

        let meta = file_meta(Path::new("README"), String::new());
        assert_eq!(file_name(&meta), "README");
    }

    #[test]
    fn password_rendering() {
        let item = Item::Password {
            meta: PasswordMeta {
                resource: "email".into(),
                login: "alice@example.com".into(),
                comment: String::new(),
            },
            password: "hunter2".into(),
        };
        let lines = render_item(&item);
        assert_eq!(lines[0], "type: PASSWORD");
        assert!(lines.contains(&"resource: email".to_string()));
        assert!(lines.contains(&"password: hunter2".to_string()));
    }

    #[test]
    fn card_validity_is_zero_padded() {
        let item = Item::BankCard {
            meta: BankCardMeta::default(),
            card: BankCardData {
                number: "4111111111111111".into(),
                valid_month: 3,
                valid_year: 2030,
                holder: "A".into(),
                cvv: "123".into(),
            },
        };
        assert!(render_item(&item).contains(&"valid: 03/2030".to_string()));
    }

    fn bank_card() -> Item {
        Item::BankCard {
            meta: BankCardMeta {
                bank: "First Bank".into(),
                comment: String::new(),
            },
            card: BankCardData {
                number: "4111111111111111".into(),
                valid_month: 1,
                valid_year: 2031,
                holder: "A".into(),
                cvv: "123".into(),
            },
        }
    }

    #[test]
    fn update_payload_flag_must_fit_item_type() {
        let text = Item::Text {
            meta: TextMeta::default(),
            text: "old".into(),
        };
        let updated = apply_update(text, Some("new".into()), None, None).unwrap();
        assert!(matches!(updated, Item::Text { text, .. } if text == "new"));

        let file = Item::File {
            meta: FileMeta::default(),
            content: vec![1],
        };
        let updated = apply_update(file, None, Some(vec![0xff, 0x00]), None).unwrap();
        assert!(matches!(updated, Item::File { content, .. } if content == vec![0xff, 0x00]));

        let password = Item::Password {
            meta: PasswordMeta::default(),
            password: "pw".into(),
        };
        for (item, text, content) in [
            (bank_card(), Some("foo".to_string()), None),
            (bank_card(), None, Some(vec![1, 2])),
            (password, None, Some(vec![0xff])),
        ] {
            let err = apply_update(item, text, content, None).unwrap_err();
            assert!(matches!(err, ClientError::InvalidInput(_)));
        }
    }

    #[test]
    fn update_meta_is_checked_against_item_type() {
        let updated = apply_update(bank_card(), None, None, Some(r#"{"comment":"travel"}"#)).unwrap();
        assert!(matches!(&updated, Item::BankCard { meta, .. } if meta.comment == "travel"));

        let err = apply_update(bank_card(), None, None, Some(r#"{"name":"x"}"#)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn text_update_on_a_card_is_refused_and_card_survives() {
        let harness = vaultkeep_test_utils::TestHarness::start().await.unwrap();
        let client = harness.client().unwrap();
        client
            .register("card-owner", &secrecy::SecretString::from("pw".to_string()))
            .await
            .unwrap();
        let id = client.add_item(&bank_card()).await.unwrap();

        let err = run(
            &client,
            ClientCommand::Update {
                id: id.clone(),
                text: Some("foo".into()),
                file: None,
                meta: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert_eq!(client.get_item(&id).await.unwrap(), bank_card());

        run(
            &client,
            ClientCommand::Update {
                id: id.clone(),
                text: None,
                file: None,
                meta: Some(r#"{"bank":"Second Bank"}"#.into()),
            },
        )
        .await
        .unwrap();
        match client.get_item(&id).await.unwrap() {
            Item::BankCard { meta, card } => {
                assert_eq!(meta.bank, "Second Bank");
                assert_eq!(card.cvv, "123");
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn client_built_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VaultkeepConfig::default();
        config.client.token_path = dir.path().join("session.token").to_string_lossy().into_owned();
        let client = build_client(&config).unwrap();
        assert!(!client.is_logged_in());
    }
}
