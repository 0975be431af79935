//! `utilkit store ...` subcommands.

use anyhow::{Context, Result};
use serde_json::Value;
use utilkit_store::{LocalStorage, StoragePort};

use crate::cli::StoreAction;

/// Run one store action and return what should be printed.
pub fn run<P: StoragePort>(storage: &LocalStorage<P>, action: &StoreAction) -> Result<String> {
    match action {
        StoreAction::Set { key, value, json } => {
            let value = if *json {
                serde_json::from_str(value)
                    .with_context(|| format!("--json value is not valid JSON: {value}"))?
            } else {
                Value::String(value.clone())
            };
            storage
                .set_item(key, &value)
                .with_context(|| format!("failed to store `{key}`"))?;
            Ok(String::new())
        }
        StoreAction::Get { key } => {
            let value = storage
                .get_item(Some(key.as_str()))
                .with_context(|| format!("failed to read `{key}`"))?;
            Ok(serde_json::to_string(&value.unwrap_or(Value::Null))?)
        }
        StoreAction::Remove { key } => {
            storage
                .remove_item(key)
                .with_context(|| format!("failed to remove `{key}`"))?;
            Ok(String::new())
        }
        StoreAction::Clear => {
            storage.clear().context("failed to clear store")?;
            Ok(String::new())
        }
        StoreAction::Keys => Ok(storage.keys().context("failed to list keys")?.join("\n")),
    }
}
