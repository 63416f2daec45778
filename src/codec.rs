//! File codec: TOML text to layer tables and back.
//!
//! Decoding produces a sparse [`toml::Table`] that the resolver overlays onto
//! its configuration. Encoding renders a whole configuration, either as a
//! fresh document or patched into an existing one with `toml_edit` so the
//! user's comments and layout survive.

use std::path::Path;

use confique::Config;
use serde::Serialize;
use serde::de::DeserializeOwned;
use toml::{Table, Value};

use crate::error::{CodecError, FileError};
use crate::layer;
use crate::validate;

/// Decode file content into a layer table. In strict mode, keys unknown to
/// `C` are rejected first.
pub fn decode<C: Config>(content: &str, path: &Path, strict: bool) -> Result<Table, FileError>
where
    C::Layer: DeserializeOwned,
{
    if strict {
        validate::validate_unknown_keys::<C>(content, path)?;
    }
    toml::from_str(content).map_err(|source| FileError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Render a configuration as a TOML document.
pub fn encode<C: Serialize>(config: &C) -> Result<String, CodecError> {
    Ok(toml::to_string(config)?)
}

/// Commented TOML template generated from the doc comments and
/// `#[config(default)]` values of `C`.
pub fn template<C: Config>() -> String {
    confique::toml::template::<C>(confique::toml::FormatOptions::default())
}

/// Write every value of `config` into `existing` (or into the template of `C`
/// when there is no document yet), keeping comments and formatting.
pub fn patch_document<C: Config + Serialize>(
    existing: Option<&str>,
    config: &C,
    path: &Path,
) -> Result<String, CodecError> {
    let base = match existing {
        Some(content) => content.to_string(),
        None => template::<C>(),
    };
    let mut doc: toml_edit::DocumentMut =
        base.parse()
            .map_err(|source: toml_edit::TomlError| CodecError::Document {
                path: path.to_path_buf(),
                source,
            })?;

    let values = layer::to_table(config)?;

    let mut leaves = Vec::new();
    collect_leaves(&values, &mut Vec::new(), &mut leaves);
    for (segments, value) in leaves {
        set_leaf(doc.as_item_mut(), &segments, value);
    }
    Ok(doc.to_string())
}

fn collect_leaves<'a>(
    table: &'a Table,
    prefix: &mut Vec<&'a str>,
    out: &mut Vec<(Vec<&'a str>, &'a Value)>,
) {
    for (key, value) in table {
        prefix.push(key.as_str());
        match value {
            Value::Table(sub) => collect_leaves(sub, prefix, out),
            leaf => out.push((prefix.clone(), leaf)),
        }
        prefix.pop();
    }
}

fn set_leaf(root: &mut toml_edit::Item, segments: &[&str], value: &Value) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let mut current = root;
    for segment in parents {
        if !current.get(segment).is_some_and(toml_edit::Item::is_table_like) {
            current[segment] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        current = &mut current[segment];
    }
    current[leaf] = toml_edit::value(to_edit_value(value));
}

fn to_edit_value(value: &Value) -> toml_edit::Value {
    match value {
        Value::String(s) => s.as_str().into(),
        Value::Integer(i) => (*i).into(),
        Value::Float(f) => (*f).into(),
        Value::Boolean(b) => (*b).into(),
        Value::Datetime(d) => (*d).into(),
        Value::Array(items) => {
            toml_edit::Value::Array(items.iter().map(to_edit_value).collect())
        }
        Value::Table(table) => toml_edit::Value::InlineTable(
            table
                .iter()
                .map(|(k, v)| (k.as_str(), to_edit_value(v)))
                .collect(),
        ),
    }
}
