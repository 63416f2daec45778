//! Strict-mode validation: reject config files carrying keys the
//! configuration type does not have.
//!
//! The file is deserialized into `C::Layer` (every field optional) through
//! `serde_ignored`, which reports each key the layer did not consume.

use std::path::Path;

use confique::Config;
use serde::de::DeserializeOwned;

use crate::error::{FileError, UnknownKey};

/// Check `content` for keys unknown to `C`.
///
/// A value of the wrong type for a known key is reported as
/// [`FileError::Decode`], since the layer cannot be built from it either.
pub fn validate_unknown_keys<C: Config>(content: &str, path: &Path) -> Result<(), FileError>
where
    C::Layer: DeserializeOwned,
{
    let mut ignored: Vec<String> = Vec::new();

    let deserializer = toml::Deserializer::new(content);
    let _layer: C::Layer = serde_ignored::deserialize(deserializer, |key| {
        ignored.push(key.to_string());
    })
    .map_err(|source| FileError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    if ignored.is_empty() {
        return Ok(());
    }

    let keys = ignored
        .into_iter()
        .map(|key| UnknownKey {
            line: find_key_line(content, &key),
            key,
        })
        .collect();

    Err(FileError::UnknownKeys {
        path: path.to_path_buf(),
        keys,
    })
}

/// Best-effort 1-indexed line of a dotted key, tracking `[section]` headers.
/// Quoted keys and inline tables are not handled; returns 0 when not found.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let (section, leaf) = match dotted_key.rsplit_once('.') {
        Some((section, leaf)) => (section, leaf),
        None => ("", dotted_key),
    };

    let mut current = String::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if let Some(header) = trimmed.strip_prefix('[')
            && !header.starts_with('[')
        {
            current = header
                .trim_end_matches(']')
                .split('.')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(".");
            continue;
        }

        if current == section
            && let Some(rest) = trimmed.strip_prefix(leaf)
            && rest.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}
