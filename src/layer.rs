//! Layer application: overlay a sparse TOML table onto a typed configuration.
//!
//! Both the file layer and the argument layer mutate the configuration the
//! same way: serialize the current value to a table, deep-merge the layer on
//! top, and deserialize the result back in place. Keys the layer does not
//! mention keep whatever value they had, which is what makes each source
//! sparse.

use serde::Serialize;
use serde::de::DeserializeOwned;
use toml::{Table, Value};

use crate::error::LayerError;

/// Serialize a configuration into a TOML table.
///
/// The conversion goes through TOML text: `toml::Value` carries datetimes as
/// wrapper tables on the way in and as strings on the way out, while the text
/// form keeps them as `Value::Datetime`. `Option::None` fields are omitted.
pub fn to_table<C: Serialize>(config: &C) -> Result<Table, LayerError> {
    let text = toml::to_string(config)?;
    Ok(toml::from_str(&text)?)
}

/// Overlay `layer` onto `config`.
///
/// The update is all-or-nothing: if the merged table does not deserialize into
/// `C`, `config` is left untouched.
pub fn apply<C>(config: &mut C, layer: Table) -> Result<(), LayerError>
where
    C: Serialize + DeserializeOwned,
{
    if layer.is_empty() {
        return Ok(());
    }
    let mut merged = to_table(config)?;
    merge_into(&mut merged, layer);
    let text = toml::to_string(&merged)?;
    *config = toml::from_str(&text)?;
    Ok(())
}

/// Deep-merge `overlay` into `base`. Tables on both sides recurse; any other
/// pairing is won by the overlay.
pub fn merge_into(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let Value::Table(overlay_tbl) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(Value::Table(base_tbl)) = base.get_mut(&key) {
            merge_into(base_tbl, overlay_tbl);
            continue;
        }
        base.insert(key, Value::Table(overlay_tbl));
    }
}

/// Expand dotted-key pairs into a nested table.
///
/// `("employer.name", "acme")` becomes `{employer = {name = "acme"}}`. When a
/// key repeats, the last entry wins.
pub fn overrides_to_table(entries: &[(String, Value)]) -> Table {
    let mut table = Table::new();
    for (dotted_key, value) in entries {
        let segments: Vec<&str> = dotted_key.split('.').collect();
        set_nested(&mut table, &segments, value.clone());
    }
    table
}

fn set_nested(table: &mut Table, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [leaf] => {
            table.insert(leaf.to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = table
                .entry(head.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            if let Value::Table(sub) = entry {
                set_nested(sub, rest, value);
            }
        }
    }
}
