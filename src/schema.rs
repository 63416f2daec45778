//! Flag schema: the command-line surface derived from a configuration type.
//!
//! Field names, nesting and doc comments come from confique's `META` tree.
//! Each field's value kind and default come from serializing the defaults the
//! resolver was built with, so a `u32` field becomes an integer flag and a
//! `Vec<i64>` field a comma-separated list. `Option` fields that start out
//! `None` have no serialized value; their kind is inferred from the input.
//!
//! Flag names are the dotted key path joined with `-`: `employer.name` is
//! passed as `-employer-name`.

use std::fmt;

use confique::Config;
use confique::meta::{FieldKind, Meta};
use serde::Serialize;
use toml::{Table, Value};

use crate::error::SetupError;
use crate::layer;

/// The kind of value a flag accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    /// Comma-separated list. The element kind is `None` when the default list
    /// was empty.
    Array(Option<Box<ValueKind>>),
    /// Inline TOML table, e.g. `{ a = 1 }`.
    Table,
    /// No default to learn from; parsed as bool, then integer, then float,
    /// then string.
    Inferred,
}

impl ValueKind {
    fn of(value: Option<&Value>) -> Self {
        match value {
            None => ValueKind::Inferred,
            Some(Value::String(_)) => ValueKind::String,
            Some(Value::Integer(_)) => ValueKind::Integer,
            Some(Value::Float(_)) => ValueKind::Float,
            Some(Value::Boolean(_)) => ValueKind::Boolean,
            Some(Value::Datetime(_)) => ValueKind::Datetime,
            Some(Value::Array(items)) => {
                ValueKind::Array(items.first().map(|v| Box::new(ValueKind::of(Some(v)))))
            }
            Some(Value::Table(_)) => ValueKind::Table,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::String => write!(f, "string"),
            ValueKind::Integer => write!(f, "int"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Boolean => write!(f, "bool"),
            ValueKind::Datetime => write!(f, "datetime"),
            ValueKind::Array(Some(elem)) => write!(f, "{elem},..."),
            ValueKind::Array(None) => write!(f, "list"),
            ValueKind::Table => write!(f, "table"),
            ValueKind::Inferred => write!(f, "value"),
        }
    }
}

/// One command-line flag bound to one leaf field.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSpec {
    /// Dotted key path into the configuration, e.g. `employer.name`.
    pub key: String,
    /// Flag name without the leading dash, e.g. `employer-name`.
    pub name: String,
    pub kind: ValueKind,
    /// Doc comment lines of the field.
    pub doc: Vec<String>,
    /// Value the field had when the schema was built.
    pub default: Option<Value>,
}

/// Ordered set of flags for one configuration type.
#[derive(Debug, Clone, Default)]
pub struct FlagSchema {
    flags: Vec<FlagSpec>,
}

impl FlagSchema {
    /// Build the schema for `C`, taking kinds and defaults from `defaults`.
    pub fn for_config<C: Config + Serialize>(defaults: &C) -> Result<Self, SetupError> {
        let values = layer::to_table(defaults).map_err(SetupError::Schema)?;
        let mut flags = Vec::new();
        collect_flags(&C::META, "", Some(&values), &mut flags);
        Ok(Self { flags })
    }

    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    /// Look a flag up by name (without the leading dash).
    pub fn find(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Render one usage entry per flag, in field declaration order:
    ///
    /// ```text
    /// {prefix}-employer-name <string> : Company name.
    /// {prefix}    default: defCom
    /// ```
    pub fn usage(&self, prefix: &str) -> String {
        let mut out = String::new();
        for flag in &self.flags {
            let doc = flag.doc.join(" ");
            if doc.is_empty() {
                out.push_str(&format!("{prefix}-{} <{}>\n", flag.name, flag.kind));
            } else {
                out.push_str(&format!("{prefix}-{} <{}> : {doc}\n", flag.name, flag.kind));
            }
            if let Some(default) = flag.default.as_ref().map(format_value)
                && !default.is_empty()
            {
                out.push_str(&format!("{prefix}    default: {default}\n"));
            }
        }
        out
    }
}

fn collect_flags(meta: &Meta, prefix: &str, values: Option<&Table>, out: &mut Vec<FlagSpec>) {
    for field in meta.fields {
        let key = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{prefix}.{}", field.name)
        };
        let value = values.and_then(|t| t.get(field.name));
        match &field.kind {
            FieldKind::Leaf { .. } => out.push(FlagSpec {
                name: key.replace('.', "-"),
                key,
                kind: ValueKind::of(value),
                doc: field.doc.iter().map(|s| s.trim().to_string()).collect(),
                default: value.cloned(),
            }),
            FieldKind::Nested { meta: nested, .. } => {
                collect_flags(nested, &key, value.and_then(Value::as_table), out);
            }
        }
    }
}

/// Format a TOML value the way a user would type it on the command line.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Table(_) => value.to_string(),
    }
}
