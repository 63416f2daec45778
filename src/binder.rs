//! Command-line binding: turn `-name value` tokens into dotted-key overrides.
//!
//! Grammar, per token:
//!
//! - `-name value` or `--name value` sets a field.
//! - `-name=value` carries the value inline.
//! - A boolean flag given alone (`-retired`) means `true`.
//! - `--` ends flag parsing; so does the first token that is not a flag. The
//!   remaining tokens are returned as trailing arguments.
//! - `-?`, `-h` and `-help` request usage unless the schema defines a flag of
//!   that name.
//!
//! Binding is all-or-nothing: the first bad token aborts and nothing is
//! returned for the tokens before it.

use toml::Value;
use toml::value::Datetime;

use crate::error::ArgError;
use crate::schema::{FlagSchema, ValueKind};

const HELP_FLAGS: [&str; 3] = ["?", "h", "help"];

/// Result of binding an argument list against a schema.
#[derive(Debug, Default, PartialEq)]
pub struct Bound {
    /// `(dotted_key, value)` pairs in command-line order.
    pub overrides: Vec<(String, Value)>,
    /// Tokens left after flag parsing stopped.
    pub trailing: Vec<String>,
}

/// Parse `args` against `schema`.
pub fn bind(schema: &FlagSchema, args: &[String]) -> Result<Bound, ArgError> {
    let mut overrides = Vec::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];
        if arg == "--" {
            i += 1;
            break;
        }
        let Some(body) = flag_body(arg) else {
            break;
        };
        i += 1;

        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let Some(spec) = schema.find(name) else {
            if HELP_FLAGS.contains(&name) {
                return Err(ArgError::HelpRequested);
            }
            return Err(ArgError::UnknownFlag(name.to_string()));
        };

        let raw = match inline {
            Some(value) => value.to_string(),
            None if spec.kind == ValueKind::Boolean => "true".to_string(),
            None => {
                let Some(value) = args.get(i) else {
                    return Err(ArgError::MissingValue(name.to_string()));
                };
                i += 1;
                value.clone()
            }
        };

        let value = parse_value(&spec.kind, &raw).map_err(|reason| ArgError::InvalidValue {
            flag: spec.name.clone(),
            value: raw.clone(),
            reason,
        })?;
        overrides.push((spec.key.clone(), value));
    }

    Ok(Bound {
        overrides,
        trailing: args[i..].to_vec(),
    })
}

/// Strip one or two leading dashes. `None` for positional tokens, including a
/// lone `-`.
fn flag_body(arg: &str) -> Option<&str> {
    let body = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-'))?;
    (!body.is_empty()).then_some(body)
}

/// Convert a raw command-line string into a TOML value of the given kind.
pub fn parse_value(kind: &ValueKind, raw: &str) -> Result<Value, String> {
    match kind {
        ValueKind::String => Ok(Value::String(raw.to_string())),
        ValueKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| e.to_string()),
        ValueKind::Float => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| e.to_string()),
        ValueKind::Boolean => parse_bool(raw).map(Value::Boolean),
        ValueKind::Datetime => raw
            .trim()
            .parse::<Datetime>()
            .map(Value::Datetime)
            .map_err(|e| e.to_string()),
        ValueKind::Array(elem) => {
            if raw.trim().is_empty() {
                return Ok(Value::Array(Vec::new()));
            }
            let elem = elem.as_deref().unwrap_or(&ValueKind::Inferred);
            raw.split(',')
                .map(|item| parse_value(elem, item.trim()))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        ValueKind::Table => {
            let doc = format!("value = {raw}");
            let mut table: toml::Table = doc.parse().map_err(|e: toml::de::Error| e.to_string())?;
            table
                .remove("value")
                .ok_or_else(|| "expected an inline table".to_string())
        }
        ValueKind::Inferred => Ok(infer_value(raw)),
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        other => Err(format!("'{other}' is not a boolean")),
    }
}

/// Tries: bool → integer → float → string.
fn infer_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }
    // Require a dot so "nan" and "inf" stay strings.
    if raw.contains('.')
        && let Ok(f) = raw.parse::<f64>()
    {
        return Value::Float(f);
    }
    Value::String(raw.to_string())
}
