//! Error types, one enum per channel.
//!
//! A resolution reports up to three independent errors: [`ActionError`] for
//! action selection, [`FileError`] for the config file layer and [`ArgError`]
//! for the command-line layer. They are never merged; the caller decides
//! which ones are fatal. [`SetupError`] covers mistakes made while building
//! resolvers and registries, and [`CodecError`] covers writing a config back
//! out.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Action selection failed. Only an [`ActionRegistry`](crate::ActionRegistry)
/// produces these.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("empty argument list")]
    EmptyArgs,

    #[error("no action defined")]
    NoActions,

    #[error("{0} is not a valid action, use -? for list of actions")]
    UnknownAction(String),

    #[error("action '{action}' holds a {actual}, not a {expected}")]
    ConfigType {
        action: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// The config file layer failed. Resolution still applies the arguments.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode {path} as TOML: {source}")]
    Decode {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unknown keys in {path}: {}", join_keys(.keys))]
    UnknownKeys { path: PathBuf, keys: Vec<UnknownKey> },

    #[error("Config file {path} does not fit the configuration: {source}")]
    Apply { path: PathBuf, source: LayerError },
}

/// A key found in a config file that the configuration type does not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey {
    /// Dotted key path, e.g. `employer.typo`.
    pub key: String,
    /// 1-indexed line, or 0 when the key could not be located.
    pub line: usize,
}

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (line {})", self.key, self.line)
    }
}

fn join_keys(keys: &[UnknownKey]) -> String {
    keys.iter()
        .map(UnknownKey::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The command-line layer failed. None of the argument values were applied.
#[derive(Debug, Error)]
pub enum ArgError {
    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("invalid value \"{value}\" for flag -{flag}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },

    /// A help token (`-?`, `-h`, `-help`) was passed. Callers usually print
    /// the usage text and exit successfully.
    #[error("help requested")]
    HelpRequested,

    #[error("argument values do not fit the configuration: {0}")]
    Apply(#[source] LayerError),
}

/// Overlaying a table onto a typed configuration failed.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Deserialize(#[from] toml::de::Error),
}

/// A resolver or registry could not be built.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Action name must not be empty")]
    EmptyActionName,

    #[error("Invalid action name '{0}': names cannot contain whitespace or start with '-'")]
    InvalidActionName(String),

    #[error("Action '{0}' is already registered")]
    DuplicateAction(String),

    #[error("Configuration defaults cannot be used as a flag schema: {0}")]
    Schema(#[source] LayerError),

    #[error("Failed to load compiled defaults: {0}")]
    Defaults(#[from] confique::Error),
}

/// Writing a configuration out failed.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to encode configuration as TOML: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Failed to encode configuration as TOML: {0}")]
    Layer(#[from] LayerError),

    #[error("Failed to parse existing document {path}: {source}")]
    Document {
        path: PathBuf,
        source: toml_edit::TomlError,
    },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
