//! Layered configuration from compiled defaults, a config file and the
//! command line, with optional routing to per-action configurations.
//!
//! Define a struct with confique's `Config` derive, hand its defaults to a
//! [`Resolver`], and read the command line:
//!
//! ```ignore
//! let mut resolver = Resolver::builder(AppConfig::default_values())
//!     .file_path("./app.toml")
//!     .build()?;
//! let outcome = resolver.read_cmdline();
//! if let Some(e) = &outcome.file_error {
//!     eprintln!("ignoring config file: {e}");
//! }
//! if let Some(e) = outcome.arg_error {
//!     return Err(e.into());
//! }
//! let config = resolver.into_config();
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Compiled defaults      values passed to Resolver::builder()
//!        ↑ overridden by
//! Config file            default path, or `-f <path>` on the command line
//!        ↑ overridden by
//! Command-line flags     -name value, -employer-name value
//! ```
//!
//! The file and the flags are both **sparse**: a key they do not mention
//! keeps its value from the layer below.
//!
//! # Three error channels
//!
//! A read never stops halfway. The file layer and the argument layer both
//! run, and each reports its own failure:
//!
//! - [`FileError`]: the file is missing, unreadable, not TOML, carries
//!   unknown keys (strict mode) or holds values of the wrong type. The file is
//!   then skipped as a whole.
//! - [`ArgError`]: an unknown flag, a flag without its value, or a value that
//!   does not convert. No argument is applied.
//! - [`ActionError`]: only from an [`ActionRegistry`], for an empty command
//!   line, no registered actions or an unknown action name.
//!
//! The caller decides which ones are fatal. A broken config file does not
//! stop a command line that sets everything explicitly.
//!
//! # Flags
//!
//! Every leaf field becomes one flag, named by its dotted path with `-` for
//! nesting. Its value kind follows the field's default: strings, integers,
//! floats, booleans, TOML datetimes and comma-separated lists. Boolean flags
//! may be given alone (`-retired`). `--name value` and `-name=value` work
//! too. Parsing stops at `--` or at the first positional token; the rest is
//! available from [`Resolver::trailing_args`]. `-?`, `-h` and `-help`
//! request usage.
//!
//! # Actions
//!
//! Programs with sub-commands register one resolver per action:
//!
//! ```ignore
//! let mut registry = ActionRegistry::builder()
//!     .action("show", Resolver::new(ShowConfig::default_values())?)
//!     .action("zip", Resolver::new(ZipConfig::default_values())?)
//!     .build()?;
//! let resolution = registry.dispatch_cmdline();
//! let zip: Option<&ZipConfig> = registry.loaded_config()?;
//! ```
//!
//! The first token picks the action, `-?` prints every action's flags and
//! `zip -?` prints the flags of `zip` alone. With a single registered action
//! the name is implicit. A bare [`Resolver`] prints nothing: it reports help
//! tokens as [`ArgError::HelpRequested`] and leaves the printing to you.
//!
//! # Strict mode
//!
//! On by default. A config file key that matches no field is a
//! [`FileError::UnknownKeys`] naming each key and its line. Turn it off with
//! [`ResolverBuilder::strict`] to share files between tools.
//!
//! # Reading and writing configs
//!
//! [`Resolver::unmarshal`] applies a TOML buffer the same way a config file
//! is applied. [`Resolver::marshal`] renders the resolved values as TOML,
//! [`Resolver::template`] a commented template from the struct's doc
//! comments, and [`Resolver::save`] writes the values into a file while
//! keeping the comments already in it.

pub mod error;
pub mod schema;
pub mod types;

mod action;
mod binder;
#[cfg(feature = "clap")]
mod cli;
mod codec;
mod file;
mod layer;
mod resolver;
mod validate;

#[cfg(test)]
mod fixtures;

pub use action::{ActionRegistry, ActionRegistryBuilder, ActionResolver, HELP_TOKEN};
#[cfg(feature = "clap")]
pub use cli::RawArgs;
pub use error::{ActionError, ArgError, CodecError, FileError, LayerError, SetupError, UnknownKey};
pub use resolver::{DEFAULT_OVERRIDE_FLAG, Resolver, ResolverBuilder};
pub use schema::{FlagSchema, FlagSpec, ValueKind};
pub use types::{ReadOutcome, Resolution};
