//! Clap adapter for layerconf.
//!
//! Compiled only with the `clap` Cargo feature (on by default). Layerconf
//! parses its own `-name value` flags, so the adapter's job is to hand clap a
//! slot that swallows everything after your own options untouched:
//!
//! ```ignore
//! #[derive(Parser)]
//! struct Cli {
//!     #[arg(long)]
//!     verbose: bool,
//!     #[command(flatten)]
//!     rest: RawArgs,
//! }
//!
//! let cli = Cli::parse();
//! let resolution = registry.dispatch(cli.rest.into_args());
//! ```
//!
//! If you do not use clap, pass `std::env::args().skip(1)` (or call
//! [`Resolver::read_cmdline`](crate::Resolver::read_cmdline)) instead.

use clap::Args;

/// Every remaining command-line token, hyphenated or not.
#[derive(Debug, Args)]
pub struct RawArgs {
    /// Action name followed by its flags, e.g. `zip -zipf out.zip`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl RawArgs {
    /// The captured tokens, ready for `Resolver::read` or
    /// `ActionRegistry::dispatch`.
    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}
