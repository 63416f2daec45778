//! Action registry: route a command line to one of several resolvers.
//!
//! ```text
//! myzip zip  -folder src -zipf out.zip
//!       ^^^  ^^^^^^^^^^^^^^^^^^^^^^^^^^  handed to the "zip" resolver
//!       action name
//! ```
//!
//! With a single registered action the name is implicit and the whole
//! argument list goes to its resolver.

use std::any::Any;
use std::fmt;
use std::io::{self, Write};

use confique::Config;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ActionError, ArgError, SetupError};
use crate::resolver::Resolver;
use crate::types::{ReadOutcome, Resolution};

/// Token that lists the registered actions and their flags.
pub const HELP_TOKEN: &str = "-?";

/// Object-safe view of a [`Resolver`], so resolvers of different
/// configuration types can share one registry.
pub trait ActionResolver {
    fn read_args(&mut self, args: Vec<String>) -> ReadOutcome;
    fn usage(&self, prefix: &str) -> String;
    fn config_any(&self) -> &dyn Any;
    fn config_type_name(&self) -> &'static str;
}

impl<C> ActionResolver for Resolver<C>
where
    C: Config + Serialize + DeserializeOwned + 'static,
    C::Layer: DeserializeOwned,
{
    fn read_args(&mut self, args: Vec<String>) -> ReadOutcome {
        self.read(args)
    }

    fn usage(&self, prefix: &str) -> String {
        self.usage_text(prefix)
    }

    fn config_any(&self) -> &dyn Any {
        self.config()
    }

    fn config_type_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }
}

struct Action {
    name: String,
    resolver: Box<dyn ActionResolver>,
}

/// Builder for an [`ActionRegistry`]. Registration order is kept and is the
/// order actions appear in usage.
#[derive(Default)]
pub struct ActionRegistryBuilder {
    actions: Vec<Action>,
    error: Option<SetupError>,
}

impl ActionRegistryBuilder {
    /// Register `resolver` under `name`. Names are case-sensitive, must be
    /// unique, and cannot contain whitespace or start with `-`.
    pub fn action<C>(mut self, name: &str, resolver: Resolver<C>) -> Self
    where
        C: Config + Serialize + DeserializeOwned + 'static,
        C::Layer: DeserializeOwned,
    {
        if self.error.is_some() {
            return self;
        }
        match self.check_name(name) {
            Ok(()) => self.actions.push(Action {
                name: name.to_string(),
                resolver: Box::new(resolver),
            }),
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Build the registry. Returns the first naming error, if any.
    pub fn build(self) -> Result<ActionRegistry, SetupError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(ActionRegistry {
            actions: self.actions,
            loaded: None,
        })
    }

    fn check_name(&self, name: &str) -> Result<(), SetupError> {
        if name.is_empty() {
            return Err(SetupError::EmptyActionName);
        }
        if name.starts_with('-') || name.chars().any(char::is_whitespace) {
            return Err(SetupError::InvalidActionName(name.to_string()));
        }
        if self.actions.iter().any(|a| a.name == name) {
            return Err(SetupError::DuplicateAction(name.to_string()));
        }
        Ok(())
    }
}

/// Ordered set of named resolvers plus the action picked by the last
/// successful dispatch.
#[derive(Default)]
pub struct ActionRegistry {
    actions: Vec<Action>,
    loaded: Option<usize>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.action_names())
            .field("loaded", &self.loaded_action())
            .finish()
    }
}

impl ActionRegistry {
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::default()
    }

    /// Dispatch `args`, writing usage to stdout on a help request.
    pub fn dispatch<I, S>(&mut self, args: I) -> Resolution
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dispatch_to(args, &mut io::stdout())
    }

    /// [`dispatch`](Self::dispatch) over the process arguments, program name
    /// excluded.
    pub fn dispatch_cmdline(&mut self) -> Resolution {
        self.dispatch(std::env::args().skip(1))
    }

    /// Dispatch `args`, writing usage to `out` on a help request: the full
    /// listing for `-?` in place of the action name, or one action's flags
    /// for a help token among its arguments.
    pub fn dispatch_to<I, S, W>(&mut self, args: I, out: &mut W) -> Resolution
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        W: Write,
    {
        let mut args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.is_empty() {
            return Resolution::action_failed(ActionError::EmptyArgs);
        }

        match self.actions.len() {
            0 => Resolution::action_failed(ActionError::NoActions),
            1 => self.run(0, args, out),
            _ => {
                let token = args.remove(0);
                let token = token.trim();
                if let Some(index) = self.actions.iter().position(|a| a.name == token) {
                    return self.run(index, args, out);
                }
                if token == HELP_TOKEN {
                    write_usage(out, &self.usage_text());
                    return Resolution::usage_shown();
                }
                Resolution::action_failed(ActionError::UnknownAction(token.to_string()))
            }
        }
    }

    /// Name of the action picked by the last successful dispatch, or `""`.
    pub fn loaded_action(&self) -> &str {
        self.loaded.map_or("", |i| self.actions[i].name.as_str())
    }

    /// Configuration of the loaded action as `&dyn Any`.
    pub fn loaded_config_any(&self) -> Option<&dyn Any> {
        self.loaded.map(|i| self.actions[i].resolver.config_any())
    }

    /// Configuration of the loaded action, downcast to `C`.
    ///
    /// `Ok(None)` before any successful dispatch. Asking for the wrong type is
    /// an [`ActionError::ConfigType`].
    pub fn loaded_config<C: 'static>(&self) -> Result<Option<&C>, ActionError> {
        let Some(index) = self.loaded else {
            return Ok(None);
        };
        let action = &self.actions[index];
        match action.resolver.config_any().downcast_ref::<C>() {
            Some(config) => Ok(Some(config)),
            None => Err(ActionError::ConfigType {
                action: action.name.clone(),
                expected: std::any::type_name::<C>(),
                actual: action.resolver.config_type_name(),
            }),
        }
    }

    /// Registered action names, in registration order.
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }

    /// Banner, action list, then each action's flags in registration order.
    pub fn usage_text(&self) -> String {
        let mut out = String::from("Usage: <action> [<parameters...>]\n");
        out.push_str(&format!("Actions: {}\n", self.action_names().join("|")));
        out.push_str("Action specific usage:\n");
        for action in &self.actions {
            out.push_str(&format!("= {}\n", action.name));
            out.push_str(&action.resolver.usage("  "));
            out.push('\n');
        }
        out
    }

    /// Print usage to stdout.
    pub fn print_usage(&self) {
        print!("{}", self.usage_text());
    }

    /// A help token inside the action's arguments prints that action's usage
    /// instead of surfacing as an argument error.
    fn run<W: Write>(&mut self, index: usize, args: Vec<String>, out: &mut W) -> Resolution {
        let action = &mut self.actions[index];
        debug!(action = %action.name, "dispatching");
        let outcome = action.resolver.read_args(args);
        self.loaded = Some(index);

        if matches!(outcome.arg_error, Some(ArgError::HelpRequested)) {
            let usage = format!("Usage:\n{}", self.actions[index].resolver.usage("  "));
            write_usage(out, &usage);
            return Resolution {
                file_error: outcome.file_error,
                ..Resolution::usage_shown()
            };
        }
        outcome.into()
    }
}

fn write_usage<W: Write>(out: &mut W, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()) {
        warn!(error = %e, "failed to write usage");
    }
}
