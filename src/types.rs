use crate::error::{ActionError, ArgError, FileError};

/// Errors collected by one [`Resolver::read`](crate::Resolver::read).
///
/// Both stages always run; either, both or neither may have failed.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub file_error: Option<FileError>,
    pub arg_error: Option<ArgError>,
}

impl ReadOutcome {
    /// `true` when neither the file nor the arguments failed.
    pub fn is_clean(&self) -> bool {
        self.file_error.is_none() && self.arg_error.is_none()
    }
}

/// Errors collected by one [`ActionRegistry::dispatch`](crate::ActionRegistry::dispatch).
#[derive(Debug, Default)]
pub struct Resolution {
    pub action_error: Option<ActionError>,
    pub file_error: Option<FileError>,
    pub arg_error: Option<ArgError>,
    /// The help token was handled and usage was written out.
    pub usage_shown: bool,
}

impl Resolution {
    pub(crate) fn action_failed(error: ActionError) -> Self {
        Self {
            action_error: Some(error),
            ..Self::default()
        }
    }

    pub(crate) fn usage_shown() -> Self {
        Self {
            usage_shown: true,
            ..Self::default()
        }
    }

    /// `true` when no channel reported an error.
    pub fn is_clean(&self) -> bool {
        self.action_error.is_none() && self.file_error.is_none() && self.arg_error.is_none()
    }
}

impl From<ReadOutcome> for Resolution {
    fn from(outcome: ReadOutcome) -> Self {
        Self {
            file_error: outcome.file_error,
            arg_error: outcome.arg_error,
            ..Self::default()
        }
    }
}
