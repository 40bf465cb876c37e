//! Provides the SASL "ANONYMOUS" mechanism.

use crate::client::{Mechanism, MechanismError, Response};
use crate::common::Credentials;

/// A struct for the SASL ANONYMOUS mechanism.
#[derive(Default)]
pub struct Anonymous {
    done: bool,
}

impl Anonymous {
    /// Constructs a new struct for authenticating using the SASL ANONYMOUS mechanism.
    ///
    /// It is recommended that instead you use a `Credentials` struct and turn it into the
    /// requested mechanism using `from_credentials`.
    pub fn new() -> Anonymous {
        Anonymous::default()
    }
}

impl Mechanism for Anonymous {
    fn name(&self) -> &str {
        "ANONYMOUS"
    }

    fn from_credentials(_credentials: Credentials) -> Anonymous {
        Anonymous::new()
    }

    fn respond(&mut self, _challenge: &[u8]) -> Result<Response, MechanismError> {
        if self.done {
            return Err(MechanismError::InvalidState);
        }
        self.done = true;
        Ok(Response::Complete(Vec::new()))
    }
}
