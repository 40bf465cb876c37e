//! Provides the SASL "PLAIN" mechanism.

use crate::client::{Mechanism, MechanismError, Response};
use crate::common::Credentials;

/// A struct for the SASL PLAIN mechanism.
pub struct Plain {
    username: String,
    password: String,
    done: bool,
}

impl Plain {
    /// Constructs a new struct for authenticating using the SASL PLAIN mechanism.
    ///
    /// It is recommended that instead you use a `Credentials` struct and turn it into the
    /// requested mechanism using `from_credentials`.
    pub fn new<N: Into<String>, P: Into<String>>(username: N, password: P) -> Plain {
        Plain {
            username: username.into(),
            password: password.into(),
            done: false,
        }
    }
}

/// `\0username\0password`, shared with X-OAUTH2.
pub(crate) fn plain_message(username: &str, password: &str) -> Vec<u8> {
    let mut auth = Vec::with_capacity(username.len() + password.len() + 2);
    auth.push(0);
    auth.extend(username.bytes());
    auth.push(0);
    auth.extend(password.bytes());
    auth
}

impl Mechanism for Plain {
    fn name(&self) -> &str {
        "PLAIN"
    }

    fn from_credentials(credentials: Credentials) -> Plain {
        Plain::new(credentials.username, credentials.password)
    }

    fn respond(&mut self, _challenge: &[u8]) -> Result<Response, MechanismError> {
        if self.done {
            return Err(MechanismError::InvalidState);
        }
        self.done = true;
        Ok(Response::Complete(plain_message(
            &self.username,
            &self.password,
        )))
    }
}
