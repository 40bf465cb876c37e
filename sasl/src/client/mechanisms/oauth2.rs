//! Provides the single-step token mechanisms "X-OAUTH2" and "X-MESSENGER-OAUTH2".

use base64::{engine::general_purpose::STANDARD as Base64, Engine};

use crate::client::mechanisms::plain::plain_message;
use crate::client::{Mechanism, MechanismError, Response};
use crate::common::Credentials;

/// A struct for Google’s X-OAUTH2 mechanism, where the password is an OAuth2 access token.
pub struct Google {
    username: String,
    token: String,
    done: bool,
}

impl Google {
    /// Constructs a new struct for authenticating using the X-OAUTH2 mechanism.
    pub fn new<N: Into<String>, T: Into<String>>(username: N, token: T) -> Google {
        Google {
            username: username.into(),
            token: token.into(),
            done: false,
        }
    }
}

impl Mechanism for Google {
    fn name(&self) -> &str {
        "X-OAUTH2"
    }

    fn from_credentials(credentials: Credentials) -> Google {
        Google::new(credentials.username, credentials.password)
    }

    fn respond(&mut self, _challenge: &[u8]) -> Result<Response, MechanismError> {
        if self.done {
            return Err(MechanismError::InvalidState);
        }
        self.done = true;
        Ok(Response::Complete(plain_message(&self.username, &self.token)))
    }
}

/// A struct for the Windows Live X-MESSENGER-OAUTH2 mechanism.
///
/// The password is the base64-encoded access token, which is sent decoded.
pub struct WindowsLive {
    token: String,
    done: bool,
}

impl WindowsLive {
    /// Constructs a new struct for authenticating using the X-MESSENGER-OAUTH2 mechanism.
    pub fn new<T: Into<String>>(token: T) -> WindowsLive {
        WindowsLive {
            token: token.into(),
            done: false,
        }
    }
}

impl Mechanism for WindowsLive {
    fn name(&self) -> &str {
        "X-MESSENGER-OAUTH2"
    }

    fn from_credentials(credentials: Credentials) -> WindowsLive {
        WindowsLive::new(credentials.password)
    }

    fn respond(&mut self, _challenge: &[u8]) -> Result<Response, MechanismError> {
        if self.done {
            return Err(MechanismError::InvalidState);
        }
        self.done = true;
        let token = Base64
            .decode(&self.token)
            .map_err(|_| MechanismError::CannotDecodePassword)?;
        Ok(Response::Complete(token))
    }
}
