use crate::common::Credentials;
use crate::server::{Mechanism, MechanismError, Response};

/// Server side of the SASL PLAIN mechanism.
///
/// This mechanism doesn’t check the password itself: once it returns
/// [`Response::InputNeeded`], the claimed username and password are in
/// [`Mechanism::credentials`] and it is up to the caller to verify them and report success
/// or failure.
pub struct Plain {
    credentials: Credentials,
    authzid: String,
    done: bool,
}

impl Plain {
    pub fn new() -> Plain {
        Plain::from_credentials(Credentials::default())
    }

    /// The authorization identity requested by the client, empty if none.
    pub fn authzid(&self) -> &str {
        &self.authzid
    }
}

impl Default for Plain {
    fn default() -> Plain {
        Plain::new()
    }
}

impl Mechanism for Plain {
    fn name(&self) -> &str {
        "PLAIN"
    }

    fn from_credentials(credentials: Credentials) -> Plain {
        Plain {
            credentials,
            authzid: String::new(),
            done: false,
        }
    }

    fn respond(&mut self, payload: &[u8]) -> Result<Response, MechanismError> {
        if self.done {
            return Err(MechanismError::SaslSessionAlreadyOver);
        }
        if payload.is_empty() {
            // Ask for the initial response the client didn’t send along with its auth.
            return Ok(Response::Challenge(Vec::new()));
        }
        self.done = true;

        let fields: Vec<&[u8]> = payload.split(|&b| b == 0).collect();
        let [authzid, username, password] = fields[..] else {
            return Err(MechanismError::FailedToDecodeMessage);
        };
        let authzid =
            String::from_utf8(authzid.to_vec()).map_err(|_| MechanismError::FailedToDecodeMessage)?;
        let username =
            String::from_utf8(username.to_vec()).map_err(|_| MechanismError::ErrorDecodingUsername)?;
        let password =
            String::from_utf8(password.to_vec()).map_err(|_| MechanismError::ErrorDecodingPassword)?;

        self.authzid = authzid;
        self.credentials.username = username;
        self.credentials.password = password;
        Ok(Response::InputNeeded)
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn credentials_mut(&mut self) -> &mut Credentials {
        &mut self.credentials
    }
}
