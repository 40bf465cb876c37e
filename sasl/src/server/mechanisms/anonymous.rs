use crate::common::Credentials;
use crate::server::{Mechanism, MechanismError, Response};

/// Server side of the SASL ANONYMOUS mechanism.
#[derive(Default)]
pub struct Anonymous {
    credentials: Credentials,
    done: bool,
}

impl Anonymous {
    pub fn new() -> Anonymous {
        Anonymous::default()
    }
}

impl Mechanism for Anonymous {
    fn name(&self) -> &str {
        "ANONYMOUS"
    }

    fn from_credentials(credentials: Credentials) -> Anonymous {
        Anonymous {
            credentials,
            done: false,
        }
    }

    fn respond(&mut self, payload: &[u8]) -> Result<Response, MechanismError> {
        if self.done {
            return Err(MechanismError::SaslSessionAlreadyOver);
        }
        self.done = true;
        if !payload.is_empty() {
            log::debug!(
                "Anonymous login with trace {:?}",
                String::from_utf8_lossy(payload)
            );
        }
        Ok(Response::Success(Vec::new()))
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn credentials_mut(&mut self) -> &mut Credentials {
        &mut self.credentials
    }
}
