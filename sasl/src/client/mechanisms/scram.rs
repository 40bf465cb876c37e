//! Provides the SASL "SCRAM-*" mechanisms and a way to implement more.

use base64::{engine::general_purpose::STANDARD as Base64, Engine};
use std::marker::PhantomData;
use std::mem;
use subtle::ConstantTimeEq;

use crate::client::{Mechanism, MechanismError, Response};
use crate::common::crypto::{NonceSource, OsNonce};
use crate::common::scram::{escape_saslname, ScramProvider};
use crate::common::{parse_frame, serialize_frame, xor, Credentials};

/// No channel binding and no authorization identity.
const GS2_HEADER: &[u8] = b"n,,";

/// Highest iteration count a server may ask for, so that it can’t keep the client busy
/// deriving keys for minutes.
const MAX_ITERATIONS: u32 = 1_000_000;

enum ScramState {
    Init,
    SentInitialMessage {
        initial_message: Vec<u8>,
        client_nonce: String,
    },
    GotServerData {
        server_signature: Vec<u8>,
    },
    Done,
}

/// A struct for the SASL SCRAM-* mechanisms.
pub struct Scram<S: ScramProvider> {
    name: String,
    username: String,
    password: String,
    nonces: Box<dyn NonceSource>,
    state: ScramState,
    _marker: PhantomData<S>,
}

impl<S: ScramProvider> Scram<S> {
    /// Constructs a new struct for authenticating using the SASL SCRAM-* mechanisms.
    ///
    /// It is recommended that instead you use a `Credentials` struct and turn it into the
    /// requested mechanism using `from_credentials`.
    pub fn new<N: Into<String>, P: Into<String>>(username: N, password: P) -> Scram<S> {
        Scram {
            name: format!("SCRAM-{}", S::name()),
            username: username.into(),
            password: password.into(),
            nonces: Box::new(OsNonce),
            state: ScramState::Init,
            _marker: PhantomData,
        }
    }

    /// Replaces the source of the client nonce.
    pub fn with_nonce_source<N: NonceSource + 'static>(mut self, source: N) -> Scram<S> {
        self.nonces = Box::new(source);
        self
    }
}

impl<S: ScramProvider> Mechanism for Scram<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_credentials(credentials: Credentials) -> Scram<S> {
        Scram::new(credentials.username, credentials.password)
    }

    fn respond(&mut self, challenge: &[u8]) -> Result<Response, MechanismError> {
        match mem::replace(&mut self.state, ScramState::Done) {
            ScramState::Init => {
                let client_nonce = self.nonces.nonce()?;
                // TODO: SASLprep the username and password.
                let username = escape_saslname(&self.username);
                let bare = serialize_frame(&[
                    ('n', username.as_bytes()),
                    ('r', client_nonce.as_bytes()),
                ]);
                let mut data = Vec::new();
                data.extend(GS2_HEADER);
                data.extend(&bare);
                self.state = ScramState::SentInitialMessage {
                    initial_message: bare,
                    client_nonce,
                };
                Ok(Response::Continue(data))
            }
            ScramState::SentInitialMessage {
                initial_message,
                client_nonce,
            } => {
                let frame =
                    parse_frame(challenge).map_err(|_| MechanismError::CannotDecodeChallenge)?;
                if let Some(err) = frame.get(&'e') {
                    return Err(MechanismError::ServerError(err.clone()));
                }
                let server_nonce = frame.get(&'r').ok_or(MechanismError::NoServerNonce)?;
                if !server_nonce.starts_with(&client_nonce) {
                    return Err(MechanismError::InvalidServerNonce);
                }
                let salt = frame.get(&'s').ok_or(MechanismError::NoServerSalt)?;
                let salt = Base64
                    .decode(salt)
                    .map_err(|_| MechanismError::CannotDecodeSalt)?;
                if salt.is_empty() {
                    return Err(MechanismError::NoServerSalt);
                }
                let iterations: u32 = frame
                    .get(&'i')
                    .ok_or(MechanismError::NoServerIterations)?
                    .parse()
                    .map_err(|_| MechanismError::InvalidIterationCount)?;
                if !(1..=MAX_ITERATIONS).contains(&iterations) {
                    return Err(MechanismError::InvalidIterationCount);
                }

                let cb_data = Base64.encode(GS2_HEADER);
                let client_final_message_bare = serialize_frame(&[
                    ('c', cb_data.as_bytes()),
                    ('r', server_nonce.as_bytes()),
                ]);
                let salted_password = S::derive(self.password.as_bytes(), &salt, iterations)?;
                let client_key = S::hmac(b"Client Key", &salted_password)?;
                let server_key = S::hmac(b"Server Key", &salted_password)?;
                let mut auth_message = Vec::new();
                auth_message.extend(&initial_message);
                auth_message.push(b',');
                auth_message.extend(challenge);
                auth_message.push(b',');
                auth_message.extend(&client_final_message_bare);
                let stored_key = S::hash(&client_key);
                let client_signature = S::hmac(&auth_message, &stored_key)?;
                let client_proof = xor(&client_key, &client_signature);
                let server_signature = S::hmac(&auth_message, &server_key)?;
                let mut client_final_message = Vec::new();
                client_final_message.extend(&client_final_message_bare);
                client_final_message.extend(b",p=");
                client_final_message.extend(Base64.encode(&client_proof).bytes());
                self.state = ScramState::GotServerData { server_signature };
                Ok(Response::Continue(client_final_message))
            }
            ScramState::GotServerData { server_signature } => {
                let frame = parse_frame(challenge)
                    .map_err(|_| MechanismError::CannotDecodeSuccessResponse)?;
                if let Some(err) = frame.get(&'e') {
                    return Err(MechanismError::ServerError(err.clone()));
                }
                let sig = frame
                    .get(&'v')
                    .and_then(|v| Base64.decode(v).ok())
                    .ok_or(MechanismError::NoSignatureInSuccessResponse)?;
                if !bool::from(sig.ct_eq(&server_signature)) {
                    return Err(MechanismError::InvalidSignatureInSuccessResponse);
                }
                Ok(Response::Complete(Vec::new()))
            }
            ScramState::Done => Err(MechanismError::InvalidState),
        }
    }
}
