use crate::common::Credentials;
use crate::error::{CryptoError, ErrorKind};
use std::error::Error;
use std::fmt;

/// Why a server mechanism rejected the client.
#[derive(Debug, PartialEq)]
pub enum MechanismError {
    FailedToDecodeMessage,
    ErrorDecodingUsername,
    ErrorDecodingPassword,

    UnsupportedQop,
    MissingAttribute(&'static str),
    InvalidNonce,

    Crypto(CryptoError),
    AuthenticationFailed,
    SaslSessionAlreadyOver,
}

impl MechanismError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MechanismError::UnsupportedQop => ErrorKind::UnsupportedParameter,
            MechanismError::AuthenticationFailed => ErrorKind::CryptographicMismatch,
            MechanismError::Crypto(_) => ErrorKind::Internal,
            _ => ErrorKind::ProtocolViolation,
        }
    }
}

impl From<CryptoError> for MechanismError {
    fn from(err: CryptoError) -> MechanismError {
        MechanismError::Crypto(err)
    }
}

impl fmt::Display for MechanismError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MechanismError::FailedToDecodeMessage => write!(fmt, "failed to decode message"),
            MechanismError::ErrorDecodingUsername => write!(fmt, "error decoding username"),
            MechanismError::ErrorDecodingPassword => write!(fmt, "error decoding password"),

            MechanismError::UnsupportedQop => write!(fmt, "quality of protection isn’t auth"),
            MechanismError::MissingAttribute(name) => write!(fmt, "no {} in response", name),
            MechanismError::InvalidNonce => write!(fmt, "nonce doesn’t match the challenge"),

            MechanismError::Crypto(err) => write!(fmt, "crypto error: {}", err),
            MechanismError::AuthenticationFailed => write!(fmt, "authentication failed"),
            MechanismError::SaslSessionAlreadyOver => write!(fmt, "SASL session already over"),
        }
    }
}

impl Error for MechanismError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MechanismError::Crypto(err) => Some(err),
            _ => None,
        }
    }
}

/// A trait which defines server-side SASL mechanisms.
pub trait Mechanism {
    /// The name of the mechanism.
    fn name(&self) -> &str;

    /// Creates this mechanism from `Credentials`, usually only carrying the realm at this
    /// point.
    fn from_credentials(credentials: Credentials) -> Self
    where
        Self: Sized;

    /// Processes the client’s payload.
    ///
    /// Any error is final, as is [`Response::Success`]. [`Response::InputNeeded`] is not:
    /// see the documentation of each mechanism for how to continue.
    fn respond(&mut self, payload: &[u8]) -> Result<Response, MechanismError>;

    /// The credentials known so far, including what the client claimed.
    fn credentials(&self) -> &Credentials;

    /// Mutable access to the credentials, to provide the password of the claimed username.
    fn credentials_mut(&mut self) -> &mut Credentials;
}

/// What a server mechanism wants done next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Send this challenge and wait for the client’s response.
    Challenge(Vec<u8>),
    /// The client is authenticated; send this payload along with the success.
    Success(Vec<u8>),
    /// The mechanism needs credentials it doesn’t know about, typically the password of the
    /// username now in [`Mechanism::credentials`].
    InputNeeded,
}

pub mod mechanisms;
