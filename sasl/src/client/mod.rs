use crate::common::Credentials;
use crate::error::{CryptoError, ErrorKind};
use std::error::Error;
use std::fmt;

/// Why a client mechanism gave up.
#[derive(Debug, PartialEq)]
pub enum MechanismError {
    InvalidState,
    Crypto(CryptoError),

    CannotDecodePassword,

    MissingChallengeParameter(&'static str),

    NoNonce,
    UnsupportedQop,
    NoRspauth,
    InvalidRspauth,

    CannotDecodeChallenge,
    ServerError(String),
    NoServerNonce,
    InvalidServerNonce,
    NoServerSalt,
    CannotDecodeSalt,
    NoServerIterations,
    InvalidIterationCount,

    CannotDecodeSuccessResponse,
    InvalidSignatureInSuccessResponse,
    NoSignatureInSuccessResponse,
}

impl MechanismError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MechanismError::Crypto(_) => ErrorKind::Internal,
            MechanismError::UnsupportedQop => ErrorKind::UnsupportedParameter,
            MechanismError::InvalidRspauth | MechanismError::InvalidSignatureInSuccessResponse => {
                ErrorKind::CryptographicMismatch
            }
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
        write!(
            fmt,
            "{}",
            match self {
                MechanismError::InvalidState => "not in the right state to receive this challenge",
                MechanismError::Crypto(err) => return write!(fmt, "crypto error: {}", err),

                MechanismError::CannotDecodePassword => "can't decode the password as base64",

                MechanismError::MissingChallengeParameter(name) =>
                    return write!(fmt, "challenge is missing the {} parameter", name),

                MechanismError::NoNonce => "no nonce in challenge",
                MechanismError::UnsupportedQop => "auth isn't an offered quality of protection",
                MechanismError::NoRspauth => "no rspauth in challenge",
                MechanismError::InvalidRspauth => "invalid rspauth in challenge",

                MechanismError::CannotDecodeChallenge => "can't decode challenge",
                MechanismError::ServerError(err) => return write!(fmt, "server error: {}", err),
                MechanismError::NoServerNonce => "no server nonce",
                MechanismError::InvalidServerNonce =>
                    "server nonce doesn't start with the client nonce",
                MechanismError::NoServerSalt => "no server salt",
                MechanismError::CannotDecodeSalt => "can't decode server salt",
                MechanismError::NoServerIterations => "no server iterations",
                MechanismError::InvalidIterationCount => "invalid server iteration count",

                MechanismError::CannotDecodeSuccessResponse => "can't decode success response",
                MechanismError::InvalidSignatureInSuccessResponse =>
                    "invalid signature in success response",
                MechanismError::NoSignatureInSuccessResponse => "no signature in success response",
            }
        )
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

/// What a client mechanism wants sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Send this payload, the mechanism expects another challenge.
    Continue(Vec<u8>),
    /// Send this payload, the mechanism has completed its side of the exchange.
    Complete(Vec<u8>),
}

impl Response {
    /// The payload to send.
    pub fn data(&self) -> &[u8] {
        match self {
            Response::Continue(data) | Response::Complete(data) => data,
        }
    }

    /// Consumes the response and returns its payload.
    pub fn into_data(self) -> Vec<u8> {
        match self {
            Response::Continue(data) | Response::Complete(data) => data,
        }
    }

    /// Whether the mechanism expects more rounds.
    pub fn continues(&self) -> bool {
        matches!(self, Response::Continue(_))
    }
}

/// A trait which defines SASL mechanisms.
pub trait Mechanism {
    /// The name of the mechanism.
    fn name(&self) -> &str;

    /// Creates this mechanism from `Credentials`.
    fn from_credentials(credentials: Credentials) -> Self
    where
        Self: Sized;

    /// Creates a response to the SASL challenge.
    ///
    /// The first call gets the (usually empty) initial challenge. Any error is final, as is
    /// [`Response::Complete`]: calling this method again afterwards fails with
    /// [`MechanismError::InvalidState`].
    fn respond(&mut self, challenge: &[u8]) -> Result<Response, MechanismError>;
}

pub mod mechanisms;
