use hmac::digest::InvalidLength;
use std::error::Error as StdError;
use std::fmt;

/// An error raised by one of the cryptographic primitives in [`crate::common::crypto`].
#[derive(Debug, PartialEq)]
pub enum CryptoError {
    /// The operating system failed to provide random data.
    RandomFailure(getrandom::Error),
    /// A MAC key of an unusable length was provided.
    InvalidKeyLength(InvalidLength),
}

impl From<getrandom::Error> for CryptoError {
    fn from(err: getrandom::Error) -> CryptoError {
        CryptoError::RandomFailure(err)
    }
}

impl From<InvalidLength> for CryptoError {
    fn from(err: InvalidLength) -> CryptoError {
        CryptoError::InvalidKeyLength(err)
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CryptoError::RandomFailure(err) => write!(fmt, "failure to get random data: {}", err),
            CryptoError::InvalidKeyLength(err) => write!(fmt, "invalid key length: {}", err),
        }
    }
}

impl StdError for CryptoError {}

/// Coarse classification of mechanism failures.
///
/// Every failure is terminal for the mechanism instance which produced it, the kind only
/// tells the caller what to log; the remote peer should never learn more than a generic
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing attribute, wrong field count, or a step invoked out of order.
    ProtocolViolation,
    /// A digest, proof or signature did not verify.
    CryptographicMismatch,
    /// The peer asked for something this mechanism can’t do, like an unknown qop.
    UnsupportedParameter,
    /// Something went wrong locally, like the random number generator.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match self {
            ErrorKind::ProtocolViolation => "protocol violation",
            ErrorKind::CryptographicMismatch => "cryptographic mismatch",
            ErrorKind::UnsupportedParameter => "unsupported parameter",
            ErrorKind::Internal => "internal error",
        })
    }
}
