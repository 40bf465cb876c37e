use crate::common::crypto::{self, Algorithm};
use crate::error::CryptoError;

/// A trait which defines the needed methods for SCRAM.
pub trait ScramProvider {
    /// The name of the hash function.
    fn name() -> &'static str;

    /// The underlying hash function.
    fn algorithm() -> Algorithm;

    /// A function which hashes the data using the hash function.
    fn hash(data: &[u8]) -> Vec<u8> {
        crypto::digest(Self::algorithm(), data)
    }

    /// A function which performs an HMAC using the hash function.
    fn hmac(data: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        crypto::hmac(Self::algorithm(), key, data)
    }

    /// A function which does PBKDF2 key derivation using the hash function, producing
    /// exactly one digest worth of output.
    fn derive(password: &[u8], salt: &[u8], iterations: u32) -> Result<Vec<u8>, CryptoError> {
        let algorithm = Self::algorithm();
        crypto::pbkdf2(algorithm, password, salt, iterations, algorithm.output_len())
    }
}

/// A `ScramProvider` which provides SCRAM-SHA-1.
pub struct Sha1;

impl ScramProvider for Sha1 {
    fn name() -> &'static str {
        "SHA-1"
    }

    fn algorithm() -> Algorithm {
        Algorithm::Sha1
    }
}

/// A `ScramProvider` which provides SCRAM-SHA-256.
pub struct Sha256;

impl ScramProvider for Sha256 {
    fn name() -> &'static str {
        "SHA-256"
    }

    fn algorithm() -> Algorithm {
        Algorithm::Sha256
    }
}

/// Escapes a username into a `saslname`, so that it can’t be mistaken for an attribute
/// separator.
pub fn escape_saslname(name: &str) -> String {
    name.replace('=', "=3D").replace(',', "=2C")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saslname() {
        assert_eq!(escape_saslname("user"), "user");
        assert_eq!(escape_saslname("a,b=c"), "a=2Cb=3Dc");
        assert_eq!(escape_saslname("=2C"), "=3D2C");
    }

    #[test]
    fn derive_has_digest_length() {
        assert_eq!(Sha1::derive(b"pencil", b"salt", 2).unwrap().len(), 20);
        assert_eq!(Sha256::derive(b"pencil", b"salt", 2).unwrap().len(), 32);
        assert_eq!(Sha1::hash(b"abc").len(), 20);
    }
}
