//! Hash functions, HMAC, PBKDF2 and nonce generation used by the mechanisms.

use base64::{engine::general_purpose::STANDARD as Base64, Engine};
use getrandom::getrandom;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// The hash functions needed by the supported mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// MD5, used by DIGEST-MD5.
    Md5,
    /// SHA-1, used by SCRAM-SHA-1.
    Sha1,
    /// SHA-256, used by SCRAM-SHA-256.
    Sha256,
}

impl Algorithm {
    /// Size in bytes of a digest produced by this algorithm.
    pub fn output_len(self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha256 => 32,
        }
    }
}

/// Hashes `data` with the given algorithm.
pub fn digest(algorithm: Algorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        Algorithm::Md5 => Md5::digest(data).to_vec(),
        Algorithm::Sha1 => Sha1::digest(data).to_vec(),
        Algorithm::Sha256 => Sha256::digest(data).to_vec(),
    }
}

/// Computes the HMAC of `data` keyed by `key`.
pub fn hmac(algorithm: Algorithm, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    macro_rules! mac {
        ($hash:ty) => {{
            let mut mac = <Hmac<$hash> as Mac>::new_from_slice(key)?;
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }};
    }
    Ok(match algorithm {
        Algorithm::Md5 => mac!(Md5),
        Algorithm::Sha1 => mac!(Sha1),
        Algorithm::Sha256 => mac!(Sha256),
    })
}

/// Derives `output_len` bytes from `password` and `salt` using PBKDF2 with HMAC as the
/// pseudo-random function.
///
/// Each block `T_i` is the XOR of `U_1 = HMAC(password, salt || be32(i))` and the
/// `iterations - 1` following `U_j = HMAC(password, U_{j-1})`; blocks are concatenated and
/// the result is truncated to `output_len`. Callers must reject an iteration count of zero
/// themselves.
pub fn pbkdf2(
    algorithm: Algorithm,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    output_len: usize,
) -> Result<Vec<u8>, CryptoError> {
    let mut result = vec![0; output_len];
    match algorithm {
        Algorithm::Md5 => pbkdf2::pbkdf2::<Hmac<Md5>>(password, salt, iterations, &mut result)?,
        Algorithm::Sha1 => pbkdf2::pbkdf2::<Hmac<Sha1>>(password, salt, iterations, &mut result)?,
        Algorithm::Sha256 => {
            pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iterations, &mut result)?
        }
    }
    Ok(result)
}

/// Generates a nonce from 32 random bytes.
///
/// The bytes are base64-encoded so that the nonce never contains the `,` or `=` delimiters
/// of the messages it ends up in.
pub fn generate_nonce() -> Result<String, CryptoError> {
    let mut data = [0u8; 32];
    getrandom(&mut data)?;
    Ok(Base64.encode(data))
}

/// A source of nonces for the mechanisms which need one.
///
/// Mechanisms use [`OsNonce`] unless another source is injected, which is mostly useful to
/// get deterministic exchanges in tests.
pub trait NonceSource: Send {
    /// Returns a fresh nonce, suitable to be embedded as-is in a SASL message.
    fn nonce(&mut self) -> Result<String, CryptoError>;
}

/// The default [`NonceSource`], backed by the operating system’s random number generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsNonce;

impl NonceSource for OsNonce {
    fn nonce(&mut self) -> Result<String, CryptoError> {
        generate_nonce()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digests() {
        assert_eq!(
            hex::encode(digest(Algorithm::Md5, b"")),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            hex::encode(&digest(Algorithm::Sha1, b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hex::encode(&digest(Algorithm::Sha256, b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        for algorithm in [Algorithm::Md5, Algorithm::Sha1, Algorithm::Sha256] {
            assert_eq!(digest(algorithm, b"abc").len(), algorithm.output_len());
        }
    }

    #[test]
    fn hmacs() {
        let data = b"The quick brown fox jumps over the lazy dog";
        assert_eq!(
            hex::encode(&hmac(Algorithm::Md5, b"key", data).unwrap()),
            "80070713463e7749b90c2dc24911e275"
        );
        assert_eq!(
            hex::encode(&hmac(Algorithm::Sha1, b"key", data).unwrap()),
            "de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9"
        );
        assert_eq!(
            hex::encode(&hmac(Algorithm::Sha256, b"key", data).unwrap()),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn pbkdf2_sha1_vectors() {
        // Source: RFC 6070
        let key = pbkdf2(Algorithm::Sha1, b"password", b"salt", 1, 20).unwrap();
        assert_eq!(hex::encode(&key), "0c60c80f961f0e71f3a9b524af6012062fe037a6");
        let key = pbkdf2(Algorithm::Sha1, b"password", b"salt", 2, 20).unwrap();
        assert_eq!(hex::encode(&key), "ea6c014dc72d6f8ccd1ed92ace1d41f0d8de8957");
        let key = pbkdf2(
            Algorithm::Sha1,
            b"passwordPASSWORDpassword",
            b"saltSALTsaltSALTsaltSALTsaltSALTsalt",
            4096,
            25,
        )
        .unwrap();
        assert_eq!(
            hex::encode(&key),
            "3d2eec4fe41c849b80c8d83662c0e44a8b291a964cf2f07038"
        );
    }

    #[test]
    fn pbkdf2_sha256() {
        let key = pbkdf2(Algorithm::Sha256, b"password", b"salt", 1, 32).unwrap();
        assert_eq!(
            hex::encode(&key),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
    }

    #[test]
    fn nonces_are_base64() {
        let nonce = generate_nonce().unwrap();
        assert_eq!(nonce.len(), 44);
        assert!(!nonce.contains(','));
        assert_eq!(Base64.decode(&nonce).unwrap().len(), 32);
        assert_ne!(OsNonce.nonce().unwrap(), nonce);
    }
}
