//! Types and codecs shared by the client and server sides.

use std::collections::HashMap;
use std::fmt;
use std::string::FromUtf8Error;

pub mod crypto;
pub mod digest_md5;
pub mod scram;

/// A struct containing SASL credentials.
///
/// Client mechanisms read whatever they need from it, server mechanisms fill in the
/// username claimed by the client and expect the caller to provide the matching password
/// or password digest.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// The authentication identity.
    pub username: String,
    /// The plaintext password, or the OAuth token for the vendor mechanisms.
    pub password: String,
    /// A precomputed DIGEST-MD5 secret, `MD5(username:realm:password)`, usable by the
    /// server side instead of the plaintext password.
    pub password_digest: Vec<u8>,
    /// The host being authenticated against, used for the DIGEST-MD5 digest-uri.
    pub host: String,
    /// The service type, e.g. `xmpp`.
    pub service_type: String,
    /// The realm advertised by the server side of DIGEST-MD5.
    pub realm: String,
}

impl Credentials {
    /// Creates a new Credentials with the specified username.
    pub fn with_username<N: Into<String>>(mut self, username: N) -> Credentials {
        self.username = username.into();
        self
    }

    /// Creates a new Credentials with the specified plaintext password.
    pub fn with_password<P: Into<String>>(mut self, password: P) -> Credentials {
        self.password = password.into();
        self
    }

    /// Creates a new Credentials with the specified DIGEST-MD5 password digest.
    pub fn with_password_digest<D: Into<Vec<u8>>>(mut self, digest: D) -> Credentials {
        self.password_digest = digest.into();
        self
    }

    /// Creates a new Credentials with the specified host.
    pub fn with_host<H: Into<String>>(mut self, host: H) -> Credentials {
        self.host = host.into();
        self
    }

    /// Creates a new Credentials with the specified service type.
    pub fn with_service_type<S: Into<String>>(mut self, service_type: S) -> Credentials {
        self.service_type = service_type.into();
        self
    }

    /// Creates a new Credentials with the specified realm.
    pub fn with_realm<R: Into<String>>(mut self, realm: R) -> Credentials {
        self.realm = realm.into();
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("host", &self.host)
            .field("service_type", &self.service_type)
            .field("realm", &self.realm)
            .finish_non_exhaustive()
    }
}

#[doc(hidden)]
pub fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(a, b)| a ^ b).collect()
}

/// Parses a GS2/SCRAM message, a comma-separated list of `k=value` attributes with a
/// single-character key.
///
/// Entries which don’t have this shape are ignored, the mechanisms then fail on whatever
/// required attribute is missing.
#[doc(hidden)]
pub fn parse_frame(frame: &[u8]) -> Result<HashMap<char, String>, FromUtf8Error> {
    let inner = String::from_utf8(frame.to_owned())?;
    let mut ret = HashMap::new();
    for s in inner.split(',') {
        let mut chars = s.chars();
        if let (Some(key), Some('=')) = (chars.next(), chars.next()) {
            ret.insert(key, chars.as_str().to_owned());
        }
    }
    Ok(ret)
}

/// Serializes attributes in the given order, as the inverse of [`parse_frame`].
#[doc(hidden)]
pub fn serialize_frame(attributes: &[(char, &[u8])]) -> Vec<u8> {
    let mut ret = Vec::new();
    for (key, value) in attributes {
        if !ret.is_empty() {
            ret.push(b',');
        }
        let mut buf = [0u8; 4];
        ret.extend(key.encode_utf8(&mut buf).bytes());
        ret.push(b'=');
        ret.extend_from_slice(value);
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_works() {
        assert_eq!(
            xor(
                &[135, 94, 53, 134, 73, 233, 140, 221, 150, 12, 96, 111, 54, 66, 11, 76],
                &[163, 9, 122, 180, 107, 44, 22, 252, 248, 134, 112, 82, 84, 122, 56, 209]
            ),
            &[36, 87, 79, 50, 34, 197, 154, 33, 110, 138, 16, 61, 98, 56, 51, 157]
        );
    }

    #[test]
    fn parse_server_first_message() {
        let frame = parse_frame(b"r=fyko+d2lbbFgONRv9qkxdawL3rfcNHYJY1ZVvWVs7j,s=QSXCR+Q6sek8bf92,i=4096")
            .unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame[&'r'], "fyko+d2lbbFgONRv9qkxdawL3rfcNHYJY1ZVvWVs7j");
        assert_eq!(frame[&'s'], "QSXCR+Q6sek8bf92");
        assert_eq!(frame[&'i'], "4096");
    }

    #[test]
    fn parse_frame_keeps_equals_in_values() {
        let frame = parse_frame(b"v=rmF9pqV8S7suAoZWja4dJRkFsKQ=").unwrap();
        assert_eq!(frame[&'v'], "rmF9pqV8S7suAoZWja4dJRkFsKQ=");
    }

    #[test]
    fn parse_frame_ignores_malformed_entries() {
        let frame = parse_frame(b"n,,nonce=abc,r=").unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[&'r'], "");
        assert!(parse_frame(b"r=\xff").is_err());
    }

    #[test]
    fn serialize_frame_keeps_order() {
        let frame = serialize_frame(&[('c', b"biws"), ('r', b"abc"), ('p', b"xyz=")]);
        assert_eq!(frame, b"c=biws,r=abc,p=xyz=");
        let parsed = parse_frame(&frame).unwrap();
        assert_eq!(parsed[&'p'], "xyz=");
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let creds = Credentials::default()
            .with_username("user")
            .with_password("pencil")
            .with_password_digest(vec![1, 2, 3]);
        let debug = format!("{:?}", creds);
        assert!(debug.contains("user"));
        assert!(!debug.contains("pencil"));
    }
}
