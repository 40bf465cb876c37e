//! Provides the SASL "DIGEST-MD5" mechanism.

use std::mem;
use subtle::ConstantTimeEq;

use crate::client::{Mechanism, MechanismError, Response};
use crate::common::crypto::{NonceSource, OsNonce};
use crate::common::digest_md5::{
    calculate_digest, parse_message, secret, serialize_message, trim, AttributeMap,
};
use crate::common::Credentials;

/// Only a single response is ever sent for a given nonce.
const NONCE_COUNT: &[u8] = b"00000001";

enum DigestMd5State {
    Init,
    SentInitialMessage,
    SentResponse {
        secret: Vec<u8>,
        nonce: Vec<u8>,
        cnonce: Vec<u8>,
    },
    Done,
}

/// A struct for the SASL DIGEST-MD5 mechanism, with quality of protection `auth` only.
pub struct DigestMd5 {
    username: String,
    password: String,
    digest_uri: Vec<u8>,
    nonces: Box<dyn NonceSource>,
    state: DigestMd5State,
}

impl DigestMd5 {
    /// Constructs a new struct for authenticating using the SASL DIGEST-MD5 mechanism.
    ///
    /// The digest-uri is built as `service_type/host`, for instance `xmpp/example.org`.
    pub fn new<N, P>(username: N, password: P, service_type: &str, host: &str) -> DigestMd5
    where
        N: Into<String>,
        P: Into<String>,
    {
        DigestMd5 {
            username: username.into(),
            password: password.into(),
            digest_uri: format!("{}/{}", service_type, host).into_bytes(),
            nonces: Box::new(OsNonce),
            state: DigestMd5State::Init,
        }
    }

    /// Replaces the source of the client nonce.
    pub fn with_nonce_source<S: NonceSource + 'static>(mut self, source: S) -> DigestMd5 {
        self.nonces = Box::new(source);
        self
    }
}

impl Mechanism for DigestMd5 {
    fn name(&self) -> &str {
        "DIGEST-MD5"
    }

    fn from_credentials(credentials: Credentials) -> DigestMd5 {
        DigestMd5::new(
            credentials.username,
            credentials.password,
            &credentials.service_type,
            &credentials.host,
        )
    }

    fn respond(&mut self, challenge: &[u8]) -> Result<Response, MechanismError> {
        match mem::replace(&mut self.state, DigestMd5State::Done) {
            DigestMd5State::Init => {
                self.state = DigestMd5State::SentInitialMessage;
                Ok(Response::Continue(Vec::new()))
            }
            DigestMd5State::SentInitialMessage => {
                let input = parse_message(challenge);
                let nonce = input
                    .get(&b"nonce"[..])
                    .ok_or(MechanismError::NoNonce)?
                    .clone();
                let realm = input.get(&b"realm"[..]).cloned().unwrap_or_default();
                let qops = input.get(&b"qop"[..]).map_or(&b"auth"[..], Vec::as_slice);
                if !qops.split(|&b| b == b',').any(|qop| trim(qop) == b"auth") {
                    return Err(MechanismError::UnsupportedQop);
                }

                let cnonce = self.nonces.nonce()?.into_bytes();
                let secret = secret(
                    self.username.as_bytes(),
                    &realm,
                    self.password.as_bytes(),
                );
                let response = calculate_digest(
                    b"AUTHENTICATE",
                    &self.digest_uri,
                    &secret,
                    &nonce,
                    &cnonce,
                    NONCE_COUNT,
                );

                let mut output = AttributeMap::new();
                output.insert(b"username".to_vec(), self.username.as_bytes().to_vec());
                if !realm.is_empty() {
                    output.insert(b"realm".to_vec(), realm);
                }
                output.insert(b"nonce".to_vec(), nonce.clone());
                output.insert(b"qop".to_vec(), b"auth".to_vec());
                output.insert(b"cnonce".to_vec(), cnonce.clone());
                output.insert(b"nc".to_vec(), NONCE_COUNT.to_vec());
                output.insert(b"digest-uri".to_vec(), self.digest_uri.clone());
                output.insert(b"response".to_vec(), response);
                output.insert(b"charset".to_vec(), b"utf-8".to_vec());

                self.state = DigestMd5State::SentResponse {
                    secret,
                    nonce,
                    cnonce,
                };
                Ok(Response::Continue(serialize_message(&output)))
            }
            DigestMd5State::SentResponse {
                secret,
                nonce,
                cnonce,
            } => {
                let input = parse_message(challenge);
                let rspauth = input
                    .get(&b"rspauth"[..])
                    .ok_or(MechanismError::NoRspauth)?;
                let expected =
                    calculate_digest(b"", &self.digest_uri, &secret, &nonce, &cnonce, NONCE_COUNT);
                if !bool::from(rspauth.as_slice().ct_eq(&expected)) {
                    return Err(MechanismError::InvalidRspauth);
                }
                Ok(Response::Complete(Vec::new()))
            }
            DigestMd5State::Done => Err(MechanismError::InvalidState),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;

    struct FixedNonce(&'static str);

    impl NonceSource for FixedNonce {
        fn nonce(&mut self) -> Result<String, CryptoError> {
            Ok(self.0.to_owned())
        }
    }

    const CNONCE: &str = "AMzVG8Oibf+sVUCPPlWLR8lZQvbbJtJB9vJd+u3c6dw=";
    const CHALLENGE: &[u8] = b"nonce=\"2530347127\",qop=\"auth\",charset=utf-8,algorithm=md5-sess";
    const RESPONSE: &[u8] = b"charset=utf-8,cnonce=\"AMzVG8Oibf+sVUCPPlWLR8lZQvbbJtJB9vJd+u3c6dw=\",digest-uri=\"xmpp/jabber.ru\",nc=00000001,nonce=2530347127,qop=auth,response=a61fbf4320577d74038b71a8546bc7ae,username=qxmpp1";

    fn new_mechanism() -> DigestMd5 {
        let creds = Credentials::default()
            .with_username("qxmpp1")
            .with_password("qxmpp123")
            .with_host("jabber.ru")
            .with_service_type("xmpp");
        DigestMd5::from_credentials(creds).with_nonce_source(FixedNonce(CNONCE))
    }

    #[test]
    fn digest_md5_works() {
        let mut mechanism = new_mechanism();
        assert_eq!(mechanism.name(), "DIGEST-MD5");
        assert_eq!(mechanism.respond(b"").unwrap(), Response::Continue(Vec::new()));
        assert_eq!(
            mechanism.respond(CHALLENGE).unwrap(),
            Response::Continue(RESPONSE.to_vec())
        );
        assert_eq!(
            mechanism
                .respond(b"rspauth=d92bf7f4331700c24799cbab364a14b7")
                .unwrap(),
            Response::Complete(Vec::new())
        );
        assert_eq!(mechanism.respond(b""), Err(MechanismError::InvalidState));
    }

    #[test]
    fn digest_md5_is_deterministic() {
        let mut first = new_mechanism();
        let mut second = new_mechanism();
        first.respond(b"").unwrap();
        second.respond(b"").unwrap();
        assert_eq!(
            first.respond(CHALLENGE).unwrap(),
            second.respond(CHALLENGE).unwrap()
        );
    }

    #[test]
    fn digest_md5_with_realm_and_qop_list() {
        let mut mechanism = new_mechanism();
        mechanism.respond(b"").unwrap();
        let response = mechanism
            .respond(b"realm=\"jabber.ru\",nonce=\"2530347127\",qop=\"auth,auth-int\"")
            .unwrap();
        let output = parse_message(response.data());
        assert_eq!(output[&b"realm"[..]], b"jabber.ru");
        assert_eq!(output[&b"qop"[..]], b"auth");
        let expected_secret = secret(b"qxmpp1", b"jabber.ru", b"qxmpp123");
        assert_eq!(
            output[&b"response"[..]],
            calculate_digest(
                b"AUTHENTICATE",
                b"xmpp/jabber.ru",
                &expected_secret,
                b"2530347127",
                CNONCE.as_bytes(),
                NONCE_COUNT
            )
        );
    }

    #[test]
    fn digest_md5_requires_nonce() {
        let mut mechanism = new_mechanism();
        mechanism.respond(b"").unwrap();
        assert_eq!(
            mechanism.respond(b"qop=\"auth\",charset=utf-8"),
            Err(MechanismError::NoNonce)
        );
        assert_eq!(mechanism.respond(CHALLENGE), Err(MechanismError::InvalidState));
    }

    #[test]
    fn digest_md5_requires_auth_qop() {
        let mut mechanism = new_mechanism();
        mechanism.respond(b"").unwrap();
        let err = mechanism
            .respond(b"nonce=\"2530347127\",qop=\"auth-int,auth-conf\"")
            .unwrap_err();
        assert_eq!(err, MechanismError::UnsupportedQop);
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedParameter);
    }

    #[test]
    fn digest_md5_rejects_bad_rspauth() {
        let mut mechanism = new_mechanism();
        mechanism.respond(b"").unwrap();
        mechanism.respond(CHALLENGE).unwrap();
        assert_eq!(
            mechanism.respond(b"rspauth=00000000000000000000000000000000"),
            Err(MechanismError::InvalidRspauth)
        );

        let mut mechanism = new_mechanism();
        mechanism.respond(b"").unwrap();
        mechanism.respond(CHALLENGE).unwrap();
        assert_eq!(mechanism.respond(b""), Err(MechanismError::NoRspauth));
    }
}
