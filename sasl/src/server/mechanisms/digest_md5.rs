use std::mem;

use subtle::ConstantTimeEq;

use crate::common::crypto::{NonceSource, OsNonce};
use crate::common::digest_md5::{
    calculate_digest, parse_message, secret, serialize_message, trim, AttributeMap,
};
use crate::common::Credentials;
use crate::server::{Mechanism, MechanismError, Response};

enum DigestMd5State {
    Init,
    SentChallenge { nonce: Vec<u8> },
    SentRspauth,
    Done,
}

/// Server side of the SASL DIGEST-MD5 mechanism, with quality of protection `auth` only.
///
/// When the client’s response arrives and neither a password nor a password digest is known,
/// [`Response::InputNeeded`] is returned with the claimed username in
/// [`Mechanism::credentials`]. Fill in `password` or `password_digest` through
/// [`Mechanism::credentials_mut`] and call [`Mechanism::respond`] again with the same payload.
pub struct DigestMd5 {
    credentials: Credentials,
    nonces: Box<dyn NonceSource>,
    state: DigestMd5State,
}

impl DigestMd5 {
    pub fn new() -> DigestMd5 {
        DigestMd5::from_credentials(Credentials::default())
    }

    /// Replaces the source of the server nonce.
    pub fn with_nonce_source<S: NonceSource + 'static>(mut self, source: S) -> DigestMd5 {
        self.nonces = Box::new(source);
        self
    }

    fn verify(&self, input: &AttributeMap, nonce: &[u8]) -> Result<Vec<u8>, MechanismError> {
        let attribute = move |name: &'static str| {
            input
                .get(name.as_bytes())
                .ok_or(MechanismError::MissingAttribute(name))
        };
        if attribute("nonce")? != nonce {
            return Err(MechanismError::InvalidNonce);
        }
        let cnonce = attribute("cnonce")?;
        let nc = attribute("nc")?;
        let digest_uri = attribute("digest-uri")?;
        let response = attribute("response")?;
        let realm = input.get(&b"realm"[..]).map_or(&[][..], Vec::as_slice);

        let secret = if self.credentials.password.is_empty() {
            self.credentials.password_digest.clone()
        } else {
            secret(
                self.credentials.username.as_bytes(),
                realm,
                self.credentials.password.as_bytes(),
            )
        };

        let expected = calculate_digest(b"AUTHENTICATE", digest_uri, &secret, nonce, cnonce, nc);
        if !bool::from(response.as_slice().ct_eq(&expected)) {
            return Err(MechanismError::AuthenticationFailed);
        }
        Ok(calculate_digest(b"", digest_uri, &secret, nonce, cnonce, nc))
    }
}

impl Default for DigestMd5 {
    fn default() -> DigestMd5 {
        DigestMd5::new()
    }
}

impl Mechanism for DigestMd5 {
    fn name(&self) -> &str {
        "DIGEST-MD5"
    }

    fn from_credentials(credentials: Credentials) -> DigestMd5 {
        DigestMd5 {
            credentials,
            nonces: Box::new(OsNonce),
            state: DigestMd5State::Init,
        }
    }

    fn respond(&mut self, payload: &[u8]) -> Result<Response, MechanismError> {
        match mem::replace(&mut self.state, DigestMd5State::Done) {
            DigestMd5State::Init => {
                let nonce = self.nonces.nonce()?.into_bytes();

                let mut output = AttributeMap::new();
                output.insert(b"nonce".to_vec(), nonce.clone());
                if !self.credentials.realm.is_empty() {
                    output.insert(b"realm".to_vec(), self.credentials.realm.as_bytes().to_vec());
                }
                output.insert(b"qop".to_vec(), b"auth".to_vec());
                output.insert(b"charset".to_vec(), b"utf-8".to_vec());
                output.insert(b"algorithm".to_vec(), b"md5-sess".to_vec());

                self.state = DigestMd5State::SentChallenge { nonce };
                Ok(Response::Challenge(serialize_message(&output)))
            }
            DigestMd5State::SentChallenge { nonce } => {
                let input = parse_message(payload);
                if input.get(&b"qop"[..]).map(|qop| trim(qop)) != Some(&b"auth"[..]) {
                    log::warn!("DIGEST-MD5 client didn’t pick qop=auth");
                    return Err(MechanismError::UnsupportedQop);
                }
                let username = input
                    .get(&b"username"[..])
                    .ok_or(MechanismError::MissingAttribute("username"))?;
                self.credentials.username = String::from_utf8(username.clone())
                    .map_err(|_| MechanismError::ErrorDecodingUsername)?;

                if self.credentials.password.is_empty()
                    && self.credentials.password_digest.is_empty()
                {
                    self.state = DigestMd5State::SentChallenge { nonce };
                    return Ok(Response::InputNeeded);
                }

                let rspauth = self.verify(&input, &nonce)?;
                let mut output = AttributeMap::new();
                output.insert(b"rspauth".to_vec(), rspauth);

                self.state = DigestMd5State::SentRspauth;
                Ok(Response::Challenge(serialize_message(&output)))
            }
            DigestMd5State::SentRspauth => Ok(Response::Success(Vec::new())),
            DigestMd5State::Done => Err(MechanismError::SaslSessionAlreadyOver),
        }
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn credentials_mut(&mut self) -> &mut Credentials {
        &mut self.credentials
    }
}
