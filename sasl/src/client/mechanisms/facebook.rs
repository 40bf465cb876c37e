//! Provides Facebook’s "X-FACEBOOK-PLATFORM" mechanism.

use url::form_urlencoded;

use crate::client::{Mechanism, MechanismError, Response};
use crate::common::Credentials;

enum FacebookState {
    Init,
    SentInitialMessage,
    Done,
}

/// A struct for the X-FACEBOOK-PLATFORM mechanism.
///
/// The username is the application’s API key and the password its access token.
pub struct Facebook {
    api_key: String,
    access_token: String,
    state: FacebookState,
}

impl Facebook {
    /// Constructs a new struct for authenticating using the X-FACEBOOK-PLATFORM mechanism.
    pub fn new<K: Into<String>, T: Into<String>>(api_key: K, access_token: T) -> Facebook {
        Facebook {
            api_key: api_key.into(),
            access_token: access_token.into(),
            state: FacebookState::Init,
        }
    }
}

impl Mechanism for Facebook {
    fn name(&self) -> &str {
        "X-FACEBOOK-PLATFORM"
    }

    fn from_credentials(credentials: Credentials) -> Facebook {
        Facebook::new(credentials.username, credentials.password)
    }

    fn respond(&mut self, challenge: &[u8]) -> Result<Response, MechanismError> {
        match std::mem::replace(&mut self.state, FacebookState::Done) {
            FacebookState::Init => {
                self.state = FacebookState::SentInitialMessage;
                Ok(Response::Continue(Vec::new()))
            }
            FacebookState::SentInitialMessage => {
                let mut method = None;
                let mut nonce = None;
                for (key, value) in form_urlencoded::parse(challenge) {
                    match &*key {
                        "method" => method = Some(value.into_owned()),
                        "nonce" => nonce = Some(value.into_owned()),
                        _ => (),
                    }
                }
                let method = method.ok_or(MechanismError::MissingChallengeParameter("method"))?;
                let nonce = nonce.ok_or(MechanismError::MissingChallengeParameter("nonce"))?;
                let response = form_urlencoded::Serializer::new(String::new())
                    .append_pair("access_token", &self.access_token)
                    .append_pair("api_key", &self.api_key)
                    .append_pair("call_id", "")
                    .append_pair("method", &method)
                    .append_pair("nonce", &nonce)
                    .append_pair("v", "1.0")
                    .finish();
                Ok(Response::Complete(response.into_bytes()))
            }
            FacebookState::Done => Err(MechanismError::InvalidState),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facebook_works() {
        let mut mechanism = Facebook::new("123456789012345", "abcdefghijlkmno");
        assert_eq!(mechanism.name(), "X-FACEBOOK-PLATFORM");
        assert_eq!(mechanism.respond(b"").unwrap(), Response::Continue(Vec::new()));
        let response = mechanism
            .respond(b"version=1&method=auth.xmpp_login&nonce=AA4EFEE16F2AB64B131EEFFE6EACDDB8")
            .unwrap();
        assert_eq!(
            response,
            Response::Complete(
                b"access_token=abcdefghijlkmno&api_key=123456789012345&call_id=&method=auth.xmpp_login&nonce=AA4EFEE16F2AB64B131EEFFE6EACDDB8&v=1.0"
                    .to_vec()
            )
        );
        assert_eq!(mechanism.respond(b""), Err(MechanismError::InvalidState));
    }

    #[test]
    fn facebook_encodes_special_characters() {
        let mut mechanism = Facebook::new("key", "tok&en+/=");
        mechanism.respond(b"").unwrap();
        let response = mechanism
            .respond(b"method=auth.xmpp_login&nonce=a%2Bb%26c+d")
            .unwrap();
        assert_eq!(
            response,
            Response::Complete(
                b"access_token=tok%26en%2B%2F%3D&api_key=key&call_id=&method=auth.xmpp_login&nonce=a%2Bb%26c+d&v=1.0"
                    .to_vec()
            )
        );
    }

    #[test]
    fn facebook_requires_method_and_nonce() {
        let mut mechanism = Facebook::new("key", "token");
        mechanism.respond(b"").unwrap();
        assert_eq!(
            mechanism.respond(b"version=1&nonce=abc"),
            Err(MechanismError::MissingChallengeParameter("method"))
        );
        assert_eq!(mechanism.respond(b""), Err(MechanismError::InvalidState));

        let mut mechanism = Facebook::new("key", "token");
        mechanism.respond(b"").unwrap();
        assert_eq!(
            mechanism.respond(b"method=auth.xmpp_login"),
            Err(MechanismError::MissingChallengeParameter("nonce"))
        );
    }
}
