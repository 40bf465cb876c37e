//! Lookup of mechanisms by the name advertised on the wire.
//!
//! ```rust
//! use sasl::common::Credentials;
//! use sasl::registry::{available_client_mechanisms, ClientMechanism};
//!
//! let offered = ["PLAIN", "SCRAM-SHA-1"];
//! let name = available_client_mechanisms()
//!     .iter()
//!     .find(|name| offered.contains(*name))
//!     .unwrap();
//! assert_eq!(*name, "SCRAM-SHA-1");
//!
//! let creds = Credentials::default()
//!     .with_username("user")
//!     .with_password("pencil");
//! let mechanism = ClientMechanism::new(name, creds).unwrap();
//! assert_eq!(mechanism.name(), "SCRAM-SHA-1");
//! ```

use crate::client::mechanisms::{Anonymous, DigestMd5, Plain, Scram};
#[cfg(feature = "oauth")]
use crate::client::mechanisms::{Facebook, Google, WindowsLive};
use crate::client::{self, Mechanism as _};
use crate::common::crypto::NonceSource;
use crate::common::scram::{Sha1, Sha256};
use crate::common::Credentials;
use crate::server::{self, Mechanism as _};

/// The client mechanisms this crate implements, strongest first.
pub fn available_client_mechanisms() -> &'static [&'static str] {
    &[
        "SCRAM-SHA-256",
        "SCRAM-SHA-1",
        "DIGEST-MD5",
        "PLAIN",
        "ANONYMOUS",
        #[cfg(feature = "oauth")]
        "X-FACEBOOK-PLATFORM",
        #[cfg(feature = "oauth")]
        "X-MESSENGER-OAUTH2",
        #[cfg(feature = "oauth")]
        "X-OAUTH2",
    ]
}

/// The server mechanisms this crate implements.
pub fn available_server_mechanisms() -> &'static [&'static str] {
    &["PLAIN", "DIGEST-MD5", "ANONYMOUS"]
}

/// Any of the client mechanisms, picked by name at runtime.
pub enum ClientMechanism {
    /// SCRAM-SHA-256
    ScramSha256(Scram<Sha256>),
    /// SCRAM-SHA-1
    ScramSha1(Scram<Sha1>),
    /// DIGEST-MD5
    DigestMd5(DigestMd5),
    /// PLAIN
    Plain(Plain),
    /// ANONYMOUS
    Anonymous(Anonymous),
    /// X-FACEBOOK-PLATFORM
    #[cfg(feature = "oauth")]
    Facebook(Facebook),
    /// X-MESSENGER-OAUTH2
    #[cfg(feature = "oauth")]
    WindowsLive(WindowsLive),
    /// X-OAUTH2
    #[cfg(feature = "oauth")]
    Google(Google),
}

impl ClientMechanism {
    /// Creates the mechanism called `name`, or `None` if it isn’t implemented.
    ///
    /// Names are case-sensitive.
    pub fn new(name: &str, credentials: Credentials) -> Option<ClientMechanism> {
        Some(match name {
            "SCRAM-SHA-256" => ClientMechanism::ScramSha256(Scram::from_credentials(credentials)),
            "SCRAM-SHA-1" => ClientMechanism::ScramSha1(Scram::from_credentials(credentials)),
            "DIGEST-MD5" => ClientMechanism::DigestMd5(DigestMd5::from_credentials(credentials)),
            "PLAIN" => ClientMechanism::Plain(Plain::from_credentials(credentials)),
            "ANONYMOUS" => ClientMechanism::Anonymous(Anonymous::from_credentials(credentials)),
            #[cfg(feature = "oauth")]
            "X-FACEBOOK-PLATFORM" => {
                ClientMechanism::Facebook(Facebook::from_credentials(credentials))
            }
            #[cfg(feature = "oauth")]
            "X-MESSENGER-OAUTH2" => {
                ClientMechanism::WindowsLive(WindowsLive::from_credentials(credentials))
            }
            #[cfg(feature = "oauth")]
            "X-OAUTH2" => ClientMechanism::Google(Google::from_credentials(credentials)),
            _ => {
                log::debug!("No client mechanism called {}", name);
                return None;
            }
        })
    }

    /// Replaces the nonce source of the mechanisms which use one, and does nothing for the
    /// others.
    pub fn with_nonce_source<S: NonceSource + 'static>(self, source: S) -> ClientMechanism {
        match self {
            ClientMechanism::ScramSha256(m) => {
                ClientMechanism::ScramSha256(m.with_nonce_source(source))
            }
            ClientMechanism::ScramSha1(m) => ClientMechanism::ScramSha1(m.with_nonce_source(source)),
            ClientMechanism::DigestMd5(m) => ClientMechanism::DigestMd5(m.with_nonce_source(source)),
            other => other,
        }
    }

    fn inner(&mut self) -> &mut dyn client::Mechanism {
        match self {
            ClientMechanism::ScramSha256(m) => m,
            ClientMechanism::ScramSha1(m) => m,
            ClientMechanism::DigestMd5(m) => m,
            ClientMechanism::Plain(m) => m,
            ClientMechanism::Anonymous(m) => m,
            #[cfg(feature = "oauth")]
            ClientMechanism::Facebook(m) => m,
            #[cfg(feature = "oauth")]
            ClientMechanism::WindowsLive(m) => m,
            #[cfg(feature = "oauth")]
            ClientMechanism::Google(m) => m,
        }
    }

    /// The name of the mechanism.
    pub fn name(&self) -> &'static str {
        match self {
            ClientMechanism::ScramSha256(_) => "SCRAM-SHA-256",
            ClientMechanism::ScramSha1(_) => "SCRAM-SHA-1",
            ClientMechanism::DigestMd5(_) => "DIGEST-MD5",
            ClientMechanism::Plain(_) => "PLAIN",
            ClientMechanism::Anonymous(_) => "ANONYMOUS",
            #[cfg(feature = "oauth")]
            ClientMechanism::Facebook(_) => "X-FACEBOOK-PLATFORM",
            #[cfg(feature = "oauth")]
            ClientMechanism::WindowsLive(_) => "X-MESSENGER-OAUTH2",
            #[cfg(feature = "oauth")]
            ClientMechanism::Google(_) => "X-OAUTH2",
        }
    }

    /// Feeds the server’s challenge to the mechanism, see [`client::Mechanism::respond`].
    pub fn respond(&mut self, challenge: &[u8]) -> Result<client::Response, client::MechanismError> {
        let name = self.name();
        match self.inner().respond(challenge) {
            Ok(response) => {
                log::debug!(
                    "{} produced {} bytes, {}",
                    name,
                    response.data().len(),
                    if response.continues() { "continuing" } else { "complete" }
                );
                Ok(response)
            }
            Err(err) => {
                log::warn!("{} client failed: {} ({})", name, err, err.kind());
                Err(err)
            }
        }
    }
}

/// Any of the server mechanisms, picked by name at runtime.
pub enum ServerMechanism {
    /// PLAIN
    Plain(server::mechanisms::Plain),
    /// DIGEST-MD5
    DigestMd5(server::mechanisms::DigestMd5),
    /// ANONYMOUS
    Anonymous(server::mechanisms::Anonymous),
}

impl ServerMechanism {
    /// Creates the mechanism called `name`, or `None` if it isn’t implemented.
    ///
    /// Names are case-sensitive.
    pub fn new(name: &str, credentials: Credentials) -> Option<ServerMechanism> {
        use server::mechanisms as m;
        Some(match name {
            "PLAIN" => ServerMechanism::Plain(m::Plain::from_credentials(credentials)),
            "DIGEST-MD5" => ServerMechanism::DigestMd5(m::DigestMd5::from_credentials(credentials)),
            "ANONYMOUS" => ServerMechanism::Anonymous(m::Anonymous::from_credentials(credentials)),
            _ => {
                log::debug!("No server mechanism called {}", name);
                return None;
            }
        })
    }

    /// Replaces the nonce source of the mechanisms which use one, and does nothing for the
    /// others.
    pub fn with_nonce_source<S: NonceSource + 'static>(self, source: S) -> ServerMechanism {
        match self {
            ServerMechanism::DigestMd5(m) => ServerMechanism::DigestMd5(m.with_nonce_source(source)),
            other => other,
        }
    }

    fn inner(&self) -> &dyn server::Mechanism {
        match self {
            ServerMechanism::Plain(m) => m,
            ServerMechanism::DigestMd5(m) => m,
            ServerMechanism::Anonymous(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn server::Mechanism {
        match self {
            ServerMechanism::Plain(m) => m,
            ServerMechanism::DigestMd5(m) => m,
            ServerMechanism::Anonymous(m) => m,
        }
    }

    /// The name of the mechanism.
    pub fn name(&self) -> &'static str {
        match self {
            ServerMechanism::Plain(_) => "PLAIN",
            ServerMechanism::DigestMd5(_) => "DIGEST-MD5",
            ServerMechanism::Anonymous(_) => "ANONYMOUS",
        }
    }

    /// Feeds the client’s payload to the mechanism, see [`server::Mechanism::respond`].
    pub fn respond(&mut self, payload: &[u8]) -> Result<server::Response, server::MechanismError> {
        let name = self.name();
        match self.inner_mut().respond(payload) {
            Ok(response) => {
                log::debug!("{} server responded with {:?}", name, ResponseKind(&response));
                Ok(response)
            }
            Err(err) => {
                log::warn!("{} server failed: {} ({})", name, err, err.kind());
                Err(err)
            }
        }
    }

    /// The credentials known so far, see [`server::Mechanism::credentials`].
    pub fn credentials(&self) -> &Credentials {
        self.inner().credentials()
    }

    /// Mutable access to the credentials, see [`server::Mechanism::credentials_mut`].
    pub fn credentials_mut(&mut self) -> &mut Credentials {
        self.inner_mut().credentials_mut()
    }
}

/// Logs a server response without its payload.
struct ResponseKind<'a>(&'a server::Response);

impl std::fmt::Debug for ResponseKind<'_> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.0 {
            server::Response::Challenge(data) => write!(fmt, "a {} bytes challenge", data.len()),
            server::Response::Success(data) => write!(fmt, "success with {} bytes", data.len()),
            server::Response::InputNeeded => fmt.write_str("a request for credentials"),
        }
    }
}

/// Shorthand for [`ClientMechanism::new`].
pub fn create_client(name: &str, credentials: Credentials) -> Option<ClientMechanism> {
    ClientMechanism::new(name, credentials)
}

/// Shorthand for [`ServerMechanism::new`].
pub fn create_server(name: &str, credentials: Credentials) -> Option<ServerMechanism> {
    ServerMechanism::new(name, credentials)
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

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn client_names_round_trip() {
        for name in available_client_mechanisms() {
            let mechanism = create_client(name, Credentials::default()).unwrap();
            assert_eq!(mechanism.name(), *name);
        }
        assert_eq!(available_client_mechanisms()[0], "SCRAM-SHA-256");
    }

    #[test]
    fn server_names_round_trip() {
        for name in available_server_mechanisms() {
            let mechanism = create_server(name, Credentials::default()).unwrap();
            assert_eq!(mechanism.name(), *name);
        }
    }

    #[test]
    fn unknown_names() {
        init_logger();
        assert!(create_client("GSSAPI", Credentials::default()).is_none());
        assert!(create_client("plain", Credentials::default()).is_none());
        assert!(create_client("", Credentials::default()).is_none());
        assert!(create_server("SCRAM-SHA-1", Credentials::default()).is_none());
        assert!(create_server("X-OAUTH2", Credentials::default()).is_none());
    }

    #[test]
    fn plain_through_registry() {
        init_logger();
        let creds = Credentials::default()
            .with_username("sender")
            .with_password("testpwd");
        let mut client = create_client("PLAIN", creds).unwrap();
        let mut server = create_server("PLAIN", Credentials::default()).unwrap();

        let response = client.respond(b"").unwrap();
        assert_eq!(response, client::Response::Complete(b"\0sender\0testpwd".to_vec()));
        assert_eq!(
            server.respond(response.data()).unwrap(),
            server::Response::InputNeeded
        );
        assert_eq!(server.credentials().username, "sender");
        assert_eq!(server.credentials().password, "testpwd");

        assert_eq!(
            client.respond(b""),
            Err(client::MechanismError::InvalidState)
        );
    }

    #[test]
    fn digest_md5_through_registry() {
        init_logger();
        let creds = Credentials::default()
            .with_username("qxmpp1")
            .with_password("qxmpp123")
            .with_host("jabber.ru")
            .with_service_type("xmpp");
        let mut client = create_client("DIGEST-MD5", creds)
            .unwrap()
            .with_nonce_source(FixedNonce("AMzVG8Oibf+sVUCPPlWLR8lZQvbbJtJB9vJd+u3c6dw="));
        let mut server = create_server("DIGEST-MD5", Credentials::default())
            .unwrap()
            .with_nonce_source(FixedNonce("2530347127"));

        let mut payload = client.respond(b"").unwrap().into_data();
        let server::Response::Challenge(challenge) = server.respond(&payload).unwrap() else {
            panic!("expected a challenge");
        };
        payload = client.respond(&challenge).unwrap().into_data();
        assert_eq!(
            server.respond(&payload).unwrap(),
            server::Response::InputNeeded
        );
        server.credentials_mut().password = "qxmpp123".to_owned();
        let server::Response::Challenge(rspauth) = server.respond(&payload).unwrap() else {
            panic!("expected rspauth");
        };
        assert_eq!(rspauth, b"rspauth=d92bf7f4331700c24799cbab364a14b7");
        assert_eq!(
            client.respond(&rspauth).unwrap(),
            client::Response::Complete(Vec::new())
        );
        assert_eq!(
            server.respond(b"").unwrap(),
            server::Response::Success(Vec::new())
        );
    }

    #[test]
    fn anonymous_through_registry() {
        let mut client = create_client("ANONYMOUS", Credentials::default()).unwrap();
        let mut server = create_server("ANONYMOUS", Credentials::default()).unwrap();
        let response = client.respond(b"").unwrap();
        assert!(!response.continues());
        assert_eq!(
            server.respond(response.data()).unwrap(),
            server::Response::Success(Vec::new())
        );
        assert_eq!(
            server.respond(b""),
            Err(server::MechanismError::SaslSessionAlreadyOver)
        );
    }
}
