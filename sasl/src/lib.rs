#![cfg_attr(docsrs, feature(doc_cfg))]

//! This crate provides a framework for SASL authentication and the mechanisms used by XMPP
//! clients and servers.
//!
//! # Examples
//!
//! ```rust
//! use sasl::client::mechanisms::Plain;
//! use sasl::client::{Mechanism, Response};
//! use sasl::common::Credentials;
//!
//! let creds = Credentials::default()
//!     .with_username("user")
//!     .with_password("pencil");
//!
//! let mut mechanism = Plain::from_credentials(creds);
//!
//! let initial_data = mechanism.respond(b"").unwrap();
//!
//! assert_eq!(initial_data, Response::Complete(b"\0user\0pencil".to_vec()));
//! ```
//!
//! The server side works the same way, except that it may ask for the password of the
//! username the client claimed:
//!
//! ```rust
//! use sasl::common::Credentials;
//! use sasl::server::mechanisms::Plain;
//! use sasl::server::{Mechanism, Response};
//!
//! let mut mechanism = Plain::from_credentials(Credentials::default());
//! assert_eq!(mechanism.respond(b"\0user\0pencil").unwrap(), Response::InputNeeded);
//! assert_eq!(mechanism.credentials().username, "user");
//! assert_eq!(mechanism.credentials().password, "pencil");
//! ```
//!
//! Picking a mechanism from the list a peer advertised is done through the [`registry`].
//!
//! You may look at the tests of `client/mechanisms/scram.rs` for examples of more advanced
//! usage.
//!
//! # Usage
//!
//! You can use this in your crate by adding this under `dependencies` in your `Cargo.toml`:
//!
//! ```toml,ignore
//! sasl = "*"
//! ```

pub mod error;

pub mod client;
pub mod common;
pub mod registry;
pub mod server;

pub use crate::common::Credentials;
pub use crate::error::{CryptoError, ErrorKind};
pub use crate::registry::{create_client, create_server, ClientMechanism, ServerMechanism};
