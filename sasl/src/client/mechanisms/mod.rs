//! Provides a few SASL mechanisms.

mod anonymous;
mod digest_md5;
#[cfg(feature = "oauth")]
mod facebook;
#[cfg(feature = "oauth")]
mod oauth2;
mod plain;
mod scram;

pub use self::anonymous::Anonymous;
pub use self::digest_md5::DigestMd5;
#[cfg(feature = "oauth")]
#[cfg_attr(docsrs, doc(cfg(feature = "oauth")))]
pub use self::facebook::Facebook;
#[cfg(feature = "oauth")]
#[cfg_attr(docsrs, doc(cfg(feature = "oauth")))]
pub use self::oauth2::{Google, WindowsLive};
pub use self::plain::Plain;
pub use self::scram::Scram;
