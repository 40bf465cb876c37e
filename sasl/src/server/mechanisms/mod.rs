//! Provides a few SASL mechanisms.

mod anonymous;
mod digest_md5;
mod plain;

pub use self::anonymous::Anonymous;
pub use self::digest_md5::DigestMd5;
pub use self::plain::Plain;
