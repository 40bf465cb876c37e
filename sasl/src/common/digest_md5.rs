//! The DIGEST-MD5 attribute-list codec (RFC 2831) and digest computation.

use std::collections::BTreeMap;

use crate::common::crypto::{digest, Algorithm};

/// Parsed form of a DIGEST-MD5 challenge or response.
///
/// Sorted by key, which makes [`serialize_message`] deterministic.
pub type AttributeMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// Characters which force a value to be sent as a quoted string.
const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} \t";

/// Strips ASCII whitespace on both ends.
pub fn trim(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !first.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !last.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    bytes
}

fn find(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|pos| from + pos)
}

/// Parses a `key=value,key="quoted value"` list.
///
/// Inside a quoted string `\"` and `\\` are unescaped, any other backslash is kept as-is.
/// An unterminated quoted string, or anything but a comma after a closing quote, stops the
/// parsing and whatever was parsed before it is returned; the mechanisms then fail on the
/// missing attributes.
pub fn parse_message(message: &[u8]) -> AttributeMap {
    let mut map = AttributeMap::new();
    let mut start = 0;
    while let Some(pos) = find(message, b'=', start) {
        let key = trim(&message[start..pos]).to_vec();
        let pos = pos + 1;

        if message.get(pos) == Some(&b'"') {
            let mut value = Vec::new();
            let mut end = None;
            let mut iter = message[pos + 1..].iter().enumerate();
            while let Some((i, &b)) = iter.next() {
                match b {
                    b'\\' => match iter.next() {
                        Some((_, &escaped @ (b'"' | b'\\'))) => value.push(escaped),
                        Some((_, &other)) => value.extend([b'\\', other]),
                        None => value.push(b),
                    },
                    b'"' => {
                        end = Some(pos + 1 + i);
                        break;
                    }
                    _ => value.push(b),
                }
            }
            let Some(end) = end else {
                log::warn!("Unfinished quoted string in DIGEST-MD5 message");
                return map;
            };
            map.insert(key, value);
            // Skip the closing quote and the following comma.
            start = end + 1;
            while message.get(start).map_or(false, u8::is_ascii_whitespace) {
                start += 1;
            }
            match message.get(start) {
                Some(b',') => start += 1,
                None => (),
                Some(_) => {
                    log::warn!("Garbage after quoted string in DIGEST-MD5 message");
                    return map;
                }
            }
        } else {
            let end = find(message, b',', pos).unwrap_or(message.len());
            map.insert(key, message[pos..end].to_vec());
            start = end + 1;
        }
    }
    map
}

/// Serializes attributes as a `key=value` list, quoting values when needed.
pub fn serialize_message(map: &AttributeMap) -> Vec<u8> {
    let mut ret = Vec::new();
    for (key, value) in map {
        if !ret.is_empty() {
            ret.push(b',');
        }
        ret.extend_from_slice(key);
        ret.push(b'=');
        if value.iter().any(|b| SEPARATORS.contains(b)) {
            ret.push(b'"');
            for &b in value {
                if b == b'\\' || b == b'"' {
                    ret.push(b'\\');
                }
                ret.push(b);
            }
            ret.push(b'"');
        } else {
            ret.extend_from_slice(value);
        }
    }
    ret
}

/// The shared secret, `MD5(username:realm:password)`.
pub fn secret(username: &[u8], realm: &[u8], password: &[u8]) -> Vec<u8> {
    digest(Algorithm::Md5, &[username, realm, password].join(&b':'))
}

fn md5_hex(data: &[u8]) -> Vec<u8> {
    hex::encode(digest(Algorithm::Md5, data)).into_bytes()
}

/// Computes the hex-encoded response digest for qop=auth.
///
/// The client response uses `AUTHENTICATE` as the method, the server’s `rspauth` an empty
/// method.
pub fn calculate_digest(
    method: &[u8],
    digest_uri: &[u8],
    secret: &[u8],
    nonce: &[u8],
    cnonce: &[u8],
    nc: &[u8],
) -> Vec<u8> {
    let a1 = [secret, nonce, cnonce].join(&b':');
    let a2 = [method, digest_uri].join(&b':');
    let kd = [
        &md5_hex(&a1)[..],
        nonce,
        nc,
        cnonce,
        &b"auth"[..],
        &md5_hex(&a2)[..],
    ]
    .join(&b':');
    md5_hex(&kd)
}
