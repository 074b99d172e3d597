//! Canonical CBOR encoding of a document's signed fields.
//!
//! RFC 8949 Core Deterministic Encoding: integer map keys in ascending
//! order, smallest-width integers, definite lengths, no floats. The
//! signature — and therefore conflict resolution on every peer — is
//! computed over these bytes, so identical fields must produce identical
//! bytes on every platform.

use ciborium::value::Value;

/// Field keys for the signed map. Keys 0-23 encode as single bytes.
mod keys {
    pub const AUTHOR: u64 = 0;
    pub const PATH: u64 = 1;
    pub const CONTENT_HASH: u64 = 2;
    pub const TIMESTAMP: u64 = 3;
    pub const DELETE_AFTER: u64 = 4;
}

/// Build the canonical signed message for a document's fields.
///
/// The content itself is represented by its hash; an absent
/// `delete_after` encodes as null so that "never expires" and
/// "expires at 0" are distinct inputs.
pub fn signed_message(
    author: &str,
    path: &str,
    content_hash: &str,
    timestamp: u64,
    delete_after: Option<u64>,
) -> Vec<u8> {
    let entries = vec![
        (
            Value::Integer(keys::AUTHOR.into()),
            Value::Text(author.to_string()),
        ),
        (
            Value::Integer(keys::PATH.into()),
            Value::Text(path.to_string()),
        ),
        (
            Value::Integer(keys::CONTENT_HASH.into()),
            Value::Text(content_hash.to_string()),
        ),
        (
            Value::Integer(keys::TIMESTAMP.into()),
            Value::Integer(timestamp.into()),
        ),
        (
            Value::Integer(keys::DELETE_AFTER.into()),
            match delete_after {
                Some(at) => Value::Integer(at.into()),
                None => Value::Null,
            },
        ),
    ];

    let mut buf = Vec::new();
    encode_value(&mut buf, &Value::Map(entries));
    buf
}

/// Recursively encode a CBOR value.
///
/// Map keys are emitted in the order given; `signed_message` lists them
/// in ascending integer order, which is already canonical.
fn encode_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => {
            let n: i128 = (*i).into();
            if n >= 0 {
                encode_uint(buf, 0, n as u64);
            } else {
                encode_uint(buf, 1, (-1 - n) as u64);
            }
        }
        Value::Text(s) => {
            encode_uint(buf, 3, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Map(entries) => {
            encode_uint(buf, 5, entries.len() as u64);
            for (key, val) in entries {
                encode_value(buf, key);
                encode_value(buf, val);
            }
        }
        Value::Null => buf.push(0xf6),
        _ => unreachable!("unsupported CBOR value in signed message"),
    }
}

/// Encode an unsigned integer with the given major type, smallest width.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = signed_message("@test.bkey", "/wiki/hello", "bhash", 1000, None);
        let b = signed_message("@test.bkey", "/wiki/hello", "bhash", 1000, None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_field_is_covered() {
        let base = signed_message("@test.bkey", "/a", "bhash", 1000, None);
        assert_ne!(base, signed_message("@tset.bkey", "/a", "bhash", 1000, None));
        assert_ne!(base, signed_message("@test.bkey", "/b", "bhash", 1000, None));
        assert_ne!(base, signed_message("@test.bkey", "/a", "bhsah", 1000, None));
        assert_ne!(base, signed_message("@test.bkey", "/a", "bhash", 1001, None));
        assert_ne!(base, signed_message("@test.bkey", "/a", "bhash", 1000, Some(2000)));
    }

    #[test]
    fn test_absent_and_zero_delete_after_differ() {
        let none = signed_message("@test.bkey", "/a", "bhash", 1000, None);
        let zero = signed_message("@test.bkey", "/a", "bhash", 1000, Some(0));
        assert_ne!(none, zero);
    }

    #[test]
    fn test_map_shape() {
        let bytes = signed_message("@test.bkey", "/a", "bh", 0, None);
        // Map of five entries, first key 0, then a 10-byte text.
        assert_eq!(bytes[0], 0xa5);
        assert_eq!(bytes[1], 0x00);
        assert_eq!(bytes[2], 0x6a);
        // Last entry: key 4, null.
        assert_eq!(bytes[bytes.len() - 2], 0x04);
        assert_eq!(bytes[bytes.len() - 1], 0xf6);
    }

    #[test]
    fn test_smallest_integer_widths() {
        let mut buf = Vec::new();
        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 0x1_0000);
        assert_eq!(buf, vec![0x1a, 0x00, 0x01, 0x00, 0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, u64::MAX);
        assert_eq!(
            buf,
            vec![0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }
}
