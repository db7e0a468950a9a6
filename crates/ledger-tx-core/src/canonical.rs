//! Canonical CBOR encoding for deterministic serialization.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats, no tags
//!
//! Every node must turn the same transaction into the same bytes, since those
//! bytes are what gets signed. Decoding goes through `ciborium`; encoding is
//! done here so that the byte layout is fixed regardless of library version.

use bytes::Bytes;
use ciborium::value::Value;
use std::io::Cursor;

use crate::error::CoreError;

/// Encode a CBOR Value to canonical bytes.
///
/// Fails on floats and tagged values, which have no place in a transaction.
pub fn encode_canonical(value: &Value) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Parse exactly one CBOR item from `bytes`.
///
/// Truncated input and trailing bytes are both decoding errors. This does not
/// check canonical form; callers re-encode and compare for that.
pub fn decode_value(bytes: &[u8]) -> Result<Value, CoreError> {
    let mut cursor = Cursor::new(bytes);
    let value: Value = ciborium::from_reader(&mut cursor)
        .map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(CoreError::DecodingError(format!(
            "{} trailing bytes after item",
            bytes.len() - consumed
        )));
    }
    Ok(value)
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr)?,
        Value::Map(entries) => encode_map_canonical(buf, entries)?,
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(_) => {
            return Err(CoreError::EncodingError(
                "floats not supported in canonical encoding".into(),
            ))
        }
        _ => {
            return Err(CoreError::EncodingError(
                "unsupported CBOR value type".into(),
            ))
        }
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n = i128::from(i);

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n) as u64;
        encode_uint(buf, 1, abs);
    }
}

/// Encode an unsigned integer with the given major type.
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

fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<(), CoreError> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item)?;
    }
    Ok(())
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<(), CoreError> {
    let mut pairs = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        pairs.push((key_buf, v));
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Value construction and field access
// ─────────────────────────────────────────────────────────────────────────────

/// A map entry keyed by a small integer.
pub(crate) fn entry(key: u64, value: Value) -> (Value, Value) {
    (Value::Integer(key.into()), value)
}

pub(crate) fn bytes_value(bytes: &[u8]) -> Value {
    Value::Bytes(bytes.to_vec())
}

pub(crate) fn opt_bytes_value(bytes: Option<&Bytes>) -> Value {
    match bytes {
        Some(b) => Value::Bytes(b.to_vec()),
        None => Value::Null,
    }
}

/// Read access to an integer-keyed CBOR map.
///
/// `ctx` names the record being decoded so errors point at the right place.
pub(crate) struct Fields<'a> {
    entries: &'a [(Value, Value)],
    ctx: &'static str,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(value: &'a Value, ctx: &'static str) -> Result<Self, CoreError> {
        match value {
            Value::Map(entries) => Ok(Self { entries, ctx }),
            _ => Err(CoreError::DecodingError(format!("{}: expected map", ctx))),
        }
    }

    fn err(&self, key: u64, what: &str) -> CoreError {
        CoreError::DecodingError(format!("{}: field {} {}", self.ctx, key, what))
    }

    /// Get a value by integer key. Absent and null are both `None`.
    pub(crate) fn get(&self, key: u64) -> Option<&'a Value> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == key as i128))
            .map(|(_, v)| v)
            .filter(|v| !v.is_null())
    }

    pub(crate) fn required(&self, key: u64) -> Result<&'a Value, CoreError> {
        self.get(key).ok_or_else(|| self.err(key, "missing"))
    }

    pub(crate) fn bytes(&self, key: u64) -> Result<Bytes, CoreError> {
        match self.required(key)? {
            Value::Bytes(b) => Ok(Bytes::copy_from_slice(b)),
            _ => Err(self.err(key, "expected bytes")),
        }
    }

    pub(crate) fn opt_bytes(&self, key: u64) -> Result<Option<Bytes>, CoreError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bytes(b)) => Ok(Some(Bytes::copy_from_slice(b))),
            Some(_) => Err(self.err(key, "expected bytes or null")),
        }
    }

    pub(crate) fn fixed<const N: usize>(&self, key: u64) -> Result<[u8; N], CoreError> {
        match self.required(key)? {
            Value::Bytes(b) => b
                .as_slice()
                .try_into()
                .map_err(|_| self.err(key, &format!("expected {} bytes, got {}", N, b.len()))),
            _ => Err(self.err(key, "expected bytes")),
        }
    }

    pub(crate) fn uint(&self, key: u64) -> Result<u64, CoreError> {
        match self.required(key)? {
            Value::Integer(i) => {
                u64::try_from(*i).map_err(|_| self.err(key, "expected unsigned integer"))
            }
            _ => Err(self.err(key, "expected integer")),
        }
    }

    pub(crate) fn int(&self, key: u64) -> Result<i64, CoreError> {
        match self.required(key)? {
            Value::Integer(i) => {
                i64::try_from(*i).map_err(|_| self.err(key, "integer out of range"))
            }
            _ => Err(self.err(key, "expected integer")),
        }
    }

    pub(crate) fn text(&self, key: u64) -> Result<String, CoreError> {
        match self.required(key)? {
            Value::Text(s) => Ok(s.clone()),
            _ => Err(self.err(key, "expected text")),
        }
    }

    pub(crate) fn array(&self, key: u64) -> Result<&'a [Value], CoreError> {
        match self.required(key)? {
            Value::Array(arr) => Ok(arr),
            _ => Err(self.err(key, "expected array")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();

        // 0-23: single byte
        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        // 24-255: two bytes
        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        // 256-65535: three bytes
        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, u64::MAX);
        assert_eq!(buf, vec![0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_negative_integer_encoding() {
        let bytes = encode_canonical(&Value::Integer((-1i64).into())).unwrap();
        assert_eq!(bytes, vec![0x20]);

        let bytes = encode_canonical(&Value::Integer((-500i64).into())).unwrap();
        assert_eq!(bytes, vec![0x39, 0x01, 0xf3]);
    }

    #[test]
    fn test_map_key_ordering() {
        let entries = vec![
            entry(8, Value::Integer(80.into())),
            entry(0, Value::Integer(0.into())),
            entry(5, Value::Integer(50.into())),
        ];
        let buf = encode_canonical(&Value::Map(entries)).unwrap();

        assert_eq!(buf[0], 0xa3);
        assert_eq!(&buf[1..3], &[0x00, 0x00]);
        assert_eq!(&buf[3..6], &[0x05, 0x18, 50]);
        assert_eq!(&buf[6..9], &[0x08, 0x18, 80]);
    }

    #[test]
    fn test_float_rejected() {
        let result = encode_canonical(&Value::Float(1.5));
        assert!(matches!(result, Err(CoreError::EncodingError(_))));
    }

    #[test]
    fn test_decode_matches_encode() {
        let value = Value::Map(vec![
            entry(0, Value::Text("hello".into())),
            entry(1, bytes_value(b"world")),
            entry(2, Value::Array(vec![Value::Null, Value::Bool(true)])),
        ]);
        let bytes = encode_canonical(&value).unwrap();
        let decoded = decode_value(&bytes).unwrap();
        assert_eq!(encode_canonical(&decoded).unwrap(), bytes);
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = encode_canonical(&bytes_value(b"some bytes")).unwrap();
        let result = decode_value(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(CoreError::DecodingError(_))));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut bytes = encode_canonical(&Value::Integer(1.into())).unwrap();
        bytes.push(0x00);
        let result = decode_value(&bytes);
        assert!(matches!(result, Err(CoreError::DecodingError(_))));
    }

    #[test]
    fn test_fields_accessors() {
        let value = Value::Map(vec![
            entry(0, bytes_value(&[1, 2, 3])),
            entry(1, Value::Integer(7.into())),
            entry(2, Value::Null),
            entry(3, Value::Integer((-3i64).into())),
        ]);
        let fields = Fields::new(&value, "test").unwrap();

        assert_eq!(fields.bytes(0).unwrap().as_ref(), &[1, 2, 3]);
        assert_eq!(fields.fixed::<3>(0).unwrap(), [1, 2, 3]);
        assert!(fields.fixed::<4>(0).is_err());
        assert_eq!(fields.uint(1).unwrap(), 7);
        assert_eq!(fields.opt_bytes(2).unwrap(), None);
        assert!(fields.bytes(2).is_err());
        assert!(fields.uint(3).is_err());
        assert_eq!(fields.int(3).unwrap(), -3);
        assert!(fields.text(9).is_err());
    }
}
