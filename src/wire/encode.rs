//! bpickle encoding: `Value` → bytes.

use bytes::{BufMut, Bytes, BytesMut};

use super::DEFAULT_MAX_DEPTH;
use super::marker;
use super::table::EncodeTable;
use crate::error::CodecError;
use crate::types::Value;

/// Encodes `value` with the standard table.
pub fn encode(value: &Value) -> Result<Bytes, CodecError> {
    Encoder::default().encode(value)
}

/// Encodes `value` dispatching through `table`.
pub fn encode_with(value: &Value, table: &EncodeTable) -> Result<Bytes, CodecError> {
    Encoder::new(table).encode(value)
}

/// Appends the encoding of `value` to `buf` using the standard table.
pub fn encode_value(buf: &mut BytesMut, value: &Value) -> Result<(), CodecError> {
    Encoder::default().write_value(value, buf)
}

/// Recursive writer bound to one encode table.
///
/// Write routines receive the encoder so that nested values are dispatched
/// through the same table and counted against the same depth limit.
#[derive(Debug, Clone)]
pub struct Encoder<'t> {
    table: &'t EncodeTable,
    max_depth: usize,
    depth: usize,
}

impl<'t> Encoder<'t> {
    pub fn new(table: &'t EncodeTable) -> Self {
        Self {
            table,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    /// Sets the maximum nesting depth of values accepted for encoding.
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    pub fn table(&self) -> &'t EncodeTable {
        self.table
    }

    /// Encodes `value` into a fresh buffer.
    pub fn encode(&mut self, value: &Value) -> Result<Bytes, CodecError> {
        let mut buf = BytesMut::new();
        if let Err(e) = self.write_value(value, &mut buf) {
            tracing::debug!(error = %e, kind = %value.kind(), "bpickle encode failed");
            return Err(e);
        }
        Ok(buf.freeze())
    }

    /// Writes `value` by dispatching on its kind.
    pub fn write_value(&mut self, value: &Value, buf: &mut BytesMut) -> Result<(), CodecError> {
        let kind = value.kind();
        let routine = self
            .table
            .get(kind)
            .ok_or(CodecError::UnsupportedType { kind })?;

        if self.depth >= self.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = routine(self, value, buf);
        self.depth -= 1;
        result
    }

    fn write_items(&mut self, items: &[Value], buf: &mut BytesMut) -> Result<(), CodecError> {
        for item in items {
            self.write_value(item, buf)?;
        }
        buf.put_u8(marker::TERMINATOR);
        Ok(())
    }
}

impl Default for Encoder<'static> {
    fn default() -> Self {
        Self::new(EncodeTable::standard())
    }
}

fn mismatch(value: &Value) -> CodecError {
    CodecError::UnsupportedType { kind: value.kind() }
}

// -- Standard write routines --

pub fn write_none(
    _: &mut Encoder<'_>,
    value: &Value,
    buf: &mut BytesMut,
) -> Result<(), CodecError> {
    match value {
        Value::None => {
            buf.put_u8(marker::NONE);
            Ok(())
        }
        other => Err(mismatch(other)),
    }
}

/// Writes `b0` or `b1`. Booleans carry no terminator.
pub fn write_boolean(
    _: &mut Encoder<'_>,
    value: &Value,
    buf: &mut BytesMut,
) -> Result<(), CodecError> {
    let Value::Boolean(b) = value else {
        return Err(mismatch(value));
    };
    let digit = if *b {
        marker::BOOL_TRUE
    } else {
        marker::BOOL_FALSE
    };
    buf.put_slice(&[marker::BOOLEAN, digit]);
    Ok(())
}

/// Writes `i<decimal>;`. The decimal form is exact at any magnitude.
pub fn write_integer(
    _: &mut Encoder<'_>,
    value: &Value,
    buf: &mut BytesMut,
) -> Result<(), CodecError> {
    let Value::Integer(i) = value else {
        return Err(mismatch(value));
    };
    buf.put_u8(marker::INTEGER);
    if i.is_negative() {
        buf.put_u8(b'-');
    }
    buf.put_slice(i.digits().as_bytes());
    buf.put_u8(marker::TERMINATOR);
    Ok(())
}

/// Writes `f<text>;` using the shortest text that parses back to the same
/// `f64`. Small and large magnitudes come out in exponent form (`5e-5`).
pub fn write_float(
    _: &mut Encoder<'_>,
    value: &Value,
    buf: &mut BytesMut,
) -> Result<(), CodecError> {
    let Value::Float(f) = value else {
        return Err(mismatch(value));
    };
    buf.put_u8(marker::FLOAT);
    buf.put_slice(format!("{f:?}").as_bytes());
    buf.put_u8(marker::TERMINATOR);
    Ok(())
}

fn put_length_prefixed(buf: &mut BytesMut, tag: u8, payload: &[u8]) {
    buf.put_u8(tag);
    buf.put_slice(payload.len().to_string().as_bytes());
    buf.put_u8(marker::LENGTH_SEPARATOR);
    buf.put_slice(payload);
}

pub fn write_bytes(
    _: &mut Encoder<'_>,
    value: &Value,
    buf: &mut BytesMut,
) -> Result<(), CodecError> {
    let Value::Bytes(b) = value else {
        return Err(mismatch(value));
    };
    put_length_prefixed(buf, marker::BYTES, b);
    Ok(())
}

/// Writes `u<len>:<utf8>`; `len` counts encoded bytes, not characters.
pub fn write_text(
    _: &mut Encoder<'_>,
    value: &Value,
    buf: &mut BytesMut,
) -> Result<(), CodecError> {
    let Value::Text(s) = value else {
        return Err(mismatch(value));
    };
    put_length_prefixed(buf, marker::TEXT, s.as_bytes());
    Ok(())
}

pub fn write_sequence(
    encoder: &mut Encoder<'_>,
    value: &Value,
    buf: &mut BytesMut,
) -> Result<(), CodecError> {
    let Value::Sequence(items) = value else {
        return Err(mismatch(value));
    };
    buf.put_u8(marker::SEQUENCE);
    encoder.write_items(items, buf)
}

pub fn write_tuple(
    encoder: &mut Encoder<'_>,
    value: &Value,
    buf: &mut BytesMut,
) -> Result<(), CodecError> {
    let Value::Tuple(items) = value else {
        return Err(mismatch(value));
    };
    buf.put_u8(marker::TUPLE);
    encoder.write_items(items, buf)
}

/// Writes `d<key><value>...;` with pairs in ascending key order.
pub fn write_mapping(
    encoder: &mut Encoder<'_>,
    value: &Value,
    buf: &mut BytesMut,
) -> Result<(), CodecError> {
    let Value::Mapping(map) = value else {
        return Err(mismatch(value));
    };
    buf.put_u8(marker::MAPPING);
    for (key, item) in map {
        encoder.write_value(key, buf)?;
        encoder.write_value(item, buf)?;
    }
    buf.put_u8(marker::TERMINATOR);
    Ok(())
}
