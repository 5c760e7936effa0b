//! bpickle decoding: bytes → `Value`.

use super::DEFAULT_MAX_DEPTH;
use super::cursor;
use super::marker;
use super::table::DecodeTable;
use crate::error::CodecError;
use crate::types::{Integer, Mapping, Value};

/// Decodes one message with the standard table.
///
/// Bytes after the first complete token are ignored.
pub fn decode(buf: &[u8]) -> Result<Value, CodecError> {
    Decoder::default().decode(buf)
}

/// Decodes one message dispatching through `table`.
pub fn decode_with(buf: &[u8], table: &DecodeTable) -> Result<Value, CodecError> {
    Decoder::new(table).decode(buf)
}

/// Recursive-descent reader bound to one decode table.
#[derive(Debug, Clone)]
pub struct Decoder<'t> {
    table: &'t DecodeTable,
    max_depth: usize,
    reject_trailing: bool,
    depth: usize,
}

impl<'t> Decoder<'t> {
    pub fn new(table: &'t DecodeTable) -> Self {
        Self {
            table,
            max_depth: DEFAULT_MAX_DEPTH,
            reject_trailing: false,
            depth: 0,
        }
    }

    /// Sets the maximum nesting depth accepted from the input.
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    /// When set, bytes left over after the top-level token are an error.
    pub fn reject_trailing(mut self, reject: bool) -> Self {
        self.reject_trailing = reject;
        self
    }

    pub fn table(&self) -> &'t DecodeTable {
        self.table
    }

    /// Decodes the token at the start of `buf`.
    pub fn decode(&mut self, buf: &[u8]) -> Result<Value, CodecError> {
        let result = self.decode_prefix(buf).and_then(|(value, consumed)| {
            if consumed < buf.len() {
                if self.reject_trailing {
                    let reason = "trailing bytes after message";
                    return Err(CodecError::corrupted(consumed, reason));
                }
                tracing::debug!(
                    consumed,
                    trailing = buf.len() - consumed,
                    "ignoring trailing bytes after bpickle message"
                );
            }
            Ok(value)
        });
        if let Err(e) = &result {
            tracing::debug!(error = %e, len = buf.len(), "bpickle decode failed");
        }
        result
    }

    /// Decodes the token at the start of `buf`, returning it with the number
    /// of bytes it occupied.
    pub fn decode_prefix(&mut self, buf: &[u8]) -> Result<(Value, usize), CodecError> {
        self.read_token(buf, 0)
    }

    /// Reads the token whose tag byte is at `pos`.
    ///
    /// Returns the value and the position just past the token. A routine
    /// that reports a position not strictly after `pos`, or beyond the end
    /// of `buf`, is treated as corrupted data.
    pub fn read_token(&mut self, buf: &[u8], pos: usize) -> Result<(Value, usize), CodecError> {
        let Some(tag) = cursor::peek(buf, pos) else {
            return Err(CodecError::EmptyInput { offset: pos });
        };
        let routine = self
            .table
            .get(tag)
            .ok_or(CodecError::UnknownTag { tag, offset: pos })?;

        if self.depth >= self.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = routine(self, buf, pos);
        self.depth -= 1;

        let (value, next) = result?;
        if next <= pos || next > buf.len() {
            return Err(CodecError::corrupted(
                pos,
                format!(
                    "routine for {:?} returned invalid position {next}",
                    char::from(tag)
                ),
            ));
        }
        Ok((value, next))
    }

    /// Reads tokens from `pos + 1` up to the closing `;` of the composite
    /// whose tag is at `pos`.
    pub fn read_items(
        &mut self,
        buf: &[u8],
        pos: usize,
    ) -> Result<(Vec<Value>, usize), CodecError> {
        let mut items = Vec::new();
        let mut pos = pos + 1;
        loop {
            match cursor::peek(buf, pos) {
                Some(marker::TERMINATOR) => return Ok((items, pos + 1)),
                Some(_) => {
                    let (item, next) = self.read_token(buf, pos)?;
                    items.push(item);
                    pos = next;
                }
                None => return Err(CodecError::corrupted(pos, "missing ';' terminator")),
            }
        }
    }
}

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self::new(DecodeTable::standard())
    }
}

// -- Standard read routines --

pub fn read_none(_: &mut Decoder<'_>, _: &[u8], pos: usize) -> Result<(Value, usize), CodecError> {
    Ok((Value::None, pos + 1))
}

/// Reads `b0` or `b1`; the digit is the last byte of the token.
pub fn read_boolean(
    _: &mut Decoder<'_>,
    buf: &[u8],
    pos: usize,
) -> Result<(Value, usize), CodecError> {
    let b = match cursor::peek(buf, pos + 1) {
        Some(marker::BOOL_FALSE) => false,
        Some(marker::BOOL_TRUE) => true,
        Some(_) => return Err(CodecError::corrupted(pos + 1, "boolean must be 0 or 1")),
        None => return Err(CodecError::corrupted(pos + 1, "missing boolean digit")),
    };
    Ok((Value::Boolean(b), pos + 2))
}

pub fn read_integer(
    _: &mut Decoder<'_>,
    buf: &[u8],
    pos: usize,
) -> Result<(Value, usize), CodecError> {
    let (field, next) = cursor::read_terminated(buf, pos + 1)?;
    let i = Integer::parse(field)
        .map_err(|_| CodecError::corrupted(pos + 1, "invalid integer digits"))?;
    Ok((Value::Integer(i), next))
}

/// Accepts any text `f64::from_str` accepts, including exponent forms.
pub fn read_float(
    _: &mut Decoder<'_>,
    buf: &[u8],
    pos: usize,
) -> Result<(Value, usize), CodecError> {
    let (field, next) = cursor::read_terminated(buf, pos + 1)?;
    let f = std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| CodecError::corrupted(pos + 1, "invalid float literal"))?;
    Ok((Value::Float(f), next))
}

pub fn read_bytes(
    _: &mut Decoder<'_>,
    buf: &[u8],
    pos: usize,
) -> Result<(Value, usize), CodecError> {
    let (payload, next) = cursor::read_length_prefixed(buf, pos + 1)?;
    Ok((Value::Bytes(payload.to_vec()), next))
}

pub fn read_text(
    _: &mut Decoder<'_>,
    buf: &[u8],
    pos: usize,
) -> Result<(Value, usize), CodecError> {
    let (payload, next) = cursor::read_length_prefixed(buf, pos + 1)?;
    let text = std::str::from_utf8(payload).map_err(|source| CodecError::InvalidUtf8 {
        offset: next - payload.len(),
        source,
    })?;
    Ok((Value::Text(text.to_owned()), next))
}

pub fn read_sequence(
    decoder: &mut Decoder<'_>,
    buf: &[u8],
    pos: usize,
) -> Result<(Value, usize), CodecError> {
    let (items, next) = decoder.read_items(buf, pos)?;
    Ok((Value::Sequence(items), next))
}

pub fn read_tuple(
    decoder: &mut Decoder<'_>,
    buf: &[u8],
    pos: usize,
) -> Result<(Value, usize), CodecError> {
    let (items, next) = decoder.read_items(buf, pos)?;
    Ok((Value::Tuple(items), next))
}

/// Reads key/value pairs up to the closing `;`. A repeated key replaces the
/// earlier pair.
pub fn read_mapping(
    decoder: &mut Decoder<'_>,
    buf: &[u8],
    pos: usize,
) -> Result<(Value, usize), CodecError> {
    let mut map = Mapping::new();
    let mut pos = pos + 1;
    loop {
        match cursor::peek(buf, pos) {
            Some(marker::TERMINATOR) => return Ok((Value::Mapping(map), pos + 1)),
            Some(_) => {
                let (key, next) = decoder.read_token(buf, pos)?;
                if cursor::peek(buf, next) == Some(marker::TERMINATOR) {
                    return Err(CodecError::corrupted(next, "mapping key without a value"));
                }
                let (value, next) = decoder.read_token(buf, next)?;
                map.insert(key, value);
                pos = next;
            }
            None => return Err(CodecError::corrupted(pos, "missing ';' terminator")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::encode::encode;
    use crate::wire::table::DecodeFn;

    fn dec(buf: &[u8]) -> Value {
        decode(buf).expect("decode failed")
    }

    fn round_trip(value: &Value) -> Value {
        dec(&encode(value).expect("encode failed"))
    }

    #[test]
    fn decode_scalars() {
        assert_eq!(dec(b"n"), Value::None);
        assert_eq!(dec(b"b1"), Value::from(true));
        assert_eq!(dec(b"b0"), Value::from(false));
        assert_eq!(dec(b"i-42;"), Value::from(-42));
        assert_eq!(dec(b"i007;"), Value::from(7));
        assert_eq!(dec(b"f2.5;"), Value::from(2.5));
    }

    #[test]
    fn decode_peer_float_forms() {
        assert_eq!(dec(b"f5e-05;"), Value::from(0.00005));
        assert_eq!(dec(b"f1e+16;"), Value::from(1e16));
        assert_eq!(dec(b"f-0.0;"), Value::from(-0.0));
        assert_eq!(dec(b"finf;"), Value::from(f64::INFINITY));
        assert!(dec(b"fnan;").as_f64().is_some_and(f64::is_nan));
    }

    #[test]
    fn decode_strings() {
        assert_eq!(dec(b"s0:"), Value::from(Vec::<u8>::new()));
        assert_eq!(dec(b"s3:a;b"), Value::from(b"a;b"));
        assert_eq!(dec(b"u3:\xe2\x98\x83"), Value::from("\u{2603}"));
    }

    #[test]
    fn decode_composites() {
        assert_eq!(dec(b"l;"), Value::Sequence(vec![]));
        let nested = vec![Value::from(1), Value::from("a"), Value::Sequence(vec![])];
        assert_eq!(dec(b"li1;u1:al;;"), Value::Sequence(nested));
        let items = vec![Value::from(1), Value::Sequence(vec![]), Value::None];
        assert_eq!(dec(b"ti1;l;n;"), Value::Tuple(items));
        assert_eq!(dec(b"d;"), Value::Mapping(Mapping::new()));
    }

    #[test]
    fn decode_booleans_inside_composites() {
        assert_eq!(
            dec(b"lb1b0;"),
            Value::Sequence(vec![Value::from(true), Value::from(false)])
        );
        assert_eq!(
            dec(b"db1u5:hello;"),
            [(true, "hello")].into_iter().collect::<Value>()
        );
        assert_eq!(
            dec(b"db1b0;"),
            [(true, false)].into_iter().collect::<Value>()
        );
        assert_eq!(
            dec(b"ds8:messagesb1;"),
            [(b"messages", true)].into_iter().collect::<Value>()
        );
    }

    #[test]
    fn boolean_errors() {
        assert_eq!(
            decode(b"b").unwrap_err(),
            CodecError::corrupted(1, "missing boolean digit")
        );
        assert_eq!(
            decode(b"lb2;").unwrap_err(),
            CodecError::corrupted(2, "boolean must be 0 or 1")
        );
        // A stray terminator after a boolean closes the enclosing composite.
        assert_eq!(dec(b"lb1;;"), Value::Sequence(vec![Value::from(true)]));
    }

    #[test]
    fn duplicate_mapping_key_keeps_last() {
        let value = dec(b"du1:ai1;u1:ai2;;");
        assert_eq!(value.get(&Value::from("a")), Some(&Value::from(2)));
        assert_eq!(value.as_mapping().map(Mapping::len), Some(1));
    }

    #[test]
    fn round_trips() {
        let long: Integer = "99999999999999999999999999999".parse().unwrap();
        let values = [
            Value::from(long),
            Value::from(0.00005),
            Value::from(2.3),
            Value::from(f64::MAX),
            Value::from(f64::MIN_POSITIVE),
            Value::from(b"\x00;:\xff"),
            Value::from("\u{2603}"),
            Value::Sequence(vec![Value::Sequence(vec![Value::None])]),
            [(true, "hello")].into_iter().collect(),
            [(true, false)].into_iter().collect(),
        ];
        for value in &values {
            assert_eq!(&round_trip(value), value, "{value}");
        }
    }

    #[test]
    fn empty_input() {
        let err = decode(b"").unwrap_err();
        assert_eq!(err, CodecError::EmptyInput { offset: 0 });
    }

    #[test]
    fn unknown_tag() {
        assert_eq!(
            decode(b"zblah").unwrap_err(),
            CodecError::UnknownTag {
                tag: b'z',
                offset: 0
            }
        );
        assert_eq!(
            decode(b"li1;x;").unwrap_err(),
            CodecError::UnknownTag {
                tag: b'x',
                offset: 4
            }
        );
    }

    #[test]
    fn structural_errors() {
        for buf in [
            &b"i12"[..],
            b"i1x;",
            b"i;",
            b"b2",
            b"b;",
            b"b",
            b"f1.2.3;",
            b"f;",
            b"s5:abc",
            b"sx:abc",
            b"s3abc",
            b"l",
            b"li1;",
            b"t",
            b"d",
            b"du1:a;",
            b"du1:ai1;",
        ] {
            let err = decode(buf).unwrap_err();
            assert!(
                matches!(err, CodecError::CorruptedData { .. }),
                "{:?}: {err:?}",
                String::from_utf8_lossy(buf)
            );
        }
    }

    #[test]
    fn missing_mapping_value_is_empty_input() {
        assert_eq!(
            decode(b"du1:a").unwrap_err(),
            CodecError::EmptyInput { offset: 5 }
        );
    }

    #[test]
    fn invalid_utf8() {
        let err = decode(b"u2:\xc3\x28").unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8 { offset: 3, .. }));
    }

    #[test]
    fn trailing_bytes() {
        assert_eq!(dec(b"i1;garbage"), Value::from(1));

        let mut decoder = Decoder::default().reject_trailing(true);
        assert_eq!(
            decoder.decode(b"i1;garbage").unwrap_err(),
            CodecError::corrupted(3, "trailing bytes after message")
        );
        assert_eq!(decoder.decode(b"i1;").unwrap(), Value::from(1));
    }

    #[test]
    fn decode_prefix_reports_consumed() {
        let buf = b"u2:hil;n";
        let mut decoder = Decoder::default();
        let (first, used) = decoder.decode_prefix(buf).unwrap();
        assert_eq!((first, used), (Value::from("hi"), 5));
        let (second, next) = decoder.read_token(buf, used).unwrap();
        assert_eq!((second, next), (Value::Sequence(vec![]), 7));
        assert_eq!(decoder.read_token(buf, next).unwrap(), (Value::None, 8));
    }

    #[test]
    fn routine_contract_violation() {
        fn stuck(
            _: &mut Decoder<'_>,
            _: &[u8],
            pos: usize,
        ) -> Result<(Value, usize), CodecError> {
            Ok((Value::Sequence(vec![]), pos))
        }
        fn overrun(
            _: &mut Decoder<'_>,
            buf: &[u8],
            _: usize,
        ) -> Result<(Value, usize), CodecError> {
            Ok((Value::None, buf.len() + 1))
        }

        for routine in [stuck as DecodeFn, overrun] {
            let table = DecodeTable::empty().with(b's', routine);
            let err = decode_with(b"s3:foo", &table).unwrap_err();
            assert!(
                matches!(err, CodecError::CorruptedData { offset: 0, .. }),
                "{err:?}"
            );
        }
    }

    #[test]
    fn custom_tag() {
        // `x<len>:<payload>` read as text in addition to the standard tags.
        let table = DecodeTable::default().with(b'x', read_text);
        assert_eq!(
            decode_with(b"lx2:hiu2:hi;", &table).unwrap(),
            Value::Sequence(vec![Value::from("hi"), Value::from("hi")])
        );
        assert!(decode(b"lx2:hi;").is_err());
    }

    #[test]
    fn depth_limit() {
        let deep = [&[b'l'; 300][..], &[b';'; 300][..]].concat();
        assert_eq!(
            decode(&deep).unwrap_err(),
            CodecError::DepthLimitExceeded {
                limit: DEFAULT_MAX_DEPTH
            }
        );

        let mut decoder = Decoder::default().max_depth(400);
        let mut value = decoder.decode(&deep).unwrap();
        let mut levels = 0;
        while let Some([inner]) = value.as_sequence() {
            value = inner.clone();
            levels += 1;
        }
        assert_eq!(levels, 299);
        assert_eq!(value, Value::Sequence(vec![]));
    }

    #[test]
    fn decoding_is_repeatable() {
        let buf = b"ds8:messagesb1;";
        let table = DecodeTable::default();
        let first = decode_with(buf, &table).unwrap();
        let second = decode_with(buf, &table).unwrap();
        assert_eq!(first, second);
        assert!(table.tags().eq(DecodeTable::standard().tags()));
    }
}
