//! Tag tables: the per-call dispatch data for encoding and decoding.
//!
//! An [`EncodeTable`] maps each [`ValueKind`] to the routine that writes it,
//! and a [`DecodeTable`] maps each tag byte to the routine that reads it.
//! The standard tables cover the nine built-in kinds; callers build modified
//! copies to add, drop, or reinterpret tags without touching the engine.

use std::fmt;
use std::sync::LazyLock;

use bytes::BytesMut;

use super::decode::{self, Decoder};
use super::encode::{self, Encoder};
use super::marker;
use crate::error::CodecError;
use crate::types::{Value, ValueKind};

/// Writes one value of the kind it is registered for.
pub type EncodeFn = fn(&mut Encoder<'_>, &Value, &mut BytesMut) -> Result<(), CodecError>;

/// Reads one token whose tag byte is at `pos`.
///
/// Must return the decoded value and the position just past the token.
pub type DecodeFn = fn(&mut Decoder<'_>, &[u8], usize) -> Result<(Value, usize), CodecError>;

static STANDARD_ENCODE: LazyLock<EncodeTable> = LazyLock::new(|| {
    EncodeTable::empty()
        .with(ValueKind::None, encode::write_none)
        .with(ValueKind::Boolean, encode::write_boolean)
        .with(ValueKind::Integer, encode::write_integer)
        .with(ValueKind::Float, encode::write_float)
        .with(ValueKind::Bytes, encode::write_bytes)
        .with(ValueKind::Text, encode::write_text)
        .with(ValueKind::Sequence, encode::write_sequence)
        .with(ValueKind::Tuple, encode::write_tuple)
        .with(ValueKind::Mapping, encode::write_mapping)
});

static STANDARD_DECODE: LazyLock<DecodeTable> = LazyLock::new(|| {
    DecodeTable::empty()
        .with(marker::NONE, decode::read_none)
        .with(marker::BOOLEAN, decode::read_boolean)
        .with(marker::INTEGER, decode::read_integer)
        .with(marker::FLOAT, decode::read_float)
        .with(marker::BYTES, decode::read_bytes)
        .with(marker::TEXT, decode::read_text)
        .with(marker::SEQUENCE, decode::read_sequence)
        .with(marker::TUPLE, decode::read_tuple)
        .with(marker::MAPPING, decode::read_mapping)
});

/// Maps value kinds to write routines.
#[derive(Clone)]
pub struct EncodeTable {
    routines: [Option<EncodeFn>; ValueKind::COUNT],
}

impl EncodeTable {
    /// A table with no routines; every value is unsupported.
    pub fn empty() -> Self {
        Self {
            routines: [None; ValueKind::COUNT],
        }
    }

    /// The process-wide standard table.
    pub fn standard() -> &'static Self {
        &STANDARD_ENCODE
    }

    pub fn get(&self, kind: ValueKind) -> Option<EncodeFn> {
        self.routines[kind.index()]
    }

    pub fn contains(&self, kind: ValueKind) -> bool {
        self.get(kind).is_some()
    }

    /// Registers `routine` for `kind`, returning the routine it replaces.
    pub fn insert(&mut self, kind: ValueKind, routine: EncodeFn) -> Option<EncodeFn> {
        let previous = self.routines[kind.index()].replace(routine);
        if previous.is_some() {
            tracing::trace!(%kind, "replaced encode routine");
        }
        previous
    }

    pub fn remove(&mut self, kind: ValueKind) -> Option<EncodeFn> {
        self.routines[kind.index()].take()
    }

    pub fn with(mut self, kind: ValueKind, routine: EncodeFn) -> Self {
        self.insert(kind, routine);
        self
    }

    pub fn without(mut self, kind: ValueKind) -> Self {
        self.remove(kind);
        self
    }

    /// Kinds that have a routine registered.
    pub fn kinds(&self) -> impl Iterator<Item = ValueKind> + '_ {
        ValueKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

impl Default for EncodeTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

impl fmt::Debug for EncodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}

/// Maps tag bytes to read routines.
#[derive(Clone)]
pub struct DecodeTable {
    routines: [Option<DecodeFn>; 256],
}

impl DecodeTable {
    /// A table with no routines; every tag is unknown.
    pub fn empty() -> Self {
        Self {
            routines: [None; 256],
        }
    }

    /// The process-wide standard table.
    pub fn standard() -> &'static Self {
        &STANDARD_DECODE
    }

    pub fn get(&self, tag: u8) -> Option<DecodeFn> {
        self.routines[usize::from(tag)]
    }

    pub fn contains(&self, tag: u8) -> bool {
        self.get(tag).is_some()
    }

    /// Registers `routine` for `tag`, returning the routine it replaces.
    pub fn insert(&mut self, tag: u8, routine: DecodeFn) -> Option<DecodeFn> {
        let previous = self.routines[usize::from(tag)].replace(routine);
        if previous.is_some() {
            tracing::trace!(tag = %char::from(tag), "replaced decode routine");
        }
        previous
    }

    pub fn remove(&mut self, tag: u8) -> Option<DecodeFn> {
        self.routines[usize::from(tag)].take()
    }

    pub fn with(mut self, tag: u8, routine: DecodeFn) -> Self {
        self.insert(tag, routine);
        self
    }

    pub fn without(mut self, tag: u8) -> Self {
        self.remove(tag);
        self
    }

    /// Tag bytes that have a routine registered, in ascending order.
    pub fn tags(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|t| self.contains(*t))
    }
}

impl Default for DecodeTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

impl fmt::Debug for DecodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.tags().map(char::from))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tables_cover_every_kind() {
        let encode = EncodeTable::standard();
        assert!(ValueKind::ALL.iter().all(|k| encode.contains(*k)));

        let tags: Vec<u8> = DecodeTable::standard().tags().collect();
        assert_eq!(tags, b"bdfilnstu");
    }

    #[test]
    fn empty_tables() {
        assert_eq!(EncodeTable::empty().kinds().count(), 0);
        assert_eq!(DecodeTable::empty().tags().count(), 0);
    }

    #[test]
    fn overrides_do_not_touch_the_standard_table() {
        let custom = DecodeTable::default()
            .without(marker::FLOAT)
            .with(b'x', decode::read_bytes);
        assert!(!custom.contains(marker::FLOAT));
        assert!(custom.contains(b'x'));
        assert!(DecodeTable::standard().contains(marker::FLOAT));
        assert!(!DecodeTable::standard().contains(b'x'));

        let custom = EncodeTable::default().without(ValueKind::Float);
        assert!(!custom.contains(ValueKind::Float));
        assert!(EncodeTable::standard().contains(ValueKind::Float));
    }

    #[test]
    fn insert_returns_previous() {
        let mut table = DecodeTable::empty();
        assert!(table.insert(b's', decode::read_bytes).is_none());
        assert!(table.insert(b's', decode::read_text).is_some());
        assert!(table.remove(b's').is_some());
        assert!(table.remove(b's').is_none());
    }

    #[test]
    fn debug_lists_keys() {
        let table = DecodeTable::empty().with(b'n', decode::read_none);
        assert_eq!(format!("{table:?}"), "{'n'}");
        let write_none: EncodeFn = encode::write_none;
        let table = EncodeTable::empty().with(ValueKind::None, write_none);
        assert_eq!(format!("{table:?}"), "{None}");
    }
}
