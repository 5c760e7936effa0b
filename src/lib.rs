//! bpickle — a pure-Rust codec for the bpickle tagged serialization format.
//!
//! bpickle is a compact, self-delimiting encoding for a fixed set of value
//! kinds: arbitrary-precision integers, floats, booleans, none, byte strings,
//! text, sequences, tuples and mappings. It is exchanged with peers that
//! emit the same format, so decoding follows the peer's grammar exactly.
//!
//! # Architecture
//!
//! - **`types`** — `Value`, `Integer` and `ValueKind`
//! - **`wire`** — Tag grammar, encoder, decoder and the overridable tag tables
//! - **`error`** — `CodecError`
//!
//! ```
//! use bpickle::{Value, decode, encode};
//!
//! let message: Value = [(Value::from(b"messages"), Value::from(true))]
//!     .into_iter()
//!     .collect();
//! let bytes = encode(&message)?;
//! assert_eq!(&bytes[..], b"ds8:messagesb1;");
//! assert_eq!(decode(&bytes)?, message);
//! # Ok::<(), bpickle::CodecError>(())
//! ```

pub mod error;
pub mod types;
pub mod wire;

pub use error::CodecError;
pub use types::{Integer, Mapping, Value, ValueKind};
pub use wire::{DecodeTable, EncodeTable, decode, decode_with, encode, encode_with};
