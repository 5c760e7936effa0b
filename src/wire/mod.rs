//! The bpickle wire format.
//!
//! A message is a single tagged token. Integers and floats are `;`-terminated
//! and a boolean is its tag plus one digit. Byte and text strings carry a
//! decimal byte-length prefix. Composites hold nested tokens closed by `;`:
//!
//! | Token | Kind |
//! |---|---|
//! | `i<digits>;` | integer |
//! | `f<text>;` | float |
//! | `b0` / `b1` | boolean |
//! | `n` | none |
//! | `s<len>:<bytes>` | byte string |
//! | `u<len>:<utf8>` | text |
//! | `l<items>;` | sequence |
//! | `t<items>;` | tuple |
//! | `d<key value ...>;` | mapping |

pub mod cursor;
pub mod decode;
pub mod encode;
pub mod marker;
pub mod table;

pub use decode::{Decoder, decode, decode_with};
pub use encode::{Encoder, encode, encode_value, encode_with};
pub use table::{DecodeFn, DecodeTable, EncodeFn, EncodeTable};

/// Default nesting limit for both encoding and decoding.
pub const DEFAULT_MAX_DEPTH: usize = 256;
