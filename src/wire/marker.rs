//! bpickle tag and delimiter bytes.

// Scalars. Integers and floats are `;`-terminated, booleans are `b0`/`b1`
// and none is the bare tag.
pub const INTEGER: u8 = b'i';
pub const FLOAT: u8 = b'f';
pub const BOOLEAN: u8 = b'b';
pub const NONE: u8 = b'n';

// Length-prefixed: <tag><len>:<payload>
pub const BYTES: u8 = b's';
pub const TEXT: u8 = b'u';

// Composites, closed by TERMINATOR
pub const SEQUENCE: u8 = b'l';
pub const TUPLE: u8 = b't';
pub const MAPPING: u8 = b'd';

/// Closes integer and float fields and composites.
pub const TERMINATOR: u8 = b';';

/// Separates a length prefix from its payload.
pub const LENGTH_SEPARATOR: u8 = b':';

pub const BOOL_FALSE: u8 = b'0';
pub const BOOL_TRUE: u8 = b'1';
