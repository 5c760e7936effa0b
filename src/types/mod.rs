//! bpickle value types.

mod integer;
mod value;

pub use integer::{Integer, ParseIntegerError};
pub use value::{Mapping, Value, ValueKind};
