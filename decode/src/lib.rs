//! The Value Decoder (component A, §4.A): converts one source-encoded
//! value into a destination literal (SQL mode) or a destination-typed
//! field (tuple mode).

pub mod bitstring;
pub mod bytea;
pub mod geometry;
pub mod numeric;
pub mod temporal;
pub mod value;

pub use value::{decode_value, DecodeInput, DestinationClass};
