//! # strokesync-serde
//! Bit-level reader/writer and the `Serde` trait shared by every strokesync
//! wire record.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
mod impls;
mod integer;
mod serde;

pub use bit_reader::BitReader;
pub use bit_writer::{BitCounter, BitWrite, BitWriter};
pub use error::SerdeErr;
pub use integer::{SerdeInteger, UnsignedInteger, UnsignedVariableInteger};
pub use serde::{ConstBitLength, Serde};
