//! Typed 128-bit identifiers.
//!
//! Each wraps a random UUIDv4 so ids minted independently on different peers
//! never collide. On the wire they are a raw `u128`; in logs they print as
//! standard UUID text.

use std::fmt;

use strokesync_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};
use uuid::Uuid;

/// Identifies one replicated command
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CommandId(Uuid);

/// Identifies one chunked transfer
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct StreamId(Uuid);

/// Identifies one history batch sent during backfill
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct BatchId(Uuid);

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Mint a fresh random id
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }

            pub fn to_u128(&self) -> u128 {
                self.0.as_u128()
            }

            /// First 8 hex characters, for log lines only
            pub fn short(&self) -> String {
                self.0.as_simple().to_string()[..8].to_string()
            }
        }

        impl From<Uuid> for $T {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.short())
            }
        }

        impl Serde for $T {
            fn ser(&self, writer: &mut dyn BitWrite) {
                self.to_u128().ser(writer);
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                Ok(Self::from_u128(u128::de(reader)?))
            }

            fn bit_length(&self) -> u32 {
                <Self as ConstBitLength>::const_bit_length()
            }
        }

        impl ConstBitLength for $T {
            fn const_bit_length() -> u32 {
                128
            }
        }
    };
}

impl_typed_id!(CommandId, "CommandId");
impl_typed_id!(StreamId, "StreamId");
impl_typed_id!(BatchId, "BatchId");
