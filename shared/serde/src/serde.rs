use crate::{
    bit_reader::BitReader,
    bit_writer::{BitCounter, BitWrite},
    error::SerdeErr,
};

/// A type that can be written to and read back from a bit stream
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the given writer
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Reads a value back out of the reader
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` would write
    fn bit_length(&self) -> u32 {
        let mut counter = BitCounter::new();
        self.ser(&mut counter);
        counter.bits_needed()
    }
}

/// Implemented by types whose encoding always takes the same number of bits
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}
