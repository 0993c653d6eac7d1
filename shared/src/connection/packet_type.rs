// An enum representing the different types of packets that can be
// sent/received

use strokesync_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr, UnsignedInteger};

#[derive(Copy, Debug, Clone, Eq, PartialEq)]
pub enum PacketType {
    // A single encoded command node that fits in one frame
    Command,
    // One frame of a chunked payload
    Chunk,
    // Acknowledges a consumed history batch
    Ack,
}

impl Serde for PacketType {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let index = match self {
            PacketType::Command => 0,
            PacketType::Chunk => 1,
            PacketType::Ack => 2,
        };

        UnsignedInteger::<2>::new(index as u8).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match UnsignedInteger::<2>::de(reader)?.get() {
            0 => Ok(PacketType::Command),
            1 => Ok(PacketType::Chunk),
            2 => Ok(PacketType::Ack),
            // SECURITY: Malicious or malformed packets could send invalid indices.
            // Return error instead of panicking to prevent DoS attacks.
            _ => Err(SerdeErr),
        }
    }

    fn bit_length(&self) -> u32 {
        <UnsignedInteger<2> as ConstBitLength>::const_bit_length()
    }
}
