use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, integer::UnsignedVariableInteger,
    serde::Serde, ConstBitLength,
};

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

macro_rules! impl_serde_for_unsigned {
    ($type:ty) => {
        impl Serde for $type {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_bytes(&self.to_le_bytes());
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let mut bytes = [0u8; std::mem::size_of::<$type>()];
                for byte in bytes.iter_mut() {
                    *byte = reader.read_byte()?;
                }
                Ok(<$type>::from_le_bytes(bytes))
            }

            fn bit_length(&self) -> u32 {
                <Self as ConstBitLength>::const_bit_length()
            }
        }

        impl ConstBitLength for $type {
            fn const_bit_length() -> u32 {
                (std::mem::size_of::<$type>() as u32) * 8
            }
        }
    };
}

impl_serde_for_unsigned!(u8);
impl_serde_for_unsigned!(u16);
impl_serde_for_unsigned!(u32);
impl_serde_for_unsigned!(u64);
impl_serde_for_unsigned!(u128);

impl Serde for f32 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.to_bits().ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(f32::from_bits(u32::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        32
    }
}

impl<const N: usize> Serde for [u8; N] {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bytes(self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let bytes = reader.read_bytes(N)?;
        bytes.try_into().map_err(|_| SerdeErr)
    }

    fn bit_length(&self) -> u32 {
        (N as u32) * 8
    }
}

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<9>::new(self.len() as u64).ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = UnsignedVariableInteger::<9>::de(reader)?.get();
        let length = usize::try_from(length).map_err(|_| SerdeErr)?;
        // each element takes at least one bit, so a larger count is garbage
        if length > reader.bits_remaining() {
            return Err(SerdeErr);
        }
        let mut output = Vec::with_capacity(length);
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}

/// Raw byte blobs carry a fixed 32-bit length prefix
impl Serde for Box<[u8]> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        (self.len() as u32).ser(writer);
        writer.write_bytes(self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = u32::de(reader)? as usize;
        Ok(reader.read_bytes(length)?.into_boxed_slice())
    }

    fn bit_length(&self) -> u32 {
        32 + (self.len() as u32) * 8
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.len() as u64).ser(writer);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = UnsignedVariableInteger::<7>::de(reader)?.get();
        let length = usize::try_from(length).map_err(|_| SerdeErr)?;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes).map_err(|_| SerdeErr)
    }
}
