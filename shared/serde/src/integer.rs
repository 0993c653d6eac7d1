use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde, ConstBitLength,
};

pub type UnsignedInteger<const BITS: u8> = SerdeInteger<false, BITS>;
pub type UnsignedVariableInteger<const BITS: u8> = SerdeInteger<true, BITS>;

// This outer generic type wraps an inner type that is not generic, to reduce code bloat through monomorphization.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SerdeInteger<const VARIABLE: bool, const BITS: u8> {
    inner: SerdeIntegerInner,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
struct SerdeIntegerInner {
    inner_value: u64,
    variable: bool,
    bits: u8,
}

impl SerdeIntegerInner {
    fn new(variable: bool, bits: u8, value: u64) -> Self {
        if bits == 0 {
            panic!("can't create an integer with 0 bits...");
        }
        if bits > 63 {
            panic!("can't create an integer with more than 63 bits...");
        }

        if !variable {
            let max_value: u64 = 2_u64.pow(bits as u32);
            if value >= max_value {
                panic!(
                    "with {} bits, can't encode number greater than {}",
                    bits, max_value
                );
            }
        }

        Self {
            inner_value: value,
            variable,
            bits,
        }
    }

    fn get(&self) -> u64 {
        self.inner_value
    }

    fn ser(&self, writer: &mut dyn BitWrite) {
        let mut value = self.inner_value;

        if self.variable {
            loop {
                let proceed = value >= 2_u64.pow(self.bits as u32);
                writer.write_bit(proceed);
                for _ in 0..self.bits {
                    writer.write_bit(value & 1 != 0);
                    value >>= 1;
                }
                if !proceed {
                    return;
                }
            }
        } else {
            for _ in 0..self.bits {
                writer.write_bit(value & 1 != 0);
                value >>= 1;
            }
        }
    }

    fn de(reader: &mut BitReader, variable: bool, bits: u8) -> Result<Self, SerdeErr> {
        let mut output: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let proceed = if variable { reader.read_bit()? } else { false };

            for _ in 0..bits {
                if reader.read_bit()? {
                    if shift >= 64 {
                        return Err(SerdeErr);
                    }
                    output |= 1 << shift;
                }
                shift += 1;
            }

            if !proceed {
                return Ok(Self {
                    inner_value: output,
                    variable,
                    bits,
                });
            }
        }
    }

    fn bit_length(&self) -> u32 {
        if !self.variable {
            return self.bits as u32;
        }
        let mut output: u32 = 0;
        let mut value = self.inner_value;
        loop {
            let proceed = value >= 2_u64.pow(self.bits as u32);
            output += 1 + self.bits as u32;
            value >>= self.bits;
            if !proceed {
                break;
            }
        }
        output
    }
}

impl<const VARIABLE: bool, const BITS: u8> SerdeInteger<VARIABLE, BITS> {
    pub fn new<T: Into<u64>>(value: T) -> Self {
        Self {
            inner: SerdeIntegerInner::new(VARIABLE, BITS, value.into()),
        }
    }

    pub fn get(&self) -> u64 {
        self.inner.get()
    }
}

impl<const VARIABLE: bool, const BITS: u8> Serde for SerdeInteger<VARIABLE, BITS> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.inner.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let inner = SerdeIntegerInner::de(reader, VARIABLE, BITS)?;
        Ok(Self { inner })
    }

    fn bit_length(&self) -> u32 {
        self.inner.bit_length()
    }
}

impl<const BITS: u8> ConstBitLength for SerdeInteger<false, BITS> {
    fn const_bit_length() -> u32 {
        BITS as u32
    }
}

// Tests
