pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);
    fn write_byte(&mut self, byte: u8);
    fn count_bits(&mut self, bits: u32);
    fn is_counter(&self) -> bool;

    fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }
}

/// A growable bit writer. Bits are packed least-significant first, so a
/// byte written on a byte boundary lands in the buffer unchanged.
pub struct BitWriter {
    scratch: u8,
    scratch_index: u8,
    buffer: Vec<u8>,
    bits_written: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            scratch: 0,
            scratch_index: 0,
            buffer: Vec::with_capacity(bytes),
            bits_written: 0,
        }
    }

    fn flush_scratch(&mut self) {
        if self.scratch_index > 0 {
            let byte = (self.scratch << (8 - self.scratch_index)).reverse_bits();
            self.buffer.push(byte);
            self.scratch = 0;
            self.scratch_index = 0;
        }
    }

    pub fn to_bytes(mut self) -> Box<[u8]> {
        self.flush_scratch();
        self.buffer.into_boxed_slice()
    }

    pub fn bits_written(&self) -> u32 {
        self.bits_written
    }

    /// Number of bytes `to_bytes` would currently produce
    pub fn byte_length(&self) -> usize {
        self.buffer.len() + usize::from(self.scratch_index > 0)
    }

    pub fn counter(&self) -> BitCounter {
        BitCounter::new()
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        self.scratch <<= 1;

        if bit {
            self.scratch |= 1;
        }

        self.scratch_index += 1;
        self.bits_written += 1;

        if self.scratch_index >= 8 {
            self.buffer.push(self.scratch.reverse_bits());
            self.scratch_index = 0;
            self.scratch = 0;
        }
    }

    fn write_byte(&mut self, byte: u8) {
        if self.scratch_index == 0 {
            self.buffer.push(byte);
            self.bits_written += 8;
            return;
        }
        let mut temp = byte;
        for _ in 0..8 {
            self.write_bit(temp & 1 != 0);
            temp >>= 1;
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        if self.scratch_index == 0 {
            self.buffer.extend_from_slice(bytes);
            self.bits_written += (bytes.len() as u32) * 8;
            return;
        }
        for byte in bytes {
            self.write_byte(*byte);
        }
    }

    fn count_bits(&mut self, _bits: u32) {
        // the writer grows as needed
    }

    fn is_counter(&self) -> bool {
        false
    }
}

/// Counts the bits a value would take without writing them anywhere
pub struct BitCounter {
    bits: u32,
}

impl BitCounter {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn bits_needed(&self) -> u32 {
        self.bits
    }
}

impl Default for BitCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitCounter {
    fn write_bit(&mut self, _: bool) {
        self.bits += 1;
    }

    fn write_byte(&mut self, _: u8) {
        self.bits += 8;
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.bits += (bytes.len() as u32) * 8;
    }

    fn count_bits(&mut self, bits: u32) {
        self.bits += bits;
    }

    fn is_counter(&self) -> bool {
        true
    }
}
