/// How history batches are compressed before chunking
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompressionMode {
    /// Batches are framed but sent uncompressed
    Disabled,
    /// zstd at the given compression level
    Default(i32),
    /// zstd at the given level with a pre-trained dictionary. Both peers
    /// must be configured with the same dictionary.
    Dictionary(i32, Vec<u8>),
}

impl Default for CompressionMode {
    fn default() -> Self {
        CompressionMode::Default(3)
    }
}
