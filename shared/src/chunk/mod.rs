pub mod chunk_frame;
pub mod chunk_receiver;
pub mod chunk_splitter;
pub mod error;
