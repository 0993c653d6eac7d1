pub mod local_transport;
pub mod recording_sink;
pub mod test_session;

pub use command_tree::{compound, stroke_with_points, tree_from_parents};
pub use local_transport::LocalTransport;
pub use recording_sink::RecordingSink;
pub use test_session::{TestPeer, TestSession};

/// Install a test logger once. Honors `RUST_LOG`.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
