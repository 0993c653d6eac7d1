/// Handle the application's transport layer assigns to a connected peer
pub type PeerId = u64;

/// Milliseconds on the authoring peer's session clock
pub type Timestamp = u64;

/// Which of a peer's two inbound streams a command arrived on. Each stream
/// owns its own pending set, so live edits and history replay never block
/// each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceStream {
    Live,
    History,
}
