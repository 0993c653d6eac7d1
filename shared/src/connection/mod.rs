pub mod error;
pub mod packet;
pub mod packet_type;
pub mod peer_connection;
