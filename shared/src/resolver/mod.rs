pub mod command_resolver;
pub mod command_sink;
pub mod error;
pub mod pending_set;
