pub mod command_node;
pub mod operation;
