pub mod instant;
pub mod timer;
