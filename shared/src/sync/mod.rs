pub mod history;
pub mod history_batch;
pub mod sync_config;
pub mod sync_scheduler;
pub mod sync_session;
