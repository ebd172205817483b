pub mod event;
pub mod event_batch;
pub mod event_log;
pub mod event_replicator;
pub mod event_sender;
pub mod event_sync_state;
pub mod game_rules;
pub mod request_queue;
