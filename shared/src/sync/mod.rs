pub mod entity_types;
pub mod replicated_entities;
pub mod state_update;
pub mod state_update_reader;
pub mod state_update_writer;
pub mod sync_state;
