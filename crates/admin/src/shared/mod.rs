pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod list_state;
pub mod logger;
pub mod mutation;
pub mod sequencer;
