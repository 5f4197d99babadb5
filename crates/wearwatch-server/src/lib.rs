pub mod config;
pub mod coordinator;
pub mod engine;
pub mod ingest;
pub mod output;
