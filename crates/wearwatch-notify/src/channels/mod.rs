pub mod jsonl;
pub mod log;
