pub mod command;
pub mod config;
pub mod executor;
pub mod repl;
pub mod storage;
pub mod types;
pub mod utils;
