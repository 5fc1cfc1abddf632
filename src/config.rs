use std::path::PathBuf;

use clap::Parser;

use crate::types::{
    TABLE_MAX_PAGES,
    page::{INTERNAL_NODE_MAX_KEYS, MIN_INTERNAL_MAX_KEYS},
};

/// When dirty pages are written back to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Only on `.exit`, end of input, or a fatal error.
    OnExit,
    /// After every successful insert.
    Eager,
}

/// Options the engine needs, independent of how they were supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub max_pages: u32,
    /// Fan-out for a newly created file; an existing file keeps its own.
    pub internal_max_keys: u32,
    pub flush_policy: FlushPolicy,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_pages: TABLE_MAX_PAGES,
            internal_max_keys: INTERNAL_NODE_MAX_KEYS as u32,
            flush_policy: FlushPolicy::OnExit,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cqlite", version, about = "A tiny single-table database on a paged B-tree")]
pub struct Cli {
    #[arg(help = "Database file, created if it does not exist")]
    pub path: PathBuf,

    #[arg(
        long,
        default_value_t = TABLE_MAX_PAGES,
        value_parser = clap::value_parser!(u32).range(2..),
        help = "Maximum number of pages in the file, header page included"
    )]
    pub max_pages: u32,

    #[arg(
        long,
        default_value_t = INTERNAL_NODE_MAX_KEYS as u32,
        value_parser = clap::value_parser!(u32)
            .range(MIN_INTERNAL_MAX_KEYS as i64..=INTERNAL_NODE_MAX_KEYS as i64),
        help = "Maximum keys per internal node, only used when creating a file"
    )]
    pub internal_max_keys: u32,

    #[arg(long, help = "Write pages to disk after every insert instead of only on exit")]
    pub eager_flush: bool,
}

impl Cli {
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            max_pages: self.max_pages,
            internal_max_keys: self.internal_max_keys,
            flush_policy: if self.eager_flush {
                FlushPolicy::Eager
            } else {
                FlushPolicy::OnExit
            },
        }
    }
}
