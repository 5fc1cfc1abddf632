pub mod error;
pub mod parser;

use crate::types::row::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Meta(MetaCommand),
    Statement(Statement),
}

/// Lines starting with `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    BTree,
    Constants,
    Help,
}

impl MetaCommand {
    pub const ALL: [MetaCommand; 4] = [
        MetaCommand::BTree,
        MetaCommand::Constants,
        MetaCommand::Help,
        MetaCommand::Exit,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            MetaCommand::Exit => ".exit",
            MetaCommand::BTree => ".btree",
            MetaCommand::Constants => ".constants",
            MetaCommand::Help => ".help",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MetaCommand::Exit => "Save and quit",
            MetaCommand::BTree => "Print the tree structure",
            MetaCommand::Constants => "Print the page layout constants",
            MetaCommand::Help => "Show this message",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            ".exit" => Some(MetaCommand::Exit),
            ".btree" => Some(MetaCommand::BTree),
            ".constants" => Some(MetaCommand::Constants),
            ".help" => Some(MetaCommand::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}
