pub mod input;

use std::{io::Write, path::Path};

use tracing::{debug, error, warn};

use crate::{
    command::{Command, MetaCommand, Statement, parser::CommandParser},
    config::{DatabaseConfig, FlushPolicy},
    executor::insert::{Inserter, TableInserter},
    repl::input::LineReader,
    storage::bplus_tree::BPlusTree,
    types::{
        ROW_SIZE,
        error::DatabaseError,
        page::{
            COMMON_NODE_HEADER_SIZE, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE,
            LEAF_NODE_MAX_CELLS, LEAF_NODE_SPACE_FOR_CELLS,
        },
    },
};

pub const PROMPT: &str = "cqlite > ";
pub const BANNER: &str = "CQlite.....\nThis is just a database built to learn....\n";

const STATEMENT_HELP: [(&str, &str); 2] = [
    ("insert <id> <username> <email>", "Insert a row"),
    ("select", "Print every row in id order"),
];

fn write_help(out: &mut dyn Write) -> Result<(), DatabaseError> {
    writeln!(out, "Commands:")?;
    for (usage, description) in STATEMENT_HELP {
        writeln!(out, "  {:<32}{}", usage, description)?;
    }
    for meta in MetaCommand::ALL {
        writeln!(out, "  {:<32}{}", meta.keyword(), meta.description())?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Terminated(ExitStatus),
}

/// One open table plus the dispatcher state around it.
pub struct Session {
    tree: BPlusTree,
    parser: CommandParser,
    flush_policy: FlushPolicy,
    state: SessionState,
}

impl Session {
    pub fn new(tree: BPlusTree, config: &DatabaseConfig) -> Self {
        Self {
            tree,
            parser: CommandParser::new(),
            flush_policy: config.flush_policy,
            state: SessionState::Running,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tree_mut(&mut self) -> &mut BPlusTree {
        &mut self.tree
    }

    /// Parses and executes one line, writing the response to `out`.
    ///
    /// Recoverable failures are reported on `out` and leave the session
    /// running. Fatal ones terminate it with [`ExitStatus::Failure`].
    pub fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> Result<(), DatabaseError> {
        if self.state != SessionState::Running || line.trim().is_empty() {
            return Ok(());
        }

        let command = match self.parser.parse(line) {
            Ok(command) => command,
            Err(parse_error) => {
                writeln!(out, "{}", parse_error)?;
                return Ok(());
            }
        };

        match self.execute(command, out) {
            Ok(()) => Ok(()),
            Err(e) if !e.is_fatal() => {
                writeln!(out, "{}", error_message(&e))?;
                Ok(())
            }
            Err(e) => self.fail(e, out),
        }
    }

    fn execute(&mut self, command: Command, out: &mut dyn Write) -> Result<(), DatabaseError> {
        match command {
            Command::Meta(MetaCommand::Exit) => self.finish(),
            Command::Meta(MetaCommand::BTree) => {
                let dump = self.tree.debug_dump()?;
                out.write_all(dump.as_bytes())?;
                Ok(())
            }
            Command::Meta(MetaCommand::Constants) => {
                writeln!(out, "Constants:")?;
                writeln!(out, "ROW_SIZE: {}", ROW_SIZE)?;
                writeln!(out, "COMMON_NODE_HEADER_SIZE: {}", COMMON_NODE_HEADER_SIZE)?;
                writeln!(out, "LEAF_NODE_HEADER_SIZE: {}", LEAF_NODE_HEADER_SIZE)?;
                writeln!(out, "LEAF_NODE_CELL_SIZE: {}", LEAF_NODE_CELL_SIZE)?;
                writeln!(out, "LEAF_NODE_SPACE_FOR_CELLS: {}", LEAF_NODE_SPACE_FOR_CELLS)?;
                writeln!(out, "LEAF_NODE_MAX_CELLS: {}", LEAF_NODE_MAX_CELLS)?;
                Ok(())
            }
            Command::Meta(MetaCommand::Help) => write_help(out),
            Command::Statement(Statement::Insert(row)) => {
                TableInserter::new(&mut self.tree, self.flush_policy).insert(&row)?;
                writeln!(out, "Executed.")?;
                Ok(())
            }
            Command::Statement(Statement::Select) => {
                for row in self.tree.scan_ascending() {
                    writeln!(out, "{}", row?)?;
                }
                writeln!(out, "Executed.")?;
                Ok(())
            }
        }
    }

    /// Flushes and terminates successfully, as on `.exit` or end of input.
    pub fn finish(&mut self) -> Result<(), DatabaseError> {
        self.tree.flush()?;
        debug!("session finished");
        self.state = SessionState::Terminated(ExitStatus::Success);
        Ok(())
    }

    /// Reports a fatal error, saves what can be saved, and terminates with a
    /// final bare prompt.
    pub fn fail(&mut self, err: DatabaseError, out: &mut dyn Write) -> Result<(), DatabaseError> {
        error!(error = %err, "fatal error, terminating session");
        self.state = SessionState::Terminated(ExitStatus::Failure);
        if let Err(flush_err) = self.tree.flush() {
            warn!(error = %flush_err, "failed to flush pages after fatal error");
        }
        writeln!(out, "{}", error_message(&err))?;
        out.write_all(PROMPT.as_bytes())?;
        Ok(())
    }
}

/// The line printed for an engine error.
pub fn error_message(err: &DatabaseError) -> String {
    match err {
        DatabaseError::DuplicateKey { .. } => "Error: Duplicate key.".to_string(),
        DatabaseError::TableFull { .. } => "Error: Table full.".to_string(),
        DatabaseError::ValueTooLong { .. } => "String is too long.".to_string(),
        other => format!("Error: {}", other),
    }
}

/// Runs a whole session against the database at `path`: banner, prompt loop,
/// and shutdown. Returns the status the process should exit with.
pub fn run<R: LineReader>(
    path: &Path,
    config: &DatabaseConfig,
    reader: &mut R,
    out: &mut dyn Write,
) -> ExitStatus {
    match run_session(path, config, reader, out) {
        Ok(status) => status,
        Err(err) => {
            error!(error = %err, "session aborted");
            // Output itself may be what failed; nothing left to report to.
            let _ = writeln!(out, "{}", error_message(&err));
            let _ = out.flush();
            ExitStatus::Failure
        }
    }
}

fn run_session<R: LineReader>(
    path: &Path,
    config: &DatabaseConfig,
    reader: &mut R,
    out: &mut dyn Write,
) -> Result<ExitStatus, DatabaseError> {
    out.write_all(BANNER.as_bytes())?;

    let tree = match BPlusTree::open(path, config) {
        Ok(tree) => tree,
        Err(err) => {
            error!(error = %err, path = %path.display(), "failed to open database");
            writeln!(out, "{}", error_message(&err))?;
            out.flush()?;
            return Ok(ExitStatus::Failure);
        }
    };
    let mut session = Session::new(tree, config);

    loop {
        if let SessionState::Terminated(status) = session.state() {
            out.flush()?;
            return Ok(status);
        }

        match reader.read_line(PROMPT, out) {
            Ok(Some(line)) => session.handle_line(&line, out)?,
            Ok(None) => {
                if let Err(err) = session.finish() {
                    session.fail(err, out)?;
                }
            }
            Err(err) => session.fail(err, out)?,
        }
    }
}
