use std::io::{BufRead, Write};

use rustyline::{DefaultEditor, error::ReadlineError};

use crate::types::error::DatabaseError;

/// Source of input lines for a session.
///
/// `Ok(None)` means end of input.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write)
    -> Result<Option<String>, DatabaseError>;
}

/// Reads lines from any buffered reader. The prompt is written to `out` so
/// piped sessions produce the same transcript as interactive ones.
pub struct StreamReader<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: BufRead> StreamReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
        }
    }
}

impl<R: BufRead> LineReader for StreamReader<R> {
    fn read_line(
        &mut self,
        prompt: &str,
        out: &mut dyn Write,
    ) -> Result<Option<String>, DatabaseError> {
        out.write_all(prompt.as_bytes())?;
        out.flush()?;

        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(None);
        }
        // Bytes that are not UTF-8 still reach the parser, which rejects the line.
        let line = String::from_utf8_lossy(&self.buffer);
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

/// Line editing and history for terminals.
pub struct InteractiveReader {
    editor: DefaultEditor,
}

impl InteractiveReader {
    pub fn new() -> Result<Self, DatabaseError> {
        let editor = DefaultEditor::new().map_err(readline_error)?;
        Ok(Self { editor })
    }
}

impl LineReader for InteractiveReader {
    fn read_line(
        &mut self,
        prompt: &str,
        out: &mut dyn Write,
    ) -> Result<Option<String>, DatabaseError> {
        out.flush()?;
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor
                        .add_history_entry(line.as_str())
                        .map_err(readline_error)?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(err) => Err(readline_error(err)),
        }
    }
}

fn readline_error(err: ReadlineError) -> DatabaseError {
    match err {
        ReadlineError::Io(io_err) => DatabaseError::Io(io_err),
        other => DatabaseError::Input {
            details: other.to_string(),
        },
    }
}
