use crate::{
    command::{Command, MetaCommand, Statement, error::ParseError},
    types::{COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, row::Row},
};

pub struct CommandParser;

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses one input line. Surrounding whitespace is ignored, and error
    /// messages quote the trimmed line.
    pub fn parse(&self, line: &str) -> Result<Command, ParseError> {
        let line = line.trim();
        if line.starts_with('.') {
            return MetaCommand::from_keyword(line)
                .map(Command::Meta)
                .ok_or_else(|| ParseError::UnrecognizedCommand(line.to_string()));
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("insert") => self.parse_insert(tokens.collect()),
            Some("select") => match tokens.next() {
                None => Ok(Command::Statement(Statement::Select)),
                Some(_) => Err(ParseError::Syntax),
            },
            _ => Err(ParseError::UnrecognizedStatement(line.to_string())),
        }
    }

    fn parse_insert(&self, args: Vec<&str>) -> Result<Command, ParseError> {
        let [id, username, email] = args.as_slice() else {
            return Err(ParseError::Syntax);
        };

        let id = parse_id(id)?;
        if username.len() > COLUMN_USERNAME_SIZE || email.len() > COLUMN_EMAIL_SIZE {
            return Err(ParseError::StringTooLong);
        }

        Ok(Command::Statement(Statement::Insert(Row::new(
            id, *username, *email,
        ))))
    }
}

/// Ids are decimal `u32`. A minus sign followed by digits is reported as a
/// negative id rather than a syntax error.
fn parse_id(token: &str) -> Result<u32, ParseError> {
    if let Some(digits) = token.strip_prefix('-') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::NegativeId);
        }
        return Err(ParseError::Syntax);
    }
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::Syntax);
    }
    token.parse::<u32>().map_err(|_| ParseError::Syntax)
}
