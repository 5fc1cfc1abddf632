/// Reasons a line could not be turned into a command. `Display` is the exact
/// text printed back to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error.")]
    Syntax,
    #[error("ID must be positive.")]
    NegativeId,
    #[error("String is too long.")]
    StringTooLong,
    #[error("Unrecognized command '{0}'")]
    UnrecognizedCommand(String),
    #[error("Unrecognized keyword at start of '{0}'.")]
    UnrecognizedStatement(String),
}
