use cqlite::{
    command::{Command, MetaCommand, Statement, error::ParseError, parser::CommandParser},
    types::row::Row,
};

fn parse(line: &str) -> Result<Command, ParseError> {
    CommandParser::new().parse(line)
}

#[test]
fn test_meta_commands() {
    assert_eq!(parse(".exit").unwrap(), Command::Meta(MetaCommand::Exit));
    assert_eq!(parse(".btree").unwrap(), Command::Meta(MetaCommand::BTree));
    assert_eq!(parse(".constants").unwrap(), Command::Meta(MetaCommand::Constants));
    assert_eq!(parse(".help").unwrap(), Command::Meta(MetaCommand::Help));
    assert_eq!(parse("  .exit  ").unwrap(), Command::Meta(MetaCommand::Exit));
}

#[test]
fn test_meta_keyword_roundtrip() {
    for meta in MetaCommand::ALL {
        assert_eq!(MetaCommand::from_keyword(meta.keyword()), Some(meta));
    }
}

#[test]
fn test_unrecognized_meta_command() {
    let err = parse(".foo").unwrap_err();
    assert_eq!(err, ParseError::UnrecognizedCommand(".foo".to_string()));
    assert_eq!(err.to_string(), "Unrecognized command '.foo'");

    assert!(matches!(
        parse(".exit now"),
        Err(ParseError::UnrecognizedCommand(_))
    ));
}

#[test]
fn test_insert_statement() {
    assert_eq!(
        parse("insert 1 user1 person1@example.com").unwrap(),
        Command::Statement(Statement::Insert(Row::new(
            1,
            "user1",
            "person1@example.com"
        )))
    );
}

#[test]
fn test_insert_with_extra_whitespace() {
    assert_eq!(
        parse("insert   42\tbob   bob@example.com ").unwrap(),
        Command::Statement(Statement::Insert(Row::new(42, "bob", "bob@example.com")))
    );
}

#[test]
fn test_insert_wrong_argument_count() {
    assert_eq!(parse("insert"), Err(ParseError::Syntax));
    assert_eq!(parse("insert 1 user1"), Err(ParseError::Syntax));
    assert_eq!(parse("insert 1 a b c"), Err(ParseError::Syntax));
}

#[test]
fn test_insert_negative_id() {
    let err = parse("insert -1 cstack foo@bar.com").unwrap_err();
    assert_eq!(err, ParseError::NegativeId);
    assert_eq!(err.to_string(), "ID must be positive.");
}

#[test]
fn test_insert_invalid_id() {
    assert_eq!(parse("insert abc user email"), Err(ParseError::Syntax));
    assert_eq!(parse("insert 1.5 user email"), Err(ParseError::Syntax));
    assert_eq!(parse("insert - user email"), Err(ParseError::Syntax));
    assert_eq!(parse("insert 4294967296 user email"), Err(ParseError::Syntax));
}

#[test]
fn test_insert_boundary_ids() {
    assert!(parse("insert 0 user email").is_ok());
    assert!(parse("insert 4294967295 user email").is_ok());
}

#[test]
fn test_insert_string_too_long() {
    let long_username = "a".repeat(33);
    let long_email = "a".repeat(256);

    let err = parse(&format!("insert 1 {} foo@bar.com", long_username)).unwrap_err();
    assert_eq!(err, ParseError::StringTooLong);
    assert_eq!(err.to_string(), "String is too long.");
    assert_eq!(
        parse(&format!("insert 1 user {}", long_email)),
        Err(ParseError::StringTooLong)
    );
}

#[test]
fn test_insert_maximum_length_strings() {
    let line = format!("insert 1 {} {}", "a".repeat(32), "a".repeat(255));
    assert!(parse(&line).is_ok());
}

#[test]
fn test_select_statement() {
    assert_eq!(parse("select").unwrap(), Command::Statement(Statement::Select));
    assert_eq!(parse("select *"), Err(ParseError::Syntax));
}

#[test]
fn test_unrecognized_statement() {
    let err = parse("delete 1").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnrecognizedStatement("delete 1".to_string())
    );
    assert_eq!(err.to_string(), "Unrecognized keyword at start of 'delete 1'.");

    assert!(matches!(
        parse("INSERT 1 a b"),
        Err(ParseError::UnrecognizedStatement(_))
    ));
    assert!(matches!(
        parse("inserted 1 a b"),
        Err(ParseError::UnrecognizedStatement(_))
    ));
}

#[test]
fn test_syntax_error_text() {
    assert_eq!(ParseError::Syntax.to_string(), "Syntax error.");
}
