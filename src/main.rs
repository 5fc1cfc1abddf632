use std::{
    io::{self, IsTerminal},
    process::ExitCode,
};

use clap::Parser;
use cqlite::{
    config::Cli,
    repl::{
        self, ExitStatus,
        input::{InteractiveReader, StreamReader},
    },
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = cli.database_config();
    let mut stdout = io::stdout().lock();

    let status = if io::stdin().is_terminal() {
        match InteractiveReader::new() {
            Ok(mut reader) => repl::run(&cli.path, &config, &mut reader, &mut stdout),
            Err(err) => {
                eprintln!("Error: {}", err);
                ExitStatus::Failure
            }
        }
    } else {
        let mut reader = StreamReader::new(io::stdin().lock());
        repl::run(&cli.path, &config, &mut reader, &mut stdout)
    };

    ExitCode::from(status.code())
}
