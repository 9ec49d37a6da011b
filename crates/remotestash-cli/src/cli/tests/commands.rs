//! Tests for each subcommand.

use super::parse;
use clap::Parser;
use crate::cli::CliCommand;
use std::path::Path;

#[test]
fn cli_parse_serve() {
    assert!(matches!(parse(&["remotestash", "serve"]).command, CliCommand::Serve));
}

#[test]
fn cli_parse_push_stdin() {
    match parse(&["remotestash", "push"]).command {
        CliCommand::Push { file } => assert!(file.is_none()),
        _ => panic!("expected Push"),
    }
}

#[test]
fn cli_parse_push_file() {
    match parse(&["remotestash", "push", "notes.txt"]).command {
        CliCommand::Push { file } => assert_eq!(file.as_deref(), Some(Path::new("notes.txt"))),
        _ => panic!("expected Push with file"),
    }
}

#[test]
fn cli_parse_pull_last_list_status_listen() {
    assert!(matches!(parse(&["remotestash", "pull"]).command, CliCommand::Pull));
    assert!(matches!(parse(&["remotestash", "last"]).command, CliCommand::Last));
    assert!(matches!(parse(&["remotestash", "list"]).command, CliCommand::List));
    assert!(matches!(parse(&["remotestash", "status"]).command, CliCommand::Status));
    assert!(matches!(parse(&["remotestash", "listen"]).command, CliCommand::Listen));
}

#[test]
fn cli_rejects_unknown_command() {
    assert!(super::Cli::try_parse_from(["remotestash", "frobnicate"]).is_err());
}

#[test]
fn cli_requires_a_command() {
    assert!(super::Cli::try_parse_from(["remotestash"]).is_err());
}
