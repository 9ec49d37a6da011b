//! Tests for the global options.

use super::parse;
use clap::Parser;
use crate::cli::CliCommand;
use std::path::Path;

#[test]
fn cli_defaults() {
    let cli = parse(&["remotestash", "pull"]);
    assert!(!cli.opts.local);
    assert!(!cli.opts.verbose);
    assert!(cli.opts.content_type.is_none());
    assert!(cli.opts.name.is_none());
    assert!(cli.opts.port.is_none());
    assert!(cli.opts.output.is_none());
    assert!(cli.opts.dir.is_none());
    assert!(cli.opts.timeout_ms.is_none());
}

#[test]
fn cli_short_flags_after_command() {
    let cli = parse(&[
        "remotestash",
        "push",
        "page.html",
        "-c",
        "text/html",
        "-l",
        "-v",
        "-d",
        "/tmp/stash",
    ]);
    match cli.command {
        CliCommand::Push { file } => assert_eq!(file.as_deref(), Some(Path::new("page.html"))),
        _ => panic!("expected Push"),
    }
    assert_eq!(cli.opts.content_type.as_deref(), Some("text/html"));
    assert!(cli.opts.local);
    assert!(cli.opts.verbose);
    assert_eq!(cli.opts.dir.as_deref(), Some(Path::new("/tmp/stash")));
}

#[test]
fn cli_long_flags_before_command() {
    let cli = parse(&[
        "remotestash",
        "--name",
        "kitchen",
        "--port",
        "8443",
        "--timeout-ms",
        "500",
        "serve",
    ]);
    assert!(matches!(cli.command, CliCommand::Serve));
    assert_eq!(cli.opts.name.as_deref(), Some("kitchen"));
    assert_eq!(cli.opts.port, Some(8443));
    assert_eq!(cli.opts.timeout_ms, Some(500));
}

#[test]
fn cli_output_file() {
    let cli = parse(&["remotestash", "pull", "-o", "out.png"]);
    assert_eq!(cli.opts.output.as_deref(), Some(Path::new("out.png")));
}

#[test]
fn cli_rejects_bad_port() {
    assert!(super::Cli::try_parse_from(["remotestash", "serve", "-p", "99999"]).is_err());
}
