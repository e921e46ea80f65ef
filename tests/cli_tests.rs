//! CLI parsing as seen by the `firstapp` binary.

use clap::Parser;
use firstapp::cli::Cli;
use std::path::PathBuf;

#[test]
fn test_defaults() {
    // Env-backed flags: skip the check if the environment overrides them.
    if ["FIRSTAPP_ADDR", "FIRSTAPP_TLS_CERT", "FIRSTAPP_TLS_KEY", "FIRSTAPP_INSECURE_HTTP"]
        .iter()
        .any(|k| std::env::var_os(k).is_some())
    {
        return;
    }
    let cli = Cli::try_parse_from(["firstapp"]).unwrap();
    assert_eq!(cli.addr, "0.0.0.0:443");
    assert_eq!(cli.tls_cert, PathBuf::from("cert.pem"));
    assert_eq!(cli.tls_key, PathBuf::from("key.pem"));
    assert!(!cli.insecure_http);
}

#[test]
fn test_help_and_version() {
    let help = Cli::try_parse_from(["firstapp", "--help"]).unwrap_err();
    assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    let rendered = help.to_string();
    assert!(rendered.contains("--tls-cert"));
    assert!(rendered.contains("--insecure-http"));

    let version = Cli::try_parse_from(["firstapp", "--version"]).unwrap_err();
    assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
}
