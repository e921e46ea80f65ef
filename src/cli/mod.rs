//! # CLI Module
//!
//! Command-line entry point for the `firstapp` binary.
//!
//! Every flag can also come from the environment, so the same binary runs
//! unchanged under a process manager:
//!
//! | Flag | Env | Default |
//! |---|---|---|
//! | `--addr` | `FIRSTAPP_ADDR` | `0.0.0.0:443` |
//! | `--tls-cert` | `FIRSTAPP_TLS_CERT` | `cert.pem` |
//! | `--tls-key` | `FIRSTAPP_TLS_KEY` | `key.pem` |
//! | `--insecure-http` | `FIRSTAPP_INSECURE_HTTP` | off |
//!
//! ```bash
//! firstapp --addr 127.0.0.1:8443 --tls-cert certs/cert.pem --tls-key certs/key.pem
//! firstapp --insecure-http --addr 127.0.0.1:8080
//! ```

mod commands;


pub use commands::{run, start, Cli};
