use crate::handlers::{AppState, ENDPOINTS};
use crate::registry::build_service;
use crate::runtime_config::RuntimeConfig;
use crate::server::{load_server_config, HttpServer, ServerHandle, TlsServer};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Command-line interface for the firstapp API server
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "firstapp", version)]
#[command(about = "HTTPS JSON API over in-memory user records", long_about = None)]
pub struct Cli {
    /// Address and port to bind the server to
    #[arg(long, env = "FIRSTAPP_ADDR", default_value = "0.0.0.0:443")]
    pub addr: String,

    /// PEM certificate chain presented to clients
    #[arg(long, env = "FIRSTAPP_TLS_CERT", default_value = "cert.pem")]
    pub tls_cert: PathBuf,

    /// PEM private key matching the certificate
    #[arg(long, env = "FIRSTAPP_TLS_KEY", default_value = "key.pem")]
    pub tls_key: PathBuf,

    /// Serve plain HTTP instead of HTTPS (development only)
    #[arg(long, env = "FIRSTAPP_INSECURE_HTTP", default_value_t = false)]
    pub insecure_http: bool,
}

/// Start the server described by `cli` on a fresh seeded store.
///
/// `started_at` is the process start time reported as health-check uptime.
///
/// # Errors
///
/// Fails if the TLS material cannot be loaded or the address cannot be bound.
pub fn start(cli: &Cli, runtime: RuntimeConfig, started_at: Instant) -> Result<ServerHandle> {
    let service = build_service(&AppState::seeded().with_start_time(started_at))?;

    let handle = if cli.insecure_http {
        warn!(addr = %cli.addr, "Serving plain HTTP; TLS is disabled");
        HttpServer(service)
            .start(cli.addr.as_str())
            .with_context(|| format!("binding {}", cli.addr))?
    } else {
        let tls_config = load_server_config(&cli.tls_cert, &cli.tls_key)?;
        TlsServer::new(service, tls_config, runtime)
            .start(cli.addr.as_str())
            .with_context(|| format!("binding {}", cli.addr))?
    };

    let scheme = if cli.insecure_http { "http" } else { "https" };
    info!(
        addr = %handle.addr(),
        scheme = scheme,
        stack_size = runtime.stack_size,
        "Server listening"
    );
    for endpoint in ENDPOINTS {
        info!(endpoint = endpoint, "Endpoint available");
    }
    Ok(handle)
}

/// Start the server and block until it stops.
///
/// # Errors
///
/// Returns startup failures, or an error if the server coroutine panicked.
pub fn run(cli: &Cli, runtime: RuntimeConfig, started_at: Instant) -> Result<()> {
    let handle = start(cli, runtime, started_at)?;
    handle
        .join()
        .map_err(|e| anyhow!("Server failed: {e:?}"))
}
