//! `pii-vault` binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing + optional OTLP).
//! 3. Build both vaults. Keys are named here but decoded on first use.
//! 4. Build the Axum router and serve plain HTTP or TLS.

use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use pii_vault::config::Config;
use pii_vault::keys::KeyCell;
use pii_vault::server::state::{AppState, IdentityHeaders};
use pii_vault::server::{router, tls};
use pii_vault::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    telemetry::init_telemetry(cfg.otlp_endpoint(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.listen_port,
        "pii-vault starting"
    );

    let identity = IdentityHeaders::new(&cfg.subject_header_name, &cfg.role_header_name)?;
    warn!("using the in-memory row store; vault records do not survive a restart");
    let state = AppState::in_memory(
        KeyCell::from_env(&cfg.ssn_key_env),
        KeyCell::from_env(&cfg.bank_key_env),
        identity,
    );
    let app = router::build(state, Duration::from_secs(cfg.request_timeout_secs));

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    match cfg.tls_paths() {
        Some((cert, key)) => {
            let tls_config = tls::load_server_config(cert, key).await?;
            info!(addr = %addr, "listening (tls)");
            tls::serve(listener, app, tls_config).await?;
        }
        None => {
            info!(addr = %addr, "listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
