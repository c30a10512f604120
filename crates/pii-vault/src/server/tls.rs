//! TLS termination with rustls.
//!
//! Used when `TLS_CERT_PATH` and `TLS_KEY_PATH` are both configured. Otherwise
//! the service expects a TLS-terminating proxy in front and serves plain HTTP.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use rustls::ServerConfig;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tower::ServiceExt;
use tracing::{debug, warn};

/// Build a [`rustls::ServerConfig`] from PEM-encoded certificate and private key bytes.
///
/// # Errors
///
/// Returns an error if the certificate or key cannot be parsed, or if rustls
/// rejects the configuration.
pub fn build_server_config(cert_pem: &[u8], key_pem: &[u8]) -> Result<Arc<ServerConfig>> {
    let certs = rustls_pemfile::certs(&mut std::io::BufReader::new(cert_pem))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to parse TLS certificate chain")?;
    if certs.is_empty() {
        anyhow::bail!("no certificates found in PEM data");
    }

    let key = rustls_pemfile::private_key(&mut std::io::BufReader::new(key_pem))
        .context("failed to read TLS private key")?
        .context("no private key found in PEM data")?;

    let mut config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .context("no usable TLS protocol versions")?
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .context("failed to build rustls ServerConfig")?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

/// Read the PEM files at `cert_path` and `key_path` and build a server config.
///
/// # Errors
///
/// Returns an error if either file cannot be read or parsed.
pub async fn load_server_config(cert_path: &Path, key_path: &Path) -> Result<Arc<ServerConfig>> {
    let cert = tokio::fs::read(cert_path)
        .await
        .with_context(|| format!("failed to read {}", cert_path.display()))?;
    let key = tokio::fs::read(key_path)
        .await
        .with_context(|| format!("failed to read {}", key_path.display()))?;
    build_server_config(&cert, &key)
}

/// Accept TLS connections on `listener` and serve `router` over HTTP/1.1 or
/// HTTP/2. Runs until the process exits.
pub async fn serve(listener: TcpListener, router: Router, config: Arc<ServerConfig>) -> Result<()> {
    let acceptor = TlsAcceptor::from(config);
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
                continue;
            }
        };

        let acceptor = acceptor.clone();
        let router = router.clone();
        tokio::spawn(async move {
            let tls = match acceptor.accept(stream).await {
                Ok(tls) => tls,
                Err(e) => {
                    debug!(peer = %peer, error = %e, "TLS handshake failed");
                    return;
                }
            };

            let service = hyper::service::service_fn(move |req: hyper::Request<Incoming>| {
                router.clone().oneshot(req)
            });
            let result = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(tls), service)
                .await;
            if let Err(e) = result {
                debug!(peer = %peer, error = %e, "connection closed with error");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_cert_pem() {
        let result = build_server_config(b"", b"");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_garbage_pem() {
        let result = build_server_config(b"not a pem", b"also not a pem");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_files_are_reported() {
        let err = load_server_config(
            Path::new("/nonexistent/pii-vault/tls.crt"),
            Path::new("/nonexistent/pii-vault/tls.key"),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("tls.crt"));
    }
}
