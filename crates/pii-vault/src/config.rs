//! Configuration loading and validation for the vault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any variable is present but invalid.
//! Key material itself is never read here; only the names of the variables
//! that hold it.

use std::path::Path;

use anyhow::{Context, Result};
use axum::http::HeaderName;
use serde::Deserialize;

/// Validated vault service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP(S) server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Environment variable holding the SSN column key.
    #[serde(default = "default_ssn_key_env")]
    pub ssn_key_env: String,

    /// Environment variable holding the banking column key.
    #[serde(default = "default_bank_key_env")]
    pub bank_key_env: String,

    /// Trusted header carrying the authenticated subject id.
    #[serde(default = "default_subject_header")]
    pub subject_header_name: String,

    /// Trusted header carrying the caller's role claim.
    #[serde(default = "default_role_header")]
    pub role_header_name: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// PEM certificate chain. TLS is enabled when both paths are set.
    pub tls_cert_path: Option<String>,

    /// PEM private key.
    pub tls_key_path: Option<String>,

    /// OTLP collector endpoint. Span export is disabled when unset.
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_ssn_key_env() -> String {
    "SSN_ENCRYPTION_KEY".into()
}
fn default_bank_key_env() -> String {
    "BANKING_ENCRYPTION_KEY".into()
}
fn default_subject_header() -> String {
    "X-Subject-Id".into()
}
fn default_role_header() -> String {
    "X-Subject-Role".into()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Certificate and key paths, when TLS is configured.
    pub fn tls_paths(&self) -> Option<(&Path, &Path)> {
        match (non_blank(&self.tls_cert_path), non_blank(&self.tls_key_path)) {
            (Some(cert), Some(key)) => Some((Path::new(cert), Path::new(key))),
            _ => None,
        }
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        non_blank(&self.otel_exporter_otlp_endpoint)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.ssn_key_env, "SSN_KEY_ENV")?;
        ensure_non_empty(&self.bank_key_env, "BANK_KEY_ENV")?;
        ensure_header_name(&self.subject_header_name, "SUBJECT_HEADER_NAME")?;
        ensure_header_name(&self.role_header_name, "ROLE_HEADER_NAME")?;

        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        if non_blank(&self.tls_cert_path).is_some() != non_blank(&self.tls_key_path).is_some() {
            anyhow::bail!("TLS_CERT_PATH and TLS_KEY_PATH must be set together");
        }
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

fn ensure_header_name(value: &str, name: &str) -> Result<()> {
    HeaderName::try_from(value)
        .map(|_| ())
        .with_context(|| format!("{name} is not a valid HTTP header name: {value:?}"))
}
