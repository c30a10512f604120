//! Structured logging and optional OTLP trace export.
//!
//! # Telemetry invariants
//!
//! - **No plaintext SSNs, bank numbers, or key material** in any span
//!   attribute or log field. Record ids, subject ids, roles, and reveal ids
//!   are the only identifiers logged.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
