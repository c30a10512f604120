//! Sensitive field vault for the tax portal.
//!
//! Encrypts Social Security numbers and direct-deposit bank numbers at the
//! column level, validates them before storage, masks them on the way out,
//! and reveals full values only to callers the [`disclosure`] gate approves.

pub mod config;
pub mod crypto;
pub mod disclosure;
pub mod fields;
pub mod keys;
pub mod server;
pub mod telemetry;
pub mod vault;
