//! Pure helpers for sensitive numeric fields: validation and masking.
//!
//! # Module invariants
//!
//! - **No crypto or storage dependencies.** Everything here is a pure
//!   function of its input.

pub mod mask;
pub mod validate;

pub use validate::ValidationError;
