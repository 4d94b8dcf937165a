//! Error types and error handling for the code generator.
//!
//! This module defines the internal errors raised while translating a
//! resolved tree. It includes:
//!
//! - Error structures carrying the source location of the offending node
//! - Specific error variants for malformed trees and malformed emitted code
//! - A structural dump of the node that caused the failure
//! - Helpful error names and tips for developer-facing diagnostics
//!
//! None of these are user errors: they point at a defect in an earlier
//! compiler phase and the driver is expected to abort on them.

pub mod errors;

#[cfg(test)]
mod tests;
