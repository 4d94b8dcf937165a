//! Code generation for resolved trees.
//!
//! The generator walks the tree and asks an `Emitter` for every piece of
//! target text. It handles:
//!
//! - Expressions, conditions and slices
//! - Statements, including the try/except and raise variants
//! - Function and class bodies with their nested declarations
//! - Module translation and program assembly
//!
//! `cpp` holds the reference emitter.

pub mod condition;
pub mod context;
pub mod cpp;
pub mod emitter;
pub mod expr;
pub mod functions;
pub mod generator;
pub mod identifier;
pub mod names;
pub mod slices;
pub mod stmt;

#[cfg(test)]
mod tests;
