//! AST (Abstract Syntax Tree) module
//!
//! The resolved tree handed over by the front-end, stored in an arena.
//!
//! Submodules:
//! - ast: The Tree arena, node kinds and navigation
//! - expressions: Expression node kinds
//! - statements: Statement node kinds, handlers and modules
//! - constants: Constant values
//! - variables: Resolved variables
//! - properties: Static properties such as side effects and abortativeness
//! - builder: Bottom-up tree construction
pub mod ast;
pub mod builder;
pub mod constants;
pub mod expressions;
pub mod properties;
pub mod statements;
pub mod variables;

#[cfg(test)]
mod tests;
