//! Tree optimizations run before code generation.
//!
//! Submodules:
//! - raises: Raise propagation and unreachable statement removal

use crate::{ast::ast::Tree, config::Options};

pub mod raises;


/// Runs the optimizations until none of them changes the tree.
///
/// # Arguments
///
/// * `tree` - The tree to rewrite in place
/// * `options` - Bounds the number of passes
///
/// # Returns
///
/// * `usize` - The number of passes that changed the tree
pub fn optimize_to_fixed_point(tree: &mut Tree, options: &Options) -> usize {
    let mut passes = 0;

    while passes < options.max_optimization_passes {
        if !raises::optimize_raises(tree) {
            break;
        }
        passes += 1;
    }

    if passes == options.max_optimization_passes {
        tracing::warn!("optimization stopped after {} passes", passes);
    } else {
        tracing::debug!("optimization finished after {} passes", passes);
    }

    passes
}
