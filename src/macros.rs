//! Utility macros for the translator.
//!
//! This module defines helper macros used throughout the crate:
//!
//! - `MK_IDENTIFIER!` - Creates an Identifier with a given ownership category
//! - `MK_INTERNAL_ERROR!` - Creates an Error for a node, logs it and attaches the node dump
//!
//! These macros reduce boilerplate in the emitter and the code generator.

/// Creates an Identifier instance.
///
/// # Arguments
///
/// * `$code` - The code text, anything convertible into a `String`
/// * `$ref_count` - One of `Constant`, `Borrowed` or `Owned`
///
/// # Example
///
/// ```ignore
/// let identifier = MK_IDENTIFIER!(format!("LOOKUP_ATTRIBUTE( {}, {} )", source, name), Owned);
/// ```
#[macro_export]
macro_rules! MK_IDENTIFIER {
    ($code:expr, $ref_count:ident) => {
        $crate::codegen::identifier::Identifier::new(
            $code,
            $crate::codegen::identifier::RefCount::$ref_count,
        )
    };
}

/// Creates an internal Error located at a tree node.
///
/// The error is logged through `tracing` and carries the structural dump of
/// the offending node so the failure can be diagnosed from the report alone.
///
/// # Arguments
///
/// * `$tree` - The Tree owning the node
/// * `$node` - The NodeId the error is about
/// * `$error_impl` - The ErrorImpl variant
///
/// # Example
///
/// ```ignore
/// return Err(MK_INTERNAL_ERROR!(tree, node, ErrorImpl::NotAStatement { node: name }));
/// ```
#[macro_export]
macro_rules! MK_INTERNAL_ERROR {
    ($tree:expr, $node:expr, $error_impl:expr) => {{
        let error = $crate::errors::errors::Error::new(
            $error_impl,
            $tree.source_ref($node).clone(),
        )
        .with_dump($tree.dump($node));
        ::tracing::error!(
            "{} at {}",
            error.get_internal_error(),
            error.get_source_ref()
        );
        error
    }};
}
