//! Slice lookup, assignment and deletion.
//!
//! Targets with native slicing take integer bounds directly when both bounds
//! are absent or small integer constants. Everything else goes through
//! object bounds or, without native slicing, a subscript with a slice object.

use crate::{ast::ast::NodeId, errors::errors::Error};

use super::{
    context::Context,
    expr::{gen_expression, gen_optional_expression},
    generator::CodeGenerator,
    identifier::Identifier,
};

/// Whether the indexed fast path applies to the bounds.
pub fn decide_slicing(generator: &CodeGenerator, lower: Option<NodeId>, upper: Option<NodeId>) -> bool {
    let indexable = |bound: Option<NodeId>| bound.map_or(true, |bound| generator.tree.is_indexable(bound));

    generator.options.slicing_available() && indexable(lower) && indexable(upper)
}

fn gen_index(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    bound: Option<NodeId>,
    absent: String,
) -> Result<String, Error> {
    let emitter = generator.emitter;

    let Some(bound) = bound else {
        return Ok(absent);
    };

    match generator.tree.constant(bound).and_then(|constant| constant.as_small_index()) {
        Some(value) => Ok(emitter.get_index_value_code(value)),
        None => {
            let identifier = gen_expression(generator, context, bound)?;
            Ok(emitter.get_index_code(&identifier))
        }
    }
}

fn gen_indexes(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    lower: Option<NodeId>,
    upper: Option<NodeId>,
) -> Result<(String, String), Error> {
    let emitter = generator.emitter;
    let lower = gen_index(generator, context, lower, emitter.get_min_index_code())?;
    let upper = gen_index(generator, context, upper, emitter.get_max_index_code())?;

    Ok((lower, upper))
}

fn gen_slice_object(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    lower: Option<NodeId>,
    upper: Option<NodeId>,
) -> Result<Identifier, Error> {
    let lower = gen_optional_expression(generator, context, lower)?;
    let upper = gen_optional_expression(generator, context, upper)?;

    Ok(generator
        .emitter
        .get_slice_object_code(lower.as_ref(), upper.as_ref(), None))
}

pub fn gen_slice_lookup(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    source: NodeId,
    lower: Option<NodeId>,
    upper: Option<NodeId>,
) -> Result<Identifier, Error> {
    let emitter = generator.emitter;
    let source = gen_expression(generator, context, source)?;

    if decide_slicing(generator, lower, upper) {
        let (lower, upper) = gen_indexes(generator, context, lower, upper)?;
        return Ok(emitter.get_slice_lookup_indexes_code(&source, &lower, &upper));
    }

    if generator.options.slicing_available() {
        let lower = gen_optional_expression(generator, context, lower)?;
        let upper = gen_optional_expression(generator, context, upper)?;
        return Ok(emitter.get_slice_lookup_code(&source, lower.as_ref(), upper.as_ref()));
    }

    let subscript = gen_slice_object(generator, context, lower, upper)?;
    Ok(emitter.get_subscript_lookup_code(&source, &subscript))
}

pub fn gen_slice_assignment(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    target: NodeId,
    lower: Option<NodeId>,
    upper: Option<NodeId>,
    value: &Identifier,
) -> Result<String, Error> {
    let emitter = generator.emitter;
    let target = gen_expression(generator, context, target)?;

    if decide_slicing(generator, lower, upper) {
        let (lower, upper) = gen_indexes(generator, context, lower, upper)?;
        return Ok(emitter.get_slice_assignment_indexes_code(&target, &lower, &upper, value));
    }

    if generator.options.slicing_available() {
        let lower = gen_optional_expression(generator, context, lower)?;
        let upper = gen_optional_expression(generator, context, upper)?;
        return Ok(emitter.get_slice_assignment_code(&target, lower.as_ref(), upper.as_ref(), value));
    }

    let subscript = gen_slice_object(generator, context, lower, upper)?;
    Ok(emitter.get_subscript_assignment_code(&target, &subscript, value))
}

/// Deletion has no object-bound native form, so only the indexed fast path
/// avoids the slice object.
pub fn gen_slice_del(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    target: NodeId,
    lower: Option<NodeId>,
    upper: Option<NodeId>,
) -> Result<String, Error> {
    let emitter = generator.emitter;
    let target = gen_expression(generator, context, target)?;

    if decide_slicing(generator, lower, upper) {
        let (lower, upper) = gen_indexes(generator, context, lower, upper)?;
        return Ok(emitter.get_slice_del_code(&target, &lower, &upper));
    }

    let subscript = gen_slice_object(generator, context, lower, upper)?;
    Ok(emitter.get_subscript_del_code(&target, &subscript))
}
