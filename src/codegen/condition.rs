use crate::{
    ast::{
        ast::NodeId,
        expressions::{Expr, Operator},
    },
    errors::errors::Error,
};

use super::{context::Context, expr::gen_expression, generator::CodeGenerator};

/// Translates an expression used as a branch condition into a target
/// boolean expression.
///
/// Constants fold, comparisons use the boolean form directly, `not`
/// flips the inversion instead of emitting a negation of its operand.
pub fn gen_condition(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    node: NodeId,
    inverted: bool,
) -> Result<String, Error> {
    let tree = generator.tree;
    let emitter = generator.emitter;

    if let Some(constant) = tree.constant(node) {
        return Ok(if constant.truth() ^ inverted {
            emitter.get_true_expression_code()
        } else {
            emitter.get_false_expression_code()
        });
    }

    let result = match tree.expr(node) {
        Some(Expr::Comparison {
            comparator,
            left,
            right,
        }) => {
            let left = gen_expression(generator, context, *left)?;
            let right = gen_expression(generator, context, *right)?;
            let condition = emitter.get_comparison_expression_bool_code(*comparator, &left, &right);

            if inverted {
                emitter.get_condition_not_bool_code(&condition)
            } else {
                condition
            }
        }
        Some(Expr::BoolOr { operands }) | Some(Expr::BoolAnd { operands }) => {
            let parts = operands
                .iter()
                .map(|operand| gen_condition(generator, context, *operand, false))
                .collect::<Result<Vec<String>, Error>>()?;

            let condition = if matches!(tree.expr(node), Some(Expr::BoolOr { .. })) {
                emitter.get_condition_or_code(&parts)
            } else {
                emitter.get_condition_and_code(&parts)
            };

            if inverted {
                emitter.get_condition_not_bool_code(&condition)
            } else {
                condition
            }
        }
        Some(Expr::Operation {
            operator: Operator::Not,
            operands,
        }) if operands.len() == 1 => gen_condition(generator, context, operands[0], !inverted)?,
        _ => {
            let value = gen_expression(generator, context, node)?;

            if inverted {
                emitter.get_condition_check_false_code(&value)
            } else {
                emitter.get_condition_check_true_code(&value)
            }
        }
    };

    Ok(result)
}
