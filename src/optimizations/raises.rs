//! Raise propagation.
//!
//! Expressions that unconditionally raise are lifted upwards through the
//! operations, calls and statements that would evaluate them, keeping the
//! side effects of what was evaluated before. Statements following a raise
//! statement are unreachable and dropped.

use crate::{
    ast::{
        ast::{NodeId, NodeKind, Tree},
        expressions::Expr,
        statements::Stmt,
    },
    SourceRef,
};

/// Three-valued answer of a static exception match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriState {
    True,
    False,
    Unknown,
}

fn signal_change(tags: &str, source_ref: &SourceRef, message: &str) {
    tracing::debug!(tags = tags, "{}: {}", source_ref, message);
}

/// The builtin exception a raised type names, by reference or creation.
fn raised_exception_name(tree: &Tree, raised: NodeId) -> Option<&str> {
    match tree.expr(raised) {
        Some(Expr::BuiltinExceptionRef { exception_name })
        | Some(Expr::BuiltinMakeException { exception_name, .. }) => Some(exception_name.as_str()),
        _ => None,
    }
}

fn caught_exception_name(tree: &Tree, caught: NodeId) -> Option<&str> {
    match tree.expr(caught) {
        Some(Expr::BuiltinExceptionRef { exception_name }) => Some(exception_name.as_str()),
        _ => None,
    }
}

/// Decides statically whether a handler catching `caught` catches `raised`.
///
/// Builtin exceptions compare by name only. A bare handler catches
/// everything.
///
/// # Arguments
///
/// * `tree` - The tree holding the nodes
/// * `caught` - The handler's exception type expressions
/// * `raised` - The raised type expression, `None` for a re-raise
///
/// # Returns
///
/// * `TriState` - `True` or `False` when decidable, `Unknown` otherwise
pub fn match_exception(tree: &Tree, caught: &[NodeId], raised: Option<NodeId>) -> TriState {
    if caught.is_empty() {
        return TriState::True;
    }

    let Some(raised_name) = raised.and_then(|raised| raised_exception_name(tree, raised)) else {
        return TriState::Unknown;
    };

    let caught_names: Vec<Option<&str>> = caught
        .iter()
        .map(|caught| caught_exception_name(tree, *caught))
        .collect();

    if caught_names.contains(&Some(raised_name)) {
        return TriState::True;
    }

    if caught_names.iter().all(Option::is_some) {
        TriState::False
    } else {
        TriState::Unknown
    }
}

fn is_raise_expression(tree: &Tree, node: NodeId) -> bool {
    matches!(tree.expr(node), Some(Expr::RaiseException { .. }))
}

/// Parents through which a raise expression propagates.
fn is_trimmable_parent(tree: &Tree, node: NodeId) -> bool {
    match tree.kind(node) {
        NodeKind::Expr(Expr::Operation { .. }) | NodeKind::Expr(Expr::Call { .. }) => true,
        NodeKind::Stmt(Stmt::Print { .. })
        | NodeKind::Stmt(Stmt::ExpressionOnly { .. })
        | NodeKind::Stmt(Stmt::RaiseException { .. }) => true,
        _ => false,
    }
}

/// Cuts the evaluation of `parent` at its first raising child.
fn trim_evaluation(tree: &mut Tree, parent: NodeId) -> bool {
    let mut evaluated = Vec::new();
    let mut raise = None;

    for child in tree.children(parent) {
        if is_raise_expression(tree, child) {
            raise = Some(child);
            break;
        }
        evaluated.push(child);
    }

    let Some(raise) = raise else {
        return false;
    };

    // Statements are only replaced inside a sequence.
    if tree.is_statement(parent)
        && !matches!(
            tree.parent(parent).map(|grand_parent| tree.kind(grand_parent)),
            Some(NodeKind::Sequence(_))
        )
    {
        return false;
    }

    let side_effects: Vec<NodeId> = evaluated
        .into_iter()
        .filter(|child| tree.may_have_side_effects(*child))
        .collect();

    if !side_effects.is_empty() {
        if let Some(Expr::RaiseException {
            side_effects: existing,
            ..
        }) = tree.expr_mut(raise)
        {
            existing.splice(0..0, side_effects.iter().copied());
        }
        for side_effect in &side_effects {
            tree.adopt(raise, *side_effect);
        }
    }

    let source_ref = tree.source_ref(parent).clone();

    if tree.is_expression(parent) {
        tree.replace_with(parent, raise);

        signal_change(
            "new_raise",
            &source_ref,
            "Detected expression exception was propagated to expression upwards.",
        );
        return true;
    }

    let Some(Expr::RaiseException {
        exception_type,
        exception_value,
        side_effects,
    }) = tree.expr(raise).cloned()
    else {
        return false;
    };

    let mut statements = Vec::with_capacity(side_effects.len() + 1);
    for side_effect in side_effects {
        let side_effect_ref = tree.source_ref(side_effect).clone();
        statements.push(tree.add(
            NodeKind::Stmt(Stmt::ExpressionOnly {
                expression: side_effect,
            }),
            side_effect_ref,
        ));
    }
    let raise_ref = tree.source_ref(raise).clone();
    statements.push(tree.add(
        NodeKind::Stmt(Stmt::RaiseException {
            exception_type: Some(exception_type),
            exception_value,
            exception_trace: None,
        }),
        raise_ref,
    ));

    if !tree.splice_in_sequence(parent, statements) {
        return false;
    }

    signal_change(
        "new_raise new_statements",
        &source_ref,
        "Detected expression exception was converted to raise exception statement.",
    );
    true
}

/// Looks at a raise statement opening a try block.
///
/// Replacing the try statement with the matching handler's branch is not
/// done; a definite match is only reported.
fn inspect_raise_in_try(tree: &Tree, statement: NodeId, sequence: NodeId) {
    let Some(try_statement) = tree.parent(sequence) else {
        return;
    };
    let Some(Stmt::TryExcept { tried, handlers, .. }) = tree.stmt(try_statement) else {
        return;
    };
    if *tried != sequence {
        return;
    }

    let Some(Stmt::RaiseException { exception_type, .. }) = tree.stmt(statement) else {
        return;
    };

    for handler in handlers {
        let Some(handler) = tree.handler(*handler) else {
            continue;
        };

        if match_exception(tree, &handler.exception_types, *exception_type) == TriState::True {
            tracing::debug!(
                "{}: raise is caught by a known handler, branch left in place",
                tree.source_ref(statement)
            );
            return;
        }
    }
}

fn optimize_raise_statement(tree: &mut Tree, statement: NodeId) -> bool {
    let Some(sequence) = tree.parent(statement) else {
        return false;
    };
    let Some(statements) = tree.sequence(sequence) else {
        return false;
    };

    let is_first = statements.statements.first() == Some(&statement);

    if tree.truncate_sequence_after(statement) {
        signal_change(
            "new_raise new_statements",
            &tree.source_ref(statement).clone(),
            "Removed unreachable statements from statement sequence.",
        );
        return true;
    }

    if is_first {
        inspect_raise_in_try(tree, statement, sequence);
    }

    false
}

fn optimize_node(tree: &mut Tree, node: NodeId) -> bool {
    if is_raise_expression(tree, node) {
        return match tree.parent(node) {
            Some(parent) if is_trimmable_parent(tree, parent) => trim_evaluation(tree, parent),
            _ => false,
        };
    }

    if matches!(tree.stmt(node), Some(Stmt::RaiseException { .. })) {
        return optimize_raise_statement(tree, node);
    }

    false
}

/// Propagates raises until nothing changes.
///
/// Every change restarts the traversal from the root, since the rewrite may
/// have replaced nodes the traversal still had queued.
///
/// # Returns
///
/// * `bool` - Whether the tree was changed
pub fn optimize_raises(tree: &mut Tree) -> bool {
    let mut changed = false;

    'restart: loop {
        let Some(root) = tree.root() else {
            return changed;
        };

        for node in tree.pre_order(root) {
            if optimize_node(tree, node) {
                changed = true;
                continue 'restart;
            }
        }

        return changed;
    }
}
