use crate::ast::{
    ast::{NodeId, NodeKind, Tree},
    expressions::Expr,
};

/// Private names start with `__` and do not end with `__`.
pub fn is_private_name(name: &str) -> bool {
    name.starts_with("__") && !name.ends_with("__")
}

/// Mangles a private attribute name accessed from `node`.
///
/// The walk stops at the first class body, which mangles, or at the first
/// function body, which does not.
///
/// # Arguments
///
/// * `tree` - The tree holding the node
/// * `attribute` - The attribute name as written
/// * `node` - The lookup, assignment or deletion node
///
/// # Returns
///
/// * `String` - `_<ClassName><attribute>` or the attribute unchanged
pub fn mangle_attribute_name(tree: &Tree, attribute: &str, node: NodeId) -> String {
    if !is_private_name(attribute) {
        return attribute.to_string();
    }

    for ancestor in tree.ancestors(node) {
        match tree.kind(ancestor) {
            NodeKind::Expr(Expr::ClassBody(class)) => {
                return format!("_{}{}", class.name, attribute);
            }
            NodeKind::Expr(Expr::FunctionBody(_)) => break,
            _ => {}
        }
    }

    attribute.to_string()
}
