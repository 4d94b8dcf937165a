//! Unit tests for the tree arena, constants and node properties.

use crate::ast::{
    ast::NodeKind,
    builder::{simple_class, simple_function, TreeBuilder},
    constants::Constant,
    expressions::Expr,
    statements::Stmt,
};

#[test]
fn test_add_sets_parents() {
    let mut builder = TreeBuilder::new("test.py");
    let called = builder.builtin_ref("len");
    let argument = builder.local("x");
    let call = builder.call(called, vec![argument]);
    let statement = builder.expression_statement(call);
    let sequence = builder.sequence(vec![statement]);
    let module = builder.module("test", Some(sequence));
    let tree = builder.finish();

    assert_eq!(tree.root(), Some(module));
    assert_eq!(tree.parent(argument), Some(call));
    assert_eq!(tree.parent(call), Some(statement));
    assert_eq!(tree.parent(sequence), Some(module));
    assert_eq!(tree.parent(module), None);
    assert_eq!(tree.children(call), vec![called, argument]);
    assert_eq!(
        tree.ancestors(argument).collect::<Vec<_>>(),
        vec![call, statement, sequence, module]
    );
}

#[test]
fn test_pre_order() {
    let mut builder = TreeBuilder::new("test.py");
    let left = builder.int(1);
    let right = builder.int(2);
    let tuple = builder.make_tuple(vec![left, right]);
    let statement = builder.expression_statement(tuple);
    let sequence = builder.sequence(vec![statement]);
    let tree = builder.finish();

    assert_eq!(
        tree.pre_order(sequence),
        vec![sequence, statement, tuple, left, right]
    );
}

#[test]
fn test_replace_with() {
    let mut builder = TreeBuilder::new("test.py");
    let value = builder.int(1);
    let exception = builder.exception_ref("ValueError");
    let raise = builder.raise_expr(exception, None);
    let operation = builder.operation(
        crate::ast::expressions::Operator::Add,
        vec![value, raise],
    );
    let statement = builder.expression_statement(operation);
    let mut tree = builder.finish();

    tree.replace_with(operation, raise);

    assert_eq!(tree.parent(raise), Some(statement));
    assert_eq!(tree.parent(operation), None);
    assert_eq!(tree.children(statement), vec![raise]);
}

#[test]
fn test_splice_and_truncate() {
    let mut builder = TreeBuilder::new("test.py");
    let first = builder.break_();
    let second = builder.continue_();
    let third = builder.break_();
    let sequence = builder.sequence(vec![first, second, third]);
    let replacement_a = builder.continue_();
    let replacement_b = builder.continue_();
    let mut tree = builder.finish();

    assert!(tree.splice_in_sequence(second, vec![replacement_a, replacement_b]));
    assert_eq!(
        tree.children(sequence),
        vec![first, replacement_a, replacement_b, third]
    );
    assert_eq!(tree.parent(replacement_a), Some(sequence));
    assert_eq!(tree.parent(second), None);

    assert!(tree.truncate_sequence_after(replacement_a));
    assert_eq!(tree.children(sequence), vec![first, replacement_a]);
    assert_eq!(tree.parent(third), None);

    // Already last, nothing to drop.
    assert!(!tree.truncate_sequence_after(replacement_a));
}

#[test]
fn test_splice_requires_sequence_parent() {
    let mut builder = TreeBuilder::new("test.py");
    let condition = builder.local("x");
    let statement = builder.break_();
    let conditional = builder.conditional(condition, None, None);
    let mut tree = builder.finish();

    assert!(!tree.splice_in_sequence(condition, vec![statement]));
    assert_eq!(tree.parent(condition), Some(conditional));
}

#[test]
fn test_variable_provider_and_parent_function() {
    let mut builder = TreeBuilder::new("test.py");
    let inner = builder.reraise();
    let function_sequence = builder.sequence(vec![inner]);
    let function = builder.function(simple_function("f", Some(function_sequence)));
    let class_statement = builder.expression_statement(function);
    let class_sequence = builder.sequence(vec![class_statement]);
    let class = builder.class(simple_class("C", Some(class_sequence)));
    let tree = builder.finish();

    assert_eq!(tree.parent_variable_provider(inner), Some(function));
    assert_eq!(tree.parent_function(inner).map(|f| f.name.as_str()), Some("f"));
    assert_eq!(tree.parent_variable_provider(class_statement), Some(class));
    assert!(tree.parent_function(class_statement).is_none());
}

#[test]
fn test_is_reraise_local() {
    let mut builder = TreeBuilder::new("test.py");
    let tried_statement = builder.break_();
    let tried = builder.sequence(vec![tried_statement]);
    let local = builder.reraise();
    let branch = builder.sequence(vec![local]);
    let handler = builder.handler(vec![], None, Some(branch));
    let try_except = builder.try_except(tried, vec![handler], None);
    let outside = builder.reraise();
    let sequence = builder.sequence(vec![try_except, outside]);
    builder.module("test", Some(sequence));
    let tree = builder.finish();

    assert!(tree.is_reraise_local(local));
    assert!(!tree.is_reraise_local(outside));
}

#[test]
fn test_reraise_in_nested_function_is_not_local() {
    let mut builder = TreeBuilder::new("test.py");
    let reraise = builder.reraise();
    let body = builder.sequence(vec![reraise]);
    let function = builder.function(simple_function("g", Some(body)));
    let statement = builder.expression_statement(function);
    let branch = builder.sequence(vec![statement]);
    builder.handler(vec![], None, Some(branch));
    let tree = builder.finish();

    assert!(!tree.is_reraise_local(reraise));
}

#[test]
fn test_side_effects() {
    let mut builder = TreeBuilder::new("test.py");
    let constant = builder.int(3);
    let variable = builder.local("a");
    let called = builder.local("f");
    let call = builder.call(called, vec![]);
    let pure_tuple = builder.make_tuple(vec![constant, variable]);
    let impure_list = builder.make_list(vec![constant, call]);
    let tree = builder.finish();

    assert!(!tree.may_have_side_effects(constant));
    assert!(!tree.may_have_side_effects(variable));
    assert!(tree.may_have_side_effects(call));
    assert!(!tree.may_have_side_effects(pure_tuple));
    assert!(tree.may_have_side_effects(impure_list));
}

#[test]
fn test_may_raise_exception() {
    let mut builder = TreeBuilder::new("test.py");
    let constant = builder.int(3);
    let temp = builder.temp_ref("iter_1");
    let variable = builder.local("a");
    let mutable = builder.constant(Constant::List(vec![]));
    let tuple = builder.make_tuple(vec![constant, temp]);
    let set = builder.make_set(vec![mutable]);
    let tree = builder.finish();

    assert!(!tree.may_raise_exception(constant));
    assert!(!tree.may_raise_exception(temp));
    assert!(tree.may_raise_exception(variable));
    assert!(!tree.may_raise_exception(tuple));
    assert!(tree.may_raise_exception(set));
}

#[test]
fn test_is_statement_abortative() {
    let mut builder = TreeBuilder::new("test.py");
    let returned = builder.none();
    let return_ = builder.return_(returned);
    let yes = builder.sequence(vec![return_]);
    let raise_type = builder.exception_ref("KeyError");
    let raise = builder.raise(Some(raise_type), None, None);
    let no = builder.sequence(vec![raise]);
    let condition = builder.local("c");
    let both = builder.conditional(condition, Some(yes), Some(no));
    let returned = builder.none();
    let return_ = builder.return_(returned);
    let only_yes = builder.sequence(vec![return_]);
    let condition = builder.local("c");
    let one = builder.conditional(condition, Some(only_yes), None);
    let break_ = builder.break_();
    let loop_body = builder.sequence(vec![break_]);
    let loop_ = builder.loop_(Some(loop_body));
    let tree = builder.finish();

    assert!(tree.is_statement_abortative(both));
    assert!(!tree.is_statement_abortative(one));
    assert!(!tree.is_statement_abortative(loop_));
    assert!(tree.is_statement_abortative(loop_body));
}

#[test]
fn test_is_indexable() {
    let mut builder = TreeBuilder::new("test.py");
    let small = builder.int(-5);
    let flag = builder.constant(Constant::Bool(true));
    let limit = builder.int(i64::MAX);
    let float = builder.constant(Constant::Float(1.0));
    let none = builder.none();
    let tree = builder.finish();

    assert!(tree.is_indexable(small));
    assert!(tree.is_indexable(flag));
    assert!(!tree.is_indexable(limit));
    assert!(!tree.is_indexable(float));
    assert!(!tree.is_indexable(none));
}

#[test]
fn test_constant_keys_are_distinct() {
    let keys = [
        Constant::int(1).key(),
        Constant::Float(1.0).key(),
        Constant::Bool(true).key(),
        Constant::Float(-0.0).key(),
        Constant::Float(0.0).key(),
        Constant::str("a").key(),
        Constant::Unicode("a".to_string()).key(),
    ];

    for (index, key) in keys.iter().enumerate() {
        assert!(!keys[index + 1..].contains(key), "duplicate key {}", key);
    }
}

#[test]
fn test_constant_repr() {
    assert_eq!(Constant::str("it's\n").to_python_repr(), "'it\\'s\\n'");
    assert_eq!(
        Constant::Tuple(vec![Constant::int(1)]).to_python_repr(),
        "(1,)"
    );
    assert_eq!(Constant::Float(2.0).to_python_repr(), "2.0");
    assert!(Constant::Tuple(vec![Constant::List(vec![])]).is_mutable());
    assert!(!Constant::Tuple(vec![Constant::None]).is_mutable());
}

#[test]
fn test_unicode_repr_by_code_point() {
    assert_eq!(
        Constant::Unicode("\u{e9}".to_string()).to_python_repr(),
        "u'\\xe9'"
    );
    assert_eq!(
        Constant::Unicode("\u{20ac}1".to_string()).to_python_repr(),
        "u'\\u20ac1'"
    );
    assert_eq!(
        Constant::Unicode("\u{1f600}".to_string()).to_python_repr(),
        "u'\\U0001f600'"
    );
    assert_eq!(
        Constant::Unicode("it's".to_string()).to_python_repr(),
        "u'it\\'s'"
    );
    assert_eq!(Constant::str("\u{e9}").to_python_repr(), "'\\xc3\\xa9'");
    assert_ne!(
        Constant::Unicode("\u{e9}".to_string()).key(),
        Constant::Unicode("\u{c3}\u{a9}".to_string()).key()
    );
}

#[test]
fn test_dump() {
    let mut builder = TreeBuilder::new("test.py");
    builder.at_line(4);
    let unresolved = builder.unresolved_ref("y");
    let statement = builder.expression_statement(unresolved);
    let tree = builder.finish();

    assert_eq!(
        tree.dump(statement),
        "StatementExpressionOnly @4\n  ExpressionVariableRef y (unresolved) @4\n"
    );
}

#[test]
fn test_node_kind_names() {
    let mut builder = TreeBuilder::new("test.py");
    let sequence = builder.sequence(vec![]);
    let none = builder.none();
    let tree = builder.finish();

    assert_eq!(tree.kind(sequence).name(), "StatementsSequence");
    assert!(matches!(
        tree.kind(none),
        NodeKind::Expr(Expr::ConstantRef {
            constant: Constant::None
        })
    ));
    assert!(tree.stmt(none).is_none());
    assert!(!matches!(tree.kind(sequence), NodeKind::Stmt(Stmt::BreakLoop { .. })));
}
