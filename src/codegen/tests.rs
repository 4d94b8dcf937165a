//! Unit tests for expression, condition, slice and statement translation.

use pretty_assertions::assert_eq;

use crate::{
    ast::{
        ast::{NodeId, Tree},
        builder::{simple_class, simple_function, TreeBuilder},
        constants::Constant,
        expressions::{Builtin1, Comparator, EvalMode, Expr, IntKind},
        variables::{Variable, VariableKind},
    },
    codegen::{
        condition::gen_condition,
        context::{Context, GlobalContext, ScopeKind},
        cpp::CppEmitter,
        expr::gen_expression,
        generator::{gen_module, gen_statement_sequence, CodeGenerator},
        identifier::{Identifier, RefCount},
        names::{is_private_name, mangle_attribute_name},
        stmt::gen_statement,
    },
    config::{Options, PythonVersion},
};

fn python3() -> Options {
    Options {
        python_version: PythonVersion { major: 3, minor: 4 },
        ..Options::default()
    }
}

fn expression_code(tree: &Tree, node: NodeId, options: &Options) -> String {
    let emitter = CppEmitter::new();
    let generator = CodeGenerator::new(tree, &emitter, options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    gen_expression(&generator, &mut context, node).unwrap().code
}

fn condition_code(tree: &Tree, node: NodeId, inverted: bool) -> String {
    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    gen_condition(&generator, &mut context, node, inverted).unwrap()
}

fn statement_code(tree: &Tree, node: NodeId) -> String {
    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    gen_statement(&generator, &mut context, node).unwrap()
}

#[test]
fn test_constant_tuple_is_one_handle() {
    let mut builder = TreeBuilder::new("test.py");
    let one = builder.int(1);
    let two = builder.int(2);
    let tuple = builder.make_tuple(vec![one, two]);
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let identifier = gen_expression(&generator, &mut context, tuple).unwrap();
    drop(context);

    assert_eq!(identifier.code, "const_tuple_0");
    assert_eq!(identifier.ref_count, RefCount::Constant);
    assert_eq!(global.constant_count(), 1);
    assert!(global.tuple_arities().is_empty());
}

#[test]
fn test_constant_list_is_copied() {
    let mut builder = TreeBuilder::new("test.py");
    let one = builder.int(1);
    let list = builder.make_list(vec![one]);
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, list, &Options::default()),
        "LIST_COPY( const_list_0 )"
    );
}

#[test]
fn test_mixed_tuple_is_built() {
    let mut builder = TreeBuilder::new("test.py");
    let x = builder.local("x");
    let one = builder.int(1);
    let tuple = builder.make_tuple(vec![x, one]);
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let identifier = gen_expression(&generator, &mut context, tuple).unwrap();
    drop(context);

    assert_eq!(
        identifier.code,
        "MAKE_TUPLE2( _python_var_x.asObject(), const_int_0 )"
    );
    assert_eq!(identifier.ref_count, RefCount::Owned);
    assert!(global.tuple_arities().contains(&2));
}

#[test]
fn test_constant_dict_needs_constant_keys_and_values() {
    let mut builder = TreeBuilder::new("test.py");
    let key = builder.string("a");
    let value = builder.local("v");
    let dict = builder.make_dict(vec![(key, value)]);
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, dict, &Options::default()),
        "MAKE_DICT1( _python_var_v.asObject(), const_str_plain_a )"
    );
}

#[test]
fn test_constant_set_is_one_handle() {
    let mut builder = TreeBuilder::new("test.py");
    let one = builder.int(1);
    let two = builder.int(2);
    let set = builder.make_set(vec![one, two]);
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let identifier = gen_expression(&generator, &mut context, set).unwrap();
    drop(context);

    assert_eq!(identifier.code, "PySet_New( const_set_0 )");
    assert_eq!(identifier.ref_count, RefCount::Owned);
    assert_eq!(global.constant_count(), 1);
}

#[test]
fn test_constant_dict_is_one_handle() {
    let mut builder = TreeBuilder::new("test.py");
    let key = builder.string("a");
    let value = builder.int(1);
    let dict = builder.make_dict(vec![(key, value)]);
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let identifier = gen_expression(&generator, &mut context, dict).unwrap();
    drop(context);

    assert_eq!(identifier.code, "PyDict_Copy( const_dict_0 )");
    assert_eq!(global.constant_count(), 1);
    assert!(global.dict_arities().is_empty());
}

#[test]
fn test_private_names() {
    assert!(is_private_name("__secret"));
    assert!(!is_private_name("__init__"));
    assert!(!is_private_name("_single"));
    assert!(!is_private_name("plain"));
}

#[test]
fn test_mangling_in_class_body() {
    let mut builder = TreeBuilder::new("test.py");
    let target = builder.local("self");
    let value = builder.int(1);
    let assignment = builder.assign_attribute(target, "__x", value);
    let body = builder.sequence(vec![assignment]);
    builder.class(simple_class("Point", Some(body)));
    let tree = builder.finish();

    assert_eq!(mangle_attribute_name(&tree, "__x", assignment), "_Point__x");
    assert_eq!(mangle_attribute_name(&tree, "__dict__", assignment), "__dict__");
}

#[test]
fn test_mangling_stops_at_function() {
    let mut builder = TreeBuilder::new("test.py");
    let source = builder.local("self");
    let lookup = builder.attribute(source, "__x");
    let statement = builder.return_(lookup);
    let function_body = builder.sequence(vec![statement]);
    let function = builder.function(simple_function("method", Some(function_body)));
    let target = builder.local("method");
    let definition = builder.assign(target, function);
    let class_body = builder.sequence(vec![definition]);
    builder.class(simple_class("Point", Some(class_body)));
    let tree = builder.finish();

    assert_eq!(mangle_attribute_name(&tree, "__x", lookup), "__x");
}

#[test]
fn test_mangling_without_class() {
    let mut builder = TreeBuilder::new("test.py");
    let source = builder.local("thing");
    let lookup = builder.attribute(source, "__x");
    let tree = builder.finish();

    assert_eq!(mangle_attribute_name(&tree, "__x", lookup), "__x");
}

#[test]
fn test_mangled_attribute_lookup() {
    let mut builder = TreeBuilder::new("test.py");
    let source = builder.local("self");
    let lookup = builder.attribute(source, "__x");
    let statement = builder.expression_statement(lookup);
    let body = builder.sequence(vec![statement]);
    builder.class(simple_class("Point", Some(body)));
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, lookup, &Options::default()),
        "LOOKUP_ATTRIBUTE( _python_var_self.asObject(), const_str_plain__Point__x )"
    );
}

#[test]
fn test_slice_fast_path() {
    let mut builder = TreeBuilder::new("test.py");
    let source = builder.local("x");
    let lower = builder.int(1);
    let slice = builder.slice(source, Some(lower), None);
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, slice, &Options::default()),
        "LOOKUP_INDEX_SLICE( _python_var_x.asObject(), 1, PY_SSIZE_T_MAX )"
    );
}

#[test]
fn test_slice_with_object_bound() {
    let mut builder = TreeBuilder::new("test.py");
    let source = builder.local("x");
    let lower = builder.local("y");
    let slice = builder.slice(source, Some(lower), None);
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, slice, &Options::default()),
        "LOOKUP_SLICE( _python_var_x.asObject(), _python_var_y.asObject(), Py_None )"
    );
}

#[test]
fn test_slice_with_huge_bound() {
    let mut builder = TreeBuilder::new("test.py");
    let source = builder.local("x");
    let upper = builder.constant(Constant::Int(num_bigint::BigInt::from(i64::MAX)));
    let slice = builder.slice(source, None, Some(upper));
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, slice, &Options::default()),
        "LOOKUP_SLICE( _python_var_x.asObject(), Py_None, const_int_0 )"
    );
}

#[test]
fn test_slice_without_native_slicing() {
    let mut builder = TreeBuilder::new("test.py");
    let source = builder.local("x");
    let lower = builder.int(1);
    let slice = builder.slice(source, Some(lower), None);
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, slice, &python3()),
        "LOOKUP_SUBSCRIPT( _python_var_x.asObject(), PyObjectTemporary( MAKE_SLICEOBJ( const_int_0, Py_None, Py_None ) ).asObject() )"
    );
}

#[test]
fn test_condition_constants() {
    let mut builder = TreeBuilder::new("test.py");
    let zero = builder.int(0);
    let text = builder.string("text");
    let tree = builder.finish();

    assert_eq!(condition_code(&tree, zero, false), "false");
    assert_eq!(condition_code(&tree, zero, true), "true");
    assert_eq!(condition_code(&tree, text, false), "true");
}

#[test]
fn test_condition_not_flips_inversion() {
    let mut builder = TreeBuilder::new("test.py");
    let x = builder.local("x");
    let y = builder.local("y");
    let comparison = builder.comparison(Comparator::Lt, x, y);
    let negated = builder.not(comparison);
    let z = builder.local("z");
    let inner = builder.not(z);
    let double = builder.not(inner);
    let tree = builder.finish();

    assert_eq!(
        condition_code(&tree, negated, false),
        "( !RICH_COMPARE_BOOL_LT( _python_var_x.asObject(), _python_var_y.asObject() ) )"
    );
    assert_eq!(
        condition_code(&tree, negated, true),
        "RICH_COMPARE_BOOL_LT( _python_var_x.asObject(), _python_var_y.asObject() )"
    );
    assert_eq!(
        condition_code(&tree, double, false),
        "CHECK_IF_TRUE( _python_var_z.asObject() )"
    );
    assert_eq!(
        condition_code(&tree, inner, false),
        "CHECK_IF_FALSE( _python_var_z.asObject() )"
    );
}

#[test]
fn test_condition_short_circuit() {
    let mut builder = TreeBuilder::new("test.py");
    let x = builder.local("x");
    let y = builder.local("y");
    let either = builder.bool_or(vec![x, y]);
    let a = builder.local("a");
    let b = builder.local("b");
    let both = builder.bool_and(vec![a, b]);
    let tree = builder.finish();

    assert_eq!(
        condition_code(&tree, either, false),
        "( CHECK_IF_TRUE( _python_var_x.asObject() ) || CHECK_IF_TRUE( _python_var_y.asObject() ) )"
    );
    assert_eq!(
        condition_code(&tree, both, true),
        "( !( CHECK_IF_TRUE( _python_var_a.asObject() ) && CHECK_IF_TRUE( _python_var_b.asObject() ) ) )"
    );
}

#[test]
fn test_unresolved_variable_fails() {
    let mut builder = TreeBuilder::new("test.py");
    let reference = builder.unresolved_ref("ghost");
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let error = gen_expression(&generator, &mut context, reference).unwrap_err();
    assert_eq!(error.get_error_name(), "UnresolvedVariable");
    assert!(error.get_dump().is_some_and(|dump| dump.contains("ghost")));
}

#[test]
fn test_statement_is_not_an_expression() {
    let mut builder = TreeBuilder::new("test.py");
    let statement = builder.break_();
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let error = gen_expression(&generator, &mut context, statement).unwrap_err();
    assert_eq!(error.get_error_name(), "NotAnExpression");
}

#[test]
fn test_expression_is_not_a_statement() {
    let mut builder = TreeBuilder::new("test.py");
    let value = builder.int(1);
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let error = gen_statement(&generator, &mut context, value).unwrap_err();
    assert_eq!(error.get_error_name(), "NotAStatement");
}

#[test]
fn test_long_on_python3_fails() {
    let mut builder = TreeBuilder::new("test.py");
    let long = builder.expr(Expr::BuiltinInt {
        kind: IntKind::Long,
        value: None,
        base: None,
    });
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = python3();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let error = gen_expression(&generator, &mut context, long).unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedNode");
}

#[test]
fn test_next_with_stop_iteration_fast_path() {
    let mut builder = TreeBuilder::new("test.py");
    let iterator = builder.temp_ref("it");
    let next = builder.builtin1(Builtin1::Next, iterator);
    let target = builder.local("value");
    let assignment = builder.assign(target, next);
    let tried = builder.sequence(vec![assignment]);
    let stop = builder.exception_ref("StopIteration");
    let leave = builder.break_();
    let branch = builder.sequence(vec![leave]);
    let handler = builder.handler(vec![stop], None, Some(branch));
    let statement = builder.try_except(tried, vec![handler], None);
    let tree = builder.finish();

    let code = statement_code(&tree, statement);

    assert!(code.starts_with("PyObject *_tmp_unpack_1 = ITERATOR_NEXT( _python_tmp_it.asObject() );"));
    assert!(code.contains("if ( _tmp_unpack_1 == NULL )"));
    assert!(code.contains("    break;"));
    assert!(code.ends_with("_python_var_value.assign( _tmp_unpack_1 );"));
    assert!(!code.contains("catch"));
}

#[test]
fn test_next_with_handler_target_is_generic() {
    let mut builder = TreeBuilder::new("test.py");
    let iterator = builder.temp_ref("it");
    let next = builder.builtin1(Builtin1::Next, iterator);
    let target = builder.local("value");
    let assignment = builder.assign(target, next);
    let tried = builder.sequence(vec![assignment]);
    let stop = builder.exception_ref("StopIteration");
    let caught = builder.local("error");
    let leave = builder.break_();
    let branch = builder.sequence(vec![leave]);
    let handler = builder.handler(vec![stop], Some(caught), Some(branch));
    let statement = builder.try_except(tried, vec![handler], None);
    let tree = builder.finish();

    let code = statement_code(&tree, statement);

    assert!(code.starts_with("try\n{"));
    assert!(code.contains("catch ( _PythonException &_exception )"));
    assert!(code.contains("if ( _exception.matches( PyExc_StopIteration ) )"));
    assert!(code.contains("_python_var_error.assign( INCREASE_REFCOUNT( _exception.getValue() ) );"));
}

/// `try: value = next(it) except <caught>: <branch>`, with `handlers`
/// copies of the handler.
fn next_try_statement(
    iterator_may_raise: bool,
    caught: &[&str],
    handlers: usize,
    abortative: bool,
) -> (Tree, NodeId) {
    let mut builder = TreeBuilder::new("test.py");
    let iterator = if iterator_may_raise {
        builder.local("it")
    } else {
        builder.temp_ref("it")
    };
    let next = builder.builtin1(Builtin1::Next, iterator);
    let target = builder.local("value");
    let assignment = builder.assign(target, next);
    let tried = builder.sequence(vec![assignment]);

    let mut handler_nodes = Vec::new();
    for _ in 0..handlers {
        let types = caught.iter().map(|name| builder.exception_ref(name)).collect();
        let leave = if abortative {
            builder.break_()
        } else {
            let value = builder.int(1);
            builder.expression_statement(value)
        };
        let branch = builder.sequence(vec![leave]);
        handler_nodes.push(builder.handler(types, None, Some(branch)));
    }

    let statement = builder.try_except(tried, handler_nodes, None);
    (builder.finish(), statement)
}

fn assert_generic_try(tree: &Tree, statement: NodeId) {
    let code = statement_code(tree, statement);

    assert!(code.starts_with("try\n{"), "{}", code);
    assert!(code.contains("catch ( _PythonException &_exception )"));
    assert!(!code.contains("_tmp_unpack_"));
}

#[test]
fn test_next_with_falling_through_branch_is_generic() {
    let (tree, statement) = next_try_statement(false, &["StopIteration"], 1, false);
    assert_generic_try(&tree, statement);
}

#[test]
fn test_next_catching_other_exception_is_generic() {
    let (tree, statement) = next_try_statement(false, &["KeyError"], 1, true);
    assert_generic_try(&tree, statement);
}

#[test]
fn test_next_with_two_handlers_is_generic() {
    let (tree, statement) = next_try_statement(false, &["StopIteration"], 2, true);
    assert_generic_try(&tree, statement);
}

#[test]
fn test_next_catching_two_types_is_generic() {
    let (tree, statement) = next_try_statement(false, &["StopIteration", "KeyError"], 1, true);
    assert_generic_try(&tree, statement);
}

#[test]
fn test_next_of_raising_argument_is_generic() {
    let (tree, statement) = next_try_statement(true, &["StopIteration"], 1, true);
    assert_generic_try(&tree, statement);
}

#[test]
fn test_next_fast_path_shape() {
    let (tree, statement) = next_try_statement(false, &["StopIteration"], 1, true);
    let code = statement_code(&tree, statement);

    assert!(code.starts_with("PyObject *_tmp_unpack_1"));
    assert!(!code.contains("catch"));
}

#[test]
fn test_try_except_else_block() {
    let mut builder = TreeBuilder::new("test.py");
    let call = builder.local("work");
    let attempt = builder.expression_statement(call);
    let tried = builder.sequence(vec![attempt]);
    let leave = builder.break_();
    let branch = builder.sequence(vec![leave]);
    let handler = builder.handler(Vec::new(), None, Some(branch));
    let done = builder.continue_();
    let no_raise = builder.sequence(vec![done]);
    let statement = builder.try_except(tried, vec![handler], Some(no_raise));
    let tree = builder.finish();

    let code = statement_code(&tree, statement);

    assert!(code.starts_with("bool _caught_1 = false;"));
    assert!(code.contains("if ( true )"));
    assert!(code.contains("if ( _caught_1 == false )"));
}

#[test]
fn test_raise_shapes() {
    let mut builder = TreeBuilder::new("test.py");
    let kind = builder.exception_ref("ValueError");
    let type_only = builder.raise(Some(kind), None, None);
    let kind = builder.exception_ref("ValueError");
    let value = builder.string("bad");
    let with_value = builder.raise(Some(kind), Some(value), None);
    let kind = builder.local("kind");
    let value = builder.local("value");
    let trace = builder.local("trace");
    let with_trace = builder.raise(Some(kind), Some(value), Some(trace));
    let outer = builder.reraise();
    let tree = builder.finish();

    assert_eq!(
        statement_code(&tree, type_only),
        "RAISE_EXCEPTION( INCREASE_REFCOUNT( PyExc_ValueError ), MAKE_TRACEBACK( frame_guard.getFrame(), 1 ) );"
    );
    assert_eq!(
        statement_code(&tree, with_value),
        "RAISE_EXCEPTION( INCREASE_REFCOUNT( PyExc_ValueError ), INCREASE_REFCOUNT( const_str_plain_bad ), MAKE_TRACEBACK( frame_guard.getFrame(), 1 ) );"
    );
    assert_eq!(
        statement_code(&tree, with_trace),
        "RAISE_EXCEPTION( INCREASE_REFCOUNT( _python_var_kind.asObject() ), INCREASE_REFCOUNT( _python_var_value.asObject() ), INCREASE_REFCOUNT( _python_var_trace.asObject() ) );"
    );
    assert_eq!(statement_code(&tree, outer), "RERAISE_EXCEPTION();");
}

#[test]
fn test_raise_with_trace_but_no_value_is_type_only() {
    let mut builder = TreeBuilder::new("test.py");
    let kind = builder.exception_ref("ValueError");
    let trace = builder.local("trace");
    let statement = builder.raise(Some(kind), None, Some(trace));
    let tree = builder.finish();

    assert_eq!(
        statement_code(&tree, statement),
        "RAISE_EXCEPTION( INCREASE_REFCOUNT( PyExc_ValueError ), MAKE_TRACEBACK( frame_guard.getFrame(), 1 ) );"
    );
}

#[test]
fn test_reraise_in_handler_is_local() {
    let mut builder = TreeBuilder::new("test.py");
    let x = builder.local("x");
    let attempt = builder.expression_statement(x);
    let tried = builder.sequence(vec![attempt]);
    let reraise = builder.reraise();
    let branch = builder.sequence(vec![reraise]);
    let handler = builder.handler(Vec::new(), None, Some(branch));
    builder.try_except(tried, vec![handler], None);
    let tree = builder.finish();

    assert_eq!(statement_code(&tree, reraise), "throw;");
}

#[test]
fn test_return_in_generator_terminates() {
    let mut builder = TreeBuilder::new("test.py");
    let value = builder.none();
    let statement = builder.return_(value);
    let body = builder.sequence(vec![statement]);
    let mut function = simple_function("numbers", Some(body));
    function.is_generator = true;
    builder.function(function);
    let tree = builder.finish();

    assert_eq!(
        statement_code(&tree, statement),
        "throw ReturnFromGeneratorException();"
    );
}

#[test]
fn test_return_in_function() {
    let mut builder = TreeBuilder::new("test.py");
    let value = builder.local("result");
    let statement = builder.return_(value);
    let body = builder.sequence(vec![statement]);
    builder.function(simple_function("compute", Some(body)));
    let tree = builder.finish();

    assert_eq!(
        statement_code(&tree, statement),
        "return INCREASE_REFCOUNT( _python_var_result.asObject() );"
    );
}

#[test]
fn test_line_markers_per_location() {
    let mut builder = TreeBuilder::new("test.py");
    builder.at_line(3);
    let a = builder.local("a");
    let first = builder.expression_statement(a);
    let b = builder.local("b");
    let second = builder.expression_statement(b);
    builder.at_line(4);
    let c = builder.local("c");
    let third = builder.expression_statement(c);
    let declaration = builder.stmt(crate::ast::statements::Stmt::DeclareGlobal {
        names: vec![String::from("g")],
    });
    let sequence = builder.sequence(vec![first, second, declaration, third]);
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let codes = gen_statement_sequence(&generator, &mut context, sequence).unwrap();

    assert_eq!(
        codes,
        vec![
            "frame_guard.setLineNumber( 3 );",
            "_python_var_a.asObject();",
            "_python_var_b.asObject();",
            "frame_guard.setLineNumber( 4 );",
            "_python_var_c.asObject();",
        ]
    );
}

#[test]
fn test_execution_trace() {
    let mut builder = TreeBuilder::new("test.py");
    let a = builder.local("a");
    let statement = builder.expression_statement(a);
    let sequence = builder.sequence(vec![statement]);
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options {
        trace_execution: true,
        ..Options::default()
    };
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let codes = gen_statement_sequence(&generator, &mut context, sequence).unwrap();

    assert_eq!(
        codes[0],
        "puts( \"Execute: test.py:1 StatementExpressionOnly\" );"
    );
    assert_eq!(codes.len(), 3);
}

#[test]
fn test_nested_codes_reach_module_scope() {
    let mut builder = TreeBuilder::new("test.py");
    let value = builder.none();
    let inner_return = builder.return_(value);
    let method_body = builder.sequence(vec![inner_return]);
    let method = builder.function(simple_function("method", Some(method_body)));
    let method_target = builder.local("method");
    let method_definition = builder.assign(method_target, method);
    let class_body = builder.sequence(vec![method_definition]);
    let class = builder.class(simple_class("Point", Some(class_body)));
    let class_target = builder.global("Point");
    let class_definition = builder.assign(class_target, class);
    let module_body = builder.sequence(vec![class_definition]);
    builder.module("test", Some(module_body));
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let codes = gen_statement_sequence(&generator, &mut context, module_body).unwrap();

    assert_eq!(context.depth(), 1);
    let scope = context.module_scope();
    assert!(scope.function_codes().contains_key("function_method"));
    assert!(scope.class_codes().contains_key("class_Point"));
    assert!(scope.class_codes()["class_Point"]
        .code
        .contains("return INCREASE_REFCOUNT( _locals_dict.asObject() );"));
    assert!(codes[1].starts_with("_mvar_test_Point.assign("));
}

#[test]
fn test_function_defaults() {
    let mut builder = TreeBuilder::new("test.py");
    let value = builder.none();
    let statement = builder.return_(value);
    let body = builder.sequence(vec![statement]);
    let mut function = simple_function("scale", Some(body));
    function.parameters.positional = vec![
        Variable::new("factor", VariableKind::Parameter),
        Variable::new("items", VariableKind::Parameter),
    ];
    function.parameters.default_count = 2;
    let function = builder.function(function);
    let constant_default = builder.int(2);
    let dynamic_default = builder.make_list(Vec::new());
    let defaulted = builder.function_defaulted(function, vec![constant_default, dynamic_default]);
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let creation = gen_expression(&generator, &mut context, defaulted).unwrap();

    assert_eq!(
        creation.code,
        "MAKE_FUNCTION_function_scale( LIST_COPY( const_list_1 ) )"
    );
    let declaration = &context.module_scope().function_codes()["function_scale"];
    assert_eq!(
        declaration.decl,
        "static PyObject *MAKE_FUNCTION_function_scale( PyObject *default_0 );"
    );
    assert!(declaration
        .code
        .contains("if ( _python_par_factor == NULL ) _python_par_factor = INCREASE_REFCOUNT( const_int_0 );"));
    assert!(declaration
        .code
        .contains("if ( _python_par_items == NULL ) _python_par_items = INCREASE_REFCOUNT( self->m_defaults.items );"));
}

#[test]
fn test_function_defaults_must_match_parameters() {
    let mut builder = TreeBuilder::new("test.py");
    let value = builder.none();
    let statement = builder.return_(value);
    let body = builder.sequence(vec![statement]);
    let mut function = simple_function("scale", Some(body));
    function.parameters.positional = vec![Variable::new("factor", VariableKind::Parameter)];
    function.parameters.default_count = 1;
    let function = builder.function(function);
    let constant_default = builder.int(2);
    let called = builder.local("side_effect");
    let dynamic_default = builder.call(called, vec![]);
    let defaulted = builder.function_defaulted(function, vec![constant_default, dynamic_default]);
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    let error = gen_expression(&generator, &mut context, defaulted).unwrap_err();

    assert_eq!(error.get_error_name(), "MismatchedDefaults");
    assert_eq!(
        error.get_internal_error().to_string(),
        "default count mismatch: 2 defaults, 1 parameters"
    );
    assert!(context.module_scope().function_codes().is_empty());
}

#[test]
fn test_module_translation() {
    let mut builder = TreeBuilder::new("demo.py");
    let x = builder.local("x");
    let statement = builder.print(vec![x]);
    let body = builder.sequence(vec![statement]);
    let module = builder.module("demo", Some(body));
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();

    let code = gen_module(&generator, module, "demo", &mut global).unwrap();

    assert!(code.starts_with("// Module \"demo\""));
    assert!(code.contains("PRINT_ITEM_TO( NULL, _python_var_x.asObject() );"));
    assert!(code.contains("MOD_INIT_DECL( demo )"));
    assert!(global
        .constants()
        .any(|entry| entry.constant == Constant::str("demo.py")));
}

#[test]
fn test_module_requires_module_node() {
    let mut builder = TreeBuilder::new("demo.py");
    let statement = builder.break_();
    let tree = builder.finish();

    let emitter = CppEmitter::new();
    let options = Options::default();
    let generator = CodeGenerator::new(&tree, &emitter, &options);
    let mut global = GlobalContext::new();

    let error = gen_module(&generator, statement, "demo", &mut global).unwrap_err();
    assert_eq!(error.get_error_name(), "NotAModule");
}

#[test]
fn test_identifier_contracts() {
    let owned = Identifier::new("MAKE_LIST1( x )", RefCount::Owned);
    let borrowed = Identifier::new("_python_var_x.asObject()", RefCount::Borrowed);
    let constant = Identifier::new("const_int_0", RefCount::Constant);

    assert_eq!(owned.ref_units(), 1);
    assert_eq!(borrowed.ref_units(), 0);
    assert_eq!(constant.ref_units(), 0);

    assert_eq!(
        owned.code_temporary_ref(),
        "PyObjectTemporary( MAKE_LIST1( x ) ).asObject()"
    );
    assert_eq!(owned.code_export_ref(), "MAKE_LIST1( x )");
    assert_eq!(owned.code_drop_ref(), "DECREASE_REFCOUNT( MAKE_LIST1( x ) )");
    assert_eq!(borrowed.code_temporary_ref(), "_python_var_x.asObject()");
    assert_eq!(
        constant.code_export_ref(),
        "INCREASE_REFCOUNT( const_int_0 )"
    );

    assert!(owned.check().is_ok());
    assert!(Identifier::new("", RefCount::Owned).check().is_err());
    assert!(Identifier::new(" x", RefCount::Borrowed).check().is_err());
}

#[test]
fn test_counters_per_scope() {
    let mut global = GlobalContext::new();
    let mut context = Context::new(&mut global, "test", "test", "test.py");

    assert_eq!(context.allocate_try_number(), 1);

    context.push_scope(ScopeKind::Function {
        code_name: "function_f".to_string(),
        is_generator: false,
    });
    assert_eq!(context.allocate_try_number(), 1);

    context.push_scope(ScopeKind::ExecInline);
    assert_eq!(context.allocate_try_number(), 2);
    assert_eq!(context.allocate_for_loop_number(), 1);
    assert!(!context.is_generator());

    assert!(context.pop_scope().is_some());
    assert!(context.pop_scope().is_some());
    assert!(context.pop_scope().is_none());
    assert_eq!(context.depth(), 1);

    assert_eq!(context.allocate_try_number(), 2);
    assert_eq!(context.allocate_for_loop_number(), 1);
}

#[test]
fn test_locals_at_module_level() {
    let mut builder = TreeBuilder::new("test.py");
    let locals = builder.expr(Expr::BuiltinLocals);
    let statement = builder.expression_statement(locals);
    let body = builder.sequence(vec![statement]);
    builder.module("test", Some(body));
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, locals, &Options::default()),
        "((PyModuleObject *)_module_test)->md_dict"
    );
}

#[test]
fn test_locals_in_function() {
    let mut builder = TreeBuilder::new("test.py");
    let copied = builder.expr(Expr::BuiltinLocals);
    let statement = builder.return_(copied);
    let body = builder.sequence(vec![statement]);
    builder.function(simple_function("f", Some(body)));

    let updated = builder.expr(Expr::BuiltinLocals);
    let statement = builder.return_(updated);
    let body = builder.sequence(vec![statement]);
    let mut function = simple_function("g", Some(body));
    function.is_unoptimized = true;
    builder.function(function);
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, copied, &Options::default()),
        "PyDict_New()"
    );
    assert_eq!(
        expression_code(&tree, updated, &Options::default()),
        "_locals_dict.asObject()"
    );
}

#[test]
fn test_import_at_module_level_reuses_globals() {
    let mut builder = TreeBuilder::new("test.py");
    let import = builder.expr(Expr::ImportModule {
        module_name: "os".to_string(),
        import_list: None,
        level: 0,
    });
    let statement = builder.expression_statement(import);
    let body = builder.sequence(vec![statement]);
    builder.module("test", Some(body));
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, import, &Options::default()),
        "IMPORT_MODULE( const_str_plain_os, ((PyModuleObject *)_module_test)->md_dict, \
         ((PyModuleObject *)_module_test)->md_dict, const_none, const_int_2 )"
    );
}

#[test]
fn test_eval_defaults() {
    let mut builder = TreeBuilder::new("test.py");
    let source_code = builder.string("1+2");
    let eval = builder.expr(Expr::BuiltinEval {
        mode: EvalMode::Eval,
        source_code,
        globals: None,
        locals: None,
    });
    let statement = builder.expression_statement(eval);
    let body = builder.sequence(vec![statement]);
    builder.module("test", Some(body));
    let tree = builder.finish();

    assert_eq!(
        expression_code(&tree, eval, &Options::default()),
        "EVAL_CODE( COMPILE_CODE( const_str_3, const_str_1, const_str_plain_eval, 0 ), const_none, const_none )"
    );
}
