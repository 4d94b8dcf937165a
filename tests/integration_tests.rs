//! Integration tests for the optimize and generate pipeline.
//!
//! Trees are built directly, optimized to a fixed point and translated with
//! the C++ emitter; the assembly helpers are then run over the shared
//! global context.

use pretty_assertions::assert_eq;
use pytrans::{
    ast::{
        ast::{NodeId, Tree},
        builder::TreeBuilder,
        statements::Module,
    },
    codegen::{
        context::GlobalContext,
        cpp::CppEmitter,
        generator::{
            gen_constants_declaration_code, gen_constants_definition_code, gen_helpers_code,
            gen_main_code, gen_module, gen_module_declaration_code, CodeGenerator,
        },
    },
    config::Options,
    logger,
    optimizations::optimize_to_fixed_point,
};

/// `print "before"; raise ValueError; print "after"` as module `demo`.
fn raising_module() -> (Tree, NodeId) {
    let mut builder = TreeBuilder::new("demo.py");
    let before = builder.string("before");
    let first = builder.print(vec![before]);
    builder.at_line(2);
    let exception = builder.exception_ref("ValueError");
    let raise = builder.raise(Some(exception), None, None);
    builder.at_line(3);
    let after = builder.string("after");
    let last = builder.print(vec![after]);
    let sequence = builder.sequence(vec![first, raise, last]);
    let module = builder.module("demo", Some(sequence));
    (builder.finish(), module)
}

fn translate(tree: &Tree, module: NodeId, options: &Options, global: &mut GlobalContext) -> String {
    let emitter = CppEmitter::new();
    let generator = CodeGenerator::new(tree, &emitter, options);
    gen_module(&generator, module, "demo", global).unwrap()
}

fn handles(global: &GlobalContext) -> Vec<String> {
    global.constants().map(|entry| entry.handle.clone()).collect()
}

#[test]
fn test_optimized_module_drops_unreachable_code() {
    // Only the first caller installs the subscriber.
    let _ = logger::init_debug();

    let (mut tree, module) = raising_module();
    let options = Options::default();

    assert_eq!(optimize_to_fixed_point(&mut tree, &options), 1);

    let mut global = GlobalContext::new();
    let code = translate(&tree, module, &options, &mut global);
    let handles = handles(&global);

    assert!(code.starts_with("// Module \"demo\""));
    assert!(handles.contains(&"const_str_plain_before".to_string()));
    assert!(!handles.contains(&"const_str_plain_after".to_string()));
    assert!(!code.contains("const_str_plain_after"));
}

#[test]
fn test_unoptimized_module_keeps_code() {
    let (tree, module) = raising_module();
    let options = Options::default();

    let mut global = GlobalContext::new();
    translate(&tree, module, &options, &mut global);

    assert!(handles(&global).contains(&"const_str_plain_after".to_string()));
}

#[test]
fn test_generation_is_deterministic() {
    let (mut tree, module) = raising_module();
    let options = Options::default();
    optimize_to_fixed_point(&mut tree, &options);

    let mut first_global = GlobalContext::new();
    let first = translate(&tree, module, &options, &mut first_global);
    let mut second_global = GlobalContext::new();
    let second = translate(&tree, module, &options, &mut second_global);

    assert_eq!(first, second);
    assert_eq!(handles(&first_global), handles(&second_global));
}

#[test]
fn test_constants_shared_across_modules() {
    let (tree, module) = raising_module();
    let options = Options::default();

    let mut global = GlobalContext::new();
    translate(&tree, module, &options, &mut global);
    let count = global.constant_count();
    translate(&tree, module, &options, &mut global);

    assert_eq!(global.constant_count(), count);
}

#[test]
fn test_execution_trace() {
    let (tree, module) = raising_module();
    let options = Options {
        trace_execution: true,
        ..Options::default()
    };

    let mut global = GlobalContext::new();
    let code = translate(&tree, module, &options, &mut global);

    assert!(code.contains("Execute: demo.py:1 StatementPrint"));
    assert!(code.contains("Execute: demo.py:3 StatementPrint"));
}

#[test]
fn test_program_assembly() {
    let mut builder = TreeBuilder::new("demo.py");
    let element = builder.int(1);
    let list = builder.make_list(vec![element]);
    let other = builder.int(2);
    let tuple = builder.make_tuple(vec![list, other]);
    let statement = builder.expression_statement(tuple);
    let sequence = builder.sequence(vec![statement]);
    let module = builder.module("demo", Some(sequence));
    let tree = builder.finish();
    let options = Options::default();

    let mut global = GlobalContext::new();
    let module_code = translate(&tree, module, &options, &mut global);
    assert!(global.tuple_arities().contains(&2));

    let emitter = CppEmitter::new();

    let helpers = gen_helpers_code(&emitter, &global);
    assert!(helpers.contains("static inline PyObject *MAKE_TUPLE2( PyObject *element0, PyObject *element1 )"));

    let declarations = gen_constants_declaration_code(&emitter, &global);
    for handle in handles(&global) {
        assert!(declarations.contains(&format!("extern PyObject *{};", handle)));
    }

    let definitions = gen_constants_definition_code(&emitter, &global);
    assert!(definitions.contains("static void _initConstants()"));

    assert_eq!(
        gen_module_declaration_code(&emitter, "demo"),
        "MOD_INIT_DECL( demo );"
    );

    let helper_module = match tree.kind(module) {
        pytrans::ast::ast::NodeKind::Module(module) => Module {
            name: "helper".to_string(),
            package: Some("pkg".to_string()),
            ..module.clone()
        },
        _ => unreachable!(),
    };
    let main = gen_main_code(&emitter, &[module_code.clone()], &[&helper_module]);

    assert!(main.starts_with(&module_code));
    assert!(main.contains("int main( int argc, char *argv[] )"));
    let helper_init = main.find("MOD_INIT_NAME( pkg__helper )();").unwrap();
    let main_init = main.find("MOD_INIT_NAME( __main__ )();").unwrap();
    assert!(helper_init < main_init);
}

#[test]
fn test_options_from_json() {
    let options = Options::from_json(r#"{"python_version": {"major": 3, "minor": 2}, "trace_execution": true}"#)
        .unwrap();

    assert!(options.is_python3());
    assert!(!options.slicing_available());
    assert!(options.trace_execution);
    assert_eq!(options.max_optimization_passes, 64);

    assert_eq!(Options::from_json("{}").unwrap(), Options::default());

    let error = Options::from_json("{ not json").unwrap_err();
    assert_eq!(error.get_error_name(), "InvalidConfig");
}
