use crate::{
    ast::{
        ast::{NodeId, Provider},
        constants::Constant,
        expressions::{EvalMode, Expr, IntKind},
        variables::Variable,
    },
    errors::errors::{Error, ErrorImpl},
    MK_INTERNAL_ERROR,
};

use super::{
    condition::gen_condition,
    context::Context,
    emitter::LocalsMode,
    functions::{gen_class_body, gen_function_body},
    generator::CodeGenerator,
    identifier::Identifier,
    names::mangle_attribute_name,
    slices::gen_slice_lookup,
};

/// Translates an expression node into an identifier.
///
/// # Arguments
///
/// * `generator` - The generator state
/// * `context` - The translation context
/// * `node` - An expression node
///
/// # Returns
///
/// * `Result<Identifier, Error>` - The checked identifier of the value
pub fn gen_expression(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    node: NodeId,
) -> Result<Identifier, Error> {
    let tree = generator.tree;
    let emitter = generator.emitter;

    let Some(expression) = tree.expr(node) else {
        return Err(MK_INTERNAL_ERROR!(
            tree,
            node,
            ErrorImpl::NotAnExpression {
                node: tree.kind(node).name().to_string()
            }
        ));
    };

    let identifier = match expression {
        Expr::VariableRef { .. } | Expr::TempVariableRef { .. } => {
            let variable = resolved_variable(generator, node)?;
            emitter.get_variable_access(context, variable)
        }
        Expr::ConstantRef { constant } => emitter.get_constant_access(context, constant),
        Expr::Operation { operator, operands } => {
            let operands = gen_expressions(generator, context, operands)?;
            emitter.get_operation_code(*operator, &operands)
        }
        Expr::BoolOr { operands } => {
            let operands = gen_expressions(generator, context, operands)?;
            emitter.get_selection_or_code(&operands)
        }
        Expr::BoolAnd { operands } => {
            let operands = gen_expressions(generator, context, operands)?;
            emitter.get_selection_and_code(&operands)
        }
        Expr::Comparison {
            comparator,
            left,
            right,
        } => {
            let left = gen_expression(generator, context, *left)?;
            let right = gen_expression(generator, context, *right)?;
            emitter.get_comparison_expression_code(*comparator, &left, &right)
        }
        Expr::Conditional { condition, yes, no } => {
            let condition = gen_condition(generator, context, *condition, false)?;
            let yes = gen_expression(generator, context, *yes)?;
            let no = gen_expression(generator, context, *no)?;
            emitter.get_conditional_expression_code(&condition, &yes, &no)
        }
        Expr::MakeTuple { elements } => gen_tuple_creation(generator, context, elements)?,
        Expr::MakeList { elements } => gen_list_creation(generator, context, elements)?,
        Expr::MakeSet { elements } => gen_set_creation(generator, context, elements)?,
        Expr::MakeDict { pairs } => gen_dict_creation(generator, context, pairs)?,
        Expr::Call {
            called,
            positional,
            named,
            star_list,
            star_dict,
        } => {
            let called = gen_expression(generator, context, *called)?;
            let positional = if positional.is_empty() {
                None
            } else {
                Some(gen_tuple_creation(generator, context, positional)?)
            };
            let named = gen_named_arguments(generator, context, named)?;
            let star_list = gen_optional_expression(generator, context, *star_list)?;
            let star_dict = gen_optional_expression(generator, context, *star_dict)?;

            emitter.get_function_call_code(
                &called,
                positional.as_ref(),
                named.as_ref(),
                star_list.as_ref(),
                star_dict.as_ref(),
            )
        }
        Expr::AttributeLookup { source, attribute } => {
            let attribute = mangle_attribute_name(tree, attribute, node);
            let attribute = emitter.get_constant_handle(context, &Constant::str(&attribute));
            let source = gen_expression(generator, context, *source)?;
            emitter.get_attribute_lookup_code(&attribute, &source)
        }
        Expr::SpecialAttributeLookup { source, attribute } => {
            let attribute = emitter.get_constant_handle(context, &Constant::str(attribute));
            let source = gen_expression(generator, context, *source)?;
            emitter.get_special_attribute_lookup_code(&attribute, &source)
        }
        Expr::SubscriptLookup { source, subscript } => {
            let source = gen_expression(generator, context, *source)?;
            let subscript = gen_expression(generator, context, *subscript)?;
            emitter.get_subscript_lookup_code(&source, &subscript)
        }
        Expr::SliceLookup {
            source,
            lower,
            upper,
        } => gen_slice_lookup(generator, context, *source, *lower, *upper)?,
        Expr::SliceObject { lower, upper, step } => {
            let lower = gen_optional_expression(generator, context, *lower)?;
            let upper = gen_optional_expression(generator, context, *upper)?;
            let step = gen_optional_expression(generator, context, *step)?;
            emitter.get_slice_object_code(lower.as_ref(), upper.as_ref(), step.as_ref())
        }
        Expr::FunctionBody(_) => gen_function_body(generator, context, node, &[])?,
        Expr::FunctionBodyDefaulted {
            function_body,
            defaults,
        } => gen_function_body(generator, context, *function_body, defaults)?,
        Expr::ClassBody(_) => gen_class_body(generator, context, node, &[])?,
        Expr::ClassBodyBased { class_body, bases } => {
            gen_class_body(generator, context, *class_body, bases)?
        }
        Expr::Yield {
            expression,
            for_return,
        } => {
            let value = gen_expression(generator, context, *expression)?;
            emitter.get_yield_code(&value, *for_return)
        }
        Expr::ImportModule {
            module_name,
            import_list,
            level,
        } => {
            let globals = emitter.get_load_globals_code(context);
            let locals = gen_import_locals(generator, context, node, &globals)?;
            let module_name = emitter.get_constant_handle(context, &Constant::str(module_name));
            let import_list = match import_list {
                Some(names) => Constant::Tuple(names.iter().map(|name| Constant::str(name)).collect()),
                None => Constant::None,
            };
            let import_list = emitter.get_constant_handle(context, &import_list);
            let level = emitter.get_constant_handle(context, &Constant::int(i64::from(*level)));

            emitter.get_builtin_import_code(&module_name, &globals, &locals, &import_list, &level)
        }
        Expr::BuiltinImport {
            import_name,
            from_list,
            globals,
            locals,
            level,
        } => {
            let globals = match gen_optional_expression(generator, context, *globals)? {
                Some(globals) => globals,
                None => emitter.get_load_globals_code(context),
            };
            let locals = match gen_optional_expression(generator, context, *locals)? {
                Some(locals) => locals,
                None => gen_import_locals(generator, context, node, &globals)?,
            };
            let import_name = gen_expression(generator, context, *import_name)?;
            let from_list = gen_expression_or_constant(generator, context, *from_list, &Constant::None)?;
            let level = gen_expression_or_constant(generator, context, *level, &Constant::int(-1))?;

            emitter.get_builtin_import_code(&import_name, &globals, &locals, &from_list, &level)
        }
        Expr::ImportName {
            module,
            import_name,
        } => {
            let import_name = emitter.get_constant_handle(context, &Constant::str(import_name));
            let module = gen_expression(generator, context, *module)?;
            emitter.get_import_name_code(&import_name, &module)
        }
        Expr::BuiltinRange { low, high, step } => {
            let low = gen_expression(generator, context, *low)?;
            let high = gen_optional_expression(generator, context, *high)?;
            let step = gen_optional_expression(generator, context, *step)?;
            emitter.get_builtin_range_code(&low, high.as_ref(), step.as_ref())
        }
        Expr::BuiltinGlobals => emitter.get_load_globals_code(context),
        Expr::BuiltinLocals => gen_builtin_locals(generator, context, node)?,
        Expr::BuiltinDir0 => {
            let provider = variable_provider(generator, node)?;
            emitter.get_load_dir_code(context, provider)
        }
        Expr::BuiltinCall1 { builtin, value } => {
            let value = gen_expression(generator, context, *value)?;
            emitter.get_builtin_call1_code(*builtin, &value)
        }
        Expr::BuiltinIter2 { callable, sentinel } => {
            let callable = gen_expression(generator, context, *callable)?;
            let sentinel = gen_expression(generator, context, *sentinel)?;
            emitter.get_builtin_iter2_code(&callable, &sentinel)
        }
        Expr::BuiltinNext2 { iterator, default } => {
            let iterator = gen_expression(generator, context, *iterator)?;
            let default = gen_expression(generator, context, *default)?;
            emitter.get_builtin_next2_code(&iterator, &default)
        }
        Expr::BuiltinType3 {
            type_name,
            bases,
            dict,
        } => {
            let type_name = gen_expression(generator, context, *type_name)?;
            let bases = gen_expression(generator, context, *bases)?;
            let dict = gen_expression(generator, context, *dict)?;
            emitter.get_builtin_type3_code(context, &type_name, &bases, &dict)
        }
        Expr::BuiltinInt { kind, value, base } => {
            if *kind == IntKind::Long && generator.options.is_python3() {
                return Err(MK_INTERNAL_ERROR!(
                    tree,
                    node,
                    ErrorImpl::UnrecognisedNode {
                        node: String::from("ExpressionBuiltinLong")
                    }
                ));
            }

            let value = gen_optional_expression(generator, context, *value)?;
            let base = gen_optional_expression(generator, context, *base)?;
            emitter.get_builtin_int_code(*kind, value.as_ref(), base.as_ref())
        }
        Expr::BuiltinDict { positional, named } => {
            let positional = gen_optional_expression(generator, context, *positional)?;
            let named = gen_named_arguments(generator, context, named)?;
            emitter.get_builtin_dict_code(positional.as_ref(), named.as_ref())
        }
        Expr::BuiltinOpen {
            filename,
            mode,
            buffering,
        } => {
            let filename = gen_optional_expression(generator, context, *filename)?;
            let mode = gen_optional_expression(generator, context, *mode)?;
            let buffering = gen_optional_expression(generator, context, *buffering)?;
            emitter.get_builtin_open_code(filename.as_ref(), mode.as_ref(), buffering.as_ref())
        }
        Expr::BuiltinEval {
            mode,
            source_code,
            globals,
            locals,
        } => {
            let parts = gen_eval_parts(generator, context, node, *mode, *source_code, *globals, *locals)?;
            emitter.get_eval_code(
                context,
                &parts.source_code,
                &parts.globals,
                &parts.locals,
                &parts.filename,
                &parts.mode,
                &parts.future_flags,
            )
        }
        Expr::RaiseException {
            exception_type,
            exception_value,
            side_effects,
        } => {
            let side_effects = gen_expressions(generator, context, side_effects)?;
            let exception_type = gen_expression(generator, context, *exception_type)?;
            let exception_value = gen_optional_expression(generator, context, *exception_value)?;
            let tb_maker =
                emitter.get_traceback_making_identifier(context, tree.source_ref(node).line);

            emitter.get_raise_exception_expression_code(
                &side_effects,
                &exception_type,
                exception_value.as_ref(),
                &tb_maker,
            )
        }
        Expr::BuiltinMakeException {
            exception_name,
            args,
        } => {
            let args = gen_expressions(generator, context, args)?;
            emitter.get_make_builtin_exception_code(context, exception_name, &args)
        }
        Expr::BuiltinRef { builtin_name } => emitter.get_builtin_ref_code(context, builtin_name),
        Expr::BuiltinAnonymousRef { builtin_name } => {
            emitter.get_builtin_anonymous_ref_code(builtin_name)
        }
        Expr::BuiltinExceptionRef { exception_name } => {
            emitter.get_exception_ref_code(exception_name)
        }
        Expr::AssignmentVariable { target, source } => {
            let source = gen_expression(generator, context, *source)?;
            let variable = resolved_variable(generator, *target)?;
            emitter.get_assignment_expression_code(context, variable, &source)
        }
        Expr::CaughtException { part } => emitter.get_current_exception_code(*part),
        Expr::ListAppend { list, value } => {
            let list = gen_expression(generator, context, *list)?;
            let value = gen_expression(generator, context, *value)?;
            emitter.get_list_operation_append_code(&list, &value)
        }
        Expr::SetAdd { set, value } => {
            let set = gen_expression(generator, context, *set)?;
            let value = gen_expression(generator, context, *value)?;
            emitter.get_set_operation_add_code(&set, &value)
        }
        Expr::DictSet { dict, key, value } => {
            let dict = gen_expression(generator, context, *dict)?;
            let value = gen_expression(generator, context, *value)?;
            let key = gen_expression(generator, context, *key)?;
            emitter.get_dict_operation_set_code(&dict, &key, &value)
        }
        Expr::SpecialUnpack { value, count } => {
            let iterator = gen_expression(generator, context, *value)?;
            emitter.get_unpack_next_code(&iterator, *count)
        }
    };

    identifier
        .check()
        .map_err(|error| MK_INTERNAL_ERROR!(tree, node, error))?;

    Ok(identifier)
}

pub fn gen_optional_expression(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    node: Option<NodeId>,
) -> Result<Option<Identifier>, Error> {
    node.map(|node| gen_expression(generator, context, node))
        .transpose()
}

/// Translates expressions in order.
pub fn gen_expressions(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    nodes: &[NodeId],
) -> Result<Vec<Identifier>, Error> {
    nodes
        .iter()
        .map(|node| gen_expression(generator, context, *node))
        .collect()
}

fn gen_expression_or_constant(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    node: Option<NodeId>,
    default: &Constant,
) -> Result<Identifier, Error> {
    match node {
        Some(node) => gen_expression(generator, context, node),
        None => Ok(generator.emitter.get_constant_handle(context, default)),
    }
}

/// The variable a reference node is bound to.
///
/// An unresolved reference is a defect of name resolution and fails.
pub fn resolved_variable<'t>(generator: &CodeGenerator<'t>, node: NodeId) -> Result<&'t Variable, Error> {
    let tree = generator.tree;

    match tree.expr(node) {
        Some(Expr::VariableRef {
            variable: Some(variable),
            ..
        })
        | Some(Expr::TempVariableRef { variable }) => Ok(variable),
        Some(Expr::VariableRef {
            name,
            variable: None,
        }) => Err(MK_INTERNAL_ERROR!(
            tree,
            node,
            ErrorImpl::UnresolvedVariable {
                variable: name.clone()
            }
        )),
        Some(_) => Err(MK_INTERNAL_ERROR!(
            tree,
            node,
            ErrorImpl::UnrecognisedNode {
                node: tree.kind(node).name().to_string()
            }
        )),
        None => Err(MK_INTERNAL_ERROR!(
            tree,
            node,
            ErrorImpl::NotAnExpression {
                node: tree.kind(node).name().to_string()
            }
        )),
    }
}

/// The constants of `nodes` if every one of them is an immutable constant.
fn immutable_constants(generator: &CodeGenerator, nodes: &[NodeId]) -> Option<Vec<Constant>> {
    let tree = generator.tree;

    nodes
        .iter()
        .map(|node| {
            tree.constant(*node)
                .filter(|constant| !constant.is_mutable())
                .cloned()
        })
        .collect()
}

pub fn gen_tuple_creation(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    elements: &[NodeId],
) -> Result<Identifier, Error> {
    if let Some(constants) = immutable_constants(generator, elements) {
        return Ok(generator
            .emitter
            .get_constant_handle(context, &Constant::Tuple(constants)));
    }

    let elements = gen_expressions(generator, context, elements)?;
    Ok(generator.emitter.get_tuple_creation_code(context, &elements))
}

pub fn gen_list_creation(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    elements: &[NodeId],
) -> Result<Identifier, Error> {
    if let Some(constants) = immutable_constants(generator, elements) {
        return Ok(generator
            .emitter
            .get_constant_handle(context, &Constant::List(constants)));
    }

    let elements = gen_expressions(generator, context, elements)?;
    Ok(generator.emitter.get_list_creation_code(context, &elements))
}

pub fn gen_set_creation(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    elements: &[NodeId],
) -> Result<Identifier, Error> {
    if let Some(constants) = immutable_constants(generator, elements) {
        return Ok(generator
            .emitter
            .get_constant_handle(context, &Constant::Set(constants)));
    }

    let elements = gen_expressions(generator, context, elements)?;
    Ok(generator.emitter.get_set_creation_code(&elements))
}

pub fn gen_dict_creation(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    pairs: &[(NodeId, NodeId)],
) -> Result<Identifier, Error> {
    let (keys, values): (Vec<NodeId>, Vec<NodeId>) = pairs.iter().copied().unzip();

    if let (Some(keys), Some(values)) = (
        immutable_constants(generator, &keys),
        immutable_constants(generator, &values),
    ) {
        let constant = Constant::Dict(keys.into_iter().zip(values).collect());
        return Ok(generator.emitter.get_constant_handle(context, &constant));
    }

    let keys = gen_expressions(generator, context, &keys)?;
    let values = gen_expressions(generator, context, &values)?;
    Ok(generator
        .emitter
        .get_dictionary_creation_code(context, &keys, &values))
}

fn gen_named_arguments(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    pairs: &[(NodeId, NodeId)],
) -> Result<Option<Identifier>, Error> {
    if pairs.is_empty() {
        return Ok(None);
    }

    gen_dict_creation(generator, context, pairs).map(Some)
}

/// The module, function or class providing variables to `node`.
pub fn variable_provider<'t>(generator: &CodeGenerator<'t>, node: NodeId) -> Result<Provider<'t>, Error> {
    let tree = generator.tree;

    tree.parent_variable_provider(node)
        .and_then(|provider| tree.provider(provider))
        .ok_or_else(|| {
            MK_INTERNAL_ERROR!(
                tree,
                node,
                ErrorImpl::UnrecognisedNode {
                    node: tree.kind(node).name().to_string()
                }
            )
        })
}

/// `locals()` is live in class bodies and unoptimized functions, a snapshot
/// elsewhere.
pub fn gen_builtin_locals(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    node: NodeId,
) -> Result<Identifier, Error> {
    let provider = variable_provider(generator, node)?;
    let mode = if provider.has_updated_locals() {
        LocalsMode::Updated
    } else {
        LocalsMode::Copy
    };

    Ok(generator.emitter.get_load_locals_code(context, provider, mode))
}

/// At module level the globals dict doubles as locals.
fn gen_import_locals(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    node: NodeId,
    globals: &Identifier,
) -> Result<Identifier, Error> {
    if variable_provider(generator, node)?.is_module() {
        Ok(globals.clone())
    } else {
        gen_builtin_locals(generator, context, node)
    }
}

/// Operands shared by `eval`, `exec` and `execfile`.
pub struct EvalParts {
    pub source_code: Identifier,
    pub globals: Identifier,
    pub locals: Identifier,
    pub filename: Identifier,
    pub mode: Identifier,
    pub future_flags: String,
}

#[allow(clippy::too_many_arguments)]
pub fn gen_eval_parts(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    node: NodeId,
    mode: EvalMode,
    source_code: NodeId,
    globals: Option<NodeId>,
    locals: Option<NodeId>,
) -> Result<EvalParts, Error> {
    let emitter = generator.emitter;

    let globals = gen_expression_or_constant(generator, context, globals, &Constant::None)?;
    let locals = gen_expression_or_constant(generator, context, locals, &Constant::None)?;
    let filename = match mode {
        EvalMode::Eval | EvalMode::Exec => "<string>",
        EvalMode::Execfile => "<execfile>",
    };
    let filename = emitter.get_constant_handle(context, &Constant::str(filename));
    let mode = match mode {
        EvalMode::Eval => "eval",
        EvalMode::Exec | EvalMode::Execfile => "exec",
    };
    let mode = emitter.get_constant_handle(context, &Constant::str(mode));
    let future_flags = emitter.get_future_flags_code(&generator.tree.source_ref(node).future);
    let source_code = gen_expression(generator, context, source_code)?;

    Ok(EvalParts {
        source_code,
        globals,
        locals,
        filename,
        mode,
        future_flags,
    })
}
