use crate::{
    ast::{
        ast::NodeId,
        constants::Constant,
        expressions::{Builtin1, CaughtExceptionPart, EvalMode, Expr},
        statements::Stmt,
    },
    errors::errors::{Error, ErrorImpl},
    MK_INTERNAL_ERROR,
};

use super::{
    condition::gen_condition,
    context::{Context, ScopeKind},
    expr::{gen_eval_parts, gen_expression, gen_expressions, gen_optional_expression, resolved_variable},
    generator::{gen_optional_statement_sequence, gen_statement_sequence, CodeGenerator},
    identifier::Identifier,
    names::mangle_attribute_name,
    slices::{gen_slice_assignment, gen_slice_del},
};

/// Translates one statement into statement code.
///
/// # Arguments
///
/// * `generator` - The generator state
/// * `context` - The translation context
/// * `statement` - A statement node
///
/// # Returns
///
/// * `Result<String, Error>` - The code, possibly empty, never surrounded by
///   whitespace
pub fn gen_statement(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    statement: NodeId,
) -> Result<String, Error> {
    let tree = generator.tree;
    let emitter = generator.emitter;

    let Some(stmt) = tree.stmt(statement) else {
        return Err(MK_INTERNAL_ERROR!(
            tree,
            statement,
            ErrorImpl::NotAStatement {
                node: tree.kind(statement).name().to_string()
            }
        ));
    };

    let code = match stmt {
        Stmt::AssignVariable { target, source } => {
            let value = gen_expression(generator, context, *source)?;
            let variable = resolved_variable(generator, *target)?;
            emitter.get_variable_assignment_code(context, variable, &value)
        }
        Stmt::AssignAttribute {
            source,
            attribute,
            value,
        } => {
            let value = gen_expression(generator, context, *value)?;
            let target = gen_expression(generator, context, *source)?;
            let attribute = mangle_attribute_name(tree, attribute, statement);
            let attribute = emitter.get_constant_handle(context, &Constant::str(&attribute));
            emitter.get_attribute_assignment_code(&target, &attribute, &value)
        }
        Stmt::AssignSubscript {
            subscribed,
            subscript,
            value,
        } => {
            let value = gen_expression(generator, context, *value)?;
            let subscribed = gen_expression(generator, context, *subscribed)?;
            let subscript = gen_expression(generator, context, *subscript)?;
            emitter.get_subscript_assignment_code(&subscribed, &subscript, &value)
        }
        Stmt::AssignSlice {
            source,
            lower,
            upper,
            value,
        } => {
            let value = gen_expression(generator, context, *value)?;
            gen_slice_assignment(generator, context, *source, *lower, *upper, &value)?
        }
        Stmt::DelVariable { target } => {
            let variable = resolved_variable(generator, *target)?;
            emitter.get_variable_del_code(context, variable)
        }
        Stmt::DelAttribute { source, attribute } => {
            let target = gen_expression(generator, context, *source)?;
            let attribute = mangle_attribute_name(tree, attribute, statement);
            let attribute = emitter.get_constant_handle(context, &Constant::str(&attribute));
            emitter.get_attribute_del_code(&target, &attribute)
        }
        Stmt::DelSubscript {
            subscribed,
            subscript,
        } => {
            let subscribed = gen_expression(generator, context, *subscribed)?;
            let subscript = gen_expression(generator, context, *subscript)?;
            emitter.get_subscript_del_code(&subscribed, &subscript)
        }
        Stmt::DelSlice {
            source,
            lower,
            upper,
        } => gen_slice_del(generator, context, *source, *lower, *upper)?,
        Stmt::TempBlock { body } => {
            let codes = gen_statement_sequence(generator, context, *body)?;
            emitter.get_block_code(&codes)
        }
        Stmt::ExpressionOnly { expression } => {
            let value = gen_expression(generator, context, *expression)?;
            emitter.get_statement_code(&value)
        }
        Stmt::Print {
            destination,
            values,
            newline,
        } => {
            let destination = gen_optional_expression(generator, context, *destination)?;
            let values = gen_expressions(generator, context, values)?;
            emitter.get_print_code(destination.as_ref(), &values, *newline)
        }
        Stmt::Return { expression } => {
            if tree.parent_function(statement).is_some_and(|function| function.is_generator) {
                emitter.get_yield_terminator_code()
            } else {
                let value = gen_expression(generator, context, *expression)?;
                emitter.get_return_code(&value)
            }
        }
        Stmt::Loop {
            body,
            needs_exceptions,
        } => {
            let codes = gen_optional_statement_sequence(generator, context, *body)?;
            emitter.get_loop_code(codes.as_deref(), *needs_exceptions)
        }
        Stmt::Conditional { condition, yes, no } => {
            let condition = gen_condition(generator, context, *condition, false)?;
            let yes = gen_optional_statement_sequence(generator, context, *yes)?;
            let no = gen_optional_statement_sequence(generator, context, *no)?;
            emitter.get_branch_code(&condition, yes.as_deref(), no.as_deref())
        }
        Stmt::ContinueLoop { needs_exceptions } => emitter.get_loop_continue_code(*needs_exceptions),
        Stmt::BreakLoop { needs_exceptions } => emitter.get_loop_break_code(*needs_exceptions),
        Stmt::ImportStar { module } => {
            let module = gen_expression(generator, context, *module)?;
            emitter.get_import_from_star_code(context, &module)
        }
        Stmt::TryFinally { tried, final_block } => {
            let try_number = context.allocate_try_number();
            let tried = gen_statement_sequence(generator, context, *tried)?;
            let final_block = gen_statement_sequence(generator, context, *final_block)?;
            emitter.get_try_finally_code(try_number, &tried, &final_block)
        }
        Stmt::TryExcept {
            tried,
            handlers,
            no_raise,
        } => gen_try_except(generator, context, *tried, handlers, *no_raise)?,
        Stmt::RaiseException {
            exception_type,
            exception_value,
            exception_trace,
        } => gen_raise(
            generator,
            context,
            statement,
            *exception_type,
            *exception_value,
            *exception_trace,
        )?,
        Stmt::Exec {
            source_code,
            globals,
            locals,
        } => {
            let parts = gen_eval_parts(
                generator,
                context,
                statement,
                EvalMode::Exec,
                *source_code,
                *globals,
                *locals,
            )?;
            emitter.get_exec_code(
                context,
                &parts.source_code,
                &parts.globals,
                &parts.locals,
                &parts.filename,
                &parts.mode,
                &parts.future_flags,
            )
        }
        Stmt::ExecInline { body } => {
            context.push_scope(ScopeKind::ExecInline);
            let codes = gen_statement_sequence(generator, context, *body);
            context.pop_scope();
            emitter.get_block_code(&codes?)
        }
        Stmt::SpecialUnpackCheck { iterator, count } => {
            let iterator = gen_expression(generator, context, *iterator)?;
            emitter.get_unpack_check_code(&iterator, *count)
        }
        Stmt::DeclareGlobal { .. } => String::new(),
    };

    if code != code.trim() {
        return Err(MK_INTERNAL_ERROR!(
            tree,
            statement,
            ErrorImpl::MalformedCode { code }
        ));
    }

    Ok(code)
}

fn gen_raise(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    statement: NodeId,
    exception_type: Option<NodeId>,
    exception_value: Option<NodeId>,
    exception_trace: Option<NodeId>,
) -> Result<String, Error> {
    let tree = generator.tree;
    let emitter = generator.emitter;

    let Some(exception_type) = exception_type else {
        return Ok(emitter.get_re_raise_exception_code(tree.is_reraise_local(statement)));
    };

    let exception_type = gen_expression(generator, context, exception_type)?;
    let exception_value = gen_optional_expression(generator, context, exception_value)?;
    // A traceback is only passed along with a value.
    let exception_trace = match exception_value {
        Some(_) => gen_optional_expression(generator, context, exception_trace)?,
        None => None,
    };

    let code = match (exception_value, exception_trace) {
        (Some(value), Some(trace)) => {
            emitter.get_raise_exception_code(&exception_type, Some(&value), Some(&trace), None)
        }
        (value, _) => {
            let tb_maker = emitter.get_traceback_making_identifier(context, tree.source_ref(statement).line);
            emitter.get_raise_exception_code(&exception_type, value.as_ref(), None, Some(&tb_maker))
        }
    };

    Ok(code)
}

/// The pieces of a `try: x = next(it) except StopIteration: <abort>` block
/// that compiles to a direct fetch with a NULL check.
struct NextFastPath {
    target: NodeId,
    iterator: NodeId,
    branch: NodeId,
}

fn match_next_fast_path(
    generator: &CodeGenerator,
    tried: NodeId,
    handlers: &[NodeId],
    no_raise: Option<NodeId>,
) -> Option<NextFastPath> {
    let tree = generator.tree;

    if no_raise.is_some() || handlers.len() != 1 {
        return None;
    }

    let [assignment] = tree.sequence(tried)?.statements.as_slice() else {
        return None;
    };
    let Some(Stmt::AssignVariable { target, source }) = tree.stmt(*assignment) else {
        return None;
    };
    let Some(Expr::BuiltinCall1 {
        builtin: Builtin1::Next,
        value,
    }) = tree.expr(*source)
    else {
        return None;
    };
    if tree.may_raise_exception(*value) {
        return None;
    }

    let handler = tree.handler(handlers[0])?;
    if handler.target.is_some() {
        return None;
    }
    let [exception_type] = handler.exception_types.as_slice() else {
        return None;
    };
    let Some(Expr::BuiltinExceptionRef { exception_name }) = tree.expr(*exception_type) else {
        return None;
    };
    if exception_name != "StopIteration" {
        return None;
    }

    let branch = handler.branch?;
    if !tree.is_statement_abortative(branch) {
        return None;
    }

    Some(NextFastPath {
        target: *target,
        iterator: *value,
        branch,
    })
}

fn gen_try_except(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    tried: NodeId,
    handlers: &[NodeId],
    no_raise: Option<NodeId>,
) -> Result<String, Error> {
    let tree = generator.tree;
    let emitter = generator.emitter;

    if let Some(fast_path) = match_next_fast_path(generator, tried, handlers, no_raise) {
        let tmp_number = context.allocate_for_loop_number();
        let source = gen_expression(generator, context, fast_path.iterator)?;
        let handler_codes = gen_statement_sequence(generator, context, fast_path.branch)?;
        let variable = resolved_variable(generator, fast_path.target)?;
        let assignment = emitter.get_variable_assignment_code(
            context,
            variable,
            &emitter.get_temp_unpack_identifier(tmp_number),
        );

        tracing::trace!("next() with StopIteration handler compiled to fetch #{}", tmp_number);

        return Ok(emitter.get_try_next_exception_stop_iteration_code(
            tmp_number,
            &source,
            &handler_codes,
            &assignment,
        ));
    }

    let try_number = context.allocate_try_number();
    let tried = gen_statement_sequence(generator, context, tried)?;

    let mut handler_codes = Vec::new();
    for (index, handler_node) in handlers.iter().enumerate() {
        let Some(handler) = tree.handler(*handler_node) else {
            return Err(MK_INTERNAL_ERROR!(
                tree,
                *handler_node,
                ErrorImpl::UnrecognisedNode {
                    node: tree.kind(*handler_node).name().to_string()
                }
            ));
        };

        let exception_types = gen_expressions(generator, context, &handler.exception_types)?;

        let mut codes = Vec::new();
        if let Some(target) = handler.target {
            codes.push(gen_handler_target(generator, context, target)?);
        }
        if let Some(branch) = gen_optional_statement_sequence(generator, context, handler.branch)? {
            codes.extend(branch);
        }

        handler_codes.extend(emitter.get_try_except_handler_code(&exception_types, &codes, index == 0));
    }

    let else_code = gen_optional_statement_sequence(generator, context, no_raise)?;

    Ok(emitter.get_try_except_code(try_number, &tried, &handler_codes, else_code.as_deref()))
}

/// Binds the caught exception value to the handler's `as` target.
fn gen_handler_target(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    target: NodeId,
) -> Result<String, Error> {
    let emitter = generator.emitter;
    let value: Identifier = emitter.get_current_exception_code(CaughtExceptionPart::Value);
    let variable = resolved_variable(generator, target)?;

    Ok(emitter.get_variable_assignment_code(context, variable, &value))
}
