//! Function and class bodies.
//!
//! Both translate their body inside a scope of their own, register the
//! declaration and definition text with the enclosing scope and evaluate to
//! the expression creating the function object or class.

use crate::{
    ast::{
        ast::{NodeId, Provider},
        expressions::Expr,
    },
    errors::errors::{Error, ErrorImpl},
    MK_INTERNAL_ERROR,
};

use super::{
    context::{Context, ScopeKind},
    emitter::LocalsMode,
    expr::{gen_expression, gen_tuple_creation},
    generator::{gen_optional_statement_sequence, CodeGenerator},
    identifier::Identifier,
};

/// Translates a function body together with its default values.
///
/// Defaults are evaluated in the enclosing scope. Immutable constant
/// defaults are accessed directly; every other default is passed to the
/// creation call and read back through the function object.
///
/// # Arguments
///
/// * `generator` - The generator state
/// * `context` - The translation context, positioned at the enclosing scope
/// * `function_node` - A function body node
/// * `defaults` - Default value expressions, one per defaulted parameter
///
/// # Returns
///
/// * `Result<Identifier, Error>` - The function creation expression
pub fn gen_function_body(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    function_node: NodeId,
    defaults: &[NodeId],
) -> Result<Identifier, Error> {
    let tree = generator.tree;
    let emitter = generator.emitter;

    let Some(Expr::FunctionBody(function)) = tree.expr(function_node) else {
        return Err(MK_INTERNAL_ERROR!(
            tree,
            function_node,
            ErrorImpl::UnrecognisedNode {
                node: tree.kind(function_node).name().to_string()
            }
        ));
    };

    let parameters = function.parameters.default_parameter_variables();
    if parameters.len() != defaults.len() {
        return Err(MK_INTERNAL_ERROR!(
            tree,
            function_node,
            ErrorImpl::MismatchedDefaults {
                defaults: defaults.len(),
                parameters: parameters.len(),
            }
        ));
    }

    let mut default_access = Vec::with_capacity(defaults.len());
    let mut default_values = Vec::new();

    for (default, variable) in defaults.iter().zip(parameters) {
        match tree.constant(*default).filter(|constant| !constant.is_mutable()) {
            Some(constant) => default_access.push(emitter.get_constant_access(context, constant)),
            None => {
                default_values.push(gen_expression(generator, context, *default)?);
                default_access.push(emitter.get_default_value_access(variable));
            }
        }
    }

    context.push_scope(ScopeKind::Function {
        code_name: function.code_name.clone(),
        is_generator: function.is_generator,
    });
    let codes = gen_optional_statement_sequence(generator, context, function.body);
    context.pop_scope();
    let codes = codes?.unwrap_or_default();

    let source_ref = tree.source_ref(function_node);
    let code = if function.is_generator {
        emitter.get_generator_function_code(context, function, source_ref, &default_access, &codes)
    } else {
        emitter.get_function_code(context, function, source_ref, &default_access, &codes)
    };
    let decl = emitter.get_function_decl(
        context,
        &function.code_name,
        default_values.len(),
        &function.closure_variables,
    );

    tracing::debug!(
        "function {} as {}, generator: {}",
        function.name,
        function.code_name,
        function.is_generator
    );
    context.add_function_codes(&function.code_name, decl, code);

    Ok(emitter.get_function_creation_code(
        context,
        &function.code_name,
        &default_values,
        &function.closure_variables,
    ))
}

/// Translates a class body and the creation of the class from its bases.
pub fn gen_class_body(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    class_node: NodeId,
    bases: &[NodeId],
) -> Result<Identifier, Error> {
    let tree = generator.tree;
    let emitter = generator.emitter;

    let Some(Expr::ClassBody(class)) = tree.expr(class_node) else {
        return Err(MK_INTERNAL_ERROR!(
            tree,
            class_node,
            ErrorImpl::UnrecognisedNode {
                node: tree.kind(class_node).name().to_string()
            }
        ));
    };

    let bases = gen_tuple_creation(generator, context, bases)?;

    context.push_scope(ScopeKind::Class {
        code_name: class.code_name.clone(),
        class_name: class.name.clone(),
    });
    let codes = gen_optional_statement_sequence(generator, context, class.body);
    let locals = emitter.get_load_locals_code(context, Provider::Class(class), LocalsMode::Updated);
    context.pop_scope();

    let mut codes = codes?.unwrap_or_default();
    codes.push(emitter.get_return_code(&locals));

    let dict = emitter.get_class_dict_creation_code(context, &class.code_name, &class.closure_variables);
    let creation = emitter.get_class_creation_code(context, &class.name, &bases, &dict);

    let decl = emitter.get_class_decl(context, &class.code_name, &class.closure_variables);
    let code = emitter.get_class_code(context, class, tree.source_ref(class_node), &codes);

    tracing::debug!("class {} as {}", class.name, class.code_name);
    context.add_class_codes(&class.code_name, decl, code);

    Ok(creation)
}
