//! Code generator entry points.
//!
//! This module holds the generator state shared by the expression and
//! statement translators and implements the module level pipeline:
//! statement sequences with line tracking, whole modules and the assembly
//! helpers a driver needs to link several modules into one program.

use crate::{
    ast::{
        ast::{NodeId, Tree},
        constants::Constant,
        statements::Module,
    },
    config::Options,
    errors::errors::{Error, ErrorImpl},
    MK_INTERNAL_ERROR,
};

use super::{
    context::{Context, GlobalContext},
    emitter::Emitter,
    stmt::gen_statement,
};

/// The read-only state every translation function receives.
///
/// The tree is never mutated during generation; all mutable state lives in
/// the `Context` passed alongside.
pub struct CodeGenerator<'a> {
    /// The resolved and optimized tree
    pub tree: &'a Tree,
    /// The target syntax
    pub emitter: &'a dyn Emitter,
    pub options: &'a Options,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(tree: &'a Tree, emitter: &'a dyn Emitter, options: &'a Options) -> Self {
        CodeGenerator {
            tree,
            emitter,
            options,
        }
    }
}

/// Translates a statement sequence into statement lines.
///
/// A line-number marker precedes the first statement of every run of
/// statements sharing a source location. Statements producing no code are
/// skipped.
///
/// # Arguments
///
/// * `generator` - The generator state
/// * `context` - The translation context
/// * `sequence` - A statement sequence node
///
/// # Returns
///
/// * `Result<Vec<String>, Error>` - The statement lines
pub fn gen_statement_sequence(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    sequence: NodeId,
) -> Result<Vec<String>, Error> {
    let tree = generator.tree;
    let Some(statements) = tree.sequence(sequence) else {
        return Err(MK_INTERNAL_ERROR!(
            tree,
            sequence,
            ErrorImpl::NotAStatementSequence {
                node: tree.kind(sequence).name().to_string()
            }
        ));
    };

    let mut codes = Vec::new();
    let mut last_ref = None;

    for statement in &statements.statements {
        let statement = *statement;
        let source_ref = tree.source_ref(statement);

        if generator.options.trace_execution {
            codes.push(
                generator
                    .emitter
                    .get_statement_trace(&source_ref.get_as_string(), tree.kind(statement).name()),
            );
        }

        let code = gen_statement(generator, context, statement).inspect_err(|_| {
            tracing::error!(
                "Problem with {} at {}",
                tree.kind(statement).name(),
                source_ref
            )
        })?;

        if code.is_empty() {
            continue;
        }

        if last_ref != Some(source_ref) {
            codes.push(generator.emitter.get_line_number_code(source_ref));
            last_ref = Some(source_ref);
        }

        if code.lines().any(|line| line.trim().is_empty()) {
            return Err(MK_INTERNAL_ERROR!(
                tree,
                statement,
                ErrorImpl::MalformedCode { code }
            ));
        }

        codes.extend(code.lines().map(str::to_string));
    }

    Ok(codes)
}

pub fn gen_optional_statement_sequence(
    generator: &CodeGenerator,
    context: &mut Context<'_>,
    sequence: Option<NodeId>,
) -> Result<Option<Vec<String>>, Error> {
    sequence
        .map(|sequence| gen_statement_sequence(generator, context, sequence))
        .transpose()
}

/// Translates a whole module.
///
/// A fresh `Context` is created for the module, borrowing the global
/// context so constants are shared with the other modules of the program.
///
/// # Arguments
///
/// * `generator` - The generator state
/// * `module` - The module node, normally the root of the tree
/// * `module_name` - Full dotted name of the module
/// * `global` - The program-wide context
///
/// # Returns
///
/// * `Result<String, Error>` - The module text
pub fn gen_module(
    generator: &CodeGenerator,
    module: NodeId,
    module_name: &str,
    global: &mut GlobalContext,
) -> Result<String, Error> {
    let tree = generator.tree;
    let Some(module_node) = tree.module(module) else {
        return Err(MK_INTERNAL_ERROR!(
            tree,
            module,
            ErrorImpl::NotAModule {
                node: tree.kind(module).name().to_string()
            }
        ));
    };

    let emitter = generator.emitter;
    let code_name = emitter.get_module_identifier(module_name);
    let mut context = Context::new(global, module_name, &code_name, &module_node.filename);

    tracing::debug!("generating module {} as {}", module_name, code_name);

    let codes = gen_optional_statement_sequence(generator, &mut context, module_node.body)?
        .unwrap_or_default();

    let doc = match &module_node.doc {
        Some(doc) => Constant::str(doc),
        None => Constant::None,
    };
    let doc = emitter.get_constant_handle(&mut context, &doc);
    let filename = emitter.get_constant_handle(&mut context, &Constant::str(&module_node.filename));
    let path = module_node.path.as_ref().map(|path| {
        let entries = path.iter().map(|entry| Constant::str(entry)).collect();
        emitter.get_constant_handle(&mut context, &Constant::List(entries))
    });

    Ok(emitter.get_module_code(
        &mut context,
        module_node,
        module_name,
        &doc,
        &filename,
        path.as_ref(),
        &codes,
    ))
}

pub fn gen_module_declaration_code(emitter: &dyn Emitter, module_name: &str) -> String {
    emitter.get_module_declaration_code(module_name)
}

/// Program entry text, initialising every other module before `__main__`.
pub fn gen_main_code(emitter: &dyn Emitter, codes: &[String], other_modules: &[&Module]) -> String {
    let other_module_names: Vec<String> = other_modules
        .iter()
        .map(|module| module.full_name())
        .collect();

    emitter.get_main_code(codes, &other_module_names)
}

pub fn gen_constants_declaration_code(emitter: &dyn Emitter, global: &GlobalContext) -> String {
    emitter.get_constants_declaration_code(global)
}

pub fn gen_constants_definition_code(emitter: &dyn Emitter, global: &GlobalContext) -> String {
    emitter.get_constants_definition_code(global)
}

/// Construction helpers for every tuple, list and dict arity used so far.
pub fn gen_helpers_code(emitter: &dyn Emitter, global: &GlobalContext) -> String {
    [
        emitter.get_make_tuples_code(global),
        emitter.get_make_lists_code(global),
        emitter.get_make_dicts_code(global),
    ]
    .into_iter()
    .filter(|code| !code.is_empty())
    .collect::<Vec<String>>()
    .join("\n\n")
}
