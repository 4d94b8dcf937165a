use std::collections::BTreeSet;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

use crate::ast::constants::Constant;

lazy_static! {
    static ref PLAIN_NAME: Regex = Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

/// An interned constant and the handle the generated code refers to it by.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantEntry {
    pub handle: String,
    pub constant: Constant,
}

/// Global Context
///
/// State shared by every module translated in one program:
/// - The constant table, in first-use order
/// - The tuple, list and dict construction arities the emitter needed
#[derive(Debug, Default)]
pub struct GlobalContext {
    constants: IndexMap<String, ConstantEntry>,
    tuple_arities: BTreeSet<usize>,
    list_arities: BTreeSet<usize>,
    dict_arities: BTreeSet<usize>,
}

impl GlobalContext {
    pub fn new() -> Self {
        GlobalContext::default()
    }

    /// Returns the stable handle of a constant, interning it on first use.
    pub fn get_constant_handle(&mut self, constant: &Constant) -> String {
        let key = constant.key();

        if let Some(entry) = self.constants.get(&key) {
            return entry.handle.clone();
        }

        let handle = match constant {
            Constant::Str(value) if PLAIN_NAME.is_match(value) => {
                format!("const_str_plain_{}", value)
            }
            Constant::Str(value) if value.is_empty() => String::from("const_str_empty"),
            Constant::Tuple(elements) if elements.is_empty() => String::from("const_tuple_empty"),
            Constant::None => String::from("const_none"),
            _ => format!("const_{}_{}", constant.kind_name(), self.constants.len()),
        };

        self.constants.insert(
            key,
            ConstantEntry {
                handle: handle.clone(),
                constant: constant.clone(),
            },
        );

        handle
    }

    pub fn constants(&self) -> impl Iterator<Item = &ConstantEntry> {
        self.constants.values()
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    pub fn add_tuple_arity(&mut self, arity: usize) {
        self.tuple_arities.insert(arity);
    }

    pub fn add_list_arity(&mut self, arity: usize) {
        self.list_arities.insert(arity);
    }

    pub fn add_dict_arity(&mut self, arity: usize) {
        self.dict_arities.insert(arity);
    }

    pub fn tuple_arities(&self) -> &BTreeSet<usize> {
        &self.tuple_arities
    }

    pub fn list_arities(&self) -> &BTreeSet<usize> {
        &self.list_arities
    }

    pub fn dict_arities(&self) -> &BTreeSet<usize> {
        &self.dict_arities
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function {
        code_name: String,
        is_generator: bool,
    },
    Class {
        code_name: String,
        class_name: String,
    },
    /// Inline `exec` code, emitted into the enclosing body.
    ExecInline,
}

/// Declaration and definition text of a nested function or class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub decl: String,
    pub code: String,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    try_count: usize,
    for_loop_count: usize,
    function_codes: IndexMap<String, Declaration>,
    class_codes: IndexMap<String, Declaration>,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Scope {
            kind,
            try_count: 0,
            for_loop_count: 0,
            function_codes: IndexMap::new(),
            class_codes: IndexMap::new(),
        }
    }

    pub fn function_codes(&self) -> &IndexMap<String, Declaration> {
        &self.function_codes
    }

    pub fn class_codes(&self) -> &IndexMap<String, Declaration> {
        &self.class_codes
    }
}

/// Context
///
/// Per-module translation state. Borrows the GlobalContext for the
/// duration of the module and keeps a LIFO stack of scopes.
pub struct Context<'g> {
    global: &'g mut GlobalContext,
    module_name: String,
    code_name: String,
    filename: String,
    scopes: Vec<Scope>,
}

impl<'g> Context<'g> {
    /// Creates a context with the module scope already pushed.
    ///
    /// # Arguments
    ///
    /// * `global` - The program-wide context
    /// * `module_name` - Dotted module name
    /// * `code_name` - Identifier-safe module name used in the output
    /// * `filename` - Source file of the module
    pub fn new(
        global: &'g mut GlobalContext,
        module_name: &str,
        code_name: &str,
        filename: &str,
    ) -> Self {
        Context {
            global,
            module_name: module_name.to_string(),
            code_name: code_name.to_string(),
            filename: filename.to_string(),
            scopes: vec![Scope::new(ScopeKind::Module)],
        }
    }

    pub fn global(&self) -> &GlobalContext {
        &*self.global
    }

    pub fn global_mut(&mut self) -> &mut GlobalContext {
        &mut *self.global
    }

    pub fn get_constant_handle(&mut self, constant: &Constant) -> String {
        self.global.get_constant_handle(constant)
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn code_name(&self) -> &str {
        &self.code_name
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn push_scope(&mut self, kind: ScopeKind) {
        tracing::debug!(depth = self.scopes.len(), "push scope {:?}", kind);
        self.scopes.push(Scope::new(kind));
    }

    /// Pops the innermost scope and moves its nested declarations into the
    /// parent. The module scope is never popped.
    pub fn pop_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() <= 1 {
            return None;
        }

        let mut scope = self.scopes.pop()?;
        let parent = self.scopes.last_mut()?;
        parent.function_codes.append(&mut scope.function_codes);
        parent.class_codes.append(&mut scope.class_codes);

        Some(scope)
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current_scope(&self) -> &Scope {
        // The module scope is pushed on creation and never popped.
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn module_scope(&self) -> &Scope {
        &self.scopes[0]
    }

    /// Whether the nearest function scope belongs to a generator.
    pub fn is_generator(&self) -> bool {
        self.scopes.iter().rev().find_map(|scope| match &scope.kind {
            ScopeKind::Function { is_generator, .. } => Some(*is_generator),
            ScopeKind::Class { .. } | ScopeKind::Module => Some(false),
            ScopeKind::ExecInline => None,
        }) == Some(true)
    }

    /// Counters live in the scope whose body the code is emitted into, so
    /// inline exec blocks count with their enclosing scope.
    fn counting_scope(&mut self) -> &mut Scope {
        let index = self
            .scopes
            .iter()
            .rposition(|scope| scope.kind != ScopeKind::ExecInline)
            .unwrap_or(0);

        &mut self.scopes[index]
    }

    pub fn allocate_try_number(&mut self) -> usize {
        let scope = self.counting_scope();
        scope.try_count += 1;
        scope.try_count
    }

    pub fn allocate_for_loop_number(&mut self) -> usize {
        let scope = self.counting_scope();
        scope.for_loop_count += 1;
        scope.for_loop_count
    }

    /// Registers a nested function with the innermost scope.
    pub fn add_function_codes(&mut self, code_name: &str, decl: String, code: String) {
        if let Some(scope) = self.scopes.last_mut() {
            scope
                .function_codes
                .insert(code_name.to_string(), Declaration { decl, code });
        }
    }

    pub fn add_class_codes(&mut self, code_name: &str, decl: String, code: String) {
        if let Some(scope) = self.scopes.last_mut() {
            scope
                .class_codes
                .insert(code_name.to_string(), Declaration { decl, code });
        }
    }
}
