use super::{ast::NodeId, variables::Variable};

/// Statements Sequence
/// An ordered list of statement nodes, the body of every block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementSequence {
    pub statements: Vec<NodeId>,
}

/// One `except` clause of a try/except statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    /// Empty for a bare `except:`.
    pub exception_types: Vec<NodeId>,
    pub target: Option<NodeId>,
    pub branch: Option<NodeId>,
}

/// Module
/// The root of a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub package: Option<String>,
    pub filename: String,
    pub doc: Option<String>,
    /// `__path__` entries, present for packages only.
    pub path: Option<Vec<String>>,
    pub variables: Vec<Variable>,
    pub tmp_variables: Vec<Variable>,
    pub body: Option<NodeId>,
}

impl Module {
    pub fn full_name(&self) -> String {
        match &self.package {
            Some(package) => format!("{}.{}", package, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    AssignVariable {
        target: NodeId,
        source: NodeId,
    },
    AssignAttribute {
        source: NodeId,
        attribute: String,
        value: NodeId,
    },
    AssignSubscript {
        subscribed: NodeId,
        subscript: NodeId,
        value: NodeId,
    },
    AssignSlice {
        source: NodeId,
        lower: Option<NodeId>,
        upper: Option<NodeId>,
        value: NodeId,
    },
    DelVariable {
        target: NodeId,
    },
    DelAttribute {
        source: NodeId,
        attribute: String,
    },
    DelSubscript {
        subscribed: NodeId,
        subscript: NodeId,
    },
    DelSlice {
        source: NodeId,
        lower: Option<NodeId>,
        upper: Option<NodeId>,
    },
    TempBlock {
        body: NodeId,
    },
    ExpressionOnly {
        expression: NodeId,
    },
    Print {
        destination: Option<NodeId>,
        values: Vec<NodeId>,
        newline: bool,
    },
    Return {
        expression: NodeId,
    },
    Loop {
        body: Option<NodeId>,
        /// Break and continue cross a try/finally and must unwind it.
        needs_exceptions: bool,
    },
    Conditional {
        condition: NodeId,
        yes: Option<NodeId>,
        no: Option<NodeId>,
    },
    ContinueLoop {
        needs_exceptions: bool,
    },
    BreakLoop {
        needs_exceptions: bool,
    },
    ImportStar {
        module: NodeId,
    },
    TryFinally {
        tried: NodeId,
        final_block: NodeId,
    },
    TryExcept {
        tried: NodeId,
        handlers: Vec<NodeId>,
        no_raise: Option<NodeId>,
    },
    RaiseException {
        exception_type: Option<NodeId>,
        exception_value: Option<NodeId>,
        exception_trace: Option<NodeId>,
    },
    Exec {
        source_code: NodeId,
        globals: Option<NodeId>,
        locals: Option<NodeId>,
    },
    ExecInline {
        body: NodeId,
    },
    SpecialUnpackCheck {
        iterator: NodeId,
        count: usize,
    },
    DeclareGlobal {
        names: Vec<String>,
    },
}

impl Stmt {
    pub fn name(&self) -> &'static str {
        match self {
            Stmt::AssignVariable { .. } => "StatementAssignmentVariable",
            Stmt::AssignAttribute { .. } => "StatementAssignmentAttribute",
            Stmt::AssignSubscript { .. } => "StatementAssignmentSubscript",
            Stmt::AssignSlice { .. } => "StatementAssignmentSlice",
            Stmt::DelVariable { .. } => "StatementDelVariable",
            Stmt::DelAttribute { .. } => "StatementDelAttribute",
            Stmt::DelSubscript { .. } => "StatementDelSubscript",
            Stmt::DelSlice { .. } => "StatementDelSlice",
            Stmt::TempBlock { .. } => "StatementTempBlock",
            Stmt::ExpressionOnly { .. } => "StatementExpressionOnly",
            Stmt::Print { .. } => "StatementPrint",
            Stmt::Return { .. } => "StatementReturn",
            Stmt::Loop { .. } => "StatementLoop",
            Stmt::Conditional { .. } => "StatementConditional",
            Stmt::ContinueLoop { .. } => "StatementContinueLoop",
            Stmt::BreakLoop { .. } => "StatementBreakLoop",
            Stmt::ImportStar { .. } => "StatementImportStar",
            Stmt::TryFinally { .. } => "StatementTryFinally",
            Stmt::TryExcept { .. } => "StatementTryExcept",
            Stmt::RaiseException { .. } => "StatementRaiseException",
            Stmt::Exec { .. } => "StatementExec",
            Stmt::ExecInline { .. } => "StatementExecInline",
            Stmt::SpecialUnpackCheck { .. } => "StatementSpecialUnpackCheck",
            Stmt::DeclareGlobal { .. } => "StatementDeclareGlobal",
        }
    }

    pub fn detail(&self) -> Option<String> {
        match self {
            Stmt::AssignAttribute { attribute, .. } | Stmt::DelAttribute { attribute, .. } => {
                Some(attribute.clone())
            }
            Stmt::DeclareGlobal { names } => Some(names.join(", ")),
            Stmt::SpecialUnpackCheck { count, .. } => Some(count.to_string()),
            _ => None,
        }
    }

    /// Child nodes in evaluation order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut result = Vec::new();

        match self {
            Stmt::AssignVariable { target, source } => result.extend([*source, *target]),
            Stmt::AssignAttribute {
                source, value, ..
            } => result.extend([*value, *source]),
            Stmt::AssignSubscript {
                subscribed,
                subscript,
                value,
            } => result.extend([*value, *subscribed, *subscript]),
            Stmt::AssignSlice {
                source,
                lower,
                upper,
                value,
            } => {
                result.extend([*value, *source]);
                result.extend(lower);
                result.extend(upper);
            }
            Stmt::DelVariable { target } => result.push(*target),
            Stmt::DelAttribute { source, .. } => result.push(*source),
            Stmt::DelSubscript {
                subscribed,
                subscript,
            } => result.extend([*subscribed, *subscript]),
            Stmt::DelSlice {
                source,
                lower,
                upper,
            } => {
                result.push(*source);
                result.extend(lower);
                result.extend(upper);
            }
            Stmt::TempBlock { body } | Stmt::ExecInline { body } => result.push(*body),
            Stmt::ExpressionOnly { expression } | Stmt::Return { expression } => {
                result.push(*expression)
            }
            Stmt::Print {
                destination,
                values,
                ..
            } => {
                result.extend(destination);
                result.extend(values);
            }
            Stmt::Loop { body, .. } => result.extend(body),
            Stmt::Conditional { condition, yes, no } => {
                result.push(*condition);
                result.extend(yes);
                result.extend(no);
            }
            Stmt::ContinueLoop { .. } | Stmt::BreakLoop { .. } | Stmt::DeclareGlobal { .. } => {}
            Stmt::ImportStar { module } => result.push(*module),
            Stmt::TryFinally { tried, final_block } => result.extend([*tried, *final_block]),
            Stmt::TryExcept {
                tried,
                handlers,
                no_raise,
            } => {
                result.push(*tried);
                result.extend(handlers);
                result.extend(no_raise);
            }
            Stmt::RaiseException {
                exception_type,
                exception_value,
                exception_trace,
            } => {
                result.extend(exception_type);
                result.extend(exception_value);
                result.extend(exception_trace);
            }
            Stmt::Exec {
                source_code,
                globals,
                locals,
            } => {
                result.push(*source_code);
                result.extend(globals);
                result.extend(locals);
            }
            Stmt::SpecialUnpackCheck { iterator, .. } => result.push(*iterator),
        }

        result
    }

    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> bool {
        let mut replaced = false;
        let mut swap = |slot: &mut NodeId| {
            if *slot == old {
                *slot = new;
                replaced = true;
            }
        };

        match self {
            Stmt::AssignVariable { target, source } => {
                swap(source);
                swap(target);
            }
            Stmt::AssignAttribute {
                source, value, ..
            } => {
                swap(value);
                swap(source);
            }
            Stmt::AssignSubscript {
                subscribed,
                subscript,
                value,
            } => {
                swap(value);
                swap(subscribed);
                swap(subscript);
            }
            Stmt::AssignSlice {
                source,
                lower,
                upper,
                value,
            } => {
                swap(value);
                swap(source);
                lower.iter_mut().for_each(&mut swap);
                upper.iter_mut().for_each(&mut swap);
            }
            Stmt::DelVariable { target } => swap(target),
            Stmt::DelAttribute { source, .. } => swap(source),
            Stmt::DelSubscript {
                subscribed,
                subscript,
            } => {
                swap(subscribed);
                swap(subscript);
            }
            Stmt::DelSlice {
                source,
                lower,
                upper,
            } => {
                swap(source);
                lower.iter_mut().for_each(&mut swap);
                upper.iter_mut().for_each(&mut swap);
            }
            Stmt::TempBlock { body } | Stmt::ExecInline { body } => swap(body),
            Stmt::ExpressionOnly { expression } | Stmt::Return { expression } => swap(expression),
            Stmt::Print {
                destination,
                values,
                ..
            } => {
                destination.iter_mut().for_each(&mut swap);
                values.iter_mut().for_each(&mut swap);
            }
            Stmt::Loop { body, .. } => body.iter_mut().for_each(&mut swap),
            Stmt::Conditional { condition, yes, no } => {
                swap(condition);
                yes.iter_mut().for_each(&mut swap);
                no.iter_mut().for_each(&mut swap);
            }
            Stmt::ContinueLoop { .. } | Stmt::BreakLoop { .. } | Stmt::DeclareGlobal { .. } => {}
            Stmt::ImportStar { module } => swap(module),
            Stmt::TryFinally { tried, final_block } => {
                swap(tried);
                swap(final_block);
            }
            Stmt::TryExcept {
                tried,
                handlers,
                no_raise,
            } => {
                swap(tried);
                handlers.iter_mut().for_each(&mut swap);
                no_raise.iter_mut().for_each(&mut swap);
            }
            Stmt::RaiseException {
                exception_type,
                exception_value,
                exception_trace,
            } => {
                exception_type.iter_mut().for_each(&mut swap);
                exception_value.iter_mut().for_each(&mut swap);
                exception_trace.iter_mut().for_each(&mut swap);
            }
            Stmt::Exec {
                source_code,
                globals,
                locals,
            } => {
                swap(source_code);
                globals.iter_mut().for_each(&mut swap);
                locals.iter_mut().for_each(&mut swap);
            }
            Stmt::SpecialUnpackCheck { iterator, .. } => swap(iterator),
        }

        replaced
    }
}
