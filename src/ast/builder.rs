use std::rc::Rc;

use crate::SourceRef;

use super::{
    ast::{NodeId, NodeKind, Tree},
    constants::Constant,
    expressions::{Builtin1, ClassBody, Comparator, Expr, FunctionBody, Operator},
    statements::{ExceptHandler, Module, StatementSequence, Stmt},
    variables::{Variable, VariableKind},
};

/// Tree Builder
///
/// Constructs trees bottom-up. Children must be built before the node that
/// holds them; the tree adopts them when the parent is added.
pub struct TreeBuilder {
    tree: Tree,
    source_ref: SourceRef,
}

impl TreeBuilder {
    pub fn new(filename: &str) -> Self {
        TreeBuilder {
            tree: Tree::new(),
            source_ref: SourceRef::new(Rc::new(filename.to_string()), 1),
        }
    }

    /// Nodes added from now on are located at `line`.
    pub fn at_line(&mut self, line: u32) -> &mut Self {
        self.source_ref = self.source_ref.at_line(line);
        self
    }

    pub fn with_source_ref(&mut self, source_ref: SourceRef) -> &mut Self {
        self.source_ref = source_ref;
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn finish(self) -> Tree {
        self.tree
    }

    pub fn node(&mut self, kind: NodeKind) -> NodeId {
        self.tree.add(kind, self.source_ref.clone())
    }

    pub fn expr(&mut self, expr: Expr) -> NodeId {
        self.node(NodeKind::Expr(expr))
    }

    pub fn stmt(&mut self, stmt: Stmt) -> NodeId {
        self.node(NodeKind::Stmt(stmt))
    }

    // Expressions

    pub fn constant(&mut self, constant: Constant) -> NodeId {
        self.expr(Expr::ConstantRef { constant })
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.constant(Constant::int(value))
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        self.constant(Constant::str(value))
    }

    pub fn none(&mut self) -> NodeId {
        self.constant(Constant::None)
    }

    pub fn variable_ref(&mut self, name: &str, kind: VariableKind) -> NodeId {
        self.expr(Expr::VariableRef {
            name: name.to_string(),
            variable: Some(Variable::new(name, kind)),
        })
    }

    pub fn local(&mut self, name: &str) -> NodeId {
        self.variable_ref(name, VariableKind::Local)
    }

    pub fn global(&mut self, name: &str) -> NodeId {
        self.variable_ref(name, VariableKind::ModuleGlobal)
    }

    pub fn unresolved_ref(&mut self, name: &str) -> NodeId {
        self.expr(Expr::VariableRef {
            name: name.to_string(),
            variable: None,
        })
    }

    pub fn temp_ref(&mut self, name: &str) -> NodeId {
        self.expr(Expr::TempVariableRef {
            variable: Variable::new(name, VariableKind::Temp),
        })
    }

    pub fn operation(&mut self, operator: Operator, operands: Vec<NodeId>) -> NodeId {
        self.expr(Expr::Operation { operator, operands })
    }

    pub fn not(&mut self, operand: NodeId) -> NodeId {
        self.operation(Operator::Not, vec![operand])
    }

    pub fn comparison(&mut self, comparator: Comparator, left: NodeId, right: NodeId) -> NodeId {
        self.expr(Expr::Comparison {
            comparator,
            left,
            right,
        })
    }

    pub fn bool_or(&mut self, operands: Vec<NodeId>) -> NodeId {
        self.expr(Expr::BoolOr { operands })
    }

    pub fn bool_and(&mut self, operands: Vec<NodeId>) -> NodeId {
        self.expr(Expr::BoolAnd { operands })
    }

    pub fn make_tuple(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.expr(Expr::MakeTuple { elements })
    }

    pub fn make_list(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.expr(Expr::MakeList { elements })
    }

    pub fn make_set(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.expr(Expr::MakeSet { elements })
    }

    pub fn make_dict(&mut self, pairs: Vec<(NodeId, NodeId)>) -> NodeId {
        self.expr(Expr::MakeDict { pairs })
    }

    pub fn call(&mut self, called: NodeId, positional: Vec<NodeId>) -> NodeId {
        self.expr(Expr::Call {
            called,
            positional,
            named: Vec::new(),
            star_list: None,
            star_dict: None,
        })
    }

    pub fn attribute(&mut self, source: NodeId, attribute: &str) -> NodeId {
        self.expr(Expr::AttributeLookup {
            source,
            attribute: attribute.to_string(),
        })
    }

    pub fn subscript(&mut self, source: NodeId, subscript: NodeId) -> NodeId {
        self.expr(Expr::SubscriptLookup { source, subscript })
    }

    pub fn slice(&mut self, source: NodeId, lower: Option<NodeId>, upper: Option<NodeId>) -> NodeId {
        self.expr(Expr::SliceLookup {
            source,
            lower,
            upper,
        })
    }

    pub fn builtin_ref(&mut self, name: &str) -> NodeId {
        self.expr(Expr::BuiltinRef {
            builtin_name: name.to_string(),
        })
    }

    pub fn exception_ref(&mut self, name: &str) -> NodeId {
        self.expr(Expr::BuiltinExceptionRef {
            exception_name: name.to_string(),
        })
    }

    pub fn make_exception(&mut self, name: &str, args: Vec<NodeId>) -> NodeId {
        self.expr(Expr::BuiltinMakeException {
            exception_name: name.to_string(),
            args,
        })
    }

    pub fn raise_expr(&mut self, exception_type: NodeId, exception_value: Option<NodeId>) -> NodeId {
        self.expr(Expr::RaiseException {
            exception_type,
            exception_value,
            side_effects: Vec::new(),
        })
    }

    pub fn builtin1(&mut self, builtin: Builtin1, value: NodeId) -> NodeId {
        self.expr(Expr::BuiltinCall1 { builtin, value })
    }

    pub fn function(&mut self, function: FunctionBody) -> NodeId {
        self.expr(Expr::FunctionBody(function))
    }

    pub fn function_defaulted(&mut self, function_body: NodeId, defaults: Vec<NodeId>) -> NodeId {
        self.expr(Expr::FunctionBodyDefaulted {
            function_body,
            defaults,
        })
    }

    pub fn class(&mut self, class: ClassBody) -> NodeId {
        self.expr(Expr::ClassBody(class))
    }

    pub fn class_based(&mut self, class_body: NodeId, bases: Vec<NodeId>) -> NodeId {
        self.expr(Expr::ClassBodyBased { class_body, bases })
    }

    // Statements

    pub fn expression_statement(&mut self, expression: NodeId) -> NodeId {
        self.stmt(Stmt::ExpressionOnly { expression })
    }

    pub fn assign(&mut self, target: NodeId, source: NodeId) -> NodeId {
        self.stmt(Stmt::AssignVariable { target, source })
    }

    pub fn assign_attribute(&mut self, source: NodeId, attribute: &str, value: NodeId) -> NodeId {
        self.stmt(Stmt::AssignAttribute {
            source,
            attribute: attribute.to_string(),
            value,
        })
    }

    pub fn print(&mut self, values: Vec<NodeId>) -> NodeId {
        self.stmt(Stmt::Print {
            destination: None,
            values,
            newline: true,
        })
    }

    pub fn return_(&mut self, expression: NodeId) -> NodeId {
        self.stmt(Stmt::Return { expression })
    }

    pub fn raise(
        &mut self,
        exception_type: Option<NodeId>,
        exception_value: Option<NodeId>,
        exception_trace: Option<NodeId>,
    ) -> NodeId {
        self.stmt(Stmt::RaiseException {
            exception_type,
            exception_value,
            exception_trace,
        })
    }

    pub fn reraise(&mut self) -> NodeId {
        self.raise(None, None, None)
    }

    pub fn conditional(&mut self, condition: NodeId, yes: Option<NodeId>, no: Option<NodeId>) -> NodeId {
        self.stmt(Stmt::Conditional { condition, yes, no })
    }

    pub fn loop_(&mut self, body: Option<NodeId>) -> NodeId {
        self.stmt(Stmt::Loop {
            body,
            needs_exceptions: false,
        })
    }

    pub fn break_(&mut self) -> NodeId {
        self.stmt(Stmt::BreakLoop {
            needs_exceptions: false,
        })
    }

    pub fn continue_(&mut self) -> NodeId {
        self.stmt(Stmt::ContinueLoop {
            needs_exceptions: false,
        })
    }

    pub fn sequence(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::Sequence(StatementSequence { statements }))
    }

    pub fn handler(
        &mut self,
        exception_types: Vec<NodeId>,
        target: Option<NodeId>,
        branch: Option<NodeId>,
    ) -> NodeId {
        self.node(NodeKind::Handler(ExceptHandler {
            exception_types,
            target,
            branch,
        }))
    }

    pub fn try_except(&mut self, tried: NodeId, handlers: Vec<NodeId>, no_raise: Option<NodeId>) -> NodeId {
        self.stmt(Stmt::TryExcept {
            tried,
            handlers,
            no_raise,
        })
    }

    pub fn try_finally(&mut self, tried: NodeId, final_block: NodeId) -> NodeId {
        self.stmt(Stmt::TryFinally { tried, final_block })
    }

    /// Adds the module node and makes it the root.
    pub fn module(&mut self, name: &str, body: Option<NodeId>) -> NodeId {
        let filename = self.source_ref.file.to_string();
        let module = self.node(NodeKind::Module(Module {
            name: name.to_string(),
            package: None,
            filename,
            doc: None,
            path: None,
            variables: Vec::new(),
            tmp_variables: Vec::new(),
            body,
        }));
        self.tree.set_root(module);
        module
    }
}

/// A function body without parameters, closure or generator behaviour.
pub fn simple_function(name: &str, body: Option<NodeId>) -> FunctionBody {
    FunctionBody {
        name: name.to_string(),
        code_name: format!("function_{}", name),
        doc: None,
        parameters: Default::default(),
        closure_variables: Vec::new(),
        user_variables: Vec::new(),
        tmp_variables: Vec::new(),
        body,
        is_generator: false,
        is_unoptimized: false,
    }
}

pub fn simple_class(name: &str, body: Option<NodeId>) -> ClassBody {
    ClassBody {
        name: name.to_string(),
        code_name: format!("class_{}", name),
        doc: None,
        closure_variables: Vec::new(),
        class_variables: Vec::new(),
        tmp_variables: Vec::new(),
        body,
    }
}
