use std::fmt::Write;

use crate::SourceRef;

use super::{
    expressions::{ClassBody, Expr, FunctionBody},
    statements::{ExceptHandler, Module, StatementSequence, Stmt},
};

/// Index of a node inside its Tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node Kinds
///
/// Every node of the tree is exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Module(Module),
    Sequence(StatementSequence),
    Handler(ExceptHandler),
    Expr(Expr),
    Stmt(Stmt),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Module(_) => "PythonModule",
            NodeKind::Sequence(_) => "StatementsSequence",
            NodeKind::Handler(_) => "StatementExceptHandler",
            NodeKind::Expr(expr) => expr.name(),
            NodeKind::Stmt(stmt) => stmt.name(),
        }
    }

    pub fn detail(&self) -> Option<String> {
        match self {
            NodeKind::Module(module) => Some(module.full_name()),
            NodeKind::Sequence(_) | NodeKind::Handler(_) => None,
            NodeKind::Expr(expr) => expr.detail(),
            NodeKind::Stmt(stmt) => stmt.detail(),
        }
    }

    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Module(module) => module.body.into_iter().collect(),
            NodeKind::Sequence(sequence) => sequence.statements.clone(),
            NodeKind::Handler(handler) => {
                let mut result = handler.exception_types.clone();
                result.extend(handler.target);
                result.extend(handler.branch);
                result
            }
            NodeKind::Expr(expr) => expr.children(),
            NodeKind::Stmt(stmt) => stmt.children(),
        }
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
            NodeKind::Module(module) => module.body.iter_mut().for_each(&mut swap),
            NodeKind::Sequence(sequence) => sequence.statements.iter_mut().for_each(&mut swap),
            NodeKind::Handler(handler) => {
                handler.exception_types.iter_mut().for_each(&mut swap);
                handler.target.iter_mut().for_each(&mut swap);
                handler.branch.iter_mut().for_each(&mut swap);
            }
            NodeKind::Expr(expr) => return expr.replace_child(old, new),
            NodeKind::Stmt(stmt) => return stmt.replace_child(old, new),
        }

        replaced
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, NodeKind::Expr(_))
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, NodeKind::Stmt(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub source_ref: SourceRef,
}

/// The scope that provides variables to a node.
#[derive(Debug, Clone, Copy)]
pub enum Provider<'a> {
    Module(&'a Module),
    Function(&'a FunctionBody),
    Class(&'a ClassBody),
}

impl Provider<'_> {
    pub fn is_class(&self) -> bool {
        matches!(self, Provider::Class(_))
    }

    pub fn is_module(&self) -> bool {
        matches!(self, Provider::Module(_))
    }

    /// Whether `locals()` must reflect the live dict instead of a snapshot.
    pub fn has_updated_locals(&self) -> bool {
        match self {
            Provider::Module(_) | Provider::Class(_) => true,
            Provider::Function(function) => function.is_unoptimized,
        }
    }
}

/// Tree
///
/// Arena owning every node. Parent links are indices and never own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Adds a node and adopts its children.
    ///
    /// # Arguments
    ///
    /// * `kind` - The node; every child it names must already be in the tree
    /// * `source_ref` - Where the node came from
    ///
    /// # Returns
    ///
    /// * `NodeId` - The id of the new node
    pub fn add(&mut self, kind: NodeKind, source_ref: SourceRef) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);

        for child in kind.children() {
            self.nodes[child.index()].parent = Some(id);
        }

        self.nodes.push(Node {
            kind,
            parent: None,
            source_ref,
        });

        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn source_ref(&self, id: NodeId) -> &SourceRef {
        &self.nodes[id.index()].source_ref
    }

    pub fn expr(&self, id: NodeId) -> Option<&Expr> {
        match self.kind(id) {
            NodeKind::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn expr_mut(&mut self, id: NodeId) -> Option<&mut Expr> {
        match self.kind_mut(id) {
            NodeKind::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn stmt(&self, id: NodeId) -> Option<&Stmt> {
        match self.kind(id) {
            NodeKind::Stmt(stmt) => Some(stmt),
            _ => None,
        }
    }

    pub fn sequence(&self, id: NodeId) -> Option<&StatementSequence> {
        match self.kind(id) {
            NodeKind::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    pub fn handler(&self, id: NodeId) -> Option<&ExceptHandler> {
        match self.kind(id) {
            NodeKind::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn module(&self, id: NodeId) -> Option<&Module> {
        match self.kind(id) {
            NodeKind::Module(module) => Some(module),
            _ => None,
        }
    }

    pub fn is_expression(&self, id: NodeId) -> bool {
        self.kind(id).is_expression()
    }

    pub fn is_statement(&self, id: NodeId) -> bool {
        self.kind(id).is_statement()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// Iterates over the parent chain, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Nearest enclosing module, function body or class body.
    pub fn parent_variable_provider(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|ancestor| self.provider(*ancestor).is_some())
    }

    pub fn provider(&self, id: NodeId) -> Option<Provider<'_>> {
        match self.kind(id) {
            NodeKind::Module(module) => Some(Provider::Module(module)),
            NodeKind::Expr(Expr::FunctionBody(function)) => Some(Provider::Function(function)),
            NodeKind::Expr(Expr::ClassBody(class)) => Some(Provider::Class(class)),
            _ => None,
        }
    }

    /// Enclosing function body, unless a class body or the module comes first.
    pub fn parent_function(&self, id: NodeId) -> Option<&FunctionBody> {
        let provider = self.parent_variable_provider(id)?;

        match self.provider(provider) {
            Some(Provider::Function(function)) => Some(function),
            _ => None,
        }
    }

    pub fn parent_module(&self, id: NodeId) -> Option<&Module> {
        self.ancestors(id).find_map(|ancestor| self.module(ancestor))
    }

    /// A re-raise is local when an except handler encloses it without a
    /// function, class or module boundary in between.
    pub fn is_reraise_local(&self, id: NodeId) -> bool {
        for ancestor in self.ancestors(id) {
            match self.kind(ancestor) {
                NodeKind::Handler(_) => return true,
                NodeKind::Module(_)
                | NodeKind::Expr(Expr::FunctionBody(_))
                | NodeKind::Expr(Expr::ClassBody(_)) => return false,
                _ => {}
            }
        }

        false
    }

    /// Puts `new` where `old` is, `old` is left detached.
    pub fn replace_with(&mut self, old: NodeId, new: NodeId) {
        let parent = self.parent(old);

        match parent {
            Some(parent) => {
                self.kind_mut(parent).replace_child(old, new);
            }
            None => {
                if self.root == Some(old) {
                    self.root = Some(new);
                }
            }
        }

        self.nodes[new.index()].parent = parent;
        self.nodes[old.index()].parent = None;
    }

    /// Records `parent` as the owner of `child` after the parent's kind was
    /// edited in place.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Replaces a statement inside its sequence by a list of statements.
    ///
    /// Returns `false` and leaves the tree untouched if the statement is not
    /// directly held by a statement sequence.
    pub fn splice_in_sequence(&mut self, old: NodeId, new: Vec<NodeId>) -> bool {
        let Some(parent) = self.parent(old) else {
            return false;
        };
        let NodeKind::Sequence(sequence) = self.kind_mut(parent) else {
            return false;
        };
        let Some(position) = sequence.statements.iter().position(|stmt| *stmt == old) else {
            return false;
        };

        sequence
            .statements
            .splice(position..=position, new.iter().copied());

        for statement in new {
            self.nodes[statement.index()].parent = Some(parent);
        }
        self.nodes[old.index()].parent = None;

        true
    }

    /// Drops every statement following `statement` in its sequence.
    pub fn truncate_sequence_after(&mut self, statement: NodeId) -> bool {
        let Some(parent) = self.parent(statement) else {
            return false;
        };
        let NodeKind::Sequence(sequence) = self.kind_mut(parent) else {
            return false;
        };
        let Some(position) = sequence.statements.iter().position(|stmt| *stmt == statement)
        else {
            return false;
        };
        if position + 1 == sequence.statements.len() {
            return false;
        }

        let removed: Vec<NodeId> = sequence.statements.drain(position + 1..).collect();
        for node in removed {
            self.nodes[node.index()].parent = None;
        }

        true
    }

    /// Nodes below and including `from`, parents before children.
    pub fn pre_order(&self, from: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![from];

        while let Some(id) = stack.pop() {
            result.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }

        result
    }

    /// Indented structural dump of a subtree, for diagnostics.
    pub fn dump(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.dump_into(&mut result, id, 0);
        result
    }

    fn dump_into(&self, out: &mut String, id: NodeId, depth: usize) {
        let node = self.node(id);
        let _ = write!(out, "{}{}", "  ".repeat(depth), node.kind.name());
        if let Some(detail) = node.kind.detail() {
            let _ = write!(out, " {}", detail);
        }
        let _ = writeln!(out, " @{}", node.source_ref.line);

        for child in node.kind.children() {
            self.dump_into(out, child, depth + 1);
        }
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tree.parent(current);
        Some(current)
    }
}
