//! Static node properties shared by the optimizer and the code generator.
//!
//! All answers are conservative: `true` for side effects and raising when in
//! doubt, `false` for abortativeness when in doubt.

use super::{
    ast::{NodeId, NodeKind, Tree},
    constants::Constant,
    expressions::Expr,
    statements::Stmt,
};

impl Tree {
    pub fn constant(&self, id: NodeId) -> Option<&Constant> {
        match self.expr(id) {
            Some(Expr::ConstantRef { constant }) => Some(constant),
            _ => None,
        }
    }

    pub fn is_constant_ref(&self, id: NodeId) -> bool {
        self.constant(id).is_some()
    }

    pub fn is_mutable_constant(&self, id: NodeId) -> bool {
        self.constant(id).is_some_and(Constant::is_mutable)
    }

    pub fn is_immutable_constant(&self, id: NodeId) -> bool {
        self.constant(id).is_some_and(|constant| !constant.is_mutable())
    }

    /// Constant integer usable as a native slice index.
    pub fn is_indexable(&self, id: NodeId) -> bool {
        self.constant(id)
            .is_some_and(|constant| constant.as_small_index().is_some())
    }

    pub fn may_have_side_effects(&self, id: NodeId) -> bool {
        let Some(expr) = self.expr(id) else {
            return true;
        };

        match expr {
            Expr::ConstantRef { .. }
            | Expr::VariableRef { .. }
            | Expr::TempVariableRef { .. }
            | Expr::BuiltinRef { .. }
            | Expr::BuiltinAnonymousRef { .. }
            | Expr::BuiltinExceptionRef { .. }
            | Expr::CaughtException { .. }
            | Expr::BuiltinGlobals
            | Expr::BuiltinLocals
            | Expr::BuiltinDir0 => false,
            Expr::MakeTuple { .. }
            | Expr::MakeList { .. }
            | Expr::MakeSet { .. }
            | Expr::MakeDict { .. }
            | Expr::BoolOr { .. }
            | Expr::BoolAnd { .. }
            | Expr::Conditional { .. }
            | Expr::SliceObject { .. }
            | Expr::BuiltinMakeException { .. } => self
                .children(id)
                .into_iter()
                .any(|child| self.may_have_side_effects(child)),
            _ => true,
        }
    }

    pub fn may_raise_exception(&self, id: NodeId) -> bool {
        let Some(expr) = self.expr(id) else {
            return true;
        };

        match expr {
            Expr::ConstantRef { .. }
            | Expr::TempVariableRef { .. }
            | Expr::BuiltinRef { .. }
            | Expr::BuiltinAnonymousRef { .. }
            | Expr::BuiltinExceptionRef { .. }
            | Expr::CaughtException { .. }
            | Expr::BuiltinGlobals
            | Expr::FunctionBody(_) => false,
            Expr::MakeTuple { elements } | Expr::MakeList { elements } => elements
                .iter()
                .any(|element| self.may_raise_exception(*element)),
            // Hashing may raise unless the element is an immutable constant.
            Expr::MakeSet { elements } => elements.iter().any(|element| {
                !self.is_immutable_constant(*element) || self.may_raise_exception(*element)
            }),
            Expr::MakeDict { pairs } => pairs.iter().any(|(key, value)| {
                !self.is_immutable_constant(*key) || self.may_raise_exception(*value)
            }),
            Expr::BuiltinMakeException { args, .. } => {
                args.iter().any(|arg| self.may_raise_exception(*arg))
            }
            _ => true,
        }
    }

    /// Whether control never continues after the statement or sequence.
    pub fn is_statement_abortative(&self, id: NodeId) -> bool {
        match self.kind(id) {
            NodeKind::Sequence(sequence) => sequence
                .statements
                .iter()
                .any(|statement| self.is_statement_abortative(*statement)),
            NodeKind::Stmt(stmt) => match stmt {
                Stmt::Return { .. }
                | Stmt::RaiseException { .. }
                | Stmt::BreakLoop { .. }
                | Stmt::ContinueLoop { .. } => true,
                Stmt::Conditional { yes, no, .. } => {
                    yes.is_some_and(|yes| self.is_statement_abortative(yes))
                        && no.is_some_and(|no| self.is_statement_abortative(no))
                }
                Stmt::TryFinally { tried, final_block } => {
                    self.is_statement_abortative(*tried)
                        || self.is_statement_abortative(*final_block)
                }
                Stmt::TempBlock { body } => self.is_statement_abortative(*body),
                _ => false,
            },
            _ => false,
        }
    }
}
