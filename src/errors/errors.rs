use std::fmt::Display;

use thiserror::Error;

use crate::SourceRef;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    source_ref: SourceRef,
    dump: Option<String>,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, source_ref: SourceRef) -> Self {
        Error {
            internal_error: error_impl,
            source_ref,
            dump: None,
        }
    }

    /// Attaches the structural dump of the offending node.
    pub fn with_dump(mut self, dump: String) -> Self {
        self.dump = Some(dump);
        self
    }

    pub fn get_source_ref(&self) -> &SourceRef {
        &self.source_ref
    }

    pub fn get_dump(&self) -> Option<&str> {
        self.dump.as_deref()
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::NotAnExpression { .. } => "NotAnExpression",
            ErrorImpl::NotAStatement { .. } => "NotAStatement",
            ErrorImpl::NotAStatementSequence { .. } => "NotAStatementSequence",
            ErrorImpl::NotAModule { .. } => "NotAModule",
            ErrorImpl::UnrecognisedNode { .. } => "UnrecognisedNode",
            ErrorImpl::UnresolvedVariable { .. } => "UnresolvedVariable",
            ErrorImpl::InvalidIdentifier { .. } => "InvalidIdentifier",
            ErrorImpl::MalformedCode { .. } => "MalformedCode",
            ErrorImpl::MismatchedDefaults { .. } => "MismatchedDefaults",
            ErrorImpl::InvalidConfig { .. } => "InvalidConfig",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::NotAnExpression { node } => ErrorTip::Suggestion(format!(
                "`{}` was found where an expression is required",
                node
            )),
            ErrorImpl::NotAStatement { node } => ErrorTip::Suggestion(format!(
                "`{}` was found where a statement is required",
                node
            )),
            ErrorImpl::NotAStatementSequence { node } => ErrorTip::Suggestion(format!(
                "`{}` was found where a statement sequence is required",
                node
            )),
            ErrorImpl::NotAModule { node } => {
                ErrorTip::Suggestion(format!("`{}` is not a module", node))
            }
            ErrorImpl::UnrecognisedNode { node } => ErrorTip::Suggestion(format!(
                "No code generation exists for `{}` on this target",
                node
            )),
            ErrorImpl::UnresolvedVariable { variable } => ErrorTip::Suggestion(format!(
                "Variable `{}` was never bound to storage, name resolution missed it",
                variable
            )),
            ErrorImpl::InvalidIdentifier { code } => {
                ErrorTip::Suggestion(format!("Emitted identifier `{}` is not usable", code))
            }
            ErrorImpl::MalformedCode { .. } => ErrorTip::Suggestion(String::from(
                "Statement code must not start or end with whitespace",
            )),
            ErrorImpl::MismatchedDefaults {
                defaults,
                parameters,
            } => ErrorTip::Suggestion(format!(
                "{} default values given for {} defaulted parameters",
                defaults, parameters
            )),
            ErrorImpl::InvalidConfig { message } => {
                ErrorTip::Suggestion(format!("Invalid options: {}", message))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.internal_error, self.source_ref)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("no expression: {node}")]
    NotAnExpression { node: String },
    #[error("no statement: {node}")]
    NotAStatement { node: String },
    #[error("no statement sequence: {node}")]
    NotAStatementSequence { node: String },
    #[error("no module: {node}")]
    NotAModule { node: String },
    #[error("unrecognised node: {node}")]
    UnrecognisedNode { node: String },
    #[error("illegal variable reference, not resolved: {variable:?}")]
    UnresolvedVariable { variable: String },
    #[error("not a code object: {code:?}")]
    InvalidIdentifier { code: String },
    #[error("code contains leading or trailing whitespace: {code:?}")]
    MalformedCode { code: String },
    #[error("default count mismatch: {defaults} defaults, {parameters} parameters")]
    MismatchedDefaults { defaults: usize, parameters: usize },
    #[error("invalid options: {message}")]
    InvalidConfig { message: String },
}
