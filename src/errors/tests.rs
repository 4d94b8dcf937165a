//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::SourceRef;
use std::rc::Rc;

fn source_ref(line: u32) -> SourceRef {
    SourceRef::new(Rc::new("test.py".to_string()), line)
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedNode {
            node: "StatementBreakLoop".to_string(),
        },
        source_ref(10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedNode");
}

#[test]
fn test_error_source_ref() {
    let error = Error::new(
        ErrorImpl::NotAnExpression {
            node: "StatementsSequence".to_string(),
        },
        source_ref(42),
    );

    assert_eq!(error.get_source_ref().line, 42);
    assert_eq!(error.get_source_ref().file.as_str(), "test.py");
}

#[test]
fn test_unresolved_variable_error() {
    let error = Error::new(
        ErrorImpl::UnresolvedVariable {
            variable: "foo".to_string(),
        },
        source_ref(0),
    );

    assert_eq!(error.get_error_name(), "UnresolvedVariable");
    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::UnresolvedVariable {
            variable: "foo".to_string()
        }
    );
}

#[test]
fn test_not_a_statement_error() {
    let error = Error::new(
        ErrorImpl::NotAStatement {
            node: "ExpressionConstantRef".to_string(),
        },
        source_ref(0),
    );

    assert_eq!(error.get_error_name(), "NotAStatement");
}

#[test]
fn test_malformed_code_error() {
    let error = Error::new(
        ErrorImpl::MalformedCode {
            code: " x = 1;".to_string(),
        },
        source_ref(0),
    );

    assert_eq!(error.get_error_name(), "MalformedCode");
    assert_eq!(
        error.get_internal_error().to_string(),
        "code contains leading or trailing whitespace: \" x = 1;\""
    );
}

#[test]
fn test_error_dump() {
    let error = Error::new(
        ErrorImpl::InvalidIdentifier {
            code: String::new(),
        },
        source_ref(0),
    );
    assert!(error.get_dump().is_none());

    let error = error.with_dump("ExpressionCall\n  ExpressionConstantRef".to_string());
    assert_eq!(
        error.get_dump(),
        Some("ExpressionCall\n  ExpressionConstantRef")
    );
}

#[test]
fn test_error_tip_suggestion() {
    let error = Error::new(
        ErrorImpl::InvalidConfig {
            message: "expected value".to_string(),
        },
        SourceRef::null(),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert_eq!(tip, "Invalid options: expected value"),
        _ => panic!("Expected suggestion tip"),
    }
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_error_display() {
    let error = Error::new(
        ErrorImpl::NotAModule {
            node: "ExpressionCall".to_string(),
        },
        source_ref(7),
    );

    assert_eq!(error.to_string(), "no module: ExpressionCall at test.py:7");
}
