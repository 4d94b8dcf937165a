#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod logger;
pub mod macros;
pub mod optimizations;

extern crate regex;

/// `from __future__` flags active at a source location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FutureSpec {
    pub division: bool,
    pub unicode_literals: bool,
    pub absolute_import: bool,
    pub print_function: bool,
}

/// Source location of a node, used for diagnostics and for the line
/// tracking emitted into the generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub file: Rc<String>,
    pub line: u32,
    pub future: FutureSpec,
}

impl SourceRef {
    pub fn new(file: Rc<String>, line: u32) -> Self {
        SourceRef {
            file,
            line,
            future: FutureSpec::default(),
        }
    }

    pub fn null() -> Self {
        SourceRef::new(Rc::new(String::from("<null>")), 0)
    }

    /// Same file and future flags, different line.
    pub fn at_line(&self, line: u32) -> Self {
        SourceRef {
            file: Rc::clone(&self.file),
            line,
            future: self.future,
        }
    }

    pub fn get_as_string(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

impl Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get_as_string())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::{
        errors::errors::{Error, ErrorImpl},
        SourceRef,
    };

    #[test]
    fn test_source_ref_as_string() {
        let source_ref = SourceRef::new(Rc::new("module.py".to_string()), 12);
        assert_eq!(source_ref.get_as_string(), "module.py:12");

        let moved = source_ref.at_line(40);
        assert_eq!(moved.get_as_string(), "module.py:40");
        assert_eq!(moved.future, source_ref.future);
        assert_ne!(moved, source_ref);
    }

    #[test]
    fn test_render_error() {
        let error = Error::new(
            ErrorImpl::UnresolvedVariable {
                variable: "x".to_string(),
            },
            SourceRef::new(Rc::new("module.py".to_string()), 3),
        )
        .with_dump(String::from("ExpressionVariableRef x"));

        let rendered = super::render_error(&error);
        assert!(rendered.starts_with("Error: UnresolvedVariable"));
        assert!(rendered.contains("-> module.py:3"));
        assert!(rendered.contains("| ExpressionVariableRef x"));
    }
}

/// Formats an internal error for developers.
pub fn render_error(error: &Error) -> String {
    /*
        Error: UnresolvedVariable (Variable `x` ...)
        -> module.py:3
         |
         | ExpressionVariableRef x
    */
    let mut result = String::new();

    if let ErrorTip::None = error.get_tip() {
        result.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        result.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    result.push_str(&format!("-> {}\n", error.get_source_ref()));

    if let Some(dump) = error.get_dump() {
        result.push_str(" |\n");
        for line in dump.lines() {
            result.push_str(&format!(" | {}\n", line));
        }
    }

    result
}

pub fn display_error(error: &Error) {
    eprint!("{}", render_error(error));
}
