use std::fmt::Display;

use crate::errors::errors::ErrorImpl;

/// Reference Count Contract
///
/// What the holder of an identifier owes the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefCount {
    /// Immortal handle, never released.
    Constant,
    /// Valid while its owner lives, must not be released.
    Borrowed,
    /// Carries one reference the holder must release.
    Owned,
}

/// Identifier
///
/// An expression in the target text together with its reference-count
/// contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub code: String,
    pub ref_count: RefCount,
}

impl Identifier {
    pub fn new(code: impl Into<String>, ref_count: RefCount) -> Self {
        Identifier {
            code: code.into(),
            ref_count,
        }
    }

    pub fn get_code(&self) -> &str {
        &self.code
    }

    /// References owned by the holder, 0 or 1.
    pub fn ref_units(&self) -> u8 {
        match self.ref_count {
            RefCount::Owned => 1,
            RefCount::Constant | RefCount::Borrowed => 0,
        }
    }

    /// Code usable as an argument for the duration of one call.
    pub fn code_temporary_ref(&self) -> String {
        match self.ref_count {
            RefCount::Owned => format!("PyObjectTemporary( {} ).asObject()", self.code),
            RefCount::Constant | RefCount::Borrowed => self.code.clone(),
        }
    }

    /// Code that hands one reference over to the receiver.
    pub fn code_export_ref(&self) -> String {
        match self.ref_count {
            RefCount::Owned => self.code.clone(),
            RefCount::Constant | RefCount::Borrowed => {
                format!("INCREASE_REFCOUNT( {} )", self.code)
            }
        }
    }

    /// Code that evaluates the identifier and releases what it owns.
    pub fn code_drop_ref(&self) -> String {
        match self.ref_count {
            RefCount::Owned => format!("DECREASE_REFCOUNT( {} )", self.code),
            RefCount::Constant | RefCount::Borrowed => self.code.clone(),
        }
    }

    /// Rejects empty code and code with surrounding whitespace.
    pub fn check(&self) -> Result<(), ErrorImpl> {
        if self.code.is_empty() {
            return Err(ErrorImpl::InvalidIdentifier {
                code: self.code.clone(),
            });
        }
        if self.code.trim() != self.code {
            return Err(ErrorImpl::MalformedCode {
                code: self.code.clone(),
            });
        }

        Ok(())
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}
