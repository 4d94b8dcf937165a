//! Translation options.

use serde::{Deserialize, Serialize};

use crate::{
    errors::errors::{Error, ErrorImpl},
    SourceRef,
};

/// Version of the language the generated code targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonVersion {
    pub major: u8,
    pub minor: u8,
}

impl Default for PythonVersion {
    fn default() -> Self {
        PythonVersion { major: 2, minor: 7 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default)]
    pub python_version: PythonVersion,
    /// Emit a trace line before every statement.
    #[serde(default)]
    pub trace_execution: bool,
    #[serde(default = "default_max_optimization_passes")]
    pub max_optimization_passes: usize,
}

fn default_max_optimization_passes() -> usize {
    64
}

impl Default for Options {
    fn default() -> Self {
        Options {
            python_version: PythonVersion::default(),
            trace_execution: false,
            max_optimization_passes: default_max_optimization_passes(),
        }
    }
}

impl Options {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|error| {
            Error::new(
                ErrorImpl::InvalidConfig {
                    message: error.to_string(),
                },
                SourceRef::null(),
            )
        })
    }

    /// The target has native `a[i:j]` slice calls.
    pub fn slicing_available(&self) -> bool {
        self.python_version.major < 3
    }

    pub fn is_python3(&self) -> bool {
        self.python_version.major >= 3
    }
}

#[cfg(test)]
mod tests {
    use super::{Options, PythonVersion};

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.python_version, PythonVersion { major: 2, minor: 7 });
        assert!(options.slicing_available());
        assert!(!options.trace_execution);
        assert_eq!(options.max_optimization_passes, 64);
    }

    #[test]
    fn test_from_json() {
        let options =
            Options::from_json(r#"{"python_version": {"major": 3, "minor": 2}}"#).unwrap();
        assert!(!options.slicing_available());
        assert!(options.is_python3());
        assert_eq!(options.max_optimization_passes, 64);
    }

    #[test]
    fn test_from_json_invalid() {
        let error = Options::from_json("{\"trace_execution\": 3}").unwrap_err();
        assert_eq!(error.get_error_name(), "InvalidConfig");
    }
}
