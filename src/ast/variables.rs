/// Variable Kinds
///
/// Where the storage of a resolved variable lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Local,
    Parameter,
    Closure,
    ModuleGlobal,
    ClassLocal,
    Temp,
}

/// A variable as bound by name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
}

impl Variable {
    pub fn new(name: &str, kind: VariableKind) -> Self {
        Variable {
            name: name.to_string(),
            kind,
        }
    }

    pub fn is_module_variable(&self) -> bool {
        self.kind == VariableKind::ModuleGlobal
    }

    pub fn is_temp_variable(&self) -> bool {
        self.kind == VariableKind::Temp
    }
}
