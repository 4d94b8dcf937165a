use super::{ast::NodeId, constants::Constant, variables::Variable};

/// Unary and binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    Div,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    Not,
    USub,
    UAdd,
    Invert,
    Repr,
}

impl Operator {
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Operator::Not | Operator::USub | Operator::UAdd | Operator::Invert | Operator::Repr
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "Add",
            Operator::Sub => "Sub",
            Operator::Mult => "Mult",
            Operator::Div => "Div",
            Operator::TrueDiv => "TrueDiv",
            Operator::FloorDiv => "FloorDiv",
            Operator::Mod => "Mod",
            Operator::Pow => "Pow",
            Operator::LShift => "LShift",
            Operator::RShift => "RShift",
            Operator::BitOr => "BitOr",
            Operator::BitXor => "BitXor",
            Operator::BitAnd => "BitAnd",
            Operator::Not => "Not",
            Operator::USub => "USub",
            Operator::UAdd => "UAdd",
            Operator::Invert => "Invert",
            Operator::Repr => "Repr",
        }
    }
}

/// Comparison operators, including the exception match used by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Lt,
    LtE,
    Eq,
    NotEq,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
    ExceptionMatch,
}

impl Comparator {
    pub fn name(self) -> &'static str {
        match self {
            Comparator::Lt => "Lt",
            Comparator::LtE => "LtE",
            Comparator::Eq => "Eq",
            Comparator::NotEq => "NotEq",
            Comparator::Gt => "Gt",
            Comparator::GtE => "GtE",
            Comparator::Is => "Is",
            Comparator::IsNot => "IsNot",
            Comparator::In => "In",
            Comparator::NotIn => "NotIn",
            Comparator::ExceptionMatch => "exception_match",
        }
    }
}

/// Builtins taking exactly one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin1 {
    Len,
    Chr,
    Ord,
    Bin,
    Oct,
    Hex,
    Iter,
    Next,
    Type,
    Tuple,
    List,
    Str,
    Unicode,
    Float,
    Bool,
    Vars,
}

impl Builtin1 {
    pub fn name(self) -> &'static str {
        match self {
            Builtin1::Len => "len",
            Builtin1::Chr => "chr",
            Builtin1::Ord => "ord",
            Builtin1::Bin => "bin",
            Builtin1::Oct => "oct",
            Builtin1::Hex => "hex",
            Builtin1::Iter => "iter",
            Builtin1::Next => "next",
            Builtin1::Type => "type",
            Builtin1::Tuple => "tuple",
            Builtin1::List => "list",
            Builtin1::Str => "str",
            Builtin1::Unicode => "unicode",
            Builtin1::Float => "float",
            Builtin1::Bool => "bool",
            Builtin1::Vars => "vars",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntKind {
    Int,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    Eval,
    Exec,
    Execfile,
}

impl EvalMode {
    pub fn name(self) -> &'static str {
        match self {
            EvalMode::Eval => "eval",
            EvalMode::Exec => "exec",
            EvalMode::Execfile => "execfile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaughtExceptionPart {
    Type,
    Value,
    Traceback,
}

/// Parameter specification of a function body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    pub positional: Vec<Variable>,
    /// The last `default_count` positional parameters carry defaults.
    pub default_count: usize,
    pub list_star: Option<Variable>,
    pub dict_star: Option<Variable>,
}

impl Parameters {
    pub fn default_parameter_variables(&self) -> &[Variable] {
        let count = self.default_count.min(self.positional.len());
        &self.positional[self.positional.len() - count..]
    }

    pub fn all_variables(&self) -> Vec<&Variable> {
        self.positional
            .iter()
            .chain(self.list_star.iter())
            .chain(self.dict_star.iter())
            .collect()
    }
}

/// Function Body
/// A function definition; its body is a statement sequence node.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBody {
    pub name: String,
    pub code_name: String,
    pub doc: Option<String>,
    pub parameters: Parameters,
    pub closure_variables: Vec<Variable>,
    pub user_variables: Vec<Variable>,
    pub tmp_variables: Vec<Variable>,
    pub body: Option<NodeId>,
    pub is_generator: bool,
    /// Set when the body uses `exec` or `import *`, so locals live in a dict.
    pub is_unoptimized: bool,
}

/// Class Body
/// A class definition; executing the body produces the class dict.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBody {
    pub name: String,
    pub code_name: String,
    pub doc: Option<String>,
    pub closure_variables: Vec<Variable>,
    pub class_variables: Vec<Variable>,
    pub tmp_variables: Vec<Variable>,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    VariableRef {
        name: String,
        /// Bound by name resolution, `None` means unresolved.
        variable: Option<Variable>,
    },
    TempVariableRef {
        variable: Variable,
    },
    ConstantRef {
        constant: Constant,
    },
    Operation {
        operator: Operator,
        operands: Vec<NodeId>,
    },
    BoolOr {
        operands: Vec<NodeId>,
    },
    BoolAnd {
        operands: Vec<NodeId>,
    },
    Comparison {
        comparator: Comparator,
        left: NodeId,
        right: NodeId,
    },
    Conditional {
        condition: NodeId,
        yes: NodeId,
        no: NodeId,
    },
    MakeTuple {
        elements: Vec<NodeId>,
    },
    MakeList {
        elements: Vec<NodeId>,
    },
    MakeSet {
        elements: Vec<NodeId>,
    },
    MakeDict {
        pairs: Vec<(NodeId, NodeId)>,
    },
    Call {
        called: NodeId,
        positional: Vec<NodeId>,
        named: Vec<(NodeId, NodeId)>,
        star_list: Option<NodeId>,
        star_dict: Option<NodeId>,
    },
    AttributeLookup {
        source: NodeId,
        attribute: String,
    },
    SpecialAttributeLookup {
        source: NodeId,
        attribute: String,
    },
    SubscriptLookup {
        source: NodeId,
        subscript: NodeId,
    },
    SliceLookup {
        source: NodeId,
        lower: Option<NodeId>,
        upper: Option<NodeId>,
    },
    SliceObject {
        lower: Option<NodeId>,
        upper: Option<NodeId>,
        step: Option<NodeId>,
    },
    FunctionBody(FunctionBody),
    FunctionBodyDefaulted {
        function_body: NodeId,
        defaults: Vec<NodeId>,
    },
    ClassBody(ClassBody),
    ClassBodyBased {
        class_body: NodeId,
        bases: Vec<NodeId>,
    },
    Yield {
        expression: NodeId,
        /// Yield used to deliver a generator expression's value.
        for_return: bool,
    },
    ImportModule {
        module_name: String,
        import_list: Option<Vec<String>>,
        level: i32,
    },
    BuiltinImport {
        import_name: NodeId,
        from_list: Option<NodeId>,
        globals: Option<NodeId>,
        locals: Option<NodeId>,
        level: Option<NodeId>,
    },
    ImportName {
        module: NodeId,
        import_name: String,
    },
    BuiltinRange {
        low: NodeId,
        high: Option<NodeId>,
        step: Option<NodeId>,
    },
    BuiltinGlobals,
    BuiltinLocals,
    BuiltinDir0,
    BuiltinCall1 {
        builtin: Builtin1,
        value: NodeId,
    },
    BuiltinIter2 {
        callable: NodeId,
        sentinel: NodeId,
    },
    BuiltinNext2 {
        iterator: NodeId,
        default: NodeId,
    },
    BuiltinType3 {
        type_name: NodeId,
        bases: NodeId,
        dict: NodeId,
    },
    BuiltinInt {
        kind: IntKind,
        value: Option<NodeId>,
        base: Option<NodeId>,
    },
    BuiltinDict {
        positional: Option<NodeId>,
        named: Vec<(NodeId, NodeId)>,
    },
    BuiltinOpen {
        filename: Option<NodeId>,
        mode: Option<NodeId>,
        buffering: Option<NodeId>,
    },
    BuiltinEval {
        mode: EvalMode,
        source_code: NodeId,
        globals: Option<NodeId>,
        locals: Option<NodeId>,
    },
    RaiseException {
        exception_type: NodeId,
        exception_value: Option<NodeId>,
        /// Evaluated in order before the exception is raised.
        side_effects: Vec<NodeId>,
    },
    BuiltinMakeException {
        exception_name: String,
        args: Vec<NodeId>,
    },
    BuiltinRef {
        builtin_name: String,
    },
    BuiltinAnonymousRef {
        builtin_name: String,
    },
    BuiltinExceptionRef {
        exception_name: String,
    },
    AssignmentVariable {
        target: NodeId,
        source: NodeId,
    },
    CaughtException {
        part: CaughtExceptionPart,
    },
    ListAppend {
        list: NodeId,
        value: NodeId,
    },
    SetAdd {
        set: NodeId,
        value: NodeId,
    },
    DictSet {
        dict: NodeId,
        key: NodeId,
        value: NodeId,
    },
    SpecialUnpack {
        value: NodeId,
        count: usize,
    },
}

impl Expr {
    pub fn name(&self) -> &'static str {
        match self {
            Expr::VariableRef { .. } => "ExpressionVariableRef",
            Expr::TempVariableRef { .. } => "ExpressionTempVariableRef",
            Expr::ConstantRef { .. } => "ExpressionConstantRef",
            Expr::Operation { .. } => "ExpressionOperation",
            Expr::BoolOr { .. } => "ExpressionBoolOR",
            Expr::BoolAnd { .. } => "ExpressionBoolAND",
            Expr::Comparison { .. } => "ExpressionComparison",
            Expr::Conditional { .. } => "ExpressionConditional",
            Expr::MakeTuple { .. } => "ExpressionMakeTuple",
            Expr::MakeList { .. } => "ExpressionMakeList",
            Expr::MakeSet { .. } => "ExpressionMakeSet",
            Expr::MakeDict { .. } => "ExpressionMakeDict",
            Expr::Call { .. } => "ExpressionCall",
            Expr::AttributeLookup { .. } => "ExpressionAttributeLookup",
            Expr::SpecialAttributeLookup { .. } => "ExpressionSpecialAttributeLookup",
            Expr::SubscriptLookup { .. } => "ExpressionSubscriptLookup",
            Expr::SliceLookup { .. } => "ExpressionSliceLookup",
            Expr::SliceObject { .. } => "ExpressionSliceObject",
            Expr::FunctionBody(_) => "ExpressionFunctionBody",
            Expr::FunctionBodyDefaulted { .. } => "ExpressionFunctionBodyDefaulted",
            Expr::ClassBody(_) => "ExpressionClassBody",
            Expr::ClassBodyBased { .. } => "ExpressionClassBodyBased",
            Expr::Yield { .. } => "ExpressionYield",
            Expr::ImportModule { .. } => "ExpressionImportModule",
            Expr::BuiltinImport { .. } => "ExpressionBuiltinImport",
            Expr::ImportName { .. } => "ExpressionImportName",
            Expr::BuiltinRange { .. } => "ExpressionBuiltinRange",
            Expr::BuiltinGlobals => "ExpressionBuiltinGlobals",
            Expr::BuiltinLocals => "ExpressionBuiltinLocals",
            Expr::BuiltinDir0 => "ExpressionBuiltinDir0",
            Expr::BuiltinCall1 { .. } => "ExpressionBuiltinCall1",
            Expr::BuiltinIter2 { .. } => "ExpressionBuiltinIter2",
            Expr::BuiltinNext2 { .. } => "ExpressionBuiltinNext2",
            Expr::BuiltinType3 { .. } => "ExpressionBuiltinType3",
            Expr::BuiltinInt { .. } => "ExpressionBuiltinInt",
            Expr::BuiltinDict { .. } => "ExpressionBuiltinDict",
            Expr::BuiltinOpen { .. } => "ExpressionBuiltinOpen",
            Expr::BuiltinEval { .. } => "ExpressionBuiltinEval",
            Expr::RaiseException { .. } => "ExpressionRaiseException",
            Expr::BuiltinMakeException { .. } => "ExpressionBuiltinMakeException",
            Expr::BuiltinRef { .. } => "ExpressionBuiltinRef",
            Expr::BuiltinAnonymousRef { .. } => "ExpressionBuiltinAnonymousRef",
            Expr::BuiltinExceptionRef { .. } => "ExpressionBuiltinExceptionRef",
            Expr::AssignmentVariable { .. } => "ExpressionAssignmentVariable",
            Expr::CaughtException { .. } => "ExpressionCaughtException",
            Expr::ListAppend { .. } => "ExpressionListOperationAppend",
            Expr::SetAdd { .. } => "ExpressionSetOperationAdd",
            Expr::DictSet { .. } => "ExpressionDictOperationSet",
            Expr::SpecialUnpack { .. } => "ExpressionSpecialUnpack",
        }
    }

    /// Short detail shown next to the node name in dumps.
    pub fn detail(&self) -> Option<String> {
        match self {
            Expr::VariableRef { name, variable } => Some(match variable {
                Some(_) => name.clone(),
                None => format!("{} (unresolved)", name),
            }),
            Expr::TempVariableRef { variable } => Some(variable.name.clone()),
            Expr::ConstantRef { constant } => Some(constant.to_python_repr()),
            Expr::Operation { operator, .. } => Some(operator.name().to_string()),
            Expr::Comparison { comparator, .. } => Some(comparator.name().to_string()),
            Expr::AttributeLookup { attribute, .. }
            | Expr::SpecialAttributeLookup { attribute, .. } => Some(attribute.clone()),
            Expr::FunctionBody(function) => Some(function.name.clone()),
            Expr::ClassBody(class) => Some(class.name.clone()),
            Expr::ImportModule { module_name, .. } => Some(module_name.clone()),
            Expr::ImportName { import_name, .. } => Some(import_name.clone()),
            Expr::BuiltinCall1 { builtin, .. } => Some(builtin.name().to_string()),
            Expr::BuiltinEval { mode, .. } => Some(mode.name().to_string()),
            Expr::BuiltinMakeException { exception_name, .. }
            | Expr::BuiltinExceptionRef { exception_name } => Some(exception_name.clone()),
            Expr::BuiltinRef { builtin_name } | Expr::BuiltinAnonymousRef { builtin_name } => {
                Some(builtin_name.clone())
            }
            Expr::SpecialUnpack { count, .. } => Some(count.to_string()),
            _ => None,
        }
    }

    /// Child nodes in evaluation order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut result = Vec::new();

        match self {
            Expr::VariableRef { .. }
            | Expr::TempVariableRef { .. }
            | Expr::ConstantRef { .. }
            | Expr::ImportModule { .. }
            | Expr::BuiltinGlobals
            | Expr::BuiltinLocals
            | Expr::BuiltinDir0
            | Expr::BuiltinRef { .. }
            | Expr::BuiltinAnonymousRef { .. }
            | Expr::BuiltinExceptionRef { .. }
            | Expr::CaughtException { .. } => {}
            Expr::Operation { operands, .. }
            | Expr::BoolOr { operands }
            | Expr::BoolAnd { operands } => result.extend(operands),
            Expr::Comparison { left, right, .. } => result.extend([*left, *right]),
            Expr::Conditional { condition, yes, no } => result.extend([*condition, *yes, *no]),
            Expr::MakeTuple { elements }
            | Expr::MakeList { elements }
            | Expr::MakeSet { elements } => result.extend(elements),
            Expr::MakeDict { pairs } => {
                for (key, value) in pairs {
                    result.extend([*key, *value]);
                }
            }
            Expr::Call {
                called,
                positional,
                named,
                star_list,
                star_dict,
            } => {
                result.push(*called);
                result.extend(positional);
                for (name, value) in named {
                    result.extend([*name, *value]);
                }
                result.extend(star_list);
                result.extend(star_dict);
            }
            Expr::AttributeLookup { source, .. }
            | Expr::SpecialAttributeLookup { source, .. } => result.push(*source),
            Expr::SubscriptLookup { source, subscript } => result.extend([*source, *subscript]),
            Expr::SliceLookup {
                source,
                lower,
                upper,
            } => {
                result.push(*source);
                result.extend(lower);
                result.extend(upper);
            }
            Expr::SliceObject { lower, upper, step } => {
                result.extend(lower);
                result.extend(upper);
                result.extend(step);
            }
            Expr::FunctionBody(function) => result.extend(function.body),
            Expr::FunctionBodyDefaulted {
                function_body,
                defaults,
            } => {
                result.extend(defaults);
                result.push(*function_body);
            }
            Expr::ClassBody(class) => result.extend(class.body),
            Expr::ClassBodyBased { class_body, bases } => {
                result.extend(bases);
                result.push(*class_body);
            }
            Expr::Yield { expression, .. } => result.push(*expression),
            Expr::BuiltinImport {
                import_name,
                from_list,
                globals,
                locals,
                level,
            } => {
                result.push(*import_name);
                result.extend(from_list);
                result.extend(globals);
                result.extend(locals);
                result.extend(level);
            }
            Expr::ImportName { module, .. } => result.push(*module),
            Expr::BuiltinRange { low, high, step } => {
                result.push(*low);
                result.extend(high);
                result.extend(step);
            }
            Expr::BuiltinCall1 { value, .. } => result.push(*value),
            Expr::BuiltinIter2 { callable, sentinel } => result.extend([*callable, *sentinel]),
            Expr::BuiltinNext2 { iterator, default } => result.extend([*iterator, *default]),
            Expr::BuiltinType3 {
                type_name,
                bases,
                dict,
            } => result.extend([*type_name, *bases, *dict]),
            Expr::BuiltinInt { value, base, .. } => {
                result.extend(value);
                result.extend(base);
            }
            Expr::BuiltinDict { positional, named } => {
                result.extend(positional);
                for (name, value) in named {
                    result.extend([*name, *value]);
                }
            }
            Expr::BuiltinOpen {
                filename,
                mode,
                buffering,
            } => {
                result.extend(filename);
                result.extend(mode);
                result.extend(buffering);
            }
            Expr::BuiltinEval {
                source_code,
                globals,
                locals,
                ..
            } => {
                result.push(*source_code);
                result.extend(globals);
                result.extend(locals);
            }
            Expr::RaiseException {
                exception_type,
                exception_value,
                side_effects,
            } => {
                result.extend(side_effects);
                result.push(*exception_type);
                result.extend(exception_value);
            }
            Expr::BuiltinMakeException { args, .. } => result.extend(args),
            Expr::AssignmentVariable { target, source } => result.extend([*source, *target]),
            Expr::ListAppend { list, value } => result.extend([*list, *value]),
            Expr::SetAdd { set, value } => result.extend([*set, *value]),
            Expr::DictSet { dict, key, value } => result.extend([*dict, *value, *key]),
            Expr::SpecialUnpack { value, .. } => result.push(*value),
        }

        result
    }

    /// Redirects every reference to `old` to point at `new`.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> bool {
        let mut replaced = false;
        let mut swap = |slot: &mut NodeId| {
            if *slot == old {
                *slot = new;
                replaced = true;
            }
        };

        match self {
            Expr::VariableRef { .. }
            | Expr::TempVariableRef { .. }
            | Expr::ConstantRef { .. }
            | Expr::ImportModule { .. }
            | Expr::BuiltinGlobals
            | Expr::BuiltinLocals
            | Expr::BuiltinDir0
            | Expr::BuiltinRef { .. }
            | Expr::BuiltinAnonymousRef { .. }
            | Expr::BuiltinExceptionRef { .. }
            | Expr::CaughtException { .. } => {}
            Expr::Operation { operands, .. }
            | Expr::BoolOr { operands }
            | Expr::BoolAnd { operands } => operands.iter_mut().for_each(&mut swap),
            Expr::Comparison { left, right, .. } => {
                swap(left);
                swap(right);
            }
            Expr::Conditional { condition, yes, no } => {
                swap(condition);
                swap(yes);
                swap(no);
            }
            Expr::MakeTuple { elements }
            | Expr::MakeList { elements }
            | Expr::MakeSet { elements } => elements.iter_mut().for_each(&mut swap),
            Expr::MakeDict { pairs } => {
                for (key, value) in pairs {
                    swap(key);
                    swap(value);
                }
            }
            Expr::Call {
                called,
                positional,
                named,
                star_list,
                star_dict,
            } => {
                swap(called);
                positional.iter_mut().for_each(&mut swap);
                for (name, value) in named {
                    swap(name);
                    swap(value);
                }
                star_list.iter_mut().for_each(&mut swap);
                star_dict.iter_mut().for_each(&mut swap);
            }
            Expr::AttributeLookup { source, .. }
            | Expr::SpecialAttributeLookup { source, .. } => swap(source),
            Expr::SubscriptLookup { source, subscript } => {
                swap(source);
                swap(subscript);
            }
            Expr::SliceLookup {
                source,
                lower,
                upper,
            } => {
                swap(source);
                lower.iter_mut().for_each(&mut swap);
                upper.iter_mut().for_each(&mut swap);
            }
            Expr::SliceObject { lower, upper, step } => {
                lower.iter_mut().for_each(&mut swap);
                upper.iter_mut().for_each(&mut swap);
                step.iter_mut().for_each(&mut swap);
            }
            Expr::FunctionBody(function) => function.body.iter_mut().for_each(&mut swap),
            Expr::FunctionBodyDefaulted {
                function_body,
                defaults,
            } => {
                defaults.iter_mut().for_each(&mut swap);
                swap(function_body);
            }
            Expr::ClassBody(class) => class.body.iter_mut().for_each(&mut swap),
            Expr::ClassBodyBased { class_body, bases } => {
                bases.iter_mut().for_each(&mut swap);
                swap(class_body);
            }
            Expr::Yield { expression, .. } => swap(expression),
            Expr::BuiltinImport {
                import_name,
                from_list,
                globals,
                locals,
                level,
            } => {
                swap(import_name);
                from_list.iter_mut().for_each(&mut swap);
                globals.iter_mut().for_each(&mut swap);
                locals.iter_mut().for_each(&mut swap);
                level.iter_mut().for_each(&mut swap);
            }
            Expr::ImportName { module, .. } => swap(module),
            Expr::BuiltinRange { low, high, step } => {
                swap(low);
                high.iter_mut().for_each(&mut swap);
                step.iter_mut().for_each(&mut swap);
            }
            Expr::BuiltinCall1 { value, .. } => swap(value),
            Expr::BuiltinIter2 { callable, sentinel } => {
                swap(callable);
                swap(sentinel);
            }
            Expr::BuiltinNext2 { iterator, default } => {
                swap(iterator);
                swap(default);
            }
            Expr::BuiltinType3 {
                type_name,
                bases,
                dict,
            } => {
                swap(type_name);
                swap(bases);
                swap(dict);
            }
            Expr::BuiltinInt { value, base, .. } => {
                value.iter_mut().for_each(&mut swap);
                base.iter_mut().for_each(&mut swap);
            }
            Expr::BuiltinDict { positional, named } => {
                positional.iter_mut().for_each(&mut swap);
                for (name, value) in named {
                    swap(name);
                    swap(value);
                }
            }
            Expr::BuiltinOpen {
                filename,
                mode,
                buffering,
            } => {
                filename.iter_mut().for_each(&mut swap);
                mode.iter_mut().for_each(&mut swap);
                buffering.iter_mut().for_each(&mut swap);
            }
            Expr::BuiltinEval {
                source_code,
                globals,
                locals,
                ..
            } => {
                swap(source_code);
                globals.iter_mut().for_each(&mut swap);
                locals.iter_mut().for_each(&mut swap);
            }
            Expr::RaiseException {
                exception_type,
                exception_value,
                side_effects,
            } => {
                side_effects.iter_mut().for_each(&mut swap);
                swap(exception_type);
                exception_value.iter_mut().for_each(&mut swap);
            }
            Expr::BuiltinMakeException { args, .. } => args.iter_mut().for_each(&mut swap),
            Expr::AssignmentVariable { target, source } => {
                swap(source);
                swap(target);
            }
            Expr::ListAppend { list, value } => {
                swap(list);
                swap(value);
            }
            Expr::SetAdd { set, value } => {
                swap(set);
                swap(value);
            }
            Expr::DictSet { dict, key, value } => {
                swap(dict);
                swap(value);
                swap(key);
            }
            Expr::SpecialUnpack { value, .. } => swap(value),
        }

        replaced
    }
}
