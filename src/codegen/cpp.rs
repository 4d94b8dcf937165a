//! Reference emitter producing C++ text against a small runtime of helper
//! macros (`LOOKUP_ATTRIBUTE`, `MAKE_TUPLE2`, ...).

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    ast::{
        ast::Provider,
        constants::Constant,
        expressions::{Builtin1, CaughtExceptionPart, ClassBody, Comparator, FunctionBody, IntKind, Operator},
        statements::Module,
        variables::{Variable, VariableKind},
    },
    FutureSpec, SourceRef, MK_IDENTIFIER,
};

use super::{
    context::{Context, GlobalContext},
    emitter::{Emitter, LocalsMode},
    identifier::Identifier,
};

lazy_static! {
    static ref NON_IDENTIFIER: Regex = Regex::new("[^a-zA-Z0-9_]").unwrap();
}

const INDENT: &str = "    ";

/// Indents every line of every element by one level.
fn indented(codes: &[String]) -> String {
    codes
        .iter()
        .flat_map(|code| code.lines())
        .map(|line| format!("{}{}", INDENT, line))
        .collect::<Vec<String>>()
        .join("\n")
}

fn braced(codes: &[String]) -> String {
    if codes.is_empty() {
        String::from("{\n}")
    } else {
        format!("{{\n{}\n}}", indented(codes))
    }
}

fn optional_code(identifier: Option<&Identifier>, absent: &str) -> String {
    identifier
        .map(Identifier::code_temporary_ref)
        .unwrap_or_else(|| absent.to_string())
}

fn temporaries(identifiers: &[Identifier]) -> Vec<String> {
    identifiers.iter().map(Identifier::code_temporary_ref).collect()
}

fn c_string(value: &[u8]) -> String {
    let mut result = String::from("\"");

    for byte in value {
        match byte {
            b'\\' => result.push_str("\\\\"),
            b'"' => result.push_str("\\\""),
            b'?' => result.push_str("\\?"),
            0x20..=0x7e => result.push(*byte as char),
            _ => result.push_str(&format!("\\{:03o}", byte)),
        }
    }

    result.push('"');
    result
}

fn operator_helper(operator: Operator) -> &'static str {
    match operator {
        Operator::Add => "PyNumber_Add",
        Operator::Sub => "PyNumber_Subtract",
        Operator::Mult => "PyNumber_Multiply",
        Operator::Div => "PyNumber_Divide",
        Operator::TrueDiv => "PyNumber_TrueDivide",
        Operator::FloorDiv => "PyNumber_FloorDivide",
        Operator::Mod => "PyNumber_Remainder",
        Operator::Pow => "PyNumber_Power",
        Operator::LShift => "PyNumber_Lshift",
        Operator::RShift => "PyNumber_Rshift",
        Operator::BitOr => "PyNumber_Or",
        Operator::BitXor => "PyNumber_Xor",
        Operator::BitAnd => "PyNumber_And",
        Operator::Not => "UNARY_NOT",
        Operator::USub => "PyNumber_Negative",
        Operator::UAdd => "PyNumber_Positive",
        Operator::Invert => "PyNumber_Invert",
        Operator::Repr => "PyObject_Repr",
    }
}

fn comparator_suffix(comparator: Comparator) -> &'static str {
    match comparator {
        Comparator::Lt => "LT",
        Comparator::LtE => "LE",
        Comparator::Eq => "EQ",
        Comparator::NotEq => "NE",
        Comparator::Gt => "GT",
        Comparator::GtE => "GE",
        Comparator::Is => "IS",
        Comparator::IsNot => "ISNOT",
        Comparator::In => "IN",
        Comparator::NotIn => "NOTIN",
        Comparator::ExceptionMatch => "EXCEPTION_MATCH",
    }
}

fn builtin1_helper(builtin: Builtin1) -> (&'static str, bool) {
    // The flag marks helpers returning an immortal object.
    match builtin {
        Builtin1::Len => ("BUILTIN_LEN", false),
        Builtin1::Chr => ("BUILTIN_CHR", false),
        Builtin1::Ord => ("BUILTIN_ORD", false),
        Builtin1::Bin => ("BUILTIN_BIN", false),
        Builtin1::Oct => ("BUILTIN_OCT", false),
        Builtin1::Hex => ("BUILTIN_HEX", false),
        Builtin1::Iter => ("MAKE_ITERATOR", false),
        Builtin1::Next => ("BUILTIN_NEXT1", false),
        Builtin1::Type => ("BUILTIN_TYPE1", false),
        Builtin1::Tuple => ("TO_TUPLE", false),
        Builtin1::List => ("TO_LIST", false),
        Builtin1::Str => ("TO_STR", false),
        Builtin1::Unicode => ("TO_UNICODE", false),
        Builtin1::Float => ("TO_FLOAT", false),
        Builtin1::Bool => ("TO_BOOL", true),
        Builtin1::Vars => ("LOOKUP_VARS", false),
    }
}

/// C++ Emitter
///
/// Renders the generator's requests as C++ source against the helper
/// runtime. The text is deterministic for a given sequence of calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct CppEmitter;

impl CppEmitter {
    pub fn new() -> Self {
        CppEmitter
    }

    fn variable_storage(&self, context: &Context<'_>, variable: &Variable) -> String {
        match variable.kind {
            VariableKind::Local | VariableKind::Parameter | VariableKind::ClassLocal => {
                format!("_python_var_{}", variable.name)
            }
            VariableKind::Closure => format!("_python_closure_{}", variable.name),
            VariableKind::ModuleGlobal => {
                format!("_mvar_{}_{}", context.code_name(), variable.name)
            }
            VariableKind::Temp => format!("_python_tmp_{}", variable.name),
        }
    }

    fn constant_creation_code(&self, constant: &Constant) -> String {
        match constant {
            Constant::None => String::from("INCREASE_REFCOUNT( Py_None )"),
            Constant::Ellipsis => String::from("INCREASE_REFCOUNT( Py_Ellipsis )"),
            Constant::Bool(true) => String::from("INCREASE_REFCOUNT( Py_True )"),
            Constant::Bool(false) => String::from("INCREASE_REFCOUNT( Py_False )"),
            Constant::Int(value) => match constant.as_small_index() {
                Some(small) => format!("PyInt_FromLong( {} )", small),
                None => format!(
                    "PyLong_FromString( (char *){}, NULL, 10 )",
                    c_string(value.to_string().as_bytes())
                ),
            },
            Constant::Float(value) => format!("PyFloat_FromDouble( {:?} )", value),
            Constant::Str(value) => format!(
                "PyString_FromStringAndSize( {}, {} )",
                c_string(value.as_bytes()),
                value.len()
            ),
            Constant::Unicode(value) => format!(
                "PyUnicode_DecodeUTF8( {}, {}, NULL )",
                c_string(value.as_bytes()),
                value.len()
            ),
            Constant::Bytes(value) => format!(
                "PyBytes_FromStringAndSize( {}, {} )",
                c_string(value),
                value.len()
            ),
            Constant::Tuple(_)
            | Constant::List(_)
            | Constant::Set(_)
            | Constant::Dict(_) => format!(
                "UNSTREAM_CONSTANT( {} )",
                c_string(constant.to_python_repr().as_bytes())
            ),
        }
    }

    fn function_signature(&self, code_name: &str, default_count: usize, closure_variables: &[Variable]) -> String {
        let mut parameters: Vec<String> = (0..default_count)
            .map(|index| format!("PyObject *default_{}", index))
            .collect();
        parameters.extend(
            closure_variables
                .iter()
                .map(|variable| format!("PyObjectSharedLocalVariable &closure_{}", variable.name)),
        );

        if parameters.is_empty() {
            format!("static PyObject *MAKE_FUNCTION_{}()", code_name)
        } else {
            format!("static PyObject *MAKE_FUNCTION_{}( {} )", code_name, parameters.join(", "))
        }
    }

    fn function_text(
        &self,
        context: &mut Context<'_>,
        function: &FunctionBody,
        source_ref: &SourceRef,
        default_access: &[Identifier],
        codes: &[String],
        generator: bool,
    ) -> String {
        let name_handle = context.get_constant_handle(&Constant::str(&function.name));
        let mut lines = vec![format!(
            "// Function \"{}\" defined at {}",
            function.name,
            source_ref.get_as_string()
        )];

        let parameters = function
            .parameters
            .all_variables()
            .iter()
            .map(|variable| format!("PyObject *_python_par_{}", variable.name))
            .collect::<Vec<String>>();
        let implementation = if generator {
            format!("impl_{}_generator", function.code_name)
        } else {
            format!("impl_{}", function.code_name)
        };
        if parameters.is_empty() {
            lines.push(format!("static PyObject *{}( CompiledFunctionObject *self )", implementation));
        } else {
            lines.push(format!(
                "static PyObject *{}( CompiledFunctionObject *self, {} )",
                implementation,
                parameters.join(", ")
            ));
        }
        lines.push(String::from("{"));

        let mut body = Vec::new();
        for (variable, access) in function
            .parameters
            .default_parameter_variables()
            .iter()
            .zip(default_access)
        {
            body.push(format!(
                "if ( _python_par_{} == NULL ) _python_par_{} = {};",
                variable.name,
                variable.name,
                access.code_export_ref()
            ));
        }
        for variable in function.parameters.all_variables() {
            body.push(format!(
                "PyObjectLocalVariable _python_var_{}( {}, _python_par_{} );",
                variable.name,
                context.get_constant_handle(&Constant::str(&variable.name)),
                variable.name
            ));
        }
        for variable in &function.user_variables {
            body.push(format!(
                "PyObjectLocalVariable _python_var_{}( {} );",
                variable.name,
                context.get_constant_handle(&Constant::str(&variable.name))
            ));
        }
        for variable in &function.tmp_variables {
            body.push(format!("PyObjectTempVariable _python_tmp_{};", variable.name));
        }
        body.push(format!(
            "FrameGuard frame_guard( MAKE_FRAME( {}, _module_{} ) );",
            name_handle,
            context.code_name()
        ));
        body.extend(codes.iter().cloned());
        if generator {
            body.push(self.get_yield_terminator_code());
        } else {
            body.push(String::from("return INCREASE_REFCOUNT( Py_None );"));
        }

        lines.push(indented(&body));
        lines.push(String::from("}"));
        lines.join("\n")
    }
}

impl Emitter for CppEmitter {
    fn get_constant_handle(&self, context: &mut Context<'_>, constant: &Constant) -> Identifier {
        let handle = context.get_constant_handle(constant);

        match constant {
            Constant::List(_) => MK_IDENTIFIER!(format!("LIST_COPY( {} )", handle), Owned),
            Constant::Dict(_) => MK_IDENTIFIER!(format!("PyDict_Copy( {} )", handle), Owned),
            Constant::Set(_) => MK_IDENTIFIER!(format!("PySet_New( {} )", handle), Owned),
            Constant::Tuple(_) if constant.is_mutable() => {
                MK_IDENTIFIER!(format!("DEEP_COPY( {} )", handle), Owned)
            }
            _ => MK_IDENTIFIER!(handle, Constant),
        }
    }

    fn get_constant_access(&self, context: &mut Context<'_>, constant: &Constant) -> Identifier {
        match constant {
            Constant::None => MK_IDENTIFIER!("Py_None", Constant),
            Constant::Bool(true) => MK_IDENTIFIER!("Py_True", Constant),
            Constant::Bool(false) => MK_IDENTIFIER!("Py_False", Constant),
            Constant::Ellipsis => MK_IDENTIFIER!("Py_Ellipsis", Constant),
            _ => self.get_constant_handle(context, constant),
        }
    }

    fn get_variable_access(&self, context: &Context<'_>, variable: &Variable) -> Identifier {
        MK_IDENTIFIER!(
            format!("{}.asObject()", self.variable_storage(context, variable)),
            Borrowed
        )
    }

    fn get_variable_assignment_code(
        &self,
        context: &Context<'_>,
        variable: &Variable,
        identifier: &Identifier,
    ) -> String {
        format!(
            "{}.assign( {} );",
            self.variable_storage(context, variable),
            identifier.code_export_ref()
        )
    }

    fn get_assignment_expression_code(
        &self,
        context: &Context<'_>,
        variable: &Variable,
        identifier: &Identifier,
    ) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "{}.assignAndGet( {} )",
                self.variable_storage(context, variable),
                identifier.code_export_ref()
            ),
            Borrowed
        )
    }

    fn get_variable_del_code(&self, context: &Context<'_>, variable: &Variable) -> String {
        format!("{}.del();", self.variable_storage(context, variable))
    }

    fn get_default_value_access(&self, variable: &Variable) -> Identifier {
        MK_IDENTIFIER!(format!("self->m_defaults.{}", variable.name), Borrowed)
    }

    fn get_tuple_creation_code(&self, context: &mut Context<'_>, elements: &[Identifier]) -> Identifier {
        context.global_mut().add_tuple_arity(elements.len());
        MK_IDENTIFIER!(
            format!("MAKE_TUPLE{}( {} )", elements.len(), temporaries(elements).join(", ")),
            Owned
        )
    }

    fn get_list_creation_code(&self, context: &mut Context<'_>, elements: &[Identifier]) -> Identifier {
        context.global_mut().add_list_arity(elements.len());
        if elements.is_empty() {
            return MK_IDENTIFIER!("MAKE_LIST0()", Owned);
        }
        MK_IDENTIFIER!(
            format!("MAKE_LIST{}( {} )", elements.len(), temporaries(elements).join(", ")),
            Owned
        )
    }

    fn get_set_creation_code(&self, elements: &[Identifier]) -> Identifier {
        if elements.is_empty() {
            return MK_IDENTIFIER!("PySet_New( NULL )", Owned);
        }
        MK_IDENTIFIER!(
            format!("MAKE_SET( {}, {} )", elements.len(), temporaries(elements).join(", ")),
            Owned
        )
    }

    fn get_dictionary_creation_code(
        &self,
        context: &mut Context<'_>,
        keys: &[Identifier],
        values: &[Identifier],
    ) -> Identifier {
        context.global_mut().add_dict_arity(keys.len());
        if keys.is_empty() {
            return MK_IDENTIFIER!("MAKE_DICT0()", Owned);
        }

        // Values come first, matching the evaluation order of dict displays.
        let arguments = keys
            .iter()
            .zip(values)
            .flat_map(|(key, value)| [value.code_temporary_ref(), key.code_temporary_ref()])
            .collect::<Vec<String>>();

        MK_IDENTIFIER!(
            format!("MAKE_DICT{}( {} )", keys.len(), arguments.join(", ")),
            Owned
        )
    }

    fn get_operation_code(&self, operator: Operator, operands: &[Identifier]) -> Identifier {
        let arguments = temporaries(operands).join(", ");

        match operator {
            Operator::Not => MK_IDENTIFIER!(format!("UNARY_NOT( {} )", arguments), Constant),
            Operator::Pow => MK_IDENTIFIER!(format!("POWER_OPERATION( {} )", arguments), Owned),
            _ if operator.is_unary() => MK_IDENTIFIER!(
                format!("UNARY_OPERATION( {}, {} )", operator_helper(operator), arguments),
                Owned
            ),
            _ => MK_IDENTIFIER!(
                format!("BINARY_OPERATION( {}, {} )", operator_helper(operator), arguments),
                Owned
            ),
        }
    }

    fn get_comparison_expression_code(
        &self,
        comparator: Comparator,
        left: &Identifier,
        right: &Identifier,
    ) -> Identifier {
        let left = left.code_temporary_ref();
        let right = right.code_temporary_ref();

        match comparator {
            Comparator::Is => MK_IDENTIFIER!(format!("BOOL_FROM( {} == {} )", left, right), Constant),
            Comparator::IsNot => MK_IDENTIFIER!(format!("BOOL_FROM( {} != {} )", left, right), Constant),
            Comparator::In => MK_IDENTIFIER!(format!("SEQUENCE_CONTAINS( {}, {} )", right, left), Constant),
            Comparator::NotIn => {
                MK_IDENTIFIER!(format!("SEQUENCE_CONTAINS_NOT( {}, {} )", right, left), Constant)
            }
            Comparator::ExceptionMatch => MK_IDENTIFIER!(
                format!("BOOL_FROM( PyErr_GivenExceptionMatches( {}, {} ) )", left, right),
                Constant
            ),
            _ => MK_IDENTIFIER!(
                format!("RICH_COMPARE_{}( {}, {} )", comparator_suffix(comparator), left, right),
                Owned
            ),
        }
    }

    fn get_comparison_expression_bool_code(
        &self,
        comparator: Comparator,
        left: &Identifier,
        right: &Identifier,
    ) -> String {
        let left = left.code_temporary_ref();
        let right = right.code_temporary_ref();

        match comparator {
            Comparator::Is => format!("( {} == {} )", left, right),
            Comparator::IsNot => format!("( {} != {} )", left, right),
            Comparator::In => format!("SEQUENCE_CONTAINS_BOOL( {}, {} )", right, left),
            Comparator::NotIn => format!("SEQUENCE_CONTAINS_NOT_BOOL( {}, {} )", right, left),
            Comparator::ExceptionMatch => {
                format!("PyErr_GivenExceptionMatches( {}, {} )", left, right)
            }
            _ => format!(
                "RICH_COMPARE_BOOL_{}( {}, {} )",
                comparator_suffix(comparator),
                left,
                right
            ),
        }
    }

    fn get_selection_or_code(&self, operands: &[Identifier]) -> Identifier {
        let mut operands = operands.iter().rev();
        let Some(last) = operands.next() else {
            return MK_IDENTIFIER!("Py_False", Constant);
        };

        let code = operands.fold(last.code_export_ref(), |rest, operand| {
            format!("( SELECT_IF_TRUE( {} ) ?: {} )", operand.code_export_ref(), rest)
        });
        MK_IDENTIFIER!(code, Owned)
    }

    fn get_selection_and_code(&self, operands: &[Identifier]) -> Identifier {
        let mut operands = operands.iter().rev();
        let Some(last) = operands.next() else {
            return MK_IDENTIFIER!("Py_True", Constant);
        };

        let code = operands.fold(last.code_export_ref(), |rest, operand| {
            format!("( SELECT_IF_FALSE( {} ) ?: {} )", operand.code_export_ref(), rest)
        });
        MK_IDENTIFIER!(code, Owned)
    }

    fn get_conditional_expression_code(
        &self,
        condition: &str,
        yes: &Identifier,
        no: &Identifier,
    ) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "( {} ? {} : {} )",
                condition,
                yes.code_export_ref(),
                no.code_export_ref()
            ),
            Owned
        )
    }

    fn get_true_expression_code(&self) -> String {
        String::from("true")
    }

    fn get_false_expression_code(&self) -> String {
        String::from("false")
    }

    fn get_condition_not_bool_code(&self, condition: &str) -> String {
        format!("( !{} )", condition)
    }

    fn get_condition_or_code(&self, parts: &[String]) -> String {
        format!("( {} )", parts.join(" || "))
    }

    fn get_condition_and_code(&self, parts: &[String]) -> String {
        format!("( {} )", parts.join(" && "))
    }

    fn get_condition_check_true_code(&self, identifier: &Identifier) -> String {
        format!("CHECK_IF_TRUE( {} )", identifier.code_temporary_ref())
    }

    fn get_condition_check_false_code(&self, identifier: &Identifier) -> String {
        format!("CHECK_IF_FALSE( {} )", identifier.code_temporary_ref())
    }

    fn get_attribute_lookup_code(&self, attribute: &Identifier, source: &Identifier) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "LOOKUP_ATTRIBUTE( {}, {} )",
                source.code_temporary_ref(),
                attribute.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_special_attribute_lookup_code(&self, attribute: &Identifier, source: &Identifier) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "LOOKUP_SPECIAL_ATTRIBUTE( {}, {} )",
                source.code_temporary_ref(),
                attribute.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_attribute_assignment_code(
        &self,
        target: &Identifier,
        attribute: &Identifier,
        value: &Identifier,
    ) -> String {
        format!(
            "SET_ATTRIBUTE( {}, {}, {} );",
            value.code_temporary_ref(),
            target.code_temporary_ref(),
            attribute.code_temporary_ref()
        )
    }

    fn get_attribute_del_code(&self, target: &Identifier, attribute: &Identifier) -> String {
        format!(
            "DEL_ATTRIBUTE( {}, {} );",
            target.code_temporary_ref(),
            attribute.code_temporary_ref()
        )
    }

    fn get_subscript_lookup_code(&self, source: &Identifier, subscript: &Identifier) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "LOOKUP_SUBSCRIPT( {}, {} )",
                source.code_temporary_ref(),
                subscript.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_subscript_assignment_code(
        &self,
        subscribed: &Identifier,
        subscript: &Identifier,
        value: &Identifier,
    ) -> String {
        format!(
            "SET_SUBSCRIPT( {}, {}, {} );",
            value.code_temporary_ref(),
            subscribed.code_temporary_ref(),
            subscript.code_temporary_ref()
        )
    }

    fn get_subscript_del_code(&self, subscribed: &Identifier, subscript: &Identifier) -> String {
        format!(
            "DEL_SUBSCRIPT( {}, {} );",
            subscribed.code_temporary_ref(),
            subscript.code_temporary_ref()
        )
    }

    fn get_min_index_code(&self) -> String {
        String::from("0")
    }

    fn get_max_index_code(&self) -> String {
        String::from("PY_SSIZE_T_MAX")
    }

    fn get_index_value_code(&self, value: i64) -> String {
        value.to_string()
    }

    fn get_index_code(&self, identifier: &Identifier) -> String {
        format!("CONVERT_TO_INDEX( {} )", identifier.code_temporary_ref())
    }

    fn get_slice_lookup_indexes_code(&self, source: &Identifier, lower: &str, upper: &str) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "LOOKUP_INDEX_SLICE( {}, {}, {} )",
                source.code_temporary_ref(),
                lower,
                upper
            ),
            Owned
        )
    }

    fn get_slice_lookup_code(
        &self,
        source: &Identifier,
        lower: Option<&Identifier>,
        upper: Option<&Identifier>,
    ) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "LOOKUP_SLICE( {}, {}, {} )",
                source.code_temporary_ref(),
                optional_code(lower, "Py_None"),
                optional_code(upper, "Py_None")
            ),
            Owned
        )
    }

    fn get_slice_assignment_indexes_code(
        &self,
        target: &Identifier,
        lower: &str,
        upper: &str,
        value: &Identifier,
    ) -> String {
        format!(
            "SET_INDEX_SLICE( {}, {}, {}, {} );",
            target.code_temporary_ref(),
            lower,
            upper,
            value.code_temporary_ref()
        )
    }

    fn get_slice_assignment_code(
        &self,
        target: &Identifier,
        lower: Option<&Identifier>,
        upper: Option<&Identifier>,
        value: &Identifier,
    ) -> String {
        format!(
            "SET_SLICE( {}, {}, {}, {} );",
            target.code_temporary_ref(),
            optional_code(lower, "Py_None"),
            optional_code(upper, "Py_None"),
            value.code_temporary_ref()
        )
    }

    fn get_slice_del_code(&self, target: &Identifier, lower: &str, upper: &str) -> String {
        format!(
            "DEL_SLICE( {}, {}, {} );",
            target.code_temporary_ref(),
            lower,
            upper
        )
    }

    fn get_slice_object_code(
        &self,
        lower: Option<&Identifier>,
        upper: Option<&Identifier>,
        step: Option<&Identifier>,
    ) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "MAKE_SLICEOBJ( {}, {}, {} )",
                optional_code(lower, "Py_None"),
                optional_code(upper, "Py_None"),
                optional_code(step, "Py_None")
            ),
            Owned
        )
    }

    fn get_function_call_code(
        &self,
        function: &Identifier,
        argument_tuple: Option<&Identifier>,
        argument_dictionary: Option<&Identifier>,
        star_list: Option<&Identifier>,
        star_dict: Option<&Identifier>,
    ) -> Identifier {
        let function = function.code_temporary_ref();

        let code = if star_list.is_some() || star_dict.is_some() {
            format!(
                "CALL_FUNCTION_WITH_STAR( {}, {}, {}, {}, {} )",
                function,
                optional_code(argument_tuple, "NULL"),
                optional_code(argument_dictionary, "NULL"),
                optional_code(star_list, "NULL"),
                optional_code(star_dict, "NULL")
            )
        } else {
            match (argument_tuple, argument_dictionary) {
                (None, None) => format!("CALL_FUNCTION_NO_ARGS( {} )", function),
                (Some(arguments), None) => format!(
                    "CALL_FUNCTION_WITH_POSARGS( {}, {} )",
                    function,
                    arguments.code_temporary_ref()
                ),
                (arguments, dictionary) => format!(
                    "CALL_FUNCTION( {}, {}, {} )",
                    function,
                    optional_code(arguments, "const_tuple_empty"),
                    optional_code(dictionary, "NULL")
                ),
            }
        };

        MK_IDENTIFIER!(code, Owned)
    }

    fn get_function_creation_code(
        &self,
        _context: &Context<'_>,
        code_name: &str,
        defaults: &[Identifier],
        closure_variables: &[Variable],
    ) -> Identifier {
        let mut arguments: Vec<String> = defaults.iter().map(Identifier::code_export_ref).collect();
        arguments.extend(
            closure_variables
                .iter()
                .map(|variable| format!("_python_closure_{}", variable.name)),
        );

        if arguments.is_empty() {
            MK_IDENTIFIER!(format!("MAKE_FUNCTION_{}()", code_name), Owned)
        } else {
            MK_IDENTIFIER!(
                format!("MAKE_FUNCTION_{}( {} )", code_name, arguments.join(", ")),
                Owned
            )
        }
    }

    fn get_function_decl(
        &self,
        _context: &Context<'_>,
        code_name: &str,
        default_count: usize,
        closure_variables: &[Variable],
    ) -> String {
        format!(
            "{};",
            self.function_signature(code_name, default_count, closure_variables)
        )
    }

    fn get_function_code(
        &self,
        context: &mut Context<'_>,
        function: &FunctionBody,
        source_ref: &SourceRef,
        default_access: &[Identifier],
        codes: &[String],
    ) -> String {
        self.function_text(context, function, source_ref, default_access, codes, false)
    }

    fn get_generator_function_code(
        &self,
        context: &mut Context<'_>,
        function: &FunctionBody,
        source_ref: &SourceRef,
        default_access: &[Identifier],
        codes: &[String],
    ) -> String {
        self.function_text(context, function, source_ref, default_access, codes, true)
    }

    fn get_class_dict_creation_code(
        &self,
        _context: &Context<'_>,
        code_name: &str,
        closure_variables: &[Variable],
    ) -> Identifier {
        let arguments = closure_variables
            .iter()
            .map(|variable| format!("_python_closure_{}", variable.name))
            .collect::<Vec<String>>();

        if arguments.is_empty() {
            MK_IDENTIFIER!(format!("MAKE_CLASS_DICT_{}()", code_name), Owned)
        } else {
            MK_IDENTIFIER!(
                format!("MAKE_CLASS_DICT_{}( {} )", code_name, arguments.join(", ")),
                Owned
            )
        }
    }

    fn get_class_creation_code(
        &self,
        context: &mut Context<'_>,
        class_name: &str,
        bases: &Identifier,
        dict: &Identifier,
    ) -> Identifier {
        let name_handle = context.get_constant_handle(&Constant::str(class_name));

        MK_IDENTIFIER!(
            format!(
                "MAKE_CLASS( {}, {}, {} )",
                name_handle,
                bases.code_temporary_ref(),
                dict.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_class_decl(&self, _context: &Context<'_>, code_name: &str, closure_variables: &[Variable]) -> String {
        let parameters = closure_variables
            .iter()
            .map(|variable| format!("PyObjectSharedLocalVariable &closure_{}", variable.name))
            .collect::<Vec<String>>();

        if parameters.is_empty() {
            format!("static PyObject *MAKE_CLASS_DICT_{}();", code_name)
        } else {
            format!(
                "static PyObject *MAKE_CLASS_DICT_{}( {} );",
                code_name,
                parameters.join(", ")
            )
        }
    }

    fn get_class_code(
        &self,
        context: &mut Context<'_>,
        class: &ClassBody,
        source_ref: &SourceRef,
        codes: &[String],
    ) -> String {
        let module_name = Constant::str(context.module_name());
        let module_handle = context.get_constant_handle(&module_name);
        let mut body = Vec::new();

        for variable in &class.class_variables {
            body.push(format!(
                "PyObjectLocalVariable _python_var_{}( {} );",
                variable.name,
                context.get_constant_handle(&Constant::str(&variable.name))
            ));
        }
        for variable in &class.tmp_variables {
            body.push(format!("PyObjectTempVariable _python_tmp_{};", variable.name));
        }
        body.push(format!(
            "_python_var___module__.assign( INCREASE_REFCOUNT( {} ) );",
            module_handle
        ));
        if let Some(doc) = &class.doc {
            let doc_handle = context.get_constant_handle(&Constant::str(doc));
            body.push(format!(
                "_python_var___doc__.assign( INCREASE_REFCOUNT( {} ) );",
                doc_handle
            ));
        }
        body.extend(codes.iter().cloned());

        let signature = self.get_class_decl(context, &class.code_name, &class.closure_variables);
        format!(
            "// Class \"{}\" defined at {}\n{}\n{{\n{}\n}}",
            class.name,
            source_ref.get_as_string(),
            signature.trim_end_matches(';'),
            indented(&body)
        )
    }

    fn get_return_code(&self, identifier: &Identifier) -> String {
        format!("return {};", identifier.code_export_ref())
    }

    fn get_yield_code(&self, identifier: &Identifier, for_return: bool) -> Identifier {
        if for_return {
            MK_IDENTIFIER!(
                format!("YIELD_RETURN( generator, {} )", identifier.code_export_ref()),
                Owned
            )
        } else {
            MK_IDENTIFIER!(
                format!("YIELD_VALUE( generator, {} )", identifier.code_export_ref()),
                Owned
            )
        }
    }

    fn get_yield_terminator_code(&self) -> String {
        String::from("throw ReturnFromGeneratorException();")
    }

    fn get_load_locals_code(&self, context: &mut Context<'_>, provider: Provider<'_>, mode: LocalsMode) -> Identifier {
        match (provider, mode) {
            (Provider::Module(_), _) => self.get_load_globals_code(context),
            (Provider::Class(_), _) | (_, LocalsMode::Updated) => {
                MK_IDENTIFIER!("_locals_dict.asObject()", Borrowed)
            }
            (Provider::Function(function), LocalsMode::Copy) => {
                let mut arguments = Vec::new();
                let variables = function
                    .parameters
                    .all_variables()
                    .into_iter()
                    .chain(function.user_variables.iter());
                for variable in variables {
                    arguments.push(format!(
                        "{}, &_python_var_{}",
                        context.get_constant_handle(&Constant::str(&variable.name)),
                        variable.name
                    ));
                }

                if arguments.is_empty() {
                    MK_IDENTIFIER!("PyDict_New()", Owned)
                } else {
                    MK_IDENTIFIER!(
                        format!("MAKE_LOCALS_DICT( {}, {} )", arguments.len(), arguments.join(", ")),
                        Owned
                    )
                }
            }
        }
    }

    fn get_load_globals_code(&self, context: &Context<'_>) -> Identifier {
        MK_IDENTIFIER!(
            format!("((PyModuleObject *)_module_{})->md_dict", context.code_name()),
            Borrowed
        )
    }

    fn get_load_dir_code(&self, context: &mut Context<'_>, provider: Provider<'_>) -> Identifier {
        let locals = self.get_load_locals_code(context, provider, LocalsMode::Copy);
        MK_IDENTIFIER!(
            format!("BUILTIN_DIR_LOCALS( {} )", locals.code_temporary_ref()),
            Owned
        )
    }

    fn get_builtin_import_code(
        &self,
        module_name: &Identifier,
        globals: &Identifier,
        locals: &Identifier,
        import_list: &Identifier,
        level: &Identifier,
    ) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "IMPORT_MODULE( {}, {}, {}, {}, {} )",
                module_name.code_temporary_ref(),
                globals.code_temporary_ref(),
                locals.code_temporary_ref(),
                import_list.code_temporary_ref(),
                level.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_import_name_code(&self, import_name: &Identifier, module: &Identifier) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "IMPORT_NAME( {}, {} )",
                module.code_temporary_ref(),
                import_name.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_import_from_star_code(&self, context: &Context<'_>, module: &Identifier) -> String {
        format!(
            "IMPORT_MODULE_STAR( _module_{}, {} );",
            context.code_name(),
            module.code_temporary_ref()
        )
    }

    fn get_builtin_ref_code(&self, context: &mut Context<'_>, builtin_name: &str) -> Identifier {
        let handle = context.get_constant_handle(&Constant::str(builtin_name));
        MK_IDENTIFIER!(format!("LOOKUP_BUILTIN( {} )", handle), Borrowed)
    }

    fn get_builtin_anonymous_ref_code(&self, builtin_name: &str) -> Identifier {
        MK_IDENTIFIER!(format!("(PyObject *)&Py{}_Type", builtin_name), Constant)
    }

    fn get_exception_ref_code(&self, exception_name: &str) -> Identifier {
        MK_IDENTIFIER!(format!("PyExc_{}", exception_name), Constant)
    }

    fn get_make_builtin_exception_code(
        &self,
        context: &mut Context<'_>,
        exception_name: &str,
        args: &[Identifier],
    ) -> Identifier {
        if args.is_empty() {
            return MK_IDENTIFIER!(
                format!("CALL_FUNCTION_NO_ARGS( PyExc_{} )", exception_name),
                Owned
            );
        }

        let arguments = self.get_tuple_creation_code(context, args);
        MK_IDENTIFIER!(
            format!(
                "CALL_FUNCTION_WITH_POSARGS( PyExc_{}, {} )",
                exception_name,
                arguments.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_builtin_call1_code(&self, builtin: Builtin1, value: &Identifier) -> Identifier {
        let (helper, immortal) = builtin1_helper(builtin);
        let code = format!("{}( {} )", helper, value.code_temporary_ref());

        if immortal {
            MK_IDENTIFIER!(code, Constant)
        } else {
            MK_IDENTIFIER!(code, Owned)
        }
    }

    fn get_builtin_range_code(
        &self,
        low: &Identifier,
        high: Option<&Identifier>,
        step: Option<&Identifier>,
    ) -> Identifier {
        let code = match (high, step) {
            (None, None) => format!("BUILTIN_RANGE( {} )", low.code_temporary_ref()),
            (Some(high), None) => format!(
                "BUILTIN_RANGE2( {}, {} )",
                low.code_temporary_ref(),
                high.code_temporary_ref()
            ),
            (high, Some(step)) => format!(
                "BUILTIN_RANGE3( {}, {}, {} )",
                low.code_temporary_ref(),
                optional_code(high, "Py_None"),
                step.code_temporary_ref()
            ),
        };

        MK_IDENTIFIER!(code, Owned)
    }

    fn get_builtin_iter2_code(&self, callable: &Identifier, sentinel: &Identifier) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "BUILTIN_ITER2( {}, {} )",
                callable.code_temporary_ref(),
                sentinel.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_builtin_next2_code(&self, iterator: &Identifier, default: &Identifier) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "BUILTIN_NEXT2( {}, {} )",
                iterator.code_temporary_ref(),
                default.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_builtin_type3_code(
        &self,
        context: &mut Context<'_>,
        type_name: &Identifier,
        bases: &Identifier,
        dict: &Identifier,
    ) -> Identifier {
        let module_name = context.module_name().to_string();
        let module_handle = context.get_constant_handle(&Constant::Str(module_name));

        MK_IDENTIFIER!(
            format!(
                "BUILTIN_TYPE3( {}, {}, {}, {} )",
                module_handle,
                type_name.code_temporary_ref(),
                bases.code_temporary_ref(),
                dict.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_builtin_int_code(
        &self,
        kind: IntKind,
        value: Option<&Identifier>,
        base: Option<&Identifier>,
    ) -> Identifier {
        let prefix = match kind {
            IntKind::Int => "TO_INT",
            IntKind::Long => "TO_LONG",
        };

        let code = match (value, base) {
            (None, None) => match kind {
                IntKind::Int => String::from("PyInt_FromLong( 0 )"),
                IntKind::Long => String::from("PyLong_FromLong( 0 )"),
            },
            (Some(value), None) => format!("{}( {} )", prefix, value.code_temporary_ref()),
            (value, Some(base)) => format!(
                "{}2( {}, {} )",
                prefix,
                optional_code(value, "NULL"),
                base.code_temporary_ref()
            ),
        };

        MK_IDENTIFIER!(code, Owned)
    }

    fn get_builtin_dict_code(&self, positional: Option<&Identifier>, named: Option<&Identifier>) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "BUILTIN_DICT( {}, {} )",
                optional_code(positional, "NULL"),
                optional_code(named, "NULL")
            ),
            Owned
        )
    }

    fn get_builtin_open_code(
        &self,
        filename: Option<&Identifier>,
        mode: Option<&Identifier>,
        buffering: Option<&Identifier>,
    ) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "OPEN_FILE( {}, {}, {} )",
                optional_code(filename, "NULL"),
                optional_code(mode, "NULL"),
                optional_code(buffering, "NULL")
            ),
            Owned
        )
    }

    fn get_future_flags_code(&self, future: &FutureSpec) -> String {
        let mut flags = Vec::new();

        if future.division {
            flags.push("CO_FUTURE_DIVISION");
        }
        if future.unicode_literals {
            flags.push("CO_FUTURE_UNICODE_LITERALS");
        }
        if future.absolute_import {
            flags.push("CO_FUTURE_ABSOLUTE_IMPORT");
        }
        if future.print_function {
            flags.push("CO_FUTURE_PRINT_FUNCTION");
        }

        if flags.is_empty() {
            String::from("0")
        } else {
            flags.join(" | ")
        }
    }

    fn get_eval_code(
        &self,
        _context: &Context<'_>,
        source_code: &Identifier,
        globals: &Identifier,
        locals: &Identifier,
        filename: &Identifier,
        mode: &Identifier,
        future_flags: &str,
    ) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "EVAL_CODE( COMPILE_CODE( {}, {}, {}, {} ), {}, {} )",
                source_code.code_temporary_ref(),
                filename.code_temporary_ref(),
                mode.code_temporary_ref(),
                future_flags,
                globals.code_temporary_ref(),
                locals.code_temporary_ref()
            ),
            Owned
        )
    }

    fn get_exec_code(
        &self,
        context: &Context<'_>,
        source_code: &Identifier,
        globals: &Identifier,
        locals: &Identifier,
        filename: &Identifier,
        mode: &Identifier,
        future_flags: &str,
    ) -> String {
        let result = self.get_eval_code(context, source_code, globals, locals, filename, mode, future_flags);
        format!("{};", result.code_drop_ref())
    }

    fn get_current_exception_code(&self, part: CaughtExceptionPart) -> Identifier {
        match part {
            CaughtExceptionPart::Type => MK_IDENTIFIER!("_exception.getType()", Borrowed),
            CaughtExceptionPart::Value => MK_IDENTIFIER!("_exception.getValue()", Borrowed),
            CaughtExceptionPart::Traceback => MK_IDENTIFIER!("_exception.getTraceback()", Borrowed),
        }
    }

    fn get_list_operation_append_code(&self, list: &Identifier, value: &Identifier) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "LIST_APPEND( {}, {} )",
                list.code_temporary_ref(),
                value.code_temporary_ref()
            ),
            Constant
        )
    }

    fn get_set_operation_add_code(&self, set: &Identifier, value: &Identifier) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "SET_ADD( {}, {} )",
                set.code_temporary_ref(),
                value.code_temporary_ref()
            ),
            Constant
        )
    }

    fn get_dict_operation_set_code(&self, dict: &Identifier, key: &Identifier, value: &Identifier) -> Identifier {
        MK_IDENTIFIER!(
            format!(
                "DICT_SET_ITEM( {}, {}, {} )",
                dict.code_temporary_ref(),
                key.code_temporary_ref(),
                value.code_temporary_ref()
            ),
            Constant
        )
    }

    fn get_unpack_next_code(&self, iterator: &Identifier, count: usize) -> Identifier {
        MK_IDENTIFIER!(
            format!("UNPACK_NEXT( {}, {} )", iterator.code_temporary_ref(), count),
            Owned
        )
    }

    fn get_unpack_check_code(&self, iterator: &Identifier, count: usize) -> String {
        format!(
            "UNPACK_ITERATOR_CHECK( {}, {} );",
            iterator.code_temporary_ref(),
            count
        )
    }

    fn get_traceback_making_identifier(&self, _context: &Context<'_>, line: u32) -> String {
        format!("MAKE_TRACEBACK( frame_guard.getFrame(), {} )", line)
    }

    fn get_raise_exception_expression_code(
        &self,
        side_effects: &[Identifier],
        exception_type: &Identifier,
        exception_value: Option<&Identifier>,
        exception_tb_maker: &str,
    ) -> Identifier {
        let raise = match exception_value {
            Some(value) => format!(
                "THROW_EXCEPTION( {}, {}, {} )",
                exception_type.code_export_ref(),
                value.code_export_ref(),
                exception_tb_maker
            ),
            None => format!(
                "THROW_EXCEPTION( {}, {} )",
                exception_type.code_export_ref(),
                exception_tb_maker
            ),
        };

        if side_effects.is_empty() {
            return MK_IDENTIFIER!(raise, Owned);
        }

        let mut parts: Vec<String> = side_effects.iter().map(Identifier::code_drop_ref).collect();
        parts.push(raise);
        MK_IDENTIFIER!(format!("( {} )", parts.join(", ")), Owned)
    }

    fn get_raise_exception_code(
        &self,
        exception_type: &Identifier,
        exception_value: Option<&Identifier>,
        exception_tb: Option<&Identifier>,
        exception_tb_maker: Option<&str>,
    ) -> String {
        let mut arguments = vec![exception_type.code_export_ref()];
        arguments.extend(exception_value.map(Identifier::code_export_ref));
        arguments.extend(exception_tb.map(Identifier::code_export_ref));
        arguments.extend(exception_tb_maker.map(str::to_string));

        format!("RAISE_EXCEPTION( {} );", arguments.join(", "))
    }

    fn get_re_raise_exception_code(&self, local: bool) -> String {
        if local {
            String::from("throw;")
        } else {
            String::from("RERAISE_EXCEPTION();")
        }
    }

    fn get_try_except_handler_code(
        &self,
        exception_identifiers: &[Identifier],
        handler_code: &[String],
        first_handler: bool,
    ) -> Vec<String> {
        let keyword = if first_handler { "if" } else { "else if" };
        let condition = if exception_identifiers.is_empty() {
            String::from("true")
        } else {
            exception_identifiers
                .iter()
                .map(|identifier| format!("_exception.matches( {} )", identifier.code_temporary_ref()))
                .collect::<Vec<String>>()
                .join(" || ")
        };

        let mut lines = vec![format!("{} ( {} )", keyword, condition)];
        lines.extend(braced(handler_code).lines().map(str::to_string));
        lines
    }

    fn get_try_except_code(
        &self,
        try_number: usize,
        code_tried: &[String],
        handler_codes: &[String],
        else_code: Option<&[String]>,
    ) -> String {
        let mut handlers = handler_codes.to_vec();
        handlers.push(String::from("else"));
        handlers.push(String::from("{"));
        handlers.push(format!("{}throw;", INDENT));
        handlers.push(String::from("}"));

        match else_code {
            Some(else_code) => {
                handlers.insert(0, format!("_caught_{} = true;", try_number));
                format!(
                    "bool _caught_{n} = false;\ntry\n{}\ncatch ( _PythonException &_exception )\n{}\nif ( _caught_{n} == false )\n{}",
                    braced(code_tried),
                    braced(&handlers),
                    braced(else_code),
                    n = try_number
                )
            }
            None => format!(
                "try\n{}\ncatch ( _PythonException &_exception )\n{}",
                braced(code_tried),
                braced(&handlers)
            ),
        }
    }

    fn get_try_finally_code(&self, try_number: usize, code_tried: &[String], code_final: &[String]) -> String {
        format!(
            "_PythonExceptionKeeper _caught_{n};\ntry\n{}\ncatch ( _PythonException &_exception )\n{{\n{}_caught_{n}.save( _exception );\n}}\n{}\n_caught_{n}.rethrow();",
            braced(code_tried),
            INDENT,
            braced(code_final),
            n = try_number
        )
    }

    fn get_try_next_exception_stop_iteration_code(
        &self,
        tmp_number: usize,
        source: &Identifier,
        handler_codes: &[String],
        assignment_code: &str,
    ) -> String {
        format!(
            "PyObject *_tmp_unpack_{n} = ITERATOR_NEXT( {} );\nif ( _tmp_unpack_{n} == NULL )\n{}\n{}",
            source.code_temporary_ref(),
            braced(handler_codes),
            assignment_code,
            n = tmp_number
        )
    }

    fn get_temp_unpack_identifier(&self, tmp_number: usize) -> Identifier {
        MK_IDENTIFIER!(format!("_tmp_unpack_{}", tmp_number), Owned)
    }

    fn get_branch_code(&self, condition: &str, yes: Option<&[String]>, no: Option<&[String]>) -> String {
        let yes = braced(yes.unwrap_or_default());

        match no {
            Some(no) => format!("if ( {} )\n{}\nelse\n{}", condition, yes, braced(no)),
            None => format!("if ( {} )\n{}", condition, yes),
        }
    }

    fn get_loop_code(&self, body: Option<&[String]>, needs_exceptions: bool) -> String {
        let body = body.unwrap_or_default();

        if needs_exceptions {
            let guarded = format!(
                "try\n{}\ncatch ( ContinueException & )\n{{\n}}\ncatch ( BreakException & )\n{{\n{}break;\n}}",
                braced(body),
                INDENT
            );
            format!("while ( true )\n{}", braced(&[guarded]))
        } else {
            format!("while ( true )\n{}", braced(body))
        }
    }

    fn get_loop_break_code(&self, needs_exceptions: bool) -> String {
        if needs_exceptions {
            String::from("throw BreakException();")
        } else {
            String::from("break;")
        }
    }

    fn get_loop_continue_code(&self, needs_exceptions: bool) -> String {
        if needs_exceptions {
            String::from("throw ContinueException();")
        } else {
            String::from("continue;")
        }
    }

    fn get_block_code(&self, codes: &[String]) -> String {
        braced(codes)
    }

    fn get_statement_code(&self, identifier: &Identifier) -> String {
        format!("{};", identifier.code_drop_ref())
    }

    fn get_print_code(&self, target_file: Option<&Identifier>, values: &[Identifier], newline: bool) -> String {
        let Some(target_file) = target_file else {
            let mut lines: Vec<String> = values
                .iter()
                .map(|value| format!("PRINT_ITEM_TO( NULL, {} );", value.code_temporary_ref()))
                .collect();
            if newline {
                lines.push(String::from("PRINT_NEW_LINE_TO( NULL );"));
            }
            return lines.join("\n");
        };

        let mut lines = vec![format!(
            "PyObjectTemporary _print_target( {} );",
            target_file.code_export_ref()
        )];
        lines.extend(values.iter().map(|value| {
            format!(
                "PRINT_ITEM_TO( _print_target.asObject(), {} );",
                value.code_temporary_ref()
            )
        }));
        if newline {
            lines.push(String::from("PRINT_NEW_LINE_TO( _print_target.asObject() );"));
        }

        braced(&lines)
    }

    fn get_line_number_code(&self, source_ref: &SourceRef) -> String {
        format!("frame_guard.setLineNumber( {} );", source_ref.line)
    }

    fn get_statement_trace(&self, source_desc: &str, statement_desc: &str) -> String {
        format!(
            "puts( \"Execute: {} {}\" );",
            source_desc.replace('"', "\\\""),
            statement_desc
        )
    }

    fn get_module_identifier(&self, module_name: &str) -> String {
        NON_IDENTIFIER
            .replace_all(&module_name.replace('.', "__"), "_")
            .into_owned()
    }

    fn get_module_code(
        &self,
        context: &mut Context<'_>,
        module: &Module,
        module_name: &str,
        doc: &Identifier,
        filename: &Identifier,
        path: Option<&Identifier>,
        codes: &[String],
    ) -> String {
        let identifier = self.get_module_identifier(module_name);
        let name_handle = context.get_constant_handle(&Constant::str(module_name));
        let mut lines = vec![
            format!("// Module \"{}\"", module_name),
            format!("static PyObject *_module_{};", identifier),
        ];

        for variable in &module.variables {
            let handle = context.get_constant_handle(&Constant::str(&variable.name));
            lines.push(format!(
                "static PyObjectGlobalVariable _mvar_{}_{}( &_module_{}, &{} );",
                identifier, variable.name, identifier, handle
            ));
        }

        let scope = context.module_scope();
        let declarations: Vec<String> = scope
            .class_codes()
            .values()
            .chain(scope.function_codes().values())
            .map(|declaration| declaration.decl.clone())
            .collect();
        let definitions: Vec<String> = scope
            .class_codes()
            .values()
            .chain(scope.function_codes().values())
            .map(|declaration| declaration.code.clone())
            .collect();

        if !declarations.is_empty() {
            lines.push(String::new());
            lines.extend(declarations);
        }
        for definition in definitions {
            lines.push(String::new());
            lines.push(definition);
        }

        let mut body = vec![
            format!(
                "_module_{} = Py_InitModule4( {}, NULL, NULL, NULL, PYTHON_API_VERSION );",
                identifier,
                c_string(module_name.as_bytes())
            ),
            format!(
                "FrameGuard frame_guard( MAKE_FRAME( {}, _module_{} ) );",
                name_handle, identifier
            ),
            format!(
                "_mvar_{}___doc__.assign( {} );",
                identifier,
                doc.code_export_ref()
            ),
            format!(
                "_mvar_{}___file__.assign( {} );",
                identifier,
                filename.code_export_ref()
            ),
        ];
        if let Some(path) = path {
            body.push(format!(
                "_mvar_{}___path__.assign( {} );",
                identifier,
                path.code_export_ref()
            ));
        }
        for variable in &module.tmp_variables {
            body.push(format!("PyObjectTempVariable _python_tmp_{};", variable.name));
        }
        body.extend(codes.iter().cloned());

        lines.push(String::new());
        lines.push(format!("MOD_INIT_DECL( {} )", identifier));
        lines.push(braced(&body));
        lines.join("\n")
    }

    fn get_module_declaration_code(&self, module_name: &str) -> String {
        format!("MOD_INIT_DECL( {} );", self.get_module_identifier(module_name))
    }

    fn get_main_code(&self, codes: &[String], other_module_names: &[String]) -> String {
        let mut body = vec![
            String::from("Py_Initialize();"),
            String::from("_initConstants();"),
        ];
        body.extend(
            other_module_names
                .iter()
                .map(|name| format!("MOD_INIT_NAME( {} )();", self.get_module_identifier(name))),
        );
        body.push(String::from("MOD_INIT_NAME( __main__ )();"));
        body.push(String::from("return 0;"));

        let mut lines = codes.to_vec();
        lines.push(String::new());
        lines.push(String::from("int main( int argc, char *argv[] )"));
        lines.push(braced(&body));
        lines.join("\n")
    }

    fn get_constants_declaration_code(&self, global: &GlobalContext) -> String {
        global
            .constants()
            .map(|entry| format!("extern PyObject *{};", entry.handle))
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn get_constants_definition_code(&self, global: &GlobalContext) -> String {
        let mut lines: Vec<String> = global
            .constants()
            .map(|entry| format!("PyObject *{};", entry.handle))
            .collect();

        let initialisations: Vec<String> = global
            .constants()
            .map(|entry| format!("{} = {};", entry.handle, self.constant_creation_code(&entry.constant)))
            .collect();

        lines.push(String::new());
        lines.push(String::from("static void _initConstants()"));
        lines.push(braced(&initialisations));
        lines.join("\n")
    }

    fn get_make_tuples_code(&self, global: &GlobalContext) -> String {
        global
            .tuple_arities()
            .iter()
            .map(|arity| {
                make_container_helper("TUPLE", *arity, "PyTuple_New", |index| {
                    format!("PyTuple_SET_ITEM( result, {}, INCREASE_REFCOUNT( element{} ) );", index, index)
                })
            })
            .collect::<Vec<String>>()
            .join("\n\n")
    }

    fn get_make_lists_code(&self, global: &GlobalContext) -> String {
        global
            .list_arities()
            .iter()
            .map(|arity| {
                make_container_helper("LIST", *arity, "PyList_New", |index| {
                    format!("PyList_SET_ITEM( result, {}, INCREASE_REFCOUNT( element{} ) );", index, index)
                })
            })
            .collect::<Vec<String>>()
            .join("\n\n")
    }

    fn get_make_dicts_code(&self, global: &GlobalContext) -> String {
        global
            .dict_arities()
            .iter()
            .map(|arity| {
                let parameters = (0..*arity)
                    .map(|index| format!("PyObject *value{}, PyObject *key{}", index, index))
                    .collect::<Vec<String>>()
                    .join(", ");
                let mut body = vec![format!("PyObject *result = _PyDict_NewPresized( {} );", arity)];
                body.extend(
                    (0..*arity).map(|index| format!("PyDict_SetItem( result, key{}, value{} );", index, index)),
                );
                body.push(String::from("return result;"));

                format!(
                    "static inline PyObject *MAKE_DICT{}({})\n{}",
                    arity,
                    if parameters.is_empty() {
                        String::new()
                    } else {
                        format!(" {} ", parameters)
                    },
                    braced(&body)
                )
            })
            .collect::<Vec<String>>()
            .join("\n\n")
    }
}

fn make_container_helper(
    kind: &str,
    arity: usize,
    constructor: &str,
    set_item: impl Fn(usize) -> String,
) -> String {
    let parameters = (0..arity)
        .map(|index| format!("PyObject *element{}", index))
        .collect::<Vec<String>>()
        .join(", ");
    let mut body = vec![format!("PyObject *result = {}( {} );", constructor, arity)];
    body.extend((0..arity).map(set_item));
    body.push(String::from("return result;"));

    format!(
        "static inline PyObject *MAKE_{}{}({})\n{}",
        kind,
        arity,
        if parameters.is_empty() {
            String::new()
        } else {
            format!(" {} ", parameters)
        },
        braced(&body)
    )
}
