//! The emission layer.
//!
//! The code generator decides *what* to emit; an `Emitter` decides how it is
//! spelled in the target language. Every method composes identifiers or
//! statement code out of already generated parts and never looks at the tree.

use crate::{
    ast::{
        ast::Provider,
        constants::Constant,
        expressions::{Builtin1, CaughtExceptionPart, ClassBody, Comparator, FunctionBody, IntKind, Operator},
        statements::Module,
        variables::Variable,
    },
    FutureSpec, SourceRef,
};

use super::{
    context::{Context, GlobalContext},
    identifier::Identifier,
};

/// How `locals()` is materialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalsMode {
    /// A fresh dict snapshot of the local variables.
    Copy,
    /// The live locals dict of the scope.
    Updated,
}

pub trait Emitter {
    // Constants and variables

    fn get_constant_handle(&self, context: &mut Context<'_>, constant: &Constant) -> Identifier;
    fn get_constant_access(&self, context: &mut Context<'_>, constant: &Constant) -> Identifier;
    fn get_variable_access(&self, context: &Context<'_>, variable: &Variable) -> Identifier;
    fn get_variable_assignment_code(
        &self,
        context: &Context<'_>,
        variable: &Variable,
        identifier: &Identifier,
    ) -> String;
    fn get_assignment_expression_code(
        &self,
        context: &Context<'_>,
        variable: &Variable,
        identifier: &Identifier,
    ) -> Identifier;
    fn get_variable_del_code(&self, context: &Context<'_>, variable: &Variable) -> String;
    fn get_default_value_access(&self, variable: &Variable) -> Identifier;

    // Aggregates

    fn get_tuple_creation_code(&self, context: &mut Context<'_>, elements: &[Identifier]) -> Identifier;
    fn get_list_creation_code(&self, context: &mut Context<'_>, elements: &[Identifier]) -> Identifier;
    fn get_set_creation_code(&self, elements: &[Identifier]) -> Identifier;
    fn get_dictionary_creation_code(
        &self,
        context: &mut Context<'_>,
        keys: &[Identifier],
        values: &[Identifier],
    ) -> Identifier;

    // Operations

    fn get_operation_code(&self, operator: Operator, operands: &[Identifier]) -> Identifier;
    fn get_comparison_expression_code(
        &self,
        comparator: Comparator,
        left: &Identifier,
        right: &Identifier,
    ) -> Identifier;
    fn get_comparison_expression_bool_code(
        &self,
        comparator: Comparator,
        left: &Identifier,
        right: &Identifier,
    ) -> String;
    fn get_selection_or_code(&self, operands: &[Identifier]) -> Identifier;
    fn get_selection_and_code(&self, operands: &[Identifier]) -> Identifier;
    fn get_conditional_expression_code(
        &self,
        condition: &str,
        yes: &Identifier,
        no: &Identifier,
    ) -> Identifier;

    // Conditions

    fn get_true_expression_code(&self) -> String;
    fn get_false_expression_code(&self) -> String;
    fn get_condition_not_bool_code(&self, condition: &str) -> String;
    fn get_condition_or_code(&self, parts: &[String]) -> String;
    fn get_condition_and_code(&self, parts: &[String]) -> String;
    fn get_condition_check_true_code(&self, identifier: &Identifier) -> String;
    fn get_condition_check_false_code(&self, identifier: &Identifier) -> String;

    // Attributes and subscripts

    fn get_attribute_lookup_code(&self, attribute: &Identifier, source: &Identifier) -> Identifier;
    fn get_special_attribute_lookup_code(&self, attribute: &Identifier, source: &Identifier) -> Identifier;
    fn get_attribute_assignment_code(
        &self,
        target: &Identifier,
        attribute: &Identifier,
        value: &Identifier,
    ) -> String;
    fn get_attribute_del_code(&self, target: &Identifier, attribute: &Identifier) -> String;
    fn get_subscript_lookup_code(&self, source: &Identifier, subscript: &Identifier) -> Identifier;
    fn get_subscript_assignment_code(
        &self,
        subscribed: &Identifier,
        subscript: &Identifier,
        value: &Identifier,
    ) -> String;
    fn get_subscript_del_code(&self, subscribed: &Identifier, subscript: &Identifier) -> String;

    // Slices

    fn get_min_index_code(&self) -> String;
    fn get_max_index_code(&self) -> String;
    fn get_index_value_code(&self, value: i64) -> String;
    fn get_index_code(&self, identifier: &Identifier) -> String;
    fn get_slice_lookup_indexes_code(&self, source: &Identifier, lower: &str, upper: &str) -> Identifier;
    fn get_slice_lookup_code(
        &self,
        source: &Identifier,
        lower: Option<&Identifier>,
        upper: Option<&Identifier>,
    ) -> Identifier;
    fn get_slice_assignment_indexes_code(
        &self,
        target: &Identifier,
        lower: &str,
        upper: &str,
        value: &Identifier,
    ) -> String;
    fn get_slice_assignment_code(
        &self,
        target: &Identifier,
        lower: Option<&Identifier>,
        upper: Option<&Identifier>,
        value: &Identifier,
    ) -> String;
    fn get_slice_del_code(&self, target: &Identifier, lower: &str, upper: &str) -> String;
    fn get_slice_object_code(
        &self,
        lower: Option<&Identifier>,
        upper: Option<&Identifier>,
        step: Option<&Identifier>,
    ) -> Identifier;

    // Calls

    fn get_function_call_code(
        &self,
        function: &Identifier,
        argument_tuple: Option<&Identifier>,
        argument_dictionary: Option<&Identifier>,
        star_list: Option<&Identifier>,
        star_dict: Option<&Identifier>,
    ) -> Identifier;

    // Functions and classes

    fn get_function_creation_code(
        &self,
        context: &Context<'_>,
        code_name: &str,
        defaults: &[Identifier],
        closure_variables: &[Variable],
    ) -> Identifier;
    fn get_function_decl(
        &self,
        context: &Context<'_>,
        code_name: &str,
        default_count: usize,
        closure_variables: &[Variable],
    ) -> String;
    fn get_function_code(
        &self,
        context: &mut Context<'_>,
        function: &FunctionBody,
        source_ref: &SourceRef,
        default_access: &[Identifier],
        codes: &[String],
    ) -> String;
    fn get_generator_function_code(
        &self,
        context: &mut Context<'_>,
        function: &FunctionBody,
        source_ref: &SourceRef,
        default_access: &[Identifier],
        codes: &[String],
    ) -> String;
    fn get_class_dict_creation_code(
        &self,
        context: &Context<'_>,
        code_name: &str,
        closure_variables: &[Variable],
    ) -> Identifier;
    fn get_class_creation_code(
        &self,
        context: &mut Context<'_>,
        class_name: &str,
        bases: &Identifier,
        dict: &Identifier,
    ) -> Identifier;
    fn get_class_decl(&self, context: &Context<'_>, code_name: &str, closure_variables: &[Variable]) -> String;
    fn get_class_code(
        &self,
        context: &mut Context<'_>,
        class: &ClassBody,
        source_ref: &SourceRef,
        codes: &[String],
    ) -> String;
    fn get_return_code(&self, identifier: &Identifier) -> String;
    fn get_yield_code(&self, identifier: &Identifier, for_return: bool) -> Identifier;
    fn get_yield_terminator_code(&self) -> String;

    // Namespaces

    fn get_load_locals_code(&self, context: &mut Context<'_>, provider: Provider<'_>, mode: LocalsMode) -> Identifier;
    fn get_load_globals_code(&self, context: &Context<'_>) -> Identifier;
    fn get_load_dir_code(&self, context: &mut Context<'_>, provider: Provider<'_>) -> Identifier;

    // Imports

    fn get_builtin_import_code(
        &self,
        module_name: &Identifier,
        globals: &Identifier,
        locals: &Identifier,
        import_list: &Identifier,
        level: &Identifier,
    ) -> Identifier;
    fn get_import_name_code(&self, import_name: &Identifier, module: &Identifier) -> Identifier;
    fn get_import_from_star_code(&self, context: &Context<'_>, module: &Identifier) -> String;

    // Builtins

    fn get_builtin_ref_code(&self, context: &mut Context<'_>, builtin_name: &str) -> Identifier;
    fn get_builtin_anonymous_ref_code(&self, builtin_name: &str) -> Identifier;
    fn get_exception_ref_code(&self, exception_name: &str) -> Identifier;
    fn get_make_builtin_exception_code(
        &self,
        context: &mut Context<'_>,
        exception_name: &str,
        args: &[Identifier],
    ) -> Identifier;
    fn get_builtin_call1_code(&self, builtin: Builtin1, value: &Identifier) -> Identifier;
    fn get_builtin_range_code(
        &self,
        low: &Identifier,
        high: Option<&Identifier>,
        step: Option<&Identifier>,
    ) -> Identifier;
    fn get_builtin_iter2_code(&self, callable: &Identifier, sentinel: &Identifier) -> Identifier;
    fn get_builtin_next2_code(&self, iterator: &Identifier, default: &Identifier) -> Identifier;
    fn get_builtin_type3_code(
        &self,
        context: &mut Context<'_>,
        type_name: &Identifier,
        bases: &Identifier,
        dict: &Identifier,
    ) -> Identifier;
    fn get_builtin_int_code(
        &self,
        kind: IntKind,
        value: Option<&Identifier>,
        base: Option<&Identifier>,
    ) -> Identifier;
    fn get_builtin_dict_code(&self, positional: Option<&Identifier>, named: Option<&Identifier>) -> Identifier;
    fn get_builtin_open_code(
        &self,
        filename: Option<&Identifier>,
        mode: Option<&Identifier>,
        buffering: Option<&Identifier>,
    ) -> Identifier;
    fn get_future_flags_code(&self, future: &FutureSpec) -> String;
    #[allow(clippy::too_many_arguments)]
    fn get_eval_code(
        &self,
        context: &Context<'_>,
        source_code: &Identifier,
        globals: &Identifier,
        locals: &Identifier,
        filename: &Identifier,
        mode: &Identifier,
        future_flags: &str,
    ) -> Identifier;
    #[allow(clippy::too_many_arguments)]
    fn get_exec_code(
        &self,
        context: &Context<'_>,
        source_code: &Identifier,
        globals: &Identifier,
        locals: &Identifier,
        filename: &Identifier,
        mode: &Identifier,
        future_flags: &str,
    ) -> String;
    fn get_current_exception_code(&self, part: CaughtExceptionPart) -> Identifier;
    fn get_list_operation_append_code(&self, list: &Identifier, value: &Identifier) -> Identifier;
    fn get_set_operation_add_code(&self, set: &Identifier, value: &Identifier) -> Identifier;
    fn get_dict_operation_set_code(&self, dict: &Identifier, key: &Identifier, value: &Identifier) -> Identifier;
    fn get_unpack_next_code(&self, iterator: &Identifier, count: usize) -> Identifier;
    fn get_unpack_check_code(&self, iterator: &Identifier, count: usize) -> String;

    // Exceptions

    fn get_traceback_making_identifier(&self, context: &Context<'_>, line: u32) -> String;
    fn get_raise_exception_expression_code(
        &self,
        side_effects: &[Identifier],
        exception_type: &Identifier,
        exception_value: Option<&Identifier>,
        exception_tb_maker: &str,
    ) -> Identifier;
    fn get_raise_exception_code(
        &self,
        exception_type: &Identifier,
        exception_value: Option<&Identifier>,
        exception_tb: Option<&Identifier>,
        exception_tb_maker: Option<&str>,
    ) -> String;
    fn get_re_raise_exception_code(&self, local: bool) -> String;
    fn get_try_except_handler_code(
        &self,
        exception_identifiers: &[Identifier],
        handler_code: &[String],
        first_handler: bool,
    ) -> Vec<String>;
    fn get_try_except_code(
        &self,
        try_number: usize,
        code_tried: &[String],
        handler_codes: &[String],
        else_code: Option<&[String]>,
    ) -> String;
    fn get_try_finally_code(&self, try_number: usize, code_tried: &[String], code_final: &[String]) -> String;
    fn get_try_next_exception_stop_iteration_code(
        &self,
        tmp_number: usize,
        source: &Identifier,
        handler_codes: &[String],
        assignment_code: &str,
    ) -> String;
    fn get_temp_unpack_identifier(&self, tmp_number: usize) -> Identifier;

    // Control flow

    fn get_branch_code(&self, condition: &str, yes: Option<&[String]>, no: Option<&[String]>) -> String;
    fn get_loop_code(&self, body: Option<&[String]>, needs_exceptions: bool) -> String;
    fn get_loop_break_code(&self, needs_exceptions: bool) -> String;
    fn get_loop_continue_code(&self, needs_exceptions: bool) -> String;
    fn get_block_code(&self, codes: &[String]) -> String;
    fn get_statement_code(&self, identifier: &Identifier) -> String;
    fn get_print_code(&self, target_file: Option<&Identifier>, values: &[Identifier], newline: bool) -> String;
    fn get_line_number_code(&self, source_ref: &SourceRef) -> String;
    fn get_statement_trace(&self, source_desc: &str, statement_desc: &str) -> String;

    // Module and program assembly

    fn get_module_identifier(&self, module_name: &str) -> String;
    #[allow(clippy::too_many_arguments)]
    fn get_module_code(
        &self,
        context: &mut Context<'_>,
        module: &Module,
        module_name: &str,
        doc: &Identifier,
        filename: &Identifier,
        path: Option<&Identifier>,
        codes: &[String],
    ) -> String;
    fn get_module_declaration_code(&self, module_name: &str) -> String;
    fn get_main_code(&self, codes: &[String], other_module_names: &[String]) -> String;
    fn get_constants_declaration_code(&self, global: &GlobalContext) -> String;
    fn get_constants_definition_code(&self, global: &GlobalContext) -> String;
    fn get_make_tuples_code(&self, global: &GlobalContext) -> String;
    fn get_make_lists_code(&self, global: &GlobalContext) -> String;
    fn get_make_dicts_code(&self, global: &GlobalContext) -> String;
}
