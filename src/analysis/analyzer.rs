//! The semantic walker
//!
//! A single depth-first pass over the AST that performs, per node kind:
//! declaration registration and type checking, const and initialization
//! tracking, break/continue/return placement rules, statically-known array
//! bounds checks, and zero-divisor detection via constant propagation.
//!
//! Semantic findings accumulate; the walk never stops early. Scopes are
//! pushed for every function body, loop body, conditional branch, and switch
//! case, and unused-variable warnings are emitted exactly once per scope, at
//! pop time. The constant map is cloned for each branch body so folding done
//! on one control-flow path cannot leak into a sibling path; after the
//! construct, entries any branch changed are dropped rather than merged, so
//! the map only ever claims values that hold on every walked path.

use crate::analysis::consts::{eval_const, fold_compound, is_known_zero, ConstMap};
use crate::analysis::diagnostics::{Category, Diagnostic, DiagnosticSink};
use crate::analysis::symbols::{ArrayInfo, Symbol, SymbolKind, SymbolTable, ValueType};
use crate::parser::ast::*;
use log::debug;

/// Semantic analysis pass over a parsed program
pub struct Analyzer {
    table: SymbolTable,
    sink: DiagnosticSink,
    in_loop: bool,
    in_switch: bool,
    return_type: Option<ValueType>,
    /// Names of the enclosing functions, for recursion detection
    call_stack: Vec<String>,
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer {
            table: SymbolTable::new(),
            sink: DiagnosticSink::new(),
            in_loop: false,
            in_switch: false,
            return_type: None,
            call_stack: Vec::new(),
        }
    }

    /// Walk the whole program and return the ordered diagnostic list
    pub fn run(mut self, program: &Program) -> Vec<Diagnostic> {
        self.register_globals(&program.nodes);

        let mut values = ConstMap::default();
        self.walk_statements(&program.nodes, &mut values);

        // Close the global scope so top-level symbols get their unused pass
        self.report_unused();
        self.sink.into_diagnostics()
    }

    /// Register every function before walking bodies, so calls ahead of the
    /// definition resolve.
    fn register_globals(&mut self, nodes: &[AstNode]) {
        for node in nodes {
            match node {
                AstNode::Program { body, .. } => self.register_globals(body),
                AstNode::Main { .. } => {
                    self.table
                        .declare(Symbol::function("main", ValueType::Int, "int", node.line()));
                }
                AstNode::FunctionDefinition {
                    name, return_type, ..
                } => {
                    let ty = self.table.resolve_type(return_type);
                    if !self
                        .table
                        .declare(Symbol::function(name, ty, return_type, node.line()))
                    {
                        self.sink.error(
                            Category::Scope,
                            Some(node.line()),
                            format!("Function '{}' is already declared", name),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    /// Walk one statement list, threading the constant map sequentially and
    /// warning about statements that follow a `return`.
    fn walk_statements(&mut self, nodes: &[AstNode], values: &mut ConstMap) {
        let mut after_return = false;

        for node in nodes {
            if after_return {
                self.sink.warning(
                    Category::ControlFlow,
                    Some(node.line()),
                    "Unreachable code after 'return'",
                );
                continue;
            }
            self.walk_statement(node, values);
            if matches!(node, AstNode::ReturnStatement { .. }) {
                after_return = true;
            }
        }
    }

    fn walk_statement(&mut self, node: &AstNode, values: &mut ConstMap) {
        match node {
            AstNode::Program { body, .. } => self.walk_statements(body, values),

            AstNode::NamespaceDirective { .. } => {}

            AstNode::Main { body, .. } => {
                self.enter_function("main", Some(ValueType::Int), &[], body, node.line());
            }

            AstNode::FunctionDefinition {
                name,
                return_type,
                params,
                body,
                ..
            } => {
                let ty = self.table.resolve_type(return_type);
                self.enter_function(name, Some(ty), params, body, node.line());
            }

            AstNode::TypedefDeclaration {
                base_type,
                new_name,
                ..
            } => {
                let resolved = self.table.resolve_type(base_type);
                self.table.define_type(new_name, base_type);
                if !self
                    .table
                    .declare(Symbol::typedef(new_name, resolved, base_type, node.line()))
                {
                    self.sink.error(
                        Category::Scope,
                        Some(node.line()),
                        format!("'{}' is already declared in this scope", new_name),
                    );
                }
            }

            AstNode::VariableDeclaration {
                name,
                type_name,
                is_const,
                dims,
                init,
                ..
            } => {
                self.handle_declaration(
                    name,
                    type_name,
                    *is_const,
                    dims,
                    init.as_deref(),
                    node.line(),
                    values,
                );
            }

            AstNode::Assignment {
                target,
                indices,
                op,
                value,
                ..
            } => {
                self.handle_assignment(target, indices, *op, value, node.line(), values);
            }

            AstNode::UpdateExpression { name, op, .. } => {
                self.handle_update(name, *op, node.line(), values);
            }

            AstNode::ExpressionStatement { expr, .. } => {
                self.visit_expr(expr, values);
            }

            AstNode::OutputStatement { items, .. } => {
                for item in items {
                    if let OutputItem::Expr(expr) = item {
                        self.visit_expr(expr, values);
                    }
                }
            }

            AstNode::InputStatement { targets, .. } => {
                for target in targets {
                    if let Some(sym) = self.table.lookup_mut(target) {
                        sym.initialized = true;
                    }
                    // Runtime input: whatever we knew about the value is gone
                    values.remove(target);
                }
            }

            AstNode::WhileLoop {
                condition, body, ..
            } => {
                self.check_condition(condition, values);
                let was_in_loop = std::mem::replace(&mut self.in_loop, true);
                self.walk_branch(body, values);
                self.in_loop = was_in_loop;
            }

            AstNode::ForLoop {
                init,
                condition,
                step,
                body,
                ..
            } => {
                let was_in_loop = std::mem::replace(&mut self.in_loop, true);
                self.table.enter_scope();
                let mut branch = values.clone();
                if let Some(init) = init {
                    self.walk_statement(init, &mut branch);
                }
                if let Some(condition) = condition {
                    self.check_condition(condition, &mut branch);
                }
                if let Some(step) = step {
                    self.visit_expr(step, &mut branch);
                }
                self.walk_statements(body, &mut branch);
                self.report_unused();
                Self::join_branch(values, &branch);
                self.in_loop = was_in_loop;
            }

            AstNode::IfStatement {
                condition,
                body,
                else_ifs,
                alternate,
                ..
            } => {
                self.check_condition(condition, values);
                self.walk_branch(body, values);

                for clause in else_ifs {
                    self.check_condition(&clause.condition, values);
                    self.walk_branch(&clause.body, values);
                }

                if let Some(alternate) = alternate {
                    self.walk_branch(alternate, values);
                }
            }

            AstNode::SwitchStatement {
                discriminant,
                cases,
                default_case,
                ..
            } => {
                self.visit_expr(discriminant, values);
                let was_in_switch = std::mem::replace(&mut self.in_switch, true);

                for case in cases {
                    self.visit_expr(&case.value, values);
                    self.walk_branch(&case.body, values);
                }
                if let Some(default_case) = default_case {
                    self.walk_branch(&default_case.body, values);
                }

                self.in_switch = was_in_switch;
            }

            AstNode::BreakStatement { .. } => {
                if !self.in_loop && !self.in_switch {
                    self.sink.error(
                        Category::ControlFlow,
                        Some(node.line()),
                        "'break' can only be used inside a loop or switch",
                    );
                }
            }

            AstNode::ContinueStatement { .. } => {
                if !self.in_loop {
                    self.sink.error(
                        Category::ControlFlow,
                        Some(node.line()),
                        "'continue' can only be used inside a loop",
                    );
                }
            }

            AstNode::ReturnStatement { argument, .. } => {
                match (self.return_type, argument) {
                    (Some(ValueType::Void), Some(_)) => {
                        self.sink.error(
                            Category::Type,
                            Some(node.line()),
                            "Void function cannot return a value",
                        );
                    }
                    (Some(ty), None) if ty != ValueType::Void => {
                        self.sink.error(
                            Category::Type,
                            Some(node.line()),
                            "Non-void function must return a value",
                        );
                    }
                    _ => {}
                }
                if let Some(argument) = argument {
                    self.visit_expr(argument, values);
                }
            }

            // Expression nodes cannot appear in statement position in a
            // parser-built tree; a best-effort diagnostic beats a crash on a
            // hand-built one.
            AstNode::BinaryExpression { .. }
            | AstNode::UnaryExpression { .. }
            | AstNode::ArrayAccess { .. }
            | AstNode::ArrayAccess2D { .. }
            | AstNode::CallExpression { .. }
            | AstNode::Literal { .. }
            | AstNode::Identifier { .. }
            | AstNode::ArrayInitializer { .. } => {
                self.sink.warning(
                    Category::Internal,
                    Some(node.line()),
                    format!("Unexpected expression in statement position: {}", node),
                );
            }
        }
    }

    /// Walk a function body in its own scope with a fresh constant map
    fn enter_function(
        &mut self,
        name: &str,
        return_type: Option<ValueType>,
        params: &[Param],
        body: &[AstNode],
        line: usize,
    ) {
        self.table.enter_scope();
        let saved_return = std::mem::replace(&mut self.return_type, return_type);
        self.call_stack.push(name.to_string());

        for param in params {
            let ty = self.table.resolve_type(&param.type_name);
            let mut sym = Symbol::variable(&param.name, ty, &param.type_name, line);
            sym.initialized = true;
            if !self.table.declare(sym) {
                self.sink.error(
                    Category::Scope,
                    Some(line),
                    format!("Parameter '{}' is already declared", param.name),
                );
            }
        }

        let mut body_values = ConstMap::default();
        self.walk_statements(body, &mut body_values);

        self.call_stack.pop();
        self.return_type = saved_return;
        self.report_unused();
    }

    /// Walk a branch body in its own scope over a copy of the constant map,
    /// then drop every outer entry the branch changed (conservative join).
    fn walk_branch(&mut self, body: &[AstNode], values: &mut ConstMap) {
        self.table.enter_scope();
        let mut branch = values.clone();
        self.walk_statements(body, &mut branch);
        self.report_unused();
        Self::join_branch(values, &branch);
    }

    /// Keep only the entries the branch left untouched. A value changed on
    /// one possibly-taken path is no longer known after the construct.
    fn join_branch(outer: &mut ConstMap, branch: &ConstMap) {
        outer.retain(|name, value| branch.get(name).copied() == Some(*value));
    }

    /// Emit unused-variable warnings for the scope being popped
    fn report_unused(&mut self) {
        for unused in self.table.exit_scope() {
            self.sink.warning(
                Category::Unused,
                Some(unused.line),
                format!("Variable '{}' is declared but never used", unused.name),
            );
        }
    }

    /// Conditions must type as bool or int
    fn check_condition(&mut self, condition: &AstNode, values: &mut ConstMap) {
        self.visit_expr(condition, values);
        let ty = self.infer_type(condition);
        if !ty.is_condition_type() {
            self.sink.error(
                Category::Type,
                Some(condition.line()),
                format!("Condition must be bool or int, found {}", ty),
            );
        }
    }

    fn handle_declaration(
        &mut self,
        name: &str,
        type_name: &str,
        is_const: bool,
        dims: &[usize],
        init: Option<&AstNode>,
        line: usize,
        values: &mut ConstMap,
    ) {
        let resolved = self.table.resolve_type(type_name);

        let mut folded = None;
        if let Some(init) = init {
            self.visit_expr(init, values);
            self.check_initializer(name, resolved, dims, init, line);
            if dims.is_empty() {
                folded = eval_const(init, values);
            }
        }

        debug!(
            "declare {} '{}' as {} (const value {:?})",
            type_name, name, resolved, folded
        );

        let mut sym = Symbol::variable(name, resolved, type_name, line);
        sym.is_const = is_const;
        sym.initialized = init.is_some();
        sym.value = folded;
        if !dims.is_empty() {
            sym.array = Some(ArrayInfo {
                sizes: dims.to_vec(),
            });
        }

        if !self.table.declare(sym) {
            self.sink.error(
                Category::Scope,
                Some(line),
                format!("Variable '{}' is already declared in this scope", name),
            );
        }

        // A new declaration shadows any tracked value of the same name
        match folded {
            Some(v) => {
                values.insert(name.to_string(), v);
            }
            None => {
                values.remove(name);
            }
        }
    }

    /// Initializer-vs-declared-type rules and array initializer shape checks
    fn check_initializer(
        &mut self,
        name: &str,
        declared: ValueType,
        dims: &[usize],
        init: &AstNode,
        line: usize,
    ) {
        if let AstNode::ArrayInitializer {
            values: items, ..
        } = init
        {
            match dims {
                [] => {
                    self.sink.error(
                        Category::Type,
                        Some(line),
                        format!("Brace initializer used for scalar variable '{}'", name),
                    );
                }
                [size] => {
                    if items.len() > *size {
                        self.sink.error(
                            Category::Type,
                            Some(line),
                            format!(
                                "Too many initializer values for '{}' (size {}, got {})",
                                name,
                                size,
                                items.len()
                            ),
                        );
                    }
                }
                [rows, cols, ..] => {
                    if items.len() > *rows {
                        self.sink.error(
                            Category::Type,
                            Some(line),
                            format!(
                                "Too many initializer rows for '{}' (size {}, got {})",
                                name,
                                rows,
                                items.len()
                            ),
                        );
                    }
                    for item in items {
                        if let AstNode::ArrayInitializer { values: row, .. } = item {
                            if row.len() > *cols {
                                self.sink.error(
                                    Category::Type,
                                    Some(line),
                                    format!(
                                        "Too many initializer values in a row of '{}' (size {}, got {})",
                                        name,
                                        cols,
                                        row.len()
                                    ),
                                );
                            }
                        }
                    }
                }
            }
            return;
        }

        let val_ty = self.infer_type(init);
        if val_ty == ValueType::Unknown || declared == ValueType::Unknown || val_ty == declared {
            return;
        }
        // int literals widen to float; every other mismatch is an error
        if declared == ValueType::Float && val_ty == ValueType::Int {
            return;
        }
        self.sink.error(
            Category::Type,
            Some(line),
            format!(
                "Cannot initialize '{}' ({}) with a {} value",
                name, declared, val_ty
            ),
        );
    }

    fn handle_assignment(
        &mut self,
        target: &str,
        indices: &[AstNode],
        op: AssignOp,
        value: &AstNode,
        line: usize,
        values: &mut ConstMap,
    ) {
        let (ty, is_const, was_initialized, array) = match self.table.lookup(target) {
            Some(sym) => (sym.ty, sym.is_const, sym.initialized, sym.array.clone()),
            None => {
                self.sink.error(
                    Category::Scope,
                    Some(line),
                    format!("Variable '{}' is not declared", target),
                );
                return;
            }
        };

        if is_const && was_initialized {
            self.sink.error(
                Category::Const,
                Some(line),
                format!("Cannot assign to const variable '{}'", target),
            );
        }

        // Compound operators read the target before writing it
        if op.is_compound() && !was_initialized {
            self.sink.warning(
                Category::DataFlow,
                Some(line),
                format!("Variable '{}' is used before initialization", target),
            );
        }

        if let Some(sym) = self.table.lookup_mut(target) {
            sym.initialized = true;
            if op.is_compound() {
                sym.used = true;
            }
        }

        // Statically-known indices are bounds-checked per axis
        if let Some(array) = &array {
            for (axis, index) in indices.iter().enumerate() {
                if let Some(&size) = array.sizes.get(axis) {
                    if let Some(idx) = eval_const(index, values) {
                        if idx < 0 || idx >= size as i64 {
                            self.bounds_error(target, array.dimensions(), axis, idx, size, line);
                        }
                    }
                }
            }
        }
        for index in indices {
            self.visit_expr(index, values);
        }

        self.visit_expr(value, values);

        let val_ty = self.infer_type(value);
        if ty == ValueType::Int && val_ty == ValueType::Float {
            self.sink.warning(
                Category::Precision,
                Some(line),
                format!("Assigning float to int '{}' loses precision", target),
            );
        } else if ty != ValueType::Unknown
            && val_ty != ValueType::Unknown
            && ty != val_ty
            && !(ty == ValueType::Float && val_ty == ValueType::Int)
        {
            self.sink.error(
                Category::Type,
                Some(line),
                format!("Cannot assign {} value to '{}' (expects {})", val_ty, target, ty),
            );
        }

        // Track scalar values; anything non-constant clears the entry
        if indices.is_empty() && array.is_none() {
            let rhs = eval_const(value, values);
            let new_value = match op {
                AssignOp::Assign => rhs,
                _ => match (values.get(target).copied(), rhs) {
                    (Some(old), Some(r)) => fold_compound(op, old, r),
                    _ => None,
                },
            };
            match new_value {
                Some(v) => {
                    values.insert(target.to_string(), v);
                }
                None => {
                    values.remove(target);
                }
            }
        }
    }

    fn handle_update(&mut self, name: &str, op: UpdateOp, line: usize, values: &mut ConstMap) {
        let (is_const, was_initialized) = match self.table.lookup(name) {
            Some(sym) => (sym.is_const, sym.initialized),
            None => {
                self.sink.error(
                    Category::Scope,
                    Some(line),
                    format!("Variable '{}' is not declared", name),
                );
                return;
            }
        };

        if is_const {
            self.sink.error(
                Category::Const,
                Some(line),
                format!("Cannot modify const variable '{}'", name),
            );
        }
        if !was_initialized {
            self.sink.warning(
                Category::DataFlow,
                Some(line),
                format!("Variable '{}' is used before initialization", name),
            );
        }

        if let Some(sym) = self.table.lookup_mut(name) {
            sym.used = true;
            sym.initialized = true;
        }

        let delta = match op {
            UpdateOp::Increment => 1,
            UpdateOp::Decrement => -1,
        };
        match values.get(name).copied().and_then(|v| v.checked_add(delta)) {
            Some(v) => {
                values.insert(name.to_string(), v);
            }
            None => {
                values.remove(name);
            }
        }
    }

    fn bounds_error(
        &mut self,
        name: &str,
        dimensions: usize,
        axis: usize,
        idx: i64,
        size: usize,
        line: usize,
    ) {
        let hi = size.saturating_sub(1);
        let message = if dimensions == 1 {
            format!(
                "Array '{}[{}]' is out of bounds (size: {}, valid indices: 0-{})",
                name, idx, size, hi
            )
        } else if axis == 0 {
            format!(
                "2D array '{}[{}][?]' first index is out of bounds (size: {}, valid indices: 0-{})",
                name, idx, size, hi
            )
        } else {
            format!(
                "2D array '{}[?][{}]' second index is out of bounds (size: {}, valid indices: 0-{})",
                name, idx, size, hi
            )
        };
        self.sink.error(Category::Bounds, Some(line), message);
    }

    /// Recursive expression visit: usage marking, uninitialized-use and
    /// bounds findings, zero-divisor detection, recursion warnings.
    fn visit_expr(&mut self, expr: &AstNode, values: &mut ConstMap) {
        match expr {
            AstNode::Literal { .. } => {}

            AstNode::Identifier { name, .. } => {
                let mut warn_uninit = false;
                if let Some(sym) = self.table.lookup_mut(name) {
                    sym.used = true;
                    if !sym.initialized && sym.kind == SymbolKind::Variable {
                        warn_uninit = true;
                    }
                }
                if warn_uninit {
                    self.sink.warning(
                        Category::DataFlow,
                        Some(expr.line()),
                        format!("Variable '{}' is used before initialization", name),
                    );
                }
            }

            AstNode::ArrayAccess { name, index, .. } => {
                let mut finding = None;
                if let Some(sym) = self.table.lookup_mut(name) {
                    sym.used = true;
                }
                if let Some(sym) = self.table.lookup(name) {
                    if let Some(array) = &sym.array {
                        if array.dimensions() == 1 {
                            if let Some(idx) = eval_const(index, values) {
                                if idx < 0 || idx >= array.sizes[0] as i64 {
                                    finding = Some((idx, array.sizes[0]));
                                }
                            }
                        }
                    }
                }
                if let Some((idx, size)) = finding {
                    self.bounds_error(name, 1, 0, idx, size, expr.line());
                }
                self.visit_expr(index, values);
            }

            AstNode::ArrayAccess2D {
                name,
                index,
                index2,
                ..
            } => {
                let mut findings = Vec::new();
                if let Some(sym) = self.table.lookup_mut(name) {
                    sym.used = true;
                }
                if let Some(sym) = self.table.lookup(name) {
                    if let Some(array) = &sym.array {
                        if array.dimensions() == 2 {
                            // Each axis is checked independently
                            for (axis, idx_expr) in [index, index2].into_iter().enumerate() {
                                if let Some(idx) = eval_const(idx_expr, values) {
                                    let size = array.sizes[axis];
                                    if idx < 0 || idx >= size as i64 {
                                        findings.push((axis, idx, size));
                                    }
                                }
                            }
                        }
                    }
                }
                for (axis, idx, size) in findings {
                    self.bounds_error(name, 2, axis, idx, size, expr.line());
                }
                self.visit_expr(index, values);
                self.visit_expr(index2, values);
            }

            AstNode::BinaryExpression { op, left, right, .. } => {
                self.visit_expr(left, values);
                self.visit_expr(right, values);

                if matches!(op, BinOp::Div | BinOp::Mod) && is_known_zero(right, values) {
                    let op_name = if *op == BinOp::Mod { "Modulo" } else { "Division" };
                    self.sink.error(
                        Category::MathSafety,
                        Some(expr.line()),
                        format!("{} by zero: the divisor is 0 on this path", op_name),
                    );
                }
            }

            AstNode::UnaryExpression { operand, .. } => self.visit_expr(operand, values),

            AstNode::UpdateExpression { name, op, .. } => {
                self.handle_update(name, *op, expr.line(), values);
            }

            AstNode::CallExpression { callee, args, .. } => {
                if self.call_stack.iter().any(|f| f == callee) {
                    self.sink.warning(
                        Category::Recursion,
                        Some(expr.line()),
                        format!("Recursive call: function '{}' calls itself", callee),
                    );
                }
                if let Some(sym) = self.table.lookup_mut(callee) {
                    sym.used = true;
                }
                for arg in args {
                    self.visit_expr(arg, values);
                }
            }

            AstNode::ArrayInitializer { values: items, .. } => {
                for item in items {
                    self.visit_expr(item, values);
                }
            }

            // Statement nodes cannot appear in expression position in a
            // parser-built tree; downgrade instead of panicking.
            other => {
                self.sink.warning(
                    Category::Internal,
                    Some(other.line()),
                    format!("Unexpected statement in expression position: {}", other),
                );
            }
        }
    }

    /// Best-effort static type of an expression
    fn infer_type(&self, expr: &AstNode) -> ValueType {
        match expr {
            AstNode::Literal { value, .. } => ValueType::from_name(value.type_name()),
            AstNode::Identifier { name, .. } => {
                self.table.lookup(name).map_or(ValueType::Unknown, |s| s.ty)
            }
            AstNode::BinaryExpression { op, left, right, .. } => {
                if op.is_boolean() {
                    return ValueType::Bool;
                }
                let lt = self.infer_type(left);
                let rt = self.infer_type(right);
                if lt == ValueType::Float || rt == ValueType::Float {
                    ValueType::Float
                } else if lt == ValueType::Str || rt == ValueType::Str {
                    ValueType::Str
                } else if lt == ValueType::Unknown {
                    rt
                } else {
                    lt
                }
            }
            AstNode::UnaryExpression { op, operand, .. } => match op {
                UnOp::Not => ValueType::Bool,
                UnOp::Neg => self.infer_type(operand),
            },
            AstNode::ArrayAccess { name, .. } | AstNode::ArrayAccess2D { name, .. } => {
                self.table.lookup(name).map_or(ValueType::Unknown, |s| s.ty)
            }
            AstNode::UpdateExpression { name, .. } => {
                self.table.lookup(name).map_or(ValueType::Unknown, |s| s.ty)
            }
            AstNode::CallExpression { callee, .. } => self
                .table
                .lookup(callee)
                .map_or(ValueType::Unknown, |s| s.ty),
            _ => ValueType::Unknown,
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
