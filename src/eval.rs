//! Tree-walking evaluator: environments, thunk forcing, comprehensions,
//! object construction/merging, arithmetic/comparison, application, and
//! `when`/`if` dispatch.

use std::path::PathBuf;
use std::rc::Rc;

use crate::ast::{ArrayElement, BinOp, Clause, ElementCondition, Expr, ExprKind, FieldKey, ObjectField, Pattern, StringSegment, UnOp};
use crate::env::Environment;
use crate::error::{ErrorKind, LazyError, RunResult, Tracer};
use crate::format;
use crate::module::ModuleResolver;
use crate::pattern::{match_pattern, match_required, MatchOutcome};
use crate::value::{FunctionValue, LazyObject, NativeCallback, Thunk, ThunkState, Value};

pub struct Evaluator<'a> {
    pub resolver: &'a mut ModuleResolver,
    pub tracer: &'a mut dyn Tracer,
}

impl<'a> Evaluator<'a> {
    pub fn new(resolver: &'a mut ModuleResolver, tracer: &'a mut dyn Tracer) -> Self {
        Self { resolver, tracer }
    }

    /// Deeply recursive programs overflow the host stack rather than
    /// hitting a soft limit here (§5) — there's no error kind in the
    /// closed taxonomy for "too much recursion" to raise instead, and the
    /// evaluator has no way to unwind a Rust call stack early regardless.
    pub fn eval(&mut self, expr: &Rc<Expr>, env: &Rc<Environment>, cwd: &Rc<PathBuf>) -> RunResult<Value> {
        let result = self.eval_inner(expr, env, cwd);
        result.map_err(|e| if e.context.location.is_some() { e } else { e.with_location(expr.location) })
    }

    fn eval_inner(&mut self, expr: &Rc<Expr>, env: &Rc<Environment>, cwd: &Rc<PathBuf>) -> RunResult<Value> {
        match &expr.kind {
            ExprKind::Integer(n) => Ok(Value::Integer(*n)),
            ExprKind::Float(n) => Ok(Value::Float(*n)),
            ExprKind::Boolean(b) => Ok(Value::Boolean(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::String(s) => Ok(Value::string(s.as_str())),
            ExprKind::Symbol(s) => Ok(Value::symbol(s.as_str())),
            ExprKind::Identifier(name) => env.resolve(name),

            ExprKind::Interpolated(segments) => self.eval_interpolated(segments, env, cwd),

            ExprKind::Array(elements) => self.eval_array(elements, env, cwd),
            ExprKind::Tuple(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval(element, env, cwd)?);
                }
                Ok(Value::tuple(items))
            }

            ExprKind::Object(fields) => {
                let mut result = LazyObject::new();
                for field in fields {
                    self.apply_object_field(&mut result, field, env, cwd)?;
                }
                Ok(Value::object(result))
            }
            ExprKind::ObjectExtend { base, fields } => {
                let base_val = self.eval(base, env, cwd)?;
                let base_obj = self.expect_object(base_val)?;
                let mut result = (*base_obj).clone();
                for field in fields {
                    self.apply_object_field(&mut result, field, env, cwd)?;
                }
                Ok(Value::object(result))
            }

            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand, env, cwd)?;
                self.eval_unary(*op, value)
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right, env, cwd),

            ExprKind::Lambda { param, body } => Ok(Value::Function(Rc::new(FunctionValue {
                param: Rc::clone(param),
                body: Rc::clone(body),
                env: Rc::clone(env),
                cwd: Rc::clone(cwd),
            }))),

            ExprKind::Let { pattern, value, body } => {
                // A plain `name = expr` binding is letrec: `expr` is
                // evaluated against an environment that already has `name`
                // in it (still a placeholder), so a lambda or object field
                // in `expr` can refer back to `name` itself. Destructuring
                // patterns can't meaningfully self-reference, so they keep
                // the simpler eager-evaluate-then-bind path.
                match pattern.as_ref() {
                    Pattern::Identifier(name) => {
                        let extended = env.extend_recursive(name.clone());
                        let bound = self.eval(value, &extended, cwd)?;
                        extended.bind_recursive(bound);
                        self.eval(body, &extended, cwd)
                    }
                    _ => {
                        let bound = self.eval(value, env, cwd)?;
                        let mut force = |v: &Value| self.force_inline(v);
                        let extended = match_required(pattern, &bound, env, &mut force)?;
                        self.eval(body, &extended, cwd)
                    }
                }
            }

            ExprKind::Application { callee, argument } => {
                let callee_val = self.eval(callee, env, cwd)?;
                let arg_val = self.eval(argument, env, cwd)?;
                self.apply(&callee_val, arg_val)
            }

            ExprKind::FieldAccess { object, name } => {
                let object_val = self.eval(object, env, cwd)?;
                self.field_access(object_val, name)
            }
            ExprKind::FieldAccessor { names } => {
                let names = Rc::new(names.clone());
                Ok(native_field_accessor(names))
            }
            ExprKind::FieldProjection { object, names } => {
                let object_val = self.eval(object, env, cwd)?;
                let fields = self.expect_object(object_val)?;
                let mut projected = LazyObject::new();
                for name in names {
                    match fields.get(name) {
                        Some(value) => {
                            projected.insert(name.clone(), value.clone());
                        }
                        None => return Err(self.unknown_field_error(name, &fields)),
                    }
                }
                Ok(Value::object(projected))
            }
            ExprKind::Index { collection, key } => {
                let collection_val = self.eval(collection, env, cwd)?;
                let key_val = self.eval(key, env, cwd)?;
                self.eval_index(collection_val, key_val)
            }

            ExprKind::If { condition, then_branch, else_branch } => {
                let cond = self.eval(condition, env, cwd)?;
                match cond {
                    Value::Boolean(true) => self.eval(then_branch, env, cwd),
                    Value::Boolean(false) => match else_branch {
                        Some(branch) => self.eval(branch, env, cwd),
                        None => Ok(Value::Null),
                    },
                    other => Err(LazyError::type_mismatch("`if` condition must be a boolean", "Boolean", other.type_name())),
                }
            }
            ExprKind::When { scrutinee, arms, otherwise } => {
                let value = self.eval(scrutinee, env, cwd)?;
                for arm in arms {
                    let mut force = |v: &Value| self.force_inline(v);
                    match match_pattern(&arm.pattern, &value, env, &mut force)? {
                        MatchOutcome::Matched(extended) => return self.eval(&arm.body, &extended, cwd),
                        MatchOutcome::Mismatch => continue,
                    }
                }
                match otherwise {
                    Some(body) => self.eval(body, env, cwd),
                    None => Err(LazyError::type_mismatch(
                        "value did not match any `when` arm",
                        "a matching pattern",
                        value.type_name(),
                    )),
                }
            }

            ExprKind::ArrayComprehension { body, clauses } => self.eval_array_comprehension(body, clauses, env, cwd),
            ExprKind::ObjectComprehension { key, value, clauses } => {
                self.eval_object_comprehension(key, value, clauses, env, cwd)
            }

            ExprKind::Import(path) => self.resolver.resolve_and_load(path, cwd, self.tracer),

            ExprKind::Where { body, bindings } => {
                let mut scope = Rc::clone(env);
                for (name, value_expr) in bindings {
                    let extended = scope.extend_recursive(name.clone());
                    let value = self.eval(value_expr, &extended, cwd)?;
                    extended.bind_recursive(value);
                    scope = extended;
                }
                self.eval(body, &scope, cwd)
            }
        }
    }

    // ---- thunks -----------------------------------------------------------

    /// Forces a value to a non-thunk concrete value, one layer at a time
    /// (a forced thunk's result may itself be a thunk only in the
    /// degenerate case of `{ a { b } }`-style field-to-field aliasing,
    /// which this loop also resolves).
    pub fn force(&mut self, value: Value) -> RunResult<Value> {
        let Value::Thunk(thunk) = value else { return Ok(value) };
        let current_state = {
            let mut state = thunk.0.borrow_mut();
            std::mem::replace(&mut *state, ThunkState::Evaluating)
        };
        match current_state {
            ThunkState::Evaluated(value) => {
                *thunk.0.borrow_mut() = ThunkState::Evaluated(value.clone());
                Ok(value)
            }
            ThunkState::Evaluating => Err(LazyError::new(
                ErrorKind::CyclicReference,
                "thunk was forced again while still being evaluated",
            )),
            ThunkState::Unevaluated { expr, env, cwd } => {
                self.tracer.on_thunk_forced(Some(expr.location));
                let result = self.eval(&expr, &env, &cwd);
                match result {
                    Ok(value) => {
                        let resolved = self.force(value)?;
                        *thunk.0.borrow_mut() = ThunkState::Evaluated(resolved.clone());
                        Ok(resolved)
                    }
                    Err(err) => {
                        // Left `Evaluating`: a thunk that failed once must
                        // never silently re-run or succeed on retry.
                        Err(err)
                    }
                }
            }
        }
    }

    fn force_inline(&mut self, value: &Value) -> RunResult<Value> {
        self.force(value.clone())
    }

    // ---- objects ------------------------------------------------------------

    fn apply_object_field(&mut self, result: &mut LazyObject, field: &ObjectField, env: &Rc<Environment>, cwd: &Rc<PathBuf>) -> RunResult<()> {
        let keys = self.resolve_field_keys(&field.key, env, cwd)?;
        if keys.is_empty() {
            return Ok(());
        }
        if !field.merge {
            let thunk_value = Value::Thunk(Thunk::new(Rc::clone(&field.value), Rc::clone(env), Rc::clone(cwd)));
            for key in keys {
                result.insert(key, thunk_value.clone());
            }
            return Ok(());
        }

        let inner_fields = match &field.value.kind {
            ExprKind::Object(inner) => inner,
            _ => return Err(LazyError::new(ErrorKind::TypeMismatch, "patch field must be an object")),
        };
        for key in keys {
            let merged = match result.get(&key).cloned() {
                Some(existing) => match self.force(existing)? {
                    Value::Object(existing_obj) => {
                        let mut merged = (*existing_obj).clone();
                        for inner in inner_fields {
                            self.apply_object_field(&mut merged, inner, env, cwd)?;
                        }
                        Value::object(merged)
                    }
                    _ => self.build_fresh_object(inner_fields, env, cwd)?,
                },
                None => self.build_fresh_object(inner_fields, env, cwd)?,
            };
            result.insert(key, merged);
        }
        Ok(())
    }

    fn build_fresh_object(&mut self, fields: &[ObjectField], env: &Rc<Environment>, cwd: &Rc<PathBuf>) -> RunResult<Value> {
        let mut fresh = LazyObject::new();
        for field in fields {
            self.apply_object_field(&mut fresh, field, env, cwd)?;
        }
        Ok(Value::object(fresh))
    }

    fn resolve_field_keys(&mut self, key: &FieldKey, env: &Rc<Environment>, cwd: &Rc<PathBuf>) -> RunResult<Vec<String>> {
        match key {
            FieldKey::Static(name) => Ok(vec![name.clone()]),
            FieldKey::Dynamic(expr) => {
                let value = self.eval(expr, env, cwd)?;
                let value = self.force(value)?;
                match value {
                    Value::Null => Ok(vec![]),
                    Value::String(s) => Ok(vec![s.to_string()]),
                    Value::Array(items) => {
                        let mut keys = Vec::with_capacity(items.len());
                        for item in items.iter() {
                            match self.force(item.clone())? {
                                Value::Null => continue,
                                Value::String(s) => keys.push(s.to_string()),
                                other => {
                                    return Err(LazyError::type_mismatch(
                                        "dynamic object key must be a string",
                                        "String",
                                        other.type_name(),
                                    ))
                                }
                            }
                        }
                        Ok(keys)
                    }
                    other => Err(LazyError::type_mismatch(
                        "dynamic object key must be a string, an array of strings, or null",
                        "String, Array, or Null",
                        other.type_name(),
                    )),
                }
            }
        }
    }

    fn expect_object(&mut self, value: Value) -> RunResult<Rc<LazyObject>> {
        match self.force(value)? {
            Value::Object(fields) => Ok(fields),
            other => Err(LazyError::type_mismatch("expected an object", "Object", other.type_name())),
        }
    }

    fn unknown_field_error(&self, name: &str, fields: &LazyObject) -> LazyError {
        let available: Vec<String> = fields.keys().cloned().collect();
        LazyError::unknown_field(name, &available)
    }

    // ---- arrays / tuples ------------------------------------------------------

    fn eval_array(&mut self, elements: &[ArrayElement], env: &Rc<Environment>, cwd: &Rc<PathBuf>) -> RunResult<Value> {
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            let include = match &element.condition {
                None => true,
                Some(ElementCondition::If(guard)) => self.eval_boolean(guard, env, cwd)?,
                Some(ElementCondition::Unless(guard)) => !self.eval_boolean(guard, env, cwd)?,
            };
            if include {
                items.push(self.eval(&element.value, env, cwd)?);
            }
        }
        Ok(Value::array(items))
    }

    fn eval_boolean(&mut self, expr: &Rc<Expr>, env: &Rc<Environment>, cwd: &Rc<PathBuf>) -> RunResult<bool> {
        match self.eval(expr, env, cwd)? {
            Value::Boolean(b) => Ok(b),
            other => Err(LazyError::type_mismatch("guard must be a boolean", "Boolean", other.type_name())),
        }
    }

    // ---- comprehensions ---------------------------------------------------

    fn eval_array_comprehension(&mut self, body: &Rc<Expr>, clauses: &[Clause], env: &Rc<Environment>, cwd: &Rc<PathBuf>) -> RunResult<Value> {
        let mut items = Vec::new();
        self.run_clauses(clauses, 0, env, cwd, &mut |this, scope| {
            items.push(this.eval(body, scope, cwd)?);
            Ok(())
        })?;
        Ok(Value::array(items))
    }

    fn eval_object_comprehension(
        &mut self,
        key: &FieldKey,
        value: &Rc<Expr>,
        clauses: &[Clause],
        env: &Rc<Environment>,
        cwd: &Rc<PathBuf>,
    ) -> RunResult<Value> {
        let mut result = LazyObject::new();
        self.run_clauses(clauses, 0, env, cwd, &mut |this, scope| {
            let keys = this.resolve_field_keys(key, scope, cwd)?;
            if keys.is_empty() {
                return Ok(());
            }
            let evaluated = this.eval(value, scope, cwd)?;
            for k in keys {
                result.insert(k, evaluated.clone());
            }
            Ok(())
        })?;
        Ok(Value::object(result))
    }

    /// Runs the nested-loop structure of `for`/`when` clauses, invoking
    /// `emit` once per surviving iteration with the fully extended scope.
    fn run_clauses(
        &mut self,
        clauses: &[Clause],
        index: usize,
        env: &Rc<Environment>,
        cwd: &Rc<PathBuf>,
        emit: &mut dyn FnMut(&mut Self, &Rc<Environment>) -> RunResult<()>,
    ) -> RunResult<()> {
        let Some(clause) = clauses.get(index) else {
            return emit(self, env);
        };
        match clause {
            Clause::For { pattern, source } => {
                let source_val = self.eval(source, env, cwd)?;
                let entries = self.iterate(source_val)?;
                for entry in entries {
                    let mut force = |v: &Value| self.force_inline(v);
                    match match_pattern(pattern, &entry, env, &mut force)? {
                        MatchOutcome::Matched(extended) => {
                            self.run_clauses(clauses, index + 1, &extended, cwd, emit)?;
                        }
                        MatchOutcome::Mismatch => {
                            return Err(LazyError::type_mismatch(
                                "comprehension pattern did not match element",
                                "matching pattern",
                                entry.type_name(),
                            ))
                        }
                    }
                }
                Ok(())
            }
            Clause::Guard(guard) => {
                if self.eval_boolean(guard, env, cwd)? {
                    self.run_clauses(clauses, index + 1, env, cwd, emit)?;
                }
                Ok(())
            }
        }
    }

    /// Forces a collection to a flat list of per-iteration values: array
    /// elements as-is, object entries as `(key, value)` tuples with
    /// values forced.
    fn iterate(&mut self, value: Value) -> RunResult<Vec<Value>> {
        match self.force(value)? {
            Value::Array(items) => Ok((*items).clone()),
            Value::Object(fields) => {
                let mut entries = Vec::with_capacity(fields.len());
                for (key, value) in fields.iter() {
                    let forced = self.force(value.clone())?;
                    entries.push(Value::tuple(vec![Value::string(key.as_str()), forced]));
                }
                Ok(entries)
            }
            other => Err(LazyError::type_mismatch("`for` source must be an array or object", "Array or Object", other.type_name())),
        }
    }

    // ---- operators ----------------------------------------------------------

    fn eval_unary(&mut self, op: UnOp, value: Value) -> RunResult<Value> {
        let value = self.force(value)?;
        match (op, &value) {
            (UnOp::Neg, Value::Integer(n)) => Ok(Value::Integer(-n)),
            (UnOp::Neg, Value::Float(n)) => Ok(Value::Float(-n)),
            (UnOp::Neg, other) => Err(LazyError::type_mismatch("unary `-` requires a number", "Integer or Float", other.type_name())),
            (UnOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
            (UnOp::Not, other) => Err(LazyError::type_mismatch("unary `!` requires a boolean", "Boolean", other.type_name())),
        }
    }

    fn eval_binary(&mut self, op: BinOp, left: &Rc<Expr>, right: &Rc<Expr>, env: &Rc<Environment>, cwd: &Rc<PathBuf>) -> RunResult<Value> {
        match op {
            BinOp::And => {
                if self.eval_boolean(left, env, cwd)? {
                    self.eval_boolean(right, env, cwd).map(Value::Boolean)
                } else {
                    Ok(Value::Boolean(false))
                }
            }
            BinOp::Or => {
                if self.eval_boolean(left, env, cwd)? {
                    Ok(Value::Boolean(true))
                } else {
                    self.eval_boolean(right, env, cwd).map(Value::Boolean)
                }
            }
            BinOp::Eq | BinOp::NotEq => {
                let l = self.eval(left, env, cwd)?;
                let r = self.eval(right, env, cwd)?;
                let equal = self.equals(&l, &r)?;
                Ok(Value::Boolean(if op == BinOp::Eq { equal } else { !equal }))
            }
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
                let l = self.eval(left, env, cwd)?;
                let r = self.eval(right, env, cwd)?;
                let l = self.force(l)?;
                let r = self.force(r)?;
                compare(op, &l, &r)
            }
            BinOp::Concat => {
                let l = self.eval(left, env, cwd)?;
                let r = self.eval(right, env, cwd)?;
                let l = self.force(l)?;
                let r = self.force(r)?;
                match (&l, &r) {
                    (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{a}{b}"))),
                    _ => Err(LazyError::type_mismatch("`++` requires two strings", "String", if matches!(l, Value::String(_)) { r.type_name() } else { l.type_name() })),
                }
            }
            BinOp::Merge => {
                let l = self.eval(left, env, cwd)?;
                let r = self.eval(right, env, cwd)?;
                let left_obj = self.expect_object(l)?;
                let right_obj = self.expect_object(r)?;
                let mut result = (*left_obj).clone();
                for (key, value) in right_obj.iter() {
                    result.insert(key.clone(), value.clone());
                }
                Ok(Value::object(result))
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
                let l = self.eval(left, env, cwd)?;
                let r = self.eval(right, env, cwd)?;
                let l = self.force(l)?;
                let r = self.force(r)?;
                arithmetic(op, l, r)
            }
        }
    }

    pub fn equals(&mut self, left: &Value, right: &Value) -> RunResult<bool> {
        let left = self.force(left.clone())?;
        let right = self.force(right.clone())?;
        Ok(match (&left, &right) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
                if a.len() != b.len() {
                    false
                } else {
                    let mut all_equal = true;
                    for (ai, bi) in a.iter().zip(b.iter()) {
                        if !self.equals(ai, bi)? {
                            all_equal = false;
                            break;
                        }
                    }
                    all_equal
                }
            }
            (Value::Object(a), Value::Object(b)) => {
                if a.len() != b.len() {
                    false
                } else {
                    let mut all_equal = true;
                    for (key, value) in a.iter() {
                        match b.get(key) {
                            Some(other_value) => {
                                if !self.equals(value, other_value)? {
                                    all_equal = false;
                                    break;
                                }
                            }
                            None => {
                                all_equal = false;
                                break;
                            }
                        }
                    }
                    all_equal
                }
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        })
    }

    // ---- application / field access -----------------------------------------

    pub fn apply(&mut self, callee: &Value, argument: Value) -> RunResult<Value> {
        match self.force(callee.clone())? {
            Value::Function(func) => {
                let mut force = |v: &Value| self.force_inline(v);
                let extended = match_required(&func.param, &argument, &func.env, &mut force)?;
                self.eval(&func.body, &extended, &func.cwd)
            }
            Value::Native(native) => {
                let mut ctx = crate::value::NativeContext { callback: self };
                (native.func)(&mut ctx, &[argument])
            }
            other => Err(LazyError::new(ErrorKind::ExpectedFunction, format!("cannot apply a value of type {}", other.type_name()))),
        }
    }

    pub fn field_access(&mut self, object: Value, name: &str) -> RunResult<Value> {
        let fields = self.expect_object(object)?;
        match fields.get(name).cloned() {
            Some(value) => self.force(value),
            None => Err(self.unknown_field_error(name, &fields)),
        }
    }

    fn eval_index(&mut self, collection: Value, key: Value) -> RunResult<Value> {
        let collection = self.force(collection)?;
        let key = self.force(key)?;
        match (&collection, &key) {
            (Value::Array(items), Value::Integer(i)) => {
                if *i < 0 || *i as usize >= items.len() {
                    Err(LazyError::new(ErrorKind::OutOfBounds, format!("index {i} out of bounds for array of length {}", items.len())))
                } else {
                    self.force(items[*i as usize].clone())
                }
            }
            (Value::Object(_), Value::String(name)) => self.field_access(collection, name),
            (Value::Array(_), other) => Err(LazyError::type_mismatch("array index must be an integer", "Integer", other.type_name())),
            (Value::Object(_), other) => Err(LazyError::type_mismatch("object index must be a string", "String", other.type_name())),
            (other, _) => Err(LazyError::type_mismatch("indexing requires an array or object", "Array or Object", other.type_name())),
        }
    }

    fn eval_interpolated(&mut self, segments: &[StringSegment], env: &Rc<Environment>, cwd: &Rc<PathBuf>) -> RunResult<Value> {
        let mut out = String::new();
        for segment in segments {
            match segment {
                StringSegment::Literal(text) => out.push_str(text),
                StringSegment::Expr(expr) => {
                    let value = self.eval(expr, env, cwd)?;
                    let mut force = |v: &Value| self.force_inline(v);
                    out.push_str(&format::format_value(&value, &mut force)?);
                }
            }
        }
        Ok(Value::string(out))
    }
}

impl<'a> NativeCallback for Evaluator<'a> {
    fn apply(&mut self, callee: &Value, argument: Value) -> RunResult<Value> {
        Evaluator::apply(self, callee, argument)
    }

    fn force(&mut self, value: &Value) -> RunResult<Value> {
        Evaluator::force(self, value.clone())
    }

    fn equals(&mut self, left: &Value, right: &Value) -> RunResult<bool> {
        Evaluator::equals(self, left, right)
    }
}

fn native_field_accessor(names: Rc<Vec<String>>) -> Value {
    Value::Native(Rc::new(crate::value::NativeFunction {
        name: "field_accessor",
        arity: 1,
        func: Rc::new(move |ctx, args| {
            let mut current = args[0].clone();
            for name in names.iter() {
                current = ctx.force(&current)?;
                let fields = match current {
                    Value::Object(fields) => fields,
                    other => return Err(LazyError::type_mismatch("field accessor requires an object", "Object", other.type_name())),
                };
                current = match fields.get(name).cloned() {
                    Some(value) => ctx.force(&value)?,
                    None => {
                        let available: Vec<String> = fields.keys().cloned().collect();
                        return Err(LazyError::unknown_field(name, &available));
                    }
                };
            }
            Ok(current)
        }),
    }))
}

enum Num {
    Int(i64),
    Flt(f64),
}

impl Num {
    fn as_f64(&self) -> f64 {
        match self {
            Num::Int(n) => *n as f64,
            Num::Flt(n) => *n,
        }
    }
}

fn to_num(value: &Value) -> Option<Num> {
    match value {
        Value::Integer(n) => Some(Num::Int(*n)),
        Value::Float(n) => Some(Num::Flt(*n)),
        _ => None,
    }
}

fn division_by_zero() -> LazyError {
    LazyError::new(ErrorKind::TypeMismatch, "division by zero")
}

fn arithmetic(op: BinOp, left: Value, right: Value) -> RunResult<Value> {
    let (Some(l), Some(r)) = (to_num(&left), to_num(&right)) else {
        let offender = if to_num(&left).is_none() { &left } else { &right };
        return Err(LazyError::type_mismatch("arithmetic requires two numbers", "Integer or Float", offender.type_name()));
    };
    match (l, r) {
        (Num::Int(a), Num::Int(b)) => match op {
            BinOp::Add => Ok(Value::Integer(a.wrapping_add(b))),
            BinOp::Sub => Ok(Value::Integer(a.wrapping_sub(b))),
            BinOp::Mul => Ok(Value::Integer(a.wrapping_mul(b))),
            BinOp::Div => {
                if b == 0 {
                    Err(division_by_zero())
                } else {
                    // `wrapping_div` rather than plain `/`: `i64::MIN / -1`
                    // overflows and panics in debug builds, and nothing
                    // about a config value being `i64::MIN` is invalid
                    // input, so it must wrap like the other integer ops
                    // above rather than abort the process.
                    Ok(Value::Integer(a.wrapping_div(b)))
                }
            }
            BinOp::Rem => {
                if b == 0 {
                    Err(division_by_zero())
                } else {
                    Ok(Value::Integer(a.wrapping_rem(b)))
                }
            }
            _ => unreachable!("non-arithmetic op routed to arithmetic()"),
        },
        (a, b) => {
            let (af, bf) = (a.as_f64(), b.as_f64());
            match op {
                BinOp::Add => Ok(Value::Float(af + bf)),
                BinOp::Sub => Ok(Value::Float(af - bf)),
                BinOp::Mul => Ok(Value::Float(af * bf)),
                BinOp::Div => {
                    if bf == 0.0 {
                        Err(division_by_zero())
                    } else {
                        Ok(Value::Float(af / bf))
                    }
                }
                BinOp::Rem => {
                    if bf == 0.0 {
                        Err(division_by_zero())
                    } else {
                        Ok(Value::Float(af % bf))
                    }
                }
                _ => unreachable!("non-arithmetic op routed to arithmetic()"),
            }
        }
    }
}

fn compare(op: BinOp, left: &Value, right: &Value) -> RunResult<Value> {
    let (Some(l), Some(r)) = (to_num(left), to_num(right)) else {
        let offender = if to_num(left).is_none() { left } else { right };
        return Err(LazyError::type_mismatch("comparison requires two numbers", "Integer or Float", offender.type_name()));
    };
    let ordering = l.as_f64().partial_cmp(&r.as_f64());
    let Some(ordering) = ordering else {
        return Err(LazyError::new(ErrorKind::TypeMismatch, "comparison between NaN values is undefined"));
    };
    let result = match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::LtEq => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::GtEq => ordering.is_ge(),
        _ => unreachable!("non-comparison op routed to compare()"),
    };
    Ok(Value::Boolean(result))
}
