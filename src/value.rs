//! The runtime value union produced by evaluation, plus the thunk type
//! object field values are wrapped in at construction time.

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{Expr, Pattern};
use crate::env::Environment;
use crate::error::RunResult;

/// An object's field map. Insertion order is significant and preserved
/// through merges, comprehensions, and formatting.
pub type LazyObject = IndexMap<String, Value>;

#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    /// An interned `#name` atom; self-identical, compared by content.
    Symbol(Rc<str>),
    String(Rc<str>),
    Array(Rc<Vec<Value>>),
    Tuple(Rc<Vec<Value>>),
    Object(Rc<LazyObject>),
    Function(Rc<FunctionValue>),
    Native(Rc<NativeFunction>),
    /// A deferred object-field computation. Never produced by the parser
    /// or surfaced through a field access — always forced before use —
    /// but part of the value union because it is what an object's field
    /// map actually stores between construction and first access.
    Thunk(Rc<Thunk>),
}

pub struct FunctionValue {
    pub param: Rc<Pattern>,
    pub body: Rc<Expr>,
    pub env: Rc<Environment>,
    pub cwd: Rc<PathBuf>,
}

/// A built-in implemented in Rust. Takes its arguments already evaluated
/// and, when it needs to invoke a Lazylang function value itself (as
/// `Array.fold` does) or force a thunk, goes through the supplied
/// [`NativeContext`] rather than depending on the evaluator module
/// directly.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    #[allow(clippy::type_complexity)]
    pub func: Rc<dyn Fn(&mut NativeContext, &[Value]) -> RunResult<Value>>,
}

/// Capability a native function needs from the evaluator: applying a
/// callback value, forcing a thunk, and deep structural equality. The
/// evaluator implements this trait; built-ins depend only on the trait,
/// not on the evaluator type, keeping `value.rs` free of a dependency on
/// `eval.rs`.
pub trait NativeCallback {
    fn apply(&mut self, callee: &Value, argument: Value) -> RunResult<Value>;
    fn force(&mut self, value: &Value) -> RunResult<Value>;
    fn equals(&mut self, left: &Value, right: &Value) -> RunResult<bool>;
}

pub struct NativeContext<'a> {
    pub callback: &'a mut dyn NativeCallback,
}

impl<'a> NativeContext<'a> {
    pub fn apply(&mut self, callee: &Value, argument: Value) -> RunResult<Value> {
        self.callback.apply(callee, argument)
    }

    pub fn force(&mut self, value: &Value) -> RunResult<Value> {
        self.callback.force(value)
    }

    pub fn equals(&mut self, left: &Value, right: &Value) -> RunResult<bool> {
        self.callback.equals(left, right)
    }
}

/// Lifecycle of a deferred object-field computation: forced at most once.
pub enum ThunkState {
    Unevaluated { expr: Rc<Expr>, env: Rc<Environment>, cwd: Rc<PathBuf> },
    Evaluating,
    Evaluated(Value),
}

pub struct Thunk(pub RefCell<ThunkState>);

impl Thunk {
    pub fn new(expr: Rc<Expr>, env: Rc<Environment>, cwd: Rc<PathBuf>) -> Rc<Thunk> {
        Rc::new(Thunk(RefCell::new(ThunkState::Unevaluated { expr, env, cwd })))
    }

    pub fn ready(value: Value) -> Rc<Thunk> {
        Rc::new(Thunk(RefCell::new(ThunkState::Evaluated(value))))
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Boolean(_) => "Boolean",
            Value::Null => "Null",
            Value::Symbol(_) => "Symbol",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Tuple(_) => "Tuple",
            Value::Object(_) => "Object",
            Value::Function(_) => "Function",
            Value::Native(_) => "Function",
            Value::Thunk(_) => "Thunk",
        }
    }

    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn symbol(name: impl Into<Rc<str>>) -> Value {
        Value::Symbol(name.into())
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(items))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::new(items))
    }

    pub fn object(fields: LazyObject) -> Value {
        Value::Object(Rc::new(fields))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Native(_))
    }
}

/// Debug-only; user-visible formatting lives in `format.rs` since it must
/// force thunks, which requires fallible evaluation context `format.rs`
/// does not need here.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Null => write!(f, "Null"),
            Value::Symbol(s) => write!(f, "Symbol(#{s})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(items) => write!(f, "Array({} items)", items.len()),
            Value::Tuple(items) => write!(f, "Tuple({} items)", items.len()),
            Value::Object(fields) => write!(f, "Object({} fields)", fields.len()),
            Value::Function(_) => write!(f, "Function(<user>)"),
            Value::Native(n) => write!(f, "Native({})", n.name),
            Value::Thunk(_) => write!(f, "Thunk(..)"),
        }
    }
}
