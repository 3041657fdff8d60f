//! Native operations on arrays, strings, objects, and numbers, plus the
//! `crash` primitive. Every built-in follows the signature `(slice of
//! Value) -> Value | error`; since application only ever passes a single
//! argument (§4.4, "pass the argument as a single-element slice"),
//! built-ins that logically take more than one argument accept a single
//! packed `Tuple` and destructure it here.

pub mod array;
pub mod control;
pub mod math;
pub mod object;
pub mod string;

use std::rc::Rc;

use crate::error::{ErrorKind, LazyError, RunResult};
use crate::value::{NativeContext, NativeFunction, Value};

/// Wraps a Rust closure as a one-argument native function value.
pub fn native(name: &'static str, func: impl Fn(&mut NativeContext, &Value) -> RunResult<Value> + 'static) -> Value {
    Value::Native(Rc::new(NativeFunction {
        name,
        arity: 1,
        func: Rc::new(move |ctx, args| func(ctx, &args[0])),
    }))
}

/// Unpacks the single argument as a fixed-size tuple, for built-ins that
/// logically take more than one value.
pub fn unpack_tuple<'a>(name: &str, arg: &'a Value, arity: usize) -> RunResult<&'a [Value]> {
    match arg {
        Value::Tuple(items) if items.len() == arity => Ok(items.as_slice()),
        Value::Tuple(items) => Err(LazyError::new(
            ErrorKind::WrongNumberOfArguments,
            format!("`{name}` expects a {arity}-tuple, got one of length {}", items.len()),
        )),
        other => Err(LazyError::type_mismatch(
            format!("`{name}` expects a {arity}-tuple argument"),
            "Tuple",
            other.type_name(),
        )),
    }
}

pub fn expect_integer(name: &str, value: &Value) -> RunResult<i64> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => Err(LazyError::type_mismatch(format!("`{name}` expects an integer"), "Integer", other.type_name())),
    }
}

pub fn expect_float_like(name: &str, value: &Value) -> RunResult<f64> {
    match value {
        Value::Integer(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        other => Err(LazyError::type_mismatch(format!("`{name}` expects a number"), "Integer or Float", other.type_name())),
    }
}

pub fn expect_string<'a>(name: &str, value: &'a Value) -> RunResult<&'a str> {
    match value {
        Value::String(s) => Ok(s.as_ref()),
        other => Err(LazyError::type_mismatch(format!("`{name}` expects a string"), "String", other.type_name())),
    }
}

pub fn expect_array<'a>(name: &str, value: &'a Value) -> RunResult<&'a [Value]> {
    match value {
        Value::Array(items) => Ok(items.as_slice()),
        other => Err(LazyError::type_mismatch(format!("`{name}` expects an array"), "Array", other.type_name())),
    }
}
