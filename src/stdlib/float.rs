//! The `Float` auto-imported module: float-specific predicates and
//! conversions layered on top of `Math`'s shared numeric operations.

use crate::builtins::native;
use crate::error::{LazyError, RunResult};
use crate::value::{LazyObject, Value};

fn expect_float(name: &str, value: &Value) -> RunResult<f64> {
    match value {
        Value::Float(n) => Ok(*n),
        Value::Integer(n) => Ok(*n as f64),
        other => Err(LazyError::type_mismatch(format!("`{name}` expects a number"), "Integer or Float", other.type_name())),
    }
}

pub fn module() -> Value {
    let mut fields = LazyObject::new();
    fields.insert(
        "isNan".into(),
        native("Float.isNan", |_ctx, arg| Ok(Value::Boolean(expect_float("Float.isNan", arg)?.is_nan()))),
    );
    fields.insert(
        "isInfinite".into(),
        native("Float.isInfinite", |_ctx, arg| Ok(Value::Boolean(expect_float("Float.isInfinite", arg)?.is_infinite()))),
    );
    fields.insert(
        "toInt".into(),
        native("Float.toInt", |_ctx, arg| Ok(Value::Integer(expect_float("Float.toInt", arg)?.trunc() as i64))),
    );
    fields.insert(
        "fromInt".into(),
        native("Float.fromInt", |_ctx, arg| match arg {
            Value::Integer(n) => Ok(Value::Float(*n as f64)),
            other => Err(LazyError::type_mismatch("`Float.fromInt` expects an integer", "Integer", other.type_name())),
        }),
    );
    Value::object(fields)
}
