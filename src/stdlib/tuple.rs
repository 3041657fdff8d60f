//! The `Tuple` auto-imported module: fixed-arity positional access.

use crate::builtins::{expect_integer, native, unpack_tuple};
use crate::error::{ErrorKind, LazyError};
use crate::value::Value;

pub fn module() -> Value {
    let mut fields = crate::value::LazyObject::new();
    fields.insert(
        "first".into(),
        native("Tuple.first", |_ctx, arg| match arg {
            Value::Tuple(items) if !items.is_empty() => Ok(items[0].clone()),
            other => Err(LazyError::type_mismatch("`Tuple.first` expects a non-empty tuple", "Tuple", other.type_name())),
        }),
    );
    fields.insert(
        "second".into(),
        native("Tuple.second", |_ctx, arg| match arg {
            Value::Tuple(items) if items.len() >= 2 => Ok(items[1].clone()),
            other => Err(LazyError::type_mismatch("`Tuple.second` expects a tuple of length >= 2", "Tuple", other.type_name())),
        }),
    );
    fields.insert(
        "length".into(),
        native("Tuple.length", |_ctx, arg| match arg {
            Value::Tuple(items) => Ok(Value::Integer(items.len() as i64)),
            other => Err(LazyError::type_mismatch("`Tuple.length` expects a tuple", "Tuple", other.type_name())),
        }),
    );
    fields.insert(
        "at".into(),
        native("Tuple.at", |_ctx, arg| {
            let args = unpack_tuple("Tuple.at", arg, 2)?;
            let index = expect_integer("Tuple.at", &args[1])?;
            match &args[0] {
                Value::Tuple(items) => {
                    if index < 0 || index as usize >= items.len() {
                        return Err(LazyError::new(ErrorKind::OutOfBounds, format!("Tuple.at index {index} out of bounds for tuple of length {}", items.len())));
                    }
                    Ok(items[index as usize].clone())
                }
                other => Err(LazyError::type_mismatch("`Tuple.at` expects a tuple", "Tuple", other.type_name())),
            }
        }),
    );
    Value::object(fields)
}
