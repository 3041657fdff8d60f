//! Object built-ins: keys, values, has, and `merge` (the `&` operator as
//! a callable value, useful inside folds and pipelines).

use crate::builtins::{native, unpack_tuple};
use crate::error::LazyError;
use crate::value::Value;

fn expect_object<'a>(name: &str, value: &'a Value) -> Result<&'a crate::value::LazyObject, LazyError> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(LazyError::type_mismatch(format!("`{name}` expects an object"), "Object", other.type_name())),
    }
}

pub fn keys() -> Value {
    native("Object.keys", |_ctx, arg| {
        let fields = expect_object("Object.keys", arg)?;
        Ok(Value::array(fields.keys().map(|k| Value::string(k.as_str())).collect()))
    })
}

pub fn values() -> Value {
    native("Object.values", |ctx, arg| {
        let fields = expect_object("Object.values", arg)?;
        let mut out = Vec::with_capacity(fields.len());
        for value in fields.values() {
            out.push(ctx.force(value)?);
        }
        Ok(Value::array(out))
    })
}

pub fn has() -> Value {
    native("Object.has", |_ctx, arg| {
        let args = unpack_tuple("Object.has", arg, 2)?;
        let fields = expect_object("Object.has", &args[0])?;
        let name = crate::builtins::expect_string("Object.has", &args[1])?;
        Ok(Value::Boolean(fields.contains_key(name)))
    })
}

pub fn merge() -> Value {
    native("Object.merge", |_ctx, arg| {
        let args = unpack_tuple("Object.merge", arg, 2)?;
        let left = expect_object("Object.merge", &args[0])?;
        let right = expect_object("Object.merge", &args[1])?;
        let mut result = left.clone();
        for (key, value) in right.iter() {
            result.insert(key.clone(), value.clone());
        }
        Ok(Value::object(result))
    })
}
