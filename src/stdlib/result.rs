//! The `Result` auto-imported module: helpers over the `(#ok, value)` /
//! `(#error, message)` tagged-tuple convention used throughout the
//! built-ins (see `Array.get`, division, `Float` conversions).

use crate::builtins::native;
use crate::error::{ErrorKind, LazyError};
use crate::value::Value;

fn tag(value: &Value) -> Option<&str> {
    match value {
        Value::Tuple(items) if items.len() == 2 => match &items[0] {
            Value::Symbol(s) => Some(s.as_ref()),
            _ => None,
        },
        _ => None,
    }
}

fn payload(value: &Value) -> Option<Value> {
    match value {
        Value::Tuple(items) if items.len() == 2 => Some(items[1].clone()),
        _ => None,
    }
}

pub fn module() -> Value {
    let mut fields = crate::value::LazyObject::new();
    fields.insert(
        "isOk".into(),
        native("Result.isOk", |_ctx, arg| Ok(Value::Boolean(tag(arg) == Some("ok")))),
    );
    fields.insert(
        "isError".into(),
        native("Result.isError", |_ctx, arg| Ok(Value::Boolean(tag(arg) == Some("error")))),
    );
    fields.insert(
        "unwrap".into(),
        native("Result.unwrap", |_ctx, arg| match tag(arg) {
            Some("ok") => Ok(payload(arg).expect("tuple already matched `ok`")),
            Some("error") => {
                let message = payload(arg).unwrap_or(Value::Null);
                Err(LazyError::new(ErrorKind::UserCrash, format!("Result.unwrap called on (#error, {})", message.type_name())))
            }
            _ => Err(LazyError::type_mismatch("`Result.unwrap` expects an (#ok, _) or (#error, _) tuple", "Tuple", arg.type_name())),
        }),
    );
    fields.insert(
        "withDefault".into(),
        native("Result.withDefault", |_ctx, arg| {
            let args = crate::builtins::unpack_tuple("Result.withDefault", arg, 2)?;
            match tag(&args[0]) {
                Some("ok") => Ok(payload(&args[0]).expect("tuple already matched `ok`")),
                _ => Ok(args[1].clone()),
            }
        }),
    );
    fields.insert(
        "map".into(),
        native("Result.map", |ctx, arg| {
            let args = crate::builtins::unpack_tuple("Result.map", arg, 2)?;
            match tag(&args[0]) {
                Some("ok") => {
                    let mapped = ctx.apply(&args[1], payload(&args[0]).expect("tuple already matched `ok`"))?;
                    Ok(Value::tuple(vec![Value::symbol("ok"), mapped]))
                }
                _ => Ok(args[0].clone()),
            }
        }),
    );
    Value::object(fields)
}
