//! The `Basics` auto-imported module. Its fields are additionally promoted
//! unqualified into the top-level environment, so `crash "oops"` and
//! `not true` work without a `Basics.` prefix.

use crate::builtins::{control, native, unpack_tuple};
use crate::value::{LazyObject, Value};

pub fn module() -> Value {
    let mut fields = LazyObject::new();
    fields.insert("crash".into(), control::crash());
    fields.insert(
        "identity".into(),
        native("identity", |_ctx, arg| Ok(arg.clone())),
    );
    fields.insert(
        "not".into(),
        native("not", |_ctx, arg| match arg {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            other => Err(crate::error::LazyError::type_mismatch("`not` expects a boolean", "Boolean", other.type_name())),
        }),
    );
    fields.insert(
        "equals".into(),
        native("equals", |ctx, arg| {
            let args = unpack_tuple("equals", arg, 2)?;
            Ok(Value::Boolean(ctx.equals(&args[0], &args[1])?))
        }),
    );
    Value::object(fields)
}
