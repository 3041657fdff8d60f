//! The `Range` auto-imported module: builds integer arrays, since arrays
//! are the language's only sequence type and there is no lazy range value.

use crate::builtins::{expect_integer, native, unpack_tuple};
use crate::error::{ErrorKind, LazyError};
use crate::value::Value;

pub fn module() -> Value {
    let mut fields = crate::value::LazyObject::new();
    fields.insert(
        "make".into(),
        native("Range.make", |_ctx, arg| {
            let args = unpack_tuple("Range.make", arg, 2)?;
            let start = expect_integer("Range.make", &args[0])?;
            let end = expect_integer("Range.make", &args[1])?;
            Ok(Value::array((start..end).map(Value::Integer).collect()))
        }),
    );
    fields.insert(
        "makeInclusive".into(),
        native("Range.makeInclusive", |_ctx, arg| {
            let args = unpack_tuple("Range.makeInclusive", arg, 2)?;
            let start = expect_integer("Range.makeInclusive", &args[0])?;
            let end = expect_integer("Range.makeInclusive", &args[1])?;
            Ok(Value::array((start..=end).map(Value::Integer).collect()))
        }),
    );
    fields.insert(
        "step".into(),
        native("Range.step", |_ctx, arg| {
            let args = unpack_tuple("Range.step", arg, 3)?;
            let start = expect_integer("Range.step", &args[0])?;
            let end = expect_integer("Range.step", &args[1])?;
            let step = expect_integer("Range.step", &args[2])?;
            if step == 0 {
                return Err(LazyError::new(ErrorKind::InvalidArgument, "`Range.step` step must be nonzero"));
            }
            let mut out = Vec::new();
            let mut n = start;
            if step > 0 {
                while n < end {
                    out.push(Value::Integer(n));
                    n += step;
                }
            } else {
                while n > end {
                    out.push(Value::Integer(n));
                    n += step;
                }
            }
            Ok(Value::array(out))
        }),
    );
    Value::object(fields)
}
