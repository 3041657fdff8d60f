//! Math / Float / Int built-ins: abs, floor, ceil, round, sqrt, pow, mod,
//! rem, min, max.

use crate::builtins::{expect_float_like, expect_integer, native, unpack_tuple};
use crate::error::{ErrorKind, LazyError};
use crate::value::Value;

pub fn abs() -> Value {
    native("Math.abs", |_ctx, arg| match arg {
        Value::Integer(n) => Ok(Value::Integer(n.wrapping_abs())),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        other => Err(LazyError::type_mismatch("`Math.abs` expects a number", "Integer or Float", other.type_name())),
    })
}

pub fn floor() -> Value {
    native("Math.floor", |_ctx, arg| Ok(Value::Integer(expect_float_like("Math.floor", arg)?.floor() as i64)))
}

pub fn ceil() -> Value {
    native("Math.ceil", |_ctx, arg| Ok(Value::Integer(expect_float_like("Math.ceil", arg)?.ceil() as i64)))
}

pub fn round() -> Value {
    native("Math.round", |_ctx, arg| Ok(Value::Integer(expect_float_like("Math.round", arg)?.round() as i64)))
}

pub fn sqrt() -> Value {
    native("Math.sqrt", |_ctx, arg| {
        let n = expect_float_like("Math.sqrt", arg)?;
        if n < 0.0 {
            return Err(LazyError::new(ErrorKind::InvalidArgument, "`Math.sqrt` of a negative number"));
        }
        Ok(Value::Float(n.sqrt()))
    })
}

pub fn pow() -> Value {
    native("Math.pow", |_ctx, arg| {
        let args = unpack_tuple("Math.pow", arg, 2)?;
        match (&args[0], &args[1]) {
            (Value::Integer(base), Value::Integer(exp)) if *exp >= 0 => Ok(Value::Integer(base.wrapping_pow(*exp as u32))),
            _ => {
                let base = expect_float_like("Math.pow", &args[0])?;
                let exp = expect_float_like("Math.pow", &args[1])?;
                Ok(Value::Float(base.powf(exp)))
            }
        }
    })
}

pub fn modulo() -> Value {
    native("Math.mod", |_ctx, arg| {
        let args = unpack_tuple("Math.mod", arg, 2)?;
        let a = expect_integer("Math.mod", &args[0])?;
        let b = expect_integer("Math.mod", &args[1])?;
        if b == 0 {
            return Err(LazyError::new(ErrorKind::TypeMismatch, "division by zero"));
        }
        // `b == -1` makes `rem_euclid`'s internal division overflow for
        // `a == i64::MIN`; the result is always 0 in that case.
        if b == -1 {
            return Ok(Value::Integer(0));
        }
        Ok(Value::Integer(a.rem_euclid(b)))
    })
}

pub fn rem() -> Value {
    native("Math.rem", |_ctx, arg| {
        let args = unpack_tuple("Math.rem", arg, 2)?;
        let a = expect_integer("Math.rem", &args[0])?;
        let b = expect_integer("Math.rem", &args[1])?;
        if b == 0 {
            return Err(LazyError::new(ErrorKind::TypeMismatch, "division by zero"));
        }
        Ok(Value::Integer(a.wrapping_rem(b)))
    })
}

pub fn min() -> Value {
    native("Math.min", |_ctx, arg| {
        let args = unpack_tuple("Math.min", arg, 2)?;
        let a = expect_float_like("Math.min", &args[0])?;
        let b = expect_float_like("Math.min", &args[1])?;
        Ok(if a <= b { args[0].clone() } else { args[1].clone() })
    })
}

pub fn max() -> Value {
    native("Math.max", |_ctx, arg| {
        let args = unpack_tuple("Math.max", arg, 2)?;
        let a = expect_float_like("Math.max", &args[0])?;
        let b = expect_float_like("Math.max", &args[1])?;
        Ok(if a >= b { args[0].clone() } else { args[1].clone() })
    })
}
