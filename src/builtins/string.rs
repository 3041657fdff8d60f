//! String built-ins: length, concat, split, join, case conversion, trim,
//! prefix/suffix checks, and canonical `show` formatting.

use crate::builtins::{expect_array, expect_string, native, unpack_tuple};
use crate::error::RunResult;
use crate::format;
use crate::value::Value;

pub fn length() -> Value {
    native("String.length", |_ctx, arg| {
        let s = expect_string("String.length", arg)?;
        Ok(Value::Integer(s.chars().count() as i64))
    })
}

pub fn concat() -> Value {
    native("String.concat", |_ctx, arg| {
        let args = unpack_tuple("String.concat", arg, 2)?;
        let a = expect_string("String.concat", &args[0])?;
        let b = expect_string("String.concat", &args[1])?;
        Ok(Value::string(format!("{a}{b}")))
    })
}

pub fn split() -> Value {
    native("String.split", |_ctx, arg| {
        let args = unpack_tuple("String.split", arg, 2)?;
        let s = expect_string("String.split", &args[0])?;
        let sep = expect_string("String.split", &args[1])?;
        let parts: Vec<Value> = if sep.is_empty() {
            s.chars().map(|c| Value::string(c.to_string())).collect()
        } else {
            s.split(sep).map(Value::string).collect()
        };
        Ok(Value::array(parts))
    })
}

pub fn join() -> Value {
    native("String.join", |ctx, arg| {
        let args = unpack_tuple("String.join", arg, 2)?;
        let sep = expect_string("String.join", &args[0])?;
        let items = expect_array("String.join", &args[1])?;
        let mut pieces = Vec::with_capacity(items.len());
        for item in items {
            let forced = ctx.force(item)?;
            pieces.push(expect_string("String.join", &forced)?.to_string());
        }
        Ok(Value::string(pieces.join(sep)))
    })
}

pub fn lower() -> Value {
    native("String.lower", |_ctx, arg| {
        Ok(Value::string(expect_string("String.lower", arg)?.to_lowercase()))
    })
}

pub fn upper() -> Value {
    native("String.upper", |_ctx, arg| {
        Ok(Value::string(expect_string("String.upper", arg)?.to_uppercase()))
    })
}

pub fn trim() -> Value {
    native("String.trim", |_ctx, arg| Ok(Value::string(expect_string("String.trim", arg)?.trim())))
}

pub fn starts_with() -> Value {
    native("String.startsWith", |_ctx, arg| {
        let args = unpack_tuple("String.startsWith", arg, 2)?;
        let s = expect_string("String.startsWith", &args[0])?;
        let prefix = expect_string("String.startsWith", &args[1])?;
        Ok(Value::Boolean(s.starts_with(prefix)))
    })
}

pub fn ends_with() -> Value {
    native("String.endsWith", |_ctx, arg| {
        let args = unpack_tuple("String.endsWith", arg, 2)?;
        let s = expect_string("String.endsWith", &args[0])?;
        let suffix = expect_string("String.endsWith", &args[1])?;
        Ok(Value::Boolean(s.ends_with(suffix)))
    })
}

pub fn show() -> Value {
    native("String.show", |ctx, arg| {
        let mut force = |v: &Value| ctx.force(v);
        let rendered: RunResult<String> = format::format_value(arg, &mut force);
        Ok(Value::string(rendered?))
    })
}
