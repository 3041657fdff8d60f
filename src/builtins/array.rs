//! Array built-ins: length, get, concat, push, at, head, tail, fold.

use crate::builtins::{expect_array, expect_integer, native, unpack_tuple};
use crate::error::{ErrorKind, LazyError};
use crate::value::Value;

pub fn length() -> Value {
    native("Array.length", |_ctx, arg| {
        let items = expect_array("Array.length", arg)?;
        Ok(Value::Integer(items.len() as i64))
    })
}

/// Returns `(#ok, value)` or `#outOfBounds` rather than raising, per the
/// spec's note that `OutOfBounds` "may be returned as a result tuple
/// rather than raised" in user-facing APIs.
pub fn get() -> Value {
    native("Array.get", |ctx, arg| {
        let args = unpack_tuple("Array.get", arg, 2)?;
        let items = expect_array("Array.get", &args[0])?;
        let index = expect_integer("Array.get", &args[1])?;
        if index < 0 || index as usize >= items.len() {
            return Ok(Value::symbol("outOfBounds"));
        }
        let value = ctx.force(&items[index as usize])?;
        Ok(Value::tuple(vec![Value::symbol("ok"), value]))
    })
}

pub fn at() -> Value {
    native("Array.at", |ctx, arg| {
        let args = unpack_tuple("Array.at", arg, 2)?;
        let items = expect_array("Array.at", &args[0])?;
        let index = expect_integer("Array.at", &args[1])?;
        if index < 0 || index as usize >= items.len() {
            return Err(LazyError::new(ErrorKind::OutOfBounds, format!("index {index} out of bounds for array of length {}", items.len())));
        }
        ctx.force(&items[index as usize])
    })
}

pub fn concat() -> Value {
    native("Array.concat", |_ctx, arg| {
        let args = unpack_tuple("Array.concat", arg, 2)?;
        let left = expect_array("Array.concat", &args[0])?;
        let right = expect_array("Array.concat", &args[1])?;
        let mut out = Vec::with_capacity(left.len() + right.len());
        out.extend_from_slice(left);
        out.extend_from_slice(right);
        Ok(Value::array(out))
    })
}

pub fn push() -> Value {
    native("Array.push", |_ctx, arg| {
        let args = unpack_tuple("Array.push", arg, 2)?;
        let items = expect_array("Array.push", &args[0])?;
        let mut out = items.to_vec();
        out.push(args[1].clone());
        Ok(Value::array(out))
    })
}

pub fn head() -> Value {
    native("Array.head", |ctx, arg| {
        let items = expect_array("Array.head", arg)?;
        match items.first() {
            Some(value) => ctx.force(value),
            None => Err(LazyError::new(ErrorKind::OutOfBounds, "`Array.head` of an empty array")),
        }
    })
}

pub fn tail() -> Value {
    native("Array.tail", |_ctx, arg| {
        let items = expect_array("Array.tail", arg)?;
        if items.is_empty() {
            return Err(LazyError::new(ErrorKind::OutOfBounds, "`Array.tail` of an empty array"));
        }
        Ok(Value::array(items[1..].to_vec()))
    })
}

/// `fold (array, seed, f)` — the general recursion primitive the
/// standard library's map/filter combinators are expressible over.
pub fn fold() -> Value {
    native("Array.fold", |ctx, arg| {
        let args = unpack_tuple("Array.fold", arg, 3)?;
        let items = expect_array("Array.fold", &args[0])?;
        let mut acc = args[1].clone();
        for item in items {
            let forced = ctx.force(item)?;
            let partial = ctx.apply(&args[2], acc)?;
            acc = ctx.apply(&partial, forced)?;
        }
        Ok(acc)
    })
}
