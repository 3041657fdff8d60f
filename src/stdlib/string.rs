//! The `String` auto-imported module.

use crate::builtins::string;
use crate::value::{LazyObject, Value};

pub fn module() -> Value {
    let mut fields = LazyObject::new();
    fields.insert("length".into(), string::length());
    fields.insert("concat".into(), string::concat());
    fields.insert("split".into(), string::split());
    fields.insert("join".into(), string::join());
    fields.insert("lower".into(), string::lower());
    fields.insert("upper".into(), string::upper());
    fields.insert("trim".into(), string::trim());
    fields.insert("startsWith".into(), string::starts_with());
    fields.insert("endsWith".into(), string::ends_with());
    fields.insert("show".into(), string::show());
    Value::object(fields)
}
