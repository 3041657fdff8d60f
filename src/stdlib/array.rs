//! The `Array` auto-imported module.

use crate::builtins::array;
use crate::value::{LazyObject, Value};

pub fn module() -> Value {
    let mut fields = LazyObject::new();
    fields.insert("length".into(), array::length());
    fields.insert("get".into(), array::get());
    fields.insert("at".into(), array::at());
    fields.insert("concat".into(), array::concat());
    fields.insert("push".into(), array::push());
    fields.insert("head".into(), array::head());
    fields.insert("tail".into(), array::tail());
    fields.insert("fold".into(), array::fold());
    Value::object(fields)
}
