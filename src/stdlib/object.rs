//! The `Object` auto-imported module.

use crate::builtins::object;
use crate::value::{LazyObject, Value};

pub fn module() -> Value {
    let mut fields = LazyObject::new();
    fields.insert("keys".into(), object::keys());
    fields.insert("values".into(), object::values());
    fields.insert("has".into(), object::has());
    fields.insert("merge".into(), object::merge());
    Value::object(fields)
}
