//! The `Math` auto-imported module.

use crate::builtins::math;
use crate::value::{LazyObject, Value};

pub fn module() -> Value {
    let mut fields = LazyObject::new();
    fields.insert("abs".into(), math::abs());
    fields.insert("floor".into(), math::floor());
    fields.insert("ceil".into(), math::ceil());
    fields.insert("round".into(), math::round());
    fields.insert("sqrt".into(), math::sqrt());
    fields.insert("pow".into(), math::pow());
    fields.insert("mod".into(), math::modulo());
    fields.insert("rem".into(), math::rem());
    fields.insert("min".into(), math::min());
    fields.insert("max".into(), math::max());
    fields.insert("pi".into(), Value::Float(std::f64::consts::PI));
    fields.insert("e".into(), Value::Float(std::f64::consts::E));
    Value::object(fields)
}
