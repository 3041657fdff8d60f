//! Auto-imported standard modules. A fixed set (`Array`, `Basics`,
//! `Float`, `Math`, `Object`, `Range`, `Result`, `String`, `Tuple`) is
//! bound into the root environment before any user code runs; `Basics`'s
//! fields are additionally promoted to unqualified top-level identifiers.

pub mod array;
pub mod basics;
pub mod float;
pub mod math;
pub mod object;
pub mod range;
pub mod result;
pub mod string;
pub mod tuple;

use std::rc::Rc;

use crate::env::Environment;
use crate::value::Value;

/// Installs the auto-imported modules and `Basics`'s unqualified
/// promotion into a fresh environment parented on `root`.
pub fn install(root: Rc<Environment>) -> Rc<Environment> {
    let mut env = root;
    env = env.extend("Array", array::module());
    env = env.extend("Float", float::module());
    env = env.extend("Math", math::module());
    env = env.extend("Object", object::module());
    env = env.extend("Range", range::module());
    env = env.extend("Result", result::module());
    env = env.extend("String", string::module());
    env = env.extend("Tuple", tuple::module());

    let basics = basics::module();
    env = env.extend("Basics", basics.clone());
    if let Value::Object(fields) = &basics {
        for (name, value) in fields.iter() {
            env = env.extend(name.clone(), value.clone());
        }
    }
    env
}
