//! The `crash` primitive.

use crate::builtins::{expect_string, native};
use crate::error::{ErrorKind, LazyError};
use crate::value::Value;

pub fn crash() -> Value {
    native("crash", |_ctx, arg| {
        let message = expect_string("crash", arg)?;
        Err(LazyError::new(ErrorKind::UserCrash, message.to_string()))
    })
}
