//! The `{code, message}` JSON envelope every admin endpoint replies with,
//! carried over from the teacher's own `api::result::R`.

use serde::Serialize;

#[derive(Serialize)]
pub struct R {
    code: u16,
    message: String,
}

impl R {
    pub fn success(msg: impl Into<String>) -> Self {
        R { code: 0, message: msg.into() }
    }

    pub fn error(code: u16, msg: impl Into<String>) -> Self {
        R { code, message: msg.into() }
    }
}

impl Default for R {
    fn default() -> Self {
        R::success("")
    }
}
