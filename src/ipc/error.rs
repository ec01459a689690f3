use serde_json::json;

/// Machine-readable `error.code` values the host matches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    BadParams,
    UnknownRole,
    UnrecognizedShape,
    NotImplemented,
}

impl Code {
    pub fn as_str(self) -> &'static str {
        match self {
            Code::BadParams => "bad_params",
            Code::UnknownRole => "unknown_role",
            Code::UnrecognizedShape => "unrecognized_shape",
            Code::NotImplemented => "not_implemented",
        }
    }
}

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({ "id": id, "ok": true, "result": result })
}

pub fn err(
    id: &str,
    code: Code,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({ "code": code.as_str(), "message": message.into() });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({ "id": id, "ok": false, "error": error })
}
