use serde_json::json;

use crate::error::{GatewayError, SupervisorError};

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn no_workspace(id: &str) -> serde_json::Value {
    err(id, "no_workspace", "select a workspace first", None)
}

pub fn bad_params(id: &str, message: impl Into<String>) -> serde_json::Value {
    err(id, "bad_params", message, None)
}

fn gateway_code(e: &GatewayError, write: bool) -> &'static str {
    match e {
        GatewayError::NotConnected { .. } => "db_unavailable",
        GatewayError::Sqlite(_) if write => "db_write_failed",
        GatewayError::Sqlite(_) => "db_query_failed",
    }
}

pub fn supervisor_err(id: &str, e: &SupervisorError, write: bool) -> serde_json::Value {
    let code = match e {
        SupervisorError::Invalid(_) => "validation_failed",
        SupervisorError::NoMatch(_) => "not_found",
        SupervisorError::Gateway(g) => gateway_code(g, write),
        SupervisorError::Decode(_) => "db_query_failed",
    };
    err(id, code, e.to_string(), None)
}
