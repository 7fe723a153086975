use serde_json::json;

use crate::ipc::error::{bad_params, no_workspace, ok, supervisor_err};
use crate::ipc::types::{AppState, Request};
use crate::supervisors::{self, SupervisorForm};

fn str_param<'a>(req: &'a Request, key: &str) -> &'a str {
    req.params.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn form_param(req: &Request) -> Result<SupervisorForm, serde_json::Value> {
    serde_json::from_value(req.params.clone())
        .map_err(|e| bad_params(&req.id, format!("invalid params: {}", e)))
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_mut() else {
        return no_workspace(&req.id);
    };
    let cfg = ws.config.snapshot();
    match supervisors::list(&mut ws.gateway, &cfg) {
        Ok(rows) => ok(&req.id, json!({ "supervisors": rows })),
        Err(e) => supervisor_err(&req.id, &e, false),
    }
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_mut() else {
        return no_workspace(&req.id);
    };
    let form = match form_param(req) {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let cfg = ws.config.snapshot();
    match supervisors::add(&mut ws.gateway, &cfg, &form) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => supervisor_err(&req.id, &e, true),
    }
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_mut() else {
        return no_workspace(&req.id);
    };
    let form = match form_param(req) {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let selected = req.params.get("selectedRfid").and_then(|v| v.as_str());
    let cfg = ws.config.snapshot();
    match supervisors::update(&mut ws.gateway, &cfg, selected, &form) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => supervisor_err(&req.id, &e, true),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_mut() else {
        return no_workspace(&req.id);
    };
    let selected = req.params.get("rfid").and_then(|v| v.as_str());
    match supervisors::delete(&mut ws.gateway, selected) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => supervisor_err(&req.id, &e, true),
    }
}

fn handle_constraints_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_mut() else {
        return no_workspace(&req.id);
    };
    match supervisors::list_records(&mut ws.gateway) {
        Ok(records) => ok(&req.id, json!({ "supervisors": records })),
        Err(e) => supervisor_err(&req.id, &e, false),
    }
}

fn handle_constraints_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_mut() else {
        return no_workspace(&req.id);
    };
    let id = match req.params.get("supervisorId") {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => match v.as_i64() {
            Some(id) => Some(id),
            None => return bad_params(&req.id, "params.supervisorId must be an integer"),
        },
    };
    match supervisors::set_constraint(
        &mut ws.gateway,
        id,
        str_param(req, "startDate"),
        str_param(req, "endDate"),
    ) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => supervisor_err(&req.id, &e, true),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "supervisors.list" => Some(handle_list(state, req)),
        "supervisors.create" => Some(handle_create(state, req)),
        "supervisors.update" => Some(handle_update(state, req)),
        "supervisors.delete" => Some(handle_delete(state, req)),
        "constraints.list" => Some(handle_constraints_list(state, req)),
        "constraints.set" => Some(handle_constraints_set(state, req)),
        _ => None,
    }
}
