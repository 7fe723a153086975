use serde_json::json;

use crate::error::ScreenError;
use crate::ipc::error::{bad_params, err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use crate::registry::MenuTarget;
use crate::view::ScreenEvent;
use crate::workspace::Workspace;

fn view_json(ws: &Workspace) -> serde_json::Value {
    json!({ "view": ws.shell.view() })
}

fn handle_menu(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_ref() else {
        return no_workspace(&req.id);
    };
    ok(
        &req.id,
        json!({
            "menu": ws.shell.menu(),
            "menuError": ws.shell.menu_error(),
        }),
    )
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_mut() else {
        return no_workspace(&req.id);
    };
    let target: MenuTarget = match serde_json::from_value(req.params.clone()) {
        Ok(t) => t,
        Err(e) => return bad_params(&req.id, format!("invalid params: {}", e)),
    };
    ws.open_screen(&target);
    ok(&req.id, view_json(ws))
}

fn handle_home(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_mut() else {
        return no_workspace(&req.id);
    };
    ws.home();
    ok(&req.id, view_json(ws))
}

fn handle_event(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_mut() else {
        return no_workspace(&req.id);
    };
    let event: ScreenEvent = match serde_json::from_value(req.params.clone()) {
        Ok(e) => e,
        Err(e) => return bad_params(&req.id, format!("invalid params: {}", e)),
    };
    if event.action.trim().is_empty() {
        return bad_params(&req.id, "missing params.action");
    }
    match ws.dispatch(&event) {
        Ok(_) => ok(&req.id, view_json(ws)),
        Err(e) => {
            let code = match e {
                ScreenError::NoActiveScreen => "no_active_screen",
                _ => "screen_failed",
            };
            err(&req.id, code, e.to_string(), Some(view_json(ws)))
        }
    }
}

fn handle_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_ref() else {
        return no_workspace(&req.id);
    };
    ok(&req.id, view_json(ws))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "shell.menu" => Some(handle_menu(state, req)),
        "shell.open" => Some(handle_open(state, req)),
        "shell.home" => Some(handle_home(state, req)),
        "shell.event" => Some(handle_event(state, req)),
        "shell.view" => Some(handle_view(state, req)),
        _ => None,
    }
}
