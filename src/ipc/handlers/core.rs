use std::path::PathBuf;

use serde_json::json;

use crate::ipc::error::{bad_params, err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};
use crate::workspace::{Workspace, WorkspaceLayout};

fn path_param(req: &Request) -> Option<PathBuf> {
    req.params
        .get("path")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ws = state.workspace.as_ref();
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": ws.map(|w| w.layout().root().to_string_lossy().to_string()),
            "dbConnected": ws.map(|w| w.gateway.is_connected()).unwrap_or(false),
        }),
    )
}

fn handle_workspace_init(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = path_param(req) else {
        return bad_params(&req.id, "missing params.path");
    };
    match WorkspaceLayout::new(&path).init() {
        Ok(written) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "written": written
                    .iter()
                    .map(|p| p.to_string_lossy().to_string())
                    .collect::<Vec<_>>(),
            }),
        ),
        Err(e) => err(&req.id, "workspace_init_failed", e.to_string(), None),
    }
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = path_param(req) else {
        return bad_params(&req.id, "missing params.path");
    };

    // Close the previous session before opening the next one.
    state.workspace = None;
    let ws = Workspace::open(&path);
    let result = json!({
        "workspacePath": path.to_string_lossy(),
        "dbConnected": ws.gateway.is_connected(),
        "configError": ws.config.load_error(),
        "menuError": ws.shell.menu_error(),
        "view": ws.shell.view(),
    });
    state.workspace = Some(ws);
    ok(&req.id, result)
}

fn handle_config_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_ref() else {
        return no_workspace(&req.id);
    };
    ok(
        &req.id,
        json!({
            "config": ws.config.snapshot().as_ref(),
            "loadError": ws.config.load_error(),
        }),
    )
}

fn handle_config_reload(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_ref() else {
        return no_workspace(&req.id);
    };
    match ws.config.reload() {
        Ok(doc) => ok(&req.id, json!({ "config": doc.as_ref() })),
        Err(e) => err(&req.id, "config_read_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.init" => Some(handle_workspace_init(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "config.get" => Some(handle_config_get(state, req)),
        "config.reload" => Some(handle_config_reload(state, req)),
        _ => None,
    }
}
