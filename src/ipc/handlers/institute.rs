use serde_json::json;

use crate::config::{parse_date, ExamDetails, ExamPeriod, Institute};
use crate::ipc::error::{bad_params, err, no_workspace, ok};
use crate::ipc::types::{AppState, Request};

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_ref() else {
        return no_workspace(&req.id);
    };
    let cfg = ws.config.snapshot();
    ok(
        &req.id,
        json!({
            "institute": &cfg.institute,
            "examDetails": &cfg.exam_details,
            "periods": ExamPeriod::ALL
                .iter()
                .map(|p| json!({ "value": p.code(), "label": p.label() }))
                .collect::<Vec<_>>(),
        }),
    )
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(ws) = state.workspace.as_ref() else {
        return no_workspace(&req.id);
    };
    let cfg = ws.config.snapshot();

    let period = match req.params.get("examPeriod") {
        None | Some(serde_json::Value::Null) => cfg.exam_details.period,
        Some(v) => match v.as_str().and_then(ExamPeriod::from_code) {
            Some(p) => p,
            None => return bad_params(&req.id, "params.examPeriod must be \"0\" or \"1\""),
        },
    };
    let mut dates = [cfg.exam_details.start_date, cfg.exam_details.end_date];
    for (slot, key) in dates.iter_mut().zip(["examStartDate", "examEndDate"]) {
        let Some(raw) = req.params.get(key).and_then(|v| v.as_str()) else {
            continue;
        };
        match parse_date(raw) {
            Some(d) => *slot = d,
            None => {
                return bad_params(
                    &req.id,
                    format!("params.{} must be a date in YYYY-MM-DD format", key),
                )
            }
        }
    }
    let institute: Institute = match req.params.get("institute") {
        None | Some(serde_json::Value::Null) => cfg.institute.clone(),
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(i) => i,
            Err(e) => return bad_params(&req.id, format!("invalid params.institute: {}", e)),
        },
    };
    let exam = ExamDetails {
        period,
        start_date: dates[0],
        end_date: dates[1],
        extra: cfg.exam_details.extra.clone(),
    };

    match ws.config.save_settings(institute, exam) {
        Ok(doc) => ok(
            &req.id,
            json!({
                "institute": &doc.institute,
                "examDetails": &doc.exam_details,
            }),
        ),
        Err(e) => err(&req.id, "config_write_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "institute.get" => Some(handle_get(state, req)),
        "institute.save" => Some(handle_save(state, req)),
        _ => None,
    }
}
