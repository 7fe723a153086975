use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_seatingd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .env_remove("SEATINGD_WORKSPACE")
        .spawn()
        .expect("spawn seatingd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn widgets(view_holder: &serde_json::Value) -> Vec<serde_json::Value> {
    view_holder
        .pointer("/view/content/widgets")
        .and_then(|v| v.as_array())
        .cloned()
        .expect("view widgets")
}

fn widget(view_holder: &serde_json::Value, key: &str) -> serde_json::Value {
    widgets(view_holder)
        .into_iter()
        .find(|w| w["key"] == key)
        .unwrap_or_else(|| panic!("no widget {}", key))
}

fn read_config(workspace: &PathBuf) -> serde_json::Value {
    let raw = std::fs::read_to_string(workspace.join("config/data.json")).expect("read data.json");
    serde_json::from_str(&raw).expect("parse data.json")
}

#[test]
fn institute_screen_saves_exam_details_and_keeps_other_keys() {
    let workspace = temp_dir("seatingd-institute-screen");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.init",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let mut doc = read_config(&workspace);
    doc["custom_block"] = json!({ "kept": true });
    std::fs::write(
        workspace.join("config/data.json"),
        serde_json::to_string_pretty(&doc).expect("encode"),
    )
    .expect("write data.json");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "shell.open",
        json!({ "name": "Institute Information", "file": "institute_info" }),
    );
    assert_eq!(widget(&opened, "INS_CODE")["value"], "0000");
    assert_eq!(widget(&opened, "INS_CODE")["readOnly"], true);
    assert_eq!(widget(&opened, "exam_period")["selected"], "0");
    assert_eq!(widget(&opened, "exam_start_date")["value"], "2000-01-01");

    let bad = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "shell.event",
        json!({
            "action": "save",
            "form": { "exam_period": "1", "exam_start_date": "04/11/2024", "exam_end_date": "2024-11-20" }
        }),
    );
    let last = widgets(&bad).last().cloned().expect("message");
    assert_eq!(last["level"], "warning");
    assert_eq!(
        last["text"],
        "Exam Start Date must be a date in YYYY-MM-DD format."
    );
    assert_eq!(read_config(&workspace)["exam_details"]["EXAM_PERIOD"], "0");

    let saved = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "shell.event",
        json!({
            "action": "save",
            "form": { "exam_period": "1", "exam_start_date": "2024-11-04", "exam_end_date": "2024-11-20" }
        }),
    );
    let last = widgets(&saved).last().cloned().expect("message");
    assert_eq!(last["text"], "Changes saved successfully!");
    assert_eq!(widget(&saved, "exam_period")["selected"], "1");

    let on_disk = read_config(&workspace);
    assert_eq!(
        on_disk["exam_details"],
        json!({
            "EXAM_PERIOD": "1",
            "EXAM_START_DATE": "2024-11-04",
            "EXAM_END_DATE": "2024-11-20"
        })
    );
    assert_eq!(on_disk["institute"]["INS_NAME"], "Examination Center");
    assert_eq!(on_disk["custom_block"], json!({ "kept": true }));
    assert_eq!(on_disk["departments"], doc["departments"]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn institute_methods_round_trip_dates() {
    let workspace = temp_dir("seatingd-institute-methods");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.init",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let rejected = request(
        &mut stdin,
        &mut reader,
        "3",
        "institute.save",
        json!({ "examPeriod": "2" }),
    );
    assert_eq!(
        rejected.pointer("/error/code").and_then(|v| v.as_str()),
        Some("bad_params")
    );

    let saved = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "institute.save",
        json!({
            "examPeriod": "1",
            "examStartDate": "2025-04-01",
            "examEndDate": "2025-04-30",
            "institute": { "INS_CODE": "1234", "INS_NAME": "Govt. Polytechnic" }
        }),
    );
    assert_eq!(saved["examDetails"]["EXAM_START_DATE"], "2025-04-01");

    // A fresh reload reads the same values back from disk.
    let _ = request_ok(&mut stdin, &mut reader, "5", "config.reload", json!({}));
    let got = request_ok(&mut stdin, &mut reader, "6", "institute.get", json!({}));
    assert_eq!(got["institute"]["INS_CODE"], "1234");
    assert_eq!(got["institute"]["INS_NAME"], "Govt. Polytechnic");
    assert_eq!(got["examDetails"]["EXAM_PERIOD"], "1");
    assert_eq!(got["examDetails"]["EXAM_END_DATE"], "2025-04-30");
    assert_eq!(got["periods"][1], json!({ "value": "1", "label": "Winter" }));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn save_refuses_to_replace_unreadable_settings() {
    let workspace = temp_dir("seatingd-institute-unreadable");
    std::fs::create_dir_all(workspace.join("config")).expect("config dir");
    let broken = "{ \"departments\": [{ \"code\": \"CO\", \"name\": \"Computer Engineering\" }], ";
    std::fs::write(workspace.join("config/data.json"), broken).expect("write data.json");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert!(selected["configError"].is_string());

    let refused = request(
        &mut stdin,
        &mut reader,
        "2",
        "institute.save",
        json!({ "examPeriod": "1", "examStartDate": "2025-04-01", "examEndDate": "2025-04-30" }),
    );
    assert_eq!(
        refused.pointer("/error/code").and_then(|v| v.as_str()),
        Some("config_write_failed")
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "shell.open",
        json!({ "name": "Institute Information", "file": "institute_info" }),
    );
    let screen = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "shell.event",
        json!({
            "action": "save",
            "form": { "exam_period": "0", "exam_start_date": "2025-04-01", "exam_end_date": "2025-04-30" }
        }),
    );
    let last = widgets(&screen).last().cloned().expect("message");
    assert_eq!(last["level"], "error");
    assert!(last["text"]
        .as_str()
        .map(|t| t.starts_with("Error updating data.json:"))
        .unwrap_or(false));

    assert_eq!(
        std::fs::read_to_string(workspace.join("config/data.json")).expect("read data.json"),
        broken
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
