use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_portald");
    let mut child = Command::new(exe)
        .env_remove("PORTALD_CONFIG")
        .env_remove("LOG_LEVEL")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn portald");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn read_response(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response");
    serde_json::from_str(line.trim()).expect("parse response json")
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

    let value = read_response(reader);
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], json!(true));
    assert_eq!(health["result"]["version"], json!(env!("CARGO_PKG_VERSION")));
    assert_eq!(health["result"]["unrecognizedShape"], json!("empty"));
    assert!(health["result"]["startedAt"].is_string());

    let roles = request(&mut stdin, &mut reader, "2", "roles.list", json!({}));
    assert_eq!(
        roles["result"]["roles"],
        json!([
            { "id": 1, "name": "Admin", "hasVisibility": true },
            { "id": 2, "name": "Teacher", "hasVisibility": true },
            { "id": 3, "name": "Student", "hasVisibility": true },
            { "id": 4, "name": "Parent", "hasVisibility": true }
        ])
    );

    let both = json!({ "viewerRole": 1, "targetRole": 3 });
    let _ = request(&mut stdin, &mut reader, "3", "fields.get", both.clone());
    let mut with_record = both.clone();
    with_record["record"] = json!({ "firstName": "Ann" });
    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "fields.filterForSubmission",
        with_record.clone(),
    );
    let _ = request(&mut stdin, &mut reader, "5", "fields.filterForDisplay", with_record);

    let payload = json!({ "payload": [] });
    let _ = request(&mut stdin, &mut reader, "6", "lists.classify", payload.clone());
    let _ = request(&mut stdin, &mut reader, "7", "users.normalize", payload.clone());
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "lists.normalizeGrouped",
        json!({ "payload": [], "groupOrder": ["a"] }),
    );
    let _ = request(&mut stdin, &mut reader, "9", "courses.normalize", payload.clone());
    let _ = request(&mut stdin, &mut reader, "10", "classes.normalize", payload);

    let unknown = json!({ "id": "11", "method": "fees.collect", "params": {} });
    writeln!(stdin, "{}", unknown).expect("write request");
    stdin.flush().expect("flush request");
    let resp = read_response(&mut reader);
    assert_eq!(resp["ok"], json!(false));
    assert_eq!(resp["error"]["code"], json!("not_implemented"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bad_json_line_gets_error_without_id_and_loop_continues() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let resp = read_response(&mut reader);
    assert_eq!(resp["ok"], json!(false));
    assert_eq!(resp["error"]["code"], json!("bad_json"));
    assert!(resp.get("id").is_none());

    // Blank lines are skipped without a response.
    writeln!(stdin).expect("write blank");
    let health = request(&mut stdin, &mut reader, "after", "health", json!({}));
    assert_eq!(health["ok"], json!(true));

    drop(stdin);
    let _ = child.wait();
}
