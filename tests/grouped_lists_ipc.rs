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

fn result_of(value: serde_json::Value) -> serde_json::Value {
    assert_eq!(value["ok"], json!(true), "request failed: {}", value);
    value["result"].clone()
}

#[test]
fn courses_and_classes_concatenate_in_status_order() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let courses = result_of(request(
        &mut stdin,
        &mut reader,
        "1",
        "courses.normalize",
        json!({ "payload": {
            "success": true,
            "data": {
                "inactive": [{ "name": "Latin" }],
                "completed": [{ "name": "Algebra I" }],
                "ongoing": [{ "name": "Biology" }, { "name": "Chemistry" }]
            }
        } }),
    ));
    assert_eq!(courses["shape"], json!("grouped"));
    assert_eq!(
        courses["items"],
        json!([
            { "name": "Biology" },
            { "name": "Chemistry" },
            { "name": "Algebra I" },
            { "name": "Latin" }
        ])
    );

    let classes = result_of(request(
        &mut stdin,
        &mut reader,
        "2",
        "classes.normalize",
        json!({ "payload": { "Inactive": [{ "id": "8C" }], "Active": [{ "id": "8A" }], "Completed": "n/a" } }),
    ));
    assert_eq!(classes["items"], json!([{ "id": "8A" }, { "id": "8C" }]));

    let flat = result_of(request(
        &mut stdin,
        &mut reader,
        "3",
        "classes.normalize",
        json!({ "payload": { "data": [{ "id": "9B" }] } }),
    ));
    assert_eq!(flat["shape"], json!("flat"));
    assert_eq!(flat["items"], json!([{ "id": "9B" }]));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn normalize_grouped_follows_caller_order() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let res = result_of(request(
        &mut stdin,
        &mut reader,
        "1",
        "lists.normalizeGrouped",
        json!({
            "payload": { "paid": [{ "fee": 1 }], "overdue": [{ "fee": 2 }], "pending": [{ "fee": 3 }] },
            "groupOrder": ["overdue", "pending", "paid"]
        }),
    ));
    assert_eq!(res["shape"], json!("grouped"));
    assert_eq!(res["items"], json!([{ "fee": 2 }, { "fee": 3 }, { "fee": 1 }]));

    let missing = request(
        &mut stdin,
        &mut reader,
        "2",
        "lists.normalizeGrouped",
        json!({ "payload": [] }),
    );
    assert_eq!(missing["error"]["code"], json!("bad_params"));

    let wrong_type = request(
        &mut stdin,
        &mut reader,
        "3",
        "lists.normalizeGrouped",
        json!({ "payload": [], "groupOrder": "paid" }),
    );
    assert_eq!(wrong_type["error"]["code"], json!("bad_params"));

    let empty_order = request(
        &mut stdin,
        &mut reader,
        "4",
        "lists.normalizeGrouped",
        json!({ "payload": [], "groupOrder": [] }),
    );
    assert_eq!(empty_order["error"]["code"], json!("bad_params"));

    let repeated = request(
        &mut stdin,
        &mut reader,
        "4b",
        "lists.normalizeGrouped",
        json!({ "payload": { "paid": [{ "fee": 1 }] }, "groupOrder": ["paid", "overdue", "paid"] }),
    );
    assert_eq!(repeated["error"]["code"], json!("bad_params"));
    assert_eq!(repeated["error"]["details"]["index"], json!(2));

    let no_payload = request(
        &mut stdin,
        &mut reader,
        "5",
        "courses.normalize",
        json!({}),
    );
    assert_eq!(no_payload["error"]["code"], json!("bad_params"));

    drop(stdin);
    let _ = child.wait();
}
