#![allow(dead_code)]

use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_attendd"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn attendd sidecar");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let req = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", req).expect("write request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response");
    serde_json::from_str(&line).expect("parse response")
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let resp = request(stdin, reader, id, method, params);
    assert_eq!(
        resp.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "expected ok response, got: {}",
        resp
    );
    resp.get("result").cloned().expect("result")
}

pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let resp = request(stdin, reader, id, method, params);
    assert_eq!(
        resp.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "expected error response, got: {}",
        resp
    );
    resp.get("error").cloned().expect("error")
}

pub fn roster_json(id: i64, name: &str, teacher_id: i64, students: &[(i64, &str)]) -> serde_json::Value {
    let students: Vec<serde_json::Value> = students
        .iter()
        .map(|(sid, sname)| json!({ "id": sid, "name": sname }))
        .collect();
    json!({ "id": id, "name": name, "teacherId": teacher_id, "students": students })
}

/// Pull one ticket out of a returned fetch plan.
pub fn find_ticket(plan: &serde_json::Value, kind: &str, student_id: i64) -> serde_json::Value {
    plan.as_array()
        .expect("fetchPlan array")
        .iter()
        .find(|t| {
            t.get("kind").and_then(|v| v.as_str()) == Some(kind)
                && t.get("studentId").and_then(|v| v.as_i64()) == Some(student_id)
        })
        .cloned()
        .unwrap_or_else(|| panic!("no {} ticket for student {}", kind, student_id))
}

pub fn ticket_id(ticket: &serde_json::Value) -> String {
    ticket
        .get("id")
        .and_then(|v| v.as_str())
        .expect("ticket id")
        .to_string()
}

/// Picker-callback form (`d-MM-yyyy`, day unpadded) for a date `offset` days
/// from today, matching what the date-picker collaborator emits.
pub fn picker_date_from_today(offset: i64) -> String {
    let date = chrono::Local::now().date_naive() + chrono::Duration::days(offset);
    format!("{}", date.format("%-d-%m-%Y"))
}

pub fn canonical_date_from_today(offset: i64) -> String {
    let date = chrono::Local::now().date_naive() + chrono::Duration::days(offset);
    format!("{}", date.format("%Y-%m-%d"))
}
