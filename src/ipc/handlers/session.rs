use crate::engine::EditError;
use crate::ipc::error::{bad_params, err, ok};
use crate::ipc::types::{AppState, Request};
use crate::{dates, status};
use serde_json::json;

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Display form for the header; a malformed stored date is surfaced raw
/// rather than failing the whole response.
fn display_or_raw(canonical: &str) -> String {
    dates::display(canonical).unwrap_or_else(|e| e.raw)
}

fn handle_select_date(state: &mut AppState, req: &Request) -> serde_json::Value {
    let date = match req.params.get("date").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return bad_params(&req.id, "missing date"),
    };

    match state.engine.select_date(&date) {
        Ok(plan) => {
            let selected = state.engine.selected_date().to_string();
            ok(
                &req.id,
                json!({
                    "selectedDate": selected,
                    "display": display_or_raw(&selected),
                    "locked": state.engine.is_locked(today()),
                    "fetchPlan": plan
                }),
            )
        }
        Err(e) => err(
            &req.id,
            "bad_date",
            e.to_string(),
            Some(json!({ "raw": e.raw })),
        ),
    }
}

fn handle_snapshot(state: &mut AppState, req: &Request) -> serde_json::Value {
    let engine = &state.engine;
    let mut entries = Vec::new();
    for roster in engine.rosters() {
        for student in &roster.students {
            let entry = engine.session_entry(student.id);
            entries.push(json!({
                "studentId": student.id,
                "name": student.name,
                "classId": roster.id,
                "status": entry
                    .map(|e| e.status.clone())
                    .unwrap_or_else(|| status::DISPLAY_PRESENT.to_string()),
                "comment": entry.map(|e| e.comment.clone()).unwrap_or_default()
            }));
        }
    }

    let selected = engine.selected_date().to_string();
    ok(
        &req.id,
        json!({
            "selectedDate": selected,
            "display": display_or_raw(&selected),
            "locked": engine.is_locked(today()),
            "statusMessage": engine.status_message(),
            "statusOptions": status::DISPLAY_OPTIONS,
            "entries": entries
        }),
    )
}

fn edit_error(req: &Request, e: EditError) -> serde_json::Value {
    match e {
        EditError::DateLocked => err(
            &req.id,
            "date_locked",
            "selected date is in the past",
            None,
        ),
        EditError::UnknownStudent => err(&req.id, "not_found", "student not in roster", None),
    }
}

fn handle_set_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(student_id) = req.params.get("studentId").and_then(|v| v.as_i64()) else {
        return bad_params(&req.id, "missing studentId");
    };
    let Some(status_display) = req.params.get("status").and_then(|v| v.as_str()) else {
        return bad_params(&req.id, "missing status");
    };

    match state.engine.set_status(student_id, status_display, today()) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => edit_error(req, e),
    }
}

fn handle_set_comment(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(student_id) = req.params.get("studentId").and_then(|v| v.as_i64()) else {
        return bad_params(&req.id, "missing studentId");
    };
    let Some(comment) = req.params.get("comment").and_then(|v| v.as_str()) else {
        return bad_params(&req.id, "missing comment");
    };

    match state.engine.set_comment(student_id, comment, today()) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => edit_error(req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.selectDate" => Some(handle_select_date(state, req)),
        "session.snapshot" => Some(handle_snapshot(state, req)),
        "session.setStatus" => Some(handle_set_status(state, req)),
        "session.setComment" => Some(handle_set_comment(state, req)),
        _ => None,
    }
}
