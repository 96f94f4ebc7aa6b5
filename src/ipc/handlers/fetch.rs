use crate::engine::{AttendanceRecord, Course, CourseStatistic, MergeOutcome};
use crate::ipc::error::{bad_params, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

/// Fetch-completion handlers. Each one is keyed by the ticket minted in the
/// fan-out; completions whose ticket is gone or tagged with a different date
/// are reported back as stale, never merged.

fn required_ticket_id(req: &Request) -> Result<String, serde_json::Value> {
    req.params
        .get("ticketId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| bad_params(&req.id, "missing ticketId"))
}

fn outcome_response(req: &Request, outcome: MergeOutcome) -> serde_json::Value {
    ok(&req.id, json!(outcome))
}

fn handle_complete_history(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ticket_id = match required_ticket_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(raw) = req.params.get("records") else {
        return bad_params(&req.id, "missing records");
    };
    let records: Vec<AttendanceRecord> = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, format!("records: {}", e)),
    };

    let outcome = state.engine.merge_history(&ticket_id, records);
    outcome_response(req, outcome)
}

fn handle_complete_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ticket_id = match required_ticket_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(raw) = req.params.get("stats") else {
        return bad_params(&req.id, "missing stats");
    };
    let stats: Vec<CourseStatistic> = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, format!("stats: {}", e)),
    };

    let outcome = state.engine.merge_stats(&ticket_id, stats);
    outcome_response(req, outcome)
}

fn handle_complete_courses(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ticket_id = match required_ticket_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(raw) = req.params.get("courses") else {
        return bad_params(&req.id, "missing courses");
    };
    let courses: Vec<Course> = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, format!("courses: {}", e)),
    };

    let outcome = state.engine.merge_courses(&ticket_id, courses);
    outcome_response(req, outcome)
}

/// A failed fetch only retires its ticket; the previous cache entry for that
/// key stays visible as not-yet-refreshed data.
fn handle_fail(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ticket_id = match required_ticket_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let message = req
        .params
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("fetch failed");

    match state.engine.fetch_failed(&ticket_id) {
        Some(ticket) => {
            log::warn!(
                "fetch {:?} for student {} (class {}) failed: {}",
                ticket.kind,
                ticket.student_id,
                ticket.class_id,
                message
            );
            ok(&req.id, json!({ "acknowledged": true }))
        }
        None => ok(&req.id, json!({ "acknowledged": true, "stale": true })),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "fetch.completeHistory" => Some(handle_complete_history(state, req)),
        "fetch.completeStats" => Some(handle_complete_stats(state, req)),
        "fetch.completeCourses" => Some(handle_complete_courses(state, req)),
        "fetch.fail" => Some(handle_fail(state, req)),
        _ => None,
    }
}
