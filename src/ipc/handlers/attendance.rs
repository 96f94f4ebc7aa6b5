use crate::ipc::error::{bad_params, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

/// The full command list for `submitBulkAttendance`, roster order then
/// student order. The host submits it as one unit; partial failure is the
/// remote service's contract.
fn handle_build_bulk(state: &mut AppState, req: &Request) -> serde_json::Value {
    let commands = state.engine.build_bulk_commands();
    ok(
        &req.id,
        json!({
            "count": commands.len(),
            "commands": commands
        }),
    )
}

fn handle_submit_succeeded(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(saved_count) = req.params.get("savedCount").and_then(|v| v.as_i64()) else {
        return bad_params(&req.id, "missing savedCount");
    };

    state.engine.submission_succeeded(saved_count);
    log::info!("bulk attendance submitted, {} records saved", saved_count);
    ok(
        &req.id,
        json!({ "statusMessage": state.engine.status_message() }),
    )
}

fn handle_submit_failed(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(message) = req.params.get("message").and_then(|v| v.as_str()) else {
        return bad_params(&req.id, "missing message");
    };

    state.engine.submission_failed(message);
    log::warn!("bulk attendance submission failed: {}", message);
    ok(
        &req.id,
        json!({ "statusMessage": state.engine.status_message() }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.buildBulk" => Some(handle_build_bulk(state, req)),
        "attendance.submitSucceeded" => Some(handle_submit_succeeded(state, req)),
        "attendance.submitFailed" => Some(handle_submit_failed(state, req)),
        _ => None,
    }
}
