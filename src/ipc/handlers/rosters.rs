use crate::engine::{ClassRoster, Course};
use crate::ipc::error::{bad_params, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

/// Feed the result of the host's roster fetch into the engine. The response
/// carries the fetch plan the host must execute next, plus the teacherId it
/// needs to fetch the course catalog.
fn handle_rosters_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("rosters") else {
        return bad_params(&req.id, "missing rosters");
    };
    let rosters: Vec<ClassRoster> = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, format!("rosters: {}", e)),
    };

    let plan = state.engine.load_rosters(rosters);
    ok(
        &req.id,
        json!({
            "teacherId": state.engine.teacher_id(),
            "fetchPlan": plan
        }),
    )
}

fn handle_courses_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("courses") else {
        return bad_params(&req.id, "missing courses");
    };
    let courses: Vec<Course> = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, format!("courses: {}", e)),
    };

    let count = courses.len();
    state.engine.load_catalog(courses);
    ok(&req.id, json!({ "courseCount": count }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "rosters.load" => Some(handle_rosters_load(state, req)),
        "courses.load" => Some(handle_courses_load(state, req)),
        _ => None,
    }
}
