use crate::dates;
use crate::ipc::error::{bad_params, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

struct SliceKey {
    student_id: i64,
    class_id: i64,
    course_id: i64,
}

fn slice_key(req: &Request) -> Result<SliceKey, serde_json::Value> {
    let get = |key: &str| req.params.get(key).and_then(|v| v.as_i64());
    let student_id = get("studentId").ok_or_else(|| bad_params(&req.id, "missing studentId"))?;
    let class_id = get("classId").ok_or_else(|| bad_params(&req.id, "missing classId"))?;
    let course_id = get("courseId").ok_or_else(|| bad_params(&req.id, "missing courseId"))?;
    Ok(SliceKey {
        student_id,
        class_id,
        course_id,
    })
}

/// History rows for one (student, class, course), with the single-line
/// localized date form attached for the report renderer.
fn handle_ledger_slice(state: &mut AppState, req: &Request) -> serde_json::Value {
    let key = match slice_key(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let records: Vec<serde_json::Value> = state
        .engine
        .history_slice(key.student_id, key.class_id, key.course_id)
        .into_iter()
        .map(|r| {
            let display_date =
                dates::display_single_line(&r.date).unwrap_or_else(|e| e.raw);
            json!({
                "studentId": r.student_id,
                "courseId": r.course_id,
                "classId": r.class_id,
                "date": r.date,
                "displayDate": display_date,
                "status": r.status,
                "comment": r.comment
            })
        })
        .collect();
    let courses = state.engine.courses_for_student(key.student_id);

    ok(
        &req.id,
        json!({
            "records": records,
            "courses": courses
        }),
    )
}

fn handle_stats_slice(state: &mut AppState, req: &Request) -> serde_json::Value {
    let key = match slice_key(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let stats = state
        .engine
        .stats_slice(key.student_id, key.class_id, key.course_id);
    ok(&req.id, json!({ "stats": stats }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.ledgerSlice" => Some(handle_ledger_slice(state, req)),
        "reports.statsSlice" => Some(handle_stats_slice(state, req)),
        _ => None,
    }
}
