mod test_support;

use serde_json::json;
use test_support::{find_ticket, request_ok, roster_json, spawn_sidecar, ticket_id};

// A failed refresh must not clear what an earlier fetch already cached; the
// stale value keeps serving reads.
#[test]
fn failed_refresh_keeps_previous_ledger_entry() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "rosters.load",
        json!({ "rosters": [roster_json(11, "9-A", 7, &[(1, "Ana")])] }),
    );
    let first = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.selectDate",
        json!({ "date": "5-03-2024" }),
    );
    let ticket = find_ticket(first.get("fetchPlan").unwrap(), "history", 1);
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "fetch.completeHistory",
        json!({
            "ticketId": ticket_id(&ticket),
            "records": [{
                "studentId": 1,
                "courseId": 5,
                "classId": 11,
                "date": "2024-03-01",
                "status": "ABSENT",
                "comment": "flu"
            }]
        }),
    );

    // Reload issues a fresh fan-out; fail the new history fetch.
    let reload = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "rosters.load",
        json!({ "rosters": [roster_json(11, "9-A", 7, &[(1, "Ana")])] }),
    );
    let retry = find_ticket(reload.get("fetchPlan").unwrap(), "history", 1);
    let ack = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "fetch.fail",
        json!({ "ticketId": ticket_id(&retry), "message": "timeout" }),
    );
    assert_eq!(ack.get("acknowledged").and_then(|v| v.as_bool()), Some(true));

    let slice = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "reports.ledgerSlice",
        json!({ "studentId": 1, "classId": 11, "courseId": 5 }),
    );
    let records = slice.get("records").and_then(|v| v.as_array()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("status").and_then(|v| v.as_str()), Some("ABSENT"));
    assert_eq!(records[0].get("comment").and_then(|v| v.as_str()), Some("flu"));
}

#[test]
fn failing_an_unknown_ticket_is_harmless() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let ack = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "fetch.fail",
        json!({ "ticketId": "no-such-ticket", "message": "timeout" }),
    );
    assert_eq!(ack.get("acknowledged").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(ack.get("stale").and_then(|v| v.as_bool()), Some(true));
}
