//! HTTP task source tests against a stubbed tracker.

use std::time::Duration;

use repcheck::source::{HttpTaskSource, LookupError, TaskSource};

fn work_package_body(id: u64) -> String {
    serde_json::json!({
        "id": id,
        "subject": "Fix login bug",
        "estimatedTime": "PT3H30M",
        "startDate": "2026-08-03",
        "dueDate": "2026-08-05",
        "customField1": "3.5",
        "description": {"html": "<p class=\"op-uc-p\">预估工时/时长：3.5</p>"},
        "_embedded": {
            "status": {"name": "已完成"},
            "project": {"name": "ProjectA"},
            "responsible": {"name": "张三"},
            "type": {"name": "任务"}
        }
    })
    .to_string()
}

fn source_for(server: &mockito::ServerGuard) -> HttpTaskSource {
    HttpTaskSource::new(
        &format!("{}/api/v3/work_packages", server.url()),
        "session=abc123",
        Duration::from_secs(5),
    )
    .expect("client should build")
}

#[test]
fn fetch_decodes_a_work_package() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v3/work_packages/42")
        .match_header("cookie", "session=abc123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(work_package_body(42))
        .create();

    let record = source_for(&server).fetch(42).expect("fetch should succeed");
    mock.assert();

    assert_eq!(record.id, 42);
    assert_eq!(record.subject, "Fix login bug");
    assert_eq!(record.status, "已完成");
    assert_eq!(record.responsible, "张三");
    assert_eq!(record.completed_hours, 3.5);
}

#[test]
fn non_success_status_maps_to_status_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v3/work_packages/7")
        .with_status(404)
        .create();

    let err = source_for(&server).fetch(7).expect_err("404 should fail");
    assert!(matches!(err, LookupError::Status(404)));
}

#[test]
fn malformed_body_maps_to_payload_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v3/work_packages/7")
        .with_status(200)
        .with_body("{\"id\": 7}")
        .create();

    let err = source_for(&server)
        .fetch(7)
        .expect_err("missing keys should fail");
    assert!(matches!(err, LookupError::Payload(_)));
}

#[test]
fn unreachable_server_maps_to_transport_error() {
    // Nothing listens on this port.
    let source = HttpTaskSource::new(
        "http://127.0.0.1:1/api/v3/work_packages",
        "session=abc123",
        Duration::from_secs(1),
    )
    .expect("client should build");

    let err = source.fetch(1).expect_err("connection should fail");
    assert!(matches!(err, LookupError::Transport(_)));
}
