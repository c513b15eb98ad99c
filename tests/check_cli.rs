//! Full check-command runs against a stubbed tracker.

use assert_cmd::Command;
use predicates::str::contains;

fn work_package_body(id: u64, subject: &str) -> String {
    serde_json::json!({
        "id": id,
        "subject": subject,
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

#[test]
fn clean_report_exits_zero() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v3/work_packages/42")
        .with_status(200)
        .with_body(work_package_body(42, "修复登录缺陷"))
        .create();

    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("repcheck")
        .expect("binary")
        .arg("check")
        .arg("-")
        .arg("--handler")
        .arg("张三")
        .arg("--base-url")
        .arg(format!("{}/api/v3/work_packages", server.url()))
        .arg("--cookie")
        .arg("session=abc123")
        .arg("--week-of")
        .arg("2026-08-05")
        .current_dir(dir.path())
        .write_stdin("1.【3.5】ProjectA【修复登录缺陷】https://track.example/wp/42【3.5】\n")
        .assert()
        .success()
        .stdout(contains("valid: 1"));
}

#[test]
fn discrepancies_exit_three_with_reasons() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v3/work_packages/42")
        .with_status(200)
        .with_body(work_package_body(42, "完全不同的标题"))
        .create();

    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("repcheck")
        .expect("binary")
        .arg("check")
        .arg("-")
        .arg("--handler")
        .arg("张三")
        .arg("--base-url")
        .arg(format!("{}/api/v3/work_packages", server.url()))
        .arg("--cookie")
        .arg("session=abc123")
        .arg("--week-of")
        .arg("2026-08-05")
        .current_dir(dir.path())
        .write_stdin("1.【3.5】ProjectA【修复登录缺陷】https://track.example/wp/42【3.5】\n")
        .assert()
        .code(3)
        .stdout(contains("title mismatch"));
}

#[test]
fn lookup_failure_is_isolated_and_exits_three() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/api/v3/work_packages/42")
        .with_status(200)
        .with_body(work_package_body(42, "修复登录缺陷"))
        .create();
    server
        .mock("GET", "/api/v3/work_packages/7")
        .with_status(500)
        .create();

    let block = "\
1.【3.5】ProjectA【修复登录缺陷】https://track.example/wp/42【3.5】
2.【3.5】ProjectA【修复登录缺陷】https://track.example/wp/7【3.5】
";

    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("repcheck")
        .expect("binary")
        .arg("check")
        .arg("-")
        .arg("--handler")
        .arg("张三")
        .arg("--base-url")
        .arg(format!("{}/api/v3/work_packages", server.url()))
        .arg("--cookie")
        .arg("session=abc123")
        .arg("--week-of")
        .arg("2026-08-05")
        .current_dir(dir.path())
        .write_stdin(block)
        .assert()
        .code(3)
        // The good record still validates; the bad lookup is reported.
        .stdout(contains("valid: 1"))
        .stdout(contains("lookup failed for task 7"));
}

#[test]
fn bad_week_argument_is_a_user_error() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("repcheck")
        .expect("binary")
        .arg("check")
        .arg("-")
        .arg("--handler")
        .arg("张三")
        .arg("--cookie")
        .arg("session=abc123")
        .arg("--week-of")
        .arg("Aug 5")
        .current_dir(dir.path())
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(contains("--week-of"));
}
