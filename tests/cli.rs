use assert_cmd::Command;
use predicates::prelude::*;

fn guard() -> Command {
    Command::cargo_bin("sql-write-guard").expect("binary should build")
}

#[test]
fn test_read_only_query() {
    guard()
        .write_stdin("select * from users")
        .assert()
        .success()
        .stdout(predicate::str::contains("read-only"));
}

#[test]
fn test_write_query_exits_with_write_status() {
    guard()
        .write_stdin("insert into users values (1)")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("write: INSERT"));
}

#[test]
fn test_empty_input() {
    guard()
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no SQL input provided"));
}

#[test]
fn test_query_argument() {
    guard()
        .args(["--query", "SELECT 1; DROP TABLE t"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("DROP"));
}

#[test]
fn test_json_output() {
    let output = guard()
        .args(["--format", "json"])
        .write_stdin("WITH d AS (DELETE FROM t RETURNING *) SELECT * FROM d")
        .output()
        .expect("failed to run");
    assert_eq!(output.status.code(), Some(3));

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["contains_write"], true);
    assert_eq!(value["has_cte_write"], true);
    assert_eq!(
        value["write_operations"],
        serde_json::json!(["DELETE", "CTE_WRITE"])
    );
}

#[test]
fn test_cte_scan_keyword_mode() {
    let sql = "WITH x AS (SELECT created_at FROM t) SELECT * FROM x";

    guard().write_stdin(sql).assert().code(3);

    guard()
        .args(["--cte-scan", "keyword"])
        .write_stdin(sql)
        .assert()
        .success()
        .stdout(predicate::str::contains("read-only"));
}

#[test]
fn test_too_deep_input_is_rejected() {
    guard()
        .args(["--max-depth", "2"])
        .write_stdin("SELECT (((1)))")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("write status unknown"));
}

#[test]
fn test_invalid_cte_scan_is_usage_error() {
    guard()
        .args(["--cte-scan", "bogus"])
        .write_stdin("SELECT 1")
        .assert()
        .code(2);
}
