//! End-to-end tests driving the sqlward binary.
//!
//! Each test runs the compiled binary in its own scratch directory with the
//! connection environment set per child process, so tests never race over
//! shared environment state.

use std::path::Path;
use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_sqlward");

fn run(db_path: &Path, dir: &Path, args: &[&str]) -> Output {
    Command::new(BIN)
        .env_remove("RUST_LOG")
        .env("SQLWARD_DATABASE_URL", db_path)
        .env("SQLWARD_AUTH_TOKEN", "test-token")
        .arg("--dir")
        .arg(dir)
        .args(args)
        .output()
        .expect("failed to spawn sqlward")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_missing_config_names_each_variable() {
    let tmp = tempfile::tempdir().unwrap();
    let output = Command::new(BIN)
        .env_remove("SQLWARD_DATABASE_URL")
        .env_remove("SQLWARD_AUTH_TOKEN")
        .current_dir(tmp.path())
        .arg("status")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("SQLWARD_DATABASE_URL"));

    let output = Command::new(BIN)
        .env("SQLWARD_DATABASE_URL", tmp.path().join("x.db"))
        .env_remove("SQLWARD_AUTH_TOKEN")
        .current_dir(tmp.path())
        .arg("status")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("SQLWARD_AUTH_TOKEN"));
}

#[test]
fn test_setup_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let db = tmp.path().join("app.db");
    let dir = tmp.path().join("migrations");

    let first = run(&db, &dir, &["setup"]);
    assert!(first.status.success(), "{}", stderr(&first));
    assert!(stdout(&first).contains("Schema created"));

    let second = run(&db, &dir, &["setup"]);
    assert!(second.status.success());
    assert!(stdout(&second).contains("already exists"));

    // The table really exists in the file.
    let conn = rusqlite::Connection::open(&db).unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='messages'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_create_up_status_down_flow() {
    let tmp = tempfile::tempdir().unwrap();
    let db = tmp.path().join("app.db");
    let dir = tmp.path().join("migrations");

    let created = run(&db, &dir, &["create", "add widgets"]);
    assert!(created.status.success(), "{}", stderr(&created));

    // Fill in the scaffolded pair.
    let up_path = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| p.to_string_lossy().ends_with(".up.sql"))
        .expect("scaffolded up file");
    std::fs::write(&up_path, "CREATE TABLE widgets (id INTEGER PRIMARY KEY);").unwrap();
    let down_path = up_path.to_string_lossy().replace(".up.sql", ".down.sql");
    std::fs::write(&down_path, "DROP TABLE widgets;").unwrap();

    let status = run(&db, &dir, &["status"]);
    assert!(status.status.success());
    assert!(stdout(&status).contains("pending"));
    assert!(stdout(&status).contains("0 applied, 1 pending."));

    // Bare invocation defaults to `up`.
    let up = run(&db, &dir, &[]);
    assert!(up.status.success(), "{}", stderr(&up));
    assert!(stdout(&up).contains("Applied 1 migration(s)."));

    let status = run(&db, &dir, &["status", "--format", "json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&status)).unwrap();
    assert_eq!(json["applied_count"], 1);
    assert_eq!(json["entries"][0]["applied"], true);

    let down = run(&db, &dir, &["down"]);
    assert!(down.status.success());
    assert!(stdout(&down).contains("Rolled back"));

    let again = run(&db, &dir, &["down"]);
    assert!(again.status.success());
    assert!(stdout(&again).contains("Nothing to roll back"));
}

#[test]
fn test_failed_migration_exits_nonzero_and_hides_detail() {
    let tmp = tempfile::tempdir().unwrap();
    let db = tmp.path().join("app.db");
    let dir = tmp.path().join("migrations");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("2025-08-08T12-00-00_bad.up.sql"), "THIS IS NOT SQL;").unwrap();

    let output = run(&db, &dir, &["up"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("migration '2025-08-08T12-00-00_bad' failed"));
    assert!(!err.contains("syntax error"));

    let verbose = run(&db, &dir, &["--verbose", "up"]);
    assert!(!verbose.status.success());
    assert!(stderr(&verbose).contains("caused by:"));
}

#[test]
fn test_reset_clears_data() {
    let tmp = tempfile::tempdir().unwrap();
    let db = tmp.path().join("app.db");
    let dir = tmp.path().join("migrations");

    assert!(run(&db, &dir, &["setup"]).status.success());
    let conn = rusqlite::Connection::open(&db).unwrap();
    conn.execute(
        "INSERT INTO messages (name, email, message) VALUES ('a', 'a@example.com', 'hi')",
        [],
    )
    .unwrap();
    drop(conn);

    let reset = run(&db, &dir, &["reset"]);
    assert!(reset.status.success(), "{}", stderr(&reset));

    let conn = rusqlite::Connection::open(&db).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
