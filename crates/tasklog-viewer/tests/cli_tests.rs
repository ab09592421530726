/*
[INPUT]:  tasklog-viewer binary, wiremock console backend, temp config
[OUTPUT]: Test results for dump and download subcommands
[POS]:    Integration tests - binary entry point
[UPDATE]: When CLI flags or subcommand output change
*/

use std::io::Write;
use std::process::Output;

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGS_PATH: &str = "/api/v1/project/123/jobs/42/tasks/run-9/logs";
const DOWNLOAD_PATH: &str = "/api/v1/project/123/jobs/42/tasks/run-9/logs/download";

fn write_config(server: &MockServer) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "base_url: \"{}\"\nproject_id: \"123\"\nstore:\n  initial_batch_size: 3\n  subsequent_batch_size: 3\n",
        server.uri()
    )
    .expect("write config");
    file
}

fn line(level: &str, message: &str) -> Value {
    json!({ "level": level, "message": message, "time": "2024-01-17T10:00:00Z" })
}

fn wrapped(logs: Vec<Value>, older_cursor: i64, has_more_older: bool) -> Value {
    json!({
        "success": true,
        "message": "ok",
        "data": {
            "logs": logs,
            "older_cursor": older_cursor,
            "newer_cursor": -1,
            "has_more_older": has_more_older,
            "has_more_newer": false,
        }
    })
}

async fn run_viewer(args: &[&str]) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_tasklog-viewer"))
        .args(args)
        .output()
        .await
        .expect("run tasklog-viewer")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_dump_walks_back_and_prints_oldest_first() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGS_PATH))
        .and(query_param("cursor", "-1"))
        .and(query_param("limit", "3"))
        .and(query_param("direction", "older"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wrapped(
            vec![
                line("info", "line 4"),
                line("warning", "line 5"),
                line("info", "line 6"),
            ],
            4,
            true,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(LOGS_PATH))
        .and(query_param("cursor", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wrapped(
            vec![line("debug", "line 2"), line("error", "line 3")],
            -1,
            false,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = write_config(&server);
    let config_path = config.path().to_string_lossy().to_string();
    let output = run_viewer(&[
        "--config",
        &config_path,
        "dump",
        "--job",
        "42",
        "--task",
        "run-9",
        "--file",
        "logs/sync.log",
        "--pages",
        "5",
    ])
    .await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout_lines(&output),
        [
            "2024-01-17 10:00:00 DEBUG line 2",
            "2024-01-17 10:00:00 ERROR line 3",
            "2024-01-17 10:00:00 INFO  line 4",
            "2024-01-17 10:00:00 WARN  line 5",
            "2024-01-17 10:00:00 INFO  line 6",
        ]
    );
}

#[tokio::test]
async fn test_dump_filters_errors_and_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(wrapped(
            vec![
                line("error", "Connection reset"),
                line("info", "connection opened"),
                line("fatal", "disk full"),
            ],
            -1,
            false,
        )))
        .mount(&server)
        .await;

    let config = write_config(&server);
    let config_path = config.path().to_string_lossy().to_string();
    let output = run_viewer(&[
        "--config",
        &config_path,
        "dump",
        "--job",
        "42",
        "--task",
        "run-9",
        "--file",
        "logs/sync.log",
        "--errors-only",
        "--search",
        "CONNECTION",
    ])
    .await;

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        ["2024-01-17 10:00:00 ERROR Connection reset"]
    );
}

#[tokio::test]
async fn test_dump_reports_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGS_PATH))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "log file not found" })),
        )
        .mount(&server)
        .await;

    let config = write_config(&server);
    let config_path = config.path().to_string_lossy().to_string();
    let output = run_viewer(&[
        "--config",
        &config_path,
        "dump",
        "--job",
        "42",
        "--task",
        "run-9",
        "--file",
        "logs/sync.log",
    ])
    .await;

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("log file not found"), "stderr: {stderr}");
}

#[tokio::test]
async fn test_download_writes_raw_file() {
    let server = MockServer::start().await;
    let body = "hello\nworld";
    Mock::given(method("GET"))
        .and(path(DOWNLOAD_PATH))
        .and(query_param("file_path", "logs/sync.log"))
        .and(header("range", "bytes=0-0"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("content-range", "bytes 0-0/11")
                .set_body_string("h"),
        )
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DOWNLOAD_PATH))
        .and(query_param("file_path", "logs/sync.log"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let config = write_config(&server);
    let config_path = config.path().to_string_lossy().to_string();
    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("sync.log");
    let out_path = out.to_string_lossy().to_string();
    let output = run_viewer(&[
        "--config",
        &config_path,
        "download",
        "--job",
        "42",
        "--task",
        "run-9",
        "--file",
        "logs/sync.log",
        "--out",
        &out_path,
    ])
    .await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(std::fs::read_to_string(&out).expect("downloaded file"), body);
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("11 bytes written"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "viewport:\n  scroll_threshold: 2.0\n").expect("write config");
    let config_path = file.path().to_string_lossy().to_string();
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_tasklog-viewer"))
        .args(["--config", config_path.as_str(), "dump"])
        .args(["--job", "1", "--task", "t", "--file", "f.log"])
        .output()
        .expect("run tasklog-viewer");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("scroll_threshold"));
}

#[tokio::test]
async fn test_project_id_flag_fills_empty_config_value() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOGS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(wrapped(
            vec![line("info", "line 1")],
            -1,
            false,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "base_url: \"{}\"\nproject_id: \"\"\n", server.uri()).expect("write config");
    let config_path = file.path().to_string_lossy().to_string();
    let output = run_viewer(&[
        "--config",
        &config_path,
        "--project-id",
        "123",
        "dump",
        "--job",
        "42",
        "--task",
        "run-9",
        "--file",
        "logs/sync.log",
    ])
    .await;

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_lines(&output), ["2024-01-17 10:00:00 INFO  line 1"]);
}
