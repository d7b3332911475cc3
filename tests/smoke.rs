//! Smoke tests -- verify the binary runs and the startup check is fatal.

mod common;

use assert_cmd::Command;
use common::{Reply, StatusApi};
use predicates::prelude::*;
use serde_json::json;

fn bot(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("homework-bot").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("PRACTICUM_TOKEN")
        .env_remove("TELEGRAM_TOKEN")
        .env_remove("TELEGRAM_CHAT_ID")
        .env_remove("HOMEWORK_BOT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let dir = tempfile::tempdir().unwrap();
    bot(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("homework review status"));
}

#[test]
fn test_cli_version() {
    let dir = tempfile::tempdir().unwrap();
    bot(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("homework-bot"));
}

#[test]
fn test_run_without_tokens_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    bot(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicates::str::contains("PRACTICUM_TOKEN"));
}

#[test]
fn test_check_tokens_reports_only_missing_names() {
    let dir = tempfile::tempdir().unwrap();
    bot(&dir)
        .arg("check-tokens")
        .env("PRACTICUM_TOKEN", "p")
        .env("TELEGRAM_TOKEN", "t")
        .assert()
        .failure()
        .stderr(predicates::str::contains("TELEGRAM_CHAT_ID"))
        .stderr(predicates::str::contains("PRACTICUM_TOKEN").not());
}

#[test]
fn test_check_tokens_succeeds_when_all_set() {
    let dir = tempfile::tempdir().unwrap();
    bot(&dir)
        .arg("check-tokens")
        .env("PRACTICUM_TOKEN", "p")
        .env("TELEGRAM_TOKEN", "t")
        .env("TELEGRAM_CHAT_ID", "42")
        .assert()
        .success()
        .stdout(predicates::str::contains("All tokens are set."));
}

#[test]
fn test_dotenv_file_supplies_tokens() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "PRACTICUM_TOKEN=p\nTELEGRAM_TOKEN=t\nTELEGRAM_CHAT_ID=42\n",
    )
    .unwrap();
    bot(&dir).arg("check-tokens").assert().success();
}

#[test]
fn test_log_file_is_written() {
    let dir = tempfile::tempdir().unwrap();
    bot(&dir).arg("check-tokens").assert().failure();
    let log = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
    assert!(log.contains("required tokens are not set"));
}

fn with_tokens(cmd: &mut Command) -> &mut Command {
    cmd.env("PRACTICUM_TOKEN", "p-token")
        .env("TELEGRAM_TOKEN", "t")
        .env("TELEGRAM_CHAT_ID", "42")
}

/// Write a config that points the status client at `endpoint` and keeps logs off disk.
fn status_config(dir: &tempfile::TempDir, endpoint: &str) -> std::path::PathBuf {
    let path = dir.path().join("bot.toml");
    std::fs::write(
        &path,
        format!("[api]\nendpoint = \"{}\"\n\n[logging]\nfile = \"\"\n", endpoint),
    )
    .unwrap();
    path
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_prints_latest_verdict() {
    let api = StatusApi::new(vec![Reply::Json(json!({
        "homeworks": [{"homework_name": "proj1", "status": "approved"}],
        "current_date": 1700000100
    }))]);
    let endpoint = api.start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = status_config(&dir, &endpoint);

    with_tokens(&mut bot(&dir))
        .arg("--config")
        .arg(&config)
        .args(["status", "--from-date", "1700000000"])
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Изменился статус проверки работы \"proj1\": Работа проверена: ревьюеру всё понравилось. Ура!",
        ))
        .stdout(predicates::str::contains("current_date: 1700000100"));

    let seen = api.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].from_date.as_deref(), Some("1700000000"));
    assert_eq!(seen[0].authorization.as_deref(), Some("OAuth p-token"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_reports_no_updates() {
    let api = StatusApi::new(vec![Reply::Json(json!({"homeworks": []}))]);
    let endpoint = api.start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = status_config(&dir, &endpoint);

    with_tokens(&mut bot(&dir))
        .arg("--config")
        .arg(&config)
        .args(["status", "--from-date", "1700000000"])
        .assert()
        .success()
        .stdout(predicates::str::contains("No updates since 1700000000."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_fails_on_unavailable_api() {
    let api = StatusApi::new(vec![Reply::Status(503)]);
    let endpoint = api.start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = status_config(&dir, &endpoint);

    with_tokens(&mut bot(&dir))
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicates::str::contains("503"));
}

#[test]
fn test_config_from_env_var_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elsewhere.toml");
    std::fs::write(&path, "[logging]\nfile = \"from-env.log\"\n").unwrap();

    with_tokens(&mut bot(&dir))
        .env("HOMEWORK_BOT_CONFIG", &path)
        .arg("check-tokens")
        .assert()
        .success();

    assert!(dir.path().join("from-env.log").exists());
    assert!(!dir.path().join("log.txt").exists());
}

#[test]
fn test_local_config_file_is_used() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("homework-bot.toml"),
        "[logging]\nfile = \"local.log\"\n",
    )
    .unwrap();

    with_tokens(&mut bot(&dir)).arg("check-tokens").assert().success();

    assert!(dir.path().join("local.log").exists());
    assert!(!dir.path().join("log.txt").exists());
}

#[test]
fn test_broken_env_config_is_logged_and_defaults_apply() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[logging\nfile = ").unwrap();

    with_tokens(&mut bot(&dir))
        .env("HOMEWORK_BOT_CONFIG", &path)
        .arg("check-tokens")
        .assert()
        .success()
        .stderr(predicates::str::contains("could not be loaded"));

    assert!(dir.path().join("log.txt").exists());
}
