use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use super::*;
use crate::application::cli;

#[test]
fn test_parse_file_reads_known_keys() {
    let cmd = cli::build();
    let values = Config::parse_file(
        &cmd,
        r#"
server-url = "http://ebooks.internal:9000"
request-timeout-secs = 120
unknown-key = "ignored"
"#,
    )
    .unwrap();

    assert_eq!(
        values,
        vec![
            (ConfigKey::RequestTimeoutSecs, "120".to_string()),
            (
                ConfigKey::ServerUrl,
                "http://ebooks.internal:9000".to_string()
            ),
        ]
    );
}

#[test]
fn test_parse_file_rejects_invalid_possible_value() {
    let cmd = cli::build();
    let err = Config::parse_file(&cmd, r#"log-level = "loud""#).unwrap_err();

    assert!(err.to_string().contains("invalid value for key 'log-level'"));
}

#[test]
fn test_parse_file_skips_empty_strings() {
    let cmd = cli::build();
    let values = Config::parse_file(&cmd, r#"output-dir = """#).unwrap();

    assert!(values.is_empty());
}

#[test]
fn test_serialize_default_lists_every_option() {
    let cmd = cli::build();
    let toml_str = Config::serialize_default(&cmd);

    assert!(toml_str.contains("server-url = \"http://localhost:8000\""));
    assert!(toml_str.contains("request-timeout-secs = 600"));
    assert!(toml_str.contains("server-log-lines = 50"));
    assert!(toml_str.contains("[possible values: error, warn, info, debug, trace]"));
    assert!(!toml_str.contains("config-file ="));

    // The default file must load back cleanly.
    let uncommented = toml_str
        .lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(Config::parse_file(&cmd, &uncommented).is_ok());
}

#[tokio::test]
#[serial]
async fn test_load_layers_file_under_arguments() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "server-url = \"http://from-file:8000\"\nprogress-interval-ms = 1500"
    )
    .unwrap();

    let cmd = cli::build();
    let matches = cmd
        .clone()
        .try_get_matches_from([
            "ebook-term",
            "--config-file",
            file.path().to_str().unwrap(),
            "--server-url",
            "http://from-args:8000",
        ])
        .unwrap();

    Config::load(&cmd, vec![&matches]).await.unwrap();

    assert_eq!(Config::get(ConfigKey::ServerUrl), "http://from-args:8000");
    assert_eq!(Config::get(ConfigKey::ProgressIntervalMs), "1500");
    assert_eq!(Config::get(ConfigKey::LogPollIntervalMs), "2000");

    let controller_config = Config::controller_config().unwrap();
    assert_eq!(controller_config.progress_interval, Duration::from_millis(1500));
    assert_eq!(controller_config.request_timeout, Duration::from_secs(600));
    assert_eq!(controller_config.server_log_lines, 50);
}

#[tokio::test]
#[serial]
async fn test_load_rejects_non_numeric_values() {
    let cmd = cli::build();
    let matches = cmd
        .clone()
        .try_get_matches_from([
            "ebook-term",
            "--config-file",
            "/nonexistent/ebook-term.toml",
            "--request-timeout-secs",
            "ten",
        ])
        .unwrap();

    let err = Config::load(&cmd, vec![&matches]).await.unwrap_err();
    assert!(err.to_string().contains("request-timeout-secs"));
}

#[test]
#[serial]
fn test_controller_config_rejects_zero_lines() {
    Config::set(ConfigKey::ServerLogLines, "0");
    Config::set(ConfigKey::RequestTimeoutSecs, "600");
    Config::set(ConfigKey::ProgressIntervalMs, "3000");
    Config::set(ConfigKey::LogPollIntervalMs, "2000");

    assert!(Config::controller_config().is_err());
}

#[test]
#[serial]
fn test_controller_config_rejects_zero_periods() {
    for key in [
        ConfigKey::RequestTimeoutSecs,
        ConfigKey::ProgressIntervalMs,
        ConfigKey::LogPollIntervalMs,
    ] {
        Config::set(ConfigKey::ServerLogLines, "50");
        Config::set(ConfigKey::RequestTimeoutSecs, "600");
        Config::set(ConfigKey::ProgressIntervalMs, "3000");
        Config::set(ConfigKey::LogPollIntervalMs, "2000");
        Config::set(key, "0");

        let err = Config::controller_config().unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid value for '{key}': must be at least 1")
        );
    }
}
