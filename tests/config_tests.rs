use std::io::Write;
use std::time::Duration;
use vishing_guard::config::{NotifierBackendKind, RecognitionBackendKind};
use vishing_guard::{Config, ControllerConfig};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const MINIMAL: &str = r#"
[service]
name = "vishing-guard"

[service.http]
bind = "127.0.0.1"
port = 8088
"#;

#[test]
fn test_minimal_config_uses_defaults() {
    let file = write_config(MINIMAL);
    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();

    assert_eq!(cfg.service.name, "vishing-guard");
    assert_eq!(cfg.service.http.port, 8088);

    assert_eq!(cfg.recognition.backend, RecognitionBackendKind::Nats);
    assert_eq!(cfg.recognition.language, "ko-KR");
    assert_eq!(cfg.recognition.session_timeout(), Duration::from_secs(30));

    assert_eq!(cfg.analysis.model, "gemini-pro");
    assert_eq!(cfg.analysis.top_k, 1);
    assert_eq!(cfg.analysis.max_output_tokens, 2048);
    assert_eq!(cfg.analysis.timeout(), Duration::from_secs(30));

    assert_eq!(cfg.notifier.backend, NotifierBackendKind::Log);
    assert_eq!(cfg.notifier.channel_id, "VoicePhishingChannel");

    let controller = ControllerConfig::from(&cfg.controller);
    assert_eq!(controller.grace_delay, Duration::from_secs(2));
    assert_eq!(controller.log_capacity, None);
}

#[test]
fn test_sections_override_defaults() {
    let file = write_config(&format!(
        r#"{}
[recognition]
backend = "stdin"

[controller]
grace_delay_ms = 500
log_capacity = 50

[notifier]
backend = "nats"
"#,
        MINIMAL
    ));
    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();

    assert_eq!(cfg.recognition.backend, RecognitionBackendKind::Stdin);
    // Unset keys in a present section still default
    assert_eq!(cfg.recognition.language, "ko-KR");
    assert_eq!(cfg.notifier.backend, NotifierBackendKind::Nats);

    let controller = ControllerConfig::from(&cfg.controller);
    assert_eq!(controller.grace_delay, Duration::from_millis(500));
    assert_eq!(controller.log_capacity, Some(50));
}

#[test]
fn test_environment_overrides_file() {
    let file = write_config(MINIMAL);
    std::env::set_var("VISHING_GUARD_ANALYSIS__API_KEY", "from-env");

    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();
    std::env::remove_var("VISHING_GUARD_ANALYSIS__API_KEY");

    assert_eq!(cfg.analysis.api_key, "from-env");
}

#[test]
fn test_missing_service_section_is_error() {
    let file = write_config("[controller]\ngrace_delay_ms = 100\n");
    assert!(Config::load(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_missing_file_is_error() {
    assert!(Config::load("/nonexistent/vishing-guard").is_err());
}

#[test]
fn test_shipped_config_loads() {
    let cfg = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config/vishing-guard")).unwrap();
    assert_eq!(cfg.service.name, "vishing-guard");
    assert_eq!(cfg.analysis.temperature, 0.9);
}
