use serial_test::serial;
use temp_env::with_vars;

use super::*;
use crate::Error;

fn cleanup_all_adapter_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("ADAPTER__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = AdapterConfig::default();

    assert_eq!(config.controller.workers, 2);
    assert_eq!(config.controller.max_retries, 5);
    assert_eq!(config.retry.base_delay_ms, 5);
    assert_eq!(config.retry.max_delay_ms, 1_000_000);
    assert_eq!(config.retry.qps, 10);
    assert_eq!(config.retry.burst, 100);
    assert!(config.server.enabled);
    assert!(!config.monitoring.prometheus_enabled);
    assert!(config.store.manifest_dir.is_none());
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_adapter_env_vars();
    with_vars(
        vec![
            ("ADAPTER__CONTROLLER__WORKERS", Some("8")),
            ("ADAPTER__RETRY__QPS", Some("50")),
        ],
        || {
            let config = AdapterConfig::new().unwrap();

            assert_eq!(config.controller.workers, 8);
            assert_eq!(config.retry.qps, 50);
            // untouched values keep their defaults
            assert_eq!(config.controller.max_retries, 5);
        },
    );
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_adapter_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("override.toml");

    std::fs::write(
        &config_path,
        r#"
        [controller]
        workers = 3

        [retry]
        base_delay_ms = 10
        max_delay_ms = 2000

        [store]
        manifest_dir = "/tmp/manifests"
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = AdapterConfig::new().expect("success");
        let config = base_config.with_override_config(config_path.to_str().unwrap()).unwrap();

        assert_eq!(config.controller.workers, 3);
        assert_eq!(config.retry.base_delay_ms, 10);
        assert_eq!(config.retry.max_delay_ms, 2000);
        assert_eq!(
            config.store.manifest_dir.as_deref().and_then(|p| p.to_str()),
            Some("/tmp/manifests")
        );
    });
}

#[test]
#[serial]
fn environment_variables_should_have_highest_priority() {
    cleanup_all_adapter_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("adapter.toml");
    std::fs::write(
        &config_path,
        r#"
        [controller]
        workers = 4
        "#,
    )
    .unwrap();

    with_vars(
        vec![
            ("CONFIG_PATH", Some(config_path.to_str().unwrap())),
            ("ADAPTER__CONTROLLER__WORKERS", Some("6")),
        ],
        || {
            let config = AdapterConfig::new().unwrap();
            assert_eq!(config.controller.workers, 6);
        },
    );
}

#[test]
#[serial]
fn missing_config_file_should_fail() {
    cleanup_all_adapter_env_vars();
    with_vars(
        vec![("CONFIG_PATH", Some("/definitely/not/here/adapter.toml"))],
        || {
            let result = AdapterConfig::new();
            assert!(matches!(result, Err(Error::Config(_))));
        },
    );
}

#[test]
fn validation_should_reject_zero_workers() {
    let mut config = AdapterConfig::default();
    config.controller.workers = 0;

    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn validation_should_reject_privileged_prometheus_port() {
    let mut config = AdapterConfig::default();
    config.monitoring.prometheus_enabled = true;
    config.monitoring.prometheus_port = 80;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_shared_server_and_metrics_port() {
    let mut config = AdapterConfig::default();
    config.monitoring.prometheus_enabled = true;
    config.monitoring.prometheus_port = 6443;

    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn validation_should_reject_empty_log_filter() {
    let mut config = AdapterConfig::default();
    config.log.filter = "  ".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn default_config_should_validate() {
    assert!(AdapterConfig::default().validate().is_ok());
}
