use super::{Settings, default_name, load_config};
use crate::utils::error::MqError;
use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

// Runs `f` with the working directory switched to a fresh temp dir, so
// load_config never sees a real config/default.toml.
fn in_temp_dir<F: FnOnce(&TempDir)>(f: F) {
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");
    f(&tmp);
    env::set_current_dir(orig).expect("restore cwd");
}

#[test]
fn test_default_settings() {
    temp_env::with_var("USER", Some("alice"), || {
        let settings = Settings::default();
        assert_eq!(settings.broker.host, "127.0.0.1");
        assert_eq!(settings.broker.port, 9000);
        assert_eq!(settings.client.name, "alice");
        assert_eq!(settings.client.retry_interval(), Duration::from_millis(250));
        assert_eq!(settings.client.poll_interval(), Duration::from_millis(100));
        assert_eq!(settings.client.io_timeout(), None);
        assert_eq!(settings.logging.level, "info");
    });
}

#[test]
fn test_default_name_without_user() {
    temp_env::with_var_unset("USER", || {
        let name = default_name();
        assert!(name.starts_with("client-"));
        assert_ne!(name, default_name());
    });
}

#[test]
#[serial]
fn test_load_config_without_sources_uses_defaults() {
    in_temp_dir(|_| {
        temp_env::with_var("USER", Some("bob"), || {
            let cfg = load_config().expect("load_config failed");
            assert_eq!(cfg, Settings::default());
        });
    });
}

#[test]
#[serial]
fn test_load_config_from_file_overrides_defaults() {
    in_temp_dir(|_| {
        fs::create_dir_all("config").expect("create config dir");
        let toml = r#"
            [broker]
            host = "broker.local"
            port = 9123

            [client]
            name = "pbaz"
            io_timeout_ms = 1500
        "#;
        fs::write("config/default.toml", toml).expect("write config file");

        let cfg = load_config().expect("load_config failed");
        assert_eq!(cfg.broker.host, "broker.local");
        assert_eq!(cfg.broker.port, 9123);
        assert_eq!(cfg.client.name, "pbaz");
        assert_eq!(cfg.client.io_timeout(), Some(Duration::from_millis(1500)));
        // untouched fields keep their defaults
        assert_eq!(cfg.client.retry_interval_ms, 250);
        assert_eq!(cfg.logging.level, "info");
    });
}

#[test]
#[serial]
fn test_load_config_from_environment() {
    in_temp_dir(|_| {
        temp_env::with_vars(
            [
                ("MQ_BROKER__PORT", Some("9444")),
                ("MQ_CLIENT__POLL_INTERVAL_MS", Some("5")),
                ("MQ_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let cfg = load_config().expect("load_config failed");
                assert_eq!(cfg.broker.port, 9444);
                assert_eq!(cfg.client.poll_interval_ms, 5);
                assert_eq!(cfg.logging.level, "debug");
                assert_eq!(cfg.broker.host, "127.0.0.1");
            },
        );
    });
}

#[test]
#[serial]
fn test_load_config_rejects_bad_values() {
    in_temp_dir(|_| {
        fs::create_dir_all("config").expect("create config dir");
        fs::write("config/default.toml", "[broker]\nport = \"not-a-port\"\n")
            .expect("write config file");

        let err = load_config().expect_err("bad port should fail");
        assert!(matches!(err, MqError::Config(_)));
        assert!(err.to_string().starts_with("config error: "));
    });
}
