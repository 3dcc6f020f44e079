// Profile loading and translation, against config files in a tempdir.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;

use catalog_config::{
    Config, ConfigError, Profile, load_config_from, profile_to_controller_config, save_config_to,
};
use catalog_core::{ImageCleanup, StaleCompletionPolicy, TlsVerification};

const SAMPLE: &str = r#"
default_profile = "local"

[defaults]
timeout = 12
recent_items = 5

[profiles.local]
server = "http://localhost:5000"
refresh_interval = 30
stale_completions = "suppress"
image_cleanup = "retain"

[profiles.staging]
server = "https://catalog.example.com/app"
ca_cert = "/etc/catalog/ca.pem"
timeout = 90
"#;

fn write_sample() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    (dir, path)
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    assert_eq!(cfg.defaults.output, "table");
    assert_eq!(cfg.defaults.recent_items, 10);
    assert!(cfg.profiles.is_empty());
}

#[test]
fn profiles_load_from_toml() {
    let (_dir, path) = write_sample();
    let cfg = load_config_from(&path).unwrap();

    assert_eq!(cfg.default_profile.as_deref(), Some("local"));
    assert_eq!(cfg.profile_names(), vec!["local", "staging"]);
    let local = cfg.profile("local").unwrap();
    assert_eq!(local.stale_completions, Some(StaleCompletionPolicy::Suppress));
    assert_eq!(local.image_cleanup, Some(ImageCleanup::Retain));
    assert_eq!(cfg.defaults.timeout, 12);
}

#[test]
fn profile_translates_to_controller_config() {
    let (_dir, path) = write_sample();
    let cfg = load_config_from(&path).unwrap();

    let local =
        profile_to_controller_config(cfg.profile("local").unwrap(), "local", &cfg.defaults)
            .unwrap();
    assert_eq!(local.url.as_str(), "http://localhost:5000/");
    assert_eq!(local.timeout, Duration::from_secs(12));
    assert_eq!(local.refresh_interval_secs, 30);
    assert_eq!(local.recent_items_limit, 5);
    assert_eq!(local.stale_completions, StaleCompletionPolicy::Suppress);
    assert_eq!(local.image_cleanup, ImageCleanup::Retain);
    assert_eq!(local.user_id, None);

    let staging =
        profile_to_controller_config(cfg.profile("staging").unwrap(), "staging", &cfg.defaults)
            .unwrap();
    assert_eq!(staging.timeout, Duration::from_secs(90));
    assert_eq!(
        staging.tls,
        TlsVerification::CustomCa("/etc/catalog/ca.pem".into())
    );
    assert_eq!(staging.stale_completions, StaleCompletionPolicy::Apply);
}

#[test]
fn insecure_wins_over_ca_cert() {
    let profile = Profile {
        server: "https://catalog.test".into(),
        ca_cert: Some("/etc/catalog/ca.pem".into()),
        insecure: Some(true),
        ..Profile::default()
    };
    let config =
        profile_to_controller_config(&profile, "insecure", &Config::default().defaults).unwrap();
    assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
}

#[test]
fn invalid_server_url_is_rejected() {
    let profile = Profile {
        server: "not a url".into(),
        ..Profile::default()
    };
    let err =
        profile_to_controller_config(&profile, "broken", &Config::default().defaults).unwrap_err();
    match err {
        ConfigError::Validation { field, .. } => assert_eq!(field, "server"),
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.profiles.insert(
        "default".into(),
        Profile {
            server: "http://localhost:5000".into(),
            user_id: Some(4),
            image_cleanup: Some(ImageCleanup::Retain),
            ..Profile::default()
        },
    );
    save_config_to(&path, &cfg).unwrap();

    let loaded = load_config_from(&path).unwrap();
    let profile = loaded.profile("default").unwrap();
    assert_eq!(profile.user_id, Some(4));
    assert_eq!(profile.image_cleanup, Some(ImageCleanup::Retain));
}
