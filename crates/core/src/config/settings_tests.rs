// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn empty_config_uses_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.app_id, "kad");
    assert!(config.inhibit_on_start);
    assert!(BackendId::ALL.iter().all(|b| config.is_enabled(*b)));
}

#[test]
fn full_config_parses() {
    let config = Config::parse(
        r#"
app_id = "player"
reason = "Playing music"
inhibit_on_start = false
disabled_backends = ["mate-session", "login1"]
log_file = "/tmp/kad.log"
"#,
    )
    .unwrap();

    assert_eq!(config.app_id, "player");
    assert_eq!(config.reason, "Playing music");
    assert!(!config.inhibit_on_start);
    assert!(config.is_enabled(BackendId::GnomeSession));
    assert!(!config.is_enabled(BackendId::MateSession));
    assert!(!config.is_enabled(BackendId::Login1));
    assert_eq!(config.log_file, Some(PathBuf::from("/tmp/kad.log")));
}

#[test]
fn unknown_key_is_rejected() {
    assert!(Config::parse("cookie = 3").is_err());
}

#[test]
fn unknown_backend_is_rejected() {
    assert!(Config::parse(r#"disabled_backends = ["upower"]"#).is_err());
}

#[test]
fn missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("config.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn load_reads_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"reason = "Backing up""#).unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.reason, "Backing up");
}

#[test]
fn load_reports_path_on_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "inhibit_on_start = \"yes\"").unwrap();

    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}
