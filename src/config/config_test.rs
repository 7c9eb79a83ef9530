use serial_test::serial;
use temp_env::with_vars;

use super::*;
use crate::Error;

fn cleanup_all_docgate_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("DOCGATE__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = GateConfig::default();

    assert_eq!(config.watch.property_poll_interval_ms, 10);
    assert_eq!(config.watch.property_timeout_ms, 10_000);
    assert_eq!(config.watch.path_poll_interval_ms, 10);
    assert_eq!(config.watch.path_timeout_ms, 10_000);
    assert_eq!(config.loader.native_signature, "XLSY");
    assert_eq!(config.loader.reference_prefix, "binary_content://");
    assert_eq!(config.subsystems.base_api, "AscCommon.baseEditorsApi");
    assert_eq!(config.subsystems.fast_path_namespace, "AscCommon");
}

#[test]
#[serial]
fn default_config_should_pass_validation() {
    assert!(GateConfig::default().validate().is_ok());
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_docgate_env_vars();
    with_vars(
        vec![
            ("DOCGATE__WATCH__PATH_TIMEOUT_MS", Some("2500")),
            ("DOCGATE__LOADER__NATIVE_SIGNATURE", Some("DOCY")),
        ],
        || {
            let config = GateConfig::new().unwrap();

            assert_eq!(config.watch.path_timeout_ms, 2500);
            assert_eq!(config.loader.native_signature, "DOCY");
            // untouched sections keep their defaults
            assert_eq!(config.watch.path_poll_interval_ms, 10);
        },
    );
}

#[test]
#[serial]
fn new_should_read_file_named_by_config_path() {
    cleanup_all_docgate_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("gate.toml");
    std::fs::write(
        &config_path,
        r#"
        [subsystems]
        sdk = "Asc.asc_docs_api"

        [loader]
        title_update_delay_ms = 250
        "#,
    )
    .unwrap();

    with_vars(
        vec![("CONFIG_PATH", Some(config_path.to_str().unwrap()))],
        || {
            let config = GateConfig::new().unwrap();

            assert_eq!(config.subsystems.sdk, "Asc.asc_docs_api");
            assert_eq!(config.loader.title_update_delay_ms, 250);
            assert_eq!(config.subsystems.fonts, "AscFonts.FontPickerByCharacter");
        },
    );
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_docgate_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("override.toml");
    std::fs::write(
        &config_path,
        r#"
        [watch]
        path_poll_interval_ms = 25
        path_timeout_ms = 500
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = GateConfig::new().expect("success");
        let config = base_config
            .with_override_config(config_path.to_str().unwrap())
            .unwrap();

        assert_eq!(config.watch.path_poll_interval_ms, 25);
        assert_eq!(config.watch.path_timeout_ms, 500);
        assert_eq!(config.watch.property_poll_interval_ms, 10);
    });
}

#[test]
#[serial]
fn environment_should_win_over_override_file() {
    cleanup_all_docgate_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("override.toml");
    std::fs::write(&config_path, "[watch]\npath_timeout_ms = 500\n").unwrap();

    with_vars(
        vec![("DOCGATE__WATCH__PATH_TIMEOUT_MS", Some("700"))],
        || {
            let config = GateConfig::default()
                .with_override_config(config_path.to_str().unwrap())
                .unwrap();

            assert_eq!(config.watch.path_timeout_ms, 700);
        },
    );
}

#[test]
fn validation_should_reject_zero_poll_interval() {
    let mut config = GateConfig::default();
    config.watch.property_poll_interval_ms = 0;

    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn validation_should_reject_poll_interval_not_below_timeout() {
    let mut config = GateConfig::default();
    config.watch.path_poll_interval_ms = 100;
    config.watch.path_timeout_ms = 100;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_property_poll_not_below_ceiling() {
    let mut config = GateConfig::default();
    config.watch.property_poll_interval_ms = 50;
    config.watch.property_timeout_ms = 50;

    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn validation_should_reject_empty_signature() {
    let mut config = GateConfig::default();
    config.loader.native_signature.clear();

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_path_with_empty_segment() {
    let mut config = GateConfig::default();
    config.subsystems.fonts = "AscFonts..FontPickerByCharacter".to_string();

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("empty segment"));
}

#[test]
fn path_for_should_map_each_subsystem() {
    let paths = SubsystemPaths::default();

    assert_eq!(paths.path_for(crate::Subsystem::BaseApi), "AscCommon.baseEditorsApi");
    assert_eq!(paths.path_for(crate::Subsystem::Fonts), "AscFonts.FontPickerByCharacter");
    assert_eq!(paths.path_for(crate::Subsystem::Sdk), "Asc.spreadsheet_api");
}
