//! Loading `SheetConfig` from disk.

#![cfg(feature = "config-file")]

use std::io::Write;

use pretty_assertions::assert_eq;
use snapsheet_core::Viewport;
use snapsheet_panel::{ConfigError, PanelError, SheetConfig, SnapPanel};

#[test]
fn toml_file_overrides_selected_fields() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "snap_points = [40.0, 60.0, 100.0]\nsettle_duration_ms = 180\nscroll_top_tolerance = 0.0"
    )
    .expect("write config");

    let config = SheetConfig::from_toml_file(file.path())
        .expect("parse")
        .validated()
        .expect("valid");
    assert_eq!(
        config,
        SheetConfig {
            snap_points: vec![40.0, 60.0, 100.0],
            settle_duration_ms: 180,
            scroll_top_tolerance: 0.0,
            ..SheetConfig::default()
        }
    );
}

#[test]
fn json_file_loads() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"close_threshold": 20.0, "open_height": 100.0}}"#).expect("write config");

    let config = SheetConfig::from_json_file(file.path()).expect("parse");
    assert_eq!(config.close_threshold, 20.0);
    assert_eq!(config.open_height, 100.0);
    assert!(config.validate().is_empty());
}

#[test]
fn invalid_file_config_is_rejected_by_panel() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "open_height = 75.0").expect("write config");

    let config = SheetConfig::from_toml_file(file.path()).expect("parse");
    let viewport = Viewport::new(390.0, 844.0).expect("valid viewport");
    let err = SnapPanel::new(config, viewport).expect_err("75 is not a snap point");
    assert!(matches!(
        err,
        PanelError::Config(ConfigError::Validation(ref errors)) if errors.len() == 1
    ));
}

#[test]
fn opened_panel_uses_configured_open_height() {
    let config = SheetConfig::from_toml_str("open_height = 100.0").expect("parse");
    let viewport = Viewport::new(390.0, 844.0).expect("valid viewport");
    let mut panel = SnapPanel::new(config, viewport).expect("valid config");
    panel.set_visible(true);
    assert_eq!(panel.height(), 100.0);
    assert!(panel.visual().square_corners);
}
