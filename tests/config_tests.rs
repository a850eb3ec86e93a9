use signage_player::config::Configuration;
use signage_player::error::ConfigError;
use signage_player::render::transition::TransitionStyle;
use signage_player::sequence::{ItemKind, MediaKind};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
title: "Lobby loop"
media-root: "/srv/signage"
store-number: "1042"
transition-duration: 500ms
failed-lap-backoff: 2s
headless:
  video-duration: 3s
sequence:
  - kind: video
    source-uri: videos/welcome.mp4
  - kind: image
    source-uri: images/promo.jpg
    dwell-seconds: 5
    transition-style: slide-up
"#;
    let cfg = Configuration::from_yaml_str(yaml).unwrap().validated().unwrap();
    assert_eq!(cfg.title.as_deref(), Some("Lobby loop"));
    assert_eq!(cfg.media_root, PathBuf::from("/srv/signage"));
    assert_eq!(cfg.transition_duration, Duration::from_millis(500));
    assert_eq!(cfg.failed_lap_backoff, Duration::from_secs(2));
    assert_eq!(cfg.headless.video_duration, Duration::from_secs(3));

    let seq = cfg.sequence().unwrap();
    assert_eq!(seq.len(), 2);
    assert!(seq.item_at(0).is_video());
    let image = seq.item_at(1);
    assert_eq!(image.kind, ItemKind::Known(MediaKind::Image));
    assert_eq!(image.dwell(), Duration::from_secs(5));
    assert_eq!(image.transition, Some(TransitionStyle::SlideUp));
}

#[test]
fn defaults_apply_when_omitted() {
    let cfg = Configuration::from_yaml_str(
        r#"
sequence:
  - kind: video
    source-uri: a.mp4
"#,
    )
    .unwrap();
    assert_eq!(cfg.transition_duration, Duration::from_millis(800));
    assert_eq!(cfg.failed_lap_backoff, Duration::from_secs(1));
    assert_eq!(cfg.headless.video_duration, Duration::from_secs(15));
    assert!(cfg.store_directory.is_none());
}

#[test]
fn accepts_legacy_item_spellings() {
    let cfg = Configuration::from_yaml_str(
        r#"
storeNumber: "7"
playbackSequenece:
  - type: video
    src: https://cdn.example/a.mp4
    duration: null
  - type: image
    src: b.png
    duration: 2.5
    transition: fade
"#,
    )
    .unwrap();
    assert_eq!(cfg.store_number.as_deref(), Some("7"));
    let seq = cfg.sequence().unwrap();
    assert_eq!(seq.item_at(0).source_uri, "https://cdn.example/a.mp4");
    assert_eq!(seq.item_at(0).dwell, None);
    assert_eq!(seq.item_at(1).dwell(), Duration::from_millis(2500));
    assert_eq!(seq.item_at(1).transition, Some(TransitionStyle::Fade));
}

#[test]
fn missing_sequence_is_a_config_error() {
    let cfg = Configuration::from_yaml_str("title: nothing to play\n").unwrap();
    assert!(matches!(cfg.sequence(), Err(ConfigError::MissingSequence)));

    let cfg = Configuration::from_yaml_str("sequence: []\n").unwrap();
    assert!(matches!(cfg.sequence(), Err(ConfigError::EmptySequence)));
}

#[test]
fn sequence_that_is_not_a_list_fails_to_parse() {
    let err = Configuration::from_yaml_str("sequence: \"foo\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));

    let err = Configuration::from_yaml_str("sequence:\n  kind: video\n").unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
}

#[test]
fn image_without_dwell_is_rejected() {
    let cfg = Configuration::from_yaml_str(
        r#"
sequence:
  - kind: image
    source-uri: a.png
"#,
    )
    .unwrap();
    assert!(matches!(
        cfg.sequence(),
        Err(ConfigError::MissingDwell { index: 0 })
    ));
}

#[test]
fn unknown_transition_name_fails_to_parse() {
    let err = Configuration::from_yaml_str(
        r#"
sequence:
  - kind: image
    source-uri: a.png
    dwell-seconds: 1
    transition-style: spin
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
    assert!(err.to_string().contains("spin"));
}

#[test]
fn unknown_kind_loads_and_negative_dwell_is_clamped() {
    let cfg = Configuration::from_yaml_str(
        r#"
sequence:
  - kind: audio
    source-uri: jingle.mp3
  - kind: image
    source-uri: a.png
    dwell-seconds: -4
"#,
    )
    .unwrap();
    let seq = cfg.sequence().unwrap();
    assert_eq!(seq.item_at(0).kind, ItemKind::Unrecognized("audio".into()));
    assert_eq!(seq.item_at(1).dwell(), Duration::ZERO);
}

#[test]
fn validation_rejects_inconsistent_overlay_settings() {
    let cfg = Configuration::from_yaml_str("store-directory: stores.yaml\n").unwrap();
    assert!(matches!(cfg.validated(), Err(ConfigError::Invalid(_))));

    let cfg = Configuration::from_yaml_str("store-number: \"  \"\n").unwrap();
    assert!(cfg.validated().is_err());

    let cfg = Configuration::from_yaml_str(
        r#"
headless:
  video-duration: 0s
"#,
    )
    .unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn file_paths_resolve_against_config_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("player.yaml");
    std::fs::write(
        &path,
        r#"
media-root: media
store-number: "1"
store-directory: stores.yaml
sequence:
  - kind: video
    source-uri: a.mp4
"#,
    )
    .unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.media_root, dir.path().join("media"));
    assert_eq!(cfg.store_directory, Some(dir.path().join("stores.yaml")));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Configuration::from_yaml_file("/nonexistent/player.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
