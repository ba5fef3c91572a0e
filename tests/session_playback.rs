//! Integration test: session fixtures → controller → report.

use da_master::{Controller, Session, SessionConfig};
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sessions")
}

fn load(name: &str) -> SessionConfig {
    SessionConfig::load(&fixtures_dir().join(name)).unwrap()
}

// --- tight_pool.toml ---

#[test]
fn tight_pool_drops_and_recovers() {
    let report = Controller::new(load("tight_pool.toml")).render(3.0, 60.0).unwrap();
    assert_eq!(report.started, 4);
    assert_eq!(report.scheduled, 1);
    // the direct overflow and the delayed request that found the pool full
    assert_eq!(report.dropped, 2);
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(report.pool_capacity, 3);
    assert_eq!(report.peak_active_voices, 3);
    assert_eq!(report.finished, 4);
}

// --- scene.toml ---

#[test]
fn scene_runs_to_completion() {
    let report = Controller::new(load("scene.toml")).render(12.0, 60.0).unwrap();
    assert_eq!(report.cues_fired, 14);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.music_changes, 1);
    assert!(report.finished >= 7);
}

#[test]
fn scene_music_ends_on_the_battle_theme_and_stops() {
    let mut session = Session::build(&load("scene.toml")).unwrap();
    let menu = session.manager().music_voice().unwrap();

    session.run(9.6, 1.0 / 60.0).unwrap();
    let battle = session.manager().music_voice().unwrap();
    assert_ne!(menu, battle);
    assert!(session.manager().voice(menu).is_none());
    assert_eq!(session.manager().voice(battle).unwrap().clip(), session.clip("battle_theme"));

    session.run(10.5, 1.0 / 60.0).unwrap();
    assert!(!session.manager().voice(battle).unwrap().is_playing());
}

#[test]
fn scene_ui_click_has_no_doppler() {
    let mut session = Session::build(&load("scene.toml")).unwrap();
    session.run(0.55, 1.0 / 60.0).unwrap();
    let click = session.clip("click");
    let voice = session
        .manager()
        .pool()
        .playing_voices()
        .into_iter()
        .filter_map(|id| session.manager().voice(id))
        .find(|v| v.clip() == click)
        .unwrap();
    assert_eq!(voice.params().doppler_level, 0.0);
    assert!((voice.params().spatial_blend - 0.8).abs() < 1e-6);
}

#[test]
fn demo_session_parses() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/session.toml");
    let controller = Controller::load(&path).unwrap();
    assert_eq!(controller.config().cues.len(), 14);
}
