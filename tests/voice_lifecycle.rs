//! Integration test: manager + virtual device, driving requests through
//! bind, transitions, follow tracking and reclamation.

use da_device::VirtualOutput;
use da_engine::{AudioManager, ClipMode, ManagerConfig, PlayOutcome, PlaybackWarning, Preset};
use da_ir::{AudioEffect, Clip, ClipBank, ClipKey, FilterKind, Scene, TargetId, Vec3};

const DT: f32 = 1.0 / 60.0;

/// One target that can be moved or removed between ticks.
#[derive(Default)]
struct Marker {
    position: Option<Vec3>,
}

impl Scene for Marker {
    fn position(&self, target: TargetId) -> Option<Vec3> {
        if target == TargetId(0) {
            self.position
        } else {
            None
        }
    }
}

struct Rig {
    manager: AudioManager<VirtualOutput, Marker>,
    short: ClipKey,
    long: ClipKey,
    extra: ClipKey,
}

fn rig(config: ManagerConfig) -> Rig {
    let mut clips = ClipBank::with_key();
    let short = clips.insert(Clip::new("short", 0.5));
    let long = clips.insert(Clip::new("long", 30.0));
    let extra = clips.insert(Clip::new("extra", 30.0));
    let manager = AudioManager::new(config.with_seed(21), clips, VirtualOutput::new(), Marker::default()).unwrap();
    Rig { manager, short, long, extra }
}

fn tick(manager: &mut AudioManager<VirtualOutput, Marker>, seconds: f32) {
    let steps = (seconds / DT).round() as usize;
    for _ in 0..steps {
        manager.output_mut().advance(DT);
        manager.update(DT);
    }
}

#[test]
fn pool_of_any_size_hands_out_distinct_voices() {
    for size in 0..6 {
        for expand in [false, true] {
            let Rig { mut manager, long, .. } =
                rig(ManagerConfig::default().with_pool_size(size).with_auto_expand(expand));
            let mut seen = Vec::new();
            for _ in 0..size {
                let id = manager.play_clip_simple(long).voice().unwrap();
                assert!(!seen.contains(&id));
                seen.push(id);
            }
            let extra = manager.play_clip_simple(long);
            if expand {
                let id = extra.voice().unwrap();
                assert!(!seen.contains(&id));
                assert_eq!(manager.pool().capacity(), size + 1);
            } else {
                assert_eq!(extra, PlayOutcome::Dropped);
                assert_eq!(manager.pool().capacity(), size);
            }
        }
    }
}

#[test]
fn expansion_never_shrinks() {
    let Rig { mut manager, short, .. } = rig(ManagerConfig::default().with_pool_size(1));
    for _ in 0..4 {
        manager.play_clip_simple(short);
    }
    assert_eq!(manager.pool().capacity(), 4);
    tick(&mut manager, 1.0);
    assert_eq!(manager.pool().active_count(), 0);
    assert_eq!(manager.pool().capacity(), 4);
}

#[test]
fn mix_and_pitch_rules_apply_at_bind() {
    let config = ManagerConfig::default().with_volumes(0.5, 0.8, 1.0).with_master_pitch(1.2);
    let Rig { mut manager, long, .. } = rig(config);

    let default = manager.play_clip_simple(long).voice().unwrap();
    let voice = manager.voice(default).unwrap();
    assert!((voice.volume() - 0.4).abs() < 1e-6);
    assert!((voice.pitch() - 1.2).abs() < 1e-6);

    let explicit = manager.sound(long).pitch(1.5).volume(0.5).play().voice().unwrap();
    let voice = manager.voice(explicit).unwrap();
    assert_eq!(voice.pitch(), 1.5);
    assert!((voice.volume() - 0.2).abs() < 1e-6);

    // the device received the same values
    let params = manager.output().params(explicit).unwrap();
    assert_eq!(params.pitch, 1.5);
    assert!((params.volume - 0.2).abs() < 1e-6);
}

#[test]
fn fade_in_is_monotonic_and_exact() {
    let Rig { mut manager, long, .. } = rig(ManagerConfig::default().with_volumes(0.9, 1.0, 1.0));
    let id = manager.sound(long).fade(0.75).play().voice().unwrap();
    let mut last = 0.0;
    for _ in 0..60 {
        manager.output_mut().advance(DT);
        manager.update(DT);
        let volume = manager.voice(id).unwrap().volume();
        assert!(volume >= last);
        assert!(volume <= 0.9);
        last = volume;
    }
    assert_eq!(last, 0.9);
}

#[test]
fn follow_binding_lifecycle() {
    let Rig { mut manager, short, long, .. } = rig(ManagerConfig::default());
    manager.scene_mut().position = Some(Vec3::new(0.0, 0.0, 1.0));

    let ending = manager.sound(short).follow(TargetId(0)).spatial_blend(1.0).play().voice().unwrap();
    let lasting = manager.sound(long).follow(TargetId(0)).spatial_blend(1.0).play().voice().unwrap();
    assert_eq!(manager.follow().len(), 2);

    manager.scene_mut().position = Some(Vec3::new(0.0, 0.0, 2.0));
    tick(&mut manager, 0.6);
    // the short clip ended; its binding is gone
    assert!(!manager.follow().contains(ending));
    assert!(manager.follow().contains(lasting));
    assert_eq!(manager.voice(lasting).unwrap().position(), Vec3::new(0.0, 0.0, 2.0));
    assert_eq!(manager.output().params(lasting).unwrap().position, Vec3::new(0.0, 0.0, 2.0));

    manager.scene_mut().position = None;
    tick(&mut manager, DT);
    assert!(manager.follow().is_empty());
    // the voice keeps playing at its last position
    assert!(manager.voice(lasting).unwrap().is_playing());
    assert_eq!(manager.voice(lasting).unwrap().position(), Vec3::new(0.0, 0.0, 2.0));
}

#[test]
fn missing_follow_target_falls_back_to_position() {
    let Rig { mut manager, long, .. } = rig(ManagerConfig::default());
    let id = manager
        .sound(long)
        .follow(TargetId(0))
        .at_position(Vec3::new(5.0, 0.0, 0.0))
        .spatial_blend(1.0)
        .play()
        .voice()
        .unwrap();
    assert_eq!(manager.voice(id).unwrap().position(), Vec3::new(5.0, 0.0, 0.0));
    assert!(manager.follow().is_empty());
}

#[test]
fn reused_voice_carries_no_stale_state() {
    let Rig { mut manager, short, .. } = rig(ManagerConfig::default().with_pool_size(1).with_auto_expand(false));
    manager.scene_mut().position = Some(Vec3::new(1.0, 1.0, 1.0));
    let id = manager
        .sound(short)
        .effect(AudioEffect::Muffled)
        .follow(TargetId(0))
        .spatial_blend(0.5)
        .play()
        .voice()
        .unwrap();
    tick(&mut manager, 0.6);

    assert_eq!(manager.sound(short).effect(AudioEffect::Robot).play().voice(), Some(id));
    let voice = manager.voice(id).unwrap();
    assert_eq!(voice.effect(), AudioEffect::Robot);
    assert_eq!(voice.follow_target(), None);
    let filters = &voice.params().filters;
    assert!(filters.is_enabled(FilterKind::Distortion));
    assert!(!filters.is_enabled(FilterKind::LowPass));

    assert_eq!(manager.sound(short).effect(AudioEffect::None).play(), PlayOutcome::Dropped);
}

#[test]
fn preset_no_repeat_and_randomized_pitch() {
    let Rig { mut manager, short, long, extra } = rig(ManagerConfig::default());
    let mut preset = Preset::new("hits", vec![short, long, extra]).with_mode(ClipMode::RandomNoRepeat);
    preset.randomize_pitch = true;

    let mut last = None;
    for _ in 0..30 {
        let id = manager.play_preset(&mut preset).voice().unwrap();
        let voice = manager.voice(id).unwrap();
        let clip = voice.clip();
        assert_ne!(clip, last);
        last = clip;
        assert!((0.9..1.2).contains(&voice.pitch()));
    }
}

#[test]
fn melodic_pitch_is_an_equal_tempered_ratio() {
    let Rig { mut manager, long, .. } = rig(ManagerConfig::default());
    for _ in 0..20 {
        let id = manager.play_clip_simple_melodic(long).voice().unwrap();
        let pitch = manager.voice(id).unwrap().pitch();
        let semitones = 12.0 * pitch.log2();
        assert!((semitones - semitones.round()).abs() < 1e-3, "pitch {pitch}");
        assert!((0.0..=11.0).contains(&semitones.round()));
    }
}

#[test]
fn crossfade_leaves_one_music_voice() {
    let config = ManagerConfig::default().with_volumes(0.5, 1.0, 0.6);
    let Rig { mut manager, long, extra, .. } = rig(config);
    let old = manager.play_music(long, true, 0.0).unwrap();
    let new = manager.crossfade_music(extra, 2.0).unwrap();

    tick(&mut manager, 1.0);
    let old_volume = manager.voice(old).unwrap().volume();
    let new_volume = manager.voice(new).unwrap().volume();
    assert!(old_volume < 0.3 && new_volume > 0.0);

    tick(&mut manager, 1.1);
    assert!(manager.voice(old).is_none());
    assert!(manager.output().is_destroyed(old));
    assert_eq!(manager.music_voice(), Some(new));
    assert!((manager.voice(new).unwrap().volume() - 0.3).abs() < 1e-6);
    assert_eq!(manager.output().playing_count(), 1);
}

#[test]
fn master_volume_change_propagates_before_returning() {
    let Rig { mut manager, long, extra, .. } = rig(ManagerConfig::default().with_volumes(1.0, 0.5, 0.8));
    let sfx = manager.sound(long).volume(0.6).play().voice().unwrap();
    let music = manager.play_music(extra, true, 0.0).unwrap();

    manager.set_master_volume(0.25);
    assert!((manager.output().params(sfx).unwrap().volume - 0.075).abs() < 1e-6);
    assert!((manager.output().params(music).unwrap().volume - 0.2).abs() < 1e-6);

    manager.set_sfx_volume(2.0);
    assert_eq!(manager.mix().sfx_volume(), 1.0);
    assert!((manager.voice(sfx).unwrap().volume() - 0.15).abs() < 1e-6);
}

#[test]
fn misconfigured_position_warns_once_per_request() {
    let Rig { mut manager, short, .. } = rig(ManagerConfig::default());
    for _ in 0..3 {
        manager.sound(short).at_position(Vec3::new(1.0, 0.0, 0.0)).play();
    }
    let warnings: Vec<_> = manager.recent_warnings().copied().collect();
    assert_eq!(warnings, vec![PlaybackWarning::PositionWithout3d; 3]);
}
