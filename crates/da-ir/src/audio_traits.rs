//! Traits for the collaborators the engine drives: the audio device and
//! the scene graph.

use crate::clip::Clip;
use crate::vec3::Vec3;
use crate::voice_params::{TargetId, VoiceId, VoiceParams};

/// The audio device as seen by the playback layer.
///
/// The engine owns the authoritative parameter state of every voice and
/// pushes it through [`VoiceOutput::apply`]; the device owns the playhead
/// and reports back through [`VoiceOutput::is_playing`].
pub trait VoiceOutput {
    /// Allocate device resources for a new voice.
    fn create_voice(&mut self, voice: VoiceId);

    /// Release device resources; the id is never used again.
    fn destroy_voice(&mut self, voice: VoiceId);

    /// Start (or restart) `clip` from the beginning with `params`.
    fn play(&mut self, voice: VoiceId, clip: &Clip, params: &VoiceParams);

    /// Stop playback; the voice keeps its parameters.
    fn stop(&mut self, voice: VoiceId);

    /// Push updated parameters to a voice.
    fn apply(&mut self, voice: VoiceId, params: &VoiceParams);

    /// Whether the device is still producing audio for the voice.
    fn is_playing(&self, voice: VoiceId) -> bool;
}

/// Read-only view of the scene graph.
pub trait Scene {
    /// Current world position of `target`, or `None` once it is destroyed.
    fn position(&self, target: TargetId) -> Option<Vec3>;

    /// Whether `target` lives in UI space (screen-anchored).
    fn is_ui_element(&self, _target: TargetId) -> bool {
        false
    }
}

/// A scene with no targets; every follow binding resolves as destroyed.
impl Scene for () {
    fn position(&self, _target: TargetId) -> Option<Vec3> {
        None
    }
}
