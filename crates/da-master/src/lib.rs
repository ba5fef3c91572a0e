//! Headless session runner for the daudio playback layer.
//!
//! Loads a session file (clips, presets, scene targets and a cue
//! timeline), wires an `AudioManager` to a virtual device and a stage, and
//! runs it either offline as fast as possible or paced in real time on a
//! background thread.

mod error;
mod report;
mod runner;
mod session;
mod stage;

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{error, info};

// Re-export common types so callers don't need da-engine directly.
pub use da_engine::{AudioError, PlayOutcome, PlaybackWarning};

pub use error::{SessionError, SessionResult};
pub use report::SessionReport;
pub use runner::{Session, SessionManager};
pub use session::{
    Bus, ClipEntry, Cue, CueAction, ManagerSection, ModeEntry, PlayCue, PresetEntry, SessionConfig, TargetEntry,
};
pub use stage::{Stage, StageTarget};

/// Owns a session file and runs it.
pub struct Controller {
    config: SessionConfig,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
    tick_length: f32,
    thread: Option<JoinHandle<Option<SessionReport>>>,
}

impl Controller {
    pub fn new(config: SessionConfig) -> Self {
        Self { config, playback: None }
    }

    pub fn from_toml(text: &str) -> SessionResult<Self> {
        Ok(Self::new(SessionConfig::from_toml(text)?))
    }

    pub fn load(path: &Path) -> SessionResult<Self> {
        let config = SessionConfig::load(path)?;
        info!(path = %path.display(), "session loaded");
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // --- Offline ---

    /// Run `duration` seconds of the session as fast as possible.
    pub fn render(&self, duration: f32, tick_rate: f32) -> SessionResult<SessionReport> {
        let tick_length = tick_length(tick_rate)?;
        let mut session = Session::build(&self.config)?;
        session.run(duration, tick_length)
    }

    // --- Real-time ---

    /// Start running the session on a background thread, one tick every
    /// `1 / tick_rate` seconds of wall time.
    pub fn play(&mut self, duration: f32, tick_rate: f32) -> SessionResult<()> {
        self.stop();
        let tick_length = tick_length(tick_rate)?;
        let interval = Duration::try_from_secs_f32(tick_length)
            .map_err(|e| SessionError::InvalidRun(format!("tick rate {tick_rate} gives no usable interval: {e}")))?;
        // surface config errors here; the thread builds its own copy
        Session::build(&self.config)?;

        let config = self.config.clone();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU64::new(0));
        let finished = Arc::new(AtomicBool::new(false));

        let stop = stop_signal.clone();
        let tick = ticks.clone();
        let done = finished.clone();

        let thread = std::thread::spawn(move || realtime_thread(config, duration, interval, stop, tick, done));

        self.playback = Some(PlaybackHandle {
            stop_signal,
            ticks,
            finished,
            tick_length,
            thread: Some(thread),
        });
        Ok(())
    }

    /// Stop the real-time run and return its report, if one was running.
    pub fn stop(&mut self) -> Option<SessionReport> {
        let mut pb = self.playback.take()?;
        pb.stop_signal.store(true, Ordering::Relaxed);
        pb.thread.take().and_then(|handle| handle.join().ok()).flatten()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.as_ref().is_some_and(|p| !p.is_done())
    }

    pub fn is_finished(&self) -> bool {
        self.playback.as_ref().is_some_and(PlaybackHandle::is_done)
    }

    /// Session seconds elapsed in the real-time run.
    pub fn elapsed(&self) -> Option<f32> {
        let pb = self.playback.as_ref()?;
        Some(pb.ticks.load(Ordering::Relaxed) as f32 * pb.tick_length)
    }
}

impl PlaybackHandle {
    /// The thread has finished, returned or not.
    fn is_done(&self) -> bool {
        self.finished.load(Ordering::Relaxed) || self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

/// Raises the finished flag when the real-time thread exits, panics included.
struct FinishedOnDrop(Arc<AtomicBool>);

impl Drop for FinishedOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn tick_length(tick_rate: f32) -> SessionResult<f32> {
    let length = 1.0 / tick_rate;
    if tick_rate.is_nan() || tick_rate <= 0.0 || !length.is_finite() || length <= 0.0 {
        return Err(SessionError::InvalidRun(format!("tick rate must be positive and finite, got {tick_rate}")));
    }
    Ok(length)
}

fn realtime_thread(
    config: SessionConfig,
    duration: f32,
    interval: Duration,
    stop_signal: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
) -> Option<SessionReport> {
    let _finished = FinishedOnDrop(finished);
    let mut session = match Session::build(&config) {
        Ok(session) => session,
        Err(e) => {
            error!("session build failed: {e}");
            return None;
        }
    };

    let tick_length = interval.as_secs_f32();
    for _ in 0..session.ticks_until(duration, tick_length) {
        if stop_signal.load(Ordering::Relaxed) {
            break;
        }
        let started = Instant::now();
        if let Err(e) = session.step(tick_length) {
            error!("session step failed: {e}");
            break;
        }
        ticks.fetch_add(1, Ordering::Relaxed);
        if let Some(rest) = interval.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    Some(session.report())
}
