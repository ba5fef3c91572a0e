//! Output devices for the daudio playback layer.
//!
//! The engine drives any [`da_ir::VoiceOutput`]. This crate provides a
//! headless device that keeps per-voice playheads without producing
//! samples, used by the session runner and by tests.

mod virtual_output;

pub use virtual_output::{DeviceEvent, VirtualOutput, EVENT_LOG_CAPACITY};
