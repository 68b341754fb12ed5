//! # ferrule-core
//!
//! Format-agnostic core of the Ferrule plugin adapter.
//!
//! This crate defines what a plugin looks like to the adapter: a command trait
//! with one method per host command, the domain values those commands
//! exchange, borrowed audio buffer views and the static metadata the host
//! reads before it sends any command. It knows nothing about the native
//! binary interface; that lives in `ferrule-vst2`.
//!
//! ## Main Traits
//!
//! - [`PluginCommands`] - Host command vocabulary
//! - [`LegacyCommands`] - Optional older vocabulary
//! - [`Plugin`] - Instance construction
//! - [`Host`] - Calls back into the host
//!
//! ## Types
//!
//! - [`AudioBuffer`] - Borrowed channel buffers for one process call
//! - [`PluginInfo`] - Static plugin metadata
//! - [`Event`] - MIDI and SysEx events
//! - [`SpeakerArrangement`] - Channel layouts
//! - [`PluginError`] - Error types

pub mod buffer;
pub mod config;
pub mod editor;
pub mod error;
pub mod midi;
pub mod plugin;
pub mod preset;
pub mod properties;
pub mod sample;
pub mod speaker;
pub mod types;

// Re-exports for convenience
pub use buffer::AudioBuffer;
pub use config::{fourcc, PluginFlags, PluginInfo};
pub use editor::{KeyCode, KnobMode, ModifierKeys, ParentWindow, VirtualKey};
pub use error::{PluginError, PluginResult};
pub use midi::{Event, MidiEvent, MidiKeyName, MidiProgramCategory, MidiProgramName, SysExEvent};
pub use plugin::{Host, LegacyCommands, Plugin, PluginCommands};
pub use preset::PatchChunkInfo;
pub use properties::{ParameterProperties, PinProperties};
pub use sample::Sample;
pub use speaker::{SpeakerArrangement, SpeakerProperties};
pub use types::{
    CanDoResult, LoadResponse, PanLaw, PluginCategory, Point, ProcessPrecision, Rect, Size,
};
