//! # Ferrule
//!
//! VST 2.4 plugin adapter for Rust.
//!
//! Ferrule lets a plugin written against a typed command interface be
//! loaded by hosts that only speak the VST 2.4 binary interface.
//!
//! ## Architecture
//!
//! ```text
//! Your Plugin (implements PluginCommands + Plugin)
//!        ↓
//! CommandProxy (opcode dispatch, argument transcoding)
//!        ↓
//! AEffect callbacks
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferrule::prelude::*;
//!
//! pub struct MyGain {
//!     gain: f32,
//! }
//!
//! impl PluginCommands for MyGain {
//!     fn process_replacing(&mut self, buffer: &mut AudioBuffer<'_, f32>) -> PluginResult<()> {
//!         buffer.copy_input_to_output();
//!         for output in buffer.outputs_mut() {
//!             output.iter_mut().for_each(|s| *s *= self.gain);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl Plugin for MyGain {
//!     fn create(_host: Box<dyn Host>) -> PluginResult<Self> {
//!         Ok(Self { gain: 1.0 })
//!     }
//! }
//!
//! static INFO: PluginInfo = PluginInfo::new("MyGain", fourcc(b"MyGn"));
//! export_vst2!(INFO, MyGain);
//! ```

// Re-export sub-crates
pub use ferrule_core as core;
pub use ferrule_vst2 as vst2;

/// Prelude module for convenient imports.
///
/// Import everything you need to build a plugin:
/// ```rust,ignore
/// use ferrule::prelude::*;
/// ```
pub mod prelude {
    pub use ferrule_core::{
        // Buffer types
        AudioBuffer, Sample,
        // Traits
        Host, LegacyCommands, Plugin, PluginCommands,
        // Configuration
        fourcc, PluginFlags, PluginInfo,
        // Error types
        PluginError, PluginResult,
        // Geometry
        Point, Rect, Size,
        // Host negotiation
        CanDoResult, LoadResponse, PanLaw, PluginCategory, ProcessPrecision,
        // Editor
        KeyCode, KnobMode, ParentWindow,
        // MIDI
        Event, MidiEvent, MidiKeyName, MidiProgramCategory, MidiProgramName, SysExEvent,
        // Properties and presets
        ParameterProperties, PatchChunkInfo, PinProperties, SpeakerArrangement,
        SpeakerProperties,
    };

    // VST 2.4 implementation
    pub use ferrule_vst2::export_vst2;
}
