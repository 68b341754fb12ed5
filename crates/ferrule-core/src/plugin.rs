//! Core plugin trait definitions.
//!
//! A plugin implements [`PluginCommands`] (one method per host command it
//! understands) and [`Plugin`] (construction). Commands from the older
//! vocabulary that modern hosts rarely send live in [`LegacyCommands`], which
//! a plugin exposes through [`PluginCommands::legacy`] only if it wants them.
//!
//! Every fallible method returns [`PluginResult`]. An `Err` is never shown to
//! the host: the adapter logs it and answers with the command's failure value.

use crate::buffer::AudioBuffer;
use crate::editor::{KeyCode, KnobMode, ParentWindow};
use crate::error::{PluginError, PluginResult};
use crate::midi::{Event, MidiKeyName, MidiProgramCategory, MidiProgramName};
use crate::preset::PatchChunkInfo;
use crate::properties::{ParameterProperties, PinProperties};
use crate::speaker::SpeakerArrangement;
use crate::types::{
    CanDoResult, LoadResponse, PanLaw, PluginCategory, Point, ProcessPrecision, Rect,
};

// =============================================================================
// Host Interface
// =============================================================================

/// Calls a plugin can make back into the host.
///
/// Handed to [`Plugin::create`]. Implemented by the format layer on top of the
/// host's callback function.
pub trait Host: Send {
    /// Host's supported interface version (e.g. 2400), 0 if unknown.
    fn version(&self) -> i32;

    /// Notify the host that a parameter changed from the editor.
    fn automate(&self, index: i32, value: f32);

    /// The user grabbed a parameter control.
    fn begin_edit(&self, index: i32);

    /// The user released a parameter control.
    fn end_edit(&self, index: i32);

    /// I/O configuration or latency changed. Returns true if the host
    /// accepted the change.
    fn io_changed(&self) -> bool;

    /// Ask the host to resize the editor window.
    fn size_window(&self, width: i32, height: i32) -> bool;

    /// Give the host a chance to run its idle loop (e.g. while a modal
    /// dialog is open).
    fn idle(&self);
}

// =============================================================================
// Plugin Commands
// =============================================================================

/// The host command vocabulary, one method per command.
///
/// Only [`process_replacing`](Self::process_replacing) is required; every
/// other method has a default that reports "not supported" in whatever form
/// the command expects (usually `false`, `None` or `0`).
///
/// # Thread Safety
///
/// The host serialises calls for one instance, but audio calls may arrive
/// on a different thread than the rest, so implementors must be `Send`.
pub trait PluginCommands: Send {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Called once after creation, before any other command.
    ///
    /// Default does nothing.
    fn open(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Called once before the instance is destroyed. Nothing reaches the
    /// plugin afterwards.
    ///
    /// Default does nothing.
    fn close(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Processing is switched on (`true`) or off (`false`).
    ///
    /// Memory handed to the host by pointer is released right before this is
    /// called.
    ///
    /// Default does nothing.
    fn mains_changed(&mut self, _on: bool) -> PluginResult<()> {
        Ok(())
    }

    /// Default does nothing.
    fn set_sample_rate(&mut self, _sample_rate: f32) -> PluginResult<()> {
        Ok(())
    }

    /// Maximum number of samples per process call.
    ///
    /// Default does nothing.
    fn set_block_size(&mut self, _block_size: i32) -> PluginResult<()> {
        Ok(())
    }

    /// Called when the host starts the audio engine.
    ///
    /// Default returns 0 (not supported).
    fn start_process(&mut self) -> PluginResult<i32> {
        Ok(0)
    }

    /// Called when the host stops the audio engine.
    ///
    /// Default returns 0 (not supported).
    fn stop_process(&mut self) -> PluginResult<i32> {
        Ok(0)
    }

    /// Default returns false.
    fn set_bypass(&mut self, _bypass: bool) -> PluginResult<bool> {
        Ok(false)
    }

    /// Announces the sample precision of upcoming process calls.
    ///
    /// Default returns false.
    fn set_process_precision(&mut self, _precision: ProcessPrecision) -> PluginResult<bool> {
        Ok(false)
    }

    /// Default returns false.
    fn set_pan_law(&mut self, _law: PanLaw, _gain: f32) -> PluginResult<bool> {
        Ok(false)
    }

    // =========================================================================
    // Programs
    // =========================================================================

    /// Default does nothing.
    fn set_program(&mut self, _program: i32) -> PluginResult<()> {
        Ok(())
    }

    /// Index of the current program.
    ///
    /// Default returns 0.
    fn program(&self) -> PluginResult<i32> {
        Ok(0)
    }

    /// Rename the current program.
    ///
    /// Default does nothing.
    fn set_program_name(&mut self, _name: &str) -> PluginResult<()> {
        Ok(())
    }

    /// Name of the current program. Truncated to 23 bytes on the wire.
    ///
    /// Default returns an empty string.
    fn program_name(&self) -> PluginResult<String> {
        Ok(String::new())
    }

    /// Name of any program by index, without switching to it.
    ///
    /// Default returns `None`.
    fn program_name_indexed(&self, _index: i32) -> PluginResult<Option<String>> {
        Ok(None)
    }

    /// Called before a program change is applied.
    ///
    /// Default returns false.
    fn begin_set_program(&mut self) -> PluginResult<bool> {
        Ok(false)
    }

    /// Called after a program change is applied.
    ///
    /// Default returns false.
    fn end_set_program(&mut self) -> PluginResult<bool> {
        Ok(false)
    }

    /// The host is about to load a bank file.
    ///
    /// Default returns [`LoadResponse::Unknown`].
    fn begin_load_bank(&mut self, _info: &PatchChunkInfo) -> PluginResult<LoadResponse> {
        Ok(LoadResponse::Unknown)
    }

    /// The host is about to load a program file.
    ///
    /// Default returns [`LoadResponse::Unknown`].
    fn begin_load_program(&mut self, _info: &PatchChunkInfo) -> PluginResult<LoadResponse> {
        Ok(LoadResponse::Unknown)
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Serialize the bank (`preset == false`) or current program
    /// (`preset == true`) as an opaque chunk.
    ///
    /// Only asked when the plugin advertises program chunks. The returned
    /// bytes stay readable by the host until processing is next switched on
    /// or off.
    ///
    /// Default returns `None`.
    fn chunk(&mut self, _preset: bool) -> PluginResult<Option<Vec<u8>>> {
        Ok(None)
    }

    /// Restore a chunk previously produced by [`chunk`](Self::chunk).
    ///
    /// Default returns false.
    fn set_chunk(&mut self, _data: &[u8], _preset: bool) -> PluginResult<bool> {
        Ok(false)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Set a parameter's normalized value (0.0 to 1.0).
    ///
    /// May be called from the audio thread.
    ///
    /// Default does nothing.
    fn set_parameter(&mut self, _index: i32, _value: f32) -> PluginResult<()> {
        Ok(())
    }

    /// A parameter's normalized value (0.0 to 1.0).
    ///
    /// Default returns 0.0.
    fn parameter(&self, _index: i32) -> PluginResult<f32> {
        Ok(0.0)
    }

    /// Unit label (e.g. "dB"). Truncated to 7 bytes on the wire.
    ///
    /// Default returns an empty string.
    fn parameter_label(&self, _index: i32) -> PluginResult<String> {
        Ok(String::new())
    }

    /// Current value as display text. Truncated to 7 bytes on the wire.
    ///
    /// Default returns an empty string.
    fn parameter_display(&self, _index: i32) -> PluginResult<String> {
        Ok(String::new())
    }

    /// Parameter name. Truncated to 7 bytes on the wire.
    ///
    /// Default returns an empty string.
    fn parameter_name(&self, _index: i32) -> PluginResult<String> {
        Ok(String::new())
    }

    /// Default returns true.
    fn can_parameter_be_automated(&self, _index: i32) -> PluginResult<bool> {
        Ok(true)
    }

    /// Set a parameter from display text.
    ///
    /// Default returns false.
    fn string_to_parameter(&mut self, _index: i32, _text: &str) -> PluginResult<bool> {
        Ok(false)
    }

    /// Default returns `None`.
    fn parameter_properties(&self, _index: i32) -> PluginResult<Option<ParameterProperties>> {
        Ok(None)
    }

    // =========================================================================
    // Editor
    // =========================================================================

    /// Editor bounds in pixels, `None` if there is no editor.
    ///
    /// Default returns `None`.
    fn editor_rect(&mut self) -> PluginResult<Option<Rect>> {
        Ok(None)
    }

    /// Attach the editor to the host's window.
    ///
    /// Default returns false.
    fn editor_open(&mut self, _parent: ParentWindow) -> PluginResult<bool> {
        Ok(false)
    }

    /// Default does nothing.
    fn editor_close(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Called periodically from the UI thread while the editor is open.
    ///
    /// Default does nothing.
    fn editor_idle(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Returns true if the editor consumed the key.
    ///
    /// Default returns false.
    fn editor_key_down(&mut self, _key: KeyCode) -> PluginResult<bool> {
        Ok(false)
    }

    /// Returns true if the editor consumed the key.
    ///
    /// Default returns false.
    fn editor_key_up(&mut self, _key: KeyCode) -> PluginResult<bool> {
        Ok(false)
    }

    /// Default returns false.
    fn set_editor_knob_mode(&mut self, _mode: KnobMode) -> PluginResult<bool> {
        Ok(false)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Events for the next process call, sorted by delta frames.
    ///
    /// Default returns false.
    fn process_events(&mut self, _events: &[Event]) -> PluginResult<bool> {
        Ok(false)
    }

    // =========================================================================
    // I/O Configuration
    // =========================================================================

    /// Default returns `None`.
    fn input_properties(&self, _index: i32) -> PluginResult<Option<PinProperties>> {
        Ok(None)
    }

    /// Default returns `None`.
    fn output_properties(&self, _index: i32) -> PluginResult<Option<PinProperties>> {
        Ok(None)
    }

    /// The host proposes input and output arrangements. Either side may be
    /// absent. Return true to accept.
    ///
    /// Default returns false.
    fn set_speaker_arrangement(
        &mut self,
        _input: Option<&SpeakerArrangement>,
        _output: Option<&SpeakerArrangement>,
    ) -> PluginResult<bool> {
        Ok(false)
    }

    /// Current `(input, output)` arrangements.
    ///
    /// Default returns `None`.
    fn speaker_arrangement(&self) -> PluginResult<Option<(SpeakerArrangement, SpeakerArrangement)>> {
        Ok(None)
    }

    // =========================================================================
    // Identity & Capabilities
    // =========================================================================

    /// Default returns [`PluginCategory::Unknown`].
    fn category(&self) -> PluginResult<PluginCategory> {
        Ok(PluginCategory::Unknown)
    }

    /// Truncated to 31 bytes on the wire.
    ///
    /// Default returns `None`.
    fn effect_name(&self) -> PluginResult<Option<String>> {
        Ok(None)
    }

    /// Truncated to 63 bytes on the wire.
    ///
    /// Default returns `None`.
    fn vendor_string(&self) -> PluginResult<Option<String>> {
        Ok(None)
    }

    /// Truncated to 63 bytes on the wire.
    ///
    /// Default returns `None`.
    fn product_string(&self) -> PluginResult<Option<String>> {
        Ok(None)
    }

    /// Default returns 0.
    fn vendor_version(&self) -> PluginResult<i32> {
        Ok(0)
    }

    /// Answer a capability query such as `"receiveVstMidiEvent"`.
    ///
    /// Default returns [`CanDoResult::Unknown`].
    fn can_do(&self, _capability: &str) -> PluginResult<CanDoResult> {
        Ok(CanDoResult::Unknown)
    }

    /// Tail length in samples. 0 means default behaviour, 1 means no tail.
    ///
    /// Default returns 0.
    fn tail_size(&self) -> PluginResult<i32> {
        Ok(0)
    }

    /// Interface version the plugin was written against.
    ///
    /// Default returns 2400.
    fn vst_version(&self) -> PluginResult<i32> {
        Ok(2400)
    }

    // =========================================================================
    // MIDI Programs
    // =========================================================================

    /// Fill in `program` for the index it carries. Returns the number of
    /// MIDI programs on `channel`.
    ///
    /// Default returns 0.
    fn midi_program_name(
        &mut self,
        _program: &mut MidiProgramName,
        _channel: i32,
    ) -> PluginResult<i32> {
        Ok(0)
    }

    /// Fill in `program` with the program currently active on `channel`.
    /// Returns its index.
    ///
    /// Default returns 0.
    fn current_midi_program_name(
        &mut self,
        _program: &mut MidiProgramName,
        _channel: i32,
    ) -> PluginResult<i32> {
        Ok(0)
    }

    /// Fill in `category` for the index it carries. Returns the number of
    /// categories on `channel`.
    ///
    /// Default returns 0.
    fn midi_program_category(
        &mut self,
        _category: &mut MidiProgramCategory,
        _channel: i32,
    ) -> PluginResult<i32> {
        Ok(0)
    }

    /// Default returns false.
    fn has_midi_programs_changed(&mut self, _channel: i32) -> PluginResult<bool> {
        Ok(false)
    }

    /// Fill in the name of the key `key` carries. Returns true if the key
    /// has a name.
    ///
    /// Default returns false.
    fn midi_key_name(&mut self, _key: &mut MidiKeyName, _channel: i32) -> PluginResult<bool> {
        Ok(false)
    }

    /// Number of MIDI input channels used (0 to 16).
    ///
    /// Default returns 0.
    fn midi_input_channel_count(&self) -> PluginResult<i32> {
        Ok(0)
    }

    /// Number of MIDI output channels used (0 to 16).
    ///
    /// Default returns 0.
    fn midi_output_channel_count(&self) -> PluginResult<i32> {
        Ok(0)
    }

    // =========================================================================
    // Audio Processing
    // =========================================================================

    /// Process one block of single precision audio, replacing the outputs.
    ///
    /// # Real-Time Safety
    ///
    /// This method must be real-time safe. Do not allocate, lock mutexes,
    /// or perform any operation with unbounded execution time.
    fn process_replacing(&mut self, buffer: &mut AudioBuffer<'_, f32>) -> PluginResult<()>;

    /// Process one block of double precision audio, replacing the outputs.
    ///
    /// Only called when the plugin advertises double replacing support.
    ///
    /// Default returns [`PluginError::Unsupported`].
    fn process_double_replacing(&mut self, _buffer: &mut AudioBuffer<'_, f64>) -> PluginResult<()> {
        Err(PluginError::Unsupported("double precision processing"))
    }

    // =========================================================================
    // Legacy Vocabulary
    // =========================================================================

    /// Opt in to the legacy command vocabulary.
    ///
    /// Default returns `None`: legacy commands are answered with 0.
    fn legacy(&mut self) -> Option<&mut dyn LegacyCommands> {
        None
    }
}

// =============================================================================
// Legacy Commands
// =============================================================================

/// Commands from the older vocabulary.
///
/// Most hosts never send these. A plugin implements the trait only when it
/// must support a host that does, and returns `Some(self)` from
/// [`PluginCommands::legacy`].
pub trait LegacyCommands: Send {
    /// Current VU level (0.0 to 1.0).
    ///
    /// Default returns 0.0.
    fn vu(&self) -> PluginResult<f32> {
        Ok(0.0)
    }

    /// Default returns false.
    fn editor_key(&mut self, _key: i32) -> PluginResult<bool> {
        Ok(false)
    }

    /// Default returns false.
    fn editor_top(&mut self) -> PluginResult<bool> {
        Ok(false)
    }

    /// Default returns false.
    fn editor_sleep(&mut self) -> PluginResult<bool> {
        Ok(false)
    }

    /// Shell identification tag.
    ///
    /// Default returns `'NvEf'`.
    fn identify(&self) -> PluginResult<i32> {
        Ok(crate::config::fourcc(b"NvEf"))
    }

    /// Default returns 1.
    fn program_categories_count(&self) -> PluginResult<i32> {
        Ok(1)
    }

    /// Copy the current program into slot `destination`.
    ///
    /// Default returns false.
    fn copy_current_program_to(&mut self, _destination: i32) -> PluginResult<bool> {
        Ok(false)
    }

    /// Default returns false.
    fn connect_input(&mut self, _index: i32, _connected: bool) -> PluginResult<bool> {
        Ok(false)
    }

    /// Default returns false.
    fn connect_output(&mut self, _index: i32, _connected: bool) -> PluginResult<bool> {
        Ok(false)
    }

    /// Default returns 0.
    fn current_position(&self) -> PluginResult<i32> {
        Ok(0)
    }

    /// A plugin-owned output buffer the host may read from.
    ///
    /// Default returns `None`.
    fn destination_buffer(&mut self) -> PluginResult<Option<&mut [f32]>> {
        Ok(None)
    }

    /// Default returns false.
    fn set_block_size_and_sample_rate(
        &mut self,
        _block_size: i32,
        _sample_rate: f32,
    ) -> PluginResult<bool> {
        Ok(false)
    }

    /// Last error as text. Truncated to 255 bytes on the wire.
    ///
    /// Default returns `None`.
    fn error_text(&self) -> PluginResult<Option<String>> {
        Ok(None)
    }

    /// Default returns false.
    fn idle(&mut self) -> PluginResult<bool> {
        Ok(false)
    }

    /// Default returns false.
    fn set_view_position(&mut self, _position: Point) -> PluginResult<bool> {
        Ok(false)
    }

    /// Returns true if the editor needs keyboard events.
    ///
    /// Default returns false.
    fn keys_required(&self) -> PluginResult<bool> {
        Ok(false)
    }

    /// Process one block, adding to (not replacing) the outputs.
    ///
    /// Default does nothing.
    fn process_accumulating(&mut self, _buffer: &mut AudioBuffer<'_, f32>) -> PluginResult<()> {
        Ok(())
    }
}

// =============================================================================
// Plugin Trait
// =============================================================================

/// Construction of a plugin instance.
///
/// # Example
///
/// ```ignore
/// use ferrule_core::{AudioBuffer, Host, Plugin, PluginCommands, PluginResult};
///
/// pub struct Gain {
///     gain: f32,
/// }
///
/// impl PluginCommands for Gain {
///     fn process_replacing(&mut self, buffer: &mut AudioBuffer<'_, f32>) -> PluginResult<()> {
///         buffer.copy_input_to_output();
///         for output in buffer.outputs_mut() {
///             output.iter_mut().for_each(|s| *s *= self.gain);
///         }
///         Ok(())
///     }
/// }
///
/// impl Plugin for Gain {
///     fn create(_host: Box<dyn Host>) -> PluginResult<Self> {
///         Ok(Self { gain: 1.0 })
///     }
/// }
/// ```
pub trait Plugin: PluginCommands + Sized + 'static {
    /// Creates a new instance with default state.
    ///
    /// Called when the host loads the plugin. An `Err` makes the load fail.
    fn create(host: Box<dyn Host>) -> PluginResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl PluginCommands for Silent {
        fn process_replacing(&mut self, buffer: &mut AudioBuffer<'_, f32>) -> PluginResult<()> {
            buffer.clear_outputs();
            Ok(())
        }
    }

    struct WithLegacy;

    impl PluginCommands for WithLegacy {
        fn process_replacing(&mut self, _buffer: &mut AudioBuffer<'_, f32>) -> PluginResult<()> {
            Ok(())
        }

        fn legacy(&mut self) -> Option<&mut dyn LegacyCommands> {
            Some(self)
        }
    }

    impl LegacyCommands for WithLegacy {}

    #[test]
    fn test_command_defaults() {
        let mut plugin = Silent;
        assert!(plugin.can_parameter_be_automated(0).unwrap());
        assert_eq!(plugin.vst_version().unwrap(), 2400);
        assert_eq!(plugin.can_do("bypass").unwrap(), CanDoResult::Unknown);
        assert!(plugin.chunk(false).unwrap().is_none());
        assert!(plugin.legacy().is_none());

        let inputs: [&[f64]; 0] = [];
        let mut outputs: [&mut [f64]; 0] = [];
        let mut buffer = AudioBuffer::new(&inputs, &mut outputs, 0);
        assert!(matches!(
            plugin.process_double_replacing(&mut buffer),
            Err(PluginError::Unsupported(_))
        ));
    }

    #[test]
    fn test_legacy_defaults() {
        let mut plugin = WithLegacy;
        let legacy = plugin.legacy().unwrap();
        assert_eq!(legacy.identify().unwrap(), crate::config::fourcc(b"NvEf"));
        assert_eq!(legacy.program_categories_count().unwrap(), 1);
        assert!(!legacy.keys_required().unwrap());
        assert!(legacy.destination_buffer().unwrap().is_none());
    }
}
