//! Opcode dispatch engine.
//!
//! [`CommandProxy`] sits between the native callbacks and the plugin's
//! [`PluginCommands`]. It parses each opcode, reinterprets the five raw call
//! arguments the way that opcode defines them, invokes the matching command
//! and encodes the answer back into a native return value. Opcodes of the
//! older vocabulary fall through to a second table served by
//! [`LegacyCommands`](ferrule_core::LegacyCommands).
//!
//! Nothing ever unwinds out of the proxy: plugin errors, argument problems
//! and panics are logged and answered with `0`.

use std::ffi::{c_char, c_void};
use std::slice;

use ferrule_core::{
    AudioBuffer, KnobMode, PanLaw, ParentWindow, PluginCommands, PluginError, PluginResult,
    Point, ProcessPrecision, Sample,
};
use log::{debug, error, info, trace, warn};

use crate::abi::{self, ERect, Opcode};
use crate::convert::{
    copy_cstring, events_from_native, key_code_from_native, midi_key_name_from_native,
    midi_key_name_to_native, midi_program_category_from_native, midi_program_category_to_native,
    midi_program_name_from_native, midi_program_name_to_native, native_mut, native_ref, out_slot,
    parameter_properties_to_native, patch_chunk_info_from_native, pin_properties_to_native,
    read_bytes, read_cstring, rect_to_native, speaker_arrangement_from_native,
    speaker_arrangement_to_native, string_buffer,
};
use crate::guard::{guard, guard_void};
use crate::memory::MemoryTracker;

/// Maximum number of channels per direction handed to the plugin.
///
/// Effects declaring more are refused at creation.
pub const MAX_CHANNELS: usize = 32;

/// Raw channel arrays of one process call.
#[derive(Debug, Clone, Copy)]
pub struct RawChannels<S> {
    /// `num_inputs` channel pointers, each holding `frames` samples.
    pub inputs: *const *const S,
    /// `num_outputs` channel pointers, each holding `frames` samples.
    pub outputs: *mut *mut S,
    pub num_inputs: i32,
    pub num_outputs: i32,
    pub frames: i32,
}

/// Adapter bound to one plugin instance.
///
/// Owns the plugin's command object, the tracker for memory handed to the
/// host, and the rectangle answered to editor bounds queries. After
/// `Close` the command object is gone and every call is answered with `0`.
pub struct CommandProxy {
    commands: Option<Box<dyn PluginCommands>>,
    memory: MemoryTracker,
    /// Reused across queries so its address stays stable.
    editor_rect: Box<ERect>,
}

impl CommandProxy {
    pub fn new(commands: Box<dyn PluginCommands>) -> Self {
        Self {
            commands: Some(commands),
            memory: MemoryTracker::new(),
            editor_rect: Box::default(),
        }
    }

    /// Returns false once the proxy was torn down.
    pub fn is_bound(&self) -> bool {
        self.commands.is_some()
    }

    pub fn memory(&self) -> &MemoryTracker {
        &self.memory
    }

    /// Handle one dispatcher call.
    ///
    /// # Safety
    ///
    /// `value` and `ptr` must satisfy the contract of `opcode`: where the
    /// opcode defines them as pointers they must be null or point to the
    /// native structure or buffer the opcode describes.
    pub unsafe fn dispatch(
        &mut self,
        opcode: i32,
        index: i32,
        value: isize,
        ptr: *mut c_void,
        opt: f32,
    ) -> isize {
        trace!("Dispatch begin: opcode={opcode} index={index} value={value} ptr={ptr:p} opt={opt}");

        // SAFETY: forwarded from the caller.
        let result = unsafe { self.dispatch_bound(opcode, index, value, ptr, opt) };

        trace!("Dispatch end: opcode={opcode} result={result}");
        result
    }

    /// # Safety
    /// See [`dispatch`](Self::dispatch).
    unsafe fn dispatch_bound(
        &mut self,
        opcode: i32,
        index: i32,
        value: isize,
        ptr: *mut c_void,
        opt: f32,
    ) -> isize {
        let Some(commands) = self.commands.as_deref_mut() else {
            warn!("Opcode {opcode} dispatched without a bound plugin");
            return 0;
        };

        let Some(op) = Opcode::from_raw(opcode) else {
            debug!("Unhandled dispatcher opcode: {opcode}");
            return 0;
        };

        let mut session = Session {
            commands,
            memory: &mut self.memory,
            editor_rect: &mut *self.editor_rect,
        };

        // SAFETY: the argument contract is forwarded from the caller.
        let result = match guard(|| unsafe { session.dispatch(op, index, value, ptr, opt) }) {
            Ok(result) => result,
            Err(err) => {
                error!("{op:?} failed: {err}");
                0
            }
        };

        // The instance goes away even if the plugin's close failed.
        if op == Opcode::Close {
            self.teardown();
        }

        result
    }

    /// Release tracked memory and drop the plugin. Idempotent.
    pub fn teardown(&mut self) {
        let released = self.memory.clear_all();
        if let Some(commands) = self.commands.take() {
            guard_void("drop plugin", move || drop(commands));
            debug!("Plugin torn down, released {released} tracked block(s)");
        }
    }

    // =========================================================================
    // Audio Processing
    // =========================================================================

    /// Single precision replacing process.
    ///
    /// # Safety
    ///
    /// Non-null channel arrays must hold their channel count of pointers,
    /// each null or valid for `frames` samples.
    pub unsafe fn process_f32(&mut self, channels: RawChannels<f32>) {
        // SAFETY: forwarded from the caller.
        unsafe {
            self.process_with("processReplacing", channels, |commands, buffer| {
                commands.process_replacing(buffer)
            })
        }
    }

    /// Double precision replacing process.
    ///
    /// # Safety
    /// See [`process_f32`](Self::process_f32).
    pub unsafe fn process_f64(&mut self, channels: RawChannels<f64>) {
        // SAFETY: forwarded from the caller.
        unsafe {
            self.process_with("processDoubleReplacing", channels, |commands, buffer| {
                commands.process_double_replacing(buffer)
            })
        }
    }

    /// Deprecated accumulating process. Does nothing unless the plugin
    /// exposes the legacy vocabulary.
    ///
    /// # Safety
    /// See [`process_f32`](Self::process_f32).
    pub unsafe fn process_accumulating(&mut self, channels: RawChannels<f32>) {
        // SAFETY: forwarded from the caller.
        unsafe {
            self.process_with("process", channels, |commands, buffer| {
                match commands.legacy() {
                    Some(legacy) => legacy.process_accumulating(buffer),
                    None => Ok(()),
                }
            })
        }
    }

    /// # Safety
    /// See [`process_f32`](Self::process_f32).
    unsafe fn process_with<S: Sample>(
        &mut self,
        op: &'static str,
        channels: RawChannels<S>,
        f: impl FnOnce(&mut dyn PluginCommands, &mut AudioBuffer<'_, S>) -> PluginResult<()>,
    ) {
        let Some(commands) = self.commands.as_deref_mut() else {
            warn!("{op} called without a bound plugin");
            return;
        };

        let Ok(num_samples) = usize::try_from(channels.frames) else {
            warn!("{op}: negative frame count {}", channels.frames);
            return;
        };
        if num_samples == 0 {
            return;
        }

        let num_inputs = channel_count(channels.num_inputs);
        let num_outputs = channel_count(channels.num_outputs);
        if (num_inputs > 0 && channels.inputs.is_null())
            || (num_outputs > 0 && channels.outputs.is_null())
        {
            warn!("{op}: null channel array");
            return;
        }

        // Fixed arrays keep the audio thread free of allocations.
        let empty: &[S] = &[];
        let mut input_slices = [empty; MAX_CHANNELS];
        for (i, slot) in input_slices[..num_inputs].iter_mut().enumerate() {
            // SAFETY: the array holds `num_inputs` channel pointers.
            let channel = unsafe { *channels.inputs.add(i) };
            if !channel.is_null() {
                // SAFETY: each channel holds `frames` samples.
                *slot = unsafe { slice::from_raw_parts(channel, num_samples) };
            }
        }

        let mut output_slices: [&mut [S]; MAX_CHANNELS] =
            std::array::from_fn(|_| <&mut [S]>::default());
        for (i, slot) in output_slices[..num_outputs].iter_mut().enumerate() {
            // SAFETY: the array holds `num_outputs` channel pointers.
            let channel = unsafe { *channels.outputs.add(i) };
            if !channel.is_null() {
                // SAFETY: each channel holds `frames` samples. A host processing
                // in place passes the same pointer as the matching input, so
                // this slice may alias `input_slices[i]`; `AudioBuffer` requires
                // plugins to read an input sample before writing its output and
                // skips the passthrough copy for such channels.
                *slot = unsafe { slice::from_raw_parts_mut(channel, num_samples) };
            }
        }

        let mut buffer = AudioBuffer::new(
            &input_slices[..num_inputs],
            &mut output_slices[..num_outputs],
            num_samples,
        );

        if let Err(err) = guard(|| f(commands, &mut buffer)) {
            error!("{op} failed: {err}");
        }
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    pub fn set_parameter(&mut self, index: i32, value: f32) {
        trace!("setParameter: index={index} value={value}");

        let Some(commands) = self.commands.as_deref_mut() else {
            warn!("setParameter called without a bound plugin");
            return;
        };

        if let Err(err) = guard(|| commands.set_parameter(index, value)) {
            error!("setParameter({index}) failed: {err}");
        }
    }

    /// Returns 0.0 if the plugin fails.
    pub fn get_parameter(&self, index: i32) -> f32 {
        let Some(commands) = self.commands.as_deref() else {
            warn!("getParameter called without a bound plugin");
            return 0.0;
        };

        match guard(|| commands.parameter(index)) {
            Ok(value) => {
                trace!("getParameter: index={index} value={value}");
                value
            }
            Err(err) => {
                error!("getParameter({index}) failed: {err}");
                0.0
            }
        }
    }
}

impl Drop for CommandProxy {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn channel_count(count: i32) -> usize {
    usize::try_from(count).unwrap_or(0).min(MAX_CHANNELS)
}

fn copy_optional(text: Option<String>, buffer: &mut [c_char]) -> isize {
    match text {
        Some(text) => {
            copy_cstring(&text, buffer);
            1
        }
        None => 0,
    }
}

fn invalid_enum(what: &str, value: isize) -> PluginError {
    PluginError::InvalidArgument(format!("unknown {what} {value}"))
}

/// Borrowed state for one dispatch call.
struct Session<'a> {
    commands: &'a mut dyn PluginCommands,
    memory: &'a mut MemoryTracker,
    editor_rect: &'a mut ERect,
}

impl Session<'_> {
    /// Current vocabulary.
    ///
    /// # Safety
    /// See [`CommandProxy::dispatch`].
    unsafe fn dispatch(
        &mut self,
        op: Opcode,
        index: i32,
        value: isize,
        ptr: *mut c_void,
        opt: f32,
    ) -> PluginResult<isize> {
        let commands = &mut *self.commands;

        let result = match op {
            Opcode::Open => {
                commands.open()?;
                0
            }
            Opcode::Close => {
                commands.close()?;
                0
            }
            Opcode::SetProgram => {
                commands.set_program(value as i32)?;
                1
            }
            Opcode::GetProgram => commands.program()? as isize,
            Opcode::SetProgramName => {
                // SAFETY: ptr is a C string for this opcode.
                let name = unsafe { read_cstring(ptr) }?;
                commands.set_program_name(&name)?;
                1
            }
            Opcode::GetProgramName => {
                // SAFETY: ptr is a program name buffer for this opcode.
                let buffer = unsafe { string_buffer(ptr, abi::MAX_PROG_NAME_LEN) }?;
                copy_cstring(&commands.program_name()?, buffer);
                1
            }
            Opcode::GetParamLabel => {
                // SAFETY: ptr is a parameter string buffer for this opcode.
                let buffer = unsafe { string_buffer(ptr, abi::MAX_PARAM_STR_LEN) }?;
                copy_cstring(&commands.parameter_label(index)?, buffer);
                1
            }
            Opcode::GetParamDisplay => {
                // SAFETY: ptr is a parameter string buffer for this opcode.
                let buffer = unsafe { string_buffer(ptr, abi::MAX_PARAM_STR_LEN) }?;
                copy_cstring(&commands.parameter_display(index)?, buffer);
                1
            }
            Opcode::GetParamName => {
                // SAFETY: ptr is a parameter string buffer for this opcode.
                let buffer = unsafe { string_buffer(ptr, abi::MAX_PARAM_STR_LEN) }?;
                copy_cstring(&commands.parameter_name(index)?, buffer);
                1
            }
            Opcode::SetSampleRate => {
                commands.set_sample_rate(opt)?;
                1
            }
            Opcode::SetBlockSize => {
                commands.set_block_size(value as i32)?;
                1
            }
            Opcode::MainsChanged => {
                // The host has finished reading anything handed out before
                // a state toggle.
                let released = self.memory.clear_all();
                if released > 0 {
                    debug!("Released {released} tracked block(s)");
                }
                commands.mains_changed(value != 0)?;
                1
            }
            Opcode::EditGetRect => {
                let slot = out_slot::<*mut ERect>(ptr, "editor rect slot")?;
                match commands.editor_rect()? {
                    Some(rect) => {
                        *self.editor_rect = rect_to_native(rect);
                        // SAFETY: slot is non-null and points at the host's
                        // rect pointer for this opcode.
                        unsafe { *slot = &mut *self.editor_rect };
                        1
                    }
                    None => 0,
                }
            }
            Opcode::EditOpen => isize::from(commands.editor_open(ParentWindow(ptr))?),
            Opcode::EditClose => {
                commands.editor_close()?;
                1
            }
            Opcode::EditIdle => {
                commands.editor_idle()?;
                1
            }
            Opcode::GetChunk => {
                let slot = out_slot::<*mut c_void>(ptr, "chunk slot")?;
                // SAFETY: slot is non-null and points at the host's data
                // pointer for this opcode.
                unsafe { *slot = std::ptr::null_mut() };

                match commands.chunk(index != 0)? {
                    Some(bytes) => {
                        let len = bytes.len() as isize;
                        let data = self.memory.register_block(bytes.into_boxed_slice());
                        // SAFETY: as above.
                        unsafe { *slot = data.cast() };
                        len
                    }
                    None => 0,
                }
            }
            Opcode::SetChunk => {
                // SAFETY: ptr holds `value` bytes for this opcode.
                let data = unsafe { read_bytes(ptr, value) }?;
                isize::from(commands.set_chunk(data, index != 0)?)
            }
            Opcode::ProcessEvents => {
                // SAFETY: ptr is an event list for this opcode.
                let events = unsafe { events_from_native(ptr) }?;
                isize::from(commands.process_events(&events)?)
            }
            Opcode::CanBeAutomated => isize::from(commands.can_parameter_be_automated(index)?),
            Opcode::String2Parameter => {
                // SAFETY: ptr is a C string for this opcode.
                let text = unsafe { read_cstring(ptr) }?;
                isize::from(commands.string_to_parameter(index, &text)?)
            }
            Opcode::GetProgramNameIndexed => {
                // SAFETY: ptr is a program name buffer for this opcode.
                let buffer = unsafe { string_buffer(ptr, abi::MAX_PROG_NAME_LEN) }?;
                copy_optional(commands.program_name_indexed(index)?, buffer)
            }
            Opcode::GetInputProperties => {
                // SAFETY: ptr is a pin properties struct for this opcode.
                let native = unsafe { native_mut::<abi::VstPinProperties>(ptr, "pin properties") }?;
                match commands.input_properties(index)? {
                    Some(props) => {
                        pin_properties_to_native(&props, native);
                        1
                    }
                    None => 0,
                }
            }
            Opcode::GetOutputProperties => {
                // SAFETY: ptr is a pin properties struct for this opcode.
                let native = unsafe { native_mut::<abi::VstPinProperties>(ptr, "pin properties") }?;
                match commands.output_properties(index)? {
                    Some(props) => {
                        pin_properties_to_native(&props, native);
                        1
                    }
                    None => 0,
                }
            }
            Opcode::GetPlugCategory => commands.category()? as isize,
            Opcode::SetSpeakerArrangement => {
                // SAFETY: value and ptr are each null or an arrangement for
                // this opcode.
                let (input, output) = unsafe {
                    (
                        speaker_arrangement_from_native(value as *const c_void)?,
                        speaker_arrangement_from_native(ptr)?,
                    )
                };
                isize::from(commands.set_speaker_arrangement(input.as_ref(), output.as_ref())?)
            }
            Opcode::SetBypass => isize::from(commands.set_bypass(value != 0)?),
            Opcode::GetEffectName => {
                // SAFETY: ptr is an effect name buffer for this opcode.
                let buffer = unsafe { string_buffer(ptr, abi::MAX_EFFECT_NAME_LEN) }?;
                copy_optional(commands.effect_name()?, buffer)
            }
            Opcode::GetVendorString => {
                // SAFETY: ptr is a vendor string buffer for this opcode.
                let buffer = unsafe { string_buffer(ptr, abi::MAX_VENDOR_STR_LEN) }?;
                copy_optional(commands.vendor_string()?, buffer)
            }
            Opcode::GetProductString => {
                // SAFETY: ptr is a product string buffer for this opcode.
                let buffer = unsafe { string_buffer(ptr, abi::MAX_PRODUCT_STR_LEN) }?;
                copy_optional(commands.product_string()?, buffer)
            }
            Opcode::GetVendorVersion => commands.vendor_version()? as isize,
            Opcode::CanDo => {
                // SAFETY: ptr is a C string for this opcode.
                let capability = unsafe { read_cstring(ptr) }?;
                commands.can_do(&capability)? as isize
            }
            Opcode::GetTailSize => commands.tail_size()? as isize,
            Opcode::GetParameterProperties => {
                // SAFETY: ptr is a parameter properties struct for this opcode.
                let native = unsafe {
                    native_mut::<abi::VstParameterProperties>(ptr, "parameter properties")
                }?;
                match commands.parameter_properties(index)? {
                    Some(props) => {
                        parameter_properties_to_native(&props, native);
                        1
                    }
                    None => 0,
                }
            }
            Opcode::GetVstVersion => commands.vst_version()? as isize,
            Opcode::EditKeyDown => {
                let key = key_code_from_native(index, value, opt);
                isize::from(commands.editor_key_down(key)?)
            }
            Opcode::EditKeyUp => {
                let key = key_code_from_native(index, value, opt);
                isize::from(commands.editor_key_up(key)?)
            }
            Opcode::SetEditKnobMode => {
                let mode = KnobMode::from_raw(value as i32)
                    .ok_or_else(|| invalid_enum("knob mode", value))?;
                isize::from(commands.set_editor_knob_mode(mode)?)
            }
            Opcode::GetMidiProgramName => {
                // SAFETY: ptr is a MIDI program name struct for this opcode.
                let native = unsafe { native_mut::<abi::MidiProgramName>(ptr, "MIDI program name") }?;
                let mut program = midi_program_name_from_native(native);
                let result = commands.midi_program_name(&mut program, index)?;
                midi_program_name_to_native(&program, native);
                result as isize
            }
            Opcode::GetCurrentMidiProgram => {
                // SAFETY: ptr is a MIDI program name struct for this opcode.
                let native = unsafe { native_mut::<abi::MidiProgramName>(ptr, "MIDI program name") }?;
                let mut program = midi_program_name_from_native(native);
                let result = commands.current_midi_program_name(&mut program, index)?;
                midi_program_name_to_native(&program, native);
                result as isize
            }
            Opcode::GetMidiProgramCategory => {
                // SAFETY: ptr is a MIDI program category struct for this opcode.
                let native = unsafe {
                    native_mut::<abi::MidiProgramCategory>(ptr, "MIDI program category")
                }?;
                let mut category = midi_program_category_from_native(native);
                let result = commands.midi_program_category(&mut category, index)?;
                midi_program_category_to_native(&category, native);
                result as isize
            }
            Opcode::HasMidiProgramsChanged => isize::from(commands.has_midi_programs_changed(index)?),
            Opcode::GetMidiKeyName => {
                // SAFETY: ptr is a MIDI key name struct for this opcode.
                let native = unsafe { native_mut::<abi::MidiKeyName>(ptr, "MIDI key name") }?;
                let mut key = midi_key_name_from_native(native);
                let named = commands.midi_key_name(&mut key, index)?;
                midi_key_name_to_native(&key, native);
                isize::from(named)
            }
            Opcode::BeginSetProgram => isize::from(commands.begin_set_program()?),
            Opcode::EndSetProgram => isize::from(commands.end_set_program()?),
            Opcode::GetSpeakerArrangement => {
                let input_slot = out_slot::<*mut c_void>(value as *mut c_void, "input arrangement slot")?;
                let output_slot = out_slot::<*mut c_void>(ptr, "output arrangement slot")?;
                // SAFETY: both slots are non-null and point at the host's
                // arrangement pointers for this opcode.
                unsafe {
                    *input_slot = std::ptr::null_mut();
                    *output_slot = std::ptr::null_mut();
                }

                match commands.speaker_arrangement()? {
                    Some((input, output)) => {
                        let input = speaker_arrangement_to_native(&input)?;
                        let output = speaker_arrangement_to_native(&output)?;
                        // SAFETY: as above.
                        unsafe {
                            *input_slot = self.memory.register_object(input);
                            *output_slot = self.memory.register_object(output);
                        }
                        1
                    }
                    None => 0,
                }
            }
            Opcode::StartProcess => commands.start_process()? as isize,
            Opcode::StopProcess => commands.stop_process()? as isize,
            Opcode::SetPanLaw => {
                let law =
                    PanLaw::from_raw(value as i32).ok_or_else(|| invalid_enum("pan law", value))?;
                isize::from(commands.set_pan_law(law, opt)?)
            }
            Opcode::BeginLoadBank => {
                // SAFETY: ptr is a patch chunk info struct for this opcode.
                let native = unsafe { native_ref::<abi::VstPatchChunkInfo>(ptr, "patch chunk info") }?;
                commands.begin_load_bank(&patch_chunk_info_from_native(native))? as isize
            }
            Opcode::BeginLoadProgram => {
                // SAFETY: ptr is a patch chunk info struct for this opcode.
                let native = unsafe { native_ref::<abi::VstPatchChunkInfo>(ptr, "patch chunk info") }?;
                commands.begin_load_program(&patch_chunk_info_from_native(native))? as isize
            }
            Opcode::SetProcessPrecision => {
                let precision = ProcessPrecision::from_raw(value as i32)
                    .ok_or_else(|| invalid_enum("process precision", value))?;
                isize::from(commands.set_process_precision(precision)?)
            }
            Opcode::GetNumMidiInputChannels => commands.midi_input_channel_count()? as isize,
            Opcode::GetNumMidiOutputChannels => commands.midi_output_channel_count()? as isize,

            Opcode::GetVu
            | Opcode::EditKey
            | Opcode::EditTop
            | Opcode::EditSleep
            | Opcode::Identify
            | Opcode::GetNumProgramCategories
            | Opcode::CopyProgram
            | Opcode::ConnectInput
            | Opcode::ConnectOutput
            | Opcode::GetCurrentPosition
            | Opcode::GetDestinationBuffer
            | Opcode::SetBlockSizeAndSampleRate
            | Opcode::GetErrorText
            | Opcode::Idle
            | Opcode::GetIcon
            | Opcode::SetViewPosition
            | Opcode::KeysRequired => {
                // SAFETY: forwarded from the caller.
                unsafe { self.dispatch_legacy(op, index, value, ptr, opt) }?
            }

            Opcode::EditDraw
            | Opcode::EditMouse
            | Opcode::OfflineNotify
            | Opcode::OfflinePrepare
            | Opcode::OfflineRun
            | Opcode::ProcessVarIo
            | Opcode::VendorSpecific
            | Opcode::ShellGetNextPlugin
            | Opcode::SetTotalSampleToProcess => {
                debug!("Unhandled dispatcher opcode: {op:?}");
                0
            }
        };

        Ok(result)
    }

    /// Older vocabulary, answered only if the plugin opts in.
    ///
    /// # Safety
    /// See [`CommandProxy::dispatch`].
    unsafe fn dispatch_legacy(
        &mut self,
        op: Opcode,
        index: i32,
        value: isize,
        ptr: *mut c_void,
        opt: f32,
    ) -> PluginResult<isize> {
        let Some(legacy) = self.commands.legacy() else {
            info!("Unhandled dispatcher opcode: {op:?} (no legacy support)");
            return Ok(0);
        };

        let result = match op {
            // Scaled to the 0..32767 integer range hosts expect.
            Opcode::GetVu => (legacy.vu()? * 32767.0) as isize,
            Opcode::EditKey => isize::from(legacy.editor_key(value as i32)?),
            Opcode::EditTop => isize::from(legacy.editor_top()?),
            Opcode::EditSleep => isize::from(legacy.editor_sleep()?),
            Opcode::Identify => legacy.identify()? as isize,
            Opcode::GetNumProgramCategories => legacy.program_categories_count()? as isize,
            Opcode::CopyProgram => isize::from(legacy.copy_current_program_to(index)?),
            Opcode::ConnectInput => isize::from(legacy.connect_input(index, value != 0)?),
            Opcode::ConnectOutput => isize::from(legacy.connect_output(index, value != 0)?),
            Opcode::GetCurrentPosition => legacy.current_position()? as isize,
            Opcode::GetDestinationBuffer => legacy
                .destination_buffer()?
                .map_or(0, |buffer| buffer.as_mut_ptr() as isize),
            Opcode::SetBlockSizeAndSampleRate => {
                isize::from(legacy.set_block_size_and_sample_rate(value as i32, opt)?)
            }
            Opcode::GetErrorText => {
                // SAFETY: ptr is an error text buffer for this opcode.
                let buffer = unsafe { string_buffer(ptr, abi::MAX_ERROR_TEXT_LEN) }?;
                copy_optional(legacy.error_text()?, buffer)
            }
            Opcode::Idle => isize::from(legacy.idle()?),
            Opcode::GetIcon => {
                // The icon pointer format was never defined.
                debug!("Icon query ignored");
                0
            }
            Opcode::SetViewPosition => {
                isize::from(legacy.set_view_position(Point::new(index, value as i32))?)
            }
            // 0 means keys are required, 1 means they are not.
            Opcode::KeysRequired => isize::from(!legacy.keys_required()?),
            other => {
                info!("Unhandled dispatcher opcode: {other:?}");
                0
            }
        };

        Ok(result)
    }
}
