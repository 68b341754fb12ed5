//! Native VST 2.4 binary interface.
//!
//! Opcode values, string capacities and `#[repr(C)]` struct layouts as the
//! host expects them, byte for byte. Nothing here has behaviour; conversion
//! to domain values lives in [`crate::convert`].

use std::ffi::{c_char, c_void};

use ferrule_core::fourcc;

/// `AEffect::magic`.
pub const EFFECT_MAGIC: i32 = fourcc(b"VstP");

// =============================================================================
// Function Pointer Types
// =============================================================================

/// Plugin dispatcher, also the signature of the host callback.
pub type DispatcherProc = extern "C" fn(
    effect: *mut AEffect,
    opcode: i32,
    index: i32,
    value: isize,
    ptr: *mut c_void,
    opt: f32,
) -> isize;

/// Host callback (`audioMasterCallback`).
pub type HostCallbackProc = DispatcherProc;

/// Single precision process entry, replacing or accumulating.
pub type ProcessProc = extern "C" fn(
    effect: *mut AEffect,
    inputs: *const *const f32,
    outputs: *mut *mut f32,
    frames: i32,
);

/// Double precision replacing process entry.
pub type ProcessDoubleProc = extern "C" fn(
    effect: *mut AEffect,
    inputs: *const *const f64,
    outputs: *mut *mut f64,
    frames: i32,
);

pub type SetParameterProc = extern "C" fn(effect: *mut AEffect, index: i32, value: f32);

pub type GetParameterProc = extern "C" fn(effect: *mut AEffect, index: i32) -> f32;

/// Plugin entry point exported as `VSTPluginMain`.
pub type PluginMainProc = extern "C" fn(host: Option<HostCallbackProc>) -> *mut AEffect;

// =============================================================================
// Opcodes
// =============================================================================

macro_rules! opcodes {
    ($($(#[$meta:meta])* $name:ident = $value:literal,)*) => {
        /// Plugin dispatcher opcodes (`effXxx`).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum Opcode {
            $($(#[$meta])* $name = $value,)*
        }

        impl Opcode {
            /// Parse a raw opcode. Returns `None` for values outside the
            /// known vocabulary.
            pub const fn from_raw(value: i32) -> Option<Self> {
                match value {
                    $($value => Some(Self::$name),)*
                    _ => None,
                }
            }
        }
    };
}

opcodes! {
    Open = 0,
    Close = 1,
    SetProgram = 2,
    GetProgram = 3,
    SetProgramName = 4,
    GetProgramName = 5,
    GetParamLabel = 6,
    GetParamDisplay = 7,
    GetParamName = 8,
    /// Deprecated.
    GetVu = 9,
    SetSampleRate = 10,
    SetBlockSize = 11,
    MainsChanged = 12,
    EditGetRect = 13,
    EditOpen = 14,
    EditClose = 15,
    /// Deprecated.
    EditDraw = 16,
    /// Deprecated.
    EditMouse = 17,
    /// Deprecated.
    EditKey = 18,
    EditIdle = 19,
    /// Deprecated.
    EditTop = 20,
    /// Deprecated.
    EditSleep = 21,
    /// Deprecated.
    Identify = 22,
    GetChunk = 23,
    SetChunk = 24,
    ProcessEvents = 25,
    CanBeAutomated = 26,
    String2Parameter = 27,
    /// Deprecated.
    GetNumProgramCategories = 28,
    GetProgramNameIndexed = 29,
    /// Deprecated.
    CopyProgram = 30,
    /// Deprecated.
    ConnectInput = 31,
    /// Deprecated.
    ConnectOutput = 32,
    GetInputProperties = 33,
    GetOutputProperties = 34,
    GetPlugCategory = 35,
    /// Deprecated.
    GetCurrentPosition = 36,
    /// Deprecated.
    GetDestinationBuffer = 37,
    OfflineNotify = 38,
    OfflinePrepare = 39,
    OfflineRun = 40,
    ProcessVarIo = 41,
    SetSpeakerArrangement = 42,
    /// Deprecated.
    SetBlockSizeAndSampleRate = 43,
    SetBypass = 44,
    GetEffectName = 45,
    /// Deprecated.
    GetErrorText = 46,
    GetVendorString = 47,
    GetProductString = 48,
    GetVendorVersion = 49,
    VendorSpecific = 50,
    CanDo = 51,
    GetTailSize = 52,
    /// Deprecated.
    Idle = 53,
    /// Deprecated.
    GetIcon = 54,
    /// Deprecated.
    SetViewPosition = 55,
    GetParameterProperties = 56,
    /// Deprecated.
    KeysRequired = 57,
    GetVstVersion = 58,
    EditKeyDown = 59,
    EditKeyUp = 60,
    SetEditKnobMode = 61,
    GetMidiProgramName = 62,
    GetCurrentMidiProgram = 63,
    GetMidiProgramCategory = 64,
    HasMidiProgramsChanged = 65,
    GetMidiKeyName = 66,
    BeginSetProgram = 67,
    EndSetProgram = 68,
    GetSpeakerArrangement = 69,
    ShellGetNextPlugin = 70,
    StartProcess = 71,
    StopProcess = 72,
    SetTotalSampleToProcess = 73,
    SetPanLaw = 74,
    BeginLoadBank = 75,
    BeginLoadProgram = 76,
    SetProcessPrecision = 77,
    GetNumMidiInputChannels = 78,
    GetNumMidiOutputChannels = 79,
}

/// Host callback opcodes (`audioMasterXxx`) the adapter uses.
pub mod host_opcode {
    pub const AUTOMATE: i32 = 0;
    pub const VERSION: i32 = 1;
    pub const CURRENT_ID: i32 = 2;
    pub const IDLE: i32 = 3;
    pub const IO_CHANGED: i32 = 13;
    pub const SIZE_WINDOW: i32 = 15;
    pub const BEGIN_EDIT: i32 = 43;
    pub const END_EDIT: i32 = 44;
}

// =============================================================================
// String Capacities (bytes, including the NUL terminator)
// =============================================================================

pub const MAX_PROG_NAME_LEN: usize = 24;
pub const MAX_PARAM_STR_LEN: usize = 8;
pub const MAX_VENDOR_STR_LEN: usize = 64;
pub const MAX_PRODUCT_STR_LEN: usize = 64;
pub const MAX_EFFECT_NAME_LEN: usize = 32;
pub const MAX_NAME_LEN: usize = 64;
pub const MAX_LABEL_LEN: usize = 64;
pub const MAX_SHORT_LABEL_LEN: usize = 8;
pub const MAX_CATEG_LABEL_LEN: usize = 24;
pub const MAX_ERROR_TEXT_LEN: usize = 256;

/// Number of speakers that fit in the declared [`VstSpeakerArrangement`].
/// Larger arrangements extend past the end of the struct.
pub const DECLARED_SPEAKERS: usize = 8;

// =============================================================================
// Event Types
// =============================================================================

pub const EVENT_TYPE_MIDI: i32 = 1;
pub const EVENT_TYPE_SYSEX: i32 = 6;

/// `VstMidiEvent::flags`: played live.
pub const MIDI_EVENT_IS_REALTIME: i32 = 1;

// =============================================================================
// Structs
// =============================================================================

/// The effect descriptor the host holds for each plugin instance.
#[repr(C)]
pub struct AEffect {
    pub magic: i32,
    pub dispatcher: DispatcherProc,
    /// Deprecated accumulating process.
    pub process: ProcessProc,
    pub set_parameter: SetParameterProc,
    pub get_parameter: GetParameterProc,
    pub num_programs: i32,
    pub num_params: i32,
    pub num_inputs: i32,
    pub num_outputs: i32,
    pub flags: i32,
    pub reserved1: isize,
    pub reserved2: isize,
    pub initial_delay: i32,
    pub real_qualities: i32,
    pub off_qualities: i32,
    pub io_ratio: f32,
    /// Instance context; points at the owning effect shell.
    pub object: *mut c_void,
    /// Free for host use.
    pub user: *mut c_void,
    pub unique_id: i32,
    pub version: i32,
    pub process_replacing: ProcessProc,
    pub process_double_replacing: ProcessDoubleProc,
    pub future: [u8; 56],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ERect {
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct VstSpeakerProperties {
    pub azimuth: f32,
    pub elevation: f32,
    pub radius: f32,
    pub reserved: f32,
    pub name: [c_char; MAX_NAME_LEN],
    pub speaker_type: i32,
    pub future: [u8; 28],
}

/// Declared with eight speakers; hosts and plugins allocate more room for
/// larger arrangements.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VstSpeakerArrangement {
    pub arrangement_type: i32,
    pub num_channels: i32,
    pub speakers: [VstSpeakerProperties; DECLARED_SPEAKERS],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct VstPinProperties {
    pub label: [c_char; MAX_LABEL_LEN],
    pub flags: i32,
    pub arrangement_type: i32,
    pub short_label: [c_char; MAX_SHORT_LABEL_LEN],
    pub future: [u8; 48],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct VstParameterProperties {
    pub step_float: f32,
    pub small_step_float: f32,
    pub large_step_float: f32,
    pub label: [c_char; MAX_LABEL_LEN],
    pub flags: i32,
    pub min_integer: i32,
    pub max_integer: i32,
    pub step_integer: i32,
    pub large_step_integer: i32,
    pub short_label: [c_char; MAX_SHORT_LABEL_LEN],
    pub display_index: i16,
    pub category: i16,
    pub num_parameters_in_category: i16,
    pub reserved: i16,
    pub category_label: [c_char; MAX_CATEG_LABEL_LEN],
    pub future: [u8; 16],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct MidiProgramName {
    pub this_program_index: i32,
    pub name: [c_char; MAX_NAME_LEN],
    pub midi_program: i8,
    pub midi_bank_msb: i8,
    pub midi_bank_lsb: i8,
    pub reserved: i8,
    pub parent_category_index: i32,
    pub flags: i32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct MidiProgramCategory {
    pub this_category_index: i32,
    pub name: [c_char; MAX_NAME_LEN],
    pub parent_category_index: i32,
    pub flags: i32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct MidiKeyName {
    pub this_program_index: i32,
    pub this_key_number: i32,
    pub key_name: [c_char; MAX_NAME_LEN],
    pub reserved: i32,
    pub flags: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VstPatchChunkInfo {
    pub version: i32,
    pub plugin_unique_id: i32,
    pub plugin_version: i32,
    pub num_elements: i32,
    pub future: [u8; 48],
}

/// Event list passed with `ProcessEvents`. Declared with two slots; the host
/// allocates `num_events` of them.
#[repr(C)]
pub struct VstEvents {
    pub num_events: i32,
    pub reserved: isize,
    pub events: [*mut VstEvent; 2],
}

/// Common header of every event.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VstEvent {
    pub event_type: i32,
    pub byte_size: i32,
    pub delta_frames: i32,
    pub flags: i32,
    pub data: [u8; 16],
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VstMidiEvent {
    pub event_type: i32,
    pub byte_size: i32,
    pub delta_frames: i32,
    pub flags: i32,
    pub note_length: i32,
    pub note_offset: i32,
    pub midi_data: [u8; 4],
    pub detune: i8,
    pub note_off_velocity: u8,
    pub reserved1: u8,
    pub reserved2: u8,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VstMidiSysexEvent {
    pub event_type: i32,
    pub byte_size: i32,
    pub delta_frames: i32,
    pub flags: i32,
    pub dump_bytes: i32,
    pub reserved1: isize,
    pub sysex_dump: *mut u8,
    pub reserved2: isize,
}

/// All-zero value of a plain-data ABI struct.
///
/// # Safety
///
/// Implement only for structs made of integers, floats, byte arrays and raw
/// pointers, for which the all-zero bit pattern is a valid value.
pub unsafe trait Zeroed: Sized {
    fn zeroed() -> Self {
        // SAFETY: guaranteed by the implementor.
        unsafe { std::mem::zeroed() }
    }
}

// SAFETY: plain data.
unsafe impl Zeroed for VstSpeakerProperties {}
// SAFETY: plain data.
unsafe impl Zeroed for VstSpeakerArrangement {}
// SAFETY: plain data.
unsafe impl Zeroed for VstPinProperties {}
// SAFETY: plain data.
unsafe impl Zeroed for VstParameterProperties {}
// SAFETY: plain data.
unsafe impl Zeroed for MidiProgramName {}
// SAFETY: plain data.
unsafe impl Zeroed for MidiProgramCategory {}
// SAFETY: plain data.
unsafe impl Zeroed for MidiKeyName {}
// SAFETY: plain data.
unsafe impl Zeroed for VstPatchChunkInfo {}
// SAFETY: plain data.
unsafe impl Zeroed for VstMidiEvent {}
// SAFETY: plain data.
unsafe impl Zeroed for VstMidiSysexEvent {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_opcode_from_raw() {
        assert_eq!(Opcode::from_raw(0), Some(Opcode::Open));
        assert_eq!(Opcode::from_raw(23), Some(Opcode::GetChunk));
        assert_eq!(Opcode::from_raw(57), Some(Opcode::KeysRequired));
        assert_eq!(Opcode::from_raw(79), Some(Opcode::GetNumMidiOutputChannels));
        assert_eq!(Opcode::from_raw(80), None);
        assert_eq!(Opcode::from_raw(-1), None);

        for raw in 0..80 {
            let opcode = Opcode::from_raw(raw).unwrap();
            assert_eq!(opcode as i32, raw);
        }
    }

    #[test]
    fn test_magic() {
        assert_eq!(EFFECT_MAGIC, 0x5673_7450);
    }

    #[test]
    fn test_fixed_layouts() {
        assert_eq!(size_of::<ERect>(), 8);
        assert_eq!(size_of::<VstSpeakerProperties>(), 112);
        assert_eq!(offset_of!(VstSpeakerProperties, speaker_type), 80);
        assert_eq!(size_of::<VstSpeakerArrangement>(), 8 + 8 * 112);
        assert_eq!(size_of::<VstPinProperties>(), 128);
        assert_eq!(size_of::<VstParameterProperties>(), 152);
        assert_eq!(offset_of!(VstParameterProperties, category_label), 112);
        assert_eq!(size_of::<MidiProgramName>(), 80);
        assert_eq!(size_of::<MidiProgramCategory>(), 76);
        assert_eq!(size_of::<MidiKeyName>(), 80);
        assert_eq!(size_of::<VstPatchChunkInfo>(), 64);
        assert_eq!(size_of::<VstEvent>(), 32);
        assert_eq!(size_of::<VstMidiEvent>(), 32);
        assert_eq!(offset_of!(VstMidiEvent, midi_data), 24);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_pointer_sized_layouts() {
        assert_eq!(size_of::<AEffect>(), 192);
        assert_eq!(offset_of!(AEffect, dispatcher), 8);
        assert_eq!(offset_of!(AEffect, num_programs), 40);
        assert_eq!(offset_of!(AEffect, reserved1), 64);
        assert_eq!(offset_of!(AEffect, object), 96);
        assert_eq!(offset_of!(AEffect, unique_id), 112);
        assert_eq!(offset_of!(AEffect, process_replacing), 120);
        assert_eq!(offset_of!(AEffect, future), 136);

        assert_eq!(size_of::<VstEvents>(), 32);
        assert_eq!(offset_of!(VstEvents, events), 16);
        assert_eq!(size_of::<VstMidiSysexEvent>(), 48);
        assert_eq!(offset_of!(VstMidiSysexEvent, sysex_dump), 32);
    }
}
