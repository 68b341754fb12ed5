//! Conversions between native call arguments and domain values.
//!
//! Strings are copied into fixed host buffers truncated to capacity and
//! always NUL-terminated. Reading functions that take raw pointers are
//! `unsafe`: the caller vouches for the pointer per the command being
//! handled. A null pointer where a value is required is reported as
//! [`PluginError::InvalidArgument`].

use std::alloc::Layout;
use std::ffi::{c_char, c_void, CStr};
use std::mem::{align_of, offset_of, size_of};
use std::{ptr, slice};

use ferrule_core::{
    Event, KeyCode, MidiEvent, MidiKeyName, MidiProgramCategory, MidiProgramName,
    ModifierKeys, ParameterProperties, PatchChunkInfo, PinProperties, PluginError, PluginResult,
    Rect, SpeakerArrangement, SpeakerProperties, SysExEvent, VirtualKey,
};

use crate::abi::{self, ERect, VstSpeakerArrangement, VstSpeakerProperties};
use crate::memory::NativeBlock;

pub(crate) fn null_argument(what: &str) -> PluginError {
    PluginError::InvalidArgument(format!("null {what} pointer"))
}

// =============================================================================
// Strings
// =============================================================================

/// Copy a Rust string to a C-string buffer.
///
/// Truncates if the string is too long (never inside a UTF-8 sequence),
/// ensuring null-termination. An interior NUL ends the copy.
pub fn copy_cstring(src: &str, dst: &mut [c_char]) {
    let Some(capacity) = dst.len().checked_sub(1) else {
        return;
    };

    let bytes = src.as_bytes();
    let mut end = bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(bytes.len())
        .min(capacity);
    while !src.is_char_boundary(end) {
        end -= 1;
    }

    for (dst, src) in dst.iter_mut().zip(&bytes[..end]) {
        *dst = *src as c_char;
    }
    dst[end] = 0;
}

/// Read a C-string stored in a fixed array. Stops at the first NUL or at the
/// end of the array. Invalid UTF-8 is replaced.
pub fn string_from_array(src: &[c_char]) -> String {
    let bytes: Vec<u8> = src
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Read a NUL-terminated host string.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub unsafe fn read_cstring(ptr: *const c_void) -> PluginResult<String> {
    if ptr.is_null() {
        return Err(null_argument("string"));
    }

    // SAFETY: non-null and NUL-terminated per the caller.
    let text = unsafe { CStr::from_ptr(ptr.cast::<c_char>()) };
    Ok(text.to_string_lossy().into_owned())
}

/// Borrow a host string buffer of `capacity` bytes.
///
/// # Safety
/// `ptr` must be null or valid for writes of `capacity` bytes for `'a`.
pub unsafe fn string_buffer<'a>(ptr: *mut c_void, capacity: usize) -> PluginResult<&'a mut [c_char]> {
    if ptr.is_null() {
        return Err(null_argument("string buffer"));
    }

    // SAFETY: non-null and writable for `capacity` bytes per the caller.
    Ok(unsafe { slice::from_raw_parts_mut(ptr.cast::<c_char>(), capacity) })
}

// =============================================================================
// Bytes and Structs
// =============================================================================

/// Borrow `len` host bytes.
///
/// A zero length yields an empty slice regardless of `ptr`.
///
/// # Safety
/// If `len > 0`, `ptr` must be null or valid for reads of `len` bytes for `'a`.
pub unsafe fn read_bytes<'a>(ptr: *const c_void, len: isize) -> PluginResult<&'a [u8]> {
    let len = usize::try_from(len)
        .map_err(|_| PluginError::InvalidArgument(format!("negative byte length {len}")))?;
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(null_argument("byte buffer"));
    }

    // SAFETY: non-null and readable for `len` bytes per the caller.
    Ok(unsafe { slice::from_raw_parts(ptr.cast::<u8>(), len) })
}

/// Check an out-parameter slot before the plugin is asked for its value.
pub fn out_slot<T>(ptr: *mut c_void, what: &str) -> PluginResult<*mut T> {
    if ptr.is_null() {
        Err(null_argument(what))
    } else {
        Ok(ptr.cast())
    }
}

/// Reborrow a host struct pointer.
///
/// # Safety
/// `ptr` must be null or point to a valid, exclusively accessible `T` for `'a`.
pub unsafe fn native_mut<'a, T>(ptr: *mut c_void, what: &str) -> PluginResult<&'a mut T> {
    // SAFETY: null or valid per the caller.
    unsafe { ptr.cast::<T>().as_mut() }.ok_or_else(|| null_argument(what))
}

/// Reborrow a read-only host struct pointer.
///
/// # Safety
/// `ptr` must be null or point to a valid `T` for `'a`.
pub unsafe fn native_ref<'a, T>(ptr: *const c_void, what: &str) -> PluginResult<&'a T> {
    // SAFETY: null or valid per the caller.
    unsafe { ptr.cast::<T>().as_ref() }.ok_or_else(|| null_argument(what))
}

// =============================================================================
// Editor
// =============================================================================

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN.into(), i16::MAX.into()) as i16
}

/// Coordinates outside the `i16` range are clamped.
pub fn rect_to_native(rect: Rect) -> ERect {
    ERect {
        top: clamp_i16(rect.top),
        left: clamp_i16(rect.left),
        bottom: clamp_i16(rect.bottom),
        right: clamp_i16(rect.right),
    }
}

pub fn rect_from_native(rect: &ERect) -> Rect {
    Rect::new(
        rect.left.into(),
        rect.top.into(),
        rect.right.into(),
        rect.bottom.into(),
    )
}

/// `index` carries the ASCII character, `value` the virtual key and `opt`
/// the modifier bits.
pub fn key_code_from_native(index: i32, value: isize, opt: f32) -> KeyCode {
    KeyCode {
        character: index as u8,
        virtual_key: VirtualKey(value as i32),
        modifiers: ModifierKeys(opt as i32),
    }
}

// =============================================================================
// Speaker Arrangements
// =============================================================================

fn speaker_from_native(native: &VstSpeakerProperties) -> SpeakerProperties {
    SpeakerProperties {
        azimuth: native.azimuth,
        elevation: native.elevation,
        radius: native.radius,
        name: string_from_array(&native.name),
        speaker_type: native.speaker_type,
    }
}

fn speaker_to_native(speaker: &SpeakerProperties, native: &mut VstSpeakerProperties) {
    native.azimuth = speaker.azimuth;
    native.elevation = speaker.elevation;
    native.radius = speaker.radius;
    copy_cstring(&speaker.name, &mut native.name);
    native.speaker_type = speaker.speaker_type;
}

/// Layout of an arrangement with `count` speakers. Never smaller than the
/// declared struct.
fn speaker_arrangement_layout(count: usize) -> PluginResult<Layout> {
    let size = count
        .checked_mul(size_of::<VstSpeakerProperties>())
        .and_then(|speakers| speakers.checked_add(offset_of!(VstSpeakerArrangement, speakers)))
        .ok_or_else(|| PluginError::InvalidArgument(format!("{count} speakers")))?
        .max(size_of::<VstSpeakerArrangement>());

    Layout::from_size_align(size, align_of::<VstSpeakerArrangement>())
        .map_err(|e| PluginError::InvalidArgument(e.to_string()))
}

/// Read a host arrangement. A null pointer means the side is absent.
///
/// # Safety
/// `ptr` must be null or point to an arrangement header followed by
/// `num_channels` speaker entries.
pub unsafe fn speaker_arrangement_from_native(
    ptr: *const c_void,
) -> PluginResult<Option<SpeakerArrangement>> {
    let header = ptr.cast::<VstSpeakerArrangement>();
    if header.is_null() {
        return Ok(None);
    }

    // SAFETY: the header is valid per the caller.
    let (arrangement_type, num_channels) =
        unsafe { ((*header).arrangement_type, (*header).num_channels) };
    let count = usize::try_from(num_channels).map_err(|_| {
        PluginError::InvalidArgument(format!("negative channel count {num_channels}"))
    })?;

    // SAFETY: `num_channels` entries follow the header per the caller.
    let speakers = unsafe {
        let first = ptr::addr_of!((*header).speakers).cast::<VstSpeakerProperties>();
        slice::from_raw_parts(first, count)
    };

    Ok(Some(SpeakerArrangement::new(
        arrangement_type,
        speakers.iter().map(speaker_from_native).collect(),
    )))
}

/// Build a native arrangement sized for all of its speakers.
pub fn speaker_arrangement_to_native(arrangement: &SpeakerArrangement) -> PluginResult<NativeBlock> {
    let count = arrangement.speakers.len();
    let num_channels = i32::try_from(count)
        .map_err(|_| PluginError::InvalidArgument(format!("{count} speakers")))?;

    let block = NativeBlock::zeroed(speaker_arrangement_layout(count)?)?;
    let header = block.cast::<VstSpeakerArrangement>();

    // SAFETY: the block is zeroed, aligned for the header and large enough
    // for `count` speaker entries after it.
    unsafe {
        (*header).arrangement_type = arrangement.arrangement_type;
        (*header).num_channels = num_channels;

        let first = ptr::addr_of_mut!((*header).speakers).cast::<VstSpeakerProperties>();
        let natives = slice::from_raw_parts_mut(first, count);
        for (native, speaker) in natives.iter_mut().zip(&arrangement.speakers) {
            speaker_to_native(speaker, native);
        }
    }

    Ok(block)
}

// =============================================================================
// Properties
// =============================================================================

pub fn pin_properties_to_native(props: &PinProperties, native: &mut abi::VstPinProperties) {
    copy_cstring(&props.label, &mut native.label);
    native.flags = props.flags;
    native.arrangement_type = props.arrangement_type;
    copy_cstring(&props.short_label, &mut native.short_label);
}

pub fn parameter_properties_to_native(
    props: &ParameterProperties,
    native: &mut abi::VstParameterProperties,
) {
    native.step_float = props.step_float;
    native.small_step_float = props.small_step_float;
    native.large_step_float = props.large_step_float;
    copy_cstring(&props.label, &mut native.label);
    native.flags = props.flags;
    native.min_integer = props.min_integer;
    native.max_integer = props.max_integer;
    native.step_integer = props.step_integer;
    native.large_step_integer = props.large_step_integer;
    copy_cstring(&props.short_label, &mut native.short_label);
    native.display_index = props.display_index;
    native.category = props.category;
    native.num_parameters_in_category = props.num_parameters_in_category;
    copy_cstring(&props.category_label, &mut native.category_label);
}

pub fn patch_chunk_info_from_native(native: &abi::VstPatchChunkInfo) -> PatchChunkInfo {
    PatchChunkInfo {
        version: native.version,
        plugin_unique_id: native.plugin_unique_id,
        plugin_version: native.plugin_version,
        num_elements: native.num_elements,
    }
}

// =============================================================================
// MIDI Programs
// =============================================================================

pub fn midi_program_name_from_native(native: &abi::MidiProgramName) -> MidiProgramName {
    MidiProgramName {
        program_index: native.this_program_index,
        name: string_from_array(&native.name),
        midi_program: native.midi_program,
        midi_bank_msb: native.midi_bank_msb,
        midi_bank_lsb: native.midi_bank_lsb,
        parent_category_index: native.parent_category_index,
        flags: native.flags,
    }
}

pub fn midi_program_name_to_native(program: &MidiProgramName, native: &mut abi::MidiProgramName) {
    native.this_program_index = program.program_index;
    copy_cstring(&program.name, &mut native.name);
    native.midi_program = program.midi_program;
    native.midi_bank_msb = program.midi_bank_msb;
    native.midi_bank_lsb = program.midi_bank_lsb;
    native.parent_category_index = program.parent_category_index;
    native.flags = program.flags;
}

pub fn midi_program_category_from_native(native: &abi::MidiProgramCategory) -> MidiProgramCategory {
    MidiProgramCategory {
        category_index: native.this_category_index,
        name: string_from_array(&native.name),
        parent_category_index: native.parent_category_index,
        flags: native.flags,
    }
}

pub fn midi_program_category_to_native(
    category: &MidiProgramCategory,
    native: &mut abi::MidiProgramCategory,
) {
    native.this_category_index = category.category_index;
    copy_cstring(&category.name, &mut native.name);
    native.parent_category_index = category.parent_category_index;
    native.flags = category.flags;
}

pub fn midi_key_name_from_native(native: &abi::MidiKeyName) -> MidiKeyName {
    MidiKeyName {
        program_index: native.this_program_index,
        key_number: native.this_key_number,
        name: string_from_array(&native.key_name),
        flags: native.flags,
    }
}

pub fn midi_key_name_to_native(key: &MidiKeyName, native: &mut abi::MidiKeyName) {
    native.this_program_index = key.program_index;
    native.this_key_number = key.key_number;
    copy_cstring(&key.name, &mut native.key_name);
    native.flags = key.flags;
}

// =============================================================================
// Events
// =============================================================================

/// Decode a host event list. Null slots are skipped.
///
/// # Safety
/// `ptr` must be null or point to an event list whose `num_events` slots are
/// each null or point to an event of the declared type.
pub unsafe fn events_from_native(ptr: *const c_void) -> PluginResult<Vec<Event>> {
    let list = ptr.cast::<abi::VstEvents>();
    if list.is_null() {
        return Err(null_argument("event list"));
    }

    // SAFETY: the list header is valid per the caller.
    let num_events = unsafe { (*list).num_events };
    let count = usize::try_from(num_events)
        .map_err(|_| PluginError::InvalidArgument(format!("negative event count {num_events}")))?;

    // SAFETY: the host allocates `num_events` slots.
    let slots = unsafe {
        let first = ptr::addr_of!((*list).events).cast::<*mut abi::VstEvent>();
        slice::from_raw_parts(first, count)
    };

    Ok(slots
        .iter()
        // SAFETY: each slot is null or a valid event per the caller.
        .filter_map(|&slot| unsafe { event_from_native(slot) })
        .collect())
}

/// # Safety
/// `ptr` must be null or point to an event of the type its header declares.
unsafe fn event_from_native(ptr: *const abi::VstEvent) -> Option<Event> {
    // SAFETY: null or valid per the caller.
    let header = unsafe { ptr.as_ref() }?;

    let event = match header.event_type {
        abi::EVENT_TYPE_MIDI => {
            // SAFETY: MIDI events have the VstMidiEvent layout.
            let midi = unsafe { &*ptr.cast::<abi::VstMidiEvent>() };
            Event::Midi(MidiEvent {
                delta_frames: midi.delta_frames,
                data: [midi.midi_data[0], midi.midi_data[1], midi.midi_data[2]],
                note_length: midi.note_length,
                note_offset: midi.note_offset,
                detune: midi.detune,
                note_off_velocity: midi.note_off_velocity,
                realtime: midi.flags & abi::MIDI_EVENT_IS_REALTIME != 0,
            })
        }
        abi::EVENT_TYPE_SYSEX => {
            // SAFETY: SysEx events have the VstMidiSysexEvent layout.
            let sysex = unsafe { &*ptr.cast::<abi::VstMidiSysexEvent>() };
            let data = match usize::try_from(sysex.dump_bytes) {
                Ok(len) if len > 0 && !sysex.sysex_dump.is_null() => {
                    // SAFETY: the dump holds `dump_bytes` bytes.
                    unsafe { slice::from_raw_parts(sysex.sysex_dump, len) }.to_vec()
                }
                _ => Vec::new(),
            };
            Event::SysEx(SysExEvent {
                delta_frames: sysex.delta_frames,
                data,
                realtime: sysex.flags & abi::MIDI_EVENT_IS_REALTIME != 0,
            })
        }
        event_type => Event::Unknown {
            event_type,
            delta_frames: header.delta_frames,
        },
    };

    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Zeroed;
    use ferrule_core::speaker::arrangement;

    #[test]
    fn test_copy_cstring_truncates() {
        let mut buffer = [0x7f as c_char; 8];
        copy_cstring("Frequency", &mut buffer);
        assert_eq!(string_from_array(&buffer), "Frequen");
        assert_eq!(buffer[7], 0);

        copy_cstring("dB", &mut buffer);
        assert_eq!(string_from_array(&buffer), "dB");

        // Empty destination is left alone
        copy_cstring("x", &mut []);
    }

    #[test]
    fn test_copy_cstring_respects_char_boundary() {
        let mut buffer = [0 as c_char; 3];
        // Two bytes fit, but the second starts a two-byte character
        copy_cstring("aé", &mut buffer);
        assert_eq!(string_from_array(&buffer), "a");
    }

    #[test]
    fn test_copy_cstring_stops_at_interior_nul() {
        let mut buffer = [0x7f as c_char; 8];
        copy_cstring("ab\0cd", &mut buffer);
        assert_eq!(string_from_array(&buffer), "ab");
    }

    #[test]
    fn test_read_write_cstring() {
        let mut buffer = [0 as c_char; abi::MAX_PROG_NAME_LEN];
        // SAFETY: buffer is writable for its full length.
        unsafe {
            let dst = string_buffer(buffer.as_mut_ptr().cast(), buffer.len()).unwrap();
            copy_cstring("Init", dst);
            assert_eq!(read_cstring(buffer.as_ptr().cast()).unwrap(), "Init");
            assert!(read_cstring(ptr::null()).is_err());
            assert!(string_buffer(ptr::null_mut(), 24).is_err());
        }
    }

    #[test]
    fn test_read_bytes() {
        let data = [1u8, 2, 3];
        // SAFETY: data is readable for 3 bytes.
        unsafe {
            assert_eq!(read_bytes(data.as_ptr().cast(), 3).unwrap(), &[1, 2, 3]);
            assert!(read_bytes(ptr::null(), 0).unwrap().is_empty());
            assert!(read_bytes(ptr::null(), 3).is_err());
            assert!(read_bytes(data.as_ptr().cast(), -1).is_err());
        }
    }

    #[test]
    fn test_rect_clamps() {
        let native = rect_to_native(Rect::new(0, 0, 40_000, 300));
        assert_eq!(native.right, i16::MAX);
        assert_eq!(native.bottom, 300);
        assert_eq!(rect_from_native(&native).height(), 300);
    }

    #[test]
    fn test_key_code() {
        let key = key_code_from_native(b'a' as i32, VirtualKey::RETURN.0 as isize, 3.0);
        assert_eq!(key.character, b'a');
        assert_eq!(key.virtual_key, VirtualKey::RETURN);
        assert!(key.modifiers.shift());
        assert!(key.modifiers.alternate());
    }

    #[test]
    fn test_speaker_arrangement_beyond_declared_size() {
        let speakers: Vec<SpeakerProperties> = (0..10)
            .map(|i| SpeakerProperties::new(format!("S{i}"), i))
            .collect();
        let arrangement = SpeakerArrangement::new(arrangement::USER_DEFINED, speakers);

        let block = speaker_arrangement_to_native(&arrangement).unwrap();
        assert_eq!(
            block.layout().size(),
            offset_of!(VstSpeakerArrangement, speakers) + 10 * size_of::<VstSpeakerProperties>()
        );

        // SAFETY: the block holds a complete arrangement.
        let decoded = unsafe { speaker_arrangement_from_native(block.as_ptr().cast()) }
            .unwrap()
            .unwrap();
        assert_eq!(decoded, arrangement);
        assert_eq!(decoded.speakers[9].name, "S9");

        // SAFETY: null means absent.
        assert!(unsafe { speaker_arrangement_from_native(ptr::null()) }
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_small_arrangement_uses_declared_size() {
        let block = speaker_arrangement_to_native(&SpeakerArrangement::empty()).unwrap();
        assert_eq!(block.layout().size(), size_of::<VstSpeakerArrangement>());
    }

    #[test]
    fn test_midi_program_name_transfer() {
        let mut native = abi::MidiProgramName::zeroed();
        native.this_program_index = 5;

        let mut program = midi_program_name_from_native(&native);
        assert_eq!(program.program_index, 5);

        program.name = "Grand Piano".to_string();
        program.midi_program = 5;
        program.midi_bank_msb = -1;
        midi_program_name_to_native(&program, &mut native);

        assert_eq!(string_from_array(&native.name), "Grand Piano");
        assert_eq!(native.midi_program, 5);
        assert_eq!(native.midi_bank_msb, -1);
    }

    #[test]
    fn test_parameter_properties_to_native() {
        let props = ParameterProperties::new("Decibels")
            .with_int_range(-60, 12)
            .with_category(2, "Dynamics Section Long", 3);

        let mut native = abi::VstParameterProperties::zeroed();
        parameter_properties_to_native(&props, &mut native);

        assert_eq!(native.min_integer, -60);
        assert_eq!(native.category, 2);
        assert_eq!(string_from_array(&native.label), "Decibels");
        assert_eq!(string_from_array(&native.category_label), "Dynamics Section Long");
    }

    #[test]
    fn test_patch_chunk_info_from_native() {
        let mut native = abi::VstPatchChunkInfo::zeroed();
        native.version = 1;
        native.plugin_unique_id = ferrule_core::fourcc(b"FrGn");
        native.plugin_version = 1000;
        native.num_elements = 3;

        let info = patch_chunk_info_from_native(&native);
        assert_eq!(info.version, 1);
        assert_eq!(info.plugin_unique_id, ferrule_core::fourcc(b"FrGn"));
        assert_eq!(info.plugin_version, 1000);
        assert_eq!(info.num_elements, 3);
        assert!(native.future.iter().all(|&b| b == 0));
    }

    #[repr(C)]
    struct EventList<const N: usize> {
        num_events: i32,
        reserved: isize,
        events: [*mut abi::VstEvent; N],
    }

    #[test]
    fn test_events_from_native() {
        let mut note_on = abi::VstMidiEvent::zeroed();
        note_on.event_type = abi::EVENT_TYPE_MIDI;
        note_on.byte_size = size_of::<abi::VstMidiEvent>() as i32;
        note_on.delta_frames = 16;
        note_on.flags = abi::MIDI_EVENT_IS_REALTIME;
        note_on.midi_data = [0x90, 60, 100, 0];

        let mut dump = [0xF0u8, 0x43, 0x10, 0xF7];
        let mut sysex = abi::VstMidiSysexEvent::zeroed();
        sysex.event_type = abi::EVENT_TYPE_SYSEX;
        sysex.byte_size = size_of::<abi::VstMidiSysexEvent>() as i32;
        sysex.delta_frames = 32;
        sysex.dump_bytes = dump.len() as i32;
        sysex.sysex_dump = dump.as_mut_ptr();

        let mut unknown = abi::VstMidiEvent::zeroed();
        unknown.event_type = 3;
        unknown.delta_frames = 48;

        let mut list = EventList::<4> {
            num_events: 4,
            reserved: 0,
            events: [
                ptr::addr_of_mut!(note_on).cast(),
                ptr::null_mut(),
                ptr::addr_of_mut!(sysex).cast(),
                ptr::addr_of_mut!(unknown).cast(),
            ],
        };

        // SAFETY: the list and its events outlive the call.
        let events = unsafe { events_from_native(ptr::addr_of_mut!(list).cast()) }.unwrap();
        assert_eq!(events.len(), 3);

        match &events[0] {
            Event::Midi(midi) => {
                assert_eq!(midi.data, [0x90, 60, 100]);
                assert_eq!(midi.delta_frames, 16);
                assert!(midi.realtime);
            }
            other => panic!("expected MIDI event, got {other:?}"),
        }
        match &events[1] {
            Event::SysEx(sysex) => assert_eq!(sysex.data, dump.to_vec()),
            other => panic!("expected SysEx event, got {other:?}"),
        }
        assert_eq!(
            events[2],
            Event::Unknown {
                event_type: 3,
                delta_frames: 48
            }
        );

        // SAFETY: null is rejected before any read.
        assert!(unsafe { events_from_native(ptr::null()) }.is_err());
    }
}
