//! MIDI event and MIDI program metadata types.

/// A timestamped event delivered by the host before a process call.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A short MIDI message.
    Midi(MidiEvent),
    /// A system exclusive dump.
    SysEx(SysExEvent),
    /// An event type this adapter does not decode.
    Unknown {
        /// Raw event type tag.
        event_type: i32,
        /// Sample offset into the next process block.
        delta_frames: i32,
    },
}

impl Event {
    /// Sample offset into the next process block.
    pub fn delta_frames(&self) -> i32 {
        match self {
            Self::Midi(event) => event.delta_frames,
            Self::SysEx(event) => event.delta_frames,
            Self::Unknown { delta_frames, .. } => *delta_frames,
        }
    }
}

/// A short (1 to 3 byte) MIDI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MidiEvent {
    /// Sample offset into the next process block.
    pub delta_frames: i32,
    /// Status byte followed by up to two data bytes.
    pub data: [u8; 3],
    /// Note length in samples, 0 if unknown.
    pub note_length: i32,
    /// Offset in samples into the note, 0 if unknown.
    pub note_offset: i32,
    /// Detune in cents (-64 to +63).
    pub detune: i8,
    /// Note-off velocity (0 to 127).
    pub note_off_velocity: u8,
    /// The event was played live rather than from a sequencer track.
    pub realtime: bool,
}

impl MidiEvent {
    /// Status nibble (message kind) without the channel.
    pub fn status(&self) -> u8 {
        self.data[0] & 0xF0
    }

    /// MIDI channel (0-15).
    pub fn channel(&self) -> u8 {
        self.data[0] & 0x0F
    }
}

/// A system exclusive dump.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SysExEvent {
    /// Sample offset into the next process block.
    pub delta_frames: i32,
    /// Raw dump bytes, including the framing `F0`/`F7` bytes if the host sent them.
    pub data: Vec<u8>,
    /// The event was played live rather than from a sequencer track.
    pub realtime: bool,
}

/// Flags for [`MidiProgramName::flags`].
pub mod program_flags {
    /// The program is an omni program (all channels).
    pub const OMNI: i32 = 1;
}

/// Flags for [`MidiKeyName::flags`] and [`MidiProgramCategory::flags`] (reserved).
pub const NO_FLAGS: i32 = 0;

/// Name and selection data of one MIDI program.
///
/// The host fills [`program_index`](Self::program_index) before asking; the
/// plugin fills everything else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MidiProgramName {
    /// Program index being queried (0 .. number of programs).
    pub program_index: i32,
    /// Program name.
    pub name: String,
    /// Program change number (0-127), -1 if not used.
    pub midi_program: i8,
    /// Bank select MSB (0-127), -1 if not used.
    pub midi_bank_msb: i8,
    /// Bank select LSB (0-127), -1 if not used.
    pub midi_bank_lsb: i8,
    /// Index of the parent category, -1 if none.
    pub parent_category_index: i32,
    /// See [`program_flags`].
    pub flags: i32,
}

/// A MIDI program category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MidiProgramCategory {
    /// Category index being queried, filled by the host.
    pub category_index: i32,
    /// Category name.
    pub name: String,
    /// Index of the parent category, -1 if none.
    pub parent_category_index: i32,
    /// Reserved, 0.
    pub flags: i32,
}

/// Name of a single key within a MIDI program (drum maps).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MidiKeyName {
    /// Program index, filled by the host.
    pub program_index: i32,
    /// Key number (0-127), filled by the host.
    pub key_number: i32,
    /// Key name, filled by the plugin.
    pub name: String,
    /// Reserved, 0.
    pub flags: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_event_status() {
        let event = MidiEvent {
            data: [0x93, 60, 100],
            ..Default::default()
        };
        assert_eq!(event.status(), 0x90);
        assert_eq!(event.channel(), 3);
    }

    #[test]
    fn test_event_delta_frames() {
        let events = [
            Event::Midi(MidiEvent {
                delta_frames: 4,
                ..Default::default()
            }),
            Event::SysEx(SysExEvent {
                delta_frames: 8,
                data: vec![0xF0, 0x7E, 0xF7],
                realtime: false,
            }),
            Event::Unknown {
                event_type: 3,
                delta_frames: 12,
            },
        ];

        let offsets: Vec<i32> = events.iter().map(Event::delta_frames).collect();
        assert_eq!(offsets, vec![4, 8, 12]);
    }
}
