//! Speaker arrangement types.
//!
//! An arrangement is a layout tag plus one [`SpeakerProperties`] entry per
//! channel. Hosts negotiate arrangements for the main input and output before
//! processing starts.

/// Arrangement type tags.
pub mod arrangement {
    pub const USER_DEFINED: i32 = -2;
    pub const EMPTY: i32 = -1;
    pub const MONO: i32 = 0;
    pub const STEREO: i32 = 1;
    pub const STEREO_SURROUND: i32 = 2;
    pub const STEREO_CENTER: i32 = 3;
    pub const STEREO_SIDE: i32 = 4;
    pub const STEREO_CLFE: i32 = 5;
    pub const CINE_30: i32 = 6;
    pub const MUSIC_30: i32 = 7;
    pub const CINE_31: i32 = 8;
    pub const MUSIC_31: i32 = 9;
    pub const CINE_40: i32 = 10;
    pub const MUSIC_40: i32 = 11;
    pub const CINE_41: i32 = 12;
    pub const MUSIC_41: i32 = 13;
    /// 5.0 surround.
    pub const SURROUND_50: i32 = 14;
    /// 5.1 surround.
    pub const SURROUND_51: i32 = 15;
    pub const CINE_60: i32 = 16;
    pub const MUSIC_60: i32 = 17;
    pub const CINE_61: i32 = 18;
    pub const MUSIC_61: i32 = 19;
    pub const CINE_70: i32 = 20;
    pub const MUSIC_70: i32 = 21;
    pub const CINE_71: i32 = 22;
    pub const MUSIC_71: i32 = 23;
    pub const CINE_80: i32 = 24;
    pub const MUSIC_80: i32 = 25;
    pub const CINE_81: i32 = 26;
    pub const MUSIC_81: i32 = 27;
    pub const SURROUND_102: i32 = 28;
}

/// Speaker type tags.
pub mod speaker_type {
    pub const UNDEFINED: i32 = 0x7fff_ffff;
    pub const MONO: i32 = 0;
    pub const LEFT: i32 = 1;
    pub const RIGHT: i32 = 2;
    pub const CENTER: i32 = 3;
    pub const LFE: i32 = 4;
    pub const LEFT_SURROUND: i32 = 5;
    pub const RIGHT_SURROUND: i32 = 6;
    pub const LEFT_CENTER: i32 = 7;
    pub const RIGHT_CENTER: i32 = 8;
    pub const SURROUND: i32 = 9;
    pub const SIDE_LEFT: i32 = 10;
    pub const SIDE_RIGHT: i32 = 11;
}

/// Placement and identity of a single speaker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpeakerProperties {
    /// Horizontal angle in radians, -PI (left) to PI (right); 10.0 for LFE.
    pub azimuth: f32,
    /// Vertical angle in radians, -PI/2 (bottom) to PI/2 (top); 10.0 for LFE.
    pub elevation: f32,
    /// Distance in meters; 0.0 for LFE.
    pub radius: f32,
    /// Speaker name (up to 63 bytes survive the round trip).
    pub name: String,
    /// See [`speaker_type`].
    pub speaker_type: i32,
}

impl SpeakerProperties {
    /// A speaker of the given type with no placement information.
    pub fn new(name: impl Into<String>, speaker_type: i32) -> Self {
        Self {
            name: name.into(),
            speaker_type,
            ..Default::default()
        }
    }
}

/// A speaker layout for one direction (input or output).
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerArrangement {
    /// See [`arrangement`].
    pub arrangement_type: i32,
    /// One entry per channel.
    pub speakers: Vec<SpeakerProperties>,
}

impl SpeakerArrangement {
    /// Create an arrangement from a type tag and speakers.
    pub fn new(arrangement_type: i32, speakers: Vec<SpeakerProperties>) -> Self {
        Self {
            arrangement_type,
            speakers,
        }
    }

    /// A single mono speaker.
    pub fn mono() -> Self {
        Self::new(
            arrangement::MONO,
            vec![SpeakerProperties::new("M", speaker_type::MONO)],
        )
    }

    /// Left and right speakers.
    pub fn stereo() -> Self {
        Self::new(
            arrangement::STEREO,
            vec![
                SpeakerProperties::new("L", speaker_type::LEFT),
                SpeakerProperties::new("R", speaker_type::RIGHT),
            ],
        )
    }

    /// An arrangement with no channels.
    pub fn empty() -> Self {
        Self::new(arrangement::EMPTY, Vec::new())
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.speakers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(SpeakerArrangement::mono().num_channels(), 1);

        let stereo = SpeakerArrangement::stereo();
        assert_eq!(stereo.arrangement_type, arrangement::STEREO);
        assert_eq!(stereo.speakers[1].speaker_type, speaker_type::RIGHT);
        assert_eq!(stereo.speakers[1].name, "R");

        assert_eq!(SpeakerArrangement::empty().num_channels(), 0);
    }
}
