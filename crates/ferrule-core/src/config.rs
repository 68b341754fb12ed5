//! Static plugin configuration.
//!
//! [`PluginInfo`] holds the metadata the host reads from the effect
//! descriptor before it sends the first command: I/O counts, parameter and
//! program counts, unique id, version, latency and capability flags.
//!
//! # Example
//!
//! ```ignore
//! use ferrule_core::{fourcc, PluginFlags, PluginInfo};
//!
//! pub static INFO: PluginInfo = PluginInfo::new("My Plugin", fourcc(b"MyPl"))
//!     .with_vendor("My Company")
//!     .with_io(2, 2)
//!     .with_parameters(4)
//!     .with_flags(PluginFlags::new().with_replacing().with_program_chunks());
//! ```

/// Build a four-character code (unique id) from ASCII bytes.
pub const fn fourcc(code: &[u8; 4]) -> i32 {
    i32::from_be_bytes(*code)
}

/// Capability flags advertised in the effect descriptor.
///
/// Bit positions follow the published descriptor layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PluginFlags(i32);

impl PluginFlags {
    pub const HAS_EDITOR: i32 = 1 << 0;
    pub const CAN_REPLACING: i32 = 1 << 4;
    pub const PROGRAM_CHUNKS: i32 = 1 << 5;
    pub const IS_SYNTH: i32 = 1 << 8;
    pub const NO_SOUND_IN_STOP: i32 = 1 << 9;
    pub const CAN_DOUBLE_REPLACING: i32 = 1 << 12;

    /// No flags set.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Build from raw bits.
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// Raw bits as written to the descriptor.
    pub const fn bits(&self) -> i32 {
        self.0
    }

    pub const fn contains(&self, flag: i32) -> bool {
        self.0 & flag == flag
    }

    /// The plugin provides an editor.
    pub const fn with_editor(self) -> Self {
        Self(self.0 | Self::HAS_EDITOR)
    }

    /// The plugin supports single precision replacing processing.
    pub const fn with_replacing(self) -> Self {
        Self(self.0 | Self::CAN_REPLACING)
    }

    /// Program and bank data are exchanged as opaque chunks.
    pub const fn with_program_chunks(self) -> Self {
        Self(self.0 | Self::PROGRAM_CHUNKS)
    }

    /// The plugin is an instrument.
    pub const fn with_synth(self) -> Self {
        Self(self.0 | Self::IS_SYNTH)
    }

    /// The plugin produces no sound when fed silence.
    pub const fn with_no_sound_in_stop(self) -> Self {
        Self(self.0 | Self::NO_SOUND_IN_STOP)
    }

    /// The plugin supports double precision replacing processing.
    pub const fn with_double_replacing(self) -> Self {
        Self(self.0 | Self::CAN_DOUBLE_REPLACING)
    }
}

/// Plugin metadata copied into the effect descriptor.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Plugin name (diagnostics only; hosts query it with a command).
    pub name: &'static str,

    /// Vendor/company name (diagnostics only).
    pub vendor: &'static str,

    /// Unique plugin id, usually a four-character code.
    pub unique_id: i32,

    /// Plugin version, e.g. `1000` for 1.0.0.0.
    pub version: i32,

    /// Capability flags.
    pub flags: PluginFlags,

    /// Number of audio input channels.
    pub num_inputs: i32,

    /// Number of audio output channels.
    pub num_outputs: i32,

    /// Number of automatable parameters.
    pub num_parameters: i32,

    /// Number of programs.
    pub num_programs: i32,

    /// Processing latency in samples.
    pub initial_delay: i32,
}

impl PluginInfo {
    /// Create a configuration for a stereo, replacing-capable effect.
    pub const fn new(name: &'static str, unique_id: i32) -> Self {
        Self {
            name,
            vendor: "Unknown Vendor",
            unique_id,
            version: 1000,
            flags: PluginFlags::new().with_replacing(),
            num_inputs: 2,
            num_outputs: 2,
            num_parameters: 0,
            num_programs: 1,
            initial_delay: 0,
        }
    }

    /// Set the vendor name.
    pub const fn with_vendor(mut self, vendor: &'static str) -> Self {
        self.vendor = vendor;
        self
    }

    /// Set the version number.
    pub const fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Replace the capability flags.
    pub const fn with_flags(mut self, flags: PluginFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the audio channel counts.
    pub const fn with_io(mut self, num_inputs: i32, num_outputs: i32) -> Self {
        self.num_inputs = num_inputs;
        self.num_outputs = num_outputs;
        self
    }

    /// Set the number of parameters.
    pub const fn with_parameters(mut self, num_parameters: i32) -> Self {
        self.num_parameters = num_parameters;
        self
    }

    /// Set the number of programs.
    pub const fn with_programs(mut self, num_programs: i32) -> Self {
        self.num_programs = num_programs;
        self
    }

    /// Set the processing latency in samples.
    pub const fn with_initial_delay(mut self, samples: i32) -> Self {
        self.initial_delay = samples;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc() {
        assert_eq!(fourcc(b"VstP"), 0x5673_7450);
        assert_eq!(fourcc(b"NvEf"), 0x4E76_4566);
    }

    #[test]
    fn test_flags_builder() {
        let flags = PluginFlags::new()
            .with_replacing()
            .with_double_replacing()
            .with_program_chunks();

        assert_eq!(flags.bits(), (1 << 4) | (1 << 12) | (1 << 5));
        assert!(flags.contains(PluginFlags::CAN_DOUBLE_REPLACING));
        assert!(!flags.contains(PluginFlags::HAS_EDITOR));
    }

    #[test]
    fn test_info_defaults() {
        static INFO: PluginInfo = PluginInfo::new("Test", fourcc(b"Test"))
            .with_io(1, 2)
            .with_parameters(3)
            .with_initial_delay(64);

        assert_eq!(INFO.num_inputs, 1);
        assert_eq!(INFO.num_outputs, 2);
        assert_eq!(INFO.num_parameters, 3);
        assert_eq!(INFO.num_programs, 1);
        assert_eq!(INFO.initial_delay, 64);
        assert!(INFO.flags.contains(PluginFlags::CAN_REPLACING));
    }
}
