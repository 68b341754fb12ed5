//! Ferrule Gain - example gain plugin for the Ferrule adapter.
//!
//! This plugin shows how to:
//! 1. Implement `PluginCommands` for DSP, parameters and programs
//! 2. Share one generic process path between single and double precision
//! 3. Save and restore state as opaque chunks
//! 4. Export the VST 2.4 entry points with `export_vst2!`

use ferrule::prelude::*;
use log::debug;

// =============================================================================
// Plugin Configuration
// =============================================================================

/// Static plugin configuration.
pub static INFO: PluginInfo = PluginInfo::new("Ferrule Gain", fourcc(b"FrGn"))
    .with_vendor("Ferrule")
    .with_version(1000)
    .with_io(2, 2)
    .with_parameters(1)
    .with_programs(3)
    .with_flags(
        PluginFlags::new()
            .with_replacing()
            .with_double_replacing()
            .with_program_chunks(),
    );

const PARAM_GAIN: i32 = 0;

/// Chunk format version.
const CHUNK_VERSION: u8 = 1;

// =============================================================================
// Programs
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Program {
    name: String,
    /// Normalized gain (0.0 to 1.0).
    gain: f32,
}

impl Program {
    fn new(name: &str, gain: f32) -> Self {
        Self {
            name: name.to_string(),
            gain,
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        let name = self.name.as_bytes();
        let len = name.len().min(u8::MAX as usize);
        out.extend_from_slice(&self.gain.to_le_bytes());
        out.push(len as u8);
        out.extend_from_slice(&name[..len]);
    }

    fn read(data: &mut &[u8]) -> PluginResult<Self> {
        let gain = take(data, 4)?;
        let gain = f32::from_le_bytes([gain[0], gain[1], gain[2], gain[3]]);
        let len = take(data, 1)?[0] as usize;
        let name = String::from_utf8_lossy(take(data, len)?).into_owned();
        Ok(Self {
            name,
            gain: gain.clamp(0.0, 1.0),
        })
    }
}

fn take<'a>(data: &mut &'a [u8], len: usize) -> PluginResult<&'a [u8]> {
    if data.len() < len {
        return Err(PluginError::State("truncated chunk".to_string()));
    }
    let (head, tail) = data.split_at(len);
    *data = tail;
    Ok(head)
}

fn factory_programs() -> Vec<Program> {
    vec![
        Program::new("Unity", 0.5),
        Program::new("Quiet", 0.25),
        Program::new("Boost", 1.0),
    ]
}

// =============================================================================
// Gain Mapping
// =============================================================================

/// Normalized 0.0 to 1.0 maps to linear 0.0 to 2.0 (unity at 0.5).
#[inline]
pub fn gain_linear(normalized: f32) -> f32 {
    normalized * 2.0
}

/// Display string in dB.
pub fn gain_display(normalized: f32) -> String {
    let linear = gain_linear(normalized);
    if linear < 0.0001 {
        "-inf".to_string()
    } else {
        format!("{:.1}", 20.0 * linear.log10())
    }
}

/// Parse a dB string (with or without unit) into a normalized value.
pub fn gain_from_text(text: &str) -> Option<f32> {
    let trimmed = text.trim().trim_end_matches("dB").trim();
    if trimmed.eq_ignore_ascii_case("-inf") {
        return Some(0.0);
    }
    let db: f32 = trimmed.parse().ok()?;
    let linear = 10.0f32.powf(db / 20.0);
    Some((linear / 2.0).clamp(0.0, 1.0))
}

// =============================================================================
// Plugin
// =============================================================================

/// The gain plugin.
pub struct Gain {
    host: Box<dyn Host>,
    programs: Vec<Program>,
    current: usize,
    bypass: bool,
    sample_rate: f32,
}

impl Gain {
    fn gain(&self) -> f32 {
        self.programs[self.current].gain
    }

    fn process<S: Sample>(&self, buffer: &mut AudioBuffer<'_, S>) {
        buffer.copy_input_to_output();
        if self.bypass {
            return;
        }

        let gain = S::from_f32(gain_linear(self.gain()));
        for output in buffer.outputs_mut() {
            output.iter_mut().for_each(|s| *s = *s * gain);
        }
    }

    fn program_index(&self, index: i32) -> Option<usize> {
        usize::try_from(index).ok().filter(|&i| i < self.programs.len())
    }
}

impl PluginCommands for Gain {
    fn open(&mut self) -> PluginResult<()> {
        let version = self.host.version();
        debug!("Ferrule Gain opened (host version {version})");
        Ok(())
    }

    fn set_sample_rate(&mut self, sample_rate: f32) -> PluginResult<()> {
        if sample_rate <= 0.0 {
            return Err(PluginError::InvalidArgument(format!(
                "sample rate {sample_rate}"
            )));
        }
        self.sample_rate = sample_rate;
        Ok(())
    }

    fn mains_changed(&mut self, on: bool) -> PluginResult<()> {
        if on {
            debug!("Ferrule Gain resumed at {} Hz", self.sample_rate);
        }
        Ok(())
    }

    fn set_bypass(&mut self, bypass: bool) -> PluginResult<bool> {
        self.bypass = bypass;
        Ok(true)
    }

    // =========================================================================
    // Programs
    // =========================================================================

    fn set_program(&mut self, program: i32) -> PluginResult<()> {
        self.current = self
            .program_index(program)
            .ok_or_else(|| PluginError::InvalidArgument(format!("program {program}")))?;
        Ok(())
    }

    fn program(&self) -> PluginResult<i32> {
        Ok(self.current as i32)
    }

    fn set_program_name(&mut self, name: &str) -> PluginResult<()> {
        self.programs[self.current].name = name.to_string();
        Ok(())
    }

    fn program_name(&self) -> PluginResult<String> {
        Ok(self.programs[self.current].name.clone())
    }

    fn program_name_indexed(&self, index: i32) -> PluginResult<Option<String>> {
        Ok(self
            .program_index(index)
            .map(|i| self.programs[i].name.clone()))
    }

    fn chunk(&mut self, preset: bool) -> PluginResult<Option<Vec<u8>>> {
        let programs = if preset {
            std::slice::from_ref(&self.programs[self.current])
        } else {
            &self.programs[..]
        };

        let mut data = vec![CHUNK_VERSION, programs.len() as u8];
        for program in programs {
            program.write(&mut data);
        }
        Ok(Some(data))
    }

    fn set_chunk(&mut self, data: &[u8], preset: bool) -> PluginResult<bool> {
        let mut data = data;
        let header = take(&mut data, 2)?;
        if header[0] != CHUNK_VERSION {
            // Unknown versions are ignored (forward compatibility)
            return Ok(false);
        }

        let programs = (0..header[1])
            .map(|_| Program::read(&mut data))
            .collect::<PluginResult<Vec<_>>>()?;

        if preset {
            let program = programs
                .into_iter()
                .next()
                .ok_or_else(|| PluginError::State("empty preset chunk".to_string()))?;
            self.programs[self.current] = program;
        } else {
            for (slot, program) in self.programs.iter_mut().zip(programs) {
                *slot = program;
            }
        }
        Ok(true)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    fn set_parameter(&mut self, index: i32, value: f32) -> PluginResult<()> {
        match index {
            PARAM_GAIN => {
                self.programs[self.current].gain = value.clamp(0.0, 1.0);
                Ok(())
            }
            _ => Err(PluginError::InvalidArgument(format!("parameter {index}"))),
        }
    }

    fn parameter(&self, index: i32) -> PluginResult<f32> {
        match index {
            PARAM_GAIN => Ok(self.gain()),
            _ => Err(PluginError::InvalidArgument(format!("parameter {index}"))),
        }
    }

    fn parameter_name(&self, _index: i32) -> PluginResult<String> {
        Ok("Gain".to_string())
    }

    fn parameter_label(&self, _index: i32) -> PluginResult<String> {
        Ok("dB".to_string())
    }

    fn parameter_display(&self, _index: i32) -> PluginResult<String> {
        Ok(gain_display(self.gain()))
    }

    fn string_to_parameter(&mut self, index: i32, text: &str) -> PluginResult<bool> {
        let Some(value) = gain_from_text(text) else {
            return Ok(false);
        };
        self.set_parameter(index, value)?;
        self.host.automate(index, value);
        Ok(true)
    }

    fn parameter_properties(&self, index: i32) -> PluginResult<Option<ParameterProperties>> {
        Ok((index == PARAM_GAIN).then(|| {
            ParameterProperties::new("Gain").with_float_steps(0.001, 0.01, 0.1)
        }))
    }

    // =========================================================================
    // I/O and Identification
    // =========================================================================

    fn input_properties(&self, index: i32) -> PluginResult<Option<PinProperties>> {
        Ok((0..2)
            .contains(&index)
            .then(|| PinProperties::new(format!("Input {}", index + 1), "In").stereo()))
    }

    fn output_properties(&self, index: i32) -> PluginResult<Option<PinProperties>> {
        Ok((0..2)
            .contains(&index)
            .then(|| PinProperties::new(format!("Output {}", index + 1), "Out").stereo()))
    }

    fn category(&self) -> PluginResult<PluginCategory> {
        Ok(PluginCategory::Effect)
    }

    fn effect_name(&self) -> PluginResult<Option<String>> {
        Ok(Some(INFO.name.to_string()))
    }

    fn vendor_string(&self) -> PluginResult<Option<String>> {
        Ok(Some(INFO.vendor.to_string()))
    }

    fn product_string(&self) -> PluginResult<Option<String>> {
        Ok(Some("Ferrule Demos".to_string()))
    }

    fn vendor_version(&self) -> PluginResult<i32> {
        Ok(INFO.version)
    }

    fn can_do(&self, capability: &str) -> PluginResult<CanDoResult> {
        Ok(match capability {
            "bypass" | "2in2out" | "plugAsChannelInsert" => CanDoResult::Yes,
            "receiveVstEvents" | "receiveVstMidiEvent" | "offline" => CanDoResult::No,
            _ => CanDoResult::Unknown,
        })
    }

    fn set_process_precision(&mut self, _precision: ProcessPrecision) -> PluginResult<bool> {
        Ok(true)
    }

    // =========================================================================
    // Audio Processing
    // =========================================================================

    fn process_replacing(&mut self, buffer: &mut AudioBuffer<'_, f32>) -> PluginResult<()> {
        self.process(buffer);
        Ok(())
    }

    fn process_double_replacing(&mut self, buffer: &mut AudioBuffer<'_, f64>) -> PluginResult<()> {
        self.process(buffer);
        Ok(())
    }
}

impl Plugin for Gain {
    fn create(host: Box<dyn Host>) -> PluginResult<Self> {
        Ok(Self {
            host,
            programs: factory_programs(),
            current: 0,
            bypass: false,
            sample_rate: 44100.0,
        })
    }
}

// =============================================================================
// VST 2.4 Export
// =============================================================================

export_vst2!(INFO, Gain);
