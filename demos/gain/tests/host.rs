//! Drives the exported entry point the way a VST 2.4 host does.

use std::ffi::{c_char, c_void, CStr};
use std::ptr;
use std::sync::Mutex;

use ferrule::core::fourcc;
use ferrule::vst2::abi::{self, host_opcode, AEffect, Opcode};
use ferrule_gain::VSTPluginMain;

static HOST_CALLS: Mutex<Vec<i32>> = Mutex::new(Vec::new());

extern "C" fn test_host(
    _effect: *mut AEffect,
    opcode: i32,
    _index: i32,
    _value: isize,
    _ptr: *mut c_void,
    _opt: f32,
) -> isize {
    HOST_CALLS.lock().unwrap().push(opcode);
    match opcode {
        host_opcode::VERSION => 2400,
        _ => 0,
    }
}

/// Minimal host-side handle over one loaded instance.
struct Instance {
    effect: *mut AEffect,
}

impl Instance {
    fn load() -> Self {
        let effect = VSTPluginMain(Some(test_host));
        assert!(!effect.is_null());
        Self { effect }
    }

    fn descriptor(&self) -> &AEffect {
        // SAFETY: valid until close.
        unsafe { &*self.effect }
    }

    fn dispatch(&self, op: Opcode, index: i32, value: isize, ptr: *mut c_void, opt: f32) -> isize {
        let dispatcher = self.descriptor().dispatcher;
        dispatcher(self.effect, op as i32, index, value, ptr, opt)
    }

    fn string(&self, op: Opcode, index: i32, capacity: usize) -> Option<String> {
        let mut buffer = vec![0 as c_char; capacity];
        let result = self.dispatch(op, index, 0, buffer.as_mut_ptr().cast(), 0.0);
        // SAFETY: the adapter always NUL-terminates within the capacity.
        let text = unsafe { CStr::from_ptr(buffer.as_ptr()) };
        (result != 0).then(|| text.to_string_lossy().into_owned())
    }

    fn chunk(&self, preset: bool) -> Vec<u8> {
        let mut data: *mut c_void = ptr::null_mut();
        let len = self.dispatch(
            Opcode::GetChunk,
            i32::from(preset),
            0,
            ptr::addr_of_mut!(data).cast(),
            0.0,
        );
        assert!(len > 0);
        // SAFETY: valid until the next MainsChanged.
        unsafe { std::slice::from_raw_parts(data.cast::<u8>(), len as usize) }.to_vec()
    }

    fn process(&self, input: [[f32; 4]; 2]) -> [[f32; 4]; 2] {
        let mut output = [[0.0f32; 4]; 2];
        let inputs = [input[0].as_ptr(), input[1].as_ptr()];
        let [left, right] = &mut output;
        let mut outputs = [left.as_mut_ptr(), right.as_mut_ptr()];
        let process = self.descriptor().process_replacing;
        process(self.effect, inputs.as_ptr(), outputs.as_mut_ptr(), 4);
        output
    }

    fn process_in_place(&self, channels: &mut [[f32; 4]; 2]) {
        let [left, right] = channels;
        let mut buffers = [left.as_mut_ptr(), right.as_mut_ptr()];
        let inputs = [buffers[0].cast_const(), buffers[1].cast_const()];
        let process = self.descriptor().process_replacing;
        process(self.effect, inputs.as_ptr(), buffers.as_mut_ptr(), 4);
    }

    fn close(self) {
        assert_eq!(self.dispatch(Opcode::Close, 0, 0, ptr::null_mut(), 0.0), 0);
    }
}

#[test]
fn test_descriptor() {
    let instance = Instance::load();
    let effect = instance.descriptor();

    assert_eq!(effect.magic, abi::EFFECT_MAGIC);
    assert_eq!(effect.unique_id, fourcc(b"FrGn"));
    assert_eq!((effect.num_inputs, effect.num_outputs), (2, 2));
    assert_eq!((effect.num_params, effect.num_programs), (1, 3));
    assert_eq!(effect.version, 1000);
    assert!(!effect.object.is_null());

    instance.close();
}

#[test]
fn test_session() {
    let instance = Instance::load();

    instance.dispatch(Opcode::Open, 0, 0, ptr::null_mut(), 0.0);
    assert!(HOST_CALLS.lock().unwrap().contains(&host_opcode::VERSION));

    assert_eq!(instance.dispatch(Opcode::SetSampleRate, 0, 0, ptr::null_mut(), 48000.0), 1);
    assert_eq!(instance.dispatch(Opcode::SetBlockSize, 0, 512, ptr::null_mut(), 0.0), 1);
    assert_eq!(instance.dispatch(Opcode::MainsChanged, 0, 1, ptr::null_mut(), 0.0), 1);

    // Identification
    assert_eq!(
        instance.string(Opcode::GetEffectName, 0, abi::MAX_EFFECT_NAME_LEN).as_deref(),
        Some("Ferrule Gain")
    );
    assert_eq!(instance.dispatch(Opcode::GetPlugCategory, 0, 0, ptr::null_mut(), 0.0), 1);
    assert_eq!(instance.dispatch(Opcode::GetVstVersion, 0, 0, ptr::null_mut(), 0.0), 2400);

    // Unity gain at the default program
    let output = instance.process([[1.0, 0.5, -0.5, 0.0], [0.25; 4]]);
    assert_eq!(output, [[1.0, 0.5, -0.5, 0.0], [0.25; 4]]);

    // Parameter round trip and display
    let set_parameter = instance.descriptor().set_parameter;
    let get_parameter = instance.descriptor().get_parameter;
    set_parameter(instance.effect, 0, 1.0);
    assert_eq!(get_parameter(instance.effect, 0), 1.0);
    assert_eq!(
        instance.string(Opcode::GetParamDisplay, 0, abi::MAX_PARAM_STR_LEN).as_deref(),
        Some("6.0")
    );
    let output = instance.process([[0.5; 4], [0.25; 4]]);
    assert_eq!(output, [[1.0; 4], [0.5; 4]]);

    // Text entry notifies the host
    let text = c"0 dB";
    let result = instance.dispatch(
        Opcode::String2Parameter,
        0,
        0,
        text.as_ptr().cast_mut().cast(),
        0.0,
    );
    assert_eq!(result, 1);
    assert_eq!(get_parameter(instance.effect, 0), 0.5);
    assert!(HOST_CALLS.lock().unwrap().contains(&host_opcode::AUTOMATE));

    // Programs
    assert_eq!(instance.dispatch(Opcode::SetProgram, 0, 2, ptr::null_mut(), 0.0), 1);
    assert_eq!(instance.dispatch(Opcode::GetProgram, 0, 0, ptr::null_mut(), 0.0), 2);
    assert_eq!(
        instance.string(Opcode::GetProgramName, 0, abi::MAX_PROG_NAME_LEN).as_deref(),
        Some("Boost")
    );
    assert_eq!(
        instance.string(Opcode::GetProgramNameIndexed, 1, abi::MAX_PROG_NAME_LEN).as_deref(),
        Some("Quiet")
    );
    assert_eq!(instance.string(Opcode::GetProgramNameIndexed, 9, abi::MAX_PROG_NAME_LEN), None);

    // Out of range program is refused and the current one kept
    assert_eq!(instance.dispatch(Opcode::SetProgram, 0, 7, ptr::null_mut(), 0.0), 0);
    assert_eq!(instance.dispatch(Opcode::GetProgram, 0, 0, ptr::null_mut(), 0.0), 2);

    assert_eq!(instance.dispatch(Opcode::MainsChanged, 0, 0, ptr::null_mut(), 0.0), 1);
    instance.close();
}

#[test]
fn test_bank_chunk_moves_between_instances() {
    let source = Instance::load();
    let set_parameter = source.descriptor().set_parameter;
    set_parameter(source.effect, 0, 0.75);

    let name = c"Custom";
    source.dispatch(Opcode::SetProgramName, 0, 0, name.as_ptr().cast_mut().cast(), 0.0);
    let bank = source.chunk(false);
    source.close();

    let target = Instance::load();
    let result = target.dispatch(
        Opcode::SetChunk,
        0,
        bank.len() as isize,
        bank.as_ptr().cast_mut().cast(),
        0.0,
    );
    assert_eq!(result, 1);

    let get_parameter = target.descriptor().get_parameter;
    assert_eq!(get_parameter(target.effect, 0), 0.75);
    assert_eq!(
        target.string(Opcode::GetProgramName, 0, abi::MAX_PROG_NAME_LEN).as_deref(),
        Some("Custom")
    );
    assert_eq!(target.chunk(false), bank);
    target.close();
}

#[test]
fn test_speaker_and_capabilities() {
    let instance = Instance::load();

    let can_do = |capability: &CStr| {
        instance.dispatch(Opcode::CanDo, 0, 0, capability.as_ptr().cast_mut().cast(), 0.0)
    };
    assert_eq!(can_do(c"bypass"), 1);
    assert_eq!(can_do(c"receiveVstMidiEvent"), -1);
    assert_eq!(can_do(c"sendVstMidiEvent"), 0);

    // Bypass passes audio through untouched
    set_gain(&instance, 0.0);
    assert_eq!(instance.dispatch(Opcode::SetBypass, 0, 1, ptr::null_mut(), 0.0), 1);
    let output = instance.process([[0.5; 4], [0.25; 4]]);
    assert_eq!(output, [[0.5; 4], [0.25; 4]]);

    // No arrangement offered: both host slots end up null
    let mut input: *mut c_void = ptr::NonNull::<c_void>::dangling().as_ptr();
    let mut output: *mut c_void = ptr::NonNull::<c_void>::dangling().as_ptr();
    let result = instance.dispatch(
        Opcode::GetSpeakerArrangement,
        0,
        ptr::addr_of_mut!(input) as isize,
        ptr::addr_of_mut!(output).cast(),
        0.0,
    );
    assert_eq!(result, 0);
    assert!(input.is_null() && output.is_null());

    instance.close();
}

#[test]
fn test_in_place_processing() {
    let instance = Instance::load();
    set_gain(&instance, 1.0);

    let mut channels = [[0.5f32, -0.25, 0.0, 1.0], [0.125; 4]];
    instance.process_in_place(&mut channels);
    assert_eq!(channels, [[1.0, -0.5, 0.0, 2.0], [0.25; 4]]);

    instance.close();
}

fn set_gain(instance: &Instance, value: f32) {
    let set_parameter = instance.descriptor().set_parameter;
    set_parameter(instance.effect, 0, value);
}

#[test]
fn test_failed_commands_answer_zero() {
    let instance = Instance::load();

    // Rejected sample rate
    assert_eq!(instance.dispatch(Opcode::SetSampleRate, 0, 0, ptr::null_mut(), -1.0), 0);
    // Malformed chunk
    // Current version and one program, then nothing
    let junk = [1u8, 1, 1];
    let result = instance.dispatch(
        Opcode::SetChunk,
        0,
        junk.len() as isize,
        junk.as_ptr().cast_mut().cast(),
        0.0,
    );
    assert_eq!(result, 0);
    // Unknown opcode
    let dispatcher = instance.descriptor().dispatcher;
    assert_eq!(dispatcher(instance.effect, 4242, 0, 0, ptr::null_mut(), 0.0), 0);

    instance.close();
}
