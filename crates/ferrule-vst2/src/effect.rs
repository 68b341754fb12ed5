//! The native effect the host holds, and its callbacks.
//!
//! Each plugin instance lives in one heap-allocated [`EffectShell`]. The
//! `AEffect` is its first field and `AEffect::object` points back at the
//! shell, so every callback recovers its own instance from the pointer the
//! host passes in. The shell frees itself after handling `Close`.

use std::ffi::c_void;
use std::ptr;

use ferrule_core::{Plugin, PluginInfo};
use log::{debug, error, warn};

use crate::abi::{AEffect, HostCallbackProc, Opcode, EFFECT_MAGIC};
use crate::guard::{guard, guard_void, guard_with_default};
use crate::host::HostCallback;
use crate::proxy::{CommandProxy, RawChannels, MAX_CHANNELS};

/// One plugin instance as seen by the host.
#[repr(C)]
pub struct EffectShell {
    effect: AEffect,
    /// `None` only while the plugin is being created.
    proxy: Option<CommandProxy>,
}

impl EffectShell {
    /// Recover the shell from the pointer passed to a callback.
    ///
    /// # Safety
    ///
    /// `effect` must be null or an effect returned by [`create_effect`] that
    /// has not been closed.
    unsafe fn from_effect<'a>(effect: *mut AEffect) -> Option<&'a mut Self> {
        if effect.is_null() {
            return None;
        }
        // SAFETY: a live effect's object points at its shell.
        unsafe { (*effect).object.cast::<Self>().as_mut() }
    }

    fn channels<S>(
        &self,
        inputs: *const *const S,
        outputs: *mut *mut S,
        frames: i32,
    ) -> RawChannels<S> {
        RawChannels {
            inputs,
            outputs,
            num_inputs: self.effect.num_inputs,
            num_outputs: self.effect.num_outputs,
            frames,
        }
    }
}

/// Build the effect descriptor for a plugin and create its instance.
///
/// Returns null if the plugin cannot be created or declares more channels
/// than [`MAX_CHANNELS`]. The returned effect stays valid until the host
/// dispatches `Close`.
pub fn create_effect<P: Plugin>(
    info: &PluginInfo,
    host: Option<HostCallbackProc>,
) -> *mut AEffect {
    for (direction, count) in [("input", info.num_inputs), ("output", info.num_outputs)] {
        if usize::try_from(count).is_ok_and(|count| count > MAX_CHANNELS) {
            error!(
                "{} declares {} {} channels, but MAX_CHANNELS is {}",
                info.name, count, direction, MAX_CHANNELS
            );
            return ptr::null_mut();
        }
    }

    let shell = Box::into_raw(Box::new(EffectShell {
        effect: descriptor(info),
        proxy: None,
    }));

    // SAFETY: freshly allocated; the effect is the shell's first field.
    let effect = unsafe {
        let effect = ptr::addr_of_mut!((*shell).effect);
        (*effect).object = shell.cast::<c_void>();
        effect
    };

    let mut host = HostCallback::new(host);
    host.bind(effect);
    if !host.is_connected() {
        warn!("{}: created without a host callback", info.name);
    }

    match guard(|| P::create(Box::new(host))) {
        Ok(plugin) => {
            // SAFETY: the shell is live and not yet shared with the host.
            unsafe { (*shell).proxy = Some(CommandProxy::new(Box::new(plugin))) };
            debug!("{} by {}: effect created", info.name, info.vendor);
            effect
        }
        Err(err) => {
            error!("{}: plugin creation failed: {err}", info.name);
            // SAFETY: the shell was never handed out.
            drop(unsafe { Box::from_raw(shell) });
            ptr::null_mut()
        }
    }
}

fn descriptor(info: &PluginInfo) -> AEffect {
    AEffect {
        magic: EFFECT_MAGIC,
        dispatcher,
        process: process_accumulating,
        set_parameter,
        get_parameter,
        num_programs: info.num_programs,
        num_params: info.num_parameters,
        num_inputs: info.num_inputs,
        num_outputs: info.num_outputs,
        flags: info.flags.bits(),
        reserved1: 0,
        reserved2: 0,
        initial_delay: info.initial_delay,
        real_qualities: 0,
        off_qualities: 0,
        io_ratio: 1.0,
        object: ptr::null_mut(),
        user: ptr::null_mut(),
        unique_id: info.unique_id,
        version: info.version,
        process_replacing,
        process_double_replacing,
        future: [0; 56],
    }
}

// =============================================================================
// Callbacks
// =============================================================================

extern "C" fn dispatcher(
    effect: *mut AEffect,
    opcode: i32,
    index: i32,
    value: isize,
    ptr: *mut c_void,
    opt: f32,
) -> isize {
    guard_with_default("dispatcher", 0, || {
        // SAFETY: the host passes the effect it got from the entry point.
        let Some(shell) = (unsafe { EffectShell::from_effect(effect) }) else {
            warn!("Dispatch on a null effect: opcode={opcode}");
            return 0;
        };
        let Some(proxy) = shell.proxy.as_mut() else {
            warn!("Dispatch before the plugin exists: opcode={opcode}");
            return 0;
        };

        // SAFETY: the host passes arguments matching the opcode.
        let result = unsafe { proxy.dispatch(opcode, index, value, ptr, opt) };

        if opcode == Opcode::Close as i32 {
            // SAFETY: the host never uses the effect after Close.
            drop(unsafe { Box::from_raw(ptr::from_mut(shell)) });
        }

        result
    })
}

extern "C" fn process_replacing(
    effect: *mut AEffect,
    inputs: *const *const f32,
    outputs: *mut *mut f32,
    frames: i32,
) {
    guard_void("processReplacing", || {
        // SAFETY: the host passes the effect it got from the entry point.
        let Some(shell) = (unsafe { EffectShell::from_effect(effect) }) else {
            return;
        };
        let channels = shell.channels(inputs, outputs, frames);
        if let Some(proxy) = shell.proxy.as_mut() {
            // SAFETY: the host provides the declared channel counts.
            unsafe { proxy.process_f32(channels) };
        }
    });
}

extern "C" fn process_double_replacing(
    effect: *mut AEffect,
    inputs: *const *const f64,
    outputs: *mut *mut f64,
    frames: i32,
) {
    guard_void("processDoubleReplacing", || {
        // SAFETY: the host passes the effect it got from the entry point.
        let Some(shell) = (unsafe { EffectShell::from_effect(effect) }) else {
            return;
        };
        let channels = shell.channels(inputs, outputs, frames);
        if let Some(proxy) = shell.proxy.as_mut() {
            // SAFETY: the host provides the declared channel counts.
            unsafe { proxy.process_f64(channels) };
        }
    });
}

extern "C" fn process_accumulating(
    effect: *mut AEffect,
    inputs: *const *const f32,
    outputs: *mut *mut f32,
    frames: i32,
) {
    guard_void("process", || {
        // SAFETY: the host passes the effect it got from the entry point.
        let Some(shell) = (unsafe { EffectShell::from_effect(effect) }) else {
            return;
        };
        let channels = shell.channels(inputs, outputs, frames);
        if let Some(proxy) = shell.proxy.as_mut() {
            // SAFETY: the host provides the declared channel counts.
            unsafe { proxy.process_accumulating(channels) };
        }
    });
}

extern "C" fn set_parameter(effect: *mut AEffect, index: i32, value: f32) {
    guard_void("setParameter", || {
        // SAFETY: the host passes the effect it got from the entry point.
        let shell = unsafe { EffectShell::from_effect(effect) };
        if let Some(proxy) = shell.and_then(|shell| shell.proxy.as_mut()) {
            proxy.set_parameter(index, value);
        }
    });
}

extern "C" fn get_parameter(effect: *mut AEffect, index: i32) -> f32 {
    guard_with_default("getParameter", 0.0, || {
        // SAFETY: the host passes the effect it got from the entry point.
        let shell = unsafe { EffectShell::from_effect(effect) };
        shell
            .and_then(|shell| shell.proxy.as_ref())
            .map_or(0.0, |proxy| proxy.get_parameter(index))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ferrule_core::{fourcc, AudioBuffer, Host, PluginCommands, PluginError, PluginResult};

    static DROPS: AtomicUsize = AtomicUsize::new(0);

    static INFO: PluginInfo = PluginInfo::new("Shell Test", fourcc(b"ShTs"))
        .with_vendor("Ferrule")
        .with_io(1, 1)
        .with_parameters(1);

    struct Doubler {
        factor: f32,
    }

    impl Drop for Doubler {
        fn drop(&mut self) {
            DROPS.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl PluginCommands for Doubler {
        fn set_parameter(&mut self, _index: i32, value: f32) -> PluginResult<()> {
            self.factor = value * 4.0;
            Ok(())
        }

        fn parameter(&self, _index: i32) -> PluginResult<f32> {
            Ok(self.factor / 4.0)
        }

        fn process_replacing(&mut self, buffer: &mut AudioBuffer<'_, f32>) -> PluginResult<()> {
            buffer.copy_input_to_output();
            for output in buffer.outputs_mut() {
                output.iter_mut().for_each(|s| *s *= self.factor);
            }
            Ok(())
        }
    }

    impl Plugin for Doubler {
        fn create(_host: Box<dyn Host>) -> PluginResult<Self> {
            Ok(Self { factor: 2.0 })
        }
    }

    struct Broken;

    impl PluginCommands for Broken {
        fn process_replacing(&mut self, _buffer: &mut AudioBuffer<'_, f32>) -> PluginResult<()> {
            Ok(())
        }
    }

    impl Plugin for Broken {
        fn create(_host: Box<dyn Host>) -> PluginResult<Self> {
            Err(PluginError::Platform("no audio device".to_string()))
        }
    }

    #[test]
    fn test_descriptor_and_lifecycle() {
        let effect = create_effect::<Doubler>(&INFO, None);
        assert!(!effect.is_null());

        // SAFETY: the effect stays valid until Close.
        let e = unsafe { &*effect };
        assert_eq!(e.magic, EFFECT_MAGIC);
        assert_eq!(e.unique_id, fourcc(b"ShTs"));
        assert_eq!((e.num_inputs, e.num_outputs, e.num_params), (1, 1, 1));
        assert_eq!(e.object, effect.cast::<c_void>());
        let (dispatch, process, set, get) =
            (e.dispatcher, e.process_replacing, e.set_parameter, e.get_parameter);

        set(effect, 0, 0.75);
        assert_eq!(get(effect, 0), 0.75);

        let input = [1.0f32, -0.5];
        let mut output = [0.0f32; 2];
        let inputs = [input.as_ptr()];
        let mut outputs = [output.as_mut_ptr()];
        process(effect, inputs.as_ptr(), outputs.as_mut_ptr(), 2);
        assert_eq!(output, [3.0, -1.5]);

        assert_eq!(dispatch(effect, Opcode::GetVstVersion as i32, 0, 0, ptr::null_mut(), 0.0), 2400);

        let drops = DROPS.load(Ordering::SeqCst);
        dispatch(effect, Opcode::Close as i32, 0, 0, ptr::null_mut(), 0.0);
        assert_eq!(DROPS.load(Ordering::SeqCst), drops + 1);
    }

    #[test]
    fn test_failed_creation_returns_null() {
        assert!(create_effect::<Broken>(&INFO, None).is_null());
    }

    struct Silent;

    impl PluginCommands for Silent {
        fn process_replacing(&mut self, buffer: &mut AudioBuffer<'_, f32>) -> PluginResult<()> {
            buffer.clear_outputs();
            Ok(())
        }
    }

    impl Plugin for Silent {
        fn create(_host: Box<dyn Host>) -> PluginResult<Self> {
            Ok(Self)
        }
    }

    #[test]
    fn test_too_many_channels_returns_null() {
        let wide = MAX_CHANNELS as i32 + 8;
        assert!(create_effect::<Silent>(&INFO.clone().with_io(wide, 2), None).is_null());
        assert!(create_effect::<Silent>(&INFO.clone().with_io(2, wide), None).is_null());

        let effect = create_effect::<Silent>(
            &INFO.clone().with_io(MAX_CHANNELS as i32, MAX_CHANNELS as i32),
            None,
        );
        assert!(!effect.is_null());
        // SAFETY: the effect stays valid until Close.
        let dispatch = unsafe { (*effect).dispatcher };
        dispatch(effect, Opcode::Close as i32, 0, 0, ptr::null_mut(), 0.0);
    }

    #[test]
    fn test_null_effect_is_ignored() {
        assert_eq!(dispatcher(ptr::null_mut(), 0, 0, 0, ptr::null_mut(), 0.0), 0);
        assert_eq!(get_parameter(ptr::null_mut(), 0), 0.0);
        set_parameter(ptr::null_mut(), 0, 1.0);
        process_replacing(ptr::null_mut(), ptr::null(), ptr::null_mut(), 16);
    }
}
