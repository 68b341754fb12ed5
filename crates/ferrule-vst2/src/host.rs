//! Plugin-to-host calls through the host's callback function.

use std::ffi::c_void;
use std::ptr;

use ferrule_core::Host;
use log::trace;

use crate::abi::{host_opcode, AEffect, HostCallbackProc};

/// The host callback handed to the entry point, bound to one effect.
///
/// The effect pointer is filled in once the descriptor exists; calls made
/// before that pass null, which hosts accept for the version query.
pub struct HostCallback {
    callback: Option<HostCallbackProc>,
    effect: *mut AEffect,
}

// SAFETY: the host serialises calls per instance and accepts callbacks from
// the threads it calls the plugin on.
unsafe impl Send for HostCallback {}

impl HostCallback {
    pub fn new(callback: Option<HostCallbackProc>) -> Self {
        Self {
            callback,
            effect: ptr::null_mut(),
        }
    }

    pub(crate) fn bind(&mut self, effect: *mut AEffect) {
        self.effect = effect;
    }

    /// Returns true if the host passed a callback at all.
    pub fn is_connected(&self) -> bool {
        self.callback.is_some()
    }

    /// Raw host call. Returns 0 without a callback.
    ///
    /// # Safety
    ///
    /// `value` and `ptr` must satisfy the contract of `opcode`.
    pub unsafe fn call(
        &self,
        opcode: i32,
        index: i32,
        value: isize,
        ptr: *mut c_void,
        opt: f32,
    ) -> isize {
        let Some(callback) = self.callback else {
            return 0;
        };

        trace!("Host call: opcode={opcode} index={index} value={value}");
        callback(self.effect, opcode, index, value, ptr, opt)
    }

    fn call_plain(&self, opcode: i32, index: i32, value: isize, opt: f32) -> isize {
        // SAFETY: the plain host opcodes take no pointer argument.
        unsafe { self.call(opcode, index, value, ptr::null_mut(), opt) }
    }
}

impl Host for HostCallback {
    fn version(&self) -> i32 {
        self.call_plain(host_opcode::VERSION, 0, 0, 0.0) as i32
    }

    fn automate(&self, index: i32, value: f32) {
        self.call_plain(host_opcode::AUTOMATE, index, 0, value);
    }

    fn begin_edit(&self, index: i32) {
        self.call_plain(host_opcode::BEGIN_EDIT, index, 0, 0.0);
    }

    fn end_edit(&self, index: i32) {
        self.call_plain(host_opcode::END_EDIT, index, 0, 0.0);
    }

    fn io_changed(&self) -> bool {
        self.call_plain(host_opcode::IO_CHANGED, 0, 0, 0.0) != 0
    }

    fn size_window(&self, width: i32, height: i32) -> bool {
        self.call_plain(host_opcode::SIZE_WINDOW, width, height as isize, 0.0) != 0
    }

    fn idle(&self) {
        self.call_plain(host_opcode::IDLE, 0, 0, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static CALLS: Mutex<Vec<(i32, i32, isize, f32)>> = Mutex::new(Vec::new());

    extern "C" fn recording_host(
        _effect: *mut AEffect,
        opcode: i32,
        index: i32,
        value: isize,
        _ptr: *mut c_void,
        opt: f32,
    ) -> isize {
        CALLS.lock().unwrap().push((opcode, index, value, opt));
        match opcode {
            host_opcode::VERSION => 2400,
            host_opcode::SIZE_WINDOW => 1,
            _ => 0,
        }
    }

    #[test]
    fn test_host_calls() {
        let host = HostCallback::new(Some(recording_host));
        assert!(host.is_connected());

        assert_eq!(host.version(), 2400);
        host.automate(3, 0.75);
        assert!(host.size_window(640, 480));
        assert!(!host.io_changed());

        let calls = CALLS.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                (host_opcode::VERSION, 0, 0, 0.0),
                (host_opcode::AUTOMATE, 3, 0, 0.75),
                (host_opcode::SIZE_WINDOW, 640, 480, 0.0),
                (host_opcode::IO_CHANGED, 0, 0, 0.0),
            ]
        );
    }

    #[test]
    fn test_without_callback() {
        let host = HostCallback::new(None);
        assert!(!host.is_connected());
        assert_eq!(host.version(), 0);
        host.idle();
    }
}
