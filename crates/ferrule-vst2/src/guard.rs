//! Panic guards for code running under a native callback.
//!
//! Unwinding across an `extern "C"` boundary aborts the host process, so
//! every call into plugin code and every exported callback runs under one of
//! these helpers.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use ferrule_core::{PluginError, PluginResult};
use log::error;

/// Extract a human-readable message from a panic payload.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return (*msg).to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "non-string panic payload".to_string()
}

/// Run fallible plugin code, turning a panic into [`PluginError::Panic`].
pub fn guard<T>(f: impl FnOnce() -> PluginResult<T>) -> PluginResult<T> {
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(PluginError::Panic(panic_message(payload))))
}

/// Catch panics in callbacks that return nothing.
pub fn guard_void(op: &'static str, f: impl FnOnce()) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
        error!("panic in `{op}`: {}", panic_message(payload));
    }
}

/// Catch panics in callbacks that return a value with a known safe default.
pub fn guard_with_default<T>(op: &'static str, default: T, f: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            error!("panic in `{op}`: {}", panic_message(payload));
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_maps_panic() {
        let result: PluginResult<i32> = guard(|| panic!("bad index {}", 3));
        match result {
            Err(PluginError::Panic(msg)) => assert_eq!(msg, "bad index 3"),
            other => panic!("expected panic error, got {other:?}"),
        }

        assert_eq!(guard(|| Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_guard_passes_errors_through() {
        let result: PluginResult<()> = guard(|| Err(PluginError::Unsupported("x")));
        assert!(matches!(result, Err(PluginError::Unsupported("x"))));
    }

    #[test]
    fn test_guard_with_default() {
        assert_eq!(guard_with_default("test", -1, || panic!("boom")), -1);
        assert_eq!(guard_with_default("test", -1, || 5), 5);

        let mut ran = false;
        guard_void("test", || ran = true);
        assert!(ran);
        guard_void("test", || panic!("boom"));
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42)), "non-string panic payload");
    }
}
