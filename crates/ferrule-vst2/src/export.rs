//! VST 2.4 export macro and entry points.

/// Generate the VST 2.4 entry points for a plugin.
///
/// Exports `VSTPluginMain`, which the host calls once per instance with its
/// callback and which returns the effect descriptor (or null on failure).
/// On macOS the legacy `main_macho` alias is exported as well.
///
/// # Example
///
/// ```rust,ignore
/// use ferrule_core::{fourcc, PluginInfo};
/// use ferrule_vst2::export_vst2;
///
/// static INFO: PluginInfo = PluginInfo::new("My Plugin", fourcc(b"MyPl"))
///     .with_vendor("My Company");
///
/// export_vst2!(INFO, MyPlugin);
/// ```
#[macro_export]
macro_rules! export_vst2 {
    ($info:expr, $plugin:ty) => {
        #[no_mangle]
        #[allow(non_snake_case)]
        pub extern "C" fn VSTPluginMain(
            host: Option<$crate::abi::HostCallbackProc>,
        ) -> *mut $crate::abi::AEffect {
            $crate::create_effect::<$plugin>(&$info, host)
        }

        // Hosts built against the pre-2.4 SDK look this name up on macOS.
        #[cfg(target_os = "macos")]
        #[no_mangle]
        pub extern "C" fn main_macho(
            host: Option<$crate::abi::HostCallbackProc>,
        ) -> *mut $crate::abi::AEffect {
            VSTPluginMain(host)
        }
    };
}
