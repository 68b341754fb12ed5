//! VST 2.4 adapter for Ferrule plugins.
//!
//! Exposes a [`PluginCommands`](ferrule_core::PluginCommands) implementation
//! to hosts that speak the VST 2.4 binary interface: one `AEffect` descriptor
//! with a numeric opcode dispatcher.
//!
//! ## Architecture
//!
//! ```text
//! Host
//!   ↓ AEffect callbacks (effect.rs)
//! CommandProxy (proxy.rs)
//!   ↓ argument transcoding (convert.rs), tracked memory (memory.rs)
//! PluginCommands / LegacyCommands
//! ```
//!
//! Use [`export_vst2!`] to export the entry points from a `cdylib`.

pub mod abi;
pub mod convert;
mod effect;
mod export;
pub mod guard;
mod host;
pub mod memory;
pub mod proxy;

pub use effect::{create_effect, EffectShell};
pub use host::HostCallback;
pub use memory::{MemoryTracker, NativeBlock};
pub use proxy::{CommandProxy, RawChannels, MAX_CHANNELS};
