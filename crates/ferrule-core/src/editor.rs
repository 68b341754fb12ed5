//! Editor input types: keyboard events, knob mode and the parent window
//! handle passed when the host opens the editor.

use std::ffi::c_void;

/// Platform window handle the editor should attach to.
///
/// `HWND` on Windows, `NSView*` on macOS, an X11 window id on Linux. The
/// adapter never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentWindow(pub *mut c_void);

impl ParentWindow {
    /// Returns true if the host passed no window.
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

// Safety: the handle is an opaque token; the plugin decides on which thread
// it is used, the adapter only forwards it.
unsafe impl Send for ParentWindow {}

/// Platform-independent virtual key code.
///
/// Unknown codes are kept as-is so newer hosts do not break older plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VirtualKey(pub i32);

impl VirtualKey {
    pub const NONE: Self = Self(0);
    pub const BACK: Self = Self(1);
    pub const TAB: Self = Self(2);
    pub const CLEAR: Self = Self(3);
    pub const RETURN: Self = Self(4);
    pub const PAUSE: Self = Self(5);
    pub const ESCAPE: Self = Self(6);
    pub const SPACE: Self = Self(7);
    pub const NEXT: Self = Self(8);
    pub const END: Self = Self(9);
    pub const HOME: Self = Self(10);
    pub const LEFT: Self = Self(11);
    pub const UP: Self = Self(12);
    pub const RIGHT: Self = Self(13);
    pub const DOWN: Self = Self(14);
    pub const PAGE_UP: Self = Self(15);
    pub const PAGE_DOWN: Self = Self(16);
    pub const SELECT: Self = Self(17);
    pub const PRINT: Self = Self(18);
    pub const ENTER: Self = Self(19);
    pub const SNAPSHOT: Self = Self(20);
    pub const INSERT: Self = Self(21);
    pub const DELETE: Self = Self(22);
    pub const HELP: Self = Self(23);
    pub const NUMPAD0: Self = Self(24);
    pub const NUMPAD9: Self = Self(33);
    pub const MULTIPLY: Self = Self(34);
    pub const ADD: Self = Self(35);
    pub const SEPARATOR: Self = Self(36);
    pub const SUBTRACT: Self = Self(37);
    pub const DECIMAL: Self = Self(38);
    pub const DIVIDE: Self = Self(39);
    pub const F1: Self = Self(40);
    pub const F12: Self = Self(51);
    pub const NUMLOCK: Self = Self(52);
    pub const SCROLL: Self = Self(53);
    pub const SHIFT: Self = Self(54);
    pub const CONTROL: Self = Self(55);
    pub const ALT: Self = Self(56);
    pub const EQUALS: Self = Self(57);
}

/// Modifier keys held during a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierKeys(pub i32);

impl ModifierKeys {
    pub const SHIFT: i32 = 1 << 0;
    /// Alt on Windows and Linux, Option on macOS.
    pub const ALTERNATE: i32 = 1 << 1;
    /// Control on Windows and Linux, Command on macOS.
    pub const COMMAND: i32 = 1 << 2;
    /// Ctrl on macOS.
    pub const CONTROL: i32 = 1 << 3;

    pub const fn shift(&self) -> bool {
        self.0 & Self::SHIFT != 0
    }

    pub const fn alternate(&self) -> bool {
        self.0 & Self::ALTERNATE != 0
    }

    pub const fn command(&self) -> bool {
        self.0 & Self::COMMAND != 0
    }

    pub const fn control(&self) -> bool {
        self.0 & Self::CONTROL != 0
    }
}

/// A key event forwarded from the host to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyCode {
    /// ASCII character, 0 for non-character keys.
    pub character: u8,
    pub virtual_key: VirtualKey,
    pub modifiers: ModifierKeys,
}

/// How knobs in the editor react to mouse movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum KnobMode {
    Circular = 0,
    CircularRelative = 1,
    Linear = 2,
}

impl KnobMode {
    /// Parse a wire value.
    pub const fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Circular),
            1 => Some(Self::CircularRelative),
            2 => Some(Self::Linear),
            _ => None,
        }
    }
}
