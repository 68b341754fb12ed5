//! Common types used throughout the Ferrule framework.
//!
//! Enum discriminants equal the numeric values hosts exchange for them, so a
//! conversion to the wire value is a plain `as` cast.

/// Size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Get the width of the rectangle.
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    /// Get the height of the rectangle.
    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    /// Convert to a Size.
    pub fn size(&self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Create from origin (0, 0) and size.
    pub fn from_size(size: Size) -> Self {
        Self {
            left: 0,
            top: 0,
            right: size.width as i32,
            bottom: size.height as i32,
        }
    }
}

/// A point in pixels (editor view position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Plugin category reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum PluginCategory {
    #[default]
    Unknown = 0,
    Effect = 1,
    Synth = 2,
    Analysis = 3,
    Mastering = 4,
    Spacializer = 5,
    RoomFx = 6,
    SurroundFx = 7,
    Restoration = 8,
    OfflineProcess = 9,
    Shell = 10,
    Generator = 11,
}

/// Answer to a host capability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum CanDoResult {
    /// The plugin does not support the capability.
    No = -1,
    /// The plugin does not know the capability.
    #[default]
    Unknown = 0,
    /// The plugin supports the capability.
    Yes = 1,
}

/// Sample precision the host intends to process with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ProcessPrecision {
    /// Single precision (`f32`) samples.
    Single = 0,
    /// Double precision (`f64`) samples.
    Double = 1,
}

impl ProcessPrecision {
    /// Parse a wire value.
    pub const fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Single),
            1 => Some(Self::Double),
            _ => None,
        }
    }
}

/// Pan law the host uses for mono-to-stereo panning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PanLaw {
    /// L = pan * M; R = (1 - pan) * M.
    Linear = 0,
    /// L = pow(pan, 0.5) * M; R = pow(1 - pan, 0.5) * M.
    EqualPower = 1,
}

impl PanLaw {
    /// Parse a wire value.
    pub const fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Linear),
            1 => Some(Self::EqualPower),
            _ => None,
        }
    }
}

/// Plugin response when the host announces a bank or program load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum LoadResponse {
    /// The data cannot be loaded (e.g. incompatible version).
    Refused = -1,
    /// No opinion; kept for compatibility with older hosts.
    #[default]
    Unknown = 0,
    /// The data can be loaded.
    Accepted = 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_size() {
        let rect = Rect::new(10, 20, 410, 320);
        assert_eq!(rect.size(), Size::new(400, 300));
        assert_eq!(Rect::from_size(Size::new(400, 300)).right, 400);

        // Inverted rectangles clamp to zero
        assert_eq!(Rect::new(10, 10, 0, 0).size(), Size::new(0, 0));
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(CanDoResult::No as i32, -1);
        assert_eq!(CanDoResult::Yes as i32, 1);
        assert_eq!(PluginCategory::Generator as i32, 11);
        assert_eq!(LoadResponse::Refused as i32, -1);
        assert_eq!(ProcessPrecision::from_raw(1), Some(ProcessPrecision::Double));
        assert_eq!(ProcessPrecision::from_raw(2), None);
        assert_eq!(PanLaw::from_raw(1), Some(PanLaw::EqualPower));
    }
}
