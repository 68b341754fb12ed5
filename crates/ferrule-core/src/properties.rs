//! Pin (audio channel) and parameter metadata the host can query per index.

/// Describes one audio input or output channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PinProperties {
    /// Channel name shown by the host (up to 63 bytes).
    pub label: String,
    /// See [`PinProperties::IS_ACTIVE`] and friends.
    pub flags: i32,
    /// Arrangement type tag this pin belongs to, see [`crate::speaker::arrangement`].
    pub arrangement_type: i32,
    /// Abbreviated name (up to 7 bytes).
    pub short_label: String,
}

impl PinProperties {
    /// The pin is active. Ignored by most hosts.
    pub const IS_ACTIVE: i32 = 1 << 0;
    /// The pin is the first of a stereo pair.
    pub const IS_STEREO: i32 = 1 << 1;
    /// [`arrangement_type`](Self::arrangement_type) is valid.
    pub const USE_SPEAKER: i32 = 1 << 2;

    /// An active pin with the given labels.
    pub fn new(label: impl Into<String>, short_label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            flags: Self::IS_ACTIVE,
            arrangement_type: 0,
            short_label: short_label.into(),
        }
    }

    /// Mark the pin as the first of a stereo pair.
    pub fn stereo(mut self) -> Self {
        self.flags |= Self::IS_STEREO;
        self
    }

    /// Attach an arrangement type tag.
    pub fn with_arrangement(mut self, arrangement_type: i32) -> Self {
        self.arrangement_type = arrangement_type;
        self.flags |= Self::USE_SPEAKER;
        self
    }
}

/// Display and stepping hints for one parameter.
///
/// Only the fields whose flag bit is set are meaningful to the host.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterProperties {
    /// Step for float parameters (with [`USES_FLOAT_STEP`](Self::USES_FLOAT_STEP)).
    pub step_float: f32,
    pub small_step_float: f32,
    pub large_step_float: f32,
    /// Parameter label (up to 63 bytes).
    pub label: String,
    pub flags: i32,
    /// Integer range (with [`USES_INT_MIN_MAX`](Self::USES_INT_MIN_MAX)).
    pub min_integer: i32,
    pub max_integer: i32,
    /// Integer steps (with [`USES_INT_STEP`](Self::USES_INT_STEP)).
    pub step_integer: i32,
    pub large_step_integer: i32,
    /// Abbreviated label (up to 7 bytes).
    pub short_label: String,
    /// Display order (with [`SUPPORTS_DISPLAY_INDEX`](Self::SUPPORTS_DISPLAY_INDEX)).
    pub display_index: i16,
    /// 1-based category index, 0 for none (with
    /// [`SUPPORTS_DISPLAY_CATEGORY`](Self::SUPPORTS_DISPLAY_CATEGORY)).
    pub category: i16,
    pub num_parameters_in_category: i16,
    /// Category name (up to 23 bytes).
    pub category_label: String,
}

impl ParameterProperties {
    /// The parameter is an on/off switch.
    pub const IS_SWITCH: i32 = 1 << 0;
    pub const USES_INT_MIN_MAX: i32 = 1 << 1;
    pub const USES_FLOAT_STEP: i32 = 1 << 2;
    pub const USES_INT_STEP: i32 = 1 << 3;
    pub const SUPPORTS_DISPLAY_INDEX: i32 = 1 << 4;
    pub const SUPPORTS_DISPLAY_CATEGORY: i32 = 1 << 5;
    /// The parameter can be ramped by the host.
    pub const CAN_RAMP: i32 = 1 << 6;

    /// Properties carrying only a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Report an integer range.
    pub fn with_int_range(mut self, min: i32, max: i32) -> Self {
        self.min_integer = min;
        self.max_integer = max;
        self.flags |= Self::USES_INT_MIN_MAX;
        self
    }

    /// Report float step sizes.
    pub fn with_float_steps(mut self, small: f32, normal: f32, large: f32) -> Self {
        self.small_step_float = small;
        self.step_float = normal;
        self.large_step_float = large;
        self.flags |= Self::USES_FLOAT_STEP;
        self
    }

    /// Place the parameter in a display category.
    pub fn with_category(mut self, category: i16, label: impl Into<String>, count: i16) -> Self {
        self.category = category;
        self.category_label = label.into();
        self.num_parameters_in_category = count;
        self.flags |= Self::SUPPORTS_DISPLAY_CATEGORY;
        self
    }

    /// Mark the parameter as a switch.
    pub fn switch(mut self) -> Self {
        self.flags |= Self::IS_SWITCH;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_builder() {
        let pin = PinProperties::new("Left In", "L").stereo().with_arrangement(1);
        assert_eq!(
            pin.flags,
            PinProperties::IS_ACTIVE | PinProperties::IS_STEREO | PinProperties::USE_SPEAKER
        );
        assert_eq!(pin.arrangement_type, 1);
    }

    #[test]
    fn test_parameter_builder() {
        let props = ParameterProperties::new("dB")
            .with_int_range(-60, 12)
            .with_category(1, "Output", 2);

        assert!(props.flags & ParameterProperties::USES_INT_MIN_MAX != 0);
        assert!(props.flags & ParameterProperties::SUPPORTS_DISPLAY_CATEGORY != 0);
        assert!(props.flags & ParameterProperties::IS_SWITCH == 0);
        assert_eq!(props.min_integer, -60);
        assert_eq!(props.category_label, "Output");
    }
}
