//! Parameter descriptors for the tunable controls.
//!
//! Each control of the [`ParameterModel`](crate::ParameterModel) is described by a
//! [`ParamDescriptor`] carrying its display names, unit, range, and default. The
//! descriptors are the single source of truth for clamping: the model never stores
//! a value that did not pass through [`ParamDescriptor::clamp`].
//!
//! # Example
//!
//! ```rust
//! use tonebench_core::{ParamDescriptor, ParamUnit};
//!
//! let ratio = ParamDescriptor::new("Compressor Ratio", "Ratio", ParamUnit::Ratio, 1.0, 20.0, 6.0)
//!     .with_string_id("comp_ratio");
//!
//! assert_eq!(ratio.clamp(42.0), 20.0);
//! assert_eq!(ratio.format_value(4.0), "4.0:1");
//! ```

/// Unit type used to format a parameter value for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    /// Decibels (dB).
    Decibels,
    /// Hertz (Hz).
    Hertz,
    /// Ratio (n:1).
    Ratio,
    /// Linear 0–1 amount, displayed as a percentage.
    Amount,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use tonebench_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::Amount.suffix(), "%");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Ratio => ":1",
            ParamUnit::Amount => "%",
        }
    }
}

/// Describes a single control's metadata for display and validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display (e.g., "LPF Cutoff").
    pub name: &'static str,

    /// Short name, max 8 characters (e.g., "Cutoff").
    pub short_name: &'static str,

    /// Unit type for formatting the parameter value.
    pub unit: ParamUnit,

    /// Minimum allowed value.
    pub min: f32,

    /// Maximum allowed value.
    pub max: f32,

    /// Value used at initialization, and as the replacement for NaN input.
    pub default: f32,

    /// Stable identifier for command-line parsing and debugging.
    ///
    /// Convention: `"stage_param"` (e.g., `"comp_ratio"`).
    pub string_id: &'static str,
}

impl ParamDescriptor {
    /// Creates a descriptor with no string ID.
    pub const fn new(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit,
            min,
            max,
            default,
            string_id: "",
        }
    }

    /// Sets the stable string ID.
    pub const fn with_string_id(mut self, string_id: &'static str) -> Self {
        self.string_id = string_id;
        self
    }

    /// Clamps a value to this parameter's valid range.
    ///
    /// Infinite values saturate at the nearest bound. NaN has no nearest bound and
    /// is replaced by the default.
    ///
    /// ```rust
    /// use tonebench_core::{ParamDescriptor, ParamUnit};
    ///
    /// let desc = ParamDescriptor::new("Mix", "Mix", ParamUnit::Amount, 0.0, 1.0, 0.25);
    /// assert_eq!(desc.clamp(-3.0), 0.0);
    /// assert_eq!(desc.clamp(f32::INFINITY), 1.0);
    /// assert_eq!(desc.clamp(f32::NAN), 0.25);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Returns `true` if `value` lies inside `[min, max]`.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Formats a value with the unit suffix.
    ///
    /// Amounts are shown as percentages; ratios and decibels get one decimal.
    pub fn format_value(&self, value: f32) -> String {
        match self.unit {
            ParamUnit::Hertz => format!("{:.0}{}", value, self.unit.suffix()),
            ParamUnit::Amount => format!("{:.0}{}", value * 100.0, self.unit.suffix()),
            ParamUnit::Decibels | ParamUnit::Ratio => {
                format!("{:.1}{}", value, self.unit.suffix())
            }
        }
    }
}
