use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value held by a pin that has never been written.
pub const UNSET: i64 = -1;

/// Widest pin the kernel can hold in an `i64`.
pub const MAX_WIDTH: u32 = 64;

/// Snapshot of pin values keyed by pin name, in declaration order.
pub type PinValues = IndexMap<String, i64>;

/// Classification tag carried by a pin. Used for display and validation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinType {
    Bool,
    Unsigned,
    Signed,
}

impl Default for PinType {
    fn default() -> Self {
        PinType::Unsigned
    }
}

impl std::fmt::Display for PinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PinType::Bool => "bool",
            PinType::Unsigned => "unsigned",
            PinType::Signed => "signed",
        };
        write!(f, "{}", name)
    }
}

/// Direction of a pin relative to the component that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinDirection {
    /// Written from outside, read from inside
    Input,
    /// Written from inside, read from outside
    Output,
}

/// Which end of a wire an endpoint sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireSide {
    Source,
    Target,
}

impl WireSide {
    /// Direction of the pin an endpoint resolves to.
    ///
    /// A boundary source reads the owner's input pin and a child source reads
    /// the child's output pin; targets are the mirror image.
    pub fn pin_direction(&self, is_boundary: bool) -> PinDirection {
        match (self, is_boundary) {
            (WireSide::Source, true) => PinDirection::Input,
            (WireSide::Source, false) => PinDirection::Output,
            (WireSide::Target, true) => PinDirection::Output,
            (WireSide::Target, false) => PinDirection::Input,
        }
    }
}

/// Address of a pin as seen from inside a composite component.
///
/// `component == None` refers to the composite's own boundary pin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub(crate) component: Option<String>,
    pub(crate) pin: String,
}

impl Endpoint {
    /// Endpoint on the enclosing component's boundary
    pub fn boundary(pin: &str) -> Self {
        Self {
            component: None,
            pin: pin.to_string(),
        }
    }

    /// Endpoint on a direct sub-component
    pub fn child(component: &str, pin: &str) -> Self {
        Self {
            component: Some(component.to_string()),
            pin: pin.to_string(),
        }
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    pub fn pin(&self) -> &str {
        &self.pin
    }

    pub fn is_boundary(&self) -> bool {
        self.component.is_none()
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.component {
            Some(component) => write!(f, "{}.{}", component, self.pin),
            None => write!(f, "{}", self.pin),
        }
    }
}

/// Build a [`PinValues`] map from `(name, value)` pairs
pub fn pin_values(pairs: &[(&str, i64)]) -> PinValues {
    pairs.iter().map(|(name, value)| (name.to_string(), *value)).collect()
}

/// Truncate `value` to its low `width` bits.
///
/// The mask is built in `u64` so widths up to 63 never overflow; a 64-bit
/// pin keeps the value as-is.
pub fn mask(value: i64, width: u32) -> i64 {
    if width >= MAX_WIDTH {
        value
    } else {
        value & ((1u64 << width) - 1) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_truncates_to_width() {
        assert_eq!(mask(0b1111, 1), 1);
        assert_eq!(mask(0b1110, 1), 0);
        assert_eq!(mask(0xff, 4), 0xf);
        assert_eq!(mask(UNSET, 3), 0b111);
        assert_eq!(mask(-5, 64), -5);
    }

    #[test]
    fn test_mask_at_widest_pins() {
        assert_eq!(mask(-1, 63), i64::MAX);
        assert_eq!(mask(i64::MIN, 63), 0);
        assert_eq!(mask(5, 63), 5);
        assert_eq!(mask(-1, 64), -1);
        assert_eq!(mask(i64::MIN, 64), i64::MIN);
    }

    #[test]
    fn test_side_resolves_asymmetric_directions() {
        assert_eq!(WireSide::Source.pin_direction(true), PinDirection::Input);
        assert_eq!(WireSide::Source.pin_direction(false), PinDirection::Output);
        assert_eq!(WireSide::Target.pin_direction(true), PinDirection::Output);
        assert_eq!(WireSide::Target.pin_direction(false), PinDirection::Input);
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(Endpoint::boundary("A").to_string(), "A");
        assert_eq!(Endpoint::child("and1", "Out").to_string(), "and1.Out");
    }
}
