use super::errors::{SimError, SimResult};
use super::types::{PinType, UNSET};

/// A named, fixed-width signal terminal holding one integer value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    name: String,
    width: u32,
    pin_type: PinType,
    value: i64,
}

impl Pin {
    /// Create a pin holding the unset sentinel
    pub fn new(name: &str, width: u32, pin_type: PinType) -> Self {
        Self {
            name: name.to_string(),
            width,
            pin_type,
            value: UNSET,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn pin_type(&self) -> PinType {
        self.pin_type
    }

    pub fn read(&self) -> i64 {
        self.value
    }

    /// Overwrite the stored value.
    ///
    /// `width` must equal the declared width. The value itself is not masked;
    /// callers truncate before writing.
    pub fn write(&mut self, value: i64, width: u32) -> SimResult<()> {
        if width != self.width {
            return Err(SimError::WidthMismatch {
                location: format!("write to pin '{}'", self.name),
                expected: self.width,
                found: width,
            });
        }
        self.value = value;
        Ok(())
    }

    pub fn is_set(&self) -> bool {
        self.value != UNSET
    }
}

impl std::fmt::Display for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}:{}] = {}", self.name, self.width, self.pin_type, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_creation() {
        let pin = Pin::new("A", 4, PinType::Unsigned);
        assert_eq!(pin.name(), "A");
        assert_eq!(pin.width(), 4);
        assert_eq!(pin.read(), UNSET);
        assert!(!pin.is_set());
    }

    #[test]
    fn test_pin_write_matching_width() {
        let mut pin = Pin::new("A", 4, PinType::Unsigned);
        pin.write(9, 4).unwrap();
        assert_eq!(pin.read(), 9);
        assert!(pin.is_set());
    }

    #[test]
    fn test_pin_write_rejects_width_mismatch() {
        let mut pin = Pin::new("A", 4, PinType::Unsigned);
        let result = pin.write(1, 1);
        assert_eq!(
            result,
            Err(SimError::WidthMismatch {
                location: "write to pin 'A'".to_string(),
                expected: 4,
                found: 1,
            })
        );
        assert_eq!(pin.read(), UNSET);
    }

    #[test]
    fn test_pin_write_does_not_mask() {
        let mut pin = Pin::new("A", 1, PinType::Bool);
        pin.write(7, 1).unwrap();
        assert_eq!(pin.read(), 7);
    }
}
