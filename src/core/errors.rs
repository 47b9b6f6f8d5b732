use thiserror::Error;

/// Errors raised while building, editing or evaluating a circuit.
///
/// Every variant is terminal for the operation that produced it: a partially
/// instantiated component or a partially propagated pass is never handed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("cannot connect: width {expected} vs width {found} ({location})")]
    WidthMismatch {
        location: String,
        expected: u32,
        found: u32,
    },

    #[error("pin '{pin}' not found on component '{component}'")]
    PinNotFound { component: String, pin: String },

    #[error("component '{name}' not found in '{parent}'")]
    ComponentNotFound { parent: String, name: String },

    #[error("wire '{wire}' not found in '{component}'")]
    WireNotFound { component: String, wire: String },

    #[error("component '{name}' is a leaf and has no internal structure")]
    NotComposite { name: String },

    #[error("no generator registered for component type '{type_name}'")]
    GeneratorNotFound { type_name: String },

    #[error("name '{name}' is declared more than once in '{scope}'")]
    DuplicateName { scope: String, name: String },

    #[error("pin '{pin}' of '{component}' is driven by more than one wire")]
    DuplicateDriver { component: String, pin: String },

    #[error("pin '{pin}' has unsupported width {width}")]
    InvalidWidth { pin: String, width: u32 },

    #[error("component type '{type_name}' contains itself")]
    RecursiveType { type_name: String },

    #[error("network did not converge after {passes} passes")]
    NonConvergence { passes: usize },
}

pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_mismatch_message() {
        let err = SimError::WidthMismatch {
            location: "wire 'w1'".to_string(),
            expected: 1,
            found: 4,
        };
        assert_eq!(err.to_string(), "cannot connect: width 1 vs width 4 (wire 'w1')");
    }

    #[test]
    fn test_generator_not_found_message() {
        let err = SimError::GeneratorNotFound { type_name: "foo".to_string() };
        assert!(err.to_string().contains("'foo'"));
    }
}
