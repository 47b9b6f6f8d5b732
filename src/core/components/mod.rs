pub mod builtins;
pub mod component;
pub mod library;
pub mod template;

// Re-export commonly used types
pub use builtins::{gate, gate_template, GateKind};
pub use component::{Component, ComponentKind, LeafLogic};
pub use library::{ComponentLibrary, Generator};
pub use template::{ComponentDecl, ComponentTemplate, PinDecl, WireDecl};

use crate::core::errors::SimResult;

/// Instantiate `template` as a root component named after its type
pub fn instantiate(template: &ComponentTemplate, library: &ComponentLibrary) -> SimResult<Component> {
    Component::instantiate(&template.component_type, template, library)
}
