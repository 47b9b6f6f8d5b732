//! Hierarchical digital logic simulation kernel.
//!
//! Circuits are described by [`ComponentTemplate`]s, instantiated against a
//! [`ComponentLibrary`] into trees of [`Component`]s joined by width-checked
//! [`Wire`]s, and evaluated by repeated in-place propagation passes.

pub mod core;

// Re-export commonly used types
pub use crate::core::components::{
    instantiate, Component, ComponentDecl, ComponentKind, ComponentLibrary, ComponentTemplate, GateKind,
    Generator, LeafLogic, PinDecl, WireDecl,
};
pub use crate::core::connections::Wire;
pub use crate::core::errors::{SimError, SimResult};
pub use crate::core::execution::{
    evaluate, EvaluationConfig, EvaluationObserver, EvaluationReport, Evaluator, SchedulingOrder,
};
pub use crate::core::pin::Pin;
pub use crate::core::types::{mask, pin_values, Endpoint, PinDirection, PinType, PinValues, UNSET};
