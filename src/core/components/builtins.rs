//! Built-in gate primitives.
//!
//! Two-input gates expose `A`, `B` and `Out`; `not` and `buf` expose `A` and
//! `Out`. The library registers the 1-bit `bool` flavour of every gate under
//! its lowercase name.

use super::component::{Component, LeafLogic};
use super::library::ComponentLibrary;
use super::template::ComponentTemplate;
use crate::core::errors::SimResult;
use crate::core::types::{PinType, PinValues, UNSET};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    Not,
    Buf,
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
}

impl GateKind {
    pub const ALL: [GateKind; 8] = [
        GateKind::Not,
        GateKind::Buf,
        GateKind::And,
        GateKind::Or,
        GateKind::Xor,
        GateKind::Nand,
        GateKind::Nor,
        GateKind::Xnor,
    ];

    pub fn type_name(&self) -> &'static str {
        match self {
            GateKind::Not => "not",
            GateKind::Buf => "buf",
            GateKind::And => "and",
            GateKind::Or => "or",
            GateKind::Xor => "xor",
            GateKind::Nand => "nand",
            GateKind::Nor => "nor",
            GateKind::Xnor => "xnor",
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, GateKind::Not | GateKind::Buf)
    }

    /// Bitwise result; masking to the output width happens on write
    pub fn apply(&self, a: i64, b: i64) -> i64 {
        match self {
            GateKind::Not => !a,
            GateKind::Buf => a,
            GateKind::And => a & b,
            GateKind::Or => a | b,
            GateKind::Xor => a ^ b,
            GateKind::Nand => !(a & b),
            GateKind::Nor => !(a | b),
            GateKind::Xnor => !(a ^ b),
        }
    }
}

/// Pin layout of a gate of the given width
pub fn gate_template(kind: GateKind, width: u32) -> ComponentTemplate {
    let pin_type = if width == 1 { PinType::Bool } else { PinType::Unsigned };
    let template = ComponentTemplate::new(kind.type_name()).input("A", width, pin_type);
    let template = if kind.is_unary() {
        template
    } else {
        template.input("B", width, pin_type)
    };
    template.output("Out", width, pin_type)
}

/// Evaluation function of a gate
pub fn gate_logic(kind: GateKind) -> LeafLogic {
    Rc::new(move |inputs: &PinValues| {
        let a = inputs.get("A").copied().unwrap_or(UNSET);
        let b = inputs.get("B").copied().unwrap_or(UNSET);
        let mut outputs = PinValues::new();
        outputs.insert("Out".to_string(), kind.apply(a, b));
        outputs
    })
}

/// Build a standalone gate of any supported width
pub fn gate(kind: GateKind, name: &str, width: u32) -> SimResult<Component> {
    Component::leaf(name, &gate_template(kind, width), gate_logic(kind))
}

pub fn register_builtins(library: &mut ComponentLibrary) {
    for kind in GateKind::ALL {
        library.register_leaf(gate_template(kind, 1), gate_logic(kind));
    }
}
