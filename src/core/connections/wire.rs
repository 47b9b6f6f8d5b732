use crate::core::components::component::Component;
use crate::core::errors::{SimError, SimResult};
use crate::core::pin::Pin;
use crate::core::types::Endpoint;
use indexmap::IndexMap;

/// Mutable view of one composite's pins and direct children, handed to its
/// wires while they run.
pub struct WireScope<'a> {
    pub(crate) owner: &'a str,
    pub(crate) input_pins: &'a mut IndexMap<String, Pin>,
    pub(crate) output_pins: &'a mut IndexMap<String, Pin>,
    pub(crate) components: &'a mut IndexMap<String, Component>,
}

impl<'a> WireScope<'a> {
    /// Pin a wire reads from: an own input pin or a child's output pin
    fn source(&self, endpoint: &Endpoint) -> SimResult<&Pin> {
        match &endpoint.component {
            None => self.input_pins.get(&endpoint.pin).ok_or_else(|| SimError::PinNotFound {
                component: self.owner.to_string(),
                pin: endpoint.pin.clone(),
            }),
            Some(child) => self.child(child)?.output_pin(&endpoint.pin),
        }
    }

    /// Pin a wire writes to: an own output pin or a child's input pin
    fn target_mut(&mut self, endpoint: &Endpoint) -> SimResult<&mut Pin> {
        let owner = self.owner;
        match &endpoint.component {
            None => self
                .output_pins
                .get_mut(&endpoint.pin)
                .ok_or_else(|| SimError::PinNotFound {
                    component: owner.to_string(),
                    pin: endpoint.pin.clone(),
                }),
            Some(child) => self
                .components
                .get_mut(child)
                .ok_or_else(|| SimError::ComponentNotFound {
                    parent: owner.to_string(),
                    name: child.clone(),
                })?
                .input_pin_mut(&endpoint.pin),
        }
    }

    fn child(&self, name: &str) -> SimResult<&Component> {
        self.components.get(name).ok_or_else(|| SimError::ComponentNotFound {
            parent: self.owner.to_string(),
            name: name.to_string(),
        })
    }
}

/// Directed, width-checked value copy between two pins of one scope.
///
/// Endpoints are held by name, never by reference, so a wire cannot outlive
/// or own the pins it connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wire {
    Active {
        name: String,
        source: Endpoint,
        target: Endpoint,
    },
    /// Placeholder for an absent connection; never scheduled
    Null,
}

impl Wire {
    pub fn new(name: &str, source: Endpoint, target: Endpoint) -> Self {
        Wire::Active {
            name: name.to_string(),
            source,
            target,
        }
    }

    pub fn null() -> Self {
        Wire::Null
    }

    pub fn name(&self) -> &str {
        match self {
            Wire::Active { name, .. } => name,
            Wire::Null => "",
        }
    }

    pub fn source(&self) -> Option<&Endpoint> {
        match self {
            Wire::Active { source, .. } => Some(source),
            Wire::Null => None,
        }
    }

    pub fn target(&self) -> Option<&Endpoint> {
        match self {
            Wire::Active { target, .. } => Some(target),
            Wire::Null => None,
        }
    }

    pub fn needs_run(&self) -> bool {
        matches!(self, Wire::Active { .. })
    }

    /// Whether either end of this wire sits on the named child
    pub fn touches(&self, component: &str) -> bool {
        match self {
            Wire::Active { source, target, .. } => {
                source.component() == Some(component) || target.component() == Some(component)
            }
            Wire::Null => false,
        }
    }

    /// Copy the source value into the target pin.
    ///
    /// Widths are compared on every run so a pin reconfigured after the wire
    /// was built is still caught.
    pub fn run(&self, scope: &mut WireScope<'_>) -> SimResult<()> {
        let (name, source, target) = match self {
            Wire::Active { name, source, target } => (name, source, target),
            Wire::Null => return Ok(()),
        };

        let owner = scope.owner;
        let (value, width) = {
            let pin = scope.source(source)?;
            (pin.read(), pin.width())
        };
        let destination = scope.target_mut(target)?;
        if width != destination.width() {
            return Err(SimError::WidthMismatch {
                location: format!("wire '{}' in '{}'", name, owner),
                expected: destination.width(),
                found: width,
            });
        }
        let destination_width = destination.width();
        destination.write(value, destination_width)
    }
}

impl std::fmt::Display for Wire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Wire::Active { name, source, target } => write!(f, "{}: {} -> {}", name, source, target),
            Wire::Null => write!(f, "<null>"),
        }
    }
}
