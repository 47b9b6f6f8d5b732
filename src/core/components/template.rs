use crate::core::errors::{SimError, SimResult};
use crate::core::types::{Endpoint, PinType, MAX_WIDTH};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pin declaration inside a template
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinDecl {
    pub name: String,
    pub width: u32,
    #[serde(rename = "type", default)]
    pub pin_type: PinType,
}

impl PinDecl {
    pub fn new(name: &str, width: u32, pin_type: PinType) -> Self {
        Self {
            name: name.to_string(),
            width,
            pin_type,
        }
    }
}

/// Sub-component declaration: an instance name plus a library type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: String,
}

impl ComponentDecl {
    pub fn new(name: &str, component_type: &str) -> Self {
        Self {
            name: name.to_string(),
            component_type: component_type.to_string(),
        }
    }
}

/// Wire declaration. A missing component name refers to the boundary pin of
/// the component being declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDecl {
    pub name: String,
    #[serde(default)]
    pub from_component: Option<String>,
    pub from_pin: String,
    #[serde(default)]
    pub to_component: Option<String>,
    pub to_pin: String,
}

impl WireDecl {
    pub fn new(name: &str, source: Endpoint, target: Endpoint) -> Self {
        Self {
            name: name.to_string(),
            from_component: source.component,
            from_pin: source.pin,
            to_component: target.component,
            to_pin: target.pin,
        }
    }

    pub fn source(&self) -> Endpoint {
        Endpoint {
            component: self.from_component.clone(),
            pin: self.from_pin.clone(),
        }
    }

    pub fn target(&self) -> Endpoint {
        Endpoint {
            component: self.to_component.clone(),
            pin: self.to_pin.clone(),
        }
    }
}

/// Declarative, serializable blueprint for a component.
///
/// Templates are plain data. They are written by hand for seed circuits or
/// produced by [`Component::export_template`](super::component::Component::export_template).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTemplate {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub input_pins: Vec<PinDecl>,
    #[serde(default)]
    pub output_pins: Vec<PinDecl>,
    #[serde(default)]
    pub components: Vec<ComponentDecl>,
    #[serde(default)]
    pub wires: Vec<WireDecl>,
}

impl ComponentTemplate {
    pub fn new(component_type: &str) -> Self {
        Self {
            component_type: component_type.to_string(),
            ..Default::default()
        }
    }

    pub fn input(mut self, name: &str, width: u32, pin_type: PinType) -> Self {
        self.input_pins.push(PinDecl::new(name, width, pin_type));
        self
    }

    pub fn output(mut self, name: &str, width: u32, pin_type: PinType) -> Self {
        self.output_pins.push(PinDecl::new(name, width, pin_type));
        self
    }

    pub fn component(mut self, name: &str, component_type: &str) -> Self {
        self.components.push(ComponentDecl::new(name, component_type));
        self
    }

    pub fn wire(mut self, name: &str, source: Endpoint, target: Endpoint) -> Self {
        self.wires.push(WireDecl::new(name, source, target));
        self
    }

    /// Check everything that can be checked without a library: unique names,
    /// supported widths, wire references that resolve inside the template and
    /// at most one driver per destination pin.
    ///
    /// Pins of sub-components are only known once they are generated, so a
    /// child pin reference is checked during instantiation instead.
    pub fn validate(&self) -> SimResult<()> {
        let scope = self.component_type.as_str();

        for pin in self.input_pins.iter().chain(&self.output_pins) {
            validate_width(pin)?;
        }
        unique_names(scope, self.input_pins.iter().map(|p| p.name.as_str()))?;
        unique_names(scope, self.output_pins.iter().map(|p| p.name.as_str()))?;
        unique_names(scope, self.components.iter().map(|c| c.name.as_str()))?;
        unique_names(scope, self.wires.iter().map(|w| w.name.as_str()))?;

        let mut driven = HashSet::new();
        for wire in &self.wires {
            match &wire.from_component {
                None => {
                    if !self.input_pins.iter().any(|p| p.name == wire.from_pin) {
                        return Err(SimError::PinNotFound {
                            component: scope.to_string(),
                            pin: wire.from_pin.clone(),
                        });
                    }
                }
                Some(name) => self.declared_component(name)?,
            }
            match &wire.to_component {
                None => {
                    if !self.output_pins.iter().any(|p| p.name == wire.to_pin) {
                        return Err(SimError::PinNotFound {
                            component: scope.to_string(),
                            pin: wire.to_pin.clone(),
                        });
                    }
                }
                Some(name) => self.declared_component(name)?,
            }

            let target = wire.target();
            if !driven.insert(target.clone()) {
                return Err(SimError::DuplicateDriver {
                    component: target.component().unwrap_or(scope).to_string(),
                    pin: target.pin,
                });
            }
        }

        Ok(())
    }

    fn declared_component(&self, name: &str) -> SimResult<()> {
        if self.components.iter().any(|c| c.name == name) {
            Ok(())
        } else {
            Err(SimError::ComponentNotFound {
                parent: self.component_type.clone(),
                name: name.to_string(),
            })
        }
    }
}

pub(crate) fn validate_width(pin: &PinDecl) -> SimResult<()> {
    if pin.width == 0 || pin.width > MAX_WIDTH {
        return Err(SimError::InvalidWidth {
            pin: pin.name.clone(),
            width: pin.width,
        });
    }
    Ok(())
}

fn unique_names<'a>(scope: &str, names: impl Iterator<Item = &'a str>) -> SimResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(SimError::DuplicateName {
                scope: scope.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
