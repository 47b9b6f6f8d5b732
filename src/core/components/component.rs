use super::library::ComponentLibrary;
use super::template::{validate_width, ComponentDecl, ComponentTemplate, PinDecl, WireDecl};
use crate::core::connections::validator::ConnectionValidator;
use crate::core::connections::wire::{Wire, WireScope};
use crate::core::errors::{SimError, SimResult};
use crate::core::pin::Pin;
use crate::core::types::{mask, PinDirection, PinValues};
use indexmap::IndexMap;
use log::{debug, trace, warn};
use std::rc::Rc;

/// Evaluation function of a leaf: input snapshot in, requested outputs out
pub type LeafLogic = Rc<dyn Fn(&PinValues) -> PinValues>;

/// The two kinds of component the kernel knows about
#[derive(Clone)]
pub enum ComponentKind {
    /// Built from named sub-components and the wires between them
    Composite {
        components: IndexMap<String, Component>,
        wires: Vec<Wire>,
    },
    /// Primitive with its own evaluation function
    Leaf { logic: LeafLogic, runnable: bool },
}

/// Instantiated runtime component.
///
/// A component exclusively owns its pins and its direct sub-components; they
/// are dropped together.
#[derive(Clone)]
pub struct Component {
    name: String,
    component_type: String,
    input_pins: IndexMap<String, Pin>,
    output_pins: IndexMap<String, Pin>,
    kind: ComponentKind,
}

impl Component {
    /// Build a composite from `template`, generating every sub-component
    /// through `library`.
    ///
    /// Sub-components are created first in declaration order, then boundary
    /// pins, then wires. Any failure aborts the whole construction.
    pub fn instantiate(name: &str, template: &ComponentTemplate, library: &ComponentLibrary) -> SimResult<Self> {
        template.validate()?;

        let mut components = IndexMap::new();
        for decl in &template.components {
            let child = library.generate(&decl.component_type, &decl.name)?;
            components.insert(decl.name.clone(), child);
        }

        let mut component = Self {
            name: name.to_string(),
            component_type: template.component_type.clone(),
            input_pins: build_pins(&template.input_pins)?,
            output_pins: build_pins(&template.output_pins)?,
            kind: ComponentKind::Composite {
                components,
                wires: Vec::with_capacity(template.wires.len()),
            },
        };

        for decl in &template.wires {
            component.connect(decl)?;
        }

        debug!(
            "Instantiated '{}' of type '{}' ({} sub-components, {} wires)",
            component.name,
            component.component_type,
            template.components.len(),
            template.wires.len()
        );
        Ok(component)
    }

    /// Build a leaf from the pin declarations of `template`
    pub fn leaf(name: &str, template: &ComponentTemplate, logic: LeafLogic) -> SimResult<Self> {
        if !template.components.is_empty() || !template.wires.is_empty() {
            warn!(
                "Leaf type '{}' ignores {} sub-components and {} wires from its template",
                template.component_type,
                template.components.len(),
                template.wires.len()
            );
        }
        let pin_only = ComponentTemplate {
            component_type: template.component_type.clone(),
            input_pins: template.input_pins.clone(),
            output_pins: template.output_pins.clone(),
            ..Default::default()
        };
        pin_only.validate()?;

        Ok(Self {
            name: name.to_string(),
            component_type: template.component_type.clone(),
            input_pins: build_pins(&template.input_pins)?,
            output_pins: build_pins(&template.output_pins)?,
            kind: ComponentKind::Leaf { logic, runnable: true },
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, ComponentKind::Composite { .. })
    }

    /// Whether a scheduler should call [`run`](Self::run) on this component
    pub fn needs_run(&self) -> bool {
        matches!(self.kind, ComponentKind::Leaf { runnable: true, .. })
    }

    /// Enable or disable a leaf's evaluation. No effect on composites.
    pub fn set_runnable(&mut self, enabled: bool) {
        if let ComponentKind::Leaf { runnable, .. } = &mut self.kind {
            *runnable = enabled;
        }
    }

    pub fn input_pins(&self) -> impl Iterator<Item = &Pin> + '_ {
        self.input_pins.values()
    }

    pub fn output_pins(&self) -> impl Iterator<Item = &Pin> + '_ {
        self.output_pins.values()
    }

    pub fn input_pin(&self, name: &str) -> SimResult<&Pin> {
        self.input_pins.get(name).ok_or_else(|| self.pin_not_found(name))
    }

    pub fn output_pin(&self, name: &str) -> SimResult<&Pin> {
        self.output_pins.get(name).ok_or_else(|| self.pin_not_found(name))
    }

    pub(crate) fn input_pin_mut(&mut self, name: &str) -> SimResult<&mut Pin> {
        match self.input_pins.get_mut(name) {
            Some(pin) => Ok(pin),
            None => Err(SimError::PinNotFound {
                component: self.name.clone(),
                pin: name.to_string(),
            }),
        }
    }

    pub fn pin(&self, direction: PinDirection, name: &str) -> SimResult<&Pin> {
        match direction {
            PinDirection::Input => self.input_pin(name),
            PinDirection::Output => self.output_pin(name),
        }
    }

    fn pin_not_found(&self, name: &str) -> SimError {
        SimError::PinNotFound {
            component: self.name.clone(),
            pin: name.to_string(),
        }
    }

    /// Direct sub-components in declaration order; empty for a leaf
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        let children = match &self.kind {
            ComponentKind::Composite { components, .. } => Some(components),
            ComponentKind::Leaf { .. } => None,
        };
        children.into_iter().flat_map(|c| c.values())
    }

    pub fn components_mut(&mut self) -> impl Iterator<Item = &mut Component> + '_ {
        let children = match &mut self.kind {
            ComponentKind::Composite { components, .. } => Some(components),
            ComponentKind::Leaf { .. } => None,
        };
        children.into_iter().flat_map(|c| c.values_mut())
    }

    pub fn component(&self, name: &str) -> SimResult<&Component> {
        let found = match &self.kind {
            ComponentKind::Composite { components, .. } => components.get(name),
            ComponentKind::Leaf { .. } => None,
        };
        found.ok_or_else(|| SimError::ComponentNotFound {
            parent: self.name.clone(),
            name: name.to_string(),
        })
    }

    pub fn component_mut(&mut self, name: &str) -> SimResult<&mut Component> {
        let parent = self.name.clone();
        let found = match &mut self.kind {
            ComponentKind::Composite { components, .. } => components.get_mut(name),
            ComponentKind::Leaf { .. } => None,
        };
        found.ok_or_else(|| SimError::ComponentNotFound {
            parent,
            name: name.to_string(),
        })
    }

    /// Internal wires in declaration order; empty for a leaf
    pub fn wires(&self) -> &[Wire] {
        match &self.kind {
            ComponentKind::Composite { wires, .. } => wires,
            ComponentKind::Leaf { .. } => &[],
        }
    }

    pub fn wire(&self, name: &str) -> SimResult<&Wire> {
        self.wires()
            .iter()
            .find(|wire| wire.needs_run() && wire.name() == name)
            .ok_or_else(|| SimError::WireNotFound {
                component: self.name.clone(),
                wire: name.to_string(),
            })
    }

    pub fn get_input_values(&self) -> PinValues {
        snapshot(&self.input_pins)
    }

    pub fn get_output_values(&self) -> PinValues {
        snapshot(&self.output_pins)
    }

    /// Write input values, masking each to its pin's width.
    /// Unknown names are ignored and missing names are left untouched.
    pub fn apply_input_values(&mut self, values: &PinValues) {
        apply(&mut self.input_pins, values);
    }

    /// Write output values, masking each to its pin's width.
    /// Unknown names are ignored and missing names are left untouched.
    pub fn apply_output_values(&mut self, values: &PinValues) {
        apply(&mut self.output_pins, values);
    }

    /// Single-shot evaluation. A runnable leaf snapshots its inputs, runs its
    /// logic and writes the masked results; a composite does nothing, its
    /// behaviour being the sum of its wires and children.
    pub fn run(&mut self) -> SimResult<()> {
        let logic = match &self.kind {
            ComponentKind::Leaf { logic, runnable: true } => Rc::clone(logic),
            _ => return Ok(()),
        };
        let inputs = self.get_input_values();
        let outputs = logic(&inputs);
        trace!("{} ({}) {:?} -> {:?}", self.name, self.component_type, inputs, outputs);
        self.apply_output_values(&outputs);
        Ok(())
    }

    /// Run every active wire owned by this component, in declaration order
    pub fn run_wires(&mut self) -> SimResult<()> {
        let Component {
            name,
            input_pins,
            output_pins,
            kind,
            ..
        } = self;
        if let ComponentKind::Composite { components, wires } = kind {
            let mut scope = WireScope {
                owner: name.as_str(),
                input_pins,
                output_pins,
                components,
            };
            for wire in wires.iter().filter(|wire| wire.needs_run()) {
                wire.run(&mut scope)?;
            }
        }
        Ok(())
    }

    /// Flatten this component back into the declaration form it was built from.
    ///
    /// Pin values are not part of a template.
    pub fn export_template(&self) -> ComponentTemplate {
        let wires = self
            .wires()
            .iter()
            .filter_map(|wire| match wire {
                Wire::Active { name, source, target } => Some(WireDecl::new(name, source.clone(), target.clone())),
                Wire::Null => None,
            })
            .collect();

        ComponentTemplate {
            component_type: self.component_type.clone(),
            input_pins: self.input_pins.values().map(declare).collect(),
            output_pins: self.output_pins.values().map(declare).collect(),
            components: self
                .components()
                .map(|child| ComponentDecl::new(&child.name, &child.component_type))
                .collect(),
            wires,
        }
    }

    /// Generate and attach a new sub-component
    pub fn add_component(&mut self, decl: &ComponentDecl, library: &ComponentLibrary) -> SimResult<()> {
        let scope = self.name.clone();
        let components = self.components_map_mut()?;
        if components.contains_key(&decl.name) {
            return Err(SimError::DuplicateName {
                scope,
                name: decl.name.clone(),
            });
        }
        let child = library.generate(&decl.component_type, &decl.name)?;
        components.insert(decl.name.clone(), child);
        debug!("Added '{}' ({}) to '{}'", decl.name, decl.component_type, scope);
        Ok(())
    }

    /// Detach a sub-component together with every wire that touches it
    pub fn remove_component(&mut self, name: &str) -> SimResult<Component> {
        let parent = self.name.clone();
        let (components, wires) = match &mut self.kind {
            ComponentKind::Composite { components, wires } => (components, wires),
            ComponentKind::Leaf { .. } => return Err(SimError::NotComposite { name: parent }),
        };
        let removed = components
            .shift_remove(name)
            .ok_or_else(|| SimError::ComponentNotFound {
                parent: parent.clone(),
                name: name.to_string(),
            })?;
        let before = wires.len();
        wires.retain(|wire| !wire.touches(name));
        debug!(
            "Removed '{}' from '{}' along with {} wires",
            name,
            parent,
            before - wires.len()
        );
        Ok(removed)
    }

    /// Add a wire after checking its endpoints, its driver and its widths
    pub fn add_wire(&mut self, decl: &WireDecl) -> SimResult<()> {
        let (source_pin, target_pin) = ConnectionValidator::validate_connection(self, &decl.source(), &decl.target())?;
        let location = format!("wire '{}' in '{}'", decl.name, self.name);
        ConnectionValidator::check_widths(&location, source_pin, target_pin)?;
        self.connect(decl)?;
        debug!("Connected {} -> {} in '{}'", decl.source(), decl.target(), self.name);
        Ok(())
    }

    /// Remove a wire by name
    pub fn remove_wire(&mut self, name: &str) -> SimResult<Wire> {
        let index = self.wire_index(name)?;
        let wires = self.wires_mut()?;
        Ok(wires.remove(index))
    }

    /// Replace a wire by an inert placeholder, keeping the position of every
    /// other wire in the schedule
    pub fn disconnect_wire(&mut self, name: &str) -> SimResult<Wire> {
        let index = self.wire_index(name)?;
        let wires = self.wires_mut()?;
        Ok(std::mem::replace(&mut wires[index], Wire::null()))
    }

    /// Re-check every wire's widths, recursively through all sub-components
    pub fn validate_widths(&self) -> SimResult<()> {
        ConnectionValidator::validate_all_connections(self)?;
        for child in self.components() {
            child.validate_widths()?;
        }
        Ok(())
    }

    /// Resolve a declaration and append the wire without a width check
    fn connect(&mut self, decl: &WireDecl) -> SimResult<()> {
        let source = decl.source();
        let target = decl.target();
        ConnectionValidator::validate_connection(self, &source, &target)?;
        ConnectionValidator::check_wire_name(&self.name, self.wires(), &decl.name)?;
        ConnectionValidator::check_driver_collision(&self.name, self.wires(), &target)?;
        self.wires_mut()?.push(Wire::new(&decl.name, source, target));
        Ok(())
    }

    fn wire_index(&self, name: &str) -> SimResult<usize> {
        self.wires()
            .iter()
            .position(|wire| wire.needs_run() && wire.name() == name)
            .ok_or_else(|| SimError::WireNotFound {
                component: self.name.clone(),
                wire: name.to_string(),
            })
    }

    fn wires_mut(&mut self) -> SimResult<&mut Vec<Wire>> {
        match &mut self.kind {
            ComponentKind::Composite { wires, .. } => Ok(wires),
            ComponentKind::Leaf { .. } => Err(SimError::NotComposite { name: self.name.clone() }),
        }
    }

    fn components_map_mut(&mut self) -> SimResult<&mut IndexMap<String, Component>> {
        match &mut self.kind {
            ComponentKind::Composite { components, .. } => Ok(components),
            ComponentKind::Leaf { .. } => Err(SimError::NotComposite { name: self.name.clone() }),
        }
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("Component");
        out.field("name", &self.name)
            .field("type", &self.component_type)
            .field("input_pins", &self.input_pins)
            .field("output_pins", &self.output_pins);
        match &self.kind {
            ComponentKind::Composite { components, wires } => {
                out.field("components", components).field("wires", wires);
            }
            ComponentKind::Leaf { runnable, .. } => {
                out.field("runnable", runnable);
            }
        }
        out.finish()
    }
}

fn build_pins(decls: &[PinDecl]) -> SimResult<IndexMap<String, Pin>> {
    let mut pins = IndexMap::with_capacity(decls.len());
    for decl in decls {
        validate_width(decl)?;
        pins.insert(decl.name.clone(), Pin::new(&decl.name, decl.width, decl.pin_type));
    }
    Ok(pins)
}

fn declare(pin: &Pin) -> PinDecl {
    PinDecl::new(pin.name(), pin.width(), pin.pin_type())
}

fn snapshot(pins: &IndexMap<String, Pin>) -> PinValues {
    pins.iter().map(|(name, pin)| (name.clone(), pin.read())).collect()
}

fn apply(pins: &mut IndexMap<String, Pin>, values: &PinValues) {
    for (name, value) in values {
        if let Some(pin) = pins.get_mut(name) {
            let width = pin.width();
            let written = pin.write(mask(*value, width), width);
            debug_assert!(written.is_ok(), "write at the pin's own width failed: {:?}", written);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{pin_values, Endpoint, PinType, UNSET};

    fn passthrough(width: u32) -> ComponentTemplate {
        ComponentTemplate::new("passthrough")
            .input("A", width, PinType::Unsigned)
            .output("Y", width, PinType::Unsigned)
            .wire("w", Endpoint::boundary("A"), Endpoint::boundary("Y"))
    }

    fn inverter() -> Component {
        let template = ComponentTemplate::new("not")
            .input("A", 1, PinType::Bool)
            .output("Out", 1, PinType::Bool);
        Component::leaf(
            "inv",
            &template,
            Rc::new(|inputs: &PinValues| pin_values(&[("Out", !inputs["A"])])),
        )
        .unwrap()
    }

    #[test]
    fn test_instantiate_creates_unset_pins() {
        let library = ComponentLibrary::new();
        let component = Component::instantiate("p", &passthrough(4), &library).unwrap();
        assert!(component.is_composite());
        assert_eq!(component.input_pin("A").unwrap().read(), UNSET);
        assert_eq!(component.output_pin("Y").unwrap().width(), 4);
        assert_eq!(component.wires().len(), 1);
    }

    #[test]
    fn test_apply_input_values_masks() {
        let library = ComponentLibrary::new();
        let mut component = Component::instantiate("p", &passthrough(4), &library).unwrap();
        component.apply_input_values(&pin_values(&[("A", 0x1f), ("unknown", 3)]));
        assert_eq!(component.get_input_values(), pin_values(&[("A", 0xf)]));
    }

    #[test]
    fn test_run_wires_propagates() {
        let library = ComponentLibrary::new();
        let mut component = Component::instantiate("p", &passthrough(4), &library).unwrap();
        component.apply_input_values(&pin_values(&[("A", 6)]));
        component.run().unwrap();
        assert_eq!(component.output_pin("Y").unwrap().read(), UNSET);
        component.run_wires().unwrap();
        assert_eq!(component.output_pin("Y").unwrap().read(), 6);
    }

    #[test]
    fn test_leaf_run_masks_outputs() {
        let mut inv = inverter();
        inv.apply_input_values(&pin_values(&[("A", 0)]));
        inv.run().unwrap();
        assert_eq!(inv.output_pin("Out").unwrap().read(), 1);
        assert!(inv.needs_run());
    }

    #[test]
    fn test_disabled_leaf_does_not_run() {
        let mut inv = inverter();
        inv.set_runnable(false);
        inv.apply_input_values(&pin_values(&[("A", 0)]));
        inv.run().unwrap();
        assert_eq!(inv.output_pin("Out").unwrap().read(), UNSET);
    }

    #[test]
    fn test_leaf_has_no_structure() {
        let mut inv = inverter();
        assert_eq!(inv.components().count(), 0);
        assert!(inv.wires().is_empty());
        assert_eq!(
            inv.remove_wire("w").unwrap_err(),
            SimError::WireNotFound {
                component: "inv".to_string(),
                wire: "w".to_string(),
            }
        );
        assert_eq!(
            inv.remove_component("x").unwrap_err(),
            SimError::NotComposite { name: "inv".to_string() }
        );
    }

    #[test]
    fn test_disconnect_leaves_null_placeholder() {
        let library = ComponentLibrary::new();
        let mut component = Component::instantiate("p", &passthrough(1), &library).unwrap();
        let removed = component.disconnect_wire("w").unwrap();
        assert_eq!(removed.name(), "w");
        assert_eq!(component.wires(), &[Wire::Null]);
        assert!(component.export_template().wires.is_empty());
        component.run_wires().unwrap();
    }

    #[test]
    fn test_add_wire_rejects_width_mismatch() {
        let library = ComponentLibrary::new();
        let template = ComponentTemplate::new("t")
            .input("A", 1, PinType::Bool)
            .output("Y", 4, PinType::Unsigned);
        let mut component = Component::instantiate("t", &template, &library).unwrap();
        let result = component.add_wire(&WireDecl::new("w", Endpoint::boundary("A"), Endpoint::boundary("Y")));
        assert_eq!(
            result,
            Err(SimError::WidthMismatch {
                location: "wire 'w' in 't'".to_string(),
                expected: 4,
                found: 1,
            })
        );
        assert!(component.wires().is_empty());
    }
}
