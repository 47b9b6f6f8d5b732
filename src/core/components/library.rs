use super::builtins;
use super::component::{Component, LeafLogic};
use super::template::ComponentTemplate;
use crate::core::errors::{SimError, SimResult};
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Produces a fresh component of one type. The library is passed along so
/// composite generators can instantiate their own sub-components.
pub type Generator = Rc<dyn Fn(&str, &ComponentLibrary) -> SimResult<Component>>;

/// Mapping from component type name to the generator that builds it.
///
/// Passed explicitly to every instantiation; there is no process-wide
/// registry.
#[derive(Clone, Default)]
pub struct ComponentLibrary {
    generators: HashMap<String, Generator>,
    /// Types currently being generated, innermost last
    in_progress: RefCell<Vec<String>>,
}

impl ComponentLibrary {
    /// Empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library preloaded with the built-in gates
    pub fn with_builtins() -> Self {
        let mut library = Self::new();
        builtins::register_builtins(&mut library);
        library
    }

    /// Register a generator, replacing any previous one for `type_name`
    pub fn register<F>(&mut self, type_name: &str, generator: F)
    where
        F: Fn(&str, &ComponentLibrary) -> SimResult<Component> + 'static,
    {
        if self.generators.insert(type_name.to_string(), Rc::new(generator)).is_some() {
            trace!("Replaced generator for '{}'", type_name);
        }
    }

    /// Register a composite type built from `template`
    pub fn register_template(&mut self, template: ComponentTemplate) {
        let type_name = template.component_type.clone();
        self.register(&type_name, move |name, library| {
            Component::instantiate(name, &template, library)
        });
    }

    /// Register a leaf type whose pins come from `template`
    pub fn register_leaf(&mut self, template: ComponentTemplate, logic: LeafLogic) {
        let type_name = template.component_type.clone();
        self.register(&type_name, move |name, _library| {
            Component::leaf(name, &template, Rc::clone(&logic))
        });
    }

    pub fn has_generator(&self, type_name: &str) -> bool {
        self.generators.contains_key(type_name)
    }

    /// Registered type names, sorted for deterministic listing
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.generators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build a new component of `type_name` called `name`.
    ///
    /// A type that is already being generated further up the call chain would
    /// recurse forever, so it is rejected with `RecursiveType`.
    pub fn generate(&self, type_name: &str, name: &str) -> SimResult<Component> {
        let generator = self
            .generators
            .get(type_name)
            .cloned()
            .ok_or_else(|| SimError::GeneratorNotFound {
                type_name: type_name.to_string(),
            })?;

        {
            let mut in_progress = self.in_progress.borrow_mut();
            if in_progress.iter().any(|t| t == type_name) {
                return Err(SimError::RecursiveType {
                    type_name: type_name.to_string(),
                });
            }
            in_progress.push(type_name.to_string());
        }

        trace!("Generating '{}' of type '{}'", name, type_name);
        let result = generator(name, self);
        self.in_progress.borrow_mut().pop();
        result
    }
}

impl std::fmt::Debug for ComponentLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentLibrary")
            .field("types", &self.type_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Endpoint, PinType};

    #[test]
    fn test_missing_generator() {
        let library = ComponentLibrary::new();
        let result = library.generate("foo", "f1");
        assert_eq!(
            result.unwrap_err(),
            SimError::GeneratorNotFound {
                type_name: "foo".to_string()
            }
        );
    }

    #[test]
    fn test_builtins_registered() {
        let library = ComponentLibrary::with_builtins();
        for name in ["not", "buf", "and", "or", "xor", "nand", "nor", "xnor"] {
            assert!(library.has_generator(name), "missing builtin {}", name);
        }
        let gate = library.generate("and", "and1").unwrap();
        assert_eq!(gate.name(), "and1");
        assert_eq!(gate.component_type(), "and");
        assert!(!gate.is_composite());
    }

    #[test]
    fn test_template_types_nest() {
        let mut library = ComponentLibrary::with_builtins();
        library.register_template(
            ComponentTemplate::new("inverter_pair")
                .input("A", 1, PinType::Bool)
                .output("Y", 1, PinType::Bool)
                .component("n1", "not")
                .component("n2", "not")
                .wire("in", Endpoint::boundary("A"), Endpoint::child("n1", "A"))
                .wire("mid", Endpoint::child("n1", "Out"), Endpoint::child("n2", "A"))
                .wire("out", Endpoint::child("n2", "Out"), Endpoint::boundary("Y")),
        );
        library.register_template(
            ComponentTemplate::new("quad")
                .component("p1", "inverter_pair")
                .component("p2", "inverter_pair"),
        );

        let quad = library.generate("quad", "q").unwrap();
        assert_eq!(quad.components().count(), 2);
        assert_eq!(quad.component("p2").unwrap().components().count(), 2);
    }

    #[test]
    fn test_self_containing_type_rejected() {
        let mut library = ComponentLibrary::new();
        library.register_template(ComponentTemplate::new("ouroboros").component("inner", "ouroboros"));
        assert_eq!(
            library.generate("ouroboros", "o").unwrap_err(),
            SimError::RecursiveType {
                type_name: "ouroboros".to_string()
            }
        );
        // The guard unwinds, so the library stays usable
        library.register_template(ComponentTemplate::new("empty"));
        assert!(library.generate("empty", "e").is_ok());
    }

    #[test]
    fn test_type_names_sorted() {
        let library = ComponentLibrary::with_builtins();
        let names = library.type_names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
