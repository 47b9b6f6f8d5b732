use super::wire::Wire;
use crate::core::components::component::Component;
use crate::core::errors::{SimError, SimResult};
use crate::core::pin::Pin;
use crate::core::types::{Endpoint, WireSide};

/// Centralized connection checks shared by instantiation and structural edits
pub struct ConnectionValidator;

impl ConnectionValidator {
    /// Resolve one end of a wire inside `owner`.
    ///
    /// A boundary source is one of the owner's input pins and a child source is
    /// that child's output pin; targets are the mirror image. Wires never reach
    /// past a direct child.
    pub fn resolve<'c>(owner: &'c Component, side: WireSide, endpoint: &Endpoint) -> SimResult<&'c Pin> {
        let direction = side.pin_direction(endpoint.is_boundary());
        match &endpoint.component {
            None => owner.pin(direction, &endpoint.pin),
            Some(child) => owner.component(child)?.pin(direction, &endpoint.pin),
        }
    }

    /// Validate that both ends of a wire exist and return their pins
    pub fn validate_connection<'c>(
        owner: &'c Component,
        source: &Endpoint,
        target: &Endpoint,
    ) -> SimResult<(&'c Pin, &'c Pin)> {
        let source_pin = Self::resolve(owner, WireSide::Source, source)?;
        let target_pin = Self::resolve(owner, WireSide::Target, target)?;
        Ok((source_pin, target_pin))
    }

    /// Reject a connection whose pins differ in width
    pub fn check_widths(location: &str, source: &Pin, target: &Pin) -> SimResult<()> {
        if source.width() != target.width() {
            return Err(SimError::WidthMismatch {
                location: location.to_string(),
                expected: target.width(),
                found: source.width(),
            });
        }
        Ok(())
    }

    /// Check if a destination pin is already driven. Multiple drivers not allowed.
    pub fn check_driver_collision(owner: &str, wires: &[Wire], target: &Endpoint) -> SimResult<()> {
        if wires.iter().any(|wire| wire.target() == Some(target)) {
            return Err(SimError::DuplicateDriver {
                component: target.component().unwrap_or(owner).to_string(),
                pin: target.pin().to_string(),
            });
        }
        Ok(())
    }

    /// Check that no existing wire already uses `name`
    pub fn check_wire_name(owner: &str, wires: &[Wire], name: &str) -> SimResult<()> {
        if wires.iter().any(|wire| wire.needs_run() && wire.name() == name) {
            return Err(SimError::DuplicateName {
                scope: owner.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Validate widths of every wire owned by `owner`
    pub fn validate_all_connections(owner: &Component) -> SimResult<()> {
        for wire in owner.wires() {
            if let (Some(source), Some(target)) = (wire.source(), wire.target()) {
                let (source_pin, target_pin) = Self::validate_connection(owner, source, target)?;
                let location = format!("wire '{}' in '{}'", wire.name(), owner.name());
                Self::check_widths(&location, source_pin, target_pin)?;
            }
        }
        Ok(())
    }
}
