use super::config::{EvaluationConfig, SchedulingOrder};
use crate::core::components::component::Component;
use crate::core::errors::{SimError, SimResult};
use crate::core::types::PinValues;
use log::{debug, warn};

/// Observer trait for evaluation progress and value changes
pub trait EvaluationObserver {
    /// Called after every full pass with the number of pins whose value changed
    fn on_pass_complete(&mut self, pass: usize, changed: usize);

    /// Called once per root output pin whose value differs from before the evaluation
    fn on_output_changed(&mut self, _pin: &str, _old: i64, _new: i64) {}
}

/// Outcome of one call to [`Evaluator::evaluate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Whether a pass completed without changing any pin
    pub converged: bool,
    /// Number of passes run, including the final stable one
    pub passes: usize,
    pub order: SchedulingOrder,
}

impl EvaluationReport {
    /// Turn a non-converging outcome into `SimError::NonConvergence`
    pub fn into_result(self) -> SimResult<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(SimError::NonConvergence { passes: self.passes })
        }
    }
}

/// Drives repeated in-place propagation passes over a component tree until
/// no pin changes or the pass cap is hit.
///
/// Within a pass, each element reads whatever was last written; nothing is
/// frozen at the start of the pass, so the scheduling order is significant
/// for transient values and for networks with feedback.
pub struct Evaluator {
    config: EvaluationConfig,
    observers: Vec<Box<dyn EvaluationObserver>>,
}

impl Evaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Add an observer to the evaluator
    ///
    /// Observers are notified in registration order.
    pub fn add_observer(&mut self, observer: Box<dyn EvaluationObserver>) {
        self.observers.push(observer);
    }

    /// Apply root inputs and evaluate
    ///
    /// # Arguments
    /// * `root` - Top-level component to drive
    /// * `inputs` - Values for the root's input pins, masked to each pin's width
    ///
    /// # Returns
    /// The evaluation report, or the first width mismatch found in the tree.
    /// On error the inputs are not applied and no pin is written.
    pub fn evaluate_with_inputs(&mut self, root: &mut Component, inputs: &PinValues) -> SimResult<EvaluationReport> {
        root.validate_widths()?;
        root.apply_input_values(inputs);
        self.propagate(root)
    }

    /// Run passes until stable or until `max_passes` is reached.
    ///
    /// Every wire in the tree is width-checked before the first pass, so a
    /// mismatch is rejected with all pins left as they were. Non-convergence
    /// is not an error here; it is reported through
    /// [`EvaluationReport::converged`].
    pub fn evaluate(&mut self, root: &mut Component) -> SimResult<EvaluationReport> {
        root.validate_widths()?;
        self.propagate(root)
    }

    fn propagate(&mut self, root: &mut Component) -> SimResult<EvaluationReport> {
        let order = self.config.scheduling;
        let outputs_before = root.get_output_values();
        let mut previous = Vec::new();
        collect_values(root, &mut previous);

        let mut converged = false;
        let mut passes = 0;
        while passes < self.config.max_passes {
            passes += 1;
            debug!("=== Evaluation pass {} of '{}' ===", passes, root.name());
            Self::run_pass(root, order)?;

            let mut current = Vec::with_capacity(previous.len());
            collect_values(root, &mut current);
            let changed = previous.iter().zip(&current).filter(|(old, new)| old != new).count();
            self.notify_pass_complete(passes, changed);

            if changed == 0 {
                converged = true;
                break;
            }
            previous = current;
        }

        if converged {
            debug!("'{}' converged after {} passes", root.name(), passes);
        } else {
            warn!(
                "'{}' did not converge within {} passes; check for combinational feedback",
                root.name(),
                passes
            );
        }

        self.notify_output_changes(&outputs_before, &root.get_output_values());
        Ok(EvaluationReport {
            converged,
            passes,
            order,
        })
    }

    /// Run every schedulable element of `component` once, in `order`.
    ///
    /// This is a single raw pass with no up-front width check: a mismatched
    /// wire fails when it runs, after earlier elements have already written.
    pub fn run_pass(component: &mut Component, order: SchedulingOrder) -> SimResult<()> {
        if !component.is_composite() {
            return component.run();
        }
        match order {
            SchedulingOrder::ChildrenFirst => {
                for child in component.components_mut() {
                    Self::run_pass(child, order)?;
                }
                component.run_wires()
            }
            SchedulingOrder::WiresFirst => {
                component.run_wires()?;
                for child in component.components_mut() {
                    Self::run_pass(child, order)?;
                }
                Ok(())
            }
        }
    }

    fn notify_pass_complete(&mut self, pass: usize, changed: usize) {
        for observer in &mut self.observers {
            observer.on_pass_complete(pass, changed);
        }
    }

    fn notify_output_changes(&mut self, before: &PinValues, after: &PinValues) {
        for (pin, new) in after {
            let old = before.get(pin).copied().unwrap_or(*new);
            if old != *new {
                for observer in &mut self.observers {
                    observer.on_output_changed(pin, old, *new);
                }
            }
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluationConfig::default())
    }
}

/// Evaluate with the default configuration and report whether it converged
pub fn evaluate(root: &mut Component) -> SimResult<bool> {
    Ok(Evaluator::default().evaluate(root)?.converged)
}

/// Every pin value of the tree, depth-first in declaration order
fn collect_values(component: &Component, values: &mut Vec<i64>) {
    values.extend(component.input_pins().map(|pin| pin.read()));
    values.extend(component.output_pins().map(|pin| pin.read()));
    for child in component.components() {
        collect_values(child, values);
    }
}
