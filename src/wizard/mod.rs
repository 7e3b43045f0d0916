// Wizard core: navigation state machine, field propagation, password
// validation, advanced-options toggle.

pub mod filter;
pub mod ids;
mod ops;
mod password;
mod propagate;

pub use ops::OpsToggle;
pub use password::{PasswordState, PasswordValidator, MSG_EMPTY_PASSWORD, MSG_MISMATCH};
pub use propagate::FieldPropagator;

use log::{debug, info};

use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::host::ElementAccessor;

/// Navigation state. Owned by [`StepController`]; never read from ambient
/// globals.
///
/// Invariant: `1 <= current_step <= step_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardState {
    current_step: usize,
    step_count: usize,
}

impl WizardState {
    pub fn new(step_count: usize) -> Result<Self, WizardError> {
        if step_count == 0 {
            return Err(WizardError::InvalidConfig(
                "wizard needs at least one step".to_string(),
            ));
        }
        Ok(Self {
            current_step: 1,
            step_count,
        })
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_first(&self) -> bool {
        self.current_step == 1
    }

    pub fn is_last(&self) -> bool {
        self.current_step == self.step_count
    }
}

/// Owns the current step and every side effect of moving between steps:
/// marker classes, panel visibility, chevron controls, the next/submit swap
/// on the final step, and the step-entry propagation pass.
pub struct StepController {
    state: WizardState,
    propagator: FieldPropagator,
    per_step_error_scope: bool,
}

impl StepController {
    pub fn new(config: &WizardConfig) -> Result<Self, WizardError> {
        config.validate()?;
        Ok(Self {
            state: WizardState::new(config.step_count())?,
            propagator: FieldPropagator::new(config.propagation.clone()),
            per_step_error_scope: config.per_step_error_scope,
        })
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    /// Initial render: step 1 active, every other marker shadowed, only
    /// panel 1 visible, controls synced. No propagation pass runs here.
    pub fn begin(&mut self, dom: &mut impl ElementAccessor) -> Result<(), WizardError> {
        for step in 1..=self.state.step_count {
            if step == self.state.current_step {
                self.activate(dom, step)?;
            } else {
                self.deactivate(dom, step)?;
            }
        }
        self.sync_controls(dom)
    }

    /// Advances one step. A call on the last step is a silent no-op.
    pub fn next(&mut self, dom: &mut impl ElementAccessor) -> Result<(), WizardError> {
        if self.state.is_last() {
            debug!(
                "[STEP: {}] next ignored, already on the last step",
                self.state.current_step
            );
            return Ok(());
        }
        self.deactivate(dom, self.state.current_step)?;
        self.state.current_step += 1;
        self.enter(dom)
    }

    /// Retreats one step. A call on the first step is a silent no-op.
    pub fn prev(&mut self, dom: &mut impl ElementAccessor) -> Result<(), WizardError> {
        if self.state.is_first() {
            debug!("[STEP: 1] prev ignored, already on the first step");
            return Ok(());
        }
        self.deactivate(dom, self.state.current_step)?;
        self.state.current_step -= 1;
        self.enter(dom)
    }

    fn enter(&mut self, dom: &mut impl ElementAccessor) -> Result<(), WizardError> {
        let step = self.state.current_step;
        self.propagator.on_enter_step(step, dom)?;
        self.activate(dom, step)?;
        self.sync_controls(dom)?;
        info!("[STEP: {}] entered (of {})", step, self.state.step_count);
        Ok(())
    }

    /// Re-runs the propagation groups watching `field_id` for blur.
    pub fn on_field_blur(
        &mut self,
        field_id: &str,
        dom: &mut impl ElementAccessor,
    ) -> Result<(), WizardError> {
        self.propagator.on_field_blur(field_id, dom)
    }

    /// Marks every step activated: the confirmation state shown once the
    /// wizard's results have been saved.
    pub fn finish(&mut self, dom: &mut impl ElementAccessor) -> Result<(), WizardError> {
        for step in 1..=self.state.step_count {
            dom.set_class(&ids::marker_id(step), ids::ACTIVATED_CLASS)?;
        }
        info!("[STEP: {}] wizard finished", self.state.current_step);
        Ok(())
    }

    fn activate(&self, dom: &mut impl ElementAccessor, step: usize) -> Result<(), WizardError> {
        dom.set_class(&ids::marker_id(step), ids::ACTIVATED_CLASS)?;
        dom.set_visible(&ids::panel_id(step), true)
    }

    fn deactivate(&self, dom: &mut impl ElementAccessor, step: usize) -> Result<(), WizardError> {
        dom.set_class(&ids::marker_id(step), ids::SHADOWED_CLASS)?;
        dom.set_visible(&ids::panel_id(step), false)
    }

    fn sync_controls(&self, dom: &mut impl ElementAccessor) -> Result<(), WizardError> {
        dom.set_visible(ids::PREV_ID, !self.state.is_first())?;
        dom.set_visible(ids::NEXT_ID, !self.state.is_last())?;
        // Per-step deployments place a submit control inside each panel, so
        // panel visibility already governs it there.
        if !self.per_step_error_scope {
            dom.set_visible(ids::SUBMIT_ID, self.state.is_last())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{build_dom, MemoryDom};

    fn wizard() -> (StepController, MemoryDom) {
        let config = WizardConfig::default();
        let mut dom = build_dom(&config);
        let mut controller = StepController::new(&config).expect("controller");
        controller.begin(&mut dom).expect("begin");
        (controller, dom)
    }

    fn active_markers(dom: &MemoryDom, count: usize) -> Vec<usize> {
        (1..=count)
            .filter(|step| dom.class_of(&ids::marker_id(*step)).unwrap() == ids::ACTIVATED_CLASS)
            .collect()
    }

    #[test]
    fn begin_activates_exactly_the_first_step() {
        let (controller, dom) = wizard();

        assert_eq!(controller.current_step(), 1);
        assert_eq!(active_markers(&dom, 3), vec![1]);
        assert!(dom.is_visible("form1").unwrap());
        assert!(!dom.is_visible("form2").unwrap());
        assert!(!dom.is_visible("form3").unwrap());
        assert!(!dom.is_visible(ids::PREV_ID).unwrap());
        assert!(dom.is_visible(ids::NEXT_ID).unwrap());
        assert!(!dom.is_visible(ids::SUBMIT_ID).unwrap());
    }

    #[test]
    fn exactly_one_marker_is_active_after_every_transition() {
        let (mut controller, mut dom) = wizard();

        controller.next(&mut dom).unwrap();
        assert_eq!(active_markers(&dom, 3), vec![2]);

        controller.next(&mut dom).unwrap();
        assert_eq!(active_markers(&dom, 3), vec![3]);

        controller.prev(&mut dom).unwrap();
        assert_eq!(active_markers(&dom, 3), vec![2]);
    }

    #[test]
    fn next_then_prev_is_identity() {
        let (mut controller, mut dom) = wizard();
        controller.next(&mut dom).unwrap();
        let before = controller.state();

        controller.next(&mut dom).unwrap();
        controller.prev(&mut dom).unwrap();

        assert_eq!(controller.state(), before);
        assert_eq!(active_markers(&dom, 3), vec![2]);
    }

    #[test]
    fn next_on_last_step_is_a_no_op() {
        let (mut controller, mut dom) = wizard();
        controller.next(&mut dom).unwrap();
        controller.next(&mut dom).unwrap();
        assert_eq!(controller.current_step(), 3);

        controller.next(&mut dom).unwrap();

        assert_eq!(controller.current_step(), 3);
        assert_eq!(active_markers(&dom, 3), vec![3]);
        assert!(dom.is_visible("form3").unwrap());
    }

    #[test]
    fn prev_on_first_step_is_a_no_op() {
        let (mut controller, mut dom) = wizard();

        controller.prev(&mut dom).unwrap();

        assert_eq!(controller.current_step(), 1);
        assert_eq!(active_markers(&dom, 3), vec![1]);
        assert!(dom.is_visible("form1").unwrap());
    }

    #[test]
    fn chevrons_follow_the_current_step() {
        let (mut controller, mut dom) = wizard();

        controller.next(&mut dom).unwrap();
        assert!(dom.is_visible(ids::PREV_ID).unwrap());
        assert!(dom.is_visible(ids::NEXT_ID).unwrap());
        assert!(!dom.is_visible(ids::SUBMIT_ID).unwrap());

        controller.next(&mut dom).unwrap();
        assert!(dom.is_visible(ids::PREV_ID).unwrap());
        assert!(!dom.is_visible(ids::NEXT_ID).unwrap());
        assert!(dom.is_visible(ids::SUBMIT_ID).unwrap());

        controller.prev(&mut dom).unwrap();
        controller.prev(&mut dom).unwrap();
        assert!(!dom.is_visible(ids::PREV_ID).unwrap());
        assert!(dom.is_visible(ids::NEXT_ID).unwrap());
    }

    #[test]
    fn finish_activates_every_marker() {
        let (mut controller, mut dom) = wizard();
        controller.finish(&mut dom).unwrap();
        assert_eq!(active_markers(&dom, 3), vec![1, 2, 3]);
    }

    #[test]
    fn single_step_wizard_shows_submit_immediately() {
        let config = WizardConfig {
            steps: vec![crate::config::StepDef {
                title: "Only".to_string(),
                fields: Vec::new(),
            }],
            propagation: Vec::new(),
            password_pairs: Vec::new(),
            per_step_error_scope: false,
        };
        let mut dom = build_dom(&config);
        let mut controller = StepController::new(&config).unwrap();
        controller.begin(&mut dom).unwrap();

        assert!(!dom.is_visible(ids::PREV_ID).unwrap());
        assert!(!dom.is_visible(ids::NEXT_ID).unwrap());
        assert!(dom.is_visible(ids::SUBMIT_ID).unwrap());

        // Both directions are no-ops at the only step.
        controller.next(&mut dom).unwrap();
        controller.prev(&mut dom).unwrap();
        assert_eq!(controller.current_step(), 1);
    }

    #[test]
    fn missing_marker_surfaces_missing_element() {
        let config = WizardConfig::default();
        let mut dom = MemoryDom::new();
        let mut controller = StepController::new(&config).unwrap();
        assert!(matches!(
            controller.begin(&mut dom),
            Err(WizardError::MissingElement(_))
        ));
    }
}
