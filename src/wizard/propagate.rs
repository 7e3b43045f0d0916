// Copy-if-empty field propagation
//
// A group's pairs fill override fields from their defaults when the override
// is empty. Runs on every entry of the group's step, so a value the user
// cleared comes back on the next entry; a value the user typed is never
// overwritten.

use log::debug;

use crate::config::PropagationGroup;
use crate::error::WizardError;
use crate::host::ElementAccessor;

pub struct FieldPropagator {
    groups: Vec<PropagationGroup>,
}

impl FieldPropagator {
    pub fn new(groups: Vec<PropagationGroup>) -> Self {
        Self { groups }
    }

    /// Evaluates every group configured for `step`.
    pub fn on_enter_step(
        &self,
        step: usize,
        dom: &mut impl ElementAccessor,
    ) -> Result<(), WizardError> {
        for group in self.groups.iter().filter(|g| g.step == step) {
            apply_group(group, dom)?;
        }
        Ok(())
    }

    /// Evaluates every group whose blur source is `field_id`.
    pub fn on_field_blur(
        &self,
        field_id: &str,
        dom: &mut impl ElementAccessor,
    ) -> Result<(), WizardError> {
        for group in self
            .groups
            .iter()
            .filter(|g| g.blur_of.as_deref() == Some(field_id))
        {
            apply_group(group, dom)?;
        }
        Ok(())
    }
}

fn apply_group(group: &PropagationGroup, dom: &mut impl ElementAccessor) -> Result<(), WizardError> {
    for pair in &group.pairs {
        let current = dom.get(&pair.fill)?;
        if !current.is_empty() {
            continue;
        }
        // A source the host never registered reads as empty; a missing fill
        // field is still an integration error and propagates.
        let default = match dom.get(&pair.from) {
            Ok(v) => v,
            Err(WizardError::MissingElement(_)) => String::new(),
            Err(e) => return Err(e),
        };
        dom.set(&pair.fill, &default)?;
        debug!(
            "[STEP: {}] filled '{}' from '{}'",
            group.step, pair.fill, pair.from
        );
    }
    Ok(())
}
