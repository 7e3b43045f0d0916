// Twin-field password validation
//
// Each configured pair is a two-state machine: Clean until the edited field is
// empty or the twins diverge, Error until they agree again. Error state parks
// a message in the notice element and disables the submit control; Clean
// reverses both.

use std::collections::HashMap;

use log::debug;

use crate::config::PasswordPair;
use crate::error::WizardError;
use crate::host::{ElementAccessor, Translator};
use crate::wizard::ids;

pub const MSG_EMPTY_PASSWORD: &str = "Type some password!";
pub const MSG_MISMATCH: &str = "Passwords don't match!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordState {
    Clean,
    Error,
}

pub struct PasswordValidator {
    pairs: Vec<PasswordPair>,
    per_step_error_scope: bool,
    // Keyed by the pair's primary id.
    states: HashMap<String, PasswordState>,
}

impl PasswordValidator {
    pub fn new(pairs: Vec<PasswordPair>, per_step_error_scope: bool) -> Self {
        Self {
            pairs,
            per_step_error_scope,
            states: HashMap::new(),
        }
    }

    /// Current state of the pair whose primary field is `primary_id`.
    pub fn state_of(&self, primary_id: &str) -> PasswordState {
        self.states
            .get(primary_id)
            .copied()
            .unwrap_or(PasswordState::Clean)
    }

    /// True if `field_id` is either side of a configured pair.
    pub fn watches(&self, field_id: &str) -> bool {
        self.pair_of(field_id).is_some()
    }

    /// Revalidates the pair containing `field_id` after an input event on it.
    /// Either side of the pair triggers revalidation. Input on a field outside
    /// every pair is a no-op.
    ///
    /// `step` selects the notice/submit targets when the deployment scopes
    /// errors per step; it is ignored otherwise.
    pub fn on_password_input(
        &mut self,
        field_id: &str,
        step: usize,
        dom: &mut impl ElementAccessor,
        translator: &impl Translator,
    ) -> Result<PasswordState, WizardError> {
        let Some(pair) = self.pair_of(field_id).cloned() else {
            return Ok(PasswordState::Clean);
        };

        let edited = dom.get(field_id)?;
        if edited.is_empty() {
            return self.fail(&pair, step, MSG_EMPTY_PASSWORD, dom, translator);
        }

        let twin_id = if field_id == pair.primary {
            &pair.confirm
        } else {
            &pair.primary
        };
        if dom.get(twin_id)? != edited {
            return self.fail(&pair, step, MSG_MISMATCH, dom, translator);
        }

        dom.set_visible(&ids::notice_id_for(self.per_step_error_scope, step), false)?;
        dom.set_disabled(&ids::submit_id_for(self.per_step_error_scope, step), false)?;
        self.states
            .insert(pair.primary.clone(), PasswordState::Clean);
        Ok(PasswordState::Clean)
    }

    fn fail(
        &mut self,
        pair: &PasswordPair,
        step: usize,
        message_key: &str,
        dom: &mut impl ElementAccessor,
        translator: &impl Translator,
    ) -> Result<PasswordState, WizardError> {
        let per_step = self.per_step_error_scope;
        dom.set(
            &ids::notice_text_id_for(per_step, step),
            &translator.tr(message_key),
        )?;
        dom.set_visible(&ids::notice_id_for(per_step, step), true)?;
        dom.set_disabled(&ids::submit_id_for(per_step, step), true)?;
        self.states
            .insert(pair.primary.clone(), PasswordState::Error);
        debug!("[STEP: {}] password pair '{}' invalid", step, pair.primary);
        Ok(PasswordState::Error)
    }

    fn pair_of(&self, field_id: &str) -> Option<&PasswordPair> {
        self.pairs
            .iter()
            .find(|p| p.primary == field_id || p.confirm == field_id)
    }
}
