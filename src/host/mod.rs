// Host capability traits
//
// The wizard core never touches a real UI toolkit. The host environment (the
// terminal front-end in this crate, a test harness, or any other embedding)
// supplies these three capabilities and the core composes entirely through
// them.

mod memory;
mod translator;

pub use memory::{ElementSpec, MemoryDom};
pub use translator::CatalogTranslator;

use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::wizard::ids;

/// Read/write access to named elements: field values, visibility, the visual
/// class of step markers, and the disabled flag of controls.
///
/// Every method fails fast with [`WizardError::MissingElement`] for an id the
/// host never registered.
pub trait ElementAccessor {
    fn get(&self, id: &str) -> Result<String, WizardError>;
    fn set(&mut self, id: &str, value: &str) -> Result<(), WizardError>;
    fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), WizardError>;
    fn set_class(&mut self, id: &str, class_name: &str) -> Result<(), WizardError>;
    fn set_disabled(&mut self, id: &str, disabled: bool) -> Result<(), WizardError>;
}

/// Scoped element lookup by class-like tag.
pub trait ElementQuery {
    /// Returns the ids of all elements inside `scope_id` whose space-delimited
    /// class list contains exactly `tag`, optionally restricted to elements of
    /// a given tag name, in registration order.
    ///
    /// Matching is substring-delimited: the class list is padded with spaces on
    /// both sides and searched for `" tag "`, so `ops` never matches `opsx`.
    fn find_by_tag(
        &self,
        scope_id: &str,
        tag: &str,
        tag_name: Option<&str>,
    ) -> Result<Vec<String>, WizardError>;
}

/// Localized string lookup.
pub trait Translator {
    fn tr(&self, key: &str) -> String;
}

/// Builds the standard element tree a host derives from a wizard
/// configuration.
///
/// One element per form row: the row's value slot is its input, its tag name
/// is `tr` so the advanced-options query can address it, and its class list
/// carries the `ops` tag for collapsible rows. Step markers are `label`s,
/// panels `div`s, navigation controls `a`s.
pub fn build_dom(config: &WizardConfig) -> MemoryDom {
    let mut dom = MemoryDom::new();
    let count = config.step_count();

    for (index, step) in config.steps.iter().enumerate() {
        let step_no = index + 1;
        let first = step_no == 1;

        let marker_class = if first {
            ids::ACTIVATED_CLASS
        } else {
            ids::SHADOWED_CLASS
        };
        dom.register(ElementSpec::new(ids::marker_id(step_no), "label").class(marker_class));

        let panel = ElementSpec::new(ids::panel_id(step_no), "div");
        dom.register(if first { panel } else { panel.hidden() });

        for field in &step.fields {
            let mut spec = ElementSpec::new(&field.id, "tr").scope(ids::panel_id(step_no));
            if field.ops {
                spec = spec.class(ids::OPS_TAG);
            }
            dom.register(spec);
        }

        if config.per_step_error_scope {
            dom.register(
                ElementSpec::new(ids::notice_id_for(true, step_no), "div")
                    .scope(ids::panel_id(step_no))
                    .hidden(),
            );
            dom.register(
                ElementSpec::new(ids::notice_text_id_for(true, step_no), "label")
                    .scope(ids::panel_id(step_no)),
            );
            // Starts disabled only where a password pair gates it; a step
            // without one would otherwise have no way to enable its submit.
            let submit =
                ElementSpec::new(ids::submit_id_for(true, step_no), "input").scope(ids::panel_id(step_no));
            dom.register(if step_has_password_pair(config, step_no) {
                submit.disabled()
            } else {
                submit
            });
        }
    }

    dom.register(ElementSpec::new(ids::PREV_ID, "a").hidden());
    dom.register(ElementSpec::new(ids::NEXT_ID, "a"));

    if !config.per_step_error_scope {
        dom.register(ElementSpec::new(ids::NOTICE_ID, "div").hidden());
        dom.register(ElementSpec::new(ids::NOTICE_TEXT_ID, "label"));
        let mut submit = ElementSpec::new(ids::SUBMIT_ID, "input");
        if !config.password_pairs.is_empty() {
            submit = submit.disabled();
        }
        dom.register(if count > 1 { submit.hidden() } else { submit });
    }

    if let Some(scope) = ops_scope(config) {
        dom.register(
            ElementSpec::new(ids::TOGGLER_ID, "a")
                .scope(scope)
                .value("More..."),
        );
    }

    dom
}

fn step_has_password_pair(config: &WizardConfig, step_no: usize) -> bool {
    let Some(step) = config.steps.get(step_no - 1) else {
        return false;
    };
    config.password_pairs.iter().any(|pair| {
        step.fields
            .iter()
            .any(|f| f.id == pair.primary || f.id == pair.confirm)
    })
}

/// Panel id of the last step that carries advanced-options rows, if any.
/// That panel gets the toggle control.
pub fn ops_scope(config: &WizardConfig) -> Option<String> {
    config
        .steps
        .iter()
        .enumerate()
        .rev()
        .find(|(_, step)| step.fields.iter().any(|f| f.ops))
        .map(|(index, _)| ids::panel_id(index + 1))
}
