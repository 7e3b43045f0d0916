// Advanced-options toggle
//
// All rows tagged "ops" inside the scope move together: one shared flag flips
// per invocation and every row is set to it, so rows can never drift apart
// even if the host mutated one of them individually.

use log::debug;

use crate::error::WizardError;
use crate::host::{ElementAccessor, ElementQuery, Translator};
use crate::wizard::ids;

pub struct OpsToggle {
    scope_id: String,
    toggler_id: String,
    shown: bool,
}

impl OpsToggle {
    /// Rows render visible, so the toggle starts in the shown state; the host
    /// collapses them once at startup by calling [`OpsToggle::toggle`].
    pub fn new(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            toggler_id: ids::TOGGLER_ID.to_string(),
            shown: true,
        }
    }

    pub fn with_toggler(mut self, toggler_id: impl Into<String>) -> Self {
        self.toggler_id = toggler_id.into();
        self
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn toggle<D>(&mut self, dom: &mut D, translator: &impl Translator) -> Result<(), WizardError>
    where
        D: ElementAccessor + ElementQuery,
    {
        let rows = dom.find_by_tag(&self.scope_id, ids::OPS_TAG, Some("tr"))?;
        self.shown = !self.shown;
        for row in &rows {
            dom.set_visible(row, self.shown)?;
        }

        let label_key = if self.shown { "Less" } else { "More" };
        dom.set(
            &self.toggler_id,
            &format!("{}...", translator.tr(label_key)),
        )?;
        debug!(
            "ops rows in '{}' now {} ({} rows)",
            self.scope_id,
            if self.shown { "shown" } else { "hidden" },
            rows.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CatalogTranslator, ElementSpec, MemoryDom};

    fn ops_dom() -> MemoryDom {
        let mut dom = MemoryDom::new();
        dom.register(ElementSpec::new("form3", "div"));
        dom.register(ElementSpec::new("r1", "tr").scope("form3").class("ops"));
        dom.register(ElementSpec::new("r2", "tr").scope("form3").class("foo ops"));
        dom.register(ElementSpec::new("r3", "tr").scope("form3").class("opsx"));
        dom.register(
            ElementSpec::new(ids::TOGGLER_ID, "a")
                .scope("form3")
                .value("More..."),
        );
        dom
    }

    #[test]
    fn one_call_moves_all_tagged_rows_to_the_same_visibility() {
        let mut toggle = OpsToggle::new("form3");
        let mut dom = ops_dom();
        let tr = CatalogTranslator::new();

        // Rows start in mixed states to prove lockstep behavior.
        dom.set_visible("r2", false).unwrap();

        toggle.toggle(&mut dom, &tr).unwrap();

        assert!(!dom.is_visible("r1").unwrap());
        assert!(!dom.is_visible("r2").unwrap());
        assert_eq!(dom.get(ids::TOGGLER_ID).unwrap(), "More...");
    }

    #[test]
    fn two_calls_restore_visibility_and_label() {
        let mut toggle = OpsToggle::new("form3");
        let mut dom = ops_dom();
        let tr = CatalogTranslator::new();

        // Startup collapse, as the host performs it.
        toggle.toggle(&mut dom, &tr).unwrap();
        let visibility_before = dom.is_visible("r1").unwrap();
        let label_before = dom.get(ids::TOGGLER_ID).unwrap();

        toggle.toggle(&mut dom, &tr).unwrap();
        assert!(dom.is_visible("r1").unwrap());
        assert!(dom.is_visible("r2").unwrap());
        assert!(toggle.is_shown());
        assert_eq!(dom.get(ids::TOGGLER_ID).unwrap(), "Less...");

        toggle.toggle(&mut dom, &tr).unwrap();
        assert_eq!(dom.is_visible("r1").unwrap(), visibility_before);
        assert_eq!(dom.is_visible("r2").unwrap(), visibility_before);
        assert_eq!(dom.get(ids::TOGGLER_ID).unwrap(), label_before);
    }

    #[test]
    fn untagged_rows_are_untouched() {
        let mut toggle = OpsToggle::new("form3");
        let mut dom = ops_dom();
        let tr = CatalogTranslator::new();

        toggle.toggle(&mut dom, &tr).unwrap();

        // "opsx" must not be treated as "ops".
        assert!(dom.is_visible("r3").unwrap());
    }

    #[test]
    fn label_uses_the_translator() {
        let mut toggle = OpsToggle::new("form3");
        let mut dom = ops_dom();
        let tr =
            CatalogTranslator::from_toml_str(r#""More" = "Más""#).unwrap();

        toggle.toggle(&mut dom, &tr).unwrap();

        assert_eq!(dom.get(ids::TOGGLER_ID).unwrap(), "Más...");
    }

    #[test]
    fn missing_scope_is_an_error() {
        let mut toggle = OpsToggle::new("form9");
        let mut dom = ops_dom();
        let tr = CatalogTranslator::new();
        assert!(toggle.toggle(&mut dom, &tr).is_err());
    }
}
