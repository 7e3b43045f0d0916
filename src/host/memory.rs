// In-memory element store (runtime-only, not persisted)
//
// Backs both the terminal front-end and the unit tests: the wizard core reads
// and writes elements through the capability traits, the host reads the same
// records back when it renders a frame.

use std::collections::HashMap;

use crate::error::WizardError;
use crate::host::{ElementAccessor, ElementQuery};

/// Registration record for one element.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub id: String,
    /// Markup tag name, e.g. "tr", "input", "label".
    pub tag_name: String,
    /// Id of the containing element, if any. `find_by_tag` only searches
    /// direct members of a scope.
    pub scope: Option<String>,
    /// Space-delimited class list, also used as the tag list for queries.
    pub class: String,
    pub value: String,
    pub visible: bool,
    pub disabled: bool,
}

impl ElementSpec {
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            scope: None,
            class: String::new(),
            value: String::new(),
            visible: true,
            disabled: false,
        }
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    scope: Option<String>,
    class: String,
    value: String,
    visible: bool,
    disabled: bool,
}

/// Element table keyed by id, preserving registration order for queries.
#[derive(Debug, Default)]
pub struct MemoryDom {
    elements: HashMap<String, Element>,
    order: Vec<String>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an element. Re-registering an existing id replaces its record
    /// but keeps its original position in query order.
    pub fn register(&mut self, spec: ElementSpec) {
        let ElementSpec {
            id,
            tag_name,
            scope,
            class,
            value,
            visible,
            disabled,
        } = spec;
        let element = Element {
            tag_name,
            scope,
            class,
            value,
            visible,
            disabled,
        };
        if self.elements.insert(id.clone(), element).is_none() {
            self.order.push(id);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    // Host-side read accessors, used for rendering and assertions. These are
    // not part of the core's capability surface.

    pub fn is_visible(&self, id: &str) -> Result<bool, WizardError> {
        self.element(id).map(|e| e.visible)
    }

    pub fn class_of(&self, id: &str) -> Result<String, WizardError> {
        self.element(id).map(|e| e.class.clone())
    }

    pub fn is_disabled(&self, id: &str) -> Result<bool, WizardError> {
        self.element(id).map(|e| e.disabled)
    }

    fn element(&self, id: &str) -> Result<&Element, WizardError> {
        self.elements
            .get(id)
            .ok_or_else(|| WizardError::MissingElement(id.to_string()))
    }

    fn element_mut(&mut self, id: &str) -> Result<&mut Element, WizardError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| WizardError::MissingElement(id.to_string()))
    }
}

impl ElementAccessor for MemoryDom {
    fn get(&self, id: &str) -> Result<String, WizardError> {
        self.element(id).map(|e| e.value.clone())
    }

    fn set(&mut self, id: &str, value: &str) -> Result<(), WizardError> {
        self.element_mut(id)?.value = value.to_string();
        Ok(())
    }

    fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), WizardError> {
        self.element_mut(id)?.visible = visible;
        Ok(())
    }

    fn set_class(&mut self, id: &str, class_name: &str) -> Result<(), WizardError> {
        self.element_mut(id)?.class = class_name.to_string();
        Ok(())
    }

    fn set_disabled(&mut self, id: &str, disabled: bool) -> Result<(), WizardError> {
        self.element_mut(id)?.disabled = disabled;
        Ok(())
    }
}

impl ElementQuery for MemoryDom {
    fn find_by_tag(
        &self,
        scope_id: &str,
        tag: &str,
        tag_name: Option<&str>,
    ) -> Result<Vec<String>, WizardError> {
        if !self.contains(scope_id) {
            return Err(WizardError::MissingElement(scope_id.to_string()));
        }

        let needle = format!(" {} ", tag);
        let mut out = Vec::new();
        for id in &self.order {
            let e = &self.elements[id];
            if e.scope.as_deref() != Some(scope_id) {
                continue;
            }
            if let Some(t) = tag_name {
                if e.tag_name != t {
                    continue;
                }
            }
            let padded = format!(" {} ", e.class);
            if padded.contains(&needle) {
                out.push(id.clone());
            }
        }
        Ok(out)
    }
}
