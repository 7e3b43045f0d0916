// Element id scheme shared between the core and its hosts.

/// Visual class of the current step's marker.
pub const ACTIVATED_CLASS: &str = "activated";
/// Visual class of every other step marker.
pub const SHADOWED_CLASS: &str = "shadowed";

pub const PREV_ID: &str = "Prev";
pub const NEXT_ID: &str = "Next";
pub const SUBMIT_ID: &str = "submit";
pub const NOTICE_ID: &str = "notice";
pub const NOTICE_TEXT_ID: &str = "noticeText";
pub const TOGGLER_ID: &str = "toggler";

/// Class tag carried by collapsible advanced-options rows.
pub const OPS_TAG: &str = "ops";

pub fn marker_id(step: usize) -> String {
    format!("Step{step}")
}

pub fn panel_id(step: usize) -> String {
    format!("form{step}")
}

// Error-notice targets: one shared triple, or step-qualified ids when the
// deployment scopes notices per step.

pub fn notice_id_for(per_step: bool, step: usize) -> String {
    if per_step {
        format!("{NOTICE_ID}{step}")
    } else {
        NOTICE_ID.to_string()
    }
}

pub fn notice_text_id_for(per_step: bool, step: usize) -> String {
    if per_step {
        format!("{NOTICE_TEXT_ID}{step}")
    } else {
        NOTICE_TEXT_ID.to_string()
    }
}

pub fn submit_id_for(per_step: bool, step: usize) -> String {
    if per_step {
        format!("{SUBMIT_ID}{step}")
    } else {
        SUBMIT_ID.to_string()
    }
}
