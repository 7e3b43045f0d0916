// Logging utilities
// Structured logging with JSON and human-readable formats

use log::Level;
use serde_json::json;

/// Mask a sensitive value (a password) before it reaches a log line.
pub fn mask_sensitive(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    "***".to_string()
}

/// Extract the `[STEP: n]` marker from a log message.
/// Returns the step (if present) and the message with the marker removed.
pub fn parse_log_metadata(message: &str) -> (Option<String>, String) {
    let mut step = None;
    let mut cleaned_message = message.to_string();

    if let Some(start) = message.find("[STEP:") {
        if let Some(end) = message[start..].find(']') {
            let step_str = message[start + 6..start + end].trim();
            step = Some(step_str.to_string());
            cleaned_message = format!("{} {}", &message[..start], &message[start + end + 1..])
                .trim()
                .to_string();
        }
    }

    (step, cleaned_message)
}

/// Format log entry as JSON for structured parsing.
pub fn format_json_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    step: Option<&str>,
) -> String {
    let mut log_entry = json!({
        "timestamp": timestamp,
        "level": level.as_str(),
        "target": target,
        "message": message,
    });

    if let Some(step) = step {
        log_entry["step"] = json!(step);
    }

    serde_json::to_string(&log_entry).unwrap_or_else(|_| "{}".to_string())
}

/// Format log entry as human-readable text.
pub fn format_human_readable_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    step: Option<&str>,
) -> String {
    let mut log_line = format!("[{}] [{}]", timestamp, level.as_str());

    if let Some(step) = step {
        log_line.push_str(&format!(" [STEP: {}]", step));
    }

    log_line.push_str(&format!(" [{}] {}", target, message));
    log_line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_sensitive_never_leaks_the_value() {
        let masked = mask_sensitive("hunter2hunter2");
        assert!(!masked.contains("hunter2"), "password leaked: {}", masked);
        assert_eq!(masked, "***");
    }

    #[test]
    fn mask_sensitive_handles_empty() {
        assert_eq!(mask_sensitive(""), "");
    }

    #[test]
    fn parses_step_marker_out_of_the_message() {
        let (step, cleaned) = parse_log_metadata("[STEP: 2] entered (of 3)");
        assert_eq!(step.as_deref(), Some("2"));
        assert_eq!(cleaned, "entered (of 3)");
    }

    #[test]
    fn message_without_marker_is_unchanged() {
        let (step, cleaned) = parse_log_metadata("plain message");
        assert!(step.is_none());
        assert_eq!(cleaned, "plain message");
    }

    #[test]
    fn json_log_carries_the_step_field() {
        let line = format_json_log("2026-01-01T00:00:00Z", Level::Info, "wizard", "entered", Some("2"));
        let parsed: serde_json::Value = serde_json::from_str(&line).expect("valid json");
        assert_eq!(parsed["step"], "2");
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["message"], "entered");
    }

    #[test]
    fn human_readable_log_reinserts_the_marker() {
        let line =
            format_human_readable_log("12:00:00", Level::Debug, "wizard", "entered", Some("3"));
        assert_eq!(line, "[12:00:00] [DEBUG] [STEP: 3] [wizard] entered");
    }
}
