// Input filters applied when a field is committed.

use anyhow::Result;
use regex::Regex;

/// Normalize a username: lowercase, then strip the markup-hostile characters
/// and spaces the account store rejects.
pub fn fix_username(raw: &str) -> Result<String> {
    let strip = Regex::new(r"[&<>$#]+")
        .map_err(|e| anyhow::anyhow!("Internal error: failed to compile username filter: {}", e))?;
    let lowered = raw.to_lowercase();
    Ok(strip.replace_all(&lowered, "").replace(' ', ""))
}

/// Validate a committed username: non-empty after filtering, at most 32
/// characters (the account store's column width).
pub fn validate_username(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow::anyhow!("Username is required"));
    }
    if name.chars().count() > 32 {
        return Err(anyhow::anyhow!("Username cannot exceed 32 characters"));
    }
    Ok(())
}
