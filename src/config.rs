// Wizard configuration
//
// Declares the step layout, the copy-if-empty propagation groups, the password
// pairs, and the error-notice scoping strategy. Loaded from TOML; the default
// value is the built-in three-step enrollment flow.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::error::WizardError;

#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    pub steps: Vec<StepDef>,
    #[serde(default)]
    pub propagation: Vec<PropagationGroup>,
    #[serde(default)]
    pub password_pairs: Vec<PasswordPair>,
    /// false -> one shared notice/submit triple for the whole wizard,
    /// true -> step-qualified ids (notice2, noticeText2, submit2, ...).
    #[serde(default)]
    pub per_step_error_scope: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepDef {
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub id: String,
    pub label: String,
    /// Password-style input: the host echoes '*' instead of the value.
    #[serde(default)]
    pub masked: bool,
    /// Row belongs to the collapsible advanced-options group.
    #[serde(default)]
    pub ops: bool,
}

/// One copy-if-empty group: evaluated whenever `step` is entered, and
/// additionally whenever the `blur_of` field (if any) loses focus.
#[derive(Debug, Clone, Deserialize)]
pub struct PropagationGroup {
    /// 1-based step index.
    pub step: usize,
    pub pairs: Vec<FieldPair>,
    #[serde(default)]
    pub blur_of: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldPair {
    /// Field that receives a value when it is currently empty.
    pub fill: String,
    /// Field the value is taken from. May legitimately be absent from the
    /// host markup, in which case it reads as the empty string.
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordPair {
    pub primary: String,
    pub confirm: String,
}

impl WizardConfig {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read wizard config '{}'", path.display()))?;
        let cfg: WizardConfig = toml::from_str(&raw)
            .with_context(|| format!("failed to parse wizard config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Structural validation: the runtime fails fast on a config that
    /// references steps or fields that do not exist.
    pub fn validate(&self) -> Result<(), WizardError> {
        if self.steps.is_empty() {
            return Err(WizardError::InvalidConfig(
                "wizard needs at least one step".to_string(),
            ));
        }

        let mut field_ids = Vec::new();
        for step in &self.steps {
            for field in &step.fields {
                if field.id.trim().is_empty() {
                    return Err(WizardError::InvalidConfig(format!(
                        "step '{}' has a field with an empty id",
                        step.title
                    )));
                }
                if field_ids.contains(&field.id) {
                    return Err(WizardError::InvalidConfig(format!(
                        "duplicate field id '{}'",
                        field.id
                    )));
                }
                field_ids.push(field.id.clone());
            }
        }

        let count = self.step_count();
        for group in &self.propagation {
            if group.step < 1 || group.step > count {
                return Err(WizardError::InvalidConfig(format!(
                    "propagation group references step {} but the wizard has {} steps",
                    group.step, count
                )));
            }
            for pair in &group.pairs {
                if !field_ids.iter().any(|id| id == &pair.fill) {
                    return Err(WizardError::InvalidConfig(format!(
                        "propagation fill field '{}' is not defined in any step",
                        pair.fill
                    )));
                }
            }
            if let Some(blur) = &group.blur_of {
                if !field_ids.iter().any(|id| id == blur) {
                    return Err(WizardError::InvalidConfig(format!(
                        "propagation blur source '{}' is not defined in any step",
                        blur
                    )));
                }
            }
        }

        for pair in &self.password_pairs {
            if pair.primary == pair.confirm {
                return Err(WizardError::InvalidConfig(format!(
                    "password pair '{}' confirms against itself",
                    pair.primary
                )));
            }
            for id in [&pair.primary, &pair.confirm] {
                if !field_ids.iter().any(|f| f == id) {
                    return Err(WizardError::InvalidConfig(format!(
                        "password pair field '{}' is not defined in any step",
                        id
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for WizardConfig {
    /// Built-in three-step enrollment flow: first user + mailer, certificate
    /// authority, server certificate.
    fn default() -> Self {
        let subject_fields = [
            ("StreetAddress", "Street"),
            ("PostalCode", "Postal Code"),
            ("Locality", "Locality"),
            ("Province", "Province"),
            ("OrganizationalUnit", "Org. Unit"),
            ("Organization", "Organization"),
            ("Country", "Country"),
        ];

        let cert_fields = |prefix: &str, name_label: &str| -> Vec<FieldDef> {
            let mut fields = vec![field(format!("{prefix}.CommonName"), name_label)];
            for (suffix, label) in subject_fields {
                fields.push(ops_field(format!("{prefix}.{suffix}"), label));
            }
            fields.push(ops_field(format!("{prefix}.Duration"), "Duration in Days"));
            fields
        };

        let steps = vec![
            StepDef {
                title: "First User & Mailer Configuration".to_string(),
                fields: vec![
                    field("Username", "Username"),
                    field("Fullname", "Fullname"),
                    masked_field("Password", "Password"),
                    masked_field("Password2", "Repeat Password"),
                    field("Email", "Email"),
                    field("M.User", "Notification Email"),
                    field("M.Server", "Email Server"),
                    field("M.Port", "Email Port"),
                    masked_field("M.Password", "Email Password"),
                    masked_field("M.Password2", "Repeat Password"),
                ],
            },
            StepDef {
                title: "Certificate Authority".to_string(),
                fields: cert_fields("CA", "CA Name"),
            },
            StepDef {
                title: "Server Certificate".to_string(),
                fields: cert_fields("Cert", "Certificate Name"),
            },
        ];

        let subject_pairs = subject_fields
            .iter()
            .map(|(suffix, _)| FieldPair {
                fill: format!("Cert.{suffix}"),
                from: format!("CA.{suffix}"),
            })
            .collect();

        WizardConfig {
            steps,
            propagation: vec![
                PropagationGroup {
                    step: 1,
                    pairs: vec![FieldPair {
                        fill: "M.User".to_string(),
                        from: "Email".to_string(),
                    }],
                    blur_of: Some("Email".to_string()),
                },
                PropagationGroup {
                    step: 3,
                    pairs: subject_pairs,
                    blur_of: None,
                },
            ],
            password_pairs: vec![
                PasswordPair {
                    primary: "Password".to_string(),
                    confirm: "Password2".to_string(),
                },
                PasswordPair {
                    primary: "M.Password".to_string(),
                    confirm: "M.Password2".to_string(),
                },
            ],
            per_step_error_scope: false,
        }
    }
}

fn field(id: impl Into<String>, label: impl Into<String>) -> FieldDef {
    FieldDef {
        id: id.into(),
        label: label.into(),
        masked: false,
        ops: false,
    }
}

fn masked_field(id: impl Into<String>, label: impl Into<String>) -> FieldDef {
    FieldDef {
        masked: true,
        ..field(id, label)
    }
}

fn ops_field(id: impl Into<String>, label: impl Into<String>) -> FieldDef {
    FieldDef {
        ops: true,
        ..field(id, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_validates() {
        let cfg = WizardConfig::default();
        cfg.validate().expect("default config must be valid");
        assert_eq!(cfg.step_count(), 3);
        assert_eq!(cfg.password_pairs.len(), 2);
    }

    #[test]
    fn default_config_propagates_subject_fields_at_last_step() {
        let cfg = WizardConfig::default();
        let group = cfg
            .propagation
            .iter()
            .find(|g| g.step == 3)
            .expect("subject propagation group");
        assert_eq!(group.pairs.len(), 7);
        assert!(group
            .pairs
            .iter()
            .any(|p| p.fill == "Cert.Country" && p.from == "CA.Country"));
    }

    #[test]
    fn empty_step_list_is_rejected() {
        let cfg = WizardConfig {
            steps: Vec::new(),
            propagation: Vec::new(),
            password_pairs: Vec::new(),
            per_step_error_scope: false,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_propagation_step_is_rejected() {
        let mut cfg = WizardConfig::default();
        cfg.propagation[0].step = 9;
        let err = cfg.validate().unwrap_err();
        assert!(
            err.to_string().contains("step 9"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn unknown_fill_field_is_rejected() {
        let mut cfg = WizardConfig::default();
        cfg.propagation[0].pairs[0].fill = "NoSuchField".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn duplicate_field_id_is_rejected() {
        let mut cfg = WizardConfig::default();
        let dup = cfg.steps[0].fields[0].clone();
        cfg.steps[1].fields.push(dup);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn self_confirming_password_pair_is_rejected() {
        let mut cfg = WizardConfig::default();
        cfg.password_pairs[0].confirm = cfg.password_pairs[0].primary.clone();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn loads_from_toml_file() {
        let raw = r#"
per_step_error_scope = true

[[steps]]
title = "Account"
fields = [
    { id = "User", label = "Username" },
    { id = "Pw", label = "Password", masked = true },
    { id = "Pw2", label = "Repeat Password", masked = true },
]

[[steps]]
title = "Details"
fields = [
    { id = "Contact", label = "Contact" },
]

[[propagation]]
step = 2
pairs = [{ fill = "Contact", from = "User" }]

[[password_pairs]]
primary = "Pw"
confirm = "Pw2"
"#;
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(raw.as_bytes()).expect("write config");

        let cfg = WizardConfig::load(file.path()).expect("load config");
        assert_eq!(cfg.step_count(), 2);
        assert!(cfg.per_step_error_scope);
        assert_eq!(cfg.propagation[0].pairs[0].fill, "Contact");
        assert!(cfg.steps[0].fields[1].masked);
    }

    #[test]
    fn load_rejects_invalid_references() {
        let raw = r#"
[[steps]]
title = "Only"
fields = [{ id = "A", label = "A" }]

[[propagation]]
step = 2
pairs = [{ fill = "A", from = "B" }]
"#;
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(raw.as_bytes()).expect("write config");
        assert!(WizardConfig::load(file.path()).is_err());
    }
}
