use serde::{Deserialize, Serialize};

/// A chief complaint from the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    /// Unique catalog code, e.g. "dor_toracica".
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub symptom_tags: Vec<String>,
    #[serde(default)]
    pub syndrome: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Authored red-flag sentences (Portuguese), compiled into rules by
    /// [`crate::red_flags::knowledge::derive_rules`].
    #[serde(default)]
    pub red_flags: Vec<String>,
}

impl Complaint {
    /// Bare complaint with no tags, synonyms or red flags.
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            symptom_tags: Vec::new(),
            syndrome: None,
            group: None,
            synonyms: Vec::new(),
            red_flags: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default_when_missing() {
        let json = r#"{ "code": "febre", "label": "Febre" }"#;
        let complaint: Complaint = serde_json::from_str(json).unwrap();
        assert_eq!(complaint, Complaint::new("febre", "Febre"));
    }
}
