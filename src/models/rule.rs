use serde::{Deserialize, Serialize};

use super::complaint::Complaint;
use super::enums::{MatchMode, Severity};

/// An authored red-flag rule: symptom tags → severity + recommended action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlagRule {
    /// Stable identifier. Alert ids are derived from it.
    pub id: String,
    /// Message shown when the rule fires.
    pub label: String,
    pub symptoms: Vec<String>,
    pub mode: MatchMode,
    pub severity: Severity,
    pub action: String,
    /// Complaint codes this rule is restricted to. Empty = every complaint.
    #[serde(default)]
    pub complaints: Vec<String>,
}

impl RedFlagRule {
    /// Whether the rule is evaluated for this complaint context.
    /// Without a complaint only unscoped rules apply.
    pub fn applies_to(&self, complaint: Option<&Complaint>) -> bool {
        if self.complaints.is_empty() {
            return true;
        }
        complaint.is_some_and(|c| self.complaints.iter().any(|code| *code == c.code))
    }
}

/// Free-text vocabulary of one symptom code, used to compile authored
/// red-flag sentences into rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomMapping {
    pub code: String,
    /// Lay phrases a clinician or patient may use for the symptom.
    pub keywords: Vec<String>,
    /// Red-flag sentences this symptom is evidence for.
    pub associated_red_flags: Vec<String>,
}
