use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Severity;

/// A fired red-flag rule. Transient: built per detection call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlagAlert {
    /// UUIDv5 of the rule id; identical across calls for the same rule.
    pub id: Uuid,
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub action: String,
    /// Selected symptoms that satisfied the rule, in input order.
    pub triggered_by: Vec<String>,
}

/// Output of one detection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DetectionResult {
    /// Descending severity, then rule declaration order.
    pub alerts: Vec<RedFlagAlert>,
    /// `None` when no rule fired.
    pub highest_severity: Option<Severity>,
}

impl DetectionResult {
    pub fn from_alerts(alerts: Vec<RedFlagAlert>) -> Self {
        let highest_severity = alerts.iter().map(|a| a.severity).max();
        Self {
            alerts,
            highest_severity,
        }
    }

    pub fn has_red_flags(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Danger or critical: the clinician must act before continuing.
    pub fn requires_immediate_action(&self) -> bool {
        self.highest_severity
            .is_some_and(|s| s >= Severity::Danger)
    }
}

/// Alerts bucketed by severity. All three buckets always exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeverityGroups {
    pub critical: Vec<RedFlagAlert>,
    pub danger: Vec<RedFlagAlert>,
    pub warning: Vec<RedFlagAlert>,
}

impl SeverityGroups {
    pub fn get(&self, severity: Severity) -> &[RedFlagAlert] {
        match severity {
            Severity::Critical => &self.critical,
            Severity::Danger => &self.danger,
            Severity::Warning => &self.warning,
        }
    }

    pub fn len(&self) -> usize {
        self.critical.len() + self.danger.len() + self.warning.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate critical, danger, warning.
    pub fn into_ordered(self) -> Vec<RedFlagAlert> {
        let mut out = self.critical;
        out.extend(self.danger);
        out.extend(self.warning);
        out
    }
}

/// Display-ready projection of an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayAlert {
    pub alert_id: Uuid,
    pub severity: Severity,
    pub severity_label: String,
    pub message: String,
    pub action: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(severity: Severity) -> RedFlagAlert {
        RedFlagAlert {
            id: Uuid::nil(),
            rule_id: "R".into(),
            severity,
            message: "m".into(),
            action: "a".into(),
            triggered_by: vec![],
        }
    }

    #[test]
    fn empty_result_has_no_severity() {
        let result = DetectionResult::from_alerts(vec![]);
        assert_eq!(result.highest_severity, None);
        assert!(!result.has_red_flags());
        assert!(!result.requires_immediate_action());
    }

    #[test]
    fn highest_severity_is_max() {
        let result = DetectionResult::from_alerts(vec![
            alert(Severity::Warning),
            alert(Severity::Danger),
        ]);
        assert_eq!(result.highest_severity, Some(Severity::Danger));
        assert!(result.requires_immediate_action());
    }

    #[test]
    fn warning_only_is_not_immediate() {
        let result = DetectionResult::from_alerts(vec![alert(Severity::Warning)]);
        assert!(result.has_red_flags());
        assert!(!result.requires_immediate_action());
    }

    #[test]
    fn default_groups_have_all_buckets() {
        let groups = SeverityGroups::default();
        for severity in Severity::DESCENDING {
            assert!(groups.get(severity).is_empty());
        }
        assert!(groups.is_empty());
    }

    #[test]
    fn highest_severity_serializes_as_null_when_absent() {
        let json = serde_json::to_value(DetectionResult::default()).unwrap();
        assert!(json["highest_severity"].is_null());
    }
}
