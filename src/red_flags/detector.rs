//! Rule evaluation over the symptoms selected during anamnesis.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{
    Complaint, DetectionResult, MatchMode, RedFlagAlert, RedFlagRule, Severity, SeverityGroups,
};
use crate::text::normalize_text;

/// Namespace for alert ids: `alert.id = uuid_v5(ALERT_NAMESPACE, rule.id)`.
pub const ALERT_NAMESPACE: Uuid = Uuid::from_u128(0x5f0e_7c1a_9b3d_4e62_a8f1_2c4b_6d8e_0a17);

/// Stable alert id for a rule.
pub fn alert_id(rule_id: &str) -> Uuid {
    Uuid::new_v5(&ALERT_NAMESPACE, rule_id.as_bytes())
}

/// True if `symptom` on its own satisfies any rule: an any-of rule listing
/// it, or an all-of rule whose only required tag is it.
pub fn is_symptom_red_flag(symptom: &str, rules: &[RedFlagRule]) -> bool {
    let key = normalize_text(symptom);
    if key.is_empty() {
        return false;
    }
    let selected = HashSet::from([key]);
    rules.iter().any(|rule| rule_satisfied(rule, &selected))
}

/// Evaluate every applicable rule against the selected symptoms.
///
/// Duplicates in `selected_symptoms` collapse (first occurrence kept).
/// Alerts come back by descending severity; rules of equal severity keep
/// their declaration order. Unknown symptom codes simply match nothing.
pub fn detect_red_flags<S: AsRef<str>>(
    complaint: Option<&Complaint>,
    selected_symptoms: &[S],
    rules: &[RedFlagRule],
) -> DetectionResult {
    let selected = dedupe_symptoms(selected_symptoms);
    if selected.is_empty() {
        return DetectionResult::default();
    }
    let selected_keys: HashSet<String> = selected.iter().map(|(key, _)| key.clone()).collect();

    let mut alerts: Vec<RedFlagAlert> = rules
        .iter()
        .filter(|rule| rule.applies_to(complaint))
        .filter(|rule| rule_satisfied(rule, &selected_keys))
        .map(|rule| build_alert(rule, &selected))
        .collect();

    // Stable: equal severities keep rule order.
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));

    for alert in alerts.iter().filter(|a| a.severity == Severity::Critical) {
        tracing::warn!(
            rule_id = %alert.rule_id,
            triggered_by = ?alert.triggered_by,
            "Critical red flag detected"
        );
    }

    let result = DetectionResult::from_alerts(alerts);
    tracing::debug!(
        complaint = complaint.map(|c| c.code.as_str()),
        selected = selected.len(),
        alerts = result.alerts.len(),
        highest = ?result.highest_severity,
        "Red flag detection complete"
    );
    result
}

/// Bucket alerts by severity, preserving relative order inside each bucket.
pub fn group_alerts_by_severity(alerts: &[RedFlagAlert]) -> SeverityGroups {
    let mut groups = SeverityGroups::default();
    for alert in alerts {
        let bucket = match alert.severity {
            Severity::Critical => &mut groups.critical,
            Severity::Danger => &mut groups.danger,
            Severity::Warning => &mut groups.warning,
        };
        bucket.push(alert.clone());
    }
    groups
}

// ── Internals ───────────────────────────────────────────────

/// (normalized key, original text) in first-occurrence order.
fn dedupe_symptoms<S: AsRef<str>>(symptoms: &[S]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for symptom in symptoms {
        let key = normalize_text(symptom.as_ref());
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        out.push((key, symptom.as_ref().to_string()));
    }
    out
}

fn rule_satisfied(rule: &RedFlagRule, selected: &HashSet<String>) -> bool {
    let mut tags = rule
        .symptoms
        .iter()
        .map(|s| normalize_text(s))
        .filter(|s| !s.is_empty())
        .peekable();
    // A rule with no tags can never fire.
    if tags.peek().is_none() {
        return false;
    }
    match rule.mode {
        MatchMode::AllOf => tags.all(|t| selected.contains(&t)),
        MatchMode::AnyOf => tags.any(|t| selected.contains(&t)),
    }
}

fn build_alert(rule: &RedFlagRule, selected: &[(String, String)]) -> RedFlagAlert {
    let tags: HashSet<String> = rule.symptoms.iter().map(|s| normalize_text(s)).collect();
    let triggered_by = selected
        .iter()
        .filter(|(key, _)| tags.contains(key))
        .map(|(_, original)| original.clone())
        .collect();

    RedFlagAlert {
        id: alert_id(&rule.id),
        rule_id: rule.id.clone(),
        severity: rule.severity,
        message: rule.label.clone(),
        action: rule.action.clone(),
        triggered_by,
    }
}
