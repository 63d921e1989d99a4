//! Projection of alerts into display records and the plain-text banner.

use crate::models::{DetectionResult, DisplayAlert, RedFlagAlert, Severity};

const HEADLINE_CRITICAL: &str = "🚨 ALERTA CRÍTICO - AÇÃO IMEDIATA NECESSÁRIA";
const HEADLINE_DANGER: &str = "⚠️ SINAIS DE ALARME DETECTADOS";
const HEADLINE_WARNING: &str = "ℹ️ Pontos de atenção identificados";

/// One display record per alert, same order. Pure projection.
pub fn format_alerts_for_display(alerts: &[RedFlagAlert]) -> Vec<DisplayAlert> {
    alerts
        .iter()
        .map(|alert| DisplayAlert {
            alert_id: alert.id,
            severity: alert.severity,
            severity_label: alert.severity.label().to_string(),
            message: alert.message.clone(),
            action: alert.action.clone(),
        })
        .collect()
}

/// Plain-text banner for the anamnesis note: headline by highest severity,
/// then one bullet per alert with its action. Empty when nothing fired.
pub fn render_alert_summary(result: &DetectionResult) -> String {
    let Some(highest) = result.highest_severity else {
        return String::new();
    };

    let headline = match highest {
        Severity::Critical => HEADLINE_CRITICAL,
        Severity::Danger => HEADLINE_DANGER,
        Severity::Warning => HEADLINE_WARNING,
    };

    let mut lines = vec![headline.to_string(), String::new()];
    for alert in &result.alerts {
        lines.push(format!("{} {}", alert.severity.marker(), alert.message));
        lines.push(format!("   → {}", alert.action));
    }
    lines.join("\n")
}
