//! Red flag detection for the anamnesis workflow.
//!
//! Pure and synchronous: every call works only on its arguments and the
//! read-only knowledge base, so detection can run from any number of
//! sessions at once.

pub mod detector;
pub mod display;
pub mod error;
pub mod knowledge;

pub use detector::{alert_id, detect_red_flags, group_alerts_by_severity, is_symptom_red_flag};
pub use display::{format_alerts_for_display, render_alert_summary};
pub use error::KnowledgeError;
pub use knowledge::{
    derive_rules, infer_severity, recommended_action, resolve_symptom_codes,
    RedFlagKnowledgeBase,
};
