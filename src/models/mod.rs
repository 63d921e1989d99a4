pub mod alert;
pub mod complaint;
pub mod enums;
pub mod rule;

pub use alert::{DetectionResult, DisplayAlert, RedFlagAlert, SeverityGroups};
pub use complaint::Complaint;
pub use enums::{InvalidEnum, MatchKind, MatchMode, Severity};
pub use rule::{RedFlagRule, SymptomMapping};
