use thiserror::Error;

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Reference data load failed ({0}): {1}")]
    ReferenceDataLoad(String, String),

    #[error("Reference data parse failed ({0}): {1}")]
    ReferenceDataParse(String, String),

    #[error("Duplicate red flag rule id: {0}")]
    DuplicateRuleId(String),

    #[error("Red flag rule {0} has no symptom tags")]
    EmptyRule(String),
}
