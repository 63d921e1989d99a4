//! Red-flag knowledge base: authored rules, symptom vocabulary, and the
//! compiler that turns a complaint's free-text red flags into rules.
//!
//! Severity and recommended action of a free-text red flag are inferred from
//! keyword tables (emergency-medicine terminology, Portuguese). All tables are
//! stored already normalized (lower-case, no diacritics).

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;

use super::detector::{detect_red_flags, is_symptom_red_flag};
use super::error::KnowledgeError;
use crate::config::{RED_FLAG_RULES_FILE, SYMPTOM_MAPPINGS_FILE};
use crate::models::{
    Complaint, DetectionResult, MatchMode, RedFlagRule, Severity, SymptomMapping,
};
use crate::text::normalize_text;

// ── Severity keywords ───────────────────────────────────────

static CRITICAL_TERMS: &[&str] = &[
    "parada",
    "pcr",
    "choque",
    "coma",
    "anuria",
    "apneia",
    "glasgow < 8",
    "hipotensao refrataria",
    "hemorragia macica",
    "status epileptico",
    "herniacao",
];

static DANGER_TERMS: &[&str] = &[
    "spo2 < 90",
    "alteracao consciencia",
    "hipotensao",
    "instabilidade",
    "sangramento",
    "deficit neurologico",
    "convulsao",
    "sincope",
    "cianose",
    "glasgow < 15",
    "lactato > 4",
    "febre + rigidez",
];

// ── Recommended actions ─────────────────────────────────────

/// First matching row wins.
static ACTION_TABLE: &[(&[&str], &str)] = &[
    (
        &["consciencia", "glasgow", "coma", "nao responde"],
        "Avaliar via aérea, considerar intubação. Chamar equipe de emergência.",
    ),
    (
        &["spo2", "cianose", "hipoxia", "dessaturacao"],
        "Ofertar O2 suplementar imediatamente (máscara com reservatório).",
    ),
    (
        &["hipotensao", "choque", "instabilidade hemodinamica"],
        "Acesso venoso calibroso, ressuscitação volêmica 30mL/kg.",
    ),
    (
        &["febre", "rigidez de nuca", "meningite"],
        "Hemoculturas + ATB empírico. Considerar punção lombar.",
    ),
    (
        &["convulsao", "crise", "status"],
        "Benzodiazepínico IV (Diazepam 10mg). Proteção de via aérea.",
    ),
    (
        &["sangue", "hemorragia", "hematemese", "melena"],
        "Reservar hemoderivados. Acesso calibroso. Considerar EDA urgente.",
    ),
    (
        &["dor toracica", "irradi", "supra"],
        "ECG em 10 min. Troponina. AAS se não contraindicado.",
    ),
    (
        &["avc", "deficit", "hemiparesia", "afasia"],
        "Glicemia capilar. TC de crânio urgente. Avaliar janela trombolítica.",
    ),
    (
        &["trauma", "tce", "fratura"],
        "Imobilização. Avaliar ABCDE. Considerar TC se indicado.",
    ),
];

pub const DEFAULT_ACTION: &str = "Avaliação médica urgente. Monitorização contínua.";

/// Classify an authored red-flag sentence.
pub fn infer_severity(red_flag: &str) -> Severity {
    let text = normalize_text(red_flag);
    if CRITICAL_TERMS.iter().any(|t| text.contains(t)) {
        Severity::Critical
    } else if DANGER_TERMS.iter().any(|t| text.contains(t)) {
        Severity::Danger
    } else {
        Severity::Warning
    }
}

/// Recommended first action for an authored red-flag sentence.
pub fn recommended_action(red_flag: &str) -> &'static str {
    let text = normalize_text(red_flag);
    ACTION_TABLE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(_, action)| *action)
        .unwrap_or(DEFAULT_ACTION)
}

/// Symptom codes whose vocabulary matches a free-text symptom entry
/// ("desmaiou ontem" → `sincope`). Declaration order, no duplicates.
pub fn resolve_symptom_codes(text: &str, mappings: &[SymptomMapping]) -> Vec<String> {
    let entry = normalize_text(text);
    if entry.is_empty() {
        return Vec::new();
    }
    mappings
        .iter()
        .filter(|m| {
            m.keywords.iter().any(|kw| {
                let kw = normalize_text(kw);
                !kw.is_empty() && (entry.contains(&kw) || kw.contains(&entry))
            })
        })
        .map(|m| m.code.clone())
        .collect()
}

/// Compile a complaint's authored red flags into any-of rules.
///
/// Each red flag becomes one rule over the symptom codes whose associated
/// red flags overlap it. Red flags no mapping covers are skipped: nothing
/// selectable could ever trigger them.
pub fn derive_rules(complaint: &Complaint, mappings: &[SymptomMapping]) -> Vec<RedFlagRule> {
    let mut rules = Vec::new();
    for (idx, red_flag) in complaint.red_flags.iter().enumerate() {
        let text = normalize_text(red_flag);
        if text.is_empty() {
            continue;
        }

        let mut seen = HashSet::new();
        let symptoms: Vec<String> = mappings
            .iter()
            .filter(|m| {
                m.associated_red_flags.iter().any(|rf| {
                    let rf = normalize_text(rf);
                    !rf.is_empty() && (text.contains(&rf) || rf.contains(&text))
                })
            })
            .filter(|m| seen.insert(m.code.clone()))
            .map(|m| m.code.clone())
            .collect();

        if symptoms.is_empty() {
            tracing::debug!(
                complaint = %complaint.code,
                red_flag = %red_flag,
                "No symptom mapping covers red flag, skipping"
            );
            continue;
        }

        rules.push(RedFlagRule {
            id: format!("{}#{}", complaint.code, idx + 1),
            label: red_flag.clone(),
            symptoms,
            mode: MatchMode::AnyOf,
            severity: infer_severity(red_flag),
            action: recommended_action(red_flag).to_string(),
            complaints: vec![complaint.code.clone()],
        });
    }
    rules
}

// ── Knowledge base ──────────────────────────────────────────

/// Loaded red-flag reference data. Immutable once built; share by reference.
#[derive(Debug, Clone, Default)]
pub struct RedFlagKnowledgeBase {
    rules: Vec<RedFlagRule>,
    mappings: Vec<SymptomMapping>,
}

impl RedFlagKnowledgeBase {
    /// Load rules and symptom mappings from the reference data directory.
    pub fn load(resources_dir: &Path) -> Result<Self, KnowledgeError> {
        let rules: Vec<RedFlagRule> = read_json(resources_dir, RED_FLAG_RULES_FILE)?;
        let mappings: Vec<SymptomMapping> = read_json(resources_dir, SYMPTOM_MAPPINGS_FILE)?;
        let kb = Self::from_parts(rules, mappings)?;
        tracing::info!(
            rules = kb.rules.len(),
            mappings = kb.mappings.len(),
            dir = %resources_dir.display(),
            "Red flag knowledge base loaded"
        );
        Ok(kb)
    }

    /// Build from in-memory data. Rule ids must be unique and every rule
    /// needs at least one symptom tag.
    pub fn from_parts(
        rules: Vec<RedFlagRule>,
        mappings: Vec<SymptomMapping>,
    ) -> Result<Self, KnowledgeError> {
        validate_rules(&rules)?;
        Ok(Self { rules, mappings })
    }

    /// Append rules compiled from each complaint's authored red flags.
    /// Authored rules keep precedence in declaration order.
    pub fn with_complaint_rules(mut self, complaints: &[Complaint]) -> Result<Self, KnowledgeError> {
        let before = self.rules.len();
        for complaint in complaints {
            let derived = derive_rules(complaint, &self.mappings);
            self.rules.extend(derived);
        }
        validate_rules(&self.rules)?;
        tracing::debug!(derived = self.rules.len() - before, "Complaint red flags compiled");
        Ok(self)
    }

    pub fn rules(&self) -> &[RedFlagRule] {
        &self.rules
    }

    pub fn mappings(&self) -> &[SymptomMapping] {
        &self.mappings
    }

    /// [`detect_red_flags`] against this knowledge base.
    pub fn detect<S: AsRef<str>>(
        &self,
        complaint: Option<&Complaint>,
        selected_symptoms: &[S],
    ) -> DetectionResult {
        detect_red_flags(complaint, selected_symptoms, &self.rules)
    }

    /// Detection with free-text symptom entries ("desmaiou no banho").
    ///
    /// Each entry is resolved through the symptom vocabulary and the codes
    /// are appended after `selected_symptoms` before rules are evaluated.
    /// Entries that resolve to nothing are ignored.
    pub fn detect_with_free_text<S: AsRef<str>, T: AsRef<str>>(
        &self,
        complaint: Option<&Complaint>,
        selected_symptoms: &[S],
        free_text: &[T],
    ) -> DetectionResult {
        let mut symptoms: Vec<String> = selected_symptoms
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        for entry in free_text {
            let codes = resolve_symptom_codes(entry.as_ref(), &self.mappings);
            tracing::debug!(resolved = codes.len(), "Free-text symptom entry");
            symptoms.extend(codes);
        }
        detect_red_flags(complaint, &symptoms, &self.rules)
    }

    /// [`is_symptom_red_flag`] against this knowledge base.
    pub fn is_red_flag(&self, symptom: &str) -> bool {
        is_symptom_red_flag(symptom, &self.rules)
    }

    /// Create a knowledge base for tests (no file I/O).
    pub fn load_test() -> Self {
        let rules = vec![
            RedFlagRule {
                id: "CV-001".into(),
                label: "Dor torácica com síncope".into(),
                symptoms: vec!["dor_toracica".into(), "sincope".into()],
                mode: MatchMode::AnyOf,
                severity: Severity::Critical,
                action: recommended_action("dor torácica").to_string(),
                complaints: vec![],
            },
            RedFlagRule {
                id: "RESP-001".into(),
                label: "Dispneia com cianose".into(),
                symptoms: vec!["dispneia".into(), "cianose".into()],
                mode: MatchMode::AllOf,
                severity: Severity::Danger,
                action: recommended_action("cianose").to_string(),
                complaints: vec![],
            },
            RedFlagRule {
                id: "INF-001".into(),
                label: "Febre com tosse".into(),
                symptoms: vec!["febre_alta".into(), "tosse".into()],
                mode: MatchMode::AllOf,
                severity: Severity::Warning,
                action: recommended_action("febre").to_string(),
                complaints: vec![],
            },
        ];

        Self {
            rules,
            mappings: bundled_symptom_mappings(),
        }
    }
}

fn validate_rules(rules: &[RedFlagRule]) -> Result<(), KnowledgeError> {
    let mut ids = HashSet::new();
    for rule in rules {
        if !ids.insert(rule.id.as_str()) {
            return Err(KnowledgeError::DuplicateRuleId(rule.id.clone()));
        }
        if rule.symptoms.iter().all(|s| normalize_text(s).is_empty()) {
            return Err(KnowledgeError::EmptyRule(rule.id.clone()));
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Result<T, KnowledgeError> {
    let path = dir.join(file_name);
    let json = std::fs::read_to_string(&path).map_err(|e| {
        KnowledgeError::ReferenceDataLoad(path.display().to_string(), e.to_string())
    })?;
    serde_json::from_str(&json)
        .map_err(|e| KnowledgeError::ReferenceDataParse(file_name.into(), e.to_string()))
}

fn mapping(code: &str, keywords: &[&str], red_flags: &[&str]) -> SymptomMapping {
    SymptomMapping {
        code: code.into(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        associated_red_flags: red_flags.iter().map(|s| s.to_string()).collect(),
    }
}

/// Symptom vocabulary used by the anamnesis forms.
fn bundled_symptom_mappings() -> Vec<SymptomMapping> {
    vec![
        mapping(
            "dor_toracica",
            &["dor no peito", "dor torácica", "aperto", "opressão", "precordial"],
            &["Dor precordial em aperto > 20 min", "Irradiação para MSE, mandíbula ou dorso"],
        ),
        mapping(
            "sudorese",
            &["sudorese", "suor", "frio", "transpirando"],
            &["Sudorese fria profusa", "Sudorese"],
        ),
        mapping(
            "sincope",
            &["síncope", "desmaio", "perda de consciência", "desmaiou"],
            &["Síncope ou pré-síncope", "Perda de consciência > 5 minutos"],
        ),
        mapping(
            "dispneia",
            &["dispneia", "falta de ar", "dificuldade respirar", "sufocando"],
            &["SpO2 < 90% em ar ambiente", "Uso de musculatura acessória", "Fala entrecortada"],
        ),
        mapping(
            "cianose",
            &["cianose", "roxo", "azulado", "lábios roxos"],
            &["Cianose", "Hipoxemia grave"],
        ),
        mapping(
            "alteracao_consciencia",
            &["confusão", "desorientado", "sonolento", "não responde", "glasgow"],
            &["Alteração do nível de consciência", "Glasgow < 15"],
        ),
        mapping(
            "deficit_focal",
            &["fraqueza", "paralisia", "formigamento", "não mexe", "boca torta"],
            &["Déficit neurológico focal", "Hemiparesia", "Disartria"],
        ),
        mapping(
            "convulsao",
            &["convulsão", "crise", "tremendo", "se debatendo"],
            &["Convulsão pós-trauma", "Status epiléptico"],
        ),
        mapping(
            "defesa_abdominal",
            &["defesa", "rigidez", "tábua", "abdome rígido"],
            &["Defesa abdominal / abdome em tábua", "Sinais de irritação peritoneal"],
        ),
        mapping(
            "hematemese",
            &["vômito com sangue", "hematêmese", "sangue vômito"],
            &["Hematêmese", "Hemorragia digestiva alta"],
        ),
        mapping(
            "trauma_craniano",
            &["bateu cabeça", "pancada", "trauma craniano", "tce"],
            &["Perda de consciência > 5 minutos", "Amnésia > 30 minutos", "Vômitos persistentes"],
        ),
        mapping(
            "febre_alta",
            &["febre alta", "temperatura > 39", "calafrios"],
            &["Febre > 38°C", "Febre + rigidez de nuca"],
        ),
        mapping(
            "sepse",
            &["sepse", "infecção grave", "choque"],
            &["Hipotensão refratária a volume", "Lactato > 4 mmol/L"],
        ),
    ]
}
