//! Derived patient attributes.
//!
//! Urgency, complexity, barriers, next steps and search keywords are pure functions of a
//! [`Patient`]. They are recomputed whenever an [`EnhancedPatient`] is built and never stored
//! back into the registry.

use crate::constants::{
    COMPLEXITY_BASE, COMPLEX_DIAGNOSIS_TERMS, MAX_KEYWORDS, SCORE_CAP, URGENCY_BASE,
    URGENT_DIAGNOSIS_TERMS,
};
use crate::patient::{DischargeStatus, Patient, PatientRegistry};
use serde::Serialize;
use std::ops::Deref;

/// A patient together with the attributes derived from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedPatient {
    #[serde(flatten)]
    pub patient: Patient,
    pub keywords: Vec<String>,
    pub urgency: u8,
    pub complexity: u8,
    pub barriers: Vec<&'static str>,
    pub next_steps: Vec<&'static str>,
}

impl EnhancedPatient {
    pub fn new(patient: Patient) -> Self {
        let keywords = extract_keywords(&format!("{} {}", patient.diagnosis, patient.name));
        let urgency = urgency_score(&patient);
        let complexity = complexity_score(&patient);
        let barriers = barriers(patient.discharge_status);
        let next_steps = next_steps(patient.discharge_status);

        Self {
            patient,
            keywords,
            urgency,
            complexity,
            barriers,
            next_steps,
        }
    }

    /// Enhances every patient in the registry, keeping roster order.
    pub fn from_registry(registry: &PatientRegistry) -> Vec<Self> {
        registry.all().iter().cloned().map(Self::new).collect()
    }
}

impl Deref for EnhancedPatient {
    type Target = Patient;

    fn deref(&self) -> &Self::Target {
        &self.patient
    }
}

/// Lower-cased word tokens longer than two characters, first occurrence kept, at most ten.
///
/// Anything that is not a word character or whitespace is stripped before splitting.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    let mut keywords: Vec<String> = Vec::new();
    for word in cleaned.split_whitespace() {
        if word.chars().count() > 2 && !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_owned());
        }
    }
    keywords.truncate(MAX_KEYWORDS);
    keywords
}

pub fn urgency_score(patient: &Patient) -> u8 {
    let mut urgency = URGENCY_BASE;

    match patient.discharge_status {
        DischargeStatus::Delayed => urgency += 3,
        DischargeStatus::Pending => urgency += 1,
        DischargeStatus::Ready => {}
    }

    if patient.age > 80 {
        urgency += 1;
    }
    if patient.age > 90 {
        urgency += 1;
    }

    let diagnosis = patient.diagnosis.to_lowercase();
    if URGENT_DIAGNOSIS_TERMS
        .iter()
        .any(|term| diagnosis.contains(term))
    {
        urgency += 2;
    }

    urgency.min(SCORE_CAP)
}

pub fn complexity_score(patient: &Patient) -> u8 {
    let diagnosis = patient.diagnosis.to_lowercase();
    let matched = COMPLEX_DIAGNOSIS_TERMS
        .iter()
        .filter(|term| diagnosis.contains(*term))
        .count() as u8;

    let mut complexity = COMPLEXITY_BASE + matched;
    if patient.age > 75 {
        complexity += 1;
    }

    complexity.min(SCORE_CAP)
}

pub fn barriers(status: DischargeStatus) -> Vec<&'static str> {
    match status {
        DischargeStatus::Delayed => vec![
            "Medical clearance pending",
            "Insurance authorization needed",
        ],
        DischargeStatus::Pending => vec!["Transportation coordination", "Equipment delivery"],
        DischargeStatus::Ready => Vec::new(),
    }
}

pub fn next_steps(status: DischargeStatus) -> Vec<&'static str> {
    match status {
        DischargeStatus::Ready => vec![
            "Confirm transportation",
            "Final patient education",
            "Discharge documentation",
        ],
        DischargeStatus::Pending => vec![
            "Resolve pending items",
            "Coordinate with family",
            "Schedule follow-up",
        ],
        DischargeStatus::Delayed => vec![
            "Escalate to physician",
            "Contact insurance",
            "Update family on delay",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enhanced_seed() -> Vec<EnhancedPatient> {
        EnhancedPatient::from_registry(&PatientRegistry::seed())
    }

    fn with_changes(age: u32, diagnosis: &str, status: DischargeStatus) -> Patient {
        let mut patient = PatientRegistry::seed().all()[0].clone();
        patient.age = age;
        patient.diagnosis = diagnosis.to_owned();
        patient.discharge_status = status;
        patient
    }

    #[test]
    fn keywords_strip_punctuation_and_short_words() {
        assert_eq!(
            extract_keywords("Pneumonia, recovered Margaret Johnson"),
            ["pneumonia", "recovered", "margaret", "johnson"]
        );
        assert_eq!(extract_keywords("Hip is ok"), ["hip"]);
    }

    #[test]
    fn keywords_are_deduplicated_and_capped() {
        let text = "alpha beta gamma alpha delta epsilon zeta theta iota kappa lambda omega";
        let keywords = extract_keywords(text);
        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert_eq!(keywords[0], "alpha");
        assert_eq!(keywords[3], "delta");
        assert!(!keywords.contains(&"omega".to_string()));
    }

    #[test]
    fn seed_scores_match_rules() {
        let scores: Vec<(u8, u8)> = enhanced_seed()
            .iter()
            .map(|p| (p.urgency, p.complexity))
            .collect();
        // Margaret, Robert, Linda, William, Dorothy, Charles
        assert_eq!(scores, [(5, 4), (8, 5), (10, 4), (5, 4), (7, 4), (8, 3)]);
    }

    #[test]
    fn scores_stay_within_bounds() {
        for status in DischargeStatus::ALL {
            for age in [0, 50, 76, 81, 95, 120] {
                let patient = with_changes(age, "Cardiac surgery replacement monitoring management", status);
                let urgency = urgency_score(&patient);
                let complexity = complexity_score(&patient);
                assert!(urgency <= SCORE_CAP, "urgency {urgency} out of range");
                assert!(complexity <= SCORE_CAP, "complexity {complexity} out of range");
                assert!(urgency >= URGENCY_BASE);
                assert!(complexity >= COMPLEXITY_BASE);
            }
        }
    }

    #[test]
    fn delayed_patients_have_urgency_of_at_least_eight() {
        for age in [1, 40, 85, 99] {
            let patient = with_changes(age, "Observation", DischargeStatus::Delayed);
            assert!(urgency_score(&patient) >= 8);
        }
        for patient in enhanced_seed() {
            if patient.discharge_status == DischargeStatus::Delayed {
                assert!(patient.urgency >= 8);
            }
        }
    }

    #[test]
    fn very_old_patients_get_both_age_bonuses() {
        let patient = with_changes(92, "Observation", DischargeStatus::Ready);
        assert_eq!(urgency_score(&patient), 7);
        assert_eq!(complexity_score(&patient), 4);
    }

    #[test]
    fn barriers_and_steps_follow_status() {
        assert!(barriers(DischargeStatus::Ready).is_empty());
        assert_eq!(barriers(DischargeStatus::Pending)[0], "Transportation coordination");
        assert_eq!(next_steps(DischargeStatus::Delayed)[0], "Escalate to physician");
    }
}
