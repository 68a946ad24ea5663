//! Intent classification.
//!
//! Rules are checked in a fixed order and the first match wins. Patient names are checked
//! before anything else, so "how many days has Linda Davis been here" is a patient query even
//! though it also contains an analytics phrase.

use crate::constants::{
    ANALYTICS_PHRASES, HELP_PHRASES, STATUS_WORDS, TIME_WORDS, WORKFLOW_WORDS,
};
use crate::derived::EnhancedPatient;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    PatientQuery,
    StatusRequest,
    WorkflowManagement,
    Analytics,
    Help,
    General,
}

impl IntentKind {
    /// Fixed confidence reported for each intent.
    pub fn confidence(self) -> f64 {
        match self {
            Self::PatientQuery => 0.9,
            Self::Analytics => 0.85,
            Self::StatusRequest => 0.8,
            Self::WorkflowManagement => 0.75,
            Self::Help => 0.9,
            Self::General => 0.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PatientQuery => "patient_query",
            Self::StatusRequest => "status_request",
            Self::WorkflowManagement => "workflow_management",
            Self::Analytics => "analytics",
            Self::Help => "help",
            Self::General => "general",
        }
    }
}

/// A lightweight reference to a roster patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientRef {
    pub id: String,
    pub name: String,
}

/// Something recognised inside an utterance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Entity {
    Patient(PatientRef),
    Room(String),
    Time(&'static str),
}

/// Result of classifying one utterance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Classification {
    pub intent: IntentKind,
    pub confidence: f64,
    pub entities: Vec<Entity>,
}

impl Classification {
    /// Patient entities in roster order.
    pub fn patients(&self) -> impl Iterator<Item = &PatientRef> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Patient(p) => Some(p),
            _ => None,
        })
    }
}

static ROOM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]-\d+").expect("room pattern is valid"));

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// True when the full name, or any single token of it, occurs in the lower-cased utterance.
pub fn mentions_patient(lower_input: &str, patient: &EnhancedPatient) -> bool {
    let name = patient.name.as_str().to_lowercase();
    lower_input.contains(&name) || name.split_whitespace().any(|token| lower_input.contains(token))
}

/// Extracts patients, room codes and time references, in that order.
pub fn extract_entities(input: &str, patients: &[EnhancedPatient]) -> Vec<Entity> {
    let lower = input.to_lowercase();
    let mut entities: Vec<Entity> = patients
        .iter()
        .filter(|p| mentions_patient(&lower, p))
        .map(|p| {
            Entity::Patient(PatientRef {
                id: p.id.as_str().to_owned(),
                name: p.name.as_str().to_owned(),
            })
        })
        .collect();

    entities.extend(
        ROOM
            .find_iter(input)
            .map(|m| Entity::Room(m.as_str().to_owned())),
    );

    entities.extend(
        TIME_WORDS
            .iter()
            .filter(|word| lower.contains(*word))
            .map(|word| Entity::Time(*word)),
    );

    entities
}

/// Classifies an utterance against the roster.
pub fn classify(input: &str, patients: &[EnhancedPatient]) -> Classification {
    let lower = input.to_lowercase();

    let intent = if patients.iter().any(|p| mentions_patient(&lower, p)) {
        IntentKind::PatientQuery
    } else if contains_any(&lower, &ANALYTICS_PHRASES) {
        IntentKind::Analytics
    } else if contains_any(&lower, &STATUS_WORDS) {
        IntentKind::StatusRequest
    } else if contains_any(&lower, &WORKFLOW_WORDS) {
        IntentKind::WorkflowManagement
    } else if contains_any(&lower, &HELP_PHRASES) {
        IntentKind::Help
    } else {
        IntentKind::General
    };

    Classification {
        intent,
        confidence: intent.confidence(),
        entities: extract_entities(input, patients),
    }
}
