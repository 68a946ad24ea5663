//! Patient registry.
//!
//! The registry is the source of truth for every derived view (enhanced patients, chat reports,
//! analytics). It is built either from the built-in seed roster or from a YAML roster file that
//! is parsed strictly and validated once at startup.

use crate::error::{DischargeError, DischargeResult};
use chrono::NaiveDate;
use dc_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Where a patient is in the discharge process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DischargeStatus {
    Ready,
    Pending,
    Delayed,
}

impl DischargeStatus {
    pub const ALL: [DischargeStatus; 3] = [Self::Ready, Self::Pending, Self::Delayed];

    /// Lowercase label used on the wire and in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Pending => "pending",
            Self::Delayed => "delayed",
        }
    }
}

impl std::fmt::Display for DischargeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DischargeStatus {
    type Err = DischargeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ready" => Ok(Self::Ready),
            "pending" => Ok(Self::Pending),
            "delayed" => Ok(Self::Delayed),
            other => Err(DischargeError::InvalidInput(format!(
                "unknown discharge status: {other}"
            ))),
        }
    }
}

/// A patient on the ward roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: NonEmptyText,
    pub name: NonEmptyText,
    pub age: u32,
    pub room: String,
    pub diagnosis: String,
    pub admission_date: NaiveDate,
    pub discharge_status: DischargeStatus,
    pub physician: String,
}

/// In-memory roster of patients, kept in insertion order.
#[derive(Clone, Debug)]
pub struct PatientRegistry {
    patients: Vec<Patient>,
}

impl PatientRegistry {
    /// Builds a registry after checking ids are unique and no admission lies after `today`.
    pub fn new(patients: Vec<Patient>, today: NaiveDate) -> DischargeResult<Self> {
        let mut seen = HashSet::new();
        for patient in &patients {
            if !seen.insert(patient.id.as_str()) {
                return Err(DischargeError::DuplicatePatientId(
                    patient.id.as_str().to_owned(),
                ));
            }
            if patient.admission_date > today {
                return Err(DischargeError::InvalidRoster(format!(
                    "patient {} has an admission date in the future ({})",
                    patient.id, patient.admission_date
                )));
            }
        }

        Ok(Self { patients })
    }

    /// The six-patient demo roster.
    pub fn seed() -> Self {
        Self {
            patients: seed_patients(),
        }
    }

    /// Loads a roster from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`DischargeError::RosterRead`] if the file cannot be read, or any error from
    /// [`PatientRegistry::from_yaml`].
    pub fn from_yaml_file(path: &Path, today: NaiveDate) -> DischargeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(DischargeError::RosterRead)?;
        Self::from_yaml(&text, today)
    }

    /// Parses a roster from YAML text: a sequence of patient mappings with camelCase keys.
    ///
    /// Schema mismatches are reported with the path of the failing field
    /// (e.g. `[2].dischargeStatus`). Unknown keys are rejected.
    pub fn from_yaml(yaml_text: &str, today: NaiveDate) -> DischargeResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, Vec<PatientWire>>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(DischargeError::InvalidRoster(format!(
                    "roster schema mismatch at {path}: {source}"
                )));
            }
        };

        let patients = wire
            .into_iter()
            .map(wire_to_domain)
            .collect::<DischargeResult<Vec<_>>>()?;

        Self::new(patients, today)
    }

    pub fn all(&self) -> &[Patient] {
        &self.patients
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id.as_str() == id)
    }

    pub fn with_status(&self, status: DischargeStatus) -> impl Iterator<Item = &Patient> {
        self.patients
            .iter()
            .filter(move |p| p.discharge_status == status)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PatientWire {
    id: String,
    name: String,
    age: u32,
    room: String,
    diagnosis: String,
    admission_date: NaiveDate,
    discharge_status: DischargeStatus,
    physician: String,
}

fn wire_to_domain(wire: PatientWire) -> DischargeResult<Patient> {
    let id = NonEmptyText::new(&wire.id)
        .map_err(|_| DischargeError::InvalidRoster("patient id cannot be empty".into()))?;
    let name = wire.name.split_whitespace().collect::<Vec<_>>().join(" ");
    let name = NonEmptyText::new(name).map_err(|_| {
        DischargeError::InvalidRoster(format!("patient {id} has an empty name"))
    })?;

    Ok(Patient {
        id,
        name,
        age: wire.age,
        room: wire.room,
        diagnosis: wire.diagnosis,
        admission_date: wire.admission_date,
        discharge_status: wire.discharge_status,
        physician: wire.physician,
    })
}

#[allow(clippy::too_many_arguments)]
fn seed_patient(
    id: &str,
    name: &str,
    age: u32,
    room: &str,
    diagnosis: &str,
    (year, month, day): (i32, u32, u32),
    discharge_status: DischargeStatus,
    physician: &str,
) -> Patient {
    Patient {
        id: NonEmptyText::new(id).expect("seed ids are non-empty"),
        name: NonEmptyText::new(name).expect("seed names are non-empty"),
        age,
        room: room.to_owned(),
        diagnosis: diagnosis.to_owned(),
        admission_date: NaiveDate::from_ymd_opt(year, month, day).expect("seed dates are valid"),
        discharge_status,
        physician: physician.to_owned(),
    }
}

fn seed_patients() -> Vec<Patient> {
    use DischargeStatus::*;
    vec![
        seed_patient(
            "PT001",
            "Margaret Johnson",
            78,
            "A-204",
            "Pneumonia, recovered",
            (2025, 1, 15),
            Ready,
            "Dr. Sarah Johnson",
        ),
        seed_patient(
            "PT002",
            "Robert Martinez",
            65,
            "B-112",
            "Hip replacement surgery",
            (2025, 1, 16),
            Pending,
            "Dr. Michael Chen",
        ),
        seed_patient(
            "PT003",
            "Linda Davis",
            72,
            "A-301",
            "Cardiac monitoring post-procedure",
            (2025, 1, 17),
            Delayed,
            "Dr. Amanda Rodriguez",
        ),
        seed_patient(
            "PT004",
            "William Thompson",
            69,
            "C-205",
            "Diabetes management",
            (2025, 1, 18),
            Ready,
            "Dr. James Wilson",
        ),
        seed_patient(
            "PT005",
            "Dorothy Wilson",
            81,
            "B-208",
            "Fall injury, observation",
            (2025, 1, 19),
            Pending,
            "Dr. Sarah Johnson",
        ),
        seed_patient(
            "PT006",
            "Charles Brown",
            74,
            "A-105",
            "Post-surgical recovery",
            (2025, 1, 20),
            Delayed,
            "Dr. Michael Chen",
        ),
    ]
}
