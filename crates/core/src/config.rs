//! Core runtime configuration.
//!
//! Resolved once at process startup and passed into core services. Nothing in this crate reads
//! environment variables while answering a request.

use crate::error::{DischargeError, DischargeResult};
use crate::patient::PatientRegistry;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    roster_path: Option<PathBuf>,
}

impl CoreConfig {
    /// A configured roster path must point at an existing file.
    pub fn new(roster_path: Option<PathBuf>) -> DischargeResult<Self> {
        if let Some(path) = &roster_path {
            if !path.is_file() {
                return Err(DischargeError::InvalidInput(format!(
                    "patient roster {} is not a file",
                    path.display()
                )));
            }
        }
        Ok(Self { roster_path })
    }

    pub fn roster_path(&self) -> Option<&Path> {
        self.roster_path.as_deref()
    }

    /// Loads the configured roster file, or the built-in roster when none is configured.
    pub fn load_registry(&self, today: NaiveDate) -> DischargeResult<PatientRegistry> {
        match &self.roster_path {
            Some(path) => {
                let registry = PatientRegistry::from_yaml_file(path, today)?;
                tracing::info!(path = %path.display(), patients = registry.len(), "loaded patient roster");
                Ok(registry)
            }
            None => {
                tracing::info!("using built-in patient roster");
                Ok(PatientRegistry::seed())
            }
        }
    }
}

/// Interprets a raw roster setting; blank means unset.
pub fn roster_path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 21).unwrap()
    }

    #[test]
    fn blank_values_mean_unset() {
        assert_eq!(roster_path_from_env_value(None), None);
        assert_eq!(roster_path_from_env_value(Some("  ".into())), None);
        assert_eq!(
            roster_path_from_env_value(Some(" ward.yaml ".into())),
            Some(PathBuf::from("ward.yaml"))
        );
    }

    #[test]
    fn missing_roster_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = CoreConfig::new(Some(dir.path().join("absent.yaml")));
        assert!(matches!(result, Err(DischargeError::InvalidInput(_))));
    }

    #[test]
    fn falls_back_to_seed_roster() {
        let registry = CoreConfig::default().load_registry(today()).unwrap();
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn loads_configured_roster() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "- id: W1\n  name: Ada Byron\n  age: 36\n  room: D-1\n  diagnosis: Observation\n  admissionDate: 2025-01-20\n  dischargeStatus: ready\n  physician: Dr. Babbage"
        )
        .unwrap();

        let config = CoreConfig::new(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.roster_path(), Some(file.path()));
        let registry = config.load_registry(today()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.all()[0].name.as_str(), "Ada Byron");
    }
}
