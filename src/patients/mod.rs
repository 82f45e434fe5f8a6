//! Read-only patient summary lookup.

mod sample;

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

pub use sample::SampleDirectory;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub age: u32,
    pub gender: String,
    pub medical_record_number: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub blood_pressure: String,
    pub heart_rate: u32,
    pub temperature: String,
    pub respiratory_rate: u32,
    pub oxygen_saturation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

/// A full record as held by a directory. Never returned to callers directly.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientRecord {
    pub demographics: Demographics,
    pub vital_signs: VitalSigns,
    pub medications: Vec<Medication>,
    pub conditions: Vec<String>,
    pub last_visit: NaiveDate,
    pub notes: String,
}

/// The caller-facing view of a record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: String,
    pub demographics: Demographics,
    pub current_conditions: Vec<String>,
    /// Count only; medication details stay in the directory.
    pub active_medications: usize,
    pub last_visit: NaiveDate,
    pub vital_signs_last_recorded: VitalSigns,
    pub generated_at: DateTime<Utc>,
}

impl PatientSummary {
    pub fn from_record(patient_id: impl Into<String>, record: &PatientRecord) -> Self {
        Self {
            patient_id: patient_id.into(),
            demographics: record.demographics.clone(),
            current_conditions: record.conditions.clone(),
            active_medications: record.medications.len(),
            last_visit: record.last_visit,
            vital_signs_last_recorded: record.vital_signs.clone(),
            generated_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait PatientDirectory: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Fails with `Error::PatientNotFound` for unknown ids.
    async fn get_summary(&self, patient_id: &str) -> Result<PatientSummary>;

    /// Ids this directory can answer for.
    fn patient_ids(&self) -> Vec<String>;
}
