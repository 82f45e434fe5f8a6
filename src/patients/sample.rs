use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{Demographics, Medication, PatientDirectory, PatientRecord, PatientSummary, VitalSigns};
use crate::{Error, Result};

/// Built-in demonstration directory with two fixed records.
#[derive(Debug, Clone)]
pub struct SampleDirectory {
    records: BTreeMap<String, PatientRecord>,
}

impl Default for SampleDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleDirectory {
    pub fn new() -> Self {
        let mut records = BTreeMap::new();
        records.insert(
            "patient_001".to_string(),
            PatientRecord {
                demographics: Demographics {
                    age: 45,
                    gender: "male".into(),
                    medical_record_number: "MRN001".into(),
                },
                vital_signs: VitalSigns {
                    blood_pressure: "150/95".into(),
                    heart_rate: 88,
                    temperature: "98.6F".into(),
                    respiratory_rate: 16,
                    oxygen_saturation: "98%".into(),
                },
                medications: vec![
                    medication("Lisinopril", "10mg", "daily"),
                    medication("Metformin", "500mg", "BID"),
                ],
                conditions: vec!["Type 2 Diabetes".into(), "Hypertension".into()],
                last_visit: date(2024, 1, 15),
                notes: "Patient presents with chest pain and shortness of breath. Stable vital signs."
                    .into(),
            },
        );
        records.insert(
            "patient_002".to_string(),
            PatientRecord {
                demographics: Demographics {
                    age: 32,
                    gender: "female".into(),
                    medical_record_number: "MRN002".into(),
                },
                vital_signs: VitalSigns {
                    blood_pressure: "120/80".into(),
                    heart_rate: 72,
                    temperature: "98.2F".into(),
                    respiratory_rate: 14,
                    oxygen_saturation: "99%".into(),
                },
                medications: vec![medication("Synthroid", "75mcg", "daily")],
                conditions: vec!["Hypothyroidism".into()],
                last_visit: date(2024, 1, 10),
                notes: "Regular follow-up for thyroid management. Patient doing well.".into(),
            },
        );
        Self { records }
    }

    pub fn record(&self, patient_id: &str) -> Option<&PatientRecord> {
        self.records.get(patient_id)
    }
}

fn medication(name: &str, dosage: &str, frequency: &str) -> Medication {
    Medication {
        name: name.into(),
        dosage: dosage.into(),
        frequency: frequency.into(),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[async_trait]
impl PatientDirectory for SampleDirectory {
    fn name(&self) -> &str {
        "sample"
    }

    async fn get_summary(&self, patient_id: &str) -> Result<PatientSummary> {
        self.records
            .get(patient_id)
            .map(|record| PatientSummary::from_record(patient_id, record))
            .ok_or_else(|| Error::PatientNotFound {
                patient_id: patient_id.chars().take(64).collect(),
            })
    }

    fn patient_ids(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_summary_counts_medications() {
        let summary = SampleDirectory::new().get_summary("patient_001").await.unwrap();
        assert_eq!(summary.active_medications, 2);
        assert_eq!(summary.current_conditions, vec!["Type 2 Diabetes", "Hypertension"]);
        assert_eq!(summary.vital_signs_last_recorded.blood_pressure, "150/95");
        assert_eq!(summary.last_visit.to_string(), "2024-01-15");
    }

    #[tokio::test]
    async fn test_summary_omits_notes_and_medication_details() {
        let summary = SampleDirectory::new().get_summary("patient_002").await.unwrap();
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("thyroid management"));
        assert!(!json.contains("Synthroid"));
    }

    #[tokio::test]
    async fn test_unknown_patient() {
        let directory = SampleDirectory::new();
        let err = directory.get_summary("patient_999").await.unwrap_err();
        assert!(matches!(
            err,
            Error::PatientNotFound { patient_id } if patient_id == "patient_999"
        ));
        assert_eq!(directory.patient_ids(), vec!["patient_001", "patient_002"]);
    }

    #[test]
    fn test_unknown_patient_id_is_truncated() {
        let long = "p".repeat(500);
        let err = tokio_test::block_on(SampleDirectory::new().get_summary(&long)).unwrap_err();
        assert!(matches!(err, Error::PatientNotFound { patient_id } if patient_id.len() == 64));
    }
}
