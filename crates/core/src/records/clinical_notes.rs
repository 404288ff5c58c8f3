//! Doctor-authored documents: progress notes, discharge summaries and death certificates.

use crate::collection::{record_patch, Record};
use crate::constants::{DEATH_CERTIFICATES_KEY, EPICRISIS_KEY, EVOLUTION_NOTES_KEY};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Daily progress note in SOAP layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionNote {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "fecha")]
    pub written_at: DateTime<Utc>,
    #[serde(rename = "medico")]
    pub doctor: String,
    #[serde(rename = "subjetivo", default)]
    pub subjective: String,
    #[serde(rename = "objetivo", default)]
    pub objective: String,
    #[serde(rename = "analisis", default)]
    pub assessment: String,
    #[serde(rename = "plan", default)]
    pub plan: String,
}

record_patch!(EvolutionNotePatch for EvolutionNote {
    subjective: String,
    objective: String,
    assessment: String,
    plan: String,
});

impl Record for EvolutionNote {
    const STORAGE_KEY: &'static str = EVOLUTION_NOTES_KEY;
    type Patch = EvolutionNotePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epicrisis {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "fechaIngreso")]
    pub admitted_on: NaiveDate,
    #[serde(rename = "fechaEgreso")]
    pub discharged_on: NaiveDate,
    #[serde(rename = "diagnosticoIngreso")]
    pub admission_diagnosis: String,
    #[serde(rename = "diagnosticoEgreso")]
    pub discharge_diagnosis: String,
    #[serde(rename = "resumen", default)]
    pub summary: String,
    #[serde(rename = "tratamiento", default)]
    pub treatment: String,
    #[serde(rename = "condicionEgreso", default)]
    pub discharge_condition: String,
    #[serde(rename = "medico")]
    pub doctor: String,
}

record_patch!(EpicrisisPatch for Epicrisis {
    discharge_diagnosis: String,
    summary: String,
    treatment: String,
    discharge_condition: String,
});

impl Record for Epicrisis {
    const STORAGE_KEY: &'static str = EPICRISIS_KEY;
    type Patch = EpicrisisPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

impl Epicrisis {
    /// Whole days between admission and discharge.
    pub fn length_of_stay(&self) -> i64 {
        (self.discharged_on - self.admitted_on).num_days()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathCertificate {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "fechaDefuncion")]
    pub date_of_death: NaiveDate,
    /// `HH:MM`
    #[serde(rename = "horaDefuncion")]
    pub time_of_death: String,
    #[serde(rename = "causaDirecta")]
    pub direct_cause: String,
    #[serde(rename = "causasAntecedentes", default)]
    pub antecedent_causes: Vec<String>,
    #[serde(rename = "lugar", default)]
    pub place: String,
    #[serde(rename = "medico")]
    pub doctor: String,
}

record_patch!(DeathCertificatePatch for DeathCertificate {
    direct_cause: String,
    antecedent_causes: Vec<String>,
    place: String,
});

impl Record for DeathCertificate {
    const STORAGE_KEY: &'static str = DEATH_CERTIFICATES_KEY;
    type Patch = DeathCertificatePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_of_stay_counts_days() {
        let epicrisis = Epicrisis {
            id: "epi-1".into(),
            patient_id: "p-1".into(),
            admitted_on: NaiveDate::from_ymd_opt(2024, 2, 27).unwrap(),
            discharged_on: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            admission_diagnosis: "Dolor abdominal".into(),
            discharge_diagnosis: "Apendicitis aguda operada".into(),
            summary: String::new(),
            treatment: String::new(),
            discharge_condition: "estable".into(),
            doctor: "Dr. Ruiz".into(),
        };
        // 2024 is a leap year.
        assert_eq!(epicrisis.length_of_stay(), 5);
    }

    #[test]
    fn death_certificate_antecedents_default_empty() {
        let json = r#"{"id":"cd-1","pacienteId":"p-4","fechaDefuncion":"2024-05-01",
            "horaDefuncion":"03:10","causaDirecta":"Paro cardiorrespiratorio","medico":"Dra. Soto"}"#;
        let certificate: DeathCertificate = serde_json::from_str(json).unwrap();
        assert!(certificate.antecedent_causes.is_empty());
        assert_eq!(certificate.place, "");
    }
}
