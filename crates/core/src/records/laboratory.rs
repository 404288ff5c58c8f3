//! Laboratory sample requests.

use crate::collection::{parse_seed, record_patch, Record};
use crate::constants::{LABORATORY_ID_PREFIX, LABORATORY_REQUESTS_KEY};
use crate::error::{WardError, WardResult};
use crate::lifecycle::{ensure_step, FulfillmentRequest, Lifecycle};
use crate::records::{MedicalOrder, OrderDetails, OrderKind, Priority};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ward_types::DocumentText;

const SEED: &str = include_str!("../../seeds/laboratory_requests.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaboratoryStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "muestra_recolectada")]
    SampleCollected,
    #[serde(rename = "en_proceso")]
    InProcess,
    #[serde(rename = "completado")]
    Completed,
}

impl Lifecycle for LaboratoryStatus {
    const SEQUENCE: &'static [Self] = &[
        LaboratoryStatus::Pending,
        LaboratoryStatus::SampleCollected,
        LaboratoryStatus::InProcess,
        LaboratoryStatus::Completed,
    ];

    fn label(self) -> &'static str {
        match self {
            LaboratoryStatus::Pending => "pendiente",
            LaboratoryStatus::SampleCollected => "muestra_recolectada",
            LaboratoryStatus::InProcess => "en_proceso",
            LaboratoryStatus::Completed => "completado",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    Sangre,
    Orina,
    Heces,
    Esputo,
    Hisopado,
    Lcr,
    Otro,
}

impl SampleType {
    pub fn label(self) -> &'static str {
        match self {
            SampleType::Sangre => "sangre",
            SampleType::Orina => "orina",
            SampleType::Heces => "heces",
            SampleType::Esputo => "esputo",
            SampleType::Hisopado => "hisopado",
            SampleType::Lcr => "lcr",
            SampleType::Otro => "otro",
        }
    }
}

impl FromStr for SampleType {
    type Err = WardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sangre" => Ok(SampleType::Sangre),
            "orina" => Ok(SampleType::Orina),
            "heces" => Ok(SampleType::Heces),
            "esputo" => Ok(SampleType::Esputo),
            "hisopado" => Ok(SampleType::Hisopado),
            "lcr" => Ok(SampleType::Lcr),
            "otro" => Ok(SampleType::Otro),
            other => Err(WardError::InvalidInput(format!(
                "unknown sample type '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaboratoryRequest {
    pub id: String,
    #[serde(rename = "ordenMedicaId")]
    pub source_order_id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "pacienteNombre")]
    pub patient_name: String,
    #[serde(rename = "medico")]
    pub doctor: String,
    #[serde(rename = "estudio")]
    pub study: String,
    #[serde(rename = "prioridad", default)]
    pub priority: Priority,
    #[serde(rename = "estado")]
    pub status: LaboratoryStatus,
    #[serde(rename = "fechaSolicitud")]
    pub requested_at: DateTime<Utc>,
    #[serde(rename = "tipoMuestra", default, skip_serializing_if = "Option::is_none")]
    pub sample_type: Option<SampleType>,
    #[serde(rename = "fechaRecoleccion", default, skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<NaiveDate>,
    /// `HH:MM`, local to the collection date.
    #[serde(rename = "horaRecoleccion", default, skip_serializing_if = "Option::is_none")]
    pub collection_time: Option<String>,
    #[serde(rename = "fechaProceso", default, skip_serializing_if = "Option::is_none")]
    pub processing_at: Option<DateTime<Utc>>,
    #[serde(rename = "fechaResultado", default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(rename = "resultados", default, skip_serializing_if = "Option::is_none")]
    pub results: Option<DocumentText>,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

record_patch!(LaboratoryRequestPatch for LaboratoryRequest {
    priority: Priority,
    notes: Option<String>,
});

impl Record for LaboratoryRequest {
    const STORAGE_KEY: &'static str = LABORATORY_REQUESTS_KEY;
    type Patch = LaboratoryRequestPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }

    fn seed() -> Vec<Self> {
        parse_seed(SEED)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaboratoryAction {
    CollectSample { sample_type: SampleType },
    StartProcessing,
    Complete { results: DocumentText },
}

impl FulfillmentRequest for LaboratoryRequest {
    type Status = LaboratoryStatus;
    type Action = LaboratoryAction;

    const KIND: OrderKind = OrderKind::Laboratory;
    const ID_PREFIX: &'static str = LABORATORY_ID_PREFIX;

    fn source_order_id(&self) -> &str {
        &self.source_order_id
    }

    fn status(&self) -> LaboratoryStatus {
        self.status
    }

    fn from_order(id: String, order: &MedicalOrder) -> Option<Self> {
        let OrderDetails::Laboratory { study } = &order.details else {
            return None;
        };

        Some(Self {
            id,
            source_order_id: order.id.clone(),
            patient_id: order.patient_id.clone(),
            patient_name: order.patient_name.clone(),
            doctor: order.doctor.clone(),
            study: study.clone(),
            priority: order.priority,
            status: LaboratoryStatus::initial(),
            requested_at: order.created_at,
            sample_type: None,
            collection_date: None,
            collection_time: None,
            processing_at: None,
            completed_at: None,
            results: None,
            notes: order.notes.clone(),
        })
    }

    fn apply(
        &mut self,
        action: LaboratoryAction,
        now: DateTime<Utc>,
    ) -> WardResult<LaboratoryStatus> {
        let target = match action {
            LaboratoryAction::CollectSample { sample_type } => {
                ensure_step(self.status, LaboratoryStatus::SampleCollected, "collect sample")?;
                self.sample_type = Some(sample_type);
                self.collection_date = Some(now.date_naive());
                self.collection_time = Some(now.format("%H:%M").to_string());
                LaboratoryStatus::SampleCollected
            }
            LaboratoryAction::StartProcessing => {
                ensure_step(self.status, LaboratoryStatus::InProcess, "start processing")?;
                self.processing_at = Some(now);
                LaboratoryStatus::InProcess
            }
            LaboratoryAction::Complete { results } => {
                ensure_step(self.status, LaboratoryStatus::Completed, "complete")?;
                self.results = Some(results);
                self.completed_at = Some(now);
                LaboratoryStatus::Completed
            }
        };

        self.status = target;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::OrderDraft;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 7, 45, 12).unwrap()
    }

    fn order() -> MedicalOrder {
        MedicalOrder::issue(
            "om-1".into(),
            OrderDraft {
                patient_id: "p-1".into(),
                patient_name: "Ana Pérez".into(),
                doctor: "Dr. Ruiz".into(),
                priority: Priority::Routine,
                notes: None,
                details: OrderDetails::Laboratory {
                    study: "Glicemia".into(),
                },
            },
            t0(),
        )
        .unwrap()
    }

    #[test]
    fn collect_sample_sets_date_and_time() {
        let mut request = LaboratoryRequest::from_order("lab-1".into(), &order()).unwrap();
        let status = request
            .apply(
                LaboratoryAction::CollectSample {
                    sample_type: SampleType::Sangre,
                },
                t0(),
            )
            .unwrap();

        assert_eq!(status, LaboratoryStatus::SampleCollected);
        assert_eq!(request.sample_type, Some(SampleType::Sangre));
        assert_eq!(request.collection_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(request.collection_time.as_deref(), Some("07:45"));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["estado"], "muestra_recolectada");
        assert_eq!(value["fechaRecoleccion"], "2024-03-01");
        assert_eq!(value["horaRecoleccion"], "07:45");
        assert_eq!(value["tipoMuestra"], "sangre");
    }

    #[test]
    fn cannot_process_before_collection() {
        let mut request = LaboratoryRequest::from_order("lab-1".into(), &order()).unwrap();
        assert!(request
            .apply(LaboratoryAction::StartProcessing, t0())
            .is_err());
        assert_eq!(request.status, LaboratoryStatus::Pending);
    }

    #[test]
    fn completion_records_results() {
        let mut request = LaboratoryRequest::from_order("lab-1".into(), &order()).unwrap();
        request
            .apply(
                LaboratoryAction::CollectSample {
                    sample_type: SampleType::Sangre,
                },
                t0(),
            )
            .unwrap();
        request
            .apply(LaboratoryAction::StartProcessing, t0())
            .unwrap();
        request
            .apply(
                LaboratoryAction::Complete {
                    results: DocumentText::new("results", "Glicemia 92 mg/dL").unwrap(),
                },
                t0(),
            )
            .unwrap();

        assert_eq!(request.status, LaboratoryStatus::Completed);
        assert_eq!(
            request.results.as_ref().map(DocumentText::as_str),
            Some("Glicemia 92 mg/dL")
        );
        assert!(request
            .apply(
                LaboratoryAction::CollectSample {
                    sample_type: SampleType::Orina
                },
                t0()
            )
            .is_err());
    }

    #[test]
    fn sample_type_parsing() {
        assert_eq!("Sangre".parse::<SampleType>().unwrap(), SampleType::Sangre);
        assert_eq!(" lcr ".parse::<SampleType>().unwrap(), SampleType::Lcr);
        assert!("saliva".parse::<SampleType>().is_err());
    }

    #[test]
    fn seed_records_parse() {
        let seed = LaboratoryRequest::seed();
        assert!(!seed.is_empty());
        assert!(seed.iter().all(|r| !r.source_order_id.is_empty()));
    }

    #[test]
    fn completed_seed_carries_results_document() {
        let seed = LaboratoryRequest::seed();
        let completed = seed
            .iter()
            .find(|r| r.status == LaboratoryStatus::Completed)
            .unwrap();
        let results = completed.results.as_ref().unwrap();
        assert!(results.as_str().starts_with("Colesterol total"));

        let mut value = serde_json::to_value(completed).unwrap();
        assert_eq!(value["resultados"], results.as_str());
        value["resultados"] = "   ".into();
        assert!(serde_json::from_value::<LaboratoryRequest>(value).is_err());
    }
}
