//! Imaging study requests.

use crate::collection::{record_patch, Record};
use crate::constants::{IMAGING_ID_PREFIX, IMAGING_REQUESTS_KEY};
use crate::error::WardResult;
use crate::lifecycle::{ensure_step, FulfillmentRequest, Lifecycle};
use crate::records::{MedicalOrder, OrderDetails, OrderKind, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ward_types::DocumentText;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImagingStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en_proceso")]
    InProcess,
    #[serde(rename = "completado")]
    Completed,
}

impl Lifecycle for ImagingStatus {
    const SEQUENCE: &'static [Self] = &[
        ImagingStatus::Pending,
        ImagingStatus::InProcess,
        ImagingStatus::Completed,
    ];

    fn label(self) -> &'static str {
        match self {
            ImagingStatus::Pending => "pendiente",
            ImagingStatus::InProcess => "en_proceso",
            ImagingStatus::Completed => "completado",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagingRequest {
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
    #[serde(rename = "region", default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(rename = "prioridad", default)]
    pub priority: Priority,
    #[serde(rename = "estado")]
    pub status: ImagingStatus,
    #[serde(rename = "fechaSolicitud")]
    pub requested_at: DateTime<Utc>,
    #[serde(rename = "fechaInicio", default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "fechaInforme", default, skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<DateTime<Utc>>,
    #[serde(rename = "informe", default, skip_serializing_if = "Option::is_none")]
    pub report: Option<DocumentText>,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

record_patch!(ImagingRequestPatch for ImagingRequest {
    priority: Priority,
    notes: Option<String>,
});

impl Record for ImagingRequest {
    const STORAGE_KEY: &'static str = IMAGING_REQUESTS_KEY;
    type Patch = ImagingRequestPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImagingAction {
    Start,
    Complete { report: DocumentText },
}

impl FulfillmentRequest for ImagingRequest {
    type Status = ImagingStatus;
    type Action = ImagingAction;

    const KIND: OrderKind = OrderKind::Imaging;
    const ID_PREFIX: &'static str = IMAGING_ID_PREFIX;

    fn source_order_id(&self) -> &str {
        &self.source_order_id
    }

    fn status(&self) -> ImagingStatus {
        self.status
    }

    fn from_order(id: String, order: &MedicalOrder) -> Option<Self> {
        let OrderDetails::Imaging { study, region } = &order.details else {
            return None;
        };

        Some(Self {
            id,
            source_order_id: order.id.clone(),
            patient_id: order.patient_id.clone(),
            patient_name: order.patient_name.clone(),
            doctor: order.doctor.clone(),
            study: study.clone(),
            region: region.clone(),
            priority: order.priority,
            status: ImagingStatus::initial(),
            requested_at: order.created_at,
            started_at: None,
            reported_at: None,
            report: None,
            notes: order.notes.clone(),
        })
    }

    fn apply(&mut self, action: ImagingAction, now: DateTime<Utc>) -> WardResult<ImagingStatus> {
        let target = match action {
            ImagingAction::Start => {
                ensure_step(self.status, ImagingStatus::InProcess, "start study")?;
                self.started_at = Some(now);
                ImagingStatus::InProcess
            }
            ImagingAction::Complete { report } => {
                ensure_step(self.status, ImagingStatus::Completed, "complete study")?;
                self.report = Some(report);
                self.reported_at = Some(now);
                ImagingStatus::Completed
            }
        };

        self.status = target;
        Ok(target)
    }
}
