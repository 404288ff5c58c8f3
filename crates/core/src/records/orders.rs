//! Medical orders issued by doctors.
//!
//! An order carries a type tag (`tipo`) and a type-specific payload, flattened into the same
//! JSON object:
//!
//! ```json
//! { "id": "om-1", "tipo": "laboratorio", "estudio": "Glicemia", "estado": "pendiente", ... }
//! ```
//!
//! Orders are owned by the doctor workflow. Departments only read them, through the
//! materializer.

use crate::collection::{record_patch, Record};
use crate::constants::MEDICAL_ORDERS_KEY;
use crate::error::{WardError, WardResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ward_types::{DocumentText, Quantity};

/// Department that fulfils an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    #[serde(rename = "medicamento")]
    Medication,
    #[serde(rename = "laboratorio")]
    Laboratory,
    #[serde(rename = "imagen")]
    Imaging,
}

impl OrderKind {
    pub fn label(self) -> &'static str {
        match self {
            OrderKind::Medication => "medicamento",
            OrderKind::Laboratory => "laboratorio",
            OrderKind::Imaging => "imagen",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "en_proceso")]
    InProcess,
    #[serde(rename = "completada")]
    Completed,
    #[serde(rename = "cancelada")]
    Cancelled,
}

impl OrderStatus {
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pendiente",
            OrderStatus::InProcess => "en_proceso",
            OrderStatus::Completed => "completada",
            OrderStatus::Cancelled => "cancelada",
        }
    }
}

/// Clinical urgency, copied onto the fulfillment request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    #[serde(rename = "rutina")]
    Routine,
    #[serde(rename = "urgente")]
    Urgent,
}

/// Type-specific payload of an order, tagged by `tipo`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub enum OrderDetails {
    #[serde(rename = "medicamento")]
    Medication {
        #[serde(rename = "medicamento")]
        medication: String,
        #[serde(rename = "dosis")]
        dose: String,
        #[serde(rename = "via")]
        route: String,
        #[serde(rename = "frecuencia")]
        frequency: String,
        #[serde(rename = "cantidad")]
        quantity: Quantity,
    },
    #[serde(rename = "laboratorio")]
    Laboratory {
        #[serde(rename = "estudio")]
        study: String,
    },
    #[serde(rename = "imagen")]
    Imaging {
        #[serde(rename = "estudio")]
        study: String,
        #[serde(rename = "region", default, skip_serializing_if = "Option::is_none")]
        region: Option<String>,
    },
}

impl OrderDetails {
    pub fn kind(&self) -> OrderKind {
        match self {
            OrderDetails::Medication { .. } => OrderKind::Medication,
            OrderDetails::Laboratory { .. } => OrderKind::Laboratory,
            OrderDetails::Imaging { .. } => OrderKind::Imaging,
        }
    }

    fn validate(&self) -> WardResult<()> {
        match self {
            OrderDetails::Medication {
                medication,
                dose,
                route,
                frequency,
                ..
            } => {
                DocumentText::new("medication", medication)?;
                DocumentText::new("dose", dose)?;
                DocumentText::new("route", route)?;
                DocumentText::new("frequency", frequency)?;
            }
            OrderDetails::Laboratory { study } | OrderDetails::Imaging { study, .. } => {
                DocumentText::new("study", study)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalOrder {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "pacienteNombre")]
    pub patient_name: String,
    #[serde(rename = "medico")]
    pub doctor: String,
    #[serde(rename = "estado")]
    pub status: OrderStatus,
    #[serde(rename = "prioridad", default)]
    pub priority: Priority,
    #[serde(rename = "fecha")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub details: OrderDetails,
}

record_patch!(
    /// Doctor-side edits. Status changes go through [`MedicalOrder::cancel`]; the order type
    /// and payload are fixed at issue, since a request may already have been built from them.
    MedicalOrderPatch for MedicalOrder {
        priority: Priority,
        notes: Option<String>,
    }
);

impl Record for MedicalOrder {
    const STORAGE_KEY: &'static str = MEDICAL_ORDERS_KEY;
    type Patch = MedicalOrderPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

/// What a doctor fills in to issue an order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderDraft {
    pub patient_id: String,
    pub patient_name: String,
    pub doctor: String,
    pub priority: Priority,
    pub notes: Option<String>,
    pub details: OrderDetails,
}

impl MedicalOrder {
    /// Builds a pending order from a validated draft.
    ///
    /// # Errors
    ///
    /// Returns [`WardError::Value`] naming the first empty required field.
    pub fn issue(id: String, draft: OrderDraft, now: DateTime<Utc>) -> WardResult<Self> {
        let patient_id = DocumentText::new("patient id", &draft.patient_id)?;
        let patient_name = DocumentText::new("patient name", &draft.patient_name)?;
        let doctor = DocumentText::new("doctor", &draft.doctor)?;
        draft.details.validate()?;

        Ok(Self {
            id,
            patient_id: patient_id.into_string(),
            patient_name: patient_name.into_string(),
            doctor: doctor.into_string(),
            status: OrderStatus::Pending,
            priority: draft.priority,
            created_at: now,
            notes: draft
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            details: draft.details,
        })
    }

    pub fn kind(&self) -> OrderKind {
        self.details.kind()
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Cancels a pending or in-process order.
    pub fn cancel(&mut self) -> WardResult<()> {
        match self.status {
            OrderStatus::Pending | OrderStatus::InProcess => {
                self.status = OrderStatus::Cancelled;
                Ok(())
            }
            other => Err(WardError::InvalidTransition {
                from: other.label(),
                action: "cancel",
            }),
        }
    }
}
