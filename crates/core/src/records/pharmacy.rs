//! Pharmacy dispensing requests.

use crate::collection::{parse_seed, record_patch, Record};
use crate::constants::{PHARMACY_ID_PREFIX, PHARMACY_REQUESTS_KEY};
use crate::error::{WardError, WardResult};
use crate::lifecycle::{ensure_step, FulfillmentRequest, Lifecycle};
use crate::records::{MedicalOrder, OrderDetails, OrderKind, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ward_types::{DocumentText, Quantity};

const SEED: &str = include_str!("../../seeds/pharmacy_requests.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PharmacyStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "preparando")]
    Preparing,
    #[serde(rename = "listo")]
    Ready,
    #[serde(rename = "entregado")]
    Delivered,
    #[serde(rename = "devuelto")]
    Returned,
}

impl Lifecycle for PharmacyStatus {
    const SEQUENCE: &'static [Self] = &[
        PharmacyStatus::Pending,
        PharmacyStatus::Preparing,
        PharmacyStatus::Ready,
        PharmacyStatus::Delivered,
        PharmacyStatus::Returned,
    ];

    fn label(self) -> &'static str {
        match self {
            PharmacyStatus::Pending => "pendiente",
            PharmacyStatus::Preparing => "preparando",
            PharmacyStatus::Ready => "listo",
            PharmacyStatus::Delivered => "entregado",
            PharmacyStatus::Returned => "devuelto",
        }
    }

    // Delivered leaves the queue even though a return may still follow.
    fn is_terminal(self) -> bool {
        matches!(self, PharmacyStatus::Delivered | PharmacyStatus::Returned)
    }
}

/// Medication handed back after delivery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PharmacyReturn {
    #[serde(rename = "motivo")]
    pub reason: DocumentText,
    #[serde(rename = "cantidad")]
    pub quantity: Quantity,
    #[serde(rename = "fecha")]
    pub returned_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PharmacyRequest {
    pub id: String,
    #[serde(rename = "ordenMedicaId")]
    pub source_order_id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "pacienteNombre")]
    pub patient_name: String,
    #[serde(rename = "medico")]
    pub doctor: String,
    #[serde(rename = "medicamento")]
    pub medication: String,
    #[serde(rename = "dosis")]
    pub dose: String,
    #[serde(rename = "via")]
    pub route: String,
    #[serde(rename = "frecuencia")]
    pub frequency: String,
    #[serde(rename = "cantidad")]
    pub quantity: Quantity,
    #[serde(rename = "prioridad", default)]
    pub priority: Priority,
    #[serde(rename = "estado")]
    pub status: PharmacyStatus,
    #[serde(rename = "fechaSolicitud")]
    pub requested_at: DateTime<Utc>,
    #[serde(rename = "fechaPreparacion", default, skip_serializing_if = "Option::is_none")]
    pub preparing_at: Option<DateTime<Utc>>,
    #[serde(rename = "fechaListo", default, skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<DateTime<Utc>>,
    #[serde(rename = "fechaEntrega", default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(rename = "cantidadEntregada", default, skip_serializing_if = "Option::is_none")]
    pub delivered_quantity: Option<Quantity>,
    #[serde(rename = "recibidoPor", default, skip_serializing_if = "Option::is_none")]
    pub received_by: Option<String>,
    #[serde(rename = "devolucion", default, skip_serializing_if = "Option::is_none")]
    pub returned: Option<PharmacyReturn>,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

record_patch!(PharmacyRequestPatch for PharmacyRequest {
    priority: Priority,
    notes: Option<String>,
});

impl Record for PharmacyRequest {
    const STORAGE_KEY: &'static str = PHARMACY_REQUESTS_KEY;
    type Patch = PharmacyRequestPatch;

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
pub enum PharmacyAction {
    Prepare,
    MarkReady,
    Deliver {
        quantity: Quantity,
        received_by: Option<String>,
    },
    Return {
        reason: DocumentText,
        quantity: Quantity,
    },
}

impl PharmacyAction {
    fn name(&self) -> &'static str {
        match self {
            PharmacyAction::Prepare => "prepare",
            PharmacyAction::MarkReady => "mark ready",
            PharmacyAction::Deliver { .. } => "deliver",
            PharmacyAction::Return { .. } => "return",
        }
    }

    fn target(&self) -> PharmacyStatus {
        match self {
            PharmacyAction::Prepare => PharmacyStatus::Preparing,
            PharmacyAction::MarkReady => PharmacyStatus::Ready,
            PharmacyAction::Deliver { .. } => PharmacyStatus::Delivered,
            PharmacyAction::Return { .. } => PharmacyStatus::Returned,
        }
    }
}

impl FulfillmentRequest for PharmacyRequest {
    type Status = PharmacyStatus;
    type Action = PharmacyAction;

    const KIND: OrderKind = OrderKind::Medication;
    const ID_PREFIX: &'static str = PHARMACY_ID_PREFIX;

    fn source_order_id(&self) -> &str {
        &self.source_order_id
    }

    fn status(&self) -> PharmacyStatus {
        self.status
    }

    fn from_order(id: String, order: &MedicalOrder) -> Option<Self> {
        let OrderDetails::Medication {
            medication,
            dose,
            route,
            frequency,
            quantity,
        } = &order.details
        else {
            return None;
        };

        Some(Self {
            id,
            source_order_id: order.id.clone(),
            patient_id: order.patient_id.clone(),
            patient_name: order.patient_name.clone(),
            doctor: order.doctor.clone(),
            medication: medication.clone(),
            dose: dose.clone(),
            route: route.clone(),
            frequency: frequency.clone(),
            quantity: *quantity,
            priority: order.priority,
            status: PharmacyStatus::initial(),
            requested_at: order.created_at,
            preparing_at: None,
            ready_at: None,
            delivered_at: None,
            delivered_quantity: None,
            received_by: None,
            returned: None,
            notes: order.notes.clone(),
        })
    }

    fn apply(&mut self, action: PharmacyAction, now: DateTime<Utc>) -> WardResult<PharmacyStatus> {
        let target = action.target();
        ensure_step(self.status, target, action.name())?;

        match action {
            PharmacyAction::Prepare => self.preparing_at = Some(now),
            PharmacyAction::MarkReady => self.ready_at = Some(now),
            PharmacyAction::Deliver {
                quantity,
                received_by,
            } => {
                if quantity > self.quantity {
                    return Err(WardError::InvalidInput(format!(
                        "cannot deliver {quantity} units, only {} were ordered",
                        self.quantity
                    )));
                }
                self.delivered_at = Some(now);
                self.delivered_quantity = Some(quantity);
                self.received_by = received_by
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty());
            }
            PharmacyAction::Return { reason, quantity } => {
                let delivered = self.delivered_quantity.unwrap_or(self.quantity);
                if quantity > delivered {
                    return Err(WardError::ReturnExceedsDelivered {
                        returned: quantity.get(),
                        delivered: delivered.get(),
                    });
                }
                self.returned = Some(PharmacyReturn {
                    reason,
                    quantity,
                    returned_at: now,
                });
            }
        }

        self.status = target;
        Ok(target)
    }
}
