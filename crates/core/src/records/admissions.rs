//! Reception records: outpatient appointments and inpatient admissions.

use crate::collection::{record_patch, Record};
use crate::constants::{APPOINTMENTS_KEY, INPATIENTS_KEY};
use crate::error::{WardError, WardResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    #[serde(rename = "programada")]
    Scheduled,
    #[serde(rename = "atendida")]
    Attended,
    #[serde(rename = "cancelada")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "pacienteNombre")]
    pub patient_name: String,
    #[serde(rename = "medico")]
    pub doctor: String,
    #[serde(rename = "especialidad")]
    pub specialty: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    /// `HH:MM`
    #[serde(rename = "hora")]
    pub time: String,
    #[serde(rename = "motivo", default)]
    pub reason: String,
    #[serde(rename = "estado", default)]
    pub status: AppointmentStatus,
}

record_patch!(AppointmentPatch for Appointment {
    doctor: String,
    specialty: String,
    date: NaiveDate,
    time: String,
    reason: String,
    status: AppointmentStatus,
});

impl Record for Appointment {
    const STORAGE_KEY: &'static str = APPOINTMENTS_KEY;
    type Patch = AppointmentPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InpatientStatus {
    #[default]
    #[serde(rename = "hospitalizado")]
    Admitted,
    #[serde(rename = "alta")]
    Discharged,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inpatient {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "pacienteNombre")]
    pub patient_name: String,
    #[serde(rename = "cama")]
    pub bed: String,
    #[serde(rename = "servicio")]
    pub service: String,
    #[serde(rename = "fechaIngreso")]
    pub admitted_on: NaiveDate,
    #[serde(rename = "diagnostico")]
    pub diagnosis: String,
    #[serde(rename = "medicoTratante")]
    pub attending_doctor: String,
    #[serde(rename = "estado", default)]
    pub status: InpatientStatus,
    #[serde(rename = "fechaAlta", default, skip_serializing_if = "Option::is_none")]
    pub discharged_on: Option<NaiveDate>,
}

record_patch!(InpatientPatch for Inpatient {
    bed: String,
    service: String,
    diagnosis: String,
    attending_doctor: String,
});

impl Record for Inpatient {
    const STORAGE_KEY: &'static str = INPATIENTS_KEY;
    type Patch = InpatientPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

impl Inpatient {
    pub fn is_admitted(&self) -> bool {
        self.status == InpatientStatus::Admitted
    }

    /// Discharges the patient on `date`, which cannot precede admission.
    pub fn discharge(&mut self, date: NaiveDate) -> WardResult<()> {
        if !self.is_admitted() {
            return Err(WardError::InvalidTransition {
                from: "alta",
                action: "discharge",
            });
        }
        if date < self.admitted_on {
            return Err(WardError::InvalidInput(format!(
                "discharge date {date} is before admission on {}",
                self.admitted_on
            )));
        }

        self.status = InpatientStatus::Discharged;
        self.discharged_on = Some(date);
        Ok(())
    }
}
