//! Record types, one per persisted collection.
//!
//! Field names on the wire are the Spanish camelCase keys the console has always stored
//! (`pacienteId`, `ordenMedicaId`, `estado`, ...); Rust field names are English.

pub mod admissions;
pub mod budgets;
pub mod clinical_notes;
pub mod imaging;
pub mod laboratory;
pub mod nursing;
pub mod orders;
pub mod pharmacy;

pub use admissions::{
    Appointment, AppointmentPatch, AppointmentStatus, Inpatient, InpatientPatch, InpatientStatus,
};
pub use budgets::{BudgetItem, BudgetStatus, PatientBudget, PatientBudgetPatch};
pub use clinical_notes::{
    DeathCertificate, DeathCertificatePatch, Epicrisis, EpicrisisPatch, EvolutionNote,
    EvolutionNotePatch,
};
pub use imaging::{ImagingAction, ImagingRequest, ImagingRequestPatch, ImagingStatus};
pub use laboratory::{
    LaboratoryAction, LaboratoryRequest, LaboratoryRequestPatch, LaboratoryStatus, SampleType,
};
pub use nursing::{
    FluidBalance, FluidBalancePatch, FluidIntake, FluidOutput, NursingNote, NursingNotePatch,
    Shift, VitalSigns, VitalSignsPatch,
};
pub use orders::{
    MedicalOrder, MedicalOrderPatch, OrderDetails, OrderDraft, OrderKind, OrderStatus, Priority,
};
pub use pharmacy::{
    PharmacyAction, PharmacyRequest, PharmacyRequestPatch, PharmacyReturn, PharmacyStatus,
};
