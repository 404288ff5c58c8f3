//! Constants used throughout the ward core crate.
//!
//! Storage keys are shared with collections already written by the browser console, so they
//! must not change.

/// Default directory for the file-backed store when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "ward_data";

/// Extension of each per-key file written by the file-backed store.
pub const STORE_FILE_EXTENSION: &str = "json";

pub const APPOINTMENTS_KEY: &str = "appointments";
pub const INPATIENTS_KEY: &str = "inpatients";
pub const MEDICAL_ORDERS_KEY: &str = "medicalOrders";
pub const PHARMACY_REQUESTS_KEY: &str = "pharmacyRequests";
pub const LABORATORY_REQUESTS_KEY: &str = "laboratoryRequests";
pub const IMAGING_REQUESTS_KEY: &str = "imagingRequests";
pub const VITAL_SIGNS_KEY: &str = "vitalSigns";
pub const FLUID_BALANCE_KEY: &str = "fluidBalance";
pub const NURSING_NOTES_KEY: &str = "nursingNotes";
pub const EVOLUTION_NOTES_KEY: &str = "evolutionNotes";
pub const EPICRISIS_KEY: &str = "epicrisis";
pub const DEATH_CERTIFICATES_KEY: &str = "deathCertificates";
pub const PATIENT_BUDGETS_KEY: &str = "patientBudgets";

/// Key holding the role chosen on the selection screen.
pub const SELECTED_ROLE_KEY: &str = "selectedRole";

/// Id prefixes for records created by this crate.
pub const ORDER_ID_PREFIX: &str = "om";
pub const PHARMACY_ID_PREFIX: &str = "far";
pub const LABORATORY_ID_PREFIX: &str = "lab";
pub const IMAGING_ID_PREFIX: &str = "img";
pub const APPOINTMENT_ID_PREFIX: &str = "cita";
pub const INPATIENT_ID_PREFIX: &str = "hosp";
pub const VITAL_SIGNS_ID_PREFIX: &str = "sv";
