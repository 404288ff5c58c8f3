//! The per-session aggregate of every collection.
//!
//! A [`Hospital`] is built once per process from a single backing store and passed by
//! reference to whatever drives it (the CLI, tests). Each collection is public; the methods
//! here cover the operations that span more than one collection.

use crate::collection::Collection;
use crate::config::{CoreConfig, SeedPolicy};
use crate::constants::ORDER_ID_PREFIX;
use crate::error::WardResult;
use crate::ids::IdSource;
use crate::lifecycle::FulfillmentRequest;
use crate::materializer::reconcile;
use crate::records::{
    Appointment, DeathCertificate, Epicrisis, EvolutionNote, FluidBalance, ImagingRequest,
    Inpatient, LaboratoryRequest, MedicalOrder, NursingNote, OrderDraft, PatientBudget,
    PharmacyRequest, VitalSigns,
};
use crate::session::Session;
use crate::storage::{FileStore, KeyValueStore};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

pub struct Hospital {
    pub appointments: Collection<Appointment>,
    pub inpatients: Collection<Inpatient>,
    pub medical_orders: Collection<MedicalOrder>,
    pub pharmacy_requests: Collection<PharmacyRequest>,
    pub laboratory_requests: Collection<LaboratoryRequest>,
    pub imaging_requests: Collection<ImagingRequest>,
    pub vital_signs: Collection<VitalSigns>,
    pub fluid_balances: Collection<FluidBalance>,
    pub nursing_notes: Collection<NursingNote>,
    pub evolution_notes: Collection<EvolutionNote>,
    pub epicrises: Collection<Epicrisis>,
    pub death_certificates: Collection<DeathCertificate>,
    pub patient_budgets: Collection<PatientBudget>,
    pub session: Session,
}

impl Hospital {
    /// Loads every collection from `store`.
    pub fn open(store: Arc<dyn KeyValueStore>, seed: SeedPolicy) -> Self {
        Self {
            appointments: Collection::load(store.clone(), seed),
            inpatients: Collection::load(store.clone(), seed),
            medical_orders: Collection::load(store.clone(), seed),
            pharmacy_requests: Collection::load(store.clone(), seed),
            laboratory_requests: Collection::load(store.clone(), seed),
            imaging_requests: Collection::load(store.clone(), seed),
            vital_signs: Collection::load(store.clone(), seed),
            fluid_balances: Collection::load(store.clone(), seed),
            nursing_notes: Collection::load(store.clone(), seed),
            evolution_notes: Collection::load(store.clone(), seed),
            epicrises: Collection::load(store.clone(), seed),
            death_certificates: Collection::load(store.clone(), seed),
            patient_budgets: Collection::load(store.clone(), seed),
            session: Session::new(store),
        }
    }

    /// Opens a file-backed hospital in the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WardError::Storage`] if the data directory cannot be created.
    pub fn open_from_config(cfg: &CoreConfig) -> WardResult<Self> {
        let store = FileStore::open(cfg.data_dir())?;
        tracing::debug!(data_dir = %cfg.data_dir().display(), "opened file store");
        Ok(Self::open(Arc::new(store), cfg.seed_policy()))
    }

    /// Issues a new pending order and returns it.
    pub fn issue_order(
        &mut self,
        draft: OrderDraft,
        ids: &mut impl IdSource,
        now: DateTime<Utc>,
    ) -> WardResult<MedicalOrder> {
        let order = MedicalOrder::issue(ids.next_id(ORDER_ID_PREFIX), draft, now)?;
        self.medical_orders.add(order.clone())?;
        tracing::info!(id = %order.id, kind = order.kind().label(), "medical order issued");
        Ok(order)
    }

    /// Cancels an order. Returns `false` if no order has that id.
    ///
    /// A request already materialized from the order stays with its department.
    pub fn cancel_order(&mut self, id: &str) -> WardResult<bool> {
        let cancelled = self.medical_orders.modify(id, MedicalOrder::cancel)?;
        Ok(cancelled.is_some())
    }

    /// Discharges an inpatient. Returns `false` if no admission has that id.
    pub fn discharge(&mut self, id: &str, date: NaiveDate) -> WardResult<bool> {
        let discharged = self.inpatients.modify(id, |patient| patient.discharge(date))?;
        Ok(discharged.is_some())
    }

    /// Materializes pending medication orders and returns the open pharmacy requests.
    pub fn pharmacy_queue(&mut self, ids: &mut impl IdSource) -> WardResult<Vec<&PharmacyRequest>> {
        work_queue(&self.medical_orders, &mut self.pharmacy_requests, ids)
    }

    pub fn laboratory_queue(
        &mut self,
        ids: &mut impl IdSource,
    ) -> WardResult<Vec<&LaboratoryRequest>> {
        work_queue(&self.medical_orders, &mut self.laboratory_requests, ids)
    }

    pub fn imaging_queue(&mut self, ids: &mut impl IdSource) -> WardResult<Vec<&ImagingRequest>> {
        work_queue(&self.medical_orders, &mut self.imaging_requests, ids)
    }

    /// Delivered and returned pharmacy requests.
    pub fn pharmacy_history(&self) -> Vec<&PharmacyRequest> {
        self.pharmacy_requests.closed_requests()
    }

    pub fn laboratory_history(&self) -> Vec<&LaboratoryRequest> {
        self.laboratory_requests.closed_requests()
    }

    pub fn imaging_history(&self) -> Vec<&ImagingRequest> {
        self.imaging_requests.closed_requests()
    }
}

fn work_queue<'a, R: FulfillmentRequest>(
    orders: &Collection<MedicalOrder>,
    requests: &'a mut Collection<R>,
    ids: &mut impl IdSource,
) -> WardResult<Vec<&'a R>> {
    reconcile(orders.list(), requests, ids)?;
    Ok(requests.open_requests())
}
