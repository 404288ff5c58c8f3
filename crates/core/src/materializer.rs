//! Order-to-request reconciliation.
//!
//! Departments never see medical orders directly. Before showing a work queue, the caller runs
//! [`reconcile`], which creates one fulfillment request for every pending order of the
//! department's type that does not have one yet. Requests are matched to orders by
//! `ordenMedicaId` only, so running it again with the same orders creates nothing.

use crate::collection::Collection;
use crate::error::WardResult;
use crate::ids::IdSource;
use crate::lifecycle::FulfillmentRequest;
use crate::records::MedicalOrder;
use std::collections::HashSet;

/// Creates the missing requests for `orders` in `requests`.
///
/// Returns the number of requests created. New requests are appended in order sequence with
/// a single store write.
pub fn reconcile<R: FulfillmentRequest>(
    orders: &[MedicalOrder],
    requests: &mut Collection<R>,
    ids: &mut impl IdSource,
) -> WardResult<usize> {
    let batch: Vec<R> = {
        let mut known: HashSet<&str> = requests.iter().map(|r| r.source_order_id()).collect();

        orders
            .iter()
            .filter(|order| order.kind() == R::KIND && order.is_pending())
            .filter(|order| known.insert(order.id.as_str()))
            .filter_map(|order| R::from_order(ids.next_id(R::ID_PREFIX), order))
            .collect()
    };

    let created = requests.add_many(batch)?;
    if created > 0 {
        tracing::info!(
            kind = R::KIND.label(),
            created,
            "materialized fulfillment requests from pending orders"
        );
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedPolicy;
    use crate::ids::SequentialIds;
    use crate::lifecycle::Lifecycle;
    use crate::records::{
        ImagingRequest, ImagingStatus, LaboratoryAction, LaboratoryRequest, LaboratoryStatus,
        OrderDetails, OrderDraft, OrderStatus, PharmacyRequest, PharmacyStatus, Priority,
        SampleType,
    };
    use crate::storage::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;
    use std::sync::Arc;
    use ward_types::Quantity;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn order(id: &str, details: OrderDetails) -> MedicalOrder {
        MedicalOrder::issue(
            id.into(),
            OrderDraft {
                patient_id: "p-1".into(),
                patient_name: "Ana Pérez".into(),
                doctor: "Dr. Ruiz".into(),
                priority: Priority::Routine,
                notes: None,
                details,
            },
            t0(),
        )
        .unwrap()
    }

    fn lab(id: &str, study: &str) -> MedicalOrder {
        order(
            id,
            OrderDetails::Laboratory {
                study: study.into(),
            },
        )
    }

    fn medication(id: &str) -> MedicalOrder {
        order(
            id,
            OrderDetails::Medication {
                medication: "Paracetamol 500mg".into(),
                dose: "500mg".into(),
                route: "oral".into(),
                frequency: "c/6h".into(),
                quantity: Quantity::new("quantity", 12).unwrap(),
            },
        )
    }

    fn empty<R: FulfillmentRequest>() -> Collection<R> {
        Collection::load(Arc::new(MemoryStore::new()), SeedPolicy::Empty)
    }

    #[test]
    fn glicemia_scenario() {
        let orders = vec![lab("om-1", "Glicemia")];
        let mut requests = empty::<LaboratoryRequest>();
        let mut ids = SequentialIds::new();

        assert_eq!(reconcile(&orders, &mut requests, &mut ids).unwrap(), 1);
        let request = &requests.list()[0];
        assert_eq!(request.status, LaboratoryStatus::Pending);
        assert_eq!(request.source_order_id, "om-1");
        assert_eq!(request.study, "Glicemia");
        assert_eq!(request.requested_at, t0());

        let value = serde_json::to_value(request).unwrap();
        assert_eq!(value["estado"], "pendiente");
        assert_eq!(value["ordenMedicaId"], "om-1");

        let id = request.id.clone();
        let status = requests
            .advance(
                &id,
                LaboratoryAction::CollectSample {
                    sample_type: SampleType::Sangre,
                },
                t0(),
            )
            .unwrap();
        assert_eq!(status, Some(LaboratoryStatus::SampleCollected));
        let collected = requests.get(&id).unwrap();
        assert!(collected.collection_date.is_some());
        assert!(collected.collection_time.is_some());

        assert_eq!(reconcile(&orders, &mut requests, &mut ids).unwrap(), 0);
        let for_om1 = requests
            .iter()
            .filter(|r| r.source_order_id == "om-1")
            .count();
        assert_eq!(for_om1, 1);
    }

    #[test]
    fn only_pending_orders_of_matching_type_are_materialized() {
        let mut cancelled = lab("om-2", "Urea");
        cancelled.cancel().unwrap();
        let mut in_process = lab("om-3", "Creatinina");
        in_process.status = OrderStatus::InProcess;

        let orders = vec![
            lab("om-1", "Glicemia"),
            cancelled,
            in_process,
            medication("om-4"),
        ];

        let mut ids = SequentialIds::new();
        let mut labs = empty::<LaboratoryRequest>();
        let mut pharmacy = empty::<PharmacyRequest>();
        let mut imaging = empty::<ImagingRequest>();

        assert_eq!(reconcile(&orders, &mut labs, &mut ids).unwrap(), 1);
        assert_eq!(reconcile(&orders, &mut pharmacy, &mut ids).unwrap(), 1);
        assert_eq!(reconcile(&orders, &mut imaging, &mut ids).unwrap(), 0);

        assert_eq!(labs.list()[0].source_order_id, "om-1");
        assert_eq!(pharmacy.list()[0].source_order_id, "om-4");
        assert!(pharmacy.list()[0].id.starts_with("far-"));
    }

    #[test]
    fn existing_requests_block_rematerialization_even_when_closed() {
        let orders = vec![lab("om-1", "Glicemia")];
        let mut ids = SequentialIds::new();
        let mut labs = empty::<LaboratoryRequest>();
        reconcile(&orders, &mut labs, &mut ids).unwrap();

        let id = labs.list()[0].id.clone();
        labs.modify(&id, |r| {
            r.status = LaboratoryStatus::Completed;
            Ok(())
        })
        .unwrap();

        assert_eq!(reconcile(&orders, &mut labs, &mut ids).unwrap(), 0);
        assert_eq!(labs.len(), 1);
        assert!(labs.open_requests().is_empty());
    }

    #[test]
    fn duplicate_order_ids_in_input_yield_one_request() {
        let orders = vec![lab("om-1", "Glicemia"), lab("om-1", "Glicemia")];
        let mut labs = empty::<LaboratoryRequest>();
        assert_eq!(
            reconcile(&orders, &mut labs, &mut SequentialIds::new()).unwrap(),
            1
        );
    }

    fn arb_order() -> impl Strategy<Value = MedicalOrder> {
        (0u8..3, 0u8..4, 0u32..8).prop_map(|(kind, status, n)| {
            let id = format!("om-{n}");
            let mut built = match kind {
                0 => lab(&id, "Glicemia"),
                1 => medication(&id),
                _ => order(
                    &id,
                    OrderDetails::Imaging {
                        study: "TAC".into(),
                        region: None,
                    },
                ),
            };
            built.status = match status {
                0 | 1 => OrderStatus::Pending,
                2 => OrderStatus::Completed,
                _ => OrderStatus::Cancelled,
            };
            built
        })
    }

    proptest! {
        #[test]
        fn reconcile_is_idempotent(generated in proptest::collection::vec(arb_order(), 0..12)) {
            // Stored order ids are unique, whatever their type.
            let mut seen = HashSet::new();
            let orders: Vec<MedicalOrder> = generated
                .into_iter()
                .filter(|o| seen.insert(o.id.clone()))
                .collect();

            let mut labs = empty::<LaboratoryRequest>();
            let mut pharmacy = empty::<PharmacyRequest>();
            let mut imaging = empty::<ImagingRequest>();
            let mut ids = SequentialIds::new();

            for _ in 0..2 {
                reconcile(&orders, &mut labs, &mut ids).unwrap();
                reconcile(&orders, &mut pharmacy, &mut ids).unwrap();
                reconcile(&orders, &mut imaging, &mut ids).unwrap();
            }

            let pending: HashSet<&str> = orders
                .iter()
                .filter(|o| o.is_pending())
                .map(|o| o.id.as_str())
                .collect();
            prop_assert_eq!(labs.len() + pharmacy.len() + imaging.len(), pending.len());

            for id in pending {
                let matching = labs.iter().filter(|r| r.source_order_id == id).count()
                    + pharmacy.iter().filter(|r| r.source_order_id == id).count()
                    + imaging.iter().filter(|r| r.source_order_id == id).count();
                prop_assert_eq!(matching, 1);
            }
            prop_assert!(labs.iter().all(|r| r.status == LaboratoryStatus::initial()));
            prop_assert!(pharmacy.iter().all(|r| r.status == PharmacyStatus::initial()));
            prop_assert!(imaging.iter().all(|r| r.status == ImagingStatus::initial()));
        }
    }
}
