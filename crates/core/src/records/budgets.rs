//! Patient cost estimates prepared by the budgeting office.

use crate::collection::{record_patch, Record};
use crate::constants::PATIENT_BUDGETS_KEY;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ward_types::Measurement;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    #[default]
    #[serde(rename = "borrador")]
    Draft,
    #[serde(rename = "aprobado")]
    Approved,
    #[serde(rename = "rechazado")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "precioUnitario")]
    pub unit_price: Measurement,
}

impl BudgetItem {
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price.get()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientBudget {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "pacienteNombre")]
    pub patient_name: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "conceptos", default)]
    pub items: Vec<BudgetItem>,
    #[serde(rename = "estado", default)]
    pub status: BudgetStatus,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

record_patch!(PatientBudgetPatch for PatientBudget {
    items: Vec<BudgetItem>,
    status: BudgetStatus,
    notes: Option<String>,
});

impl Record for PatientBudget {
    const STORAGE_KEY: &'static str = PATIENT_BUDGETS_KEY;
    type Patch = PatientBudgetPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

impl PatientBudget {
    pub fn total(&self) -> f64 {
        self.items.iter().map(BudgetItem::subtotal).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;
    use crate::config::SeedPolicy;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn price(value: f64) -> Measurement {
        Measurement::new("unit price", value).unwrap()
    }

    #[test]
    fn total_sums_line_items() {
        let budget = PatientBudget {
            id: "pre-1".into(),
            patient_id: "p-1".into(),
            patient_name: "Ana Pérez".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            items: vec![
                BudgetItem {
                    description: "Día cama".into(),
                    quantity: 3,
                    unit_price: price(120.0),
                },
                BudgetItem {
                    description: "Hemograma".into(),
                    quantity: 1,
                    unit_price: price(15.5),
                },
            ],
            status: BudgetStatus::Draft,
            notes: None,
        };
        assert_eq!(budget.total(), 375.5);
    }

    #[test]
    fn empty_budget_totals_zero() {
        let json = r#"{"id":"pre-2","pacienteId":"p-2","pacienteNombre":"Luis","fecha":"2024-06-02"}"#;
        let budget: PatientBudget = serde_json::from_str(json).unwrap();
        assert_eq!(budget.total(), 0.0);
        assert_eq!(budget.status, BudgetStatus::Draft);
    }

    #[test]
    fn null_unit_price_is_rejected() {
        let json = r#"{"id":"pre-3","pacienteId":"p-3","pacienteNombre":"Rosa","fecha":"2024-06-03",
            "conceptos":[{"descripcion":"Rx","cantidad":1,"precioUnitario":null}]}"#;
        assert!(serde_json::from_str::<PatientBudget>(json).is_err());
    }

    fn arb_item() -> impl Strategy<Value = BudgetItem> {
        ("[a-zA-Z ]{1,16}", 0u32..50, 0i32..1_000_000).prop_map(|(description, quantity, cents)| {
            BudgetItem {
                description,
                quantity,
                unit_price: price(f64::from(cents) / 100.0),
            }
        })
    }

    fn arb_budgets() -> impl Strategy<Value = Vec<PatientBudget>> {
        proptest::collection::vec(proptest::collection::vec(arb_item(), 0..5), 0..6).prop_map(
            |item_lists| {
                item_lists
                    .into_iter()
                    .enumerate()
                    .map(|(i, items)| PatientBudget {
                        id: format!("pre-{i}"),
                        patient_id: "p-1".into(),
                        patient_name: "Ana Pérez".into(),
                        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                        items,
                        status: BudgetStatus::Approved,
                        notes: None,
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn budgets_survive_reload(budgets in arb_budgets()) {
            let store = Arc::new(MemoryStore::new());
            let mut stored = Collection::<PatientBudget>::load(store.clone(), SeedPolicy::Empty);
            stored.add_many(budgets.clone()).unwrap();
            stored.flush().unwrap();

            let reloaded = Collection::<PatientBudget>::load(store, SeedPolicy::Empty);
            prop_assert_eq!(reloaded.list(), budgets.as_slice());
        }
    }
}
