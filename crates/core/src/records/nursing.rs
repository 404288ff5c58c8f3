//! Nursing sheets: vital signs, fluid balance and shift notes.

use crate::collection::{record_patch, Record};
use crate::constants::{FLUID_BALANCE_KEY, NURSING_NOTES_KEY, VITAL_SIGNS_KEY};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ward_types::Measurement;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    #[serde(rename = "manana")]
    Morning,
    #[serde(rename = "tarde")]
    Afternoon,
    #[serde(rename = "noche")]
    Night,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "fecha")]
    pub taken_at: DateTime<Utc>,
    /// Systolic/diastolic, e.g. `120/80`.
    #[serde(rename = "presionArterial")]
    pub blood_pressure: String,
    #[serde(rename = "frecuenciaCardiaca")]
    pub heart_rate: u16,
    #[serde(rename = "frecuenciaRespiratoria")]
    pub respiratory_rate: u16,
    #[serde(rename = "temperatura")]
    pub temperature: Measurement,
    #[serde(rename = "saturacionOxigeno")]
    pub oxygen_saturation: u8,
    #[serde(rename = "glicemia", default, skip_serializing_if = "Option::is_none")]
    pub glucose: Option<u16>,
    #[serde(rename = "registradoPor")]
    pub recorded_by: String,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

record_patch!(VitalSignsPatch for VitalSigns {
    blood_pressure: String,
    heart_rate: u16,
    respiratory_rate: u16,
    temperature: Measurement,
    oxygen_saturation: u8,
    glucose: Option<u16>,
    notes: Option<String>,
});

impl Record for VitalSigns {
    const STORAGE_KEY: &'static str = VITAL_SIGNS_KEY;
    type Patch = VitalSignsPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

/// Millilitres taken in during a shift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FluidIntake {
    #[serde(rename = "oral", default)]
    pub oral: Measurement,
    #[serde(rename = "intravenoso", default)]
    pub intravenous: Measurement,
    #[serde(rename = "otros", default)]
    pub other: Measurement,
}

impl FluidIntake {
    pub fn total(&self) -> f64 {
        self.oral.get() + self.intravenous.get() + self.other.get()
    }
}

/// Millilitres eliminated during a shift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FluidOutput {
    #[serde(rename = "orina", default)]
    pub urine: Measurement,
    #[serde(rename = "drenajes", default)]
    pub drains: Measurement,
    #[serde(rename = "vomito", default)]
    pub vomit: Measurement,
    #[serde(rename = "otros", default)]
    pub other: Measurement,
}

impl FluidOutput {
    pub fn total(&self) -> f64 {
        self.urine.get() + self.drains.get() + self.vomit.get() + self.other.get()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluidBalance {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "turno")]
    pub shift: Shift,
    #[serde(rename = "ingresos", default)]
    pub intake: FluidIntake,
    #[serde(rename = "egresos", default)]
    pub output: FluidOutput,
    #[serde(rename = "registradoPor")]
    pub recorded_by: String,
}

record_patch!(FluidBalancePatch for FluidBalance {
    intake: FluidIntake,
    output: FluidOutput,
});

impl Record for FluidBalance {
    const STORAGE_KEY: &'static str = FLUID_BALANCE_KEY;
    type Patch = FluidBalancePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
    }
}

impl FluidBalance {
    /// Intake minus output, in millilitres.
    pub fn net_balance(&self) -> f64 {
        self.intake.total() - self.output.total()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NursingNote {
    pub id: String,
    #[serde(rename = "pacienteId")]
    pub patient_id: String,
    #[serde(rename = "fecha")]
    pub written_at: DateTime<Utc>,
    #[serde(rename = "turno")]
    pub shift: Shift,
    #[serde(rename = "nota")]
    pub text: String,
    #[serde(rename = "enfermera")]
    pub nurse: String,
}

record_patch!(NursingNotePatch for NursingNote { text: String });

impl Record for NursingNote {
    const STORAGE_KEY: &'static str = NURSING_NOTES_KEY;
    type Patch = NursingNotePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn patient_id(&self) -> &str {
        &self.patient_id
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

    fn ml(value: f64) -> Measurement {
        Measurement::new("volume", value).unwrap()
    }

    #[test]
    fn net_balance_is_intake_minus_output() {
        let balance = FluidBalance {
            id: "bh-1".into(),
            patient_id: "p-1".into(),
            date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            shift: Shift::Night,
            intake: FluidIntake {
                oral: ml(400.0),
                intravenous: ml(1000.0),
                other: ml(0.0),
            },
            output: FluidOutput {
                urine: ml(900.0),
                drains: ml(150.0),
                vomit: ml(0.0),
                other: ml(50.0),
            },
            recorded_by: "Enf. Mora".into(),
        };
        assert_eq!(balance.intake.total(), 1400.0);
        assert_eq!(balance.output.total(), 1100.0);
        assert_eq!(balance.net_balance(), 300.0);
    }

    #[test]
    fn shift_wire_names() {
        assert_eq!(serde_json::to_string(&Shift::Morning).unwrap(), "\"manana\"");
        let shift: Shift = serde_json::from_str("\"noche\"").unwrap();
        assert_eq!(shift, Shift::Night);
    }

    #[test]
    fn vital_signs_optional_fields_default() {
        let json = r#"{"id":"sv-1","pacienteId":"p-1","fecha":"2024-04-02T06:00:00Z",
            "presionArterial":"118/76","frecuenciaCardiaca":82,"frecuenciaRespiratoria":18,
            "temperatura":37.2,"saturacionOxigeno":96,"registradoPor":"Enf. Mora"}"#;
        let vitals: VitalSigns = serde_json::from_str(json).unwrap();
        assert_eq!(vitals.glucose, None);
        assert_eq!(vitals.oxygen_saturation, 96);
    }

    #[test]
    fn vital_signs_reject_null_temperature() {
        let json = r#"{"id":"sv-1","pacienteId":"p-1","fecha":"2024-04-02T06:00:00Z",
            "presionArterial":"118/76","frecuenciaCardiaca":82,"frecuenciaRespiratoria":18,
            "temperatura":null,"saturacionOxigeno":96,"registradoPor":"Enf. Mora"}"#;
        assert!(serde_json::from_str::<VitalSigns>(json).is_err());
    }

    /// Tenths keep the decimal text short enough to parse back bit-for-bit.
    fn tenths(max: i32) -> impl Strategy<Value = Measurement> {
        (0..max).prop_map(|k| Measurement::new("value", f64::from(k) / 10.0).unwrap())
    }

    fn arb_vitals() -> impl Strategy<Value = VitalSigns> {
        (
            0i64..100_000,
            tenths(450),
            any::<u16>(),
            any::<u8>(),
            proptest::option::of(any::<u16>()),
        )
            .prop_map(|(offset, temperature, heart_rate, saturation, glucose)| VitalSigns {
                id: String::new(),
                patient_id: "p-1".into(),
                taken_at: DateTime::from_timestamp(1_700_000_000 + offset, 0).unwrap(),
                blood_pressure: "120/80".into(),
                heart_rate,
                respiratory_rate: 16,
                temperature,
                oxygen_saturation: saturation,
                glucose,
                recorded_by: "Enf. Mora".into(),
                notes: None,
            })
    }

    fn arb_balance() -> impl Strategy<Value = FluidBalance> {
        (
            proptest::array::uniform3(tenths(30_000)),
            proptest::array::uniform4(tenths(30_000)),
        )
            .prop_map(|([oral, intravenous, other], [urine, drains, vomit, lost])| {
                FluidBalance {
                    id: String::new(),
                    patient_id: "p-1".into(),
                    date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
                    shift: Shift::Afternoon,
                    intake: FluidIntake {
                        oral,
                        intravenous,
                        other,
                    },
                    output: FluidOutput {
                        urine,
                        drains,
                        vomit,
                        other: lost,
                    },
                    recorded_by: "Enf. Mora".into(),
                }
            })
    }

    /// Gives each generated record a distinct id.
    fn numbered<R: Record + std::fmt::Debug>(
        record: impl Strategy<Value = R>,
        prefix: &'static str,
        set_id: fn(&mut R, String),
    ) -> impl Strategy<Value = Vec<R>> {
        proptest::collection::vec(record, 0..8).prop_map(move |mut records| {
            for (i, record) in records.iter_mut().enumerate() {
                set_id(record, format!("{prefix}-{i}"));
            }
            records
        })
    }

    proptest! {
        #[test]
        fn vital_signs_survive_reload(
            records in numbered(arb_vitals(), "sv", |r, id| r.id = id)
        ) {
            let store = Arc::new(MemoryStore::new());
            let mut vitals = Collection::<VitalSigns>::load(store.clone(), SeedPolicy::Empty);
            prop_assert_eq!(vitals.add_many(records.clone()).unwrap(), records.len());
            vitals.flush().unwrap();

            let reloaded = Collection::<VitalSigns>::load(store, SeedPolicy::Empty);
            prop_assert_eq!(reloaded.list(), records.as_slice());
        }

        #[test]
        fn fluid_balances_survive_reload(
            records in numbered(arb_balance(), "bh", |r, id| r.id = id)
        ) {
            let store = Arc::new(MemoryStore::new());
            let mut balances = Collection::<FluidBalance>::load(store.clone(), SeedPolicy::Empty);
            balances.add_many(records.clone()).unwrap();
            balances.flush().unwrap();

            let reloaded = Collection::<FluidBalance>::load(store, SeedPolicy::Empty);
            prop_assert_eq!(reloaded.list(), records.as_slice());
        }
    }
}
