use anyhow::Context;
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ward_core::records::{
    Appointment, AppointmentStatus, ImagingAction, ImagingRequest, Inpatient, InpatientStatus,
    LaboratoryAction, LaboratoryRequest, MedicalOrder, OrderDetails, OrderDraft, OrderStatus,
    PharmacyAction, PharmacyRequest, Priority, SampleType, VitalSigns,
};
use ward_core::constants::{APPOINTMENT_ID_PREFIX, INPATIENT_ID_PREFIX, VITAL_SIGNS_ID_PREFIX};
use ward_core::{CoreConfig, Hospital, IdSource, Lifecycle, RandomIds, Role};
use ward_types::{DocumentText, Measurement, Quantity};

#[derive(Parser)]
#[command(name = "ward")]
#[command(about = "Hospital admin console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Select, show or clear the staff role
    Role {
        #[command(subcommand)]
        action: RoleCommand,
    },
    /// Issue, list and cancel medical orders
    Order {
        #[command(subcommand)]
        action: OrderCommand,
    },
    /// Pharmacy work queue
    Pharmacy {
        #[command(subcommand)]
        action: PharmacyCommand,
    },
    /// Laboratory work queue
    Lab {
        #[command(subcommand)]
        action: LabCommand,
    },
    /// Imaging work queue
    Imaging {
        #[command(subcommand)]
        action: ImagingCommand,
    },
    /// Outpatient appointments
    Appointment {
        #[command(subcommand)]
        action: AppointmentCommand,
    },
    /// Hospital admissions
    Inpatient {
        #[command(subcommand)]
        action: InpatientCommand,
    },
    /// Nursing vital signs
    Vitals {
        #[command(subcommand)]
        action: VitalsCommand,
    },
    /// Dump a stored collection as JSON
    List {
        collection: CollectionName,
    },
}

#[derive(Subcommand)]
enum RoleCommand {
    /// Remember a role for the next session
    Set { role: Role },
    Show,
    Clear,
}

/// Fields shared by every order type.
#[derive(clap::Args)]
struct OrderHeader {
    #[arg(long)]
    patient_id: String,
    #[arg(long)]
    patient_name: String,
    #[arg(long)]
    doctor: String,
    /// Mark the order as urgent
    #[arg(long)]
    urgent: bool,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Subcommand)]
enum OrderCommand {
    Medication {
        #[command(flatten)]
        header: OrderHeader,
        #[arg(long)]
        medication: String,
        #[arg(long)]
        dose: String,
        #[arg(long)]
        route: String,
        #[arg(long)]
        frequency: String,
        #[arg(long)]
        quantity: u32,
    },
    Laboratory {
        #[command(flatten)]
        header: OrderHeader,
        #[arg(long)]
        study: String,
    },
    Imaging {
        #[command(flatten)]
        header: OrderHeader,
        #[arg(long)]
        study: String,
        #[arg(long)]
        region: Option<String>,
    },
    /// List orders, optionally for one patient
    List {
        #[arg(long)]
        patient_id: Option<String>,
    },
    Cancel { id: String },
}

#[derive(Subcommand)]
enum PharmacyCommand {
    /// Materialize pending orders and show open requests
    Queue,
    /// Show delivered and returned requests
    History,
    Prepare { id: String },
    Ready { id: String },
    Deliver {
        id: String,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        received_by: Option<String>,
    },
    Return {
        id: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        quantity: u32,
    },
}

#[derive(Subcommand)]
enum LabCommand {
    Queue,
    History,
    /// Record sample collection
    Collect {
        id: String,
        #[arg(long)]
        sample: SampleType,
    },
    Start { id: String },
    Complete {
        id: String,
        #[arg(long)]
        results: String,
    },
}

#[derive(Subcommand)]
enum ImagingCommand {
    Queue,
    History,
    Start { id: String },
    Complete {
        id: String,
        #[arg(long)]
        report: String,
    },
}

#[derive(Subcommand)]
enum AppointmentCommand {
    Add {
        #[arg(long)]
        patient_id: String,
        #[arg(long)]
        patient_name: String,
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        specialty: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Time (HH:MM)
        #[arg(long, value_parser = parse_hhmm)]
        time: NaiveTime,
        #[arg(long, default_value = "")]
        reason: String,
    },
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum InpatientCommand {
    Admit {
        #[arg(long)]
        patient_id: String,
        #[arg(long)]
        patient_name: String,
        #[arg(long)]
        bed: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        diagnosis: String,
        #[arg(long)]
        doctor: String,
        /// Admission date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Discharge {
        id: String,
        /// Discharge date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum VitalsCommand {
    Add {
        #[arg(long)]
        patient_id: String,
        /// Systolic/diastolic, e.g. 120/80
        #[arg(long)]
        blood_pressure: String,
        #[arg(long)]
        heart_rate: u16,
        #[arg(long)]
        respiratory_rate: u16,
        /// Degrees Celsius
        #[arg(long)]
        temperature: Measurement,
        #[arg(long)]
        saturation: u8,
        #[arg(long)]
        glucose: Option<u16>,
        #[arg(long)]
        recorded_by: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CollectionName {
    Appointments,
    Inpatients,
    MedicalOrders,
    PharmacyRequests,
    LaboratoryRequests,
    ImagingRequests,
    VitalSigns,
    FluidBalance,
    NursingNotes,
    EvolutionNotes,
    Epicrisis,
    DeathCertificates,
    PatientBudgets,
}

fn parse_hhmm(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M")
}

fn priority(urgent: bool) -> Priority {
    if urgent {
        Priority::Urgent
    } else {
        Priority::Routine
    }
}

fn quantity(value: u32) -> anyhow::Result<Quantity> {
    Ok(Quantity::new("quantity", value)?)
}

fn draft(header: OrderHeader, details: OrderDetails) -> OrderDraft {
    OrderDraft {
        patient_id: header.patient_id,
        patient_name: header.patient_name,
        doctor: header.doctor,
        priority: priority(header.urgent),
        notes: header.notes,
        details,
    }
}

fn print_order(order: &MedicalOrder) {
    let summary = match &order.details {
        OrderDetails::Medication {
            medication,
            dose,
            frequency,
            quantity,
            ..
        } => format!("{medication} {dose} {frequency} x{quantity}"),
        OrderDetails::Laboratory { study } => study.clone(),
        OrderDetails::Imaging { study, region } => match region {
            Some(region) => format!("{study} ({region})"),
            None => study.clone(),
        },
    };
    println!(
        "{}  [{}] {}  {}  {}  {}",
        order.id,
        order.status.label(),
        order.kind().label(),
        order.patient_name,
        summary,
        order.created_at.format("%Y-%m-%d %H:%M")
    );
}

fn print_pharmacy(request: &PharmacyRequest) {
    println!(
        "{}  [{}] {}  {} {} x{}  (orden {})",
        request.id,
        request.status.label(),
        request.patient_name,
        request.medication,
        request.dose,
        request.quantity,
        request.source_order_id
    );
}

fn print_laboratory(request: &LaboratoryRequest) {
    println!(
        "{}  [{}] {}  {}  (orden {})",
        request.id,
        request.status.label(),
        request.patient_name,
        request.study,
        request.source_order_id
    );
}

fn print_imaging(request: &ImagingRequest) {
    println!(
        "{}  [{}] {}  {}  (orden {})",
        request.id,
        request.status.label(),
        request.patient_name,
        request.study,
        request.source_order_id
    );
}

fn print_empty_or<T>(items: &[T], empty: &str, print: impl Fn(&T)) {
    if items.is_empty() {
        println!("{empty}");
    } else {
        items.iter().for_each(print);
    }
}

fn report_advance<S: Lifecycle>(kind: &str, id: &str, outcome: Option<S>) {
    match outcome {
        Some(status) => println!("{kind} request {id} is now {}", status.label()),
        None => println!("No {kind} request with id {id}"),
    }
}

fn dump<T: serde::Serialize + ?Sized>(records: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

fn run(command: Commands, hospital: &mut Hospital, ids: &mut impl IdSource) -> anyhow::Result<()> {
    let now = Utc::now();
    let today = now.date_naive();

    match command {
        Commands::Role { action } => match action {
            RoleCommand::Set { role } => {
                hospital.session.select_role(role)?;
                println!("Role set to {}", role.title());
            }
            RoleCommand::Show => match hospital.session.selected_role() {
                Some(role) => println!("{} ({role})", role.title()),
                None => println!("No role selected."),
            },
            RoleCommand::Clear => {
                hospital.session.clear_role()?;
                println!("Role cleared.");
            }
        },
        Commands::Order { action } => match action {
            OrderCommand::Medication {
                header,
                medication,
                dose,
                route,
                frequency,
                quantity: amount,
            } => {
                let details = OrderDetails::Medication {
                    medication,
                    dose,
                    route,
                    frequency,
                    quantity: quantity(amount)?,
                };
                let order = hospital.issue_order(draft(header, details), ids, now)?;
                println!("Issued order {}", order.id);
            }
            OrderCommand::Laboratory { header, study } => {
                let details = OrderDetails::Laboratory { study };
                let order = hospital.issue_order(draft(header, details), ids, now)?;
                println!("Issued order {}", order.id);
            }
            OrderCommand::Imaging {
                header,
                study,
                region,
            } => {
                let details = OrderDetails::Imaging { study, region };
                let order = hospital.issue_order(draft(header, details), ids, now)?;
                println!("Issued order {}", order.id);
            }
            OrderCommand::List { patient_id } => {
                let orders: Vec<&MedicalOrder> = match &patient_id {
                    Some(patient_id) => hospital
                        .medical_orders
                        .filter_by_patient(patient_id)
                        .collect(),
                    None => hospital.medical_orders.iter().collect(),
                };
                print_empty_or(&orders, "No orders found.", |order| print_order(order));
            }
            OrderCommand::Cancel { id } => {
                if hospital.cancel_order(&id)? {
                    println!("Order {id} is now {}", OrderStatus::Cancelled.label());
                } else {
                    println!("No order with id {id}");
                }
            }
        },
        Commands::Pharmacy { action } => {
            match action {
                PharmacyCommand::Queue => {
                    let queue = hospital.pharmacy_queue(ids)?;
                    print_empty_or(&queue, "Pharmacy queue is empty.", |r| print_pharmacy(r));
                }
                PharmacyCommand::History => {
                    let history = hospital.pharmacy_history();
                    print_empty_or(&history, "No dispensed requests.", |r| print_pharmacy(r));
                }
                PharmacyCommand::Prepare { id } => {
                    let outcome = hospital
                        .pharmacy_requests
                        .advance(&id, PharmacyAction::Prepare, now)?;
                    report_advance("pharmacy", &id, outcome);
                }
                PharmacyCommand::Ready { id } => {
                    let outcome = hospital
                        .pharmacy_requests
                        .advance(&id, PharmacyAction::MarkReady, now)?;
                    report_advance("pharmacy", &id, outcome);
                }
                PharmacyCommand::Deliver {
                    id,
                    quantity: amount,
                    received_by,
                } => {
                    let action = PharmacyAction::Deliver {
                        quantity: quantity(amount)?,
                        received_by,
                    };
                    let outcome = hospital
                        .pharmacy_requests
                        .advance(&id, action, now)?;
                    report_advance("pharmacy", &id, outcome);
                }
                PharmacyCommand::Return {
                    id,
                    reason,
                    quantity: amount,
                } => {
                    let action = PharmacyAction::Return {
                        reason: DocumentText::new("reason", reason)?,
                        quantity: quantity(amount)?,
                    };
                    let outcome = hospital
                        .pharmacy_requests
                        .advance(&id, action, now)?;
                    report_advance("pharmacy", &id, outcome);
                }
            }
        }
        Commands::Lab { action } => {
            match action {
                LabCommand::Queue => {
                    let queue = hospital.laboratory_queue(ids)?;
                    print_empty_or(&queue, "Laboratory queue is empty.", |r| {
                        print_laboratory(r)
                    });
                }
                LabCommand::History => {
                    let history = hospital.laboratory_history();
                    print_empty_or(&history, "No completed studies.", |r| print_laboratory(r));
                }
                LabCommand::Collect { id, sample } => {
                    let action = LaboratoryAction::CollectSample {
                        sample_type: sample,
                    };
                    let outcome = hospital
                        .laboratory_requests
                        .advance(&id, action, now)?;
                    report_advance("laboratory", &id, outcome);
                }
                LabCommand::Start { id } => {
                    let outcome = hospital
                        .laboratory_requests
                        .advance(&id, LaboratoryAction::StartProcessing, now)?;
                    report_advance("laboratory", &id, outcome);
                }
                LabCommand::Complete { id, results } => {
                    let action = LaboratoryAction::Complete {
                        results: DocumentText::new("results", results)?,
                    };
                    let outcome = hospital
                        .laboratory_requests
                        .advance(&id, action, now)?;
                    report_advance("laboratory", &id, outcome);
                }
            }
        }
        Commands::Imaging { action } => {
            match action {
                ImagingCommand::Queue => {
                    let queue = hospital.imaging_queue(ids)?;
                    print_empty_or(&queue, "Imaging queue is empty.", |r| print_imaging(r));
                }
                ImagingCommand::History => {
                    let history = hospital.imaging_history();
                    print_empty_or(&history, "No reported studies.", |r| print_imaging(r));
                }
                ImagingCommand::Start { id } => {
                    let outcome = hospital
                        .imaging_requests
                        .advance(&id, ImagingAction::Start, now)?;
                    report_advance("imaging", &id, outcome);
                }
                ImagingCommand::Complete { id, report } => {
                    let action = ImagingAction::Complete {
                        report: DocumentText::new("report", report)?,
                    };
                    let outcome = hospital
                        .imaging_requests
                        .advance(&id, action, now)?;
                    report_advance("imaging", &id, outcome);
                }
            }
        }
        Commands::Appointment { action } => match action {
            AppointmentCommand::Add {
                patient_id,
                patient_name,
                doctor,
                specialty,
                date,
                time,
                reason,
            } => {
                let appointment = Appointment {
                    id: ids.next_id(APPOINTMENT_ID_PREFIX),
                    patient_id,
                    patient_name,
                    doctor,
                    specialty,
                    date,
                    time: time.format("%H:%M").to_string(),
                    reason,
                    status: AppointmentStatus::Scheduled,
                };
                let id = appointment.id.clone();
                hospital.appointments.add(appointment)?;
                println!("Scheduled appointment {id}");
            }
            AppointmentCommand::List { date } => {
                let appointments: Vec<&Appointment> = hospital
                    .appointments
                    .iter()
                    .filter(|a| date.map_or(true, |d| a.date == d))
                    .collect();
                print_empty_or(&appointments, "No appointments found.", |a| {
                    println!(
                        "{}  {} {}  {}  {} ({})",
                        a.id, a.date, a.time, a.patient_name, a.doctor, a.specialty
                    )
                });
            }
        },
        Commands::Inpatient { action } => match action {
            InpatientCommand::Admit {
                patient_id,
                patient_name,
                bed,
                service,
                diagnosis,
                doctor,
                date,
            } => {
                let inpatient = Inpatient {
                    id: ids.next_id(INPATIENT_ID_PREFIX),
                    patient_id,
                    patient_name,
                    bed,
                    service,
                    admitted_on: date.unwrap_or(today),
                    diagnosis,
                    attending_doctor: doctor,
                    status: InpatientStatus::Admitted,
                    discharged_on: None,
                };
                let id = inpatient.id.clone();
                hospital.inpatients.add(inpatient)?;
                println!("Admitted as {id}");
            }
            InpatientCommand::Discharge { id, date } => {
                if hospital.discharge(&id, date.unwrap_or(today))? {
                    println!("Discharged {id}");
                } else {
                    println!("No admission with id {id}");
                }
            }
        },
        Commands::Vitals { action } => match action {
            VitalsCommand::Add {
                patient_id,
                blood_pressure,
                heart_rate,
                respiratory_rate,
                temperature,
                saturation,
                glucose,
                recorded_by,
                notes,
            } => {
                let vitals = VitalSigns {
                    id: ids.next_id(VITAL_SIGNS_ID_PREFIX),
                    patient_id,
                    taken_at: now,
                    blood_pressure,
                    heart_rate,
                    respiratory_rate,
                    temperature,
                    oxygen_saturation: saturation,
                    glucose,
                    recorded_by,
                    notes,
                };
                let id = vitals.id.clone();
                hospital.vital_signs.add(vitals)?;
                println!("Recorded vital signs {id}");
            }
        },
        Commands::List { collection } => match collection {
            CollectionName::Appointments => dump(hospital.appointments.list())?,
            CollectionName::Inpatients => dump(hospital.inpatients.list())?,
            CollectionName::MedicalOrders => dump(hospital.medical_orders.list())?,
            CollectionName::PharmacyRequests => dump(hospital.pharmacy_requests.list())?,
            CollectionName::LaboratoryRequests => dump(hospital.laboratory_requests.list())?,
            CollectionName::ImagingRequests => dump(hospital.imaging_requests.list())?,
            CollectionName::VitalSigns => dump(hospital.vital_signs.list())?,
            CollectionName::FluidBalance => dump(hospital.fluid_balances.list())?,
            CollectionName::NursingNotes => dump(hospital.nursing_notes.list())?,
            CollectionName::EvolutionNotes => dump(hospital.evolution_notes.list())?,
            CollectionName::Epicrisis => dump(hospital.epicrises.list())?,
            CollectionName::DeathCertificates => dump(hospital.death_certificates.list())?,
            CollectionName::PatientBudgets => dump(hospital.patient_budgets.list())?,
        },
    }

    Ok(())
}

/// Entry point for the ward console.
///
/// # Environment Variables
/// - `WARD_DATA_DIR`: Directory for the file-backed store (default: "ward_data")
/// - `WARD_SEED_DEMO`: Seed demo pharmacy and laboratory requests into empty collections (default: true)
/// - `RUST_LOG`: Log filter, logs go to stderr
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ward_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'ward --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::from_values(
        std::env::var("WARD_DATA_DIR").ok(),
        std::env::var("WARD_SEED_DEMO").ok(),
    )
    .context("invalid configuration")?;
    let mut hospital = Hospital::open_from_config(&cfg)
        .with_context(|| format!("failed to open data directory {}", cfg.data_dir().display()))?;
    tracing::debug!(seed_policy = ?cfg.seed_policy(), "hospital store opened");

    run(command, &mut hospital, &mut RandomIds)
}
