//! # Ward Core
//!
//! Core data layer for the hospital admin console.
//!
//! This crate contains pure data operations over persisted collections:
//! - Typed record collections stored as JSON arrays under fixed keys
//! - Materialization of pending medical orders into department requests
//! - Forward-only lifecycles for pharmacy, laboratory and imaging requests
//!
//! **No presentation concerns**: forms, menus and printing belong in the front end (`ward-cli`).

pub mod collection;
pub mod config;
pub mod constants;
pub mod error;
pub mod hospital;
pub mod ids;
pub mod lifecycle;
pub mod materializer;
pub mod records;
pub mod session;
pub mod storage;

pub use collection::{Collection, Patch, Record};
pub use config::{CoreConfig, SeedPolicy};
pub use error::{WardError, WardResult};
pub use hospital::Hospital;
pub use ids::{IdSource, RandomIds, SequentialIds};
pub use lifecycle::{FulfillmentRequest, Lifecycle};
pub use materializer::reconcile;
pub use session::{Role, Session};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
