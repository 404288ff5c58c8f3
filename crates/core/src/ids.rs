//! Record identifier allocation.
//!
//! Identifiers are `<prefix>-<32 lowercase hex>`, the hex part being a UUID v4 in simple form.
//! Callers that need reproducible ids (tests, fixtures) pass a [`SequentialIds`] instead.

use uuid::Uuid;

/// Source of fresh record identifiers.
pub trait IdSource {
    fn next_id(&mut self, prefix: &str) -> String;
}

/// Random UUID v4 based identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self, prefix: &str) -> String {
        format!("{prefix}-{}", Uuid::new_v4().simple())
    }
}

/// Deterministic identifiers: `<prefix>-1`, `<prefix>-2`, ...
///
/// The counter is shared across prefixes.
#[derive(Clone, Debug, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{prefix}-{}", self.next)
    }
}
