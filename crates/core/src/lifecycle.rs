//! Request lifecycle state machines.
//!
//! Pharmacy, laboratory and imaging requests share one shape: an ordered list of statuses
//! walked strictly forward, one step at a time, each step triggered by a staff action and
//! stamped with the time it happened.
//!
//! | Domain      | Sequence                                                      |
//! |-------------|---------------------------------------------------------------|
//! | Pharmacy    | pendiente -> preparando -> listo -> entregado (-> devuelto)   |
//! | Laboratory  | pendiente -> muestra_recolectada -> en_proceso -> completado  |
//! | Imaging     | pendiente -> en_proceso -> completado                         |
//!
//! The pharmacy return is a side-branch reachable only from `entregado`; it sits after
//! `entregado` in the sequence so rank comparisons stay monotonic.
//!
//! Status changes are only possible through [`Collection::advance`]; request patches carry no
//! status or stage fields.

use crate::collection::{Collection, Record};
use crate::error::{WardError, WardResult};
use crate::records::{MedicalOrder, OrderKind};
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// An ordered status set.
pub trait Lifecycle: Copy + Eq + Debug + 'static {
    /// Every status, in the only order they may be visited.
    const SEQUENCE: &'static [Self];

    /// Wire name, as stored in `estado`.
    fn label(self) -> &'static str;

    /// Position in [`Lifecycle::SEQUENCE`].
    fn rank(self) -> usize {
        Self::SEQUENCE
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }

    /// The single status this one may move to.
    fn next(self) -> Option<Self> {
        Self::SEQUENCE.get(self.rank() + 1).copied()
    }

    /// Whether the request has left the department's work queue.
    fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    fn initial() -> Self {
        Self::SEQUENCE[0]
    }
}

/// Checks that `to` is exactly one step after `from`.
pub(crate) fn ensure_step<S: Lifecycle>(from: S, to: S, action: &'static str) -> WardResult<()> {
    if from.next() == Some(to) {
        Ok(())
    } else {
        Err(WardError::InvalidTransition {
            from: from.label(),
            action,
        })
    }
}

/// A department-owned record derived from one medical order.
pub trait FulfillmentRequest: Record {
    type Status: Lifecycle;

    /// Staff action moving the request one step forward, with whatever document it produces.
    type Action;

    /// Order type this department consumes.
    const KIND: OrderKind;

    /// Prefix for ids of requests synthesised from orders.
    const ID_PREFIX: &'static str;

    fn source_order_id(&self) -> &str;

    fn status(&self) -> Self::Status;

    /// Builds the initial request for `order`, or `None` if the order is of another type.
    fn from_order(id: String, order: &MedicalOrder) -> Option<Self>;

    /// Validates `action` against the current status and applies it.
    ///
    /// On error the record may be partially modified; [`Collection::advance`] only keeps the
    /// result when this succeeds.
    fn apply(&mut self, action: Self::Action, now: DateTime<Utc>) -> WardResult<Self::Status>;
}

impl<R: FulfillmentRequest> Collection<R> {
    /// Runs `action` against the request with `id`.
    ///
    /// Returns the new status, or `Ok(None)` if no request has that id.
    ///
    /// # Errors
    ///
    /// - [`WardError::InvalidTransition`] if the action is not the next step
    /// - [`WardError::Value`] if a required document is empty
    /// - [`WardError::ReturnExceedsDelivered`] / [`WardError::InvalidInput`] on bad quantities
    pub fn advance(
        &mut self,
        id: &str,
        action: R::Action,
        now: DateTime<Utc>,
    ) -> WardResult<Option<R::Status>> {
        let outcome = self.modify(id, |request| {
            let from = request.status();
            let to = request.apply(action, now)?;
            Ok((from, to))
        })?;

        if let Some((from, to)) = outcome {
            tracing::info!(
                key = R::STORAGE_KEY,
                id,
                from = from.label(),
                to = to.label(),
                "request advanced"
            );
        }

        Ok(outcome.map(|(_, to)| to))
    }

    /// Requests still in the department's work queue, in insertion order.
    pub fn open_requests(&self) -> Vec<&R> {
        self.iter().filter(|r| !r.status().is_terminal()).collect()
    }

    /// Requests that reached a terminal status.
    pub fn closed_requests(&self) -> Vec<&R> {
        self.iter().filter(|r| r.status().is_terminal()).collect()
    }
}
