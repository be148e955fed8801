//! Request lifecycle tracking for boundary calls.
//!
//! Each lifecycle goes `Idle -> Pending -> Success | Failed`. Every issued
//! call gets a [`Ticket`] with a sequence number; only the settlement for the
//! newest ticket is applied, so overlapping calls of the same kind resolve to
//! the most recently issued one regardless of which returns last.

use chrono::{DateTime, Utc};

use crate::error::ApiError;

/// Handle for one issued call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Idle,
    Pending,
    Success(T),
    Failed(String),
}

#[derive(Debug)]
pub struct Lifecycle<T> {
    phase: Phase<T>,
    issued: u64,
    started_at: Option<DateTime<Utc>>,
    settled_at: Option<DateTime<Utc>>,
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            issued: 0,
            started_at: None,
            settled_at: None,
        }
    }
}

impl<T> Lifecycle<T> {
    /// Enter `Pending`, dropping any previous outcome.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.phase = Phase::Pending;
        self.started_at = Some(Utc::now());
        Ticket(self.issued)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    /// Apply an outcome if `ticket` is the newest issued call.
    ///
    /// Returns `false` (and leaves the state untouched) for stale tickets.
    pub fn settle(&mut self, ticket: Ticket, outcome: Result<T, ApiError>) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.phase = match outcome {
            Ok(value) => Phase::Success(value),
            Err(err) => Phase::Failed(err.to_string()),
        };
        self.settled_at = Some(Utc::now());
        true
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.phase {
            Phase::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }
}
