//! Write-outcome taxonomy for the record store.
//!
//! Business-rule refusals (duplicate keys, dangling references, dependent
//! rows) are ordinary data, not faults: callers get an [`Outcome`] and decide
//! how to present it. Only storage-engine failures travel the `Err` channel.

use serde::{Deserialize, Serialize};

/// Closed set of reasons the store declines a write without applying it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refusal {
    /// A uniqueness rule would be violated (agent id, course name,
    /// activity date/shift/course triple, assignment pair).
    DuplicateKey,
    /// A referenced row (shift, course, monitor, agent, activity) does not exist.
    DanglingReference,
    /// The row is still referenced by other rows and cannot be deleted.
    HasDependents,
}

impl Refusal {
    pub fn describe(&self) -> &'static str {
        match self {
            Refusal::DuplicateKey => "an identical record already exists",
            Refusal::DanglingReference => "a referenced record does not exist",
            Refusal::HasDependents => "other records still reference it",
        }
    }
}

/// Result of a store write that may be refused by a business rule.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome<T> {
    /// The write was applied; carries the operation's payload
    /// (e.g. a generated row id, or whether a row was affected).
    Applied(T),
    Refused(Refusal),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn refusal(&self) -> Option<Refusal> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Refused(r) => Some(*r),
        }
    }
}
