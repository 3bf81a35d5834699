//! Error types for slot-engine operations.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// An availability rule violates one of its invariants.
    #[error("Invalid availability rule {rule_id}: {reason}")]
    InvalidRule { rule_id: String, reason: String },

    /// A closure or absence whose start is not strictly before its end.
    #[error("Invalid blackout interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Invalid booking for rule {rule_id}: {reason}")]
    InvalidBooking { rule_id: String, reason: String },

    /// The query window is inverted (after clamping to the booking window).
    #[error("Invalid window: {from} is after {to}")]
    InvalidWindow {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },

    #[error("Invalid booking window configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),
}

pub type Result<T> = std::result::Result<T, SlotError>;
