//! # slot-engine
//!
//! Bookable exam slots from weekly operator availability.
//!
//! Each [`AvailabilityRule`] describes one weekday on which an operator works at
//! a laboratory for one exam type. The engine expands rules into concrete slots,
//! withholds the ones that overlap a laboratory closure or operator absence or
//! that are already booked, and returns the rest in a deterministic order.
//!
//! Everything here is a pure function over immutable inputs; fetching
//! consistent snapshots of rules, blackouts and bookings is the caller's job.
//!
//! ## Modules
//!
//! - [`model`] — Rules, closures, absences, bookings and generated slots
//! - [`expander`] — One rule → lazy sequence of candidate slots
//! - [`conflict`] — Closure / absence / booking filters
//! - [`generator`] — All rules → filtered, ordered slot list
//! - [`page`] — Offset/limit pagination of the result
//! - [`window`] — Booking window defaults and clamping
//! - [`error`] — Error types

pub mod conflict;
pub mod error;
pub mod expander;
pub mod generator;
pub mod model;
pub mod page;
pub mod window;

pub use conflict::{absence_conflict, booking_conflict, closure_conflict, ConflictIndex};
pub use error::SlotError;
pub use expander::{expand_rule, CandidateSlot, RuleExpansion};
pub use generator::{generate_slots, RuleFilter};
pub use model::{
    AvailabilityRule, Blackout, ConfirmedBooking, GeneratedSlot, LaboratoryClosure,
    OperatorAbsence,
};
pub use page::{paginate, SlotPage};
pub use window::{BookingWindow, QueryWindow};
