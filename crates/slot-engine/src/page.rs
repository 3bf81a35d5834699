//! Offset/limit pagination over a fully generated slot list.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::model::GeneratedSlot;

/// One page of generated slots plus the size of the full result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPage {
    pub offset: usize,
    pub limit: usize,
    /// Number of slots before pagination.
    pub total_slots: usize,
    pub slots: Vec<GeneratedSlot>,
}

/// Slice `slots[offset..offset + limit]`, clamped to the list bounds.
///
/// A trailing partial page is allowed, and an offset past the end yields an
/// empty page rather than an error.
///
/// # Errors
/// Returns `SlotError::InvalidPage` if `limit` is zero.
pub fn paginate(slots: Vec<GeneratedSlot>, offset: usize, limit: usize) -> Result<SlotPage> {
    if limit == 0 {
        return Err(SlotError::InvalidPage("limit must be at least 1".to_string()));
    }

    let total_slots = slots.len();
    let page = slots
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect();

    Ok(SlotPage {
        offset,
        limit,
        total_slots,
        slots: page,
    })
}
