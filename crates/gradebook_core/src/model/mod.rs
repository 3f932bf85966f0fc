//! Gradebook domain model.
//!
//! # Responsibility
//! - Define classroom, student and grade records and their derived averages.
//! - Define the wire shape each record serializes to.
//!
//! # Invariants
//! - Ids are assigned by persistence; `None` means "not saved yet".
//! - Back-references (`Student::classroom`, `Grade::student`) are plain ids and
//!   are never serialized.

use std::sync::atomic::{AtomicU64, Ordering};

pub mod classroom;
pub mod grade;
pub mod student;

pub type ClassroomId = i64;
pub type StudentId = i64;
pub type GradeId = i64;

static NEXT_INSTANCE_KEY: AtomicU64 = AtomicU64::new(1);

/// In-process identity of an entity value.
///
/// Cloning an entity keeps its key, so a clone still denotes the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct InstanceKey(u64);

impl InstanceKey {
    pub(crate) fn next() -> Self {
        Self(NEXT_INSTANCE_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// Persisted ids win; unsaved values fall back to their instance key.
pub(crate) fn same_entity<I: PartialEq>(
    (left_id, left_key): (Option<I>, InstanceKey),
    (right_id, right_key): (Option<I>, InstanceKey),
) -> bool {
    match (left_id, right_id) {
        (Some(left), Some(right)) => left == right,
        _ => left_key == right_key,
    }
}

/// Arithmetic mean, `None` for an empty input.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (total, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(total, count), value| {
            (total + value, count + 1)
        });
    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}
