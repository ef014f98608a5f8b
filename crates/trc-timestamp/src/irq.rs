//! Interrupt priority classification.
//!
//! Ports disagree on whether a numerically smaller priority is more urgent
//! (ARM Cortex-M) or less urgent (Win32, Renesas RX600). Comparisons go
//! through the configured [`IrqPriorityOrder`] so recorded ISR priorities
//! can be annotated consistently. Annotation only; nothing is scheduled.

use serde::Serialize;
use std::cmp::Ordering;
use trc_common::kind::IrqPriorityOrder;

/// Relative urgency of two raw priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Urgency {
    /// The first priority is more urgent.
    FirstMoreUrgent,
    /// The second priority is more urgent.
    SecondMoreUrgent,
    /// Equally urgent.
    Equal,
}

impl Urgency {
    /// Ordering that sorts the more urgent priority first.
    #[must_use]
    pub fn as_ordering(&self) -> Ordering {
        match self {
            Self::FirstMoreUrgent => Ordering::Less,
            Self::SecondMoreUrgent => Ordering::Greater,
            Self::Equal => Ordering::Equal,
        }
    }
}

/// Compare raw priorities `a` and `b` under `order`.
#[must_use]
pub fn compare_priority(a: u32, b: u32, order: IrqPriorityOrder) -> Urgency {
    let numeric = match order {
        IrqPriorityOrder::LowerIsMoreUrgent => a.cmp(&b),
        IrqPriorityOrder::HigherIsMoreUrgent => b.cmp(&a),
    };
    match numeric {
        Ordering::Less => Urgency::FirstMoreUrgent,
        Ordering::Greater => Urgency::SecondMoreUrgent,
        Ordering::Equal => Urgency::Equal,
    }
}

/// Sort `items` most urgent first. Equal priorities keep their order.
pub fn sort_most_urgent_first<T, F>(items: &mut [T], order: IrqPriorityOrder, mut priority: F)
where
    F: FnMut(&T) -> u32,
{
    items.sort_by(|a, b| compare_priority(priority(a), priority(b), order).as_ordering());
}
