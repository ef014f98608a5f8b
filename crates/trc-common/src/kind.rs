//! Counter and interrupt-priority classifications.
//!
//! These enums are the configuration vocabulary shared by the TOML layer,
//! the hardware port presets, and the timestamp engine.

use crate::error::{TraceError, TraceResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind of the hardware timer/counter used for timestamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    /// Free-running counter counting upwards from 0, wrapping at its native width.
    FreeRunningIncreasing,
    /// Free-running counter counting downwards from the top of its native width.
    FreeRunningDecreasing,
    /// Periodic timer driving the OS tick, counting 0 up to `period - 1`.
    PeriodicIncreasing,
    /// Periodic timer driving the OS tick, counting `period - 1` down to 0.
    PeriodicDecreasing,
    /// Custom timer independent of the OS tick, with a declared period and direction.
    CustomTimer,
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FreeRunningIncreasing => write!(f, "free-running increasing"),
            Self::FreeRunningDecreasing => write!(f, "free-running decreasing"),
            Self::PeriodicIncreasing => write!(f, "periodic increasing"),
            Self::PeriodicDecreasing => write!(f, "periodic decreasing"),
            Self::CustomTimer => write!(f, "custom timer"),
        }
    }
}

impl CounterKind {
    /// Returns true for kinds that wrap at the counter's native bit width.
    #[must_use]
    pub fn is_free_running(&self) -> bool {
        matches!(self, Self::FreeRunningIncreasing | Self::FreeRunningDecreasing)
    }

    /// Counting direction implied by the kind.
    ///
    /// `None` for [`CounterKind::CustomTimer`], whose direction must be declared.
    #[must_use]
    pub fn inherent_direction(&self) -> Option<CountDirection> {
        match self {
            Self::FreeRunningIncreasing | Self::PeriodicIncreasing => {
                Some(CountDirection::Increasing)
            }
            Self::FreeRunningDecreasing | Self::PeriodicDecreasing => {
                Some(CountDirection::Decreasing)
            }
            Self::CustomTimer => None,
        }
    }
}

/// Direction in which a hardware counter advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CountDirection {
    /// Counter value grows with time.
    #[default]
    Increasing,
    /// Counter value shrinks with time.
    Decreasing,
}

impl fmt::Display for CountDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increasing => write!(f, "upwards"),
            Self::Decreasing => write!(f, "downwards"),
        }
    }
}

/// Architecture convention for interrupt priority values.
///
/// Used only to sort and colorize captured ISR events; it has no effect on
/// timestamp arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IrqPriorityOrder {
    /// Numerically lower values are more urgent (ARM Cortex-M). Raw value 0.
    LowerIsMoreUrgent,
    /// Numerically higher values are more urgent. Raw value 1.
    HigherIsMoreUrgent,
}

impl TryFrom<u8> for IrqPriorityOrder {
    type Error = TraceError;

    fn try_from(value: u8) -> TraceResult<Self> {
        match value {
            0 => Ok(Self::LowerIsMoreUrgent),
            1 => Ok(Self::HigherIsMoreUrgent),
            other => Err(TraceError::InvalidPriorityOrder(other)),
        }
    }
}

impl From<IrqPriorityOrder> for u8 {
    fn from(order: IrqPriorityOrder) -> Self {
        match order {
            IrqPriorityOrder::LowerIsMoreUrgent => 0,
            IrqPriorityOrder::HigherIsMoreUrgent => 1,
        }
    }
}

impl fmt::Display for IrqPriorityOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowerIsMoreUrgent => write!(f, "lower-is-more-urgent"),
            Self::HigherIsMoreUrgent => write!(f, "higher-is-more-urgent"),
        }
    }
}
