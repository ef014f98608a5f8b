use thiserror::Error;

/// Trace timestamping errors.
///
/// Every variant except [`TraceError::SessionNotRunning`] is a configuration
/// error: the recorder session must not start when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// A required setting was neither configured nor supplied by the port preset.
    #[error("configuration error: {0} is not set")]
    MissingSetting(&'static str),

    /// Divisor below 1.
    #[error("divisor must be a non-zero positive value, got {0}")]
    InvalidDivisor(u32),

    /// Counter clock frequency of zero.
    #[error("counter frequency must be greater than 0 Hz")]
    InvalidFrequency,

    /// Counter width outside 1..=64 bits.
    #[error("counter width must be between 1 and 64 bits, got {0}")]
    InvalidWidth(u8),

    /// Width configured for a counter that wraps at its period.
    #[error("{kind} counters wrap at their period, a width of {width} bits does not apply")]
    WidthMismatch {
        /// Counter kind name.
        kind: String,
        /// Configured width.
        width: u8,
    },

    /// Period inconsistent with the counter kind.
    #[error("period {period} is invalid for {kind} counters")]
    PeriodMismatch {
        /// Counter kind name.
        kind: String,
        /// Offending period.
        period: u64,
    },

    /// Configured counting direction contradicts the counter kind.
    #[error("{kind} counters cannot count {direction}")]
    DirectionMismatch {
        /// Counter kind name.
        kind: String,
        /// Configured direction.
        direction: String,
    },

    /// IRQ priority order other than 0 or 1.
    #[error("IRQ priority order has bad value {0} (expected 0 or 1)")]
    InvalidPriorityOrder(u8),

    /// Frequency override attempted outside the configuration phase.
    #[error("frequency can only be overridden before the session starts (session is {state})")]
    FrequencyLocked {
        /// Session state at the time of the attempt.
        state: String,
    },

    /// Timestamp requested while no session is running.
    #[error("timestamp requested while session is {state}")]
    SessionNotRunning {
        /// Session state at the time of the request.
        state: String,
    },

    /// Invalid session state transition attempted.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Source state.
        from: String,
        /// Attempted target state.
        to: String,
    },
}

/// Convenience type alias for trace timestamping operations.
pub type TraceResult<T> = Result<T, TraceError>;
