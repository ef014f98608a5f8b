//! Configuration structures for the trace timestamp subsystem.
//!
//! Supports TOML deserialization. Timer settings left unset fall back to
//! the selected [`HardwarePort`] preset, then to the hardware counter
//! itself (period and frequency), so a minimal file only names the port.

use crate::error::{TraceError, TraceResult};
use crate::kind::{CountDirection, CounterKind, IrqPriorityOrder};
use crate::port::HardwarePort;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Counter width used when none is configured.
pub const DEFAULT_WIDTH_BITS: u8 = 32;

/// Top-level trace timestamp configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Hardware port preset supplying timer and priority defaults.
    pub port: HardwarePort,

    /// Timestamp counter configuration.
    pub timer: TimerConfig,

    /// Interrupt priority configuration.
    pub irq: IrqConfig,

    /// Simulated counter workload (host simulator only).
    pub simulation: SimulationConfig,
}

/// Timestamp counter configuration.
///
/// Every field is optional; see [`TimerConfig::merged_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Counter kind.
    pub kind: Option<CounterKind>,

    /// Counting direction. Required for custom timers, must match the kind otherwise.
    pub direction: Option<CountDirection>,

    /// Native counter width in bits for free-running kinds; rejected for periodic kinds.
    pub width_bits: Option<u8>,

    /// Ticks until the counter wraps. Must be 0 (or unset) for free-running kinds.
    pub period: Option<u64>,

    /// Prescaler applied to every delta before storage.
    pub divisor: Option<u32>,

    /// Counter clock rate in Hz.
    pub frequency_hz: Option<u32>,
}

impl TimerConfig {
    /// Fill unset fields from the port preset.
    ///
    /// Fields still unset afterwards are resolved against the hardware
    /// counter when the timestamp clock is built.
    #[must_use]
    pub fn merged_with(&self, port: HardwarePort) -> TimerConfig {
        let defaults = port.defaults();
        TimerConfig {
            kind: self.kind.or(defaults.kind),
            direction: self.direction,
            width_bits: self.width_bits,
            period: self.period.or(defaults.period),
            divisor: self.divisor.or(defaults.divisor),
            frequency_hz: self.frequency_hz.or(defaults.frequency_hz),
        }
    }
}

/// Interrupt priority configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrqConfig {
    /// 0 if lower raw values are more urgent, 1 if higher raw values are.
    pub priority_order: Option<u8>,
}

impl IrqConfig {
    /// Resolve the priority order, falling back to the port preset.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the configuration nor the port defines
    /// an order, or if the configured raw value is not 0 or 1.
    pub fn resolve(&self, port: HardwarePort) -> TraceResult<IrqPriorityOrder> {
        match self.priority_order {
            Some(raw) => IrqPriorityOrder::try_from(raw),
            None => port
                .defaults()
                .irq_priority_order
                .ok_or(TraceError::MissingSetting("irq.priority_order")),
        }
    }
}

/// Workload for the host simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of task-context events to record.
    pub events: u64,

    /// Hardware ticks between consecutive events, cycled in order.
    pub tick_steps: Vec<u64>,

    /// Every Nth task event is preempted by an ISR-context event (0 disables).
    pub isr_every: u64,

    /// Raw ISR priorities cycled through by simulated interrupts.
    pub isr_priorities: Vec<u32>,

    /// Simulated counter clock rate in Hz.
    pub counter_frequency_hz: u32,

    /// Simulated counter reload period for periodic and custom kinds.
    pub counter_period: u64,

    /// Wall-clock pause between events.
    #[serde(with = "humantime_serde")]
    pub pace: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            events: 10_000,
            tick_steps: vec![120, 800, 3_000, 70_000],
            isr_every: 4,
            isr_priorities: vec![5, 2, 7],
            counter_frequency_hz: 48_000_000,
            counter_period: 48_000, // 1 kHz OS tick at 48 MHz
            pace: Duration::ZERO,
        }
    }
}

impl TraceConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        debug!(?path, "Reading trace configuration");
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Timer settings with the port preset applied.
    #[must_use]
    pub fn effective_timer(&self) -> TimerConfig {
        self.timer.merged_with(self.port)
    }

    /// Resolved IRQ priority order.
    ///
    /// # Errors
    ///
    /// See [`IrqConfig::resolve`].
    pub fn irq_priority_order(&self) -> TraceResult<IrqPriorityOrder> {
        self.irq.resolve(self.port)
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Serde helper module for `Duration` using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TraceConfig::default();
        assert_eq!(config.port, HardwarePort::Win32);
        assert_eq!(config.timer, TimerConfig::default());
        assert_eq!(
            config.irq_priority_order().unwrap(),
            IrqPriorityOrder::HigherIsMoreUrgent
        );
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            port = "arm_cortex_m_sys_tick"

            [timer]
            divisor = 2
            frequency_hz = 64000000

            [simulation]
            events = 500
            pace = "250us"
        "#;

        let config = TraceConfig::from_toml(toml).unwrap();
        let timer = config.effective_timer();
        assert_eq!(timer.kind, Some(CounterKind::PeriodicDecreasing));
        // Explicit divisor wins over the preset's 4
        assert_eq!(timer.divisor, Some(2));
        assert_eq!(timer.frequency_hz, Some(64_000_000));
        assert_eq!(timer.period, None);
        assert_eq!(config.simulation.events, 500);
        assert_eq!(config.simulation.pace, Duration::from_micros(250));
    }

    #[test]
    fn test_application_defined_requires_priority_order() {
        let toml = r#"
            port = "application_defined"

            [timer]
            kind = "free_running_increasing"
        "#;

        let config = TraceConfig::from_toml(toml).unwrap();
        assert_eq!(
            config.irq_priority_order(),
            Err(TraceError::MissingSetting("irq.priority_order"))
        );
    }

    #[test]
    fn test_bad_priority_order_value() {
        let toml = r#"
            [irq]
            priority_order = 3
        "#;

        let config = TraceConfig::from_toml(toml).unwrap();
        assert_eq!(
            config.irq_priority_order(),
            Err(TraceError::InvalidPriorityOrder(3))
        );
    }

    #[test]
    fn test_custom_timer_fields() {
        let toml = r#"
            port = "application_defined"

            [timer]
            kind = "custom_timer"
            direction = "decreasing"
            period = 1000

            [irq]
            priority_order = 0
        "#;

        let config = TraceConfig::from_toml(toml).unwrap();
        assert_eq!(config.timer.direction, Some(CountDirection::Decreasing));
        assert_eq!(config.timer.period, Some(1000));
        assert_eq!(
            config.irq_priority_order().unwrap(),
            IrqPriorityOrder::LowerIsMoreUrgent
        );
    }

    #[test]
    fn test_roundtrip_toml() {
        let mut config = TraceConfig::default();
        config.timer.divisor = Some(8);
        let toml = config.to_toml().unwrap();
        let parsed = TraceConfig::from_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"zephyr\"").unwrap();

        let config = TraceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, HardwarePort::Zephyr);
        assert_eq!(config.effective_timer().divisor, Some(4));
    }

    #[test]
    fn test_missing_file() {
        let err = TraceConfig::from_file(std::path::Path::new("/nonexistent/trace.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
