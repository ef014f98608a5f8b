//! Hardware port presets.
//!
//! Each preset records how a known platform's timestamp counter behaves:
//! its kind, the recommended divisor, a fixed frequency where the platform
//! defines one, and the IRQ priority convention. Values that depend on
//! runtime registers (OS tick periods, core clocks) are left unset so they
//! are read from the hardware counter instead.
//!
//! A preset only supplies defaults. Any field set explicitly in the
//! configuration wins.

use crate::kind::{CounterKind, IrqPriorityOrder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Known hardware ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HardwarePort {
    /// Windows host, 32-bit performance counter. Template for any free-running 32-bit counter.
    #[default]
    Win32,
    /// Windows host, 64-bit base type, same counter as [`HardwarePort::Win32`].
    Win64,
    /// Timestamping by OS tick only (typically 1 ms resolution).
    ///
    /// The hardware counter is the kernel's tick count: it free-runs upwards
    /// and its frequency is the tick rate.
    HwIndependent,
    /// ARM Cortex-M3/M4/M7 using the DWT cycle counter.
    ArmCortexM,
    /// ARM Cortex-M0/M0+ (or forced) using the SysTick down-counter.
    ArmCortexMSysTick,
    /// Renesas RX600 compare-match timer.
    RenesasRx600,
    /// Microchip PIC24/PIC32 Timer1.
    MicrochipPic24Pic32,
    /// Texas Instruments TMS570/RM48 RTI counter.
    TiTms570Rm48,
    /// Atmel AT91SAM7 periodic interval timer.
    AtmelAt91sam7,
    /// Atmel AVR32 UC3A0 COUNT register.
    AtmelUc3a0,
    /// NXP LPC210x timer 0.
    NxpLpc210x,
    /// Texas Instruments MSP430 Timer A.
    TiMsp430,
    /// Xilinx PowerPC 405 decrementer.
    XilinxPpc405,
    /// Xilinx PowerPC 440 decrementer.
    XilinxPpc440,
    /// Xilinx MicroBlaze AXI timer 0.
    XilinxMicroblaze,
    /// Xilinx Zynq UltraScale+ R5 triple timer counter.
    XilinxZynqUltrascaleR5,
    /// Altera Nios II system timer snapshot.
    AlteraNios2,
    /// ARM Cortex-A9 MPCore private timer.
    ArmCortexA9,
    /// Zephyr `k_cycle_get_32()`.
    Zephyr,
    /// Xtensa LX6 CCOUNT (unicore) or 40 MHz external timer (SMP).
    XtensaLx6,
    /// Xtensa LX7 CCOUNT (unicore) or 40 MHz external timer (SMP).
    XtensaLx7,
    /// RISC-V RV32I `rdcycle`.
    RiscvRv32i,
    /// XMOS xcore.ai `xscope_gettime()`.
    XmosXcoreAi,
    /// NXP/ST PowerPC Z4 periodic interrupt timer.
    PowerPcZ4,
    /// Everything is defined by the application configuration.
    ApplicationDefined,
}

/// Default timer and priority settings contributed by a [`HardwarePort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortDefaults {
    /// Counter kind.
    pub kind: Option<CounterKind>,
    /// Fixed period, when the port does not read it from a register.
    pub period: Option<u64>,
    /// Recommended divisor.
    pub divisor: Option<u32>,
    /// Fixed counter frequency, when the port defines one.
    pub frequency_hz: Option<u32>,
    /// IRQ priority convention.
    pub irq_priority_order: Option<IrqPriorityOrder>,
}

impl PortDefaults {
    const fn preset(kind: CounterKind, divisor: u32, order: Option<IrqPriorityOrder>) -> Self {
        Self {
            kind: Some(kind),
            period: None,
            divisor: Some(divisor),
            frequency_hz: None,
            irq_priority_order: order,
        }
    }

    const fn with_frequency(mut self, hz: u32) -> Self {
        self.frequency_hz = Some(hz);
        self
    }
}

impl HardwarePort {
    /// Defaults for this port.
    #[must_use]
    pub fn defaults(&self) -> PortDefaults {
        use CounterKind::{
            FreeRunningIncreasing as FrIncr, PeriodicDecreasing as OsDecr,
            PeriodicIncreasing as OsIncr,
        };
        use IrqPriorityOrder::{HigherIsMoreUrgent as High, LowerIsMoreUrgent as Low};

        match self {
            Self::Win32 | Self::Win64 => PortDefaults::preset(FrIncr, 1, Some(High)),
            // Priority order is NOT_SET for this port and must be configured.
            Self::HwIndependent => PortDefaults::preset(FrIncr, 1, None),
            Self::ArmCortexM => PortDefaults::preset(FrIncr, 4, Some(Low)),
            Self::ArmCortexMSysTick => PortDefaults::preset(OsDecr, 4, Some(Low)),
            Self::RenesasRx600 => PortDefaults::preset(OsDecr, 1, Some(High)),
            Self::MicrochipPic24Pic32
            | Self::AtmelAt91sam7
            | Self::AtmelUc3a0
            | Self::TiMsp430 => PortDefaults::preset(OsIncr, 1, Some(High)),
            Self::TiTms570Rm48 | Self::NxpLpc210x => PortDefaults::preset(OsIncr, 1, Some(Low)),
            Self::XilinxPpc405 | Self::XilinxPpc440 | Self::ArmCortexA9 => {
                PortDefaults::preset(OsDecr, 1, Some(Low))
            }
            Self::XilinxMicroblaze | Self::AlteraNios2 => {
                PortDefaults::preset(OsDecr, 16, Some(Low))
            }
            Self::XilinxZynqUltrascaleR5 => PortDefaults::preset(OsIncr, 16, Some(Low)),
            Self::Zephyr | Self::XtensaLx6 | Self::XtensaLx7 => {
                PortDefaults::preset(FrIncr, 4, Some(Low))
            }
            Self::RiscvRv32i => {
                PortDefaults::preset(FrIncr, 1, Some(Low)).with_frequency(16_000_000)
            }
            Self::XmosXcoreAi => {
                PortDefaults::preset(FrIncr, 4, Some(Low)).with_frequency(100_000_000)
            }
            Self::PowerPcZ4 => PortDefaults::preset(OsDecr, 1, Some(High)),
            Self::ApplicationDefined => PortDefaults::default(),
        }
    }
}

impl fmt::Display for HardwarePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Win32 => "Win32",
            Self::Win64 => "Win64",
            Self::HwIndependent => "HW-independent",
            Self::ArmCortexM => "ARM Cortex-M (DWT)",
            Self::ArmCortexMSysTick => "ARM Cortex-M (SysTick)",
            Self::RenesasRx600 => "Renesas RX600",
            Self::MicrochipPic24Pic32 => "Microchip PIC24/PIC32",
            Self::TiTms570Rm48 => "TI TMS570/RM48",
            Self::AtmelAt91sam7 => "Atmel AT91SAM7",
            Self::AtmelUc3a0 => "Atmel UC3A0",
            Self::NxpLpc210x => "NXP LPC210x",
            Self::TiMsp430 => "TI MSP430",
            Self::XilinxPpc405 => "Xilinx PPC405",
            Self::XilinxPpc440 => "Xilinx PPC440",
            Self::XilinxMicroblaze => "Xilinx MicroBlaze",
            Self::XilinxZynqUltrascaleR5 => "Xilinx Zynq UltraScale+ R5",
            Self::AlteraNios2 => "Altera Nios II",
            Self::ArmCortexA9 => "ARM Cortex-A9",
            Self::Zephyr => "Zephyr",
            Self::XtensaLx6 => "Xtensa LX6",
            Self::XtensaLx7 => "Xtensa LX7",
            Self::RiscvRv32i => "RISC-V RV32I",
            Self::XmosXcoreAi => "XMOS xcore.ai",
            Self::PowerPcZ4 => "PowerPC Z4",
            Self::ApplicationDefined => "application-defined",
        };
        f.write_str(name)
    }
}
