//! Extended timestamp (XTS) policy.
//!
//! Events carry their delta inline in 8 or 16 bits. A larger delta is
//! preceded by an XTS event holding the high bits; the reader reassembles
//! the two. The cumulative timestamp is computed before splitting and is
//! never affected by it.

use serde::Serialize;
use static_assertions::const_assert;
use std::fmt;

/// Largest delta an 8-bit inline field holds.
pub const NARROW_CEILING: u64 = 0xFF;

/// Largest delta a 16-bit inline field holds.
pub const WIDE_CEILING: u64 = 0xFFFF;

const_assert!(NARROW_CEILING == (1 << 8) - 1);
const_assert!(WIDE_CEILING == (1 << 16) - 1);

/// Inline delta width of an event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventWidth {
    /// 8-bit inline delta.
    Narrow,
    /// 16-bit inline delta.
    Wide,
}

impl EventWidth {
    /// Inline field width in bits.
    #[must_use]
    pub fn bits(&self) -> u8 {
        match self {
            Self::Narrow => 8,
            Self::Wide => 16,
        }
    }

    /// Largest delta storable inline.
    #[must_use]
    pub fn ceiling(&self) -> u64 {
        match self {
            Self::Narrow => NARROW_CEILING,
            Self::Wide => WIDE_CEILING,
        }
    }

    /// Width from a bit count; only 8 and 16 are valid.
    #[must_use]
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            8 => Some(Self::Narrow),
            16 => Some(Self::Wide),
            _ => None,
        }
    }
}

impl fmt::Display for EventWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// True iff `stored_ticks` does not fit the inline field.
#[must_use]
pub fn needs_extension(stored_ticks: u64, width: EventWidth) -> bool {
    stored_ticks > width.ceiling()
}

/// Extension event class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum XtsKind {
    /// Precedes an 8-bit-delta event; carries delta bits 8..32.
    Xts8,
    /// Precedes a 16-bit-delta event; carries delta bits 16..32.
    Xts16,
}

/// Auxiliary event carrying the high bits of a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtensionEvent {
    /// Extension class.
    pub kind: XtsKind,
    /// Middle or high 16 bits of the delta.
    pub xts_16: u16,
    /// Top 8 bits of the delta (Xts8 only, otherwise 0).
    pub xts_8: u8,
}

impl ExtensionEvent {
    /// Delta bits carried by this event, shifted into place.
    #[must_use]
    pub fn high_bits(&self) -> u64 {
        match self.kind {
            XtsKind::Xts8 => (u64::from(self.xts_8) << 24) | (u64::from(self.xts_16) << 8),
            XtsKind::Xts16 => u64::from(self.xts_16) << 16,
        }
    }
}

/// A stored delta split for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeltaSplit {
    /// Extension event to emit first, if the delta overflows the inline field.
    pub extension: Option<ExtensionEvent>,
    /// Low bits stored in the event itself.
    pub inline: u16,
}

impl DeltaSplit {
    /// Delta as a reader would reconstruct it.
    #[must_use]
    pub fn reassemble(&self) -> u64 {
        let high = self.extension.map_or(0, |xts| xts.high_bits());
        high | u64::from(self.inline)
    }
}

/// Split `stored_ticks` into inline bits and an optional XTS event.
///
/// The XTS encoding carries delta bits up to 32. Bits above that are
/// dropped from the encoded delta; the cumulative timestamp keeps them.
#[must_use]
pub fn split_delta(stored_ticks: u64, width: EventWidth) -> DeltaSplit {
    let inline = (stored_ticks & width.ceiling()) as u16;
    if !needs_extension(stored_ticks, width) {
        return DeltaSplit {
            extension: None,
            inline,
        };
    }

    let extension = match width {
        EventWidth::Narrow => ExtensionEvent {
            kind: XtsKind::Xts8,
            xts_16: ((stored_ticks >> 8) & 0xFFFF) as u16,
            xts_8: ((stored_ticks >> 24) & 0xFF) as u8,
        },
        EventWidth::Wide => ExtensionEvent {
            kind: XtsKind::Xts16,
            xts_16: ((stored_ticks >> 16) & 0xFFFF) as u16,
            xts_8: 0,
        },
    };

    DeltaSplit {
        extension: Some(extension),
        inline,
    }
}
