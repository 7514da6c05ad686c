//! Replicated car status bitmask.
//!
//! Bit assignments are part of the legacy client protocol and must not
//! change.  The set is a plain `u32` newtype: flags combine with `|`, the raw
//! value goes on the wire via [`StatusFlags::bits`].

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bit-encoded car signal state (lights, indicators, wipers, horn …).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusFlags(u32);

impl StatusFlags {
    pub const NONE:            StatusFlags = StatusFlags(0);
    pub const LIGHTS_ON:       StatusFlags = StatusFlags(0x20);
    pub const HIGH_BEAMS_OFF:  StatusFlags = StatusFlags(0x40);
    pub const HORN:            StatusFlags = StatusFlags(0x400);
    pub const BRAKE_LIGHTS_ON: StatusFlags = StatusFlags(0x800);
    pub const HAZARDS_ON:      StatusFlags = StatusFlags(0x2000);
    pub const WIPER_LEVEL_1:   StatusFlags = StatusFlags(0x4000);
    pub const WIPER_LEVEL_2:   StatusFlags = StatusFlags(0x8000);
    pub const WIPER_LEVEL_3:   StatusFlags = StatusFlags(0x4000 | 0x8000);
    pub const INDICATE_LEFT:   StatusFlags = StatusFlags(0x10000);
    pub const INDICATE_RIGHT:  StatusFlags = StatusFlags(0x20000);

    /// Mask of both indicator bits.
    pub const INDICATORS: StatusFlags = StatusFlags(0x10000 | 0x20000);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: StatusFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if any bit of `other` is set in `self`.
    #[inline]
    pub const fn intersects(self, other: StatusFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// Wiper level for an ambient rain intensity in `0..=1`.
    pub fn wipers_for_rain(rain_intensity: f32) -> StatusFlags {
        if rain_intensity < 0.05 {
            StatusFlags::NONE
        } else if rain_intensity < 0.25 {
            StatusFlags::WIPER_LEVEL_1
        } else if rain_intensity < 0.5 {
            StatusFlags::WIPER_LEVEL_2
        } else {
            StatusFlags::WIPER_LEVEL_3
        }
    }
}

impl BitOr for StatusFlags {
    type Output = StatusFlags;
    #[inline]
    fn bitor(self, rhs: StatusFlags) -> StatusFlags {
        StatusFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for StatusFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: StatusFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusFlags({:#x})", self.0)
    }
}
