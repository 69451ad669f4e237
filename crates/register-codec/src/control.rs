//! Bit-field updates applied with a masked register write.

use crate::address::{REG_EXTENDED_CONTROL, TSC_REG_COMMISSIONING, TSC_REG_COMMUNICATION};
use serde::{Deserialize, Serialize};

/// `new = (current & and_mask) | (or_mask & !and_mask)` on a single register.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct MaskedWrite {
    pub address: u16,
    pub and_mask: u16,
    pub or_mask: u16,
}

impl MaskedWrite {
    pub const fn new(address: u16, and_mask: u16, or_mask: u16) -> Self {
        Self {
            address,
            and_mask,
            or_mask,
        }
    }

    /// Result of applying this write to `current`.
    pub const fn apply(&self, current: u16) -> u16 {
        (current & self.and_mask) | (self.or_mask & !self.and_mask)
    }
}

/// Tracker commissioning stage, bits 5..7 of the status word.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissioningState {
    Commissioned = 0,
    Commissioning = 1,
    Mechanical = 2,
    Factory = 3,
}

impl CommissioningState {
    pub fn masked_write(self) -> MaskedWrite {
        MaskedWrite::new(TSC_REG_COMMISSIONING, 0xFF1F, (self as u16) << 5)
    }
}

/// Low byte of the communication word carries the Modbus unit id.
pub fn set_modbus_id(new_id: u8) -> MaskedWrite {
    MaskedWrite::new(TSC_REG_COMMUNICATION, 0xFF00, u16::from(new_id))
}

/// Bit 8 of the communication word restarts the radio stack.
pub fn reset_communication() -> MaskedWrite {
    MaskedWrite::new(TSC_REG_COMMUNICATION, 0xFEFF, 0x0100)
}

/// Clock handshake step on the TSC: 1 unlocks, 3 latches, 0 aborts.
pub fn tsc_clock_control(step: u16) -> MaskedWrite {
    MaskedWrite::new(REG_EXTENDED_CONTROL, 0xFFFC, step & 0x0003)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commissioning_masks() {
        let w = CommissioningState::Factory.masked_write();
        assert_eq!((w.address, w.and_mask, w.or_mask), (40000, 0xFF1F, 0x0060));
        assert_eq!(CommissioningState::Commissioned.masked_write().or_mask, 0);
        // only bits 5..7 move
        assert_eq!(w.apply(0xFFFF), 0xFF7F);
        assert_eq!(w.apply(0x0000), 0x0060);
    }

    #[test]
    fn test_modbus_id_keeps_high_byte() {
        let w = set_modbus_id(121);
        assert_eq!(w.apply(0xAB00 | 225), 0xAB00 | 121);
    }

    #[test]
    fn test_reset_sets_bit_8() {
        assert_eq!(reset_communication().apply(0x00E1), 0x01E1);
    }

    #[test]
    fn test_clock_control() {
        let w = tsc_clock_control(3);
        assert_eq!(w.apply(0x8000), 0x8003);
        assert_eq!(tsc_clock_control(0).apply(0x8003), 0x8000);
    }
}
