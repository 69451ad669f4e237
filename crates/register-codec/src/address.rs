//! Holding-register addresses of the field devices.
//!
//! Only addresses confirmed on the devices are listed here. Anything else has to be given
//! explicitly by the caller.

use crate::{DeviceClass, FieldKind, Result, ValidationError};

/// Extended control word: clock change handshake and the save command.
pub const REG_EXTENDED_CONTROL: u16 = 40007;
/// First of the six clock words.
pub const REG_CLOCK: u16 = 40001;
/// Value written to [`REG_EXTENDED_CONTROL`] to commit settings to non-volatile memory.
pub const SAVE_NON_VOLATILE: u16 = 1 << 15;

pub const TSC_REG_COMMISSIONING: u16 = 40000;
pub const TSC_REG_COMMUNICATION: u16 = 41004;

impl DeviceClass {
    /// Default destination of `kind` on this class, if known.
    pub fn address_of(self, kind: FieldKind) -> Option<u16> {
        match (self, kind) {
            (_, FieldKind::Clock) => Some(REG_CLOCK),
            (DeviceClass::Tsc, FieldKind::Telemetry) => Some(45000),
            (DeviceClass::Tsc, FieldKind::Coordinates) => Some(41010),
            (DeviceClass::Tsc, FieldKind::SunTracking) => Some(41033),
            (DeviceClass::Tsc, FieldKind::SoftwareMovementLimit) => Some(41037),
            (DeviceClass::Tsc, FieldKind::SafePositions) => Some(41044),
            (DeviceClass::Tsc, FieldKind::PanId) => Some(41070),
            (DeviceClass::Tsc, FieldKind::SmartLimits) => Some(41111),
            (DeviceClass::Tsc, FieldKind::Backtracking3d) => Some(40040),
            (DeviceClass::Iwc, FieldKind::Telemetry) => Some(41224),
            _ => None,
        }
    }

    /// Resolve the destination of `kind`, preferring an explicit `override_addr`.
    pub fn resolve_address(self, kind: FieldKind, override_addr: Option<u16>) -> Result<u16> {
        override_addr
            .or_else(|| self.address_of(kind))
            .ok_or(ValidationError::MissingAddress {
                field: kind.name(),
                class: self.as_str(),
            })
    }
}
