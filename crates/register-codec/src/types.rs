use core::fmt;
use core::ops::Deref;
use serde::{Deserialize, Serialize};

/// Ordered register words; the first word lands on the lowest target address.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterList(Vec<u16>);

impl RegisterList {
    pub fn new(words: Vec<u16>) -> Self {
        Self(words)
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u16> {
        self.0
    }
}

impl Deref for RegisterList {
    type Target = [u16];

    fn deref(&self) -> &[u16] {
        &self.0
    }
}

impl From<Vec<u16>> for RegisterList {
    fn from(words: Vec<u16>) -> Self {
        Self(words)
    }
}

impl<const N: usize> From<[u16; N]> for RegisterList {
    fn from(words: [u16; N]) -> Self {
        Self(words.to_vec())
    }
}

impl<'a> IntoIterator for &'a RegisterList {
    type Item = &'a u16;
    type IntoIter = core::slice::Iter<'a, u16>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for RegisterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "0x{w:04X}")?;
        }
        f.write_str("]")
    }
}

/// One telemetry source the device polls: a block `code` spanning `register_count` words.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PackageEntry {
    pub code: u16,
    pub register_count: u16,
}

impl PackageEntry {
    pub const fn new(code: u16, register_count: u16) -> Self {
        Self {
            code,
            register_count,
        }
    }
}

impl From<(u16, u16)> for PackageEntry {
    fn from((code, register_count): (u16, u16)) -> Self {
        Self::new(code, register_count)
    }
}

/// How bank B packs the register counts of the polling table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BankLayout {
    /// Four 4-bit counts per word; entry `i` lands in word `i / 4` at nibble `i % 4`.
    Nibble,
    /// Two 8-bit counts per word; even entries take the low byte, odd ones the high byte.
    Byte,
}

impl BankLayout {
    pub const fn per_word(self) -> usize {
        match self {
            BankLayout::Nibble => 4,
            BankLayout::Byte => 2,
        }
    }

    pub const fn slot_bits(self) -> u32 {
        match self {
            BankLayout::Nibble => 4,
            BankLayout::Byte => 8,
        }
    }

    /// Largest count a single slot can hold.
    pub const fn slot_max(self) -> u16 {
        ((1u32 << self.slot_bits()) - 1) as u16
    }

    /// Bank-B word index and multiplier for entry `index`.
    pub const fn slot(self, index: usize) -> (usize, u16) {
        let per = self.per_word();
        let shift = (index % per) as u32 * self.slot_bits();
        (index / per, 1u16 << shift)
    }
}

/// Field device families served by this tool.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Solar tracker controller.
    Tsc,
    /// Weather and ice controller.
    Iwc,
}

impl DeviceClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            DeviceClass::Tsc => "TSC",
            DeviceClass::Iwc => "IWC",
        }
    }

    pub const fn max_packages(self) -> usize {
        match self {
            DeviceClass::Tsc => 24,
            DeviceClass::Iwc => 10,
        }
    }

    pub const fn max_registers(self) -> u32 {
        match self {
            DeviceClass::Tsc => 39,
            DeviceClass::Iwc => 30,
        }
    }

    pub const fn bank_layout(self) -> BankLayout {
        match self {
            DeviceClass::Tsc => BankLayout::Byte,
            DeviceClass::Iwc => BankLayout::Nibble,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit the caller expresses wind speeds in. The device stores m/s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindSpeedUnit {
    #[default]
    MetersPerSecond,
    KilometersPerHour,
}

impl WindSpeedUnit {
    pub fn to_device(self, speed: f64) -> f64 {
        match self {
            WindSpeedUnit::MetersPerSecond => speed,
            WindSpeedUnit::KilometersPerHour => speed / 3.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_slots() {
        assert_eq!(BankLayout::Byte.slot(0), (0, 1));
        assert_eq!(BankLayout::Byte.slot(1), (0, 256));
        assert_eq!(BankLayout::Byte.slot(5), (2, 256));
        assert_eq!(BankLayout::Nibble.slot(0), (0, 1));
        assert_eq!(BankLayout::Nibble.slot(3), (0, 4096));
        assert_eq!(BankLayout::Nibble.slot(6), (1, 256));
        assert_eq!(BankLayout::Nibble.slot_max(), 15);
        assert_eq!(BankLayout::Byte.slot_max(), 255);
    }

    #[test]
    fn test_register_list_display() {
        let regs = RegisterList::from([0x0103, 0]);
        assert_eq!(regs.to_string(), "[0x0103, 0x0000]");
        assert_eq!(regs.len(), 2);
    }

    #[test]
    fn test_wind_unit_conversion() {
        assert_eq!(WindSpeedUnit::MetersPerSecond.to_device(60.0), 60.0);
        let ms = WindSpeedUnit::KilometersPerHour.to_device(36.0);
        assert!((ms - 10.0).abs() < 1e-12);
    }
}
