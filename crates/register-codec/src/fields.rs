//! Per-field encoders.
//!
//! Every encoder validates in `new` and stores its registers, so a constructed value always
//! carries a complete payload.

use crate::codec::{encode_f32_le, encode_i16_as_u16, encode_u16};
use crate::{RegisterList, Result, ValidationError, WindSpeedUnit};
use time::{OffsetDateTime, UtcOffset};

/// Motor pulses per degree of tracker rotation.
pub const PULSES_PER_DEGREE: f64 = 34.70909090909091;

fn floats(values: &[f64]) -> Result<RegisterList> {
    let mut out = Vec::with_capacity(values.len() * 2);
    for v in values {
        out.extend_from_slice(&encode_f32_le(*v)?);
    }
    Ok(RegisterList::new(out))
}

fn radians(degrees: f64) -> f64 {
    degrees * core::f64::consts::PI / 180.0
}

/// Site location, longitude first.
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
    registers: RegisterList,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        Ok(Self {
            longitude,
            latitude,
            registers: floats(&[longitude, latitude])?,
        })
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }
}

/// Row pitch and panel width used by the backtracking geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct SunTracking {
    pub pitch: f64,
    pub panel_width: f64,
    registers: RegisterList,
}

impl SunTracking {
    pub fn new(pitch: f64, panel_width: f64) -> Result<Self> {
        Ok(Self {
            pitch,
            panel_width,
            registers: floats(&[pitch, panel_width])?,
        })
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }
}

/// Radio PAN identifier, 16 hex digits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanId {
    pub hex: String,
    registers: RegisterList,
}

impl PanId {
    pub fn new(hex: impl Into<String>) -> Result<Self> {
        let hex = hex.into();
        let words = crate::codec::decode_hex_be_u16x4(&hex)?;
        Ok(Self {
            hex,
            registers: RegisterList::from(words),
        })
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }
}

/// West and east software end stops, stored as signed pulse counts.
#[derive(Clone, Debug, PartialEq)]
pub struct SoftwareMovementLimit {
    pub west_deg: f64,
    pub east_deg: f64,
    registers: RegisterList,
}

impl SoftwareMovementLimit {
    pub fn new(west_deg: f64, east_deg: f64) -> Result<Self> {
        let registers = RegisterList::new(vec![
            degrees_to_pulses(west_deg)?,
            degrees_to_pulses(east_deg)?,
        ]);
        Ok(Self {
            west_deg,
            east_deg,
            registers,
        })
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }
}

fn degrees_to_pulses(degrees: f64) -> Result<u16> {
    let pulses = (degrees * PULSES_PER_DEGREE).round();
    if !pulses.is_finite() {
        return Err(ValidationError::Invalid {
            field: "software movement limit",
            reason: format!("{degrees} is not a finite angle"),
        });
    }
    if pulses < f64::from(i16::MIN) || pulses > f64::from(i16::MAX) {
        return Err(ValidationError::OutOfRangeI16 {
            value: pulses as i64,
        });
    }
    encode_i16_as_u16(pulses as i64)
}

/// Labelled angles in degrees, sent as radians in caller order.
///
/// Used for both the smart limit table (west 1..7 then east 1..7) and the safe positions.
#[derive(Clone, Debug, PartialEq)]
pub struct AngleMap {
    angles: Vec<(String, f64)>,
    registers: RegisterList,
}

impl AngleMap {
    pub fn new<I, S>(angles: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let angles: Vec<(String, f64)> = angles
            .into_iter()
            .map(|(label, deg)| (label.into(), deg))
            .collect();
        let rads: Vec<f64> = angles.iter().map(|(_, deg)| radians(*deg)).collect();
        let registers = floats(&rads)?;
        Ok(Self { angles, registers })
    }

    pub fn angles(&self) -> &[(String, f64)] {
        &self.angles
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }
}

/// Signed 16-bit parameters sent back to back (offsets, timers, variations).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedWords {
    values: Vec<i64>,
    registers: RegisterList,
}

impl SignedWords {
    pub fn new(values: &[i64]) -> Result<Self> {
        let words = values
            .iter()
            .map(|v| encode_i16_as_u16(*v))
            .collect::<Result<Vec<u16>>>()?;
        Ok(Self {
            values: values.to_vec(),
            registers: RegisterList::new(words),
        })
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }
}

/// Wind speeds at which a wind alarm clears and triggers.
#[derive(Clone, Debug, PartialEq)]
pub struct WindSpeedThresholds {
    pub deactivation: f64,
    pub activation: f64,
    pub unit: WindSpeedUnit,
    registers: RegisterList,
}

impl WindSpeedThresholds {
    pub fn new(deactivation: f64, activation: f64, unit: WindSpeedUnit) -> Result<Self> {
        let registers = floats(&[unit.to_device(deactivation), unit.to_device(activation)])?;
        Ok(Self {
            deactivation,
            activation,
            unit,
            registers,
        })
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }
}

/// Snow depth alarm threshold in meters.
#[derive(Clone, Debug, PartialEq)]
pub struct SnowThreshold {
    pub meters: f64,
    registers: RegisterList,
}

impl SnowThreshold {
    pub fn new(meters: f64) -> Result<Self> {
        Ok(Self {
            meters,
            registers: floats(&[meters])?,
        })
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }
}

/// UTC wall clock as `[second, minute, hour, day, month, year]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockStamp {
    pub at: OffsetDateTime,
    registers: RegisterList,
}

impl ClockStamp {
    pub fn new(at: OffsetDateTime) -> Result<Self> {
        let utc = at.to_offset(UtcOffset::UTC);
        let registers = RegisterList::new(vec![
            u16::from(utc.second()),
            u16::from(utc.minute()),
            u16::from(utc.hour()),
            u16::from(utc.day()),
            u16::from(u8::from(utc.month())),
            encode_u16(i64::from(utc.year()))?,
        ]);
        Ok(Self { at: utc, registers })
    }

    pub fn now() -> Result<Self> {
        Self::new(OffsetDateTime::now_utc())
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }
}

/// Weather sensor enable flags; flag `i` is bit `i` of a single word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensorSelection {
    pub enabled: [bool; 5],
    registers: RegisterList,
}

impl SensorSelection {
    pub fn new(enabled: [bool; 5]) -> Self {
        let word = enabled
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .fold(0u16, |acc, (bit, _)| acc | (1 << bit));
        Self {
            enabled,
            registers: RegisterList::new(vec![word]),
        }
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_f32_le;
    use time::macros::datetime;

    fn f32_at(regs: &RegisterList, pair: usize) -> f32 {
        decode_f32_le([regs[pair * 2], regs[pair * 2 + 1]])
    }

    #[test]
    fn test_coordinates_layout() {
        let c = Coordinates::new(-0.028761, 0.746828).unwrap();
        assert_eq!(c.registers().len(), 4);
        assert_eq!(f32_at(c.registers(), 0), -0.028761_f64 as f32);
        assert_eq!(f32_at(c.registers(), 1), 0.746828_f64 as f32);
    }

    #[test]
    fn test_sun_tracking_layout() {
        let s = SunTracking::new(5.0, 2.01).unwrap();
        assert_eq!(&s.registers()[..2], &[0x0000, 0x40A0]);
        assert_eq!(f32_at(s.registers(), 1), 2.01_f64 as f32);
    }

    #[test]
    fn test_pan_id() {
        let p = PanId::new("0000000000000103").unwrap();
        assert_eq!(p.registers().as_slice(), &[0x0103, 0, 0, 0]);
        assert!(PanId::new("xyz").is_err());
    }

    #[test]
    fn test_software_limits_in_pulses() {
        let l = SoftwareMovementLimit::new(55.0, -55.0).unwrap();
        // 55 deg is 1909 pulses
        assert_eq!(l.registers().as_slice(), &[1909, (-1909_i16) as u16]);
    }

    #[test]
    fn test_software_limits_round_to_nearest() {
        // 1.0 deg is 34.709 pulses, 1.5 deg is 52.06 pulses
        let l = SoftwareMovementLimit::new(1.0, -1.5).unwrap();
        assert_eq!(l.registers().as_slice(), &[35, (-52_i16) as u16]);
    }

    #[test]
    fn test_software_limits_out_of_range() {
        // 1000 deg is 34709 pulses, beyond i16
        assert!(matches!(
            SoftwareMovementLimit::new(1000.0, 0.0),
            Err(ValidationError::OutOfRangeI16 { .. })
        ));
        assert!(SoftwareMovementLimit::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_angle_map_keeps_order() {
        let map = AngleMap::new(vec![("SP1", 25.0), ("SP2", 15.0), ("SP7", 0.0)]).unwrap();
        assert_eq!(map.registers().len(), 6);
        assert_eq!(f32_at(map.registers(), 0), radians(25.0) as f32);
        assert_eq!(f32_at(map.registers(), 1), radians(15.0) as f32);
        assert_eq!(&map.registers()[4..], &[0, 0]);
        assert_eq!(map.angles()[2].0, "SP7");
    }

    #[test]
    fn test_angle_map_negative_angles() {
        let map = AngleMap::new(vec![("east1".to_string(), -35.0)]).unwrap();
        let v = f32_at(map.registers(), 0);
        assert!(v < 0.0);
        assert!((f64::from(v) + 35.0_f64.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_signed_words() {
        let b = SignedWords::new(&[2, -3]).unwrap();
        assert_eq!(b.registers().as_slice(), &[2, 0xFFFD]);
        assert!(SignedWords::new(&[40000]).is_err());
        assert!(SignedWords::new(&[]).unwrap().registers().is_empty());
    }

    #[test]
    fn test_wind_thresholds_unit_policy() {
        let ms = WindSpeedThresholds::new(37.0, 42.0, WindSpeedUnit::MetersPerSecond).unwrap();
        assert_eq!(f32_at(ms.registers(), 0), 37.0);
        assert_eq!(f32_at(ms.registers(), 1), 42.0);

        let kmh = WindSpeedThresholds::new(36.0, 72.0, WindSpeedUnit::KilometersPerHour).unwrap();
        assert_eq!(f32_at(kmh.registers(), 0), (36.0_f64 / 3.6) as f32);
        assert_eq!(f32_at(kmh.registers(), 1), (72.0_f64 / 3.6) as f32);
    }

    #[test]
    fn test_snow_threshold() {
        let s = SnowThreshold::new(0.08).unwrap();
        assert_eq!(f32_at(s.registers(), 0), 0.08_f64 as f32);
    }

    #[test]
    fn test_clock_stamp_is_utc() {
        let c = ClockStamp::new(datetime!(2024-03-05 23:30:15 -01:00)).unwrap();
        assert_eq!(c.registers().as_slice(), &[15, 30, 0, 6, 3, 2024]);
    }

    #[test]
    fn test_sensor_bits() {
        let s = SensorSelection::new([true, false, false, false, false]);
        assert_eq!(s.registers().as_slice(), &[0b00001]);
        let s = SensorSelection::new([false, true, false, true, true]);
        assert_eq!(s.registers().as_slice(), &[0b11010]);
    }
}
