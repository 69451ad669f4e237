use crate::fields::{
    AngleMap, ClockStamp, Coordinates, PanId, SensorSelection, SignedWords, SnowThreshold,
    SoftwareMovementLimit, SunTracking, WindSpeedThresholds,
};
use crate::{RegisterList, TelemetryTable};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Which device setting a payload programs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Telemetry,
    Coordinates,
    SunTracking,
    PanId,
    SoftwareMovementLimit,
    SmartLimits,
    SafePositions,
    Backtracking3d,
    WindSpeedThresholds,
    WindAlarmTime,
    AvgTime,
    RelaxTime,
    SnowThreshold,
    SnowActivationTime,
    SnowDeactivationTime,
    SnowSampleTime,
    SnowMaxVariation,
    Clock,
    Sensors,
}

impl FieldKind {
    pub const fn name(self) -> &'static str {
        match self {
            FieldKind::Telemetry => "telemetry",
            FieldKind::Coordinates => "coordinates",
            FieldKind::SunTracking => "sun_tracking",
            FieldKind::PanId => "pan_id",
            FieldKind::SoftwareMovementLimit => "software_movement_limit",
            FieldKind::SmartLimits => "smart_limits",
            FieldKind::SafePositions => "safe_positions",
            FieldKind::Backtracking3d => "backtracking3d",
            FieldKind::WindSpeedThresholds => "wind_speed_thresholds",
            FieldKind::WindAlarmTime => "wind_alarm_time",
            FieldKind::AvgTime => "avg_time",
            FieldKind::RelaxTime => "relax_time",
            FieldKind::SnowThreshold => "snow_threshold",
            FieldKind::SnowActivationTime => "snow_activation_time",
            FieldKind::SnowDeactivationTime => "snow_deactivation_time",
            FieldKind::SnowSampleTime => "snow_sample_time",
            FieldKind::SnowMaxVariation => "snow_max_variation",
            FieldKind::Clock => "clock",
            FieldKind::Sensors => "sensors",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every setting this tool can program, already validated and encoded.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigurationValue {
    Telemetry(TelemetryTable),
    Coordinates(Coordinates),
    SunTracking(SunTracking),
    PanId(PanId),
    SoftwareMovementLimit(SoftwareMovementLimit),
    SmartLimits(AngleMap),
    SafePositions(AngleMap),
    Backtracking3d(SignedWords),
    WindSpeedThresholds(WindSpeedThresholds),
    WindAlarmTime(SignedWords),
    AvgTime(SignedWords),
    RelaxTime(SignedWords),
    SnowThreshold(SnowThreshold),
    SnowActivationTime(SignedWords),
    SnowDeactivationTime(SignedWords),
    SnowSampleTime(SignedWords),
    SnowMaxVariation(SignedWords),
    Clock(ClockStamp),
    Sensors(SensorSelection),
}

impl ConfigurationValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            ConfigurationValue::Telemetry(_) => FieldKind::Telemetry,
            ConfigurationValue::Coordinates(_) => FieldKind::Coordinates,
            ConfigurationValue::SunTracking(_) => FieldKind::SunTracking,
            ConfigurationValue::PanId(_) => FieldKind::PanId,
            ConfigurationValue::SoftwareMovementLimit(_) => FieldKind::SoftwareMovementLimit,
            ConfigurationValue::SmartLimits(_) => FieldKind::SmartLimits,
            ConfigurationValue::SafePositions(_) => FieldKind::SafePositions,
            ConfigurationValue::Backtracking3d(_) => FieldKind::Backtracking3d,
            ConfigurationValue::WindSpeedThresholds(_) => FieldKind::WindSpeedThresholds,
            ConfigurationValue::WindAlarmTime(_) => FieldKind::WindAlarmTime,
            ConfigurationValue::AvgTime(_) => FieldKind::AvgTime,
            ConfigurationValue::RelaxTime(_) => FieldKind::RelaxTime,
            ConfigurationValue::SnowThreshold(_) => FieldKind::SnowThreshold,
            ConfigurationValue::SnowActivationTime(_) => FieldKind::SnowActivationTime,
            ConfigurationValue::SnowDeactivationTime(_) => FieldKind::SnowDeactivationTime,
            ConfigurationValue::SnowSampleTime(_) => FieldKind::SnowSampleTime,
            ConfigurationValue::SnowMaxVariation(_) => FieldKind::SnowMaxVariation,
            ConfigurationValue::Clock(_) => FieldKind::Clock,
            ConfigurationValue::Sensors(_) => FieldKind::Sensors,
        }
    }

    pub fn registers(&self) -> &RegisterList {
        match self {
            ConfigurationValue::Telemetry(v) => v.registers(),
            ConfigurationValue::Coordinates(v) => v.registers(),
            ConfigurationValue::SunTracking(v) => v.registers(),
            ConfigurationValue::PanId(v) => v.registers(),
            ConfigurationValue::SoftwareMovementLimit(v) => v.registers(),
            ConfigurationValue::SmartLimits(v) | ConfigurationValue::SafePositions(v) => {
                v.registers()
            }
            ConfigurationValue::Backtracking3d(v)
            | ConfigurationValue::WindAlarmTime(v)
            | ConfigurationValue::AvgTime(v)
            | ConfigurationValue::RelaxTime(v)
            | ConfigurationValue::SnowActivationTime(v)
            | ConfigurationValue::SnowDeactivationTime(v)
            | ConfigurationValue::SnowSampleTime(v)
            | ConfigurationValue::SnowMaxVariation(v) => v.registers(),
            ConfigurationValue::WindSpeedThresholds(v) => v.registers(),
            ConfigurationValue::SnowThreshold(v) => v.registers(),
            ConfigurationValue::Clock(v) => v.registers(),
            ConfigurationValue::Sensors(v) => v.registers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceClass;

    #[test]
    fn test_dispatch() {
        let v = ConfigurationValue::PanId(PanId::new("0000000000000103").unwrap());
        assert_eq!(v.kind(), FieldKind::PanId);
        assert_eq!(v.registers().as_slice(), &[0x0103, 0, 0, 0]);

        let t = TelemetryTable::new(DeviceClass::Iwc, vec![(30000u16, 4u16)]).unwrap();
        let v = ConfigurationValue::Telemetry(t);
        assert_eq!(v.kind().name(), "telemetry");
        assert_eq!(v.registers().len(), 15);

        let v = ConfigurationValue::RelaxTime(SignedWords::new(&[20]).unwrap());
        assert_eq!(v.registers().as_slice(), &[20]);

        let at = time::macros::datetime!(2025-06-01 12:34:56 UTC);
        let v = ConfigurationValue::Clock(ClockStamp::new(at).unwrap());
        assert_eq!(v.kind(), FieldKind::Clock);
        assert_eq!(v.registers().as_slice(), &[56, 34, 12, 1, 6, 2025]);
        assert_eq!(DeviceClass::Tsc.resolve_address(v.kind(), None).unwrap(), 40001);
    }
}
