use register_codec::{CommissioningState, DeviceClass, WindSpeedUnit};
use serde::{Deserialize, Serialize};

/// A provisioning run: devices are processed in file order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub devices: Vec<DevicePlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicePlan {
    pub name: String,
    pub class: DeviceClass,
    pub unit_id: u8,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// One device operation. `unit_id` overrides the device unit for that operation only,
/// which is how a factory-addressed device gets renumbered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    SyncClock {
        #[serde(default)]
        unit_id: Option<u8>,
    },
    Write {
        field: FieldSpec,
        #[serde(default)]
        address: Option<u16>,
        #[serde(default)]
        unit_id: Option<u8>,
    },
    CommissioningState {
        state: CommissioningState,
        #[serde(default)]
        address: Option<u16>,
        #[serde(default)]
        unit_id: Option<u8>,
    },
    SetModbusId {
        new_id: u8,
        #[serde(default)]
        address: Option<u16>,
        #[serde(default)]
        unit_id: Option<u8>,
    },
    ResetCommunication {
        #[serde(default)]
        address: Option<u16>,
        #[serde(default)]
        unit_id: Option<u8>,
    },
    Save {
        #[serde(default)]
        unit_id: Option<u8>,
    },
}

/// Raw field values as written in a plan file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSpec {
    Telemetry {
        /// `[code, register_count]` pairs in polling order.
        packages: Vec<(u16, u16)>,
    },
    Coordinates {
        longitude: f64,
        latitude: f64,
    },
    SunTracking {
        pitch: f64,
        panel_width: f64,
    },
    PanId {
        pan_id: String,
    },
    SoftwareMovementLimit {
        west_deg: f64,
        east_deg: f64,
    },
    SmartLimits {
        angles: Vec<LabeledAngle>,
    },
    SafePositions {
        angles: Vec<LabeledAngle>,
    },
    Backtracking3d {
        values: [i64; 2],
    },
    WindSpeedThresholds {
        deactivation: f64,
        activation: f64,
        #[serde(default)]
        unit: WindSpeedUnit,
    },
    WindAlarmTime {
        values: Vec<i64>,
    },
    AvgTime {
        value: i64,
    },
    RelaxTime {
        value: i64,
    },
    SnowThreshold {
        meters: f64,
    },
    SnowActivationTime {
        value: i64,
    },
    SnowDeactivationTime {
        value: i64,
    },
    SnowSampleTime {
        value: i64,
    },
    SnowMaxVariation {
        value: i64,
    },
    Sensors {
        enabled: [bool; 5],
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledAngle {
    pub label: String,
    pub degrees: f64,
}
