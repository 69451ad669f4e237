//! register-codec: tracker and weather-controller settings as Modbus register words
//!
//! Every encoder is a value object: it validates in its constructor and carries its
//! [`RegisterList`] from then on. Nothing in this crate performs I/O or knows about the
//! transport; destination addresses live in [`address`].

mod error;
pub use error::{Result, ValidationError};

mod types;
pub use types::{BankLayout, DeviceClass, PackageEntry, RegisterList, WindSpeedUnit};

pub mod codec;

pub mod fields;
pub use fields::{
    AngleMap, ClockStamp, Coordinates, PanId, SensorSelection, SignedWords, SnowThreshold,
    SoftwareMovementLimit, SunTracking, WindSpeedThresholds,
};

mod telemetry;
pub use telemetry::{pack, table_len, TelemetryTable};

mod value;
pub use value::{ConfigurationValue, FieldKind};

pub mod address;

pub mod control;
pub use control::{CommissioningState, MaskedWrite};
