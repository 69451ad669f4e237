//! device-provision: apply tracker and weather-controller settings over Modbus
//!
//! A run has two phases. [`compile`] validates and encodes a whole [`Plan`] without touching
//! the network; [`Provisioner`] then issues the register requests step by step.

pub mod plan;
pub use plan::{DevicePlan, FieldSpec, LabeledAngle, Operation, Plan};

mod error;
pub use error::{ProvisionError, Result, StepError};

mod loader;
pub use loader::{load_plan_file, load_plans_dir, parse_plan};

mod compile;
pub use compile::{
    build_value, compile, compile_device, CompiledDevice, CompiledPlan, Step, StepSummary,
};

mod report;
pub use report::{DeviceReport, ProvisionReport, StepOutcome};

mod metrics;
pub use metrics::{MetricsHub, ProvisionMetrics};

mod provision;
pub use provision::Provisioner;
