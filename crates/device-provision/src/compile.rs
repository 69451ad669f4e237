//! Turn a plan into fully encoded steps.
//!
//! Compilation encodes every value and resolves every address up front. A run starts only
//! from a [`CompiledPlan`], so a bad value in the last device still prevents the first write.

use crate::error::{ProvisionError, Result};
use crate::plan::{DevicePlan, FieldSpec, LabeledAngle, Operation, Plan};
use modbus_link::{UnitId, MAX_WRITE_REGISTERS};
use register_codec::{
    control, AngleMap, ConfigurationValue, Coordinates, DeviceClass, FieldKind, MaskedWrite,
    PanId, SensorSelection, SignedWords, SnowThreshold, SoftwareMovementLimit, SunTracking,
    TelemetryTable, ValidationError, WindSpeedThresholds,
};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Clock handshake; the timestamp is taken when the step runs.
    SyncClock { unit: UnitId },
    Write {
        unit: UnitId,
        address: u16,
        value: ConfigurationValue,
    },
    Masked {
        unit: UnitId,
        label: &'static str,
        write: MaskedWrite,
    },
    Save { unit: UnitId },
}

impl Step {
    pub fn unit(&self) -> UnitId {
        match self {
            Step::SyncClock { unit }
            | Step::Write { unit, .. }
            | Step::Masked { unit, .. }
            | Step::Save { unit } => *unit,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Step::SyncClock { .. } => "sync_clock".to_string(),
            Step::Write { address, value, .. } => format!("{} @{address}", value.kind()),
            Step::Masked { label, write, .. } => format!("{label} @{}", write.address),
            Step::Save { .. } => "save".to_string(),
        }
    }

    pub fn summary(&self) -> StepSummary {
        let mut s = StepSummary {
            label: self.label(),
            unit: self.unit(),
            address: None,
            registers: Vec::new(),
            and_mask: None,
            or_mask: None,
        };
        match self {
            Step::Write { address, value, .. } => {
                s.address = Some(*address);
                s.registers = value.registers().to_vec();
            }
            Step::Masked { write, .. } => {
                s.address = Some(write.address);
                s.and_mask = Some(write.and_mask);
                s.or_mask = Some(write.or_mask);
            }
            Step::SyncClock { .. } | Step::Save { .. } => {}
        }
        s
    }
}

/// Printable view of a step for dry runs.
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub label: String,
    pub unit: UnitId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub registers: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub and_mask: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub or_mask: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct CompiledDevice {
    pub name: String,
    pub class: DeviceClass,
    pub unit_id: UnitId,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default)]
pub struct CompiledPlan {
    pub devices: Vec<CompiledDevice>,
}

impl CompiledPlan {
    pub fn step_count(&self) -> usize {
        self.devices.iter().map(|d| d.steps.len()).sum()
    }
}

pub fn compile(plan: &Plan) -> Result<CompiledPlan> {
    let mut seen = HashSet::new();
    let mut devices = Vec::with_capacity(plan.devices.len());
    for dev in &plan.devices {
        if !seen.insert(dev.name.as_str()) {
            return Err(ProvisionError::DuplicateDevice(dev.name.clone()));
        }
        devices.push(compile_device(dev)?);
    }
    tracing::debug!(devices = devices.len(), "plan compiled");
    Ok(CompiledPlan { devices })
}

pub fn compile_device(dev: &DevicePlan) -> Result<CompiledDevice> {
    check_unit(&dev.name, dev.unit_id)?;
    let mut steps = Vec::with_capacity(dev.operations.len());
    for (index, op) in dev.operations.iter().enumerate() {
        let step = compile_op(dev, op).map_err(|source| ProvisionError::Validation {
            device: dev.name.clone(),
            index,
            op: op_name(op),
            source,
        })?;
        check_unit(&dev.name, step.unit())?;
        steps.push(step);
    }
    Ok(CompiledDevice {
        name: dev.name.clone(),
        class: dev.class,
        unit_id: dev.unit_id,
        steps,
    })
}

fn check_unit(device: &str, unit_id: UnitId) -> Result<()> {
    if (1..=247).contains(&unit_id) {
        Ok(())
    } else {
        Err(ProvisionError::InvalidUnit {
            device: device.to_string(),
            unit_id,
        })
    }
}

fn op_name(op: &Operation) -> &'static str {
    match op {
        Operation::SyncClock { .. } => "sync_clock",
        Operation::Write { .. } => "write",
        Operation::CommissioningState { .. } => "commissioning_state",
        Operation::SetModbusId { .. } => "set_modbus_id",
        Operation::ResetCommunication { .. } => "reset_communication",
        Operation::Save { .. } => "save",
    }
}

fn compile_op(dev: &DevicePlan, op: &Operation) -> register_codec::Result<Step> {
    let unit_of = |o: &Option<u8>| o.unwrap_or(dev.unit_id);
    let step = match op {
        Operation::SyncClock { unit_id } => Step::SyncClock {
            unit: unit_of(unit_id),
        },
        Operation::Write {
            field,
            address,
            unit_id,
        } => {
            let value = build_value(dev.class, field)?;
            let kind = value.kind();
            if value.registers().is_empty() {
                return Err(ValidationError::Invalid {
                    field: kind.name(),
                    reason: "nothing to write".to_string(),
                });
            }
            if value.registers().len() > MAX_WRITE_REGISTERS {
                return Err(ValidationError::Invalid {
                    field: kind.name(),
                    reason: format!(
                        "{} registers exceed a single write of {MAX_WRITE_REGISTERS}",
                        value.registers().len()
                    ),
                });
            }
            Step::Write {
                unit: unit_of(unit_id),
                address: dev.class.resolve_address(kind, *address)?,
                value,
            }
        }
        Operation::CommissioningState {
            state,
            address,
            unit_id,
        } => Step::Masked {
            unit: unit_of(unit_id),
            label: "commissioning_state",
            write: relocate(dev.class, state.masked_write(), *address, "commissioning_state")?,
        },
        Operation::SetModbusId {
            new_id,
            address,
            unit_id,
        } => {
            if !(1..=247).contains(new_id) {
                return Err(ValidationError::Invalid {
                    field: "set_modbus_id",
                    reason: format!("unit id {new_id} outside 1..=247"),
                });
            }
            Step::Masked {
                unit: unit_of(unit_id),
                label: "set_modbus_id",
                write: relocate(
                    dev.class,
                    control::set_modbus_id(*new_id),
                    *address,
                    "set_modbus_id",
                )?,
            }
        }
        Operation::ResetCommunication { address, unit_id } => Step::Masked {
            unit: unit_of(unit_id),
            label: "reset_communication",
            write: relocate(
                dev.class,
                control::reset_communication(),
                *address,
                "reset_communication",
            )?,
        },
        Operation::Save { unit_id } => Step::Save {
            unit: unit_of(unit_id),
        },
    };
    Ok(step)
}

/// Masked control words are only mapped on the tracker; other classes need an address.
fn relocate(
    class: DeviceClass,
    write: MaskedWrite,
    address: Option<u16>,
    field: &'static str,
) -> register_codec::Result<MaskedWrite> {
    match (address, class) {
        (Some(address), _) => Ok(MaskedWrite { address, ..write }),
        (None, DeviceClass::Tsc) => Ok(write),
        (None, _) => Err(ValidationError::MissingAddress {
            field,
            class: class.as_str(),
        }),
    }
}

fn angles(list: &[LabeledAngle]) -> register_codec::Result<AngleMap> {
    AngleMap::new(list.iter().map(|a| (a.label.clone(), a.degrees)))
}

/// Encode one field for `class`.
pub fn build_value(
    class: DeviceClass,
    field: &FieldSpec,
) -> register_codec::Result<ConfigurationValue> {
    use ConfigurationValue as V;
    let value = match field {
        FieldSpec::Telemetry { packages } => {
            V::Telemetry(TelemetryTable::new(class, packages.iter().copied())?)
        }
        FieldSpec::Coordinates {
            longitude,
            latitude,
        } => V::Coordinates(Coordinates::new(*longitude, *latitude)?),
        FieldSpec::SunTracking { pitch, panel_width } => {
            V::SunTracking(SunTracking::new(*pitch, *panel_width)?)
        }
        FieldSpec::PanId { pan_id } => V::PanId(PanId::new(pan_id.as_str())?),
        FieldSpec::SoftwareMovementLimit { west_deg, east_deg } => {
            V::SoftwareMovementLimit(SoftwareMovementLimit::new(*west_deg, *east_deg)?)
        }
        FieldSpec::SmartLimits { angles: list } => V::SmartLimits(angles(list)?),
        FieldSpec::SafePositions { angles: list } => V::SafePositions(angles(list)?),
        FieldSpec::Backtracking3d { values } => V::Backtracking3d(SignedWords::new(values)?),
        FieldSpec::WindSpeedThresholds {
            deactivation,
            activation,
            unit,
        } => V::WindSpeedThresholds(WindSpeedThresholds::new(
            *deactivation,
            *activation,
            *unit,
        )?),
        FieldSpec::WindAlarmTime { values } => {
            if values.is_empty() || values.len() > 2 {
                return Err(ValidationError::Invalid {
                    field: FieldKind::WindAlarmTime.name(),
                    reason: format!("expected 1 or 2 values, got {}", values.len()),
                });
            }
            V::WindAlarmTime(SignedWords::new(values)?)
        }
        FieldSpec::AvgTime { value } => V::AvgTime(SignedWords::new(&[*value])?),
        FieldSpec::RelaxTime { value } => V::RelaxTime(SignedWords::new(&[*value])?),
        FieldSpec::SnowThreshold { meters } => V::SnowThreshold(SnowThreshold::new(*meters)?),
        FieldSpec::SnowActivationTime { value } => {
            V::SnowActivationTime(SignedWords::new(&[*value])?)
        }
        FieldSpec::SnowDeactivationTime { value } => {
            V::SnowDeactivationTime(SignedWords::new(&[*value])?)
        }
        FieldSpec::SnowSampleTime { value } => V::SnowSampleTime(SignedWords::new(&[*value])?),
        FieldSpec::SnowMaxVariation { value } => {
            V::SnowMaxVariation(SignedWords::new(&[*value])?)
        }
        FieldSpec::Sensors { enabled } => V::Sensors(SensorSelection::new(*enabled)),
    };
    Ok(value)
}
