use modbus_link::UnitId;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub label: String,
    pub unit: UnitId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub name: String,
    pub unit_id: UnitId,
    pub steps: Vec<StepOutcome>,
}

impl DeviceReport {
    pub fn failed(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| !s.ok())
    }

    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(StepOutcome::ok)
    }
}

/// What happened to every step of a run. Failed steps were skipped, not rolled back.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionReport {
    pub devices: Vec<DeviceReport>,
}

impl ProvisionReport {
    pub fn succeeded(&self) -> usize {
        self.devices
            .iter()
            .map(|d| d.steps.iter().filter(|s| s.ok()).count())
            .sum()
    }

    pub fn failed(&self) -> usize {
        self.devices.iter().map(|d| d.failed().count()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.devices.iter().all(DeviceReport::is_clean)
    }
}
