use crate::compile::{CompiledDevice, CompiledPlan, Step};
use crate::error::StepError;
use crate::metrics::MetricsHub;
use crate::report::{DeviceReport, ProvisionReport, StepOutcome};
use modbus_link::{ModbusLink, TransportError, UnitId};
use register_codec::address::{REG_EXTENDED_CONTROL, SAVE_NON_VOLATILE};
use register_codec::{control, ClockStamp, ConfigurationValue, DeviceClass};
use time::OffsetDateTime;
use tracing::{info, warn};

/// Applies compiled plans over a [`ModbusLink`].
///
/// Steps run in order. A step that fails is logged and skipped; later steps still run and
/// earlier writes stay on the device.
pub struct Provisioner<L> {
    link: L,
    metrics: Option<MetricsHub>,
    clock: fn() -> OffsetDateTime,
}

impl<L: ModbusLink> Provisioner<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            metrics: None,
            clock: OffsetDateTime::now_utc,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHub) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Time source for clock sync steps.
    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn into_link(self) -> L {
        self.link
    }

    pub fn run(&mut self, plan: &CompiledPlan) -> ProvisionReport {
        let devices = plan.devices.iter().map(|d| self.run_device(d)).collect();
        let report = ProvisionReport { devices };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "provisioning finished"
        );
        report
    }

    pub fn run_device(&mut self, dev: &CompiledDevice) -> DeviceReport {
        let mut steps = Vec::with_capacity(dev.steps.len());
        for (index, step) in dev.steps.iter().enumerate() {
            let label = step.label();
            let error = match self.execute(dev.class, step) {
                Ok(()) => {
                    info!(device = %dev.name, unit = step.unit(), step = %label, "done");
                    None
                }
                Err(e) => {
                    warn!(
                        device = %dev.name,
                        unit = step.unit(),
                        step = %label,
                        error = %e,
                        "skipped"
                    );
                    if let Some(m) = &self.metrics {
                        m.prov.skipped_steps.inc();
                    }
                    Some(e.to_string())
                }
            };
            steps.push(StepOutcome {
                index,
                label,
                unit: step.unit(),
                error,
            });
        }
        let report = DeviceReport {
            name: dev.name.clone(),
            unit_id: dev.unit_id,
            steps,
        };
        if report.is_clean() {
            if let Some(m) = &self.metrics {
                m.prov.devices_provisioned.inc();
            }
        }
        report
    }

    fn execute(&mut self, class: DeviceClass, step: &Step) -> Result<(), StepError> {
        match step {
            Step::SyncClock { unit } => self.sync_clock(class, *unit),
            Step::Write {
                unit,
                address,
                value,
            } => Ok(self.write_multiple(*unit, *address, value.registers())?),
            Step::Masked { unit, write, .. } => Ok(self.masked(
                *unit,
                write.address,
                write.and_mask,
                write.or_mask,
            )?),
            Step::Save { unit } => {
                Ok(self.write_single(*unit, REG_EXTENDED_CONTROL, SAVE_NON_VOLATILE)?)
            }
        }
    }

    /// Unlock the clock, write `[s, min, h, day, month, year]`, latch. Any failure leaves
    /// the unlock bits cleared again.
    fn sync_clock(&mut self, class: DeviceClass, unit: UnitId) -> Result<(), StepError> {
        let stamp = ConfigurationValue::Clock(ClockStamp::new((self.clock)())?);
        let address = class.resolve_address(stamp.kind(), None)?;
        let res = self
            .clock_control(class, unit, 1)
            .and_then(|()| self.write_multiple(unit, address, stamp.registers()))
            .and_then(|()| self.clock_control(class, unit, 3));
        if let Err(e) = res {
            if let Err(abort) = self.clock_control(class, unit, 0) {
                warn!(unit, error = %abort, "cannot clear clock change request");
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn clock_control(
        &mut self,
        class: DeviceClass,
        unit: UnitId,
        step: u16,
    ) -> Result<(), TransportError> {
        match class {
            DeviceClass::Tsc => {
                let w = control::tsc_clock_control(step);
                self.masked(unit, w.address, w.and_mask, w.or_mask)
            }
            DeviceClass::Iwc => self.write_single(unit, REG_EXTENDED_CONTROL, step),
        }
    }

    fn write_single(
        &mut self,
        unit: UnitId,
        address: u16,
        value: u16,
    ) -> Result<(), TransportError> {
        let res = self.link.write_single_register(unit, address, value);
        self.count(&res);
        res
    }

    fn write_multiple(
        &mut self,
        unit: UnitId,
        address: u16,
        values: &[u16],
    ) -> Result<(), TransportError> {
        let res = self.link.write_multiple_registers(unit, address, values);
        self.count(&res);
        res
    }

    fn masked(
        &mut self,
        unit: UnitId,
        address: u16,
        and_mask: u16,
        or_mask: u16,
    ) -> Result<(), TransportError> {
        let res = self
            .link
            .masked_write_register(unit, address, and_mask, or_mask);
        self.count(&res);
        res
    }

    fn count(&self, res: &Result<(), TransportError>) {
        if let Some(m) = &self.metrics {
            match res {
                Ok(()) => m.prov.register_writes.inc(),
                Err(_) => m.prov.failed_requests.inc(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile_device;
    use crate::plan::{DevicePlan, FieldSpec, Operation};
    use modbus_link::{MockLink, Request};
    use time::macros::datetime;

    fn fixed_clock() -> OffsetDateTime {
        datetime!(2025-06-01 12:34:56 UTC)
    }

    fn clock_only(class: DeviceClass) -> CompiledDevice {
        compile_device(&DevicePlan {
            name: "d".to_string(),
            class,
            unit_id: 7,
            operations: vec![Operation::SyncClock { unit_id: None }],
        })
        .unwrap()
    }

    #[test]
    fn test_tsc_clock_handshake() {
        let link = MockLink::new().with_register(7, 40007, 0x8000);
        let mut p = Provisioner::new(link).with_clock(fixed_clock);
        let report = p.run_device(&clock_only(DeviceClass::Tsc));
        assert!(report.is_clean());

        let link = p.into_link();
        assert_eq!(link.block(7, 40001, 6), vec![56, 34, 12, 1, 6, 2025]);
        // handshake bits latched, upper bits untouched
        assert_eq!(link.value(7, 40007), 0x8003);
        assert!(matches!(
            link.journal()[0],
            Request::MaskedWrite {
                and_mask: 0xFFFC,
                or_mask: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_iwc_clock_uses_plain_writes() {
        let mut p = Provisioner::new(MockLink::new()).with_clock(fixed_clock);
        assert!(p.run_device(&clock_only(DeviceClass::Iwc)).is_clean());
        let journal = p.link().journal();
        assert_eq!(
            journal[0],
            Request::WriteSingle {
                unit: 7,
                address: 40007,
                value: 1
            }
        );
        assert_eq!(
            journal[2],
            Request::WriteSingle {
                unit: 7,
                address: 40007,
                value: 3
            }
        );
    }

    #[test]
    fn test_clock_failure_clears_request() {
        let link = MockLink::new().fail_address(40003);
        let mut p = Provisioner::new(link).with_clock(fixed_clock);
        let report = p.run_device(&clock_only(DeviceClass::Iwc));
        assert_eq!(report.failed().count(), 1);
        let journal = p.link().journal();
        assert_eq!(journal.len(), 3);
        assert_eq!(
            journal[2],
            Request::WriteSingle {
                unit: 7,
                address: 40007,
                value: 0
            }
        );
        assert_eq!(p.link().value(7, 40007), 0);
    }

    #[test]
    fn test_failed_step_is_skipped_not_fatal() {
        let dev = compile_device(&DevicePlan {
            name: "tracker".to_string(),
            class: DeviceClass::Tsc,
            unit_id: 121,
            operations: vec![
                Operation::Write {
                    field: FieldSpec::Coordinates {
                        longitude: 1.0,
                        latitude: 2.0,
                    },
                    address: None,
                    unit_id: None,
                },
                Operation::Write {
                    field: FieldSpec::SunTracking {
                        pitch: 5.0,
                        panel_width: 2.01,
                    },
                    address: None,
                    unit_id: None,
                },
                Operation::Save { unit_id: None },
            ],
        })
        .unwrap();
        let metrics = MetricsHub::new().unwrap();
        let link = MockLink::new().fail_address(41010);
        let mut p = Provisioner::new(link).with_metrics(metrics.clone());
        let report = p.run_device(&dev);

        assert!(!report.is_clean());
        assert_eq!(report.failed().count(), 1);
        assert!(report.steps[1].ok());
        assert_eq!(p.link().value(121, 40007), 0x8000);
        assert_eq!(metrics.prov.register_writes.get(), 2);
        assert_eq!(metrics.prov.failed_requests.get(), 1);
        assert_eq!(metrics.prov.skipped_steps.get(), 1);
        assert_eq!(metrics.prov.devices_provisioned.get(), 0);
        assert!(metrics.encode_text().contains("prov_skipped_steps 1"));
    }
}
