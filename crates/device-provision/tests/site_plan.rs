use device_provision::{
    compile, parse_plan, FieldSpec, MetricsHub, Operation, ProvisionError, Provisioner,
};
use modbus_link::MockLink;
use register_codec::ValidationError;
use time::macros::datetime;
use time::OffsetDateTime;

const SITE: &str = include_str!("../../../configs/plans/site.yaml");

fn fixed_clock() -> OffsetDateTime {
    datetime!(2025-03-14 09:26:53 UTC)
}

#[test]
fn site_plan_provisions_both_devices() {
    let plan = parse_plan(SITE).unwrap();
    let compiled = compile(&plan).unwrap();
    assert_eq!(compiled.devices.len(), 2);
    assert_eq!(compiled.step_count(), 13 + 19);

    let metrics = MetricsHub::new().unwrap();
    let mut p = Provisioner::new(MockLink::new())
        .with_clock(fixed_clock)
        .with_metrics(metrics.clone());
    let report = p.run(&compiled);
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.succeeded(), 32);
    assert_eq!(metrics.prov.devices_provisioned.get(), 2);

    let link = p.into_link();

    // tracker
    assert_eq!(link.block(121, 40001, 6), vec![53, 26, 9, 14, 3, 2025]);
    let telemetry = link.block(121, 45000, 36);
    assert_eq!(telemetry[0], 30000);
    assert_eq!(telemetry[11], 30064);
    assert_eq!(&telemetry[24..30], &[260, 257, 513, 2570, 770, 257]);
    assert_eq!(link.block(121, 41037, 2), vec![1909, 63627]);
    assert_eq!(link.block(121, 41070, 4), vec![0x0103, 0, 0, 0]);
    assert_eq!(link.value(121, 40000), 0);
    assert_eq!(link.value(121, 40007), 0x8000);
    // renumbered and reset through the factory address
    assert_eq!(link.value(225, 41004), 0x0179);

    // weather controller
    let telemetry = link.block(230, 41224, 15);
    assert_eq!(&telemetry[..6], &[30000, 40001, 41008, 41213, 41221, 50026]);
    assert_eq!(&telemetry[10..], &[4462, 33, 0, 0, 0]);
    assert_eq!(link.value(230, 41319), 20);
    assert_eq!(link.value(230, 41340), 1);
    assert_eq!(link.value(230, 40007), 0x8000);
    assert_eq!(link.value(230, 41004), 231);
}

#[test]
fn invalid_last_operation_rejects_whole_plan() {
    let mut plan = parse_plan(SITE).unwrap();
    let iwc = &mut plan.devices[1];
    iwc.operations.push(Operation::Write {
        field: FieldSpec::Telemetry {
            packages: vec![(30000, 15), (30100, 15), (30200, 1)],
        },
        address: None,
        unit_id: None,
    });

    match compile(&plan) {
        Err(ProvisionError::Validation {
            device,
            index,
            source,
            ..
        }) => {
            assert_eq!(device, "weather-1");
            assert_eq!(index, 19);
            assert!(matches!(
                source,
                ValidationError::TooManyRegisters { total: 31, .. }
            ));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn offline_device_does_not_stop_the_run() {
    let compiled = compile(&parse_plan(SITE).unwrap()).unwrap();
    let link = MockLink::new().offline_unit(230);
    let mut p = Provisioner::new(link).with_clock(fixed_clock);
    let report = p.run(&compiled);

    assert!(report.devices[0].is_clean());
    assert_eq!(report.devices[1].failed().count(), 19);
    assert_eq!(report.failed(), 19);
    assert_eq!(p.link().value(121, 40007), 0x8000);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["devices"][1]["steps"][0]["label"], "sync_clock");
    assert!(json["devices"][0]["steps"][0].get("error").is_none());
}
