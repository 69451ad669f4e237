use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct ProvisionMetrics {
    pub register_writes: IntCounter,
    pub failed_requests: IntCounter,
    pub skipped_steps: IntCounter,
    pub devices_provisioned: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub prov: ProvisionMetrics,
}

impl MetricsHub {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();
        let register_writes =
            IntCounter::new("prov_register_writes", "Register write requests accepted")
                .map_err(|e| format!("metrics init error: {e}"))?;
        let failed_requests =
            IntCounter::new("prov_failed_requests", "Register requests that failed")
                .map_err(|e| format!("metrics init error: {e}"))?;
        let skipped_steps = IntCounter::new("prov_skipped_steps", "Provisioning steps skipped")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let devices_provisioned = IntGauge::new(
            "prov_devices_provisioned",
            "Devices whose every step succeeded",
        )
        .map_err(|e| format!("metrics init error: {e}"))?;
        let prov = ProvisionMetrics {
            register_writes,
            failed_requests,
            skipped_steps,
            devices_provisioned,
        };
        let _ = registry.register(Box::new(prov.register_writes.clone()));
        let _ = registry.register(Box::new(prov.failed_requests.clone()));
        let _ = registry.register(Box::new(prov.skipped_steps.clone()));
        let _ = registry.register(Box::new(prov.devices_provisioned.clone()));
        Ok(Self { registry, prov })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
