use modbus_link::TransportError;
use register_codec::ValidationError;
use thiserror::Error;

pub type Result<T, E = ProvisionError> = core::result::Result<T, E>;

/// Plan-level failures; any of these stops a run before the first register write.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{device}: operation {index} ({op}): {source}")]
    Validation {
        device: String,
        index: usize,
        op: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("{device}: invalid unit id {unit_id} (expected 1..=247)")]
    InvalidUnit { device: String, unit_id: u8 },
    #[error("duplicate device name: {0}")]
    DuplicateDevice(String),
}

/// Why a single step did not complete.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
