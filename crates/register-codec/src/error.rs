use thiserror::Error;

pub type Result<T, E = ValidationError> = core::result::Result<T, E>;

/// Construction-time failures. A value that fails here never yields registers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("value {value} does not fit a signed 16-bit register")]
    OutOfRangeI16 { value: i64 },
    #[error("value {value} does not fit an unsigned 16-bit register")]
    OutOfRangeU16 { value: i64 },
    #[error("value {value} overflows a 32-bit float")]
    FloatOverflow { value: f64 },
    #[error("invalid PAN identifier {0:?}: expected 16 hex digits")]
    InvalidHex(String),
    #[error("too many {class} packages: {count} (max {max})")]
    TooManyPackages {
        class: &'static str,
        count: usize,
        max: usize,
    },
    #[error("too many {class} registers: {total} (max {max})")]
    TooManyRegisters {
        class: &'static str,
        total: u32,
        max: u32,
    },
    #[error("{class} package {index} spans {count} registers, slot holds at most {max}")]
    CountTooWide {
        class: &'static str,
        index: usize,
        count: u16,
        max: u16,
    },
    #[error("no register address known for {field} on {class}")]
    MissingAddress {
        field: &'static str,
        class: &'static str,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}
