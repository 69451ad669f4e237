use core::fmt;

/// Modbus unit (slave) identifier.
pub type UnitId = u8;

/// Register limit of a single write-multiple request (FC16).
pub const MAX_WRITE_REGISTERS: usize = 123;
/// Register limit of a single read request (FC03).
pub const MAX_READ_REGISTERS: u16 = 125;

/// One register request as issued to a device.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    WriteSingle {
        unit: UnitId,
        address: u16,
        value: u16,
    },
    WriteMultiple {
        unit: UnitId,
        address: u16,
        values: Vec<u16>,
    },
    MaskedWrite {
        unit: UnitId,
        address: u16,
        and_mask: u16,
        or_mask: u16,
    },
    ReadHolding {
        unit: UnitId,
        address: u16,
        count: u16,
    },
}

impl Request {
    /// Modbus function code.
    pub fn function(&self) -> u8 {
        match self {
            Request::ReadHolding { .. } => 0x03,
            Request::WriteSingle { .. } => 0x06,
            Request::WriteMultiple { .. } => 0x10,
            Request::MaskedWrite { .. } => 0x16,
        }
    }

    pub fn unit(&self) -> UnitId {
        match self {
            Request::WriteSingle { unit, .. }
            | Request::WriteMultiple { unit, .. }
            | Request::MaskedWrite { unit, .. }
            | Request::ReadHolding { unit, .. } => *unit,
        }
    }

    pub fn address(&self) -> u16 {
        match self {
            Request::WriteSingle { address, .. }
            | Request::WriteMultiple { address, .. }
            | Request::MaskedWrite { address, .. }
            | Request::ReadHolding { address, .. } => *address,
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, Request::ReadHolding { .. })
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::WriteSingle {
                unit,
                address,
                value,
            } => write!(f, "unit {unit} write {address} = 0x{value:04X}"),
            Request::WriteMultiple {
                unit,
                address,
                values,
            } => write!(f, "unit {unit} write {address}..+{}", values.len()),
            Request::MaskedWrite {
                unit,
                address,
                and_mask,
                or_mask,
            } => write!(
                f,
                "unit {unit} mask {address} and=0x{and_mask:04X} or=0x{or_mask:04X}"
            ),
            Request::ReadHolding {
                unit,
                address,
                count,
            } => write!(f, "unit {unit} read {address}..+{count}"),
        }
    }
}
