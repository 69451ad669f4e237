use crate::{Result, UnitId};

/// A minimal blocking holding-register interface.
///
/// Every call targets one unit; backends that multiplex units over one connection switch
/// the unit per request.
pub trait ModbusLink {
    /// Write one register (FC06).
    fn write_single_register(&mut self, unit: UnitId, address: u16, value: u16) -> Result<()>;

    /// Write consecutive registers starting at `address` (FC16).
    fn write_multiple_registers(&mut self, unit: UnitId, address: u16, values: &[u16])
        -> Result<()>;

    /// Update bits of one register in place (FC22).
    fn masked_write_register(
        &mut self,
        unit: UnitId,
        address: u16,
        and_mask: u16,
        or_mask: u16,
    ) -> Result<()>;

    /// Read `count` consecutive registers (FC03).
    fn read_holding_registers(&mut self, unit: UnitId, address: u16, count: u16)
        -> Result<Vec<u16>>;
}
