use crate::{ModbusLink, Result, TransportError, UnitId, MAX_READ_REGISTERS, MAX_WRITE_REGISTERS};
use std::net::SocketAddr;
use std::time::Duration;
use tokio_modbus::client::sync::{self, Reader, Writer};
use tokio_modbus::prelude::{Slave, SlaveContext};

/// Modbus TCP gateway connection. One socket serves every unit behind the gateway.
pub struct TcpLink {
    addr: SocketAddr,
    ctx: sync::Context,
}

impl TcpLink {
    pub fn connect(addr: SocketAddr, timeout: Option<Duration>) -> Result<Self> {
        let ctx = sync::tcp::connect_slave_with_timeout(addr, Slave(0), timeout)
            .map_err(|e| TransportError::Connect(format!("{addr}: {e}")))?;
        tracing::info!(%addr, "connected to Modbus TCP gateway");
        Ok(Self { addr, ctx })
    }

    pub fn peer(&self) -> SocketAddr {
        self.addr
    }

    fn select(&mut self, unit: UnitId) {
        self.ctx.set_slave(Slave(unit));
    }
}

fn settle<T>(function: u8, res: tokio_modbus::Result<T>) -> Result<T> {
    match res {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(code)) => Err(TransportError::Exception {
            function,
            message: format!("{code:?}"),
        }),
        Err(e) => Err(TransportError::Io(e.to_string())),
    }
}

impl ModbusLink for TcpLink {
    fn write_single_register(&mut self, unit: UnitId, address: u16, value: u16) -> Result<()> {
        self.select(unit);
        tracing::trace!(unit, address, value, "FC06");
        settle(0x06, self.ctx.write_single_register(address, value))
    }

    fn write_multiple_registers(
        &mut self,
        unit: UnitId,
        address: u16,
        values: &[u16],
    ) -> Result<()> {
        if values.is_empty() || values.len() > MAX_WRITE_REGISTERS {
            return Err(TransportError::InvalidRequest("register count out of range"));
        }
        self.select(unit);
        tracing::trace!(unit, address, count = values.len(), "FC16");
        settle(0x10, self.ctx.write_multiple_registers(address, values))
    }

    fn masked_write_register(
        &mut self,
        unit: UnitId,
        address: u16,
        and_mask: u16,
        or_mask: u16,
    ) -> Result<()> {
        self.select(unit);
        tracing::trace!(unit, address, and_mask, or_mask, "FC22");
        settle(
            0x16,
            self.ctx.masked_write_register(address, and_mask, or_mask),
        )
    }

    fn read_holding_registers(
        &mut self,
        unit: UnitId,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>> {
        if count == 0 || count > MAX_READ_REGISTERS {
            return Err(TransportError::InvalidRequest("register count out of range"));
        }
        self.select(unit);
        tracing::trace!(unit, address, count, "FC03");
        settle(0x03, self.ctx.read_holding_registers(address, count))
    }
}
