use crate::{
    ModbusLink, Request, Result, TransportError, UnitId, MAX_READ_REGISTERS, MAX_WRITE_REGISTERS,
};
use std::collections::{BTreeMap, HashSet};

/// In-process register image. Unwritten registers read as zero.
///
/// Every request, successful or not, is appended to a journal so flows are testable.
#[derive(Debug, Default)]
pub struct MockLink {
    registers: BTreeMap<(UnitId, u16), u16>,
    journal: Vec<Request>,
    failing: HashSet<u16>,
    offline: HashSet<UnitId>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a register.
    pub fn with_register(mut self, unit: UnitId, address: u16, value: u16) -> Self {
        self.registers.insert((unit, address), value);
        self
    }

    /// Any request touching `address` answers with an illegal-address exception.
    pub fn fail_address(mut self, address: u16) -> Self {
        self.failing.insert(address);
        self
    }

    /// Requests to `unit` time out.
    pub fn offline_unit(mut self, unit: UnitId) -> Self {
        self.offline.insert(unit);
        self
    }

    pub fn value(&self, unit: UnitId, address: u16) -> u16 {
        self.registers.get(&(unit, address)).copied().unwrap_or(0)
    }

    pub fn block(&self, unit: UnitId, address: u16, count: u16) -> Vec<u16> {
        (0..count)
            .map(|i| self.value(unit, address.wrapping_add(i)))
            .collect()
    }

    pub fn journal(&self) -> &[Request] {
        &self.journal
    }

    /// Only the requests that changed device state.
    pub fn writes(&self) -> Vec<&Request> {
        self.journal.iter().filter(|r| r.is_write()).collect()
    }

    fn admit(&mut self, req: Request, span: usize) -> Result<()> {
        let unit = req.unit();
        let address = req.address();
        let function = req.function();
        self.journal.push(req);
        if self.offline.contains(&unit) {
            return Err(TransportError::Timeout);
        }
        if usize::from(address) + span > 0x1_0000 {
            return Err(TransportError::InvalidRequest("address range overflows"));
        }
        let hit = (0..span).any(|i| self.failing.contains(&(address + i as u16)));
        if hit {
            return Err(TransportError::Exception {
                function,
                message: "illegal data address".to_string(),
            });
        }
        Ok(())
    }
}

impl ModbusLink for MockLink {
    fn write_single_register(&mut self, unit: UnitId, address: u16, value: u16) -> Result<()> {
        self.admit(
            Request::WriteSingle {
                unit,
                address,
                value,
            },
            1,
        )?;
        self.registers.insert((unit, address), value);
        Ok(())
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
        self.admit(
            Request::WriteMultiple {
                unit,
                address,
                values: values.to_vec(),
            },
            values.len(),
        )?;
        for (i, v) in values.iter().enumerate() {
            self.registers.insert((unit, address + i as u16), *v);
        }
        Ok(())
    }

    fn masked_write_register(
        &mut self,
        unit: UnitId,
        address: u16,
        and_mask: u16,
        or_mask: u16,
    ) -> Result<()> {
        self.admit(
            Request::MaskedWrite {
                unit,
                address,
                and_mask,
                or_mask,
            },
            1,
        )?;
        let current = self.value(unit, address);
        let next = (current & and_mask) | (or_mask & !and_mask);
        self.registers.insert((unit, address), next);
        Ok(())
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
        self.admit(
            Request::ReadHolding {
                unit,
                address,
                count,
            },
            usize::from(count),
        )?;
        Ok(self.block(unit, address, count))
    }
}
