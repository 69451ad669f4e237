//! Telemetry polling table.
//!
//! The device exposes a fixed window of `max_packages * 3 / 2` words:
//!
//! ```text
//! | bank A: one code per package (max_packages words) | bank B: packed counts |
//! ```
//!
//! Bank B packs several register counts per word according to the class [`BankLayout`].
//! Unused slots stay zero.

use crate::{BankLayout, DeviceClass, PackageEntry, RegisterList, Result, ValidationError};

/// A validated polling table together with its packed registers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelemetryTable {
    class: DeviceClass,
    entries: Vec<PackageEntry>,
    total_registers: u32,
    registers: RegisterList,
}

impl TelemetryTable {
    /// Validate `entries` against the limits of `class` and pack them.
    pub fn new<I, E>(class: DeviceClass, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<PackageEntry>,
    {
        let entries: Vec<PackageEntry> = entries.into_iter().map(Into::into).collect();
        let (registers, total_registers) = pack(
            class.as_str(),
            &entries,
            class.max_packages(),
            class.max_registers(),
            class.bank_layout(),
        )?;
        tracing::debug!(
            class = class.as_str(),
            packages = entries.len(),
            total_registers,
            "packed telemetry table"
        );
        Ok(Self {
            class,
            entries,
            total_registers,
            registers,
        })
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    /// Sum of every package's register count.
    pub fn total_registers(&self) -> u32 {
        self.total_registers
    }

    pub fn registers(&self) -> &RegisterList {
        &self.registers
    }

    /// Bank A: one package code per slot.
    pub fn codes(&self) -> &[u16] {
        &self.registers[..self.class.max_packages()]
    }

    /// Bank B: the packed register counts.
    pub fn packed_counts(&self) -> &[u16] {
        &self.registers[self.class.max_packages()..]
    }
}

/// Total window length for a table of `max_packages` slots.
pub const fn table_len(max_packages: usize) -> usize {
    max_packages + max_packages / 2
}

/// Pack `entries` into a fresh buffer. Nothing is returned unless every entry passes.
///
/// Both limits are strict: `max_packages` entries and `max_registers` total are accepted.
/// The register budget is checked after each entry, so the error names the first prefix
/// that went over.
pub fn pack(
    class: &'static str,
    entries: &[PackageEntry],
    max_packages: usize,
    max_registers: u32,
    layout: BankLayout,
) -> Result<(RegisterList, u32)> {
    if entries.len() > max_packages {
        return Err(ValidationError::TooManyPackages {
            class,
            count: entries.len(),
            max: max_packages,
        });
    }

    if max_packages > 0 && layout.slot(max_packages - 1).0 >= max_packages / 2 {
        return Err(ValidationError::Invalid {
            field: "telemetry",
            reason: format!("{max_packages} slots do not fill whole bank-B words"),
        });
    }

    let mut words = vec![0u16; table_len(max_packages)];
    let (bank_a, bank_b) = words.split_at_mut(max_packages);
    let mut total: u32 = 0;

    for (index, entry) in entries.iter().enumerate() {
        if entry.register_count > layout.slot_max() {
            return Err(ValidationError::CountTooWide {
                class,
                index,
                count: entry.register_count,
                max: layout.slot_max(),
            });
        }
        bank_a[index] = entry.code;

        let (word, multiplier) = layout.slot(index);
        // slots are disjoint bit ranges, so adding never carries into a neighbour
        bank_b[word] += entry.register_count * multiplier;

        total += u32::from(entry.register_count);
        if total > max_registers {
            return Err(ValidationError::TooManyRegisters {
                class,
                total,
                max: max_registers,
            });
        }
    }

    Ok((RegisterList::new(words), total))
}
