//! modbus-link: holding-register access for field devices
//!
//! A small blocking [`ModbusLink`] trait with feature-gated backends. The default build
//! enables the in-memory `mock` backend so that tools and tests run without a device.

mod types;
pub use types::{Request, UnitId, MAX_READ_REGISTERS, MAX_WRITE_REGISTERS};

mod error;
pub use error::{Result, TransportError};

mod traits;
pub use traits::ModbusLink;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::MockLink;

#[cfg(feature = "tcp")]
mod tcp;

#[cfg(feature = "tcp")]
pub use tcp::TcpLink;
