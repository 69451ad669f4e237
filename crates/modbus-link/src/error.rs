use thiserror::Error;

pub type Result<T, E = TransportError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot connect to {0}")]
    Connect(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("device exception on function 0x{function:02X}: {message}")]
    Exception { function: u8, message: String },
    #[error("timeout")]
    Timeout,
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
}
