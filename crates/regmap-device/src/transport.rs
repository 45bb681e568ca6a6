//! Register Transport Interface
//!
//! The external collaborator that actually moves register words to and
//! from the device. Implementations wrap a real Modbus client (TCP or
//! RTU); this crate only defines the seam and an in-memory transport for
//! tests.

use std::collections::HashMap;

use async_trait::async_trait;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors surfaced by a register transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection-level failure (connect, socket, serial line)
    #[error("connection error: {0}")]
    Connection(String),

    /// The device answered, but not with what was asked for
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No answer within the transport's deadline
    #[error("request timed out")]
    Timeout,
}

/// Abstract access to a device's holding registers.
///
/// Precondition for callers performing a read-modify-write sequence: the
/// caller must hold exclusive access to the target register between the
/// read and the write. `DeviceCoordinator` guarantees this by running
/// every transaction under one lock; implementations wrapping a shared
/// connection must not interleave other writers.
#[async_trait]
pub trait RegisterTransport: Send + Sync {
    /// Read `count` holding registers starting at `address`.
    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> TransportResult<Vec<u16>>;

    /// Write a single holding register.
    async fn write_holding_register(&mut self, address: u16, value: u16) -> TransportResult<()>;
}

/// In-memory register bank implementing [`RegisterTransport`].
///
/// Used by the integration tests and as a stand-in while no physical
/// device is attached. Unwritten registers read as zero. Failures can be
/// scripted to exercise retry handling.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    registers: HashMap<u16, u16>,
    fail_next: u32,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a register value.
    pub fn set_register(&mut self, address: u16, value: u16) {
        self.registers.insert(address, value);
    }

    /// Current value of a register (0 if never written).
    pub fn register(&self, address: u16) -> u16 {
        self.registers.get(&address).copied().unwrap_or(0)
    }

    /// Make the next `n` operations fail with a connection error.
    pub fn fail_next(&mut self, n: u32) {
        self.fail_next = n;
    }

    fn check_failure(&mut self) -> TransportResult<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(TransportError::Connection("scripted failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RegisterTransport for MemoryTransport {
    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> TransportResult<Vec<u16>> {
        self.check_failure()?;
        Ok((0..count)
            .map(|i| self.register(address.wrapping_add(i)))
            .collect())
    }

    async fn write_holding_register(&mut self, address: u16, value: u16) -> TransportResult<()> {
        self.check_failure()?;
        self.registers.insert(address, value);
        Ok(())
    }
}
