//! Mapped Modbus Device Runtime
//!
//! Runtime layer over `regmap-core`: an abstract [`RegisterTransport`]
//! seam for the actual Modbus connection and a [`DeviceCoordinator`] that
//! polls readable entities and executes writes, serializing all register
//! traffic for a device through one lock.
//!
//! No Modbus framing lives here; a transport implementation wraps
//! whatever client the host system uses.

pub mod coordinator;
pub mod transport;

// Re-exports for convenience
pub use coordinator::{DeviceCoordinator, DeviceError, DeviceResult};
pub use transport::{MemoryTransport, RegisterTransport, TransportError, TransportResult};
