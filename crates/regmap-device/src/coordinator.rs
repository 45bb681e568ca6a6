//! Device Coordinator
//!
//! Drives a loaded mapping against a register transport: polls every
//! readable entity into a key -> value snapshot, and executes writes
//! (plain scaled writes, button presses, select options, and bit
//! read-modify-write) for the writable ones.
//!
//! All transport access runs under one `tokio::sync::Mutex`, which makes
//! the read-modify-write sequence of bit writes effectively atomic with
//! respect to this coordinator. Transient transport failures are retried
//! once before being surfaced.

use std::collections::HashMap;

use tokio::sync::Mutex;

use regmap_core::codec::{self, CodecError, Value};
use regmap_core::mapping::{Entity, Mapping, WriteSpec};

use crate::transport::{RegisterTransport, TransportError};

/// Result type for coordinator operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors that can occur while operating a mapped device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// No entity with that key in the mapping
    #[error("unknown entity key '{0}'")]
    UnknownKey(String),

    /// Entity has no write section
    #[error("entity '{key}' is not writable")]
    NotWritable { key: String },

    /// Select entity has no option with that label
    #[error("entity '{key}' has no option '{option}'")]
    UnknownOption { key: String, option: String },

    /// Codec failure, attributed to the entity
    #[error("entity '{key}': {source}")]
    Codec {
        key: String,
        #[source]
        source: CodecError,
    },

    /// Transport failure, attributed to the entity
    #[error("entity '{key}': {source}")]
    Transport {
        key: String,
        #[source]
        source: TransportError,
    },
}

/// Coordinates all register traffic for one mapped device.
pub struct DeviceCoordinator<T> {
    mapping: Mapping,
    transport: Mutex<T>,
}

impl<T: RegisterTransport> DeviceCoordinator<T> {
    /// Create a coordinator for a loaded mapping.
    pub fn new(mapping: Mapping, transport: T) -> Self {
        Self {
            mapping,
            transport: Mutex::new(transport),
        }
    }

    /// The mapping this coordinator drives.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Consume the coordinator, returning the transport.
    pub fn into_transport(self) -> T {
        self.transport.into_inner()
    }

    fn entity(&self, key: &str) -> DeviceResult<&Entity> {
        self.mapping
            .entity(key)
            .ok_or_else(|| DeviceError::UnknownKey(key.to_string()))
    }

    /// Read every entity with a read spec and return a key -> value
    /// snapshot.
    pub async fn poll_once(&self) -> DeviceResult<HashMap<String, Value>> {
        let mut transport = self.transport.lock().await;
        let mut data = HashMap::new();

        for entity in self.mapping.readable_entities() {
            let Some(read) = &entity.read else { continue };
            let words = read_with_retry(
                &mut *transport,
                &entity.key,
                read.address,
                read.word_count() as u16,
            )
            .await?;

            let value = codec::decode(&words, read).map_err(|source| DeviceError::Codec {
                key: entity.key.clone(),
                source,
            })?;
            data.insert(entity.key.clone(), value);
        }

        tracing::debug!(entities = data.len(), "poll complete");
        Ok(data)
    }

    /// Write a numeric value to an entity. Entities with a bit write spec
    /// interpret the value as a boolean (non-zero = on).
    pub async fn write_value(&self, key: &str, value: f64) -> DeviceResult<()> {
        let entity = self.entity(key)?;
        let write = entity
            .write
            .as_ref()
            .ok_or_else(|| DeviceError::NotWritable {
                key: key.to_string(),
            })?;

        let mut transport = self.transport.lock().await;
        match write.bit {
            Some(bit) => {
                write_bit_locked(&mut *transport, key, write, bit, value != 0.0).await
            }
            None => {
                let word = codec::encode(value, write).map_err(|source| DeviceError::Codec {
                    key: key.to_string(),
                    source,
                })?;
                write_with_retry(&mut *transport, key, write.address, word).await
            }
        }
    }

    /// Turn a switch (or any boolean write entity) on or off.
    pub async fn write_switch(&self, key: &str, on: bool) -> DeviceResult<()> {
        self.write_value(key, if on { 1.0 } else { 0.0 }).await
    }

    /// Press a button entity: writes its `press_value` (default 1).
    pub async fn press(&self, key: &str) -> DeviceResult<()> {
        let press_value = self.entity(key)?.press_value_or_default();
        self.write_value(key, press_value as f64).await
    }

    /// Select an option of a select entity by label.
    pub async fn select_option(&self, key: &str, label: &str) -> DeviceResult<()> {
        let entity = self.entity(key)?;
        let option = entity
            .resolved_options()
            .into_iter()
            .find(|o| o.label == label)
            .ok_or_else(|| DeviceError::UnknownOption {
                key: key.to_string(),
                option: label.to_string(),
            })?;
        self.write_value(key, option.value as f64).await
    }
}

/// Set or clear one bit of the register at `spec.address`, preserving the
/// other bits. Caller holds the transport lock, so the read and the write
/// cannot interleave with other coordinator traffic.
async fn write_bit_locked<T: RegisterTransport>(
    transport: &mut T,
    key: &str,
    spec: &WriteSpec,
    bit: u8,
    on: bool,
) -> DeviceResult<()> {
    let current = read_with_retry(transport, key, spec.address, 1).await?[0];
    let updated = codec::apply_bit(current, bit, on).map_err(|source| DeviceError::Codec {
        key: key.to_string(),
        source,
    })?;
    write_with_retry(transport, key, spec.address, updated).await
}

async fn read_with_retry<T: RegisterTransport>(
    transport: &mut T,
    key: &str,
    address: u16,
    count: u16,
) -> DeviceResult<Vec<u16>> {
    match transport.read_holding_registers(address, count).await {
        Ok(words) => Ok(words),
        Err(first) => {
            tracing::warn!(key, address, error = %first, "read failed, retrying");
            transport
                .read_holding_registers(address, count)
                .await
                .map_err(|source| DeviceError::Transport {
                    key: key.to_string(),
                    source,
                })
        }
    }
}

async fn write_with_retry<T: RegisterTransport>(
    transport: &mut T,
    key: &str,
    address: u16,
    value: u16,
) -> DeviceResult<()> {
    match transport.write_holding_register(address, value).await {
        Ok(()) => Ok(()),
        Err(first) => {
            tracing::warn!(key, address, error = %first, "write failed, retrying");
            transport
                .write_holding_register(address, value)
                .await
                .map_err(|source| DeviceError::Transport {
                    key: key.to_string(),
                    source,
                })
        }
    }
}
