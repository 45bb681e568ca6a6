//! Modbus Register Mapping Core
//!
//! This crate defines the YAML mapping-file schema that describes how a
//! Modbus device's holding registers map to logical entities, the loader
//! that parses and validates those files, and the register codec that
//! converts between raw 16-bit register words and logical values.
//!
//! ## Architecture
//!
//! - **mapping**: schema types (`Mapping`, `Entity`, `ReadSpec`,
//!   `WriteSpec`, closed enums for platforms and data types)
//! - **loader**: YAML parsing, collect-all-errors validation with field
//!   paths, default resolution, mapping-file discovery
//! - **codec**: pure decode/encode/bit operations; no I/O
//!
//! Everything here is synchronous and free of protocol state; the actual
//! register transport lives behind a trait in `regmap-device`.

pub mod codec;
pub mod loader;
pub mod mapping;

// Re-exports for convenience
pub use codec::{apply_bit, decode, encode, CodecError, CodecResult, Value};
pub use loader::{
    list_mapping_files, load_mapping, parse_mapping, InvalidMapping, LoadResult, MappingError,
    ValidationIssue,
};
pub use mapping::{
    DataType, Device, Entity, Mapping, OptionSpec, Platform, ReadSpec, RegisterSpace,
    SelectOption, WordOrder, WriteSpec,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
