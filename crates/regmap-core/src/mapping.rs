//! Mapping Schema - Register Map Description
//!
//! Types describing how a Modbus device's holding registers map to logical
//! entities (sensors, switches, numeric controls, ...). A mapping is loaded
//! once from a YAML file and is immutable for the lifetime of the device
//! connection.

use serde::{Deserialize, Serialize};

/// Device metadata block of a mapping file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Human-readable device name
    pub name: String,
    /// Manufacturer (optional)
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Model identifier (optional)
    #[serde(default)]
    pub model: Option<String>,
}

/// Entity platform classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Numeric or textual read-only value
    Sensor,
    /// Boolean read-only value
    BinarySensor,
    /// Settable numeric value
    Number,
    /// Boolean toggle
    Switch,
    /// One-of-n choice backed by an integer register value
    Select,
    /// Fire-and-forget action (writes a fixed value)
    Button,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sensor => write!(f, "sensor"),
            Self::BinarySensor => write!(f, "binary_sensor"),
            Self::Number => write!(f, "number"),
            Self::Switch => write!(f, "switch"),
            Self::Select => write!(f, "select"),
            Self::Button => write!(f, "button"),
        }
    }
}

/// Register space a read/write targets. Only holding registers are
/// supported; other spaces fail at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterSpace {
    #[default]
    Holding,
}

impl std::fmt::Display for RegisterSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Holding => write!(f, "holding"),
        }
    }
}

/// Data type of a register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Unsigned 16-bit integer (1 register)
    #[default]
    Uint16,
    /// Signed 16-bit integer (1 register)
    Int16,
    /// Unsigned 32-bit integer (2 registers)
    Uint32,
    /// Signed 32-bit integer (2 registers)
    Int32,
    /// IEEE-754 binary32 float (2 registers)
    Float32,
}

impl DataType {
    /// Number of 16-bit register words this type occupies.
    pub fn word_count(&self) -> usize {
        match self {
            Self::Uint16 | Self::Int16 => 1,
            Self::Uint32 | Self::Int32 | Self::Float32 => 2,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uint16 => write!(f, "uint16"),
            Self::Int16 => write!(f, "int16"),
            Self::Uint32 => write!(f, "uint32"),
            Self::Int32 => write!(f, "int32"),
            Self::Float32 => write!(f, "float32"),
        }
    }
}

/// Word order for multi-register values: whether the first register holds
/// the high-order (`AB`) or low-order (`BA`) half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WordOrder {
    #[default]
    Ab,
    Ba,
}

fn default_scale() -> f64 {
    1.0
}

/// How to read an entity's state from the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadSpec {
    /// Register space (`type` in YAML)
    #[serde(rename = "type", default)]
    pub space: RegisterSpace,
    /// Zero-based register address
    pub address: u16,
    /// Register data type
    #[serde(default)]
    pub data_type: DataType,
    /// Multiplier applied after raw decode
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Word order for 32-bit types
    #[serde(default)]
    pub word_order: WordOrder,
    /// Extract a single bit of the (16-bit) register as a boolean
    #[serde(default)]
    pub bit: Option<u8>,
}

impl ReadSpec {
    /// Number of registers to request from the transport.
    pub fn word_count(&self) -> usize {
        if self.bit.is_some() {
            1
        } else {
            self.data_type.word_count()
        }
    }
}

/// How to write an entity's state to the device. Only single-register
/// holding writes are supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteSpec {
    /// Register space (`type` in YAML)
    #[serde(rename = "type", default)]
    pub space: RegisterSpace,
    /// Zero-based register address
    pub address: u16,
    /// Accepted for YAML parity; only 16-bit encodings are performed
    #[serde(default)]
    pub data_type: DataType,
    /// Divisor applied to the logical value before encoding
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Target a single bit via read-modify-write
    #[serde(default)]
    pub bit: Option<u8>,
}

/// One option of a `select` entity, as written in YAML.
///
/// Accepts either a plain label (the register value is the list index)
/// or an explicit `{label, value}` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionSpec {
    Labeled { label: String, value: i64 },
    Plain(String),
}

/// A resolved select option: label plus register value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: i64,
}

/// One logical point exposed by the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Entity platform
    pub platform: Platform,
    /// Unique key within the mapping file
    pub key: String,
    /// Display name; defaults to `key` at load time
    #[serde(default)]
    pub name: Option<String>,
    /// Unit of measurement (display hint)
    #[serde(default)]
    pub unit: Option<String>,
    /// Icon (display hint)
    #[serde(default)]
    pub icon: Option<String>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Consumer-side device class hint
    #[serde(default)]
    pub device_class: Option<String>,
    /// Consumer-side state class hint
    #[serde(default)]
    pub state_class: Option<String>,
    /// Read path; absent means write-only
    #[serde(default)]
    pub read: Option<ReadSpec>,
    /// Write path; absent means read-only
    #[serde(default)]
    pub write: Option<WriteSpec>,
    /// Minimum value (numbers); `min` accepted as legacy spelling
    #[serde(default, alias = "min")]
    pub minimum: Option<f64>,
    /// Maximum value (numbers); `max` accepted as legacy spelling
    #[serde(default, alias = "max")]
    pub maximum: Option<f64>,
    /// Step size (numbers)
    #[serde(default)]
    pub step: Option<f64>,
    /// Options (selects)
    #[serde(default)]
    pub options: Option<Vec<OptionSpec>>,
    /// Value written on press (buttons), default 1
    #[serde(default)]
    pub press_value: Option<i64>,
}

impl Entity {
    /// Display name, falling back to the key.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    /// Step size with the consumer-side default of 1.0.
    pub fn step_or_default(&self) -> f64 {
        self.step.unwrap_or(1.0)
    }

    /// Value a button press writes (default 1).
    pub fn press_value_or_default(&self) -> i64 {
        self.press_value.unwrap_or(1)
    }

    /// Resolve select options: plain labels take their list index as the
    /// register value.
    pub fn resolved_options(&self) -> Vec<SelectOption> {
        let Some(options) = &self.options else {
            return Vec::new();
        };
        options
            .iter()
            .enumerate()
            .map(|(idx, opt)| match opt {
                OptionSpec::Labeled { label, value } => SelectOption {
                    label: label.clone(),
                    value: *value,
                },
                OptionSpec::Plain(label) => SelectOption {
                    label: label.clone(),
                    value: idx as i64,
                },
            })
            .collect()
    }
}

/// A fully loaded mapping file: device metadata plus its entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapping {
    pub device: Device,
    pub entities: Vec<Entity>,
}

impl Mapping {
    /// Look up an entity by key.
    pub fn entity(&self, key: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.key == key)
    }

    /// Entities that have a read path.
    pub fn readable_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.read.is_some())
    }
}
