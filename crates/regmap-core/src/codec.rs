//! Register Codec
//!
//! Pure conversions between raw 16-bit register words and the logical value
//! an entity represents. Every operation is a stateless function of the
//! read/write spec and its input; no I/O happens here.

use crate::mapping::{DataType, ReadSpec, WordOrder, WriteSpec};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding or encoding register values.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Word sequence length does not match the data type
    #[error("expected {expected} register word(s) for {data_type}, got {actual}")]
    WordCount {
        data_type: DataType,
        expected: usize,
        actual: usize,
    },

    /// Scaled value does not fit a 16-bit register
    #[error("value {value} out of 16-bit register range after scaling (raw {raw})")]
    ValueOutOfRange { value: f64, raw: f64 },

    /// Bit index outside 0..=15
    #[error("bit index {0} out of range 0..=15")]
    InvalidBit(u8),

    /// Write spec the codec cannot encode
    #[error("unsupported write: {0}")]
    UnsupportedWrite(String),
}

/// Logical value decoded from (or encoded to) device registers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            Self::Boolean(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Float(v) => Some(*v as i64),
            Self::Boolean(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", v),
        }
    }
}

/// Decode a raw word sequence read from the device into the logical value
/// described by `spec`.
///
/// For 32-bit types the two words are combined high-then-low; `word_order`
/// `BA` swaps them first. The result is multiplied by `scale`; unscaled
/// integer types stay integers. A read spec with `bit` set extracts that
/// bit of the first word as a boolean.
pub fn decode(words: &[u16], spec: &ReadSpec) -> CodecResult<Value> {
    if let Some(bit) = spec.bit {
        if bit > 15 {
            return Err(CodecError::InvalidBit(bit));
        }
        if words.len() != 1 {
            return Err(CodecError::WordCount {
                data_type: spec.data_type,
                expected: 1,
                actual: words.len(),
            });
        }
        return Ok(Value::Boolean((words[0] >> bit) & 1 != 0));
    }

    let expected = spec.data_type.word_count();
    if words.len() != expected {
        return Err(CodecError::WordCount {
            data_type: spec.data_type,
            expected,
            actual: words.len(),
        });
    }

    let value = match spec.data_type {
        DataType::Uint16 => Value::Integer(words[0] as i64),
        DataType::Int16 => Value::Integer(words[0] as i16 as i64),
        _ => {
            let (hi, lo) = match spec.word_order {
                WordOrder::Ab => (words[0], words[1]),
                WordOrder::Ba => (words[1], words[0]),
            };
            let raw = ((hi as u32) << 16) | lo as u32;
            match spec.data_type {
                DataType::Uint32 => Value::Integer(raw as i64),
                DataType::Int32 => Value::Integer(raw as i32 as i64),
                DataType::Float32 => Value::Float(f32::from_bits(raw) as f64),
                DataType::Uint16 | DataType::Int16 => unreachable!(),
            }
        }
    };

    if spec.scale == 1.0 {
        Ok(value)
    } else {
        match value {
            Value::Integer(v) => Ok(Value::Float(v as f64 * spec.scale)),
            Value::Float(v) => Ok(Value::Float(v * spec.scale)),
            Value::Boolean(_) => Ok(value),
        }
    }
}

/// Encode a logical value for a plain (non-bit) single-register write.
///
/// The value is divided by `scale` (a scale of 0 is treated as identity,
/// as the original integration does) and rounded to the nearest integer.
/// Raw values in −32768..=65535 are accepted; negatives are encoded as
/// two's-complement.
pub fn encode(value: f64, spec: &WriteSpec) -> CodecResult<u16> {
    if let Some(bit) = spec.bit {
        return Err(CodecError::UnsupportedWrite(format!(
            "bit {} write needs the current register value; use apply_bit",
            bit
        )));
    }
    if spec.data_type.word_count() != 1 {
        return Err(CodecError::UnsupportedWrite(format!(
            "multi-register write for {} is not supported",
            spec.data_type
        )));
    }

    let raw = if spec.scale != 0.0 && spec.scale != 1.0 {
        value / spec.scale
    } else {
        value
    };
    let rounded = raw.round();
    if !rounded.is_finite() || rounded < i16::MIN as f64 || rounded > u16::MAX as f64 {
        return Err(CodecError::ValueOutOfRange {
            value,
            raw: rounded,
        });
    }

    let n = rounded as i64;
    if n < 0 {
        Ok(n as i16 as u16)
    } else {
        Ok(n as u16)
    }
}

/// Set or clear one bit of a register word, preserving the other bits.
/// Used for the read-modify-write sequence on bit writes.
pub fn apply_bit(current: u16, bit: u8, on: bool) -> CodecResult<u16> {
    if bit > 15 {
        return Err(CodecError::InvalidBit(bit));
    }
    if on {
        Ok(current | (1 << bit))
    } else {
        Ok(current & !(1 << bit))
    }
}
