//! Mapping File Loader
//!
//! Thin loader for YAML mapping files: parse into the schema, run a
//! validation pass that collects every problem with its field path, and
//! resolve optional-field defaults so consumers never re-check them.

use std::fmt;
use std::path::Path;

use crate::mapping::{Entity, Mapping, Platform};

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, MappingError>;

/// One validation problem, with the field path inside the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Field path such as `entities[3].read.bit`
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// An invalid mapping file: the file label plus every issue found.
#[derive(Debug)]
pub struct InvalidMapping {
    pub file: String,
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for InvalidMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: invalid mapping file:", self.file)?;
        for issue in &self.issues {
            write!(f, "\n- {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for InvalidMapping {}

/// Errors that can occur while loading a mapping file.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("{file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: YAML parse error: {source}")]
    Yaml {
        file: String,
        #[source]
        source: serde_yml::Error,
    },

    #[error("{0}")]
    Invalid(InvalidMapping),
}

/// Load and validate a mapping file from disk.
pub fn load_mapping(path: impl AsRef<Path>) -> LoadResult<Mapping> {
    let path = path.as_ref();
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let contents = std::fs::read_to_string(path).map_err(|source| MappingError::Io {
        file: file.clone(),
        source,
    })?;
    parse_mapping(&contents, &file)
}

/// Parse and validate mapping YAML. `file` labels errors.
pub fn parse_mapping(source: &str, file: &str) -> LoadResult<Mapping> {
    let mut mapping: Mapping =
        serde_yml::from_str(source).map_err(|source| MappingError::Yaml {
            file: file.to_string(),
            source,
        })?;

    let issues = validate(&mapping);
    if !issues.is_empty() {
        return Err(MappingError::Invalid(InvalidMapping {
            file: file.to_string(),
            issues,
        }));
    }

    resolve_defaults(&mut mapping);
    tracing::debug!(
        file,
        device = %mapping.device.name,
        entities = mapping.entities.len(),
        "mapping loaded"
    );
    Ok(mapping)
}

/// List mapping files (`.yaml` / `.yml`, case-insensitive) in a directory,
/// sorted by name. A missing or unreadable directory yields an empty list.
pub fn list_mapping_files(dir: impl AsRef<Path>) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir.as_ref()) else {
        return Vec::new();
    };

    let mut files: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let lower = name.to_ascii_lowercase();
            if lower.ends_with(".yaml") || lower.ends_with(".yml") {
                Some(name)
            } else {
                None
            }
        })
        .collect();
    files.sort();
    files
}

fn validate(mapping: &Mapping) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if mapping.device.name.trim().is_empty() {
        issues.push(ValidationIssue::new("device.name", "must not be empty"));
    }
    if mapping.entities.is_empty() {
        issues.push(ValidationIssue::new("entities", "must not be empty"));
    }

    let mut seen_keys = std::collections::HashSet::new();
    for (idx, entity) in mapping.entities.iter().enumerate() {
        let where_ = format!("entities[{}]", idx);
        validate_entity(&mut issues, &where_, entity, &mut seen_keys);
    }

    issues
}

fn validate_entity(
    issues: &mut Vec<ValidationIssue>,
    where_: &str,
    entity: &Entity,
    seen_keys: &mut std::collections::HashSet<String>,
) {
    if entity.key.is_empty() {
        issues.push(ValidationIssue::new(
            format!("{}.key", where_),
            "must be a non-empty string",
        ));
    } else if !seen_keys.insert(entity.key.clone()) {
        issues.push(ValidationIssue::new(
            format!("{}.key", where_),
            format!("duplicate key '{}'", entity.key),
        ));
    }

    // An entity with neither read nor write carries no information.
    if entity.read.is_none() && entity.write.is_none() {
        issues.push(ValidationIssue::new(
            where_,
            "must have at least one of 'read' or 'write'",
        ));
    }

    if entity.platform == Platform::Number && entity.write.is_none() {
        issues.push(ValidationIssue::new(
            where_,
            "platform 'number' requires a 'write' section",
        ));
    }

    if let Some(read) = &entity.read {
        if let Some(bit) = read.bit {
            if bit > 15 {
                issues.push(ValidationIssue::new(
                    format!("{}.read.bit", where_),
                    "must be in range 0..15",
                ));
            }
        }
    }
    if let Some(write) = &entity.write {
        if let Some(bit) = write.bit {
            if bit > 15 {
                issues.push(ValidationIssue::new(
                    format!("{}.write.bit", where_),
                    "must be in range 0..15",
                ));
            }
        }
    }

    if let (Some(minimum), Some(maximum)) = (entity.minimum, entity.maximum) {
        if minimum > maximum {
            issues.push(ValidationIssue::new(
                where_,
                format!("minimum {} is greater than maximum {}", minimum, maximum),
            ));
        }
    }
}

fn resolve_defaults(mapping: &mut Mapping) {
    for entity in &mut mapping.entities {
        if entity.name.is_none() {
            entity.name = Some(entity.key.clone());
        }
    }
}
