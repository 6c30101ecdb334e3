//! Configuration model for sqlweave.
//!
//! The configuration is plain data: it is deserialised from TOML, validated,
//! and handed to `sqlweave-core`, which turns it into a dialect descriptor and
//! mapping settings. Nothing in here knows how SQL is rendered.

use serde::Deserialize;
use std::{collections::BTreeMap, fmt, fs, path::Path};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Sequence used for `SEQUENCE` key generation when neither the entity nor the
/// configuration names one.
pub const DEFAULT_SEQUENCE_NAME: &str = "sqlweave_sequence";

/// Alias given to the root table of SELECT statements.
pub const DEFAULT_ROOT_ALIAS: &str = "t";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

///
/// DialectKind
///
/// Database vendors the compiler can target.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    H2,
    MySql,
    Oracle,
    Oracle12c,
    #[default]
    Postgres,
    Sqlite,
    SqlServer,
    SqlServer2005,
    SqlServer2012,
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::H2 => "h2",
            Self::MySql => "mysql",
            Self::Oracle => "oracle",
            Self::Oracle12c => "oracle12c",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
            Self::SqlServer => "sqlserver",
            Self::SqlServer2005 => "sqlserver2005",
            Self::SqlServer2012 => "sqlserver2012",
        };
        write!(f, "{label}")
    }
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dialect: DialectConfig,
    pub mapping: MappingConfig,
    pub key: KeyConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(escape) = &self.dialect.escape_char
            && escape.chars().count() != 1
        {
            return Err(ConfigError::invalid(
                "dialect.escape_char",
                format!("expected exactly one character, found '{escape}'"),
            ));
        }

        if !is_plain_identifier(&self.mapping.root_alias) {
            return Err(ConfigError::invalid(
                "mapping.root_alias",
                format!("'{}' is not a plain identifier", self.mapping.root_alias),
            ));
        }

        let logic = &self.mapping.logic_delete;
        if logic.deleted == logic.not_deleted {
            return Err(ConfigError::invalid(
                "mapping.logic_delete",
                "deleted and not_deleted markers must differ",
            ));
        }

        if self.key.default_sequence.trim().is_empty() {
            return Err(ConfigError::invalid(
                "key.default_sequence",
                "sequence name must not be empty",
            ));
        }

        Ok(())
    }
}

///
/// DialectConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DialectConfig {
    pub kind: DialectKind,

    /// Overrides the dialect's LIKE escape character.
    pub escape_char: Option<String>,
}

///
/// MappingConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    pub root_alias: String,
    pub logic_delete: LogicDeleteConfig,

    /// Tenant column assumed for entities that do not declare their own.
    pub tenant_column: Option<String>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            root_alias: DEFAULT_ROOT_ALIAS.to_string(),
            logic_delete: LogicDeleteConfig::default(),
            tenant_column: None,
        }
    }
}

///
/// LogicDeleteConfig
///
/// SQL literals written to / compared against a soft-delete column.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogicDeleteConfig {
    pub deleted: String,
    pub not_deleted: String,
}

impl Default for LogicDeleteConfig {
    fn default() -> Self {
        Self {
            deleted: "1".to_string(),
            not_deleted: "0".to_string(),
        }
    }
}

///
/// KeyConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct KeyConfig {
    pub default_sequence: String,

    /// Generator name -> sequence name.
    pub generators: BTreeMap<String, String>,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            default_sequence: DEFAULT_SEQUENCE_NAME.to_string(),
            generators: BTreeMap::new(),
        }
    }
}

fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

///
/// TESTS
///
