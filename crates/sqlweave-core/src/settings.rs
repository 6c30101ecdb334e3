use crate::{dialect::Dialect, error::InternalError};
use sqlweave_config::{
    Config, DEFAULT_ROOT_ALIAS, DEFAULT_SEQUENCE_NAME, DialectKind, LogicDeleteConfig,
};
use std::collections::BTreeMap;

///
/// Settings
///
/// Resolved compile-time options shared by every statement of one context.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub dialect: Dialect,
    pub root_alias: String,
    pub logic_delete: LogicDeleteConfig,
    /// Fallback tenant column for entities that do not declare one.
    pub tenant_column: Option<String>,
    pub keys: KeySettings,
}

impl Settings {
    #[must_use]
    pub fn new(kind: DialectKind) -> Self {
        Self {
            dialect: Dialect::new(kind),
            root_alias: DEFAULT_ROOT_ALIAS.to_string(),
            logic_delete: LogicDeleteConfig::default(),
            tenant_column: None,
            keys: KeySettings::default(),
        }
    }

    /// Validate `config` and resolve it into settings.
    pub fn from_config(config: &Config) -> Result<Self, InternalError> {
        config.validate()?;

        let mut dialect = Dialect::new(config.dialect.kind);
        if let Some(c) = config
            .dialect
            .escape_char
            .as_deref()
            .and_then(|s| s.chars().next())
        {
            dialect = dialect.with_escape_char(c);
        }

        Ok(Self {
            dialect,
            root_alias: config.mapping.root_alias.clone(),
            logic_delete: config.mapping.logic_delete.clone(),
            tenant_column: config.mapping.tenant_column.clone(),
            keys: KeySettings {
                default_sequence: config.key.default_sequence.clone(),
                generators: config.key.generators.clone(),
            },
        })
    }

    #[must_use]
    pub fn root_alias(mut self, alias: &str) -> Self {
        self.root_alias = alias.to_string();
        self
    }

    #[must_use]
    pub fn tenant_column(mut self, column: &str) -> Self {
        self.tenant_column = Some(column.to_string());
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DialectKind::default())
    }
}

///
/// KeySettings
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeySettings {
    pub default_sequence: String,
    /// Generator name to sequence name.
    pub generators: BTreeMap<String, String>,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            default_sequence: DEFAULT_SEQUENCE_NAME.to_string(),
            generators: BTreeMap::new(),
        }
    }
}

///
/// TESTS
///
