use crate::{
    error::InternalError,
    model::{EntityModel, GenerationType},
    settings::Settings,
};

///
/// KeyGeneration
///
/// How an INSERT obtains its generated id. `before` keys (sequences) are
/// fetched and bound ahead of the INSERT; identity keys are read back after.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyGeneration {
    pub property: String,
    pub column: String,
    pub strategy: GenerationType,
    pub select: String,
    pub before: bool,
}

impl KeyGeneration {
    /// Key generation for `entity`, if its id is generated.
    pub fn resolve(entity: &EntityModel, settings: &Settings) -> Result<Option<Self>, InternalError> {
        let Some(id) = entity.id_property() else {
            return Ok(None);
        };
        let Some(generated) = &id.generated else {
            return Ok(None);
        };

        let key = match generated.strategy {
            GenerationType::Identity => Self {
                property: id.name.clone(),
                column: id.column.clone(),
                strategy: GenerationType::Identity,
                select: settings.dialect.identity_select(&entity.table, &id.column)?,
                before: false,
            },
            GenerationType::Sequence => {
                let sequence = sequence_name(entity, settings, generated.generator.as_deref());

                Self {
                    property: id.name.clone(),
                    column: id.column.clone(),
                    strategy: GenerationType::Sequence,
                    select: settings.dialect.sequence_select(sequence)?,
                    before: true,
                }
            }
        };

        Ok(Some(key))
    }

    /// Parameter the INSERT reads the key from.
    #[must_use]
    pub fn param_name(&self) -> String {
        super::record_name(&self.property)
    }

    #[must_use]
    pub const fn is_identity(&self) -> bool {
        matches!(self.strategy, GenerationType::Identity)
    }
}

// entity generators, then configured generators, then the default sequence
fn sequence_name<'a>(
    entity: &'a EntityModel,
    settings: &'a Settings,
    generator: Option<&str>,
) -> &'a str {
    let Some(generator) = generator else {
        return &settings.keys.default_sequence;
    };

    entity
        .sequence_generators
        .iter()
        .find(|g| g.name == generator)
        .map(|g| g.sequence_name.as_str())
        .or_else(|| settings.keys.generators.get(generator).map(String::as_str))
        .unwrap_or(&settings.keys.default_sequence)
}
