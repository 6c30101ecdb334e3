use crate::model::property::{PropertyKind, PropertyModel};

///
/// EntityModel
/// Runtime mapping metadata for one entity.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityModel {
    /// Stable entity name used by resolvers and probes.
    pub name: String,
    pub table: String,
    /// Name of the id property (points at an entry in `properties`).
    pub id: String,
    /// Ordered property list (authoritative for column order).
    pub properties: Vec<PropertyModel>,
    /// Soft-delete marker property.
    pub logic_delete: Option<String>,
    /// Column holding the tenant discriminator.
    pub tenant_column: Option<String>,
    /// Optimistic-lock property.
    pub version: Option<String>,
    /// Declared generators; the first with a matching name wins.
    pub sequence_generators: Vec<SequenceGenerator>,
}

impl EntityModel {
    /// New entity whose id property is `id` (a non-text scalar).
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            id: "id".to_string(),
            properties: vec![PropertyModel::basic("id")],
            logic_delete: None,
            tenant_column: None,
            version: None,
            sequence_generators: Vec::new(),
        }
    }

    /// Replace the id property.
    #[must_use]
    pub fn id(mut self, property: PropertyModel) -> Self {
        self.properties.retain(|p| p.name != self.id);
        self.id.clone_from(&property.name);
        self.properties.insert(0, property);
        self
    }

    #[must_use]
    pub fn property(mut self, property: PropertyModel) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn logic_delete(mut self, property: &str) -> Self {
        self.logic_delete = Some(property.to_string());
        self
    }

    #[must_use]
    pub fn tenant_column(mut self, column: &str) -> Self {
        self.tenant_column = Some(column.to_string());
        self
    }

    #[must_use]
    pub fn version(mut self, property: &str) -> Self {
        self.version = Some(property.to_string());
        self
    }

    #[must_use]
    pub fn sequence_generator(mut self, name: &str, sequence_name: &str) -> Self {
        self.sequence_generators.push(SequenceGenerator {
            name: name.to_string(),
            sequence_name: sequence_name.to_string(),
        });
        self
    }

    /// Top-level property by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&PropertyModel> {
        self.properties.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn id_property(&self) -> Option<&PropertyModel> {
        self.find(&self.id)
    }

    /// Id column; falls back to the id property name if it is not declared.
    #[must_use]
    pub fn id_column(&self) -> &str {
        self.id_property().map_or(self.id.as_str(), |p| p.column.as_str())
    }

    #[must_use]
    pub fn logic_delete_column(&self) -> Option<&str> {
        let name = self.logic_delete.as_deref()?;
        self.find(name).map(|p| p.column.as_str())
    }

    #[must_use]
    pub fn version_property(&self) -> Option<&PropertyModel> {
        self.find(self.version.as_deref()?)
    }

    #[must_use]
    pub fn is_version(&self, property: &str) -> bool {
        self.version.as_deref() == Some(property)
    }

    /// Scalar column properties in declaration order, embedded values
    /// flattened with dotted names.
    #[must_use]
    pub fn scalar_columns(&self) -> Vec<(String, &PropertyModel)> {
        let mut out = Vec::new();
        collect_scalars("", &self.properties, &mut out);

        out
    }
}

fn collect_scalars<'a>(
    prefix: &str,
    properties: &'a [PropertyModel],
    out: &mut Vec<(String, &'a PropertyModel)>,
) {
    for property in properties {
        let path = if prefix.is_empty() {
            property.name.clone()
        } else {
            format!("{prefix}.{}", property.name)
        };

        match &property.kind {
            PropertyKind::Basic { .. } => out.push((path, property)),
            PropertyKind::Embedded { properties } => collect_scalars(&path, properties, out),
            PropertyKind::Collection(_) | PropertyKind::Association(_) => {}
        }
    }
}

///
/// SequenceGenerator
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SequenceGenerator {
    pub name: String,
    pub sequence_name: String,
}
