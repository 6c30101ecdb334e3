use crate::{
    model::{
        AssociationModel, CollectionModel, EntityModel, GeneratedValue, JoinTable, PropertyModel,
        Schema,
    },
    settings::Settings,
    DialectKind,
};

/// Users with every mapping feature the compiler knows about.
pub(crate) fn user() -> EntityModel {
    EntityModel::new("User", "users")
        .id(PropertyModel::basic("id").generated(GeneratedValue::identity()))
        .property(PropertyModel::text("firstname"))
        .property(PropertyModel::text("lastname"))
        .property(PropertyModel::text("email"))
        .property(PropertyModel::basic("age"))
        .property(PropertyModel::basic("active"))
        .property(PropertyModel::basic("createdAt"))
        .property(PropertyModel::embedded(
            "address",
            vec![
                PropertyModel::text("city").column("addr_city"),
                PropertyModel::text("street").column("addr_street"),
            ],
        ))
        .property(PropertyModel::association(
            "department",
            AssociationModel::to_one("Department", "department_id", "id"),
        ))
        .property(PropertyModel::association(
            "roles",
            AssociationModel::through("Role", JoinTable::new("user_roles", "user_id", "role_id")),
        ))
        .property(PropertyModel::collection(
            "tags",
            CollectionModel::new("user_tags", "user_id", "tag"),
        ))
        .property(PropertyModel::basic("deleted"))
        .property(PropertyModel::basic("version"))
        .logic_delete("deleted")
        .tenant_column("tenant_id")
        .version("version")
}

pub(crate) fn department() -> EntityModel {
    EntityModel::new("Department", "departments")
        .property(PropertyModel::text("name"))
        .property(PropertyModel::association(
            "company",
            AssociationModel::to_one("Company", "company_id", "id"),
        ))
        .property(PropertyModel::association(
            "members",
            AssociationModel::to_many("User", "id", "department_id"),
        ))
}

pub(crate) fn company() -> EntityModel {
    EntityModel::new("Company", "companies").property(PropertyModel::text("name"))
}

pub(crate) fn role() -> EntityModel {
    EntityModel::new("Role", "roles").property(PropertyModel::text("name"))
}

/// Sequence-keyed entity with a named generator.
pub(crate) fn order() -> EntityModel {
    EntityModel::new("Order", "orders")
        .id(PropertyModel::basic("id").generated(GeneratedValue::sequence(Some("order_gen"))))
        .property(PropertyModel::basic("total"))
        .property(PropertyModel::association(
            "customer",
            AssociationModel::to_one("User", "customer_id", "id"),
        ))
        .sequence_generator("order_gen", "order_seq")
}

/// Plain entity: no soft delete, no tenant, no version.
pub(crate) fn note() -> EntityModel {
    EntityModel::new("Note", "notes")
        .id(PropertyModel::basic("id").generated(GeneratedValue::sequence(None)))
        .property(PropertyModel::text("body"))
        .property(PropertyModel::basic("priority"))
}

pub(crate) fn schema() -> Schema {
    Schema::new()
        .with(user())
        .with(department())
        .with(company())
        .with(role())
        .with(order())
        .with(note())
}

pub(crate) fn settings() -> Settings {
    Settings::new(DialectKind::Postgres)
}
