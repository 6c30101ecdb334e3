//! Query by example: conditions derived from a sample object graph.
//!
//! Every persistent property of the probe's entity is visited. Present
//! scalars become comparisons, present associations are followed into the
//! target entity (adding the join that reaches it), and absent values are
//! skipped or matched with `IS NULL` depending on the [`NullHandler`]. An
//! absent to-one reference is matched on its foreign key column; references
//! kept in a join table or on the target side are always skipped.
//! Following a reference back to an object already on the current path is a
//! cycle error.

mod matcher;
mod path;


pub use matcher::{ExampleMatcher, MatchMode, NullHandler, PropertySpecifier, StringMatcher};

use crate::{
    error::{ErrorOrigin, InternalError},
    model::{EntityModel, PropertyKind, PropertyResolver},
    query::{
        condition::Conditions,
        join::{Connectors, connectors_for},
        predicate::Predicate,
    },
    settings::Settings,
    sql::ParamValue,
    value::{FieldValue, Value},
};
use path::PathNode;
use std::{collections::BTreeMap, rc::Rc};

///
/// Probe
///
/// A sample object. `value` returns `None` for unset properties; the matcher
/// treats unset and NULL alike.
///

pub trait Probe {
    /// Name of the entity this object is a sample of.
    fn entity(&self) -> &str;

    fn value(&self, property: &str) -> Option<ProbeValue<'_>>;
}

///
/// ProbeValue
///

pub enum ProbeValue<'a> {
    Scalar(Value),
    /// Referenced object of an association.
    Entity(&'a dyn Probe),
}

///
/// Sample
///
/// Map-backed [`Probe`]. References are shared so one object may be
/// reachable from several places in the graph.
///

#[derive(Clone, Default)]
pub struct Sample {
    entity: String,
    values: BTreeMap<String, Value>,
    references: BTreeMap<String, Rc<dyn Probe>>,
}

impl Sample {
    #[must_use]
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with(mut self, property: &str, value: impl FieldValue) -> Self {
        self.values.insert(property.to_string(), value.to_value());
        self
    }

    #[must_use]
    pub fn with_reference(mut self, property: &str, probe: Rc<dyn Probe>) -> Self {
        self.references.insert(property.to_string(), probe);
        self
    }
}

impl Probe for Sample {
    fn entity(&self) -> &str {
        &self.entity
    }

    fn value(&self, property: &str) -> Option<ProbeValue<'_>> {
        if let Some(probe) = self.references.get(property) {
            return Some(ProbeValue::Entity(probe.as_ref()));
        }

        self.values
            .get(property)
            .map(|value| ProbeValue::Scalar(value.clone()))
    }
}

///
/// ProbeConditions
///
/// Conditions derived from a probe plus the joins its association paths
/// need, in traversal order.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbeConditions {
    pub conditions: Conditions,
    pub connectors: Connectors,
}

impl ExampleMatcher {
    /// Derive conditions for `probe`, rooted at the probe's own entity.
    pub fn derive(
        &self,
        resolver: &dyn PropertyResolver,
        settings: &Settings,
        probe: &dyn Probe,
    ) -> Result<ProbeConditions, InternalError> {
        let root = probe.entity();
        let entity = resolver.require_entity(root)?;

        let mut walk = Walk {
            matcher: self,
            resolver,
            settings,
            root,
            out: ProbeConditions::default(),
        };
        walk.visit(&PathNode::root(root, probe), entity, "")?;

        tracing::debug!(
            entity = root,
            connectors = walk.out.connectors.len(),
            "derived probe conditions"
        );

        Ok(walk.out)
    }
}

///
/// Walk
/// State of one probe traversal.
///

struct Walk<'a> {
    matcher: &'a ExampleMatcher,
    resolver: &'a dyn PropertyResolver,
    settings: &'a Settings,
    root: &'a str,
    out: ProbeConditions,
}

impl Walk<'_> {
    fn visit(
        &mut self,
        node: &PathNode<'_>,
        entity: &EntityModel,
        prefix: &str,
    ) -> Result<(), InternalError> {
        for property in &entity.properties {
            let path = if prefix.is_empty() {
                property.name.clone()
            } else {
                format!("{prefix}.{}", property.name)
            };

            if self.matcher.is_ignored(&path) || entity.is_version(&property.name) {
                continue;
            }

            match &property.kind {
                PropertyKind::Basic { text } => {
                    let value = node.value().value(&property.name);
                    self.scalar(value, &path, *text)?;
                }
                PropertyKind::Association(assoc) => {
                    let target = match node.value().value(&property.name) {
                        Some(ProbeValue::Entity(target)) => target,
                        None | Some(ProbeValue::Scalar(Value::Null)) => {
                            if self.matcher.null_handler == NullHandler::Include
                                && assoc.foreign_key_column().is_some()
                            {
                                self.push(Predicate::is_null(path.as_str()));
                            }
                            continue;
                        }
                        Some(ProbeValue::Scalar(_)) => {
                            return Err(InternalError::mapping(
                                ErrorOrigin::Probe,
                                format!("association '{path}' holds a scalar value"),
                            ));
                        }
                    };

                    let child = node.child(&property.name, target);
                    if child.spans_cycle() {
                        return Err(InternalError::cycle(child.path()));
                    }
                    if target.entity() != assoc.target {
                        return Err(InternalError::mapping(
                            ErrorOrigin::Probe,
                            format!(
                                "association '{path}' expects a '{}' but the probe holds a '{}'",
                                assoc.target,
                                target.entity()
                            ),
                        ));
                    }

                    let target_model = self.resolver.require_entity(&assoc.target)?;
                    let resolved = self
                        .resolver
                        .resolve_path(self.root, &format!("{path}.{}", target_model.id))?;
                    self.out.connectors.extend(connectors_for(
                        &self.settings.dialect,
                        &self.settings.root_alias,
                        &resolved.joins,
                    ));

                    self.visit(&child, target_model, &path)?;
                }
                PropertyKind::Embedded { .. } | PropertyKind::Collection(_) => {}
            }
        }

        Ok(())
    }

    fn scalar(
        &mut self,
        value: Option<ProbeValue<'_>>,
        path: &str,
        text: bool,
    ) -> Result<(), InternalError> {
        let value = match value {
            Some(ProbeValue::Scalar(value)) if !value.is_null() => value,
            Some(ProbeValue::Entity(_)) => {
                return Err(InternalError::mapping(
                    ErrorOrigin::Probe,
                    format!("scalar property '{path}' holds an object"),
                ));
            }
            _ => {
                if self.matcher.null_handler == NullHandler::Include {
                    self.push(Predicate::is_null(path));
                }
                return Ok(());
            }
        };

        let predicate = if text {
            let matcher = self.matcher.string_matcher_for(path);
            let predicate =
                Predicate::new(path, matcher.predicate_type(), vec![ParamValue::from(value)]);

            if self.matcher.ignore_case_for(path) {
                predicate.ignore_case()
            } else {
                predicate
            }
        } else {
            Predicate::new(
                path,
                StringMatcher::Exact.predicate_type(),
                vec![ParamValue::from(value)],
            )
        };
        self.push(predicate);

        Ok(())
    }

    fn push(&mut self, predicate: Predicate) {
        let conjunction = self.matcher.mode.conjunction();
        self.out.conditions = std::mem::take(&mut self.out.conditions).add(conjunction, predicate);
    }
}
