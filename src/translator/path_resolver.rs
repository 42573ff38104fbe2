//! Resolution of dot-separated relationship paths against the schema.
//!
//! Applied uniformly to sort keys, filter operands, and projections: a
//! path `r1.r2...rn.property` is walked relationship by relationship,
//! emitting one uniquely aliased LEFT JOIN pair per hop, and terminates
//! in a physical (or derived) value column.

use std::collections::HashSet;

use crate::config::StorageConfig;
use crate::query_model::ConditionOperator;
use crate::schema_catalog::data_schema::{Class, DataSchema, Relationship};
use crate::sql_generator::statement::{JoinClause, JoinType};

use super::errors::TranslationError;

/// Where a resolved path is about to be used; governs multivalue rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolveContext {
    Sort,
    Projection,
    Filter(ConditionOperator),
}

/// Outcome of resolving a terminal property.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedOperand {
    /// Single-valued physical or derived column expression.
    Column(String),
    /// Multivalue property: no value join is emitted, the filter is
    /// rewritten into a membership test on the attribute table.
    Membership {
        property_id: String,
        id_expr: String,
        attribute_table: String,
        property_compact_id: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub operand: ResolvedOperand,
    pub joins: Vec<JoinClause>,
}

/// Stateful over one translated statement: hands out unique join aliases.
pub struct PathResolver<'a> {
    schema: &'a DataSchema,
    config: &'a StorageConfig,
    alias_seq: usize,
}

impl<'a> PathResolver<'a> {
    pub fn new(schema: &'a DataSchema, config: &'a StorageConfig) -> Self {
        PathResolver {
            schema,
            config,
            alias_seq: 0,
        }
    }

    fn next_alias(&mut self, base: &str) -> String {
        let alias = format!("{}_{}", base, self.alias_seq);
        self.alias_seq += 1;
        alias
    }

    /// Resolve a path rooted at `root_class` (aliased `root_alias` in the
    /// statement). A leading segment equal to the root alias is skipped.
    pub fn resolve(
        &mut self,
        root_class: &'a Class,
        root_alias: &str,
        segments: &[String],
        context: ResolveContext,
    ) -> Result<ResolvedField, TranslationError> {
        let segments = if segments.len() > 1 && segments[0] == root_alias {
            &segments[1..]
        } else {
            segments
        };
        let mut joins = Vec::new();
        let mut visited = HashSet::new();
        let operand = self.resolve_segments(
            root_class,
            &format!("{root_alias}.id"),
            segments,
            context,
            &mut joins,
            &mut visited,
        )?;
        Ok(ResolvedField { operand, joins })
    }

    fn resolve_segments(
        &mut self,
        class: &'a Class,
        id_expr: &str,
        segments: &[String],
        context: ResolveContext,
        joins: &mut Vec<JoinClause>,
        visited: &mut HashSet<(String, String)>,
    ) -> Result<ResolvedOperand, TranslationError> {
        match segments {
            [] => Err(TranslationError::EmptyFieldPath),
            [property_id] => {
                self.resolve_property(class, id_expr, property_id, context, joins, visited)
            }
            [relationship_id, rest @ ..] => {
                let schema = self.schema;
                let relationship = schema.get_relationship_opt(relationship_id).ok_or_else(|| {
                    TranslationError::UnknownPathSegment {
                        segment: relationship_id.clone(),
                        class_id: class.id.clone(),
                    }
                })?;
                let (far_class, far_id_expr) =
                    self.traverse(class, relationship, id_expr, joins)?;
                self.resolve_segments(far_class, &far_id_expr, rest, context, joins, visited)
            }
        }
    }

    /// Emit the relation-table join for one relationship hop and return
    /// the far class with its identifier expression.
    fn traverse(
        &mut self,
        class: &'a Class,
        relationship: &'a Relationship,
        id_expr: &str,
        joins: &mut Vec<JoinClause>,
    ) -> Result<(&'a Class, String), TranslationError> {
        let schema = self.schema;
        let used = if relationship.subject_class_id == class.id {
            relationship
        } else if relationship.object_class_id == class.id {
            schema
                .find_reverse_relationship(&relationship.predicate_class_id, &class.id)
                .ok_or_else(|| TranslationError::RelationshipNotReversible {
                    relationship_id: relationship.id.clone(),
                })?
        } else {
            return Err(TranslationError::RelationshipNotApplicable {
                relationship_id: relationship.id.clone(),
                class_id: class.id.clone(),
            });
        };

        if used.multiplicity {
            return Err(TranslationError::MultiplicityAmbiguity {
                relationship_id: relationship.id.clone(),
            });
        }

        let predicate = schema.find_class(&used.predicate_class_id)?;
        let far_class = schema.find_class(&used.object_class_id)?;
        let (near_column, far_column) = used.near_far_columns();

        let relations_table = self.config.relations_table.clone();
        let relation_alias = self.next_alias(&relations_table);
        joins.push(JoinClause {
            join_type: JoinType::Left,
            table_name: relations_table,
            table_alias: relation_alias.clone(),
            joining_on: vec![
                format!("{relation_alias}.{near_column}={id_expr}"),
                format!(
                    "{relation_alias}.predicate_class_compact_id={}",
                    predicate.compact_id
                ),
            ],
        });

        Ok((far_class, format!("{relation_alias}.{far_column}")))
    }

    fn resolve_property(
        &mut self,
        class: &'a Class,
        id_expr: &str,
        property_id: &str,
        context: ResolveContext,
        joins: &mut Vec<JoinClause>,
        visited: &mut HashSet<(String, String)>,
    ) -> Result<ResolvedOperand, TranslationError> {
        // identifier pseudo-property: the object id column itself
        if property_id == "id" {
            return Ok(ResolvedOperand::Column(id_expr.to_string()));
        }

        let schema = self.schema;
        let location = schema.find_class_property(&class.id, property_id).map_err(|_| {
            TranslationError::UnknownProperty {
                class_id: class.id.clone(),
                property_id: property_id.to_string(),
            }
        })?;

        if let Some(derivation) = &location.derivation {
            if !visited.insert((class.id.clone(), property_id.to_string())) {
                return Err(TranslationError::DerivationCycle {
                    class_id: class.id.clone(),
                    property_id: property_id.to_string(),
                });
            }
            let source_segments: Vec<String> = derivation
                .source_path
                .split('.')
                .map(|s| s.to_string())
                .collect();
            let source =
                self.resolve_segments(class, id_expr, &source_segments, context, joins, visited)?;
            let source_column = match source {
                ResolvedOperand::Column(column) => column,
                ResolvedOperand::Membership { property_id, .. } => {
                    return Err(TranslationError::MultivalueOperand { property_id });
                }
            };
            let wrapped = derivation.formula.apply(&source_column)?;
            return Ok(ResolvedOperand::Column(wrapped));
        }

        let property = schema.find_property(&location.property_id)?;
        let attribute_table = self.config.attribute_table(property.data_type).to_string();

        if property.multivalue {
            return match context {
                ResolveContext::Sort => Err(TranslationError::MultivalueSort {
                    property_id: property_id.to_string(),
                }),
                ResolveContext::Filter(
                    ConditionOperator::In | ConditionOperator::Null,
                ) => Ok(ResolvedOperand::Membership {
                    property_id: property_id.to_string(),
                    id_expr: id_expr.to_string(),
                    attribute_table,
                    property_compact_id: property.compact_id,
                }),
                ResolveContext::Projection | ResolveContext::Filter(_) => {
                    Err(TranslationError::MultivalueOperand {
                        property_id: property_id.to_string(),
                    })
                }
            };
        }

        let alias = self.next_alias(&attribute_table);
        joins.push(JoinClause {
            join_type: JoinType::Left,
            table_name: attribute_table,
            table_alias: alias.clone(),
            joining_on: vec![
                format!("{alias}.object_id={id_expr}"),
                format!("{alias}.property_compact_id={}", property.compact_id),
            ],
        });
        Ok(ResolvedOperand::Column(format!("{alias}.value")))
    }
}
