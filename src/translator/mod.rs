//! Relationship-aware query translator.
//!
//! Turns a schema-relative [`Query`] into a joined SQL statement over the
//! narrow physical layout and returns matching object identifiers in
//! order. Pure with respect to the schema snapshot; all I/O goes through
//! the external [`SqlExecutor`].

pub mod errors;
pub mod path_resolver;

pub use errors::TranslationError;
pub use path_resolver::{PathResolver, ResolveContext, ResolvedField, ResolvedOperand};

use log::debug;

use crate::config::StorageConfig;
use crate::errors::StorageError;
use crate::executor::SqlExecutor;
use crate::query_model::parser::parse_field_path;
use crate::query_model::{
    ConditionNode, ConditionOperator, GroupNode, QField, Query, QueryNode, QueryValue,
};
use crate::schema_catalog::data_schema::{Class, DataSchema};
use crate::sql_generator::statement::{
    FromItem, JoinClause, OrderByItem, SelectItem, SelectStatement, ToSql,
};
use crate::sql_generator::SqlBuilder;

/// Shape of the assembled statement.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StatementShape {
    /// Leading identifier column plus resolved projections.
    Identifiers,
    /// `COUNT(DISTINCT id)`, no projections, sort, or pagination.
    Count,
    /// Single projected column usable as an `IN` source set.
    MembershipSet,
}

pub struct QueryTranslator<'a> {
    schema: &'a DataSchema,
    config: &'a StorageConfig,
    builder: SqlBuilder,
}

impl<'a> QueryTranslator<'a> {
    pub fn new(schema: &'a DataSchema, config: &'a StorageConfig) -> Self {
        QueryTranslator {
            schema,
            config,
            builder: SqlBuilder::new(),
        }
    }

    /// Translate a query into its SQL statement without executing it.
    pub fn translate(&self, query: &Query) -> Result<SelectStatement, TranslationError> {
        self.assemble(query, StatementShape::Identifiers)
    }

    /// Execute the translated statement and return the ordered object
    /// identifier sequence.
    pub fn load_object_ids(
        &self,
        executor: &dyn SqlExecutor,
        query: &Query,
    ) -> Result<Vec<i64>, StorageError> {
        let statement = self.translate(query)?;
        let sql = statement.to_sql();
        debug!("translated object query:\n{sql}");
        Ok(executor.execute_ids(&sql)?)
    }

    /// Count matching objects; sort and pagination are not applied.
    pub fn get_objects_count(
        &self,
        executor: &dyn SqlExecutor,
        query: &Query,
    ) -> Result<i64, StorageError> {
        let statement = self.assemble(query, StatementShape::Count)?;
        let sql = statement.to_sql();
        debug!("translated count query:\n{sql}");
        Ok(executor.execute_count(&sql)?)
    }

    fn assemble(
        &self,
        query: &Query,
        shape: StatementShape,
    ) -> Result<SelectStatement, TranslationError> {
        let schema = self.schema;
        let class = schema.find_class(&query.class_id).map_err(|_| {
            TranslationError::UnknownClass {
                class_id: query.class_id.clone(),
            }
        })?;
        let alias = query
            .alias
            .clone()
            .unwrap_or_else(|| self.config.objects_table.clone());

        let mut resolver = PathResolver::new(self.schema, self.config);
        let mut joins: Vec<JoinClause> = Vec::new();

        let mut select = match shape {
            StatementShape::Identifiers => vec![SelectItem {
                expression: format!("{alias}.id"),
                alias: None,
            }],
            StatementShape::Count => vec![SelectItem {
                expression: format!("COUNT(DISTINCT {alias}.id)"),
                alias: None,
            }],
            StatementShape::MembershipSet => Vec::new(),
        };

        match shape {
            StatementShape::Identifiers => {
                for field in &query.fields {
                    let segments = projection_segments(field)?;
                    let output = projection_output(field, &segments, &alias);
                    let column = self.resolve_single_column(
                        &mut resolver,
                        class,
                        &alias,
                        &segments,
                        ResolveContext::Projection,
                        &mut joins,
                    )?;
                    select.push(SelectItem {
                        expression: column,
                        alias: Some(output),
                    });
                }
            }
            StatementShape::MembershipSet => {
                // the source set is the first projected field, or the id
                let column = match query.fields.first() {
                    Some(field) => {
                        let segments = projection_segments(field)?;
                        self.resolve_single_column(
                            &mut resolver,
                            class,
                            &alias,
                            &segments,
                            ResolveContext::Projection,
                            &mut joins,
                        )?
                    }
                    None => format!("{alias}.id"),
                };
                select.push(SelectItem {
                    expression: column,
                    alias: None,
                });
            }
            StatementShape::Count => {}
        }

        let mut filters = vec![format!(
            "{alias}.compact_class_id={}",
            class.compact_id
        )];
        if let Some(condition) = &query.condition {
            let lowered = self.lower_node(condition, class, &alias, &mut resolver, &mut joins)?;
            if let Some(rendered) = self.builder.build_expression(&lowered)? {
                filters.push(format!("({rendered})"));
            }
        }

        let mut order_by = Vec::new();
        if shape == StatementShape::Identifiers {
            for sort in &query.sort {
                if let Some(expression) = &sort.field.expression {
                    // literal fragment, rendered as-is
                    order_by.push(OrderByItem {
                        expression: expression.clone(),
                        direction: sort.direction,
                    });
                    continue;
                }
                let segments = sort.field.path_segments();
                let column = self.resolve_single_column(
                    &mut resolver,
                    class,
                    &alias,
                    &segments,
                    ResolveContext::Sort,
                    &mut joins,
                )?;
                order_by.push(OrderByItem {
                    expression: column,
                    direction: sort.direction,
                });
            }
        }

        let (skip, limit) = match shape {
            StatementShape::Count => (None, None),
            _ => (query.start_record, query.record_count),
        };

        Ok(SelectStatement {
            select,
            from: FromItem {
                table_name: self.config.objects_table.clone(),
                table_alias: alias,
            },
            joins,
            filter: Some(filters.join(" AND ")),
            order_by,
            skip,
            limit,
        })
    }

    fn resolve_single_column(
        &self,
        resolver: &mut PathResolver<'a>,
        class: &'a Class,
        alias: &str,
        segments: &[String],
        context: ResolveContext,
        joins: &mut Vec<JoinClause>,
    ) -> Result<String, TranslationError> {
        let resolved = resolver.resolve(class, alias, segments, context)?;
        joins.extend(resolved.joins);
        match resolved.operand {
            ResolvedOperand::Column(column) => Ok(column),
            ResolvedOperand::Membership { property_id, .. } => {
                Err(TranslationError::MultivalueOperand { property_id })
            }
        }
    }

    fn lower_node(
        &self,
        node: &QueryNode,
        class: &'a Class,
        alias: &str,
        resolver: &mut PathResolver<'a>,
        joins: &mut Vec<JoinClause>,
    ) -> Result<QueryNode, TranslationError> {
        match node {
            QueryNode::Raw(text) => Ok(QueryNode::Raw(text.clone())),
            QueryNode::Negation(None) => Ok(QueryNode::Negation(None)),
            QueryNode::Negation(Some(child)) => Ok(QueryNode::Negation(Some(Box::new(
                self.lower_node(child, class, alias, resolver, joins)?,
            )))),
            QueryNode::Group(group) => {
                let mut nodes = Vec::with_capacity(group.nodes.len());
                for child in &group.nodes {
                    nodes.push(self.lower_node(child, class, alias, resolver, joins)?);
                }
                Ok(QueryNode::Group(GroupNode {
                    kind: group.kind,
                    nodes,
                }))
            }
            QueryNode::Condition(condition) => {
                self.lower_condition(condition, class, alias, resolver, joins)
            }
        }
    }

    fn lower_condition(
        &self,
        condition: &ConditionNode,
        class: &'a Class,
        alias: &str,
        resolver: &mut PathResolver<'a>,
        joins: &mut Vec<JoinClause>,
    ) -> Result<QueryNode, TranslationError> {
        let context = ResolveContext::Filter(condition.operator);

        let lowered_lvalue = match &condition.lvalue {
            QueryValue::Field(field) => {
                if let Some(expression) = &field.expression {
                    ResolvedOperand::Column(expression.clone())
                } else {
                    let segments = field.path_segments();
                    let resolved = resolver.resolve(class, alias, &segments, context)?;
                    joins.extend(resolved.joins);
                    resolved.operand
                }
            }
            QueryValue::Const(constant) => {
                ResolvedOperand::Column(self.builder.build_const(constant))
            }
            QueryValue::Raw(text) => ResolvedOperand::Column(text.clone()),
            QueryValue::Subquery(_) => return Err(TranslationError::SubqueryOperand),
        };

        let rvalue = match &condition.rvalue {
            QueryValue::Field(field) => {
                if let Some(expression) = &field.expression {
                    QueryValue::Raw(expression.clone())
                } else {
                    let segments = field.path_segments();
                    let column = self.resolve_single_column(
                        resolver, class, alias, &segments, context, joins,
                    )?;
                    QueryValue::Raw(column)
                }
            }
            QueryValue::Const(constant) => QueryValue::Const(constant.clone()),
            QueryValue::Raw(text) => QueryValue::Raw(text.clone()),
            QueryValue::Subquery(subquery) => {
                if condition.operator != ConditionOperator::In {
                    return Err(TranslationError::SubqueryOperand);
                }
                QueryValue::Raw(self.translate_membership_set(subquery)?)
            }
        };

        match lowered_lvalue {
            ResolvedOperand::Column(column) => Ok(QueryNode::Condition(ConditionNode {
                lvalue: QueryValue::Raw(column),
                operator: condition.operator,
                rvalue,
                negate: condition.negate,
            })),
            ResolvedOperand::Membership {
                id_expr,
                attribute_table,
                property_compact_id,
                property_id,
            } => self.lower_membership(
                condition,
                &id_expr,
                &attribute_table,
                property_compact_id,
                &property_id,
                rvalue,
            ),
        }
    }

    /// Rewrite a multivalue-property filter into a membership test on the
    /// attribute table, so matching any of the stored values never
    /// multiplies result rows.
    fn lower_membership(
        &self,
        condition: &ConditionNode,
        id_expr: &str,
        attribute_table: &str,
        property_compact_id: i64,
        property_id: &str,
        rvalue: QueryValue,
    ) -> Result<QueryNode, TranslationError> {
        match condition.operator {
            ConditionOperator::In => {
                let rendered = self.builder.build_value(&rvalue)?;
                if rendered.trim().is_empty() {
                    let sql = if condition.negate { "NOT (0=1)" } else { "0=1" };
                    return Ok(QueryNode::Raw(sql.to_string()));
                }
                let test = format!(
                    "{id_expr} IN (SELECT object_id FROM {attribute_table} \
                     WHERE property_compact_id={property_compact_id} AND value IN ({rendered}))"
                );
                let sql = if condition.negate {
                    format!("NOT ({test})")
                } else {
                    test
                };
                Ok(QueryNode::Raw(sql))
            }
            ConditionOperator::Null => {
                // null means the object stores no row for the property
                let present = format!(
                    "{id_expr} IN (SELECT object_id FROM {attribute_table} \
                     WHERE property_compact_id={property_compact_id})"
                );
                let sql = if condition.negate {
                    present
                } else {
                    format!("NOT ({present})")
                };
                Ok(QueryNode::Raw(sql))
            }
            _ => Err(TranslationError::MultivalueOperand {
                property_id: property_id.to_string(),
            }),
        }
    }

    /// Translate a nested query into an inlined single-column statement.
    fn translate_membership_set(&self, query: &Query) -> Result<String, TranslationError> {
        let statement = self.assemble(query, StatementShape::MembershipSet)?;
        let sql = statement.to_sql();
        Ok(sql.split_whitespace().collect::<Vec<&str>>().join(" "))
    }
}

fn projection_segments(field: &QField) -> Result<Vec<String>, TranslationError> {
    match &field.expression {
        // renamed "as" projections carry their path in the expression
        Some(expression) => Ok(parse_field_path(expression)?),
        None => Ok(field.path_segments()),
    }
}

fn projection_output(field: &QField, segments: &[String], root_alias: &str) -> String {
    if field.expression.is_some() {
        return field.name.clone();
    }
    let segments = if segments.len() > 1 && segments[0] == root_alias {
        &segments[1..]
    } else {
        segments
    };
    segments.join("_")
}
