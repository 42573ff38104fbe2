//! Pure SQL expression compiler over the query AST.
//!
//! String constants are interpolated as escaped literals. This is a
//! documented compatibility surface for asserting on exact SQL text;
//! production deployments bind parameters in the executor instead.

pub mod errors;
pub mod statement;

pub use errors::SqlGeneratorError;
pub use statement::{
    FromItem, JoinClause, JoinType, OrderByItem, SelectItem, SelectStatement, ToSql,
};

use crate::query_model::{
    ConditionNode, ConditionOperator, ConstValue, GroupKind, QConst, QField, QSort, QueryNode,
    QueryValue, SortDirection,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct SqlBuilder;

impl SqlBuilder {
    pub fn new() -> Self {
        SqlBuilder
    }

    /// Compile an expression tree. An empty group (or a negation of one)
    /// renders to `None`; parents omit it.
    pub fn build_expression(&self, node: &QueryNode) -> Result<Option<String>, SqlGeneratorError> {
        match node {
            QueryNode::Raw(text) => Ok(Some(text.clone())),
            QueryNode::Condition(condition) => self.build_condition(condition).map(Some),
            QueryNode::Group(group) => {
                // single-child groups render unwrapped
                if group.nodes.len() == 1 {
                    return self.build_expression(&group.nodes[0]);
                }
                let mut parts = Vec::new();
                for child in &group.nodes {
                    if let Some(rendered) = self.build_expression(child)? {
                        parts.push(format!("({rendered})"));
                    }
                }
                if parts.is_empty() {
                    return Ok(None);
                }
                let connective = match group.kind {
                    GroupKind::And => " AND ",
                    GroupKind::Or => " OR ",
                };
                Ok(Some(parts.join(connective)))
            }
            QueryNode::Negation(child) => match child {
                None => Ok(None),
                Some(inner) => Ok(self
                    .build_expression(inner)?
                    .map(|rendered| format!("NOT({rendered})"))),
            },
        }
    }

    fn build_condition(&self, condition: &ConditionNode) -> Result<String, SqlGeneratorError> {
        let lvalue = self.build_value(&condition.lvalue)?;
        let rendered = match condition.operator {
            ConditionOperator::Equal => {
                let rvalue = self.build_value(&condition.rvalue)?;
                let op = if condition.negate { "<>" } else { "=" };
                return Ok(format!("{lvalue}{op}{rvalue}"));
            }
            ConditionOperator::Null => {
                let expected = if condition.negate { "IS NOT NULL" } else { "IS NULL" };
                return Ok(format!("{lvalue} {expected}"));
            }
            ConditionOperator::GreaterThan => {
                format!("{lvalue}>{}", self.build_value(&condition.rvalue)?)
            }
            ConditionOperator::GreaterThanOrEqual => {
                format!("{lvalue}>={}", self.build_value(&condition.rvalue)?)
            }
            ConditionOperator::LessThan => {
                format!("{lvalue}<{}", self.build_value(&condition.rvalue)?)
            }
            ConditionOperator::LessThanOrEqual => {
                format!("{lvalue}<={}", self.build_value(&condition.rvalue)?)
            }
            ConditionOperator::Like => {
                format!("{lvalue} LIKE {}", self.build_value(&condition.rvalue)?)
            }
            ConditionOperator::In => {
                let rvalue = self.build_value(&condition.rvalue)?;
                if rvalue.trim().is_empty() {
                    // empty membership set can match nothing
                    "0=1".to_string()
                } else {
                    format!("{lvalue} IN ({rvalue})")
                }
            }
        };
        if condition.negate {
            Ok(format!("NOT ({rendered})"))
        } else {
            Ok(rendered)
        }
    }

    pub fn build_value(&self, value: &QueryValue) -> Result<String, SqlGeneratorError> {
        match value {
            QueryValue::Field(field) => Ok(self.build_field(field)),
            QueryValue::Const(constant) => Ok(self.build_const(constant)),
            QueryValue::Raw(text) => Ok(text.clone()),
            QueryValue::Subquery(_) => Err(SqlGeneratorError::UntranslatedSubquery),
        }
    }

    /// Explicit expression wins; otherwise `prefix.name` or bare `name`.
    pub fn build_field(&self, field: &QField) -> String {
        if let Some(expression) = &field.expression {
            return expression.clone();
        }
        match &field.prefix {
            Some(prefix) => format!("{}.{}", prefix, field.name),
            None => field.name.clone(),
        }
    }

    pub fn build_const(&self, constant: &QConst) -> String {
        self.render_const(&constant.0)
    }

    fn render_const(&self, value: &ConstValue) -> String {
        match value {
            ConstValue::Integer(v) => v.to_string(),
            ConstValue::Decimal(v) => v.to_string(),
            ConstValue::Boolean(v) => (if *v { "1" } else { "0" }).to_string(),
            ConstValue::Text(v) => format!("'{}'", v.replace('\'', "\\'")),
            ConstValue::DateTime(v) => format!("'{}'", v.format("%Y-%m-%d %H:%M:%S")),
            ConstValue::Null => "NULL".to_string(),
            ConstValue::List(values) => values
                .iter()
                .map(|v| self.render_const(v))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    pub fn build_sort(&self, sort: &QSort) -> String {
        let direction = match sort.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        format!("{} {}", self.build_field(&sort.field), direction)
    }
}
