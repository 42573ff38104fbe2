//! Assembled SELECT statement parts with SQL rendering.

use crate::query_model::SortDirection;

pub trait ToSql {
    fn to_sql(&self) -> String;
}

#[derive(Debug, PartialEq, Clone)]
pub struct SelectItem {
    pub expression: String,
    pub alias: Option<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FromItem {
    pub table_name: String,
    pub table_alias: String,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum JoinType {
    Inner,
    Left,
}

#[derive(Debug, PartialEq, Clone)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table_name: String,
    pub table_alias: String,
    /// Conjoined ON conditions.
    pub joining_on: Vec<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct OrderByItem {
    pub expression: String,
    pub direction: SortDirection,
}

/// A translated statement: join list, compiled filter, order-by list and
/// pagination, rendered as one SQL text.
#[derive(Debug, PartialEq, Clone)]
pub struct SelectStatement {
    pub select: Vec<SelectItem>,
    pub from: FromItem,
    pub joins: Vec<JoinClause>,
    pub filter: Option<String>,
    pub order_by: Vec<OrderByItem>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl ToSql for SelectItem {
    fn to_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.expression, alias),
            None => self.expression.clone(),
        }
    }
}

impl ToSql for JoinClause {
    fn to_sql(&self) -> String {
        let join_type_str = match self.join_type {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        };
        format!(
            "{} {} AS {} ON ({})",
            join_type_str,
            self.table_name,
            self.table_alias,
            self.joining_on.join(" AND ")
        )
    }
}

impl ToSql for OrderByItem {
    fn to_sql(&self) -> String {
        let direction = match self.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        format!("{} {}", self.expression, direction)
    }
}

impl ToSql for SelectStatement {
    fn to_sql(&self) -> String {
        let mut sql = String::new();

        sql.push_str("SELECT ");
        for (i, item) in self.select.iter().enumerate() {
            sql.push_str(&item.to_sql());
            if i + 1 < self.select.len() {
                sql.push_str(", ");
            }
        }
        sql.push('\n');

        sql.push_str("FROM ");
        sql.push_str(&self.from.table_name);
        sql.push_str(" AS ");
        sql.push_str(&self.from.table_alias);
        sql.push('\n');

        for join in &self.joins {
            sql.push_str(&join.to_sql());
            sql.push('\n');
        }

        if let Some(filter) = &self.filter {
            sql.push_str("WHERE ");
            sql.push_str(filter);
            sql.push('\n');
        }

        if !self.order_by.is_empty() {
            sql.push_str("ORDER BY ");
            for (i, item) in self.order_by.iter().enumerate() {
                sql.push_str(&item.to_sql());
                if i + 1 < self.order_by.len() {
                    sql.push_str(", ");
                }
            }
            sql.push('\n');
        }

        if self.skip.is_some() || self.limit.is_some() {
            let skip_str = match self.skip {
                Some(skip) if skip > 0 => format!("{skip}, "),
                _ => String::new(),
            };
            // unbounded page tail when only an offset was requested
            let limit = self.limit.unwrap_or(i64::MAX as u64);
            sql.push_str(&format!("LIMIT {skip_str}{limit}"));
            sql.push('\n');
        }

        sql
    }
}
