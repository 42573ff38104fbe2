pub mod parser;
pub mod values;

pub use values::{ConstValue, QConst, QField, QSort, SortDirection};

/// Boolean connective of a group node.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum GroupKind {
    And,
    Or,
}

/// Restricted condition operator set. `Not` is a modifier bit on the
/// condition node, not an operator.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ConditionOperator {
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    In,
    Null,
}

/// Leaf operand of a condition.
#[derive(Debug, PartialEq, Clone)]
pub enum QueryValue {
    Field(QField),
    Const(QConst),
    Raw(String),
    /// Nested query operand; lowered to an inlined statement by the
    /// translator before SQL rendering.
    Subquery(Box<Query>),
}

impl From<QField> for QueryValue {
    fn from(field: QField) -> Self {
        QueryValue::Field(field)
    }
}

impl From<QConst> for QueryValue {
    fn from(value: QConst) -> Self {
        QueryValue::Const(value)
    }
}

impl From<Query> for QueryValue {
    fn from(query: Query) -> Self {
        QueryValue::Subquery(Box::new(query))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ConditionNode {
    pub lvalue: QueryValue,
    pub operator: ConditionOperator,
    pub rvalue: QueryValue,
    pub negate: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub struct GroupNode {
    pub kind: GroupKind,
    pub nodes: Vec<QueryNode>,
}

/// Closed expression tree. Every consumer dispatches exhaustively;
/// there is no fallback branch to reach with an unknown variant.
#[derive(Debug, PartialEq, Clone)]
pub enum QueryNode {
    Condition(ConditionNode),
    Group(GroupNode),
    Negation(Option<Box<QueryNode>>),
    Raw(String),
}

impl QueryNode {
    pub fn condition(
        lvalue: impl Into<QueryValue>,
        operator: ConditionOperator,
        rvalue: impl Into<QueryValue>,
    ) -> Self {
        QueryNode::Condition(ConditionNode {
            lvalue: lvalue.into(),
            operator,
            rvalue: rvalue.into(),
            negate: false,
        })
    }

    pub fn negated_condition(
        lvalue: impl Into<QueryValue>,
        operator: ConditionOperator,
        rvalue: impl Into<QueryValue>,
    ) -> Self {
        QueryNode::Condition(ConditionNode {
            lvalue: lvalue.into(),
            operator,
            rvalue: rvalue.into(),
            negate: true,
        })
    }

    pub fn equal(field: &str, value: impl Into<ConstValue>) -> Self {
        QueryNode::condition(
            QField::from_path(field),
            ConditionOperator::Equal,
            QConst::new(value),
        )
    }

    pub fn is_null(field: &str) -> Self {
        QueryNode::condition(QField::from_path(field), ConditionOperator::Null, QConst::null())
    }

    pub fn and(nodes: Vec<QueryNode>) -> Self {
        QueryNode::Group(GroupNode {
            kind: GroupKind::And,
            nodes,
        })
    }

    pub fn or(nodes: Vec<QueryNode>) -> Self {
        QueryNode::Group(GroupNode {
            kind: GroupKind::Or,
            nodes,
        })
    }

    pub fn not(node: QueryNode) -> Self {
        QueryNode::Negation(Some(Box::new(node)))
    }
}

/// A query scoped to a root class.
///
/// Building a query has no side effects; translation happens against an
/// immutable schema snapshot.
#[derive(Debug, PartialEq, Clone)]
pub struct Query {
    pub class_id: String,
    pub alias: Option<String>,
    pub condition: Option<QueryNode>,
    pub fields: Vec<QField>,
    pub sort: Vec<QSort>,
    pub start_record: Option<u64>,
    pub record_count: Option<u64>,
}

impl Query {
    pub fn new(class_id: impl Into<String>) -> Self {
        Query {
            class_id: class_id.into(),
            alias: None,
            condition: None,
            fields: Vec::new(),
            sort: Vec::new(),
            start_record: None,
            record_count: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_condition(mut self, condition: QueryNode) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_fields(mut self, fields: Vec<QField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_sort(mut self, sort: Vec<QSort>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, start_record: u64, record_count: u64) -> Self {
        self.start_record = Some(start_record);
        self.record_count = Some(record_count);
        self
    }
}
