use chrono::{NaiveDate, NaiveDateTime};

/// Field reference inside a query.
///
/// `prefix` carries a relationship-path segment or table alias. When
/// `expression` is set it overrides structural rendering with a literal
/// SQL fragment; the translator additionally accepts a dot-path in
/// `expression` for renamed ("as") projections.
#[derive(Debug, PartialEq, Clone)]
pub struct QField {
    pub name: String,
    pub prefix: Option<String>,
    pub expression: Option<String>,
}

impl QField {
    pub fn new(name: impl Into<String>) -> Self {
        QField {
            name: name.into(),
            prefix: None,
            expression: None,
        }
    }

    /// Build a field from a dot-separated path, splitting on the final dot.
    pub fn from_path(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((prefix, name)) => QField {
                name: name.to_string(),
                prefix: Some(prefix.to_string()),
                expression: None,
            },
            None => QField::new(path),
        }
    }

    /// Field rendered under `name` from a literal expression (or a
    /// dot-path resolved by the translator).
    pub fn with_expression(name: impl Into<String>, expression: impl Into<String>) -> Self {
        QField {
            name: name.into(),
            prefix: None,
            expression: Some(expression.into()),
        }
    }

    /// Full dot-path of this field reference.
    pub fn path(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}.{}", prefix, self.name),
            None => self.name.clone(),
        }
    }

    /// Path segments for schema resolution.
    pub fn path_segments(&self) -> Vec<String> {
        self.path().split('.').map(|s| s.to_string()).collect()
    }
}

impl From<&str> for QField {
    fn from(path: &str) -> Self {
        QField::from_path(path)
    }
}

/// Typed constant leaf value.
#[derive(Debug, PartialEq, Clone)]
pub enum ConstValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Null,
    List(Vec<ConstValue>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct QConst(pub ConstValue);

impl QConst {
    pub fn new(value: impl Into<ConstValue>) -> Self {
        QConst(value.into())
    }

    pub fn null() -> Self {
        QConst(ConstValue::Null)
    }
}

impl From<i64> for ConstValue {
    fn from(value: i64) -> Self {
        ConstValue::Integer(value)
    }
}

impl From<i32> for ConstValue {
    fn from(value: i32) -> Self {
        ConstValue::Integer(value as i64)
    }
}

impl From<f64> for ConstValue {
    fn from(value: f64) -> Self {
        ConstValue::Decimal(value)
    }
}

impl From<bool> for ConstValue {
    fn from(value: bool) -> Self {
        ConstValue::Boolean(value)
    }
}

impl From<&str> for ConstValue {
    fn from(value: &str) -> Self {
        ConstValue::Text(value.to_string())
    }
}

impl From<String> for ConstValue {
    fn from(value: String) -> Self {
        ConstValue::Text(value)
    }
}

impl From<NaiveDateTime> for ConstValue {
    fn from(value: NaiveDateTime) -> Self {
        ConstValue::DateTime(value)
    }
}

impl From<NaiveDate> for ConstValue {
    fn from(value: NaiveDate) -> Self {
        ConstValue::DateTime(value.and_hms_opt(0, 0, 0).unwrap_or_default())
    }
}

impl<T: Into<ConstValue>> From<Vec<T>> for ConstValue {
    fn from(values: Vec<T>) -> Self {
        ConstValue::List(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sort key: a field reference plus direction.
#[derive(Debug, PartialEq, Clone)]
pub struct QSort {
    pub field: QField,
    pub direction: SortDirection,
}

impl QSort {
    pub fn asc(path: &str) -> Self {
        QSort {
            field: QField::from_path(path),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(path: &str) -> Self {
        QSort {
            field: QField::from_path(path),
            direction: SortDirection::Descending,
        }
    }
}
