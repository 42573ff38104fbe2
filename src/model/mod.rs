//! EAV object carriers populated by external hydration and CRUD layers.
//!
//! The translator only computes identifier sets; it never constructs or
//! mutates these.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;

use crate::query_model::ConstValue;
use crate::schema_catalog::data_schema::PropertyDataType;

/// Stored value tagged by its property data type.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl PropertyValue {
    pub fn data_type(&self) -> PropertyDataType {
        match self {
            PropertyValue::Integer(_) => PropertyDataType::Integer,
            PropertyValue::Decimal(_) => PropertyDataType::Decimal,
            PropertyValue::Text(_) => PropertyDataType::String,
            PropertyValue::Boolean(_) => PropertyDataType::Boolean,
            PropertyValue::DateTime(_) => PropertyDataType::DateTime,
        }
    }
}

impl From<PropertyValue> for ConstValue {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Integer(v) => ConstValue::Integer(v),
            PropertyValue::Decimal(v) => ConstValue::Decimal(v),
            PropertyValue::Text(v) => ConstValue::Text(v),
            PropertyValue::Boolean(v) => ConstValue::Boolean(v),
            PropertyValue::DateTime(v) => ConstValue::DateTime(v),
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for PropertyValue {
    fn from(value: NaiveDateTime) -> Self {
        PropertyValue::DateTime(value)
    }
}

/// A class instance: object identifier plus property-keyed values.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectContainer {
    pub class_id: String,
    pub id: Option<i64>,
    values: HashMap<String, Vec<PropertyValue>>,
}

impl ObjectContainer {
    pub fn new(class_id: impl Into<String>) -> Self {
        ObjectContainer {
            class_id: class_id.into(),
            id: None,
            values: HashMap::new(),
        }
    }

    pub fn with_id(class_id: impl Into<String>, id: i64) -> Self {
        ObjectContainer {
            class_id: class_id.into(),
            id: Some(id),
            values: HashMap::new(),
        }
    }

    /// First stored value of a property, if any.
    pub fn get(&self, property_id: &str) -> Option<&PropertyValue> {
        self.values.get(property_id).and_then(|v| v.first())
    }

    /// All stored values of a multivalue property.
    pub fn get_all(&self, property_id: &str) -> &[PropertyValue] {
        self.values
            .get(property_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replace the stored value of a property.
    pub fn set(&mut self, property_id: impl Into<String>, value: impl Into<PropertyValue>) {
        self.values.insert(property_id.into(), vec![value.into()]);
    }

    /// Append one more value to a multivalue property.
    pub fn add(&mut self, property_id: impl Into<String>, value: impl Into<PropertyValue>) {
        self.values
            .entry(property_id.into())
            .or_default()
            .push(value.into());
    }

    pub fn remove(&mut self, property_id: &str) {
        self.values.remove(property_id);
    }

    pub fn property_ids(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }
}

/// One row per linked (subject, relationship, object) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRelation {
    pub subject_id: i64,
    pub relationship_id: String,
    pub object_id: i64,
}

impl ObjectRelation {
    pub fn new(subject_id: i64, relationship_id: impl Into<String>, object_id: i64) -> Self {
        ObjectRelation {
            subject_id,
            relationship_id: relationship_id.into(),
            object_id,
        }
    }
}

impl fmt::Display for ObjectRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[SubjectID={}; {}; ObjectID={}]",
            self.subject_id, self.relationship_id, self.object_id
        )
    }
}
