use serde::{Deserialize, Serialize};

use crate::schema_catalog::data_schema::PropertyDataType;

/// Physical naming contract the relational executor must honor.
///
/// One attribute table per property data type with columns `object_id`,
/// `property_compact_id`, `value`; one relation table with columns
/// `subject_id`, `predicate_class_compact_id`, `object_id`; one object
/// registry table with columns `id`, `compact_class_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub objects_table: String,
    pub relations_table: String,
    pub integer_values_table: String,
    pub decimal_values_table: String,
    pub string_values_table: String,
    pub boolean_values_table: String,
    pub datetime_values_table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            objects_table: "objects".to_string(),
            relations_table: "object_relations".to_string(),
            integer_values_table: "objects_integer_values".to_string(),
            decimal_values_table: "objects_decimal_values".to_string(),
            string_values_table: "objects_string_values".to_string(),
            boolean_values_table: "objects_boolean_values".to_string(),
            datetime_values_table: "objects_datetime_values".to_string(),
        }
    }
}

impl StorageConfig {
    /// Attribute table holding values of the given data type.
    pub fn attribute_table(&self, data_type: PropertyDataType) -> &str {
        match data_type {
            PropertyDataType::Integer => &self.integer_values_table,
            PropertyDataType::Decimal => &self.decimal_values_table,
            PropertyDataType::String => &self.string_values_table,
            PropertyDataType::Boolean => &self.boolean_values_table,
            PropertyDataType::DateTime => &self.datetime_values_table,
        }
    }
}
