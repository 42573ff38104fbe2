//! Schema definitions loaded from YAML or JSON documents.
//!
//! A `SchemaConfig` is the serialized form published by the metadata
//! authority; `build()` validates it structurally and produces an
//! immutable [`DataSchema`] snapshot.
//!
//! ```yaml
//! properties:
//!   - id: name
//!     compact_id: 1
//!     data_type: string
//! classes:
//!   - id: contacts
//!     compact_id: 1
//!     properties:
//!       - property: name
//!       - property: birthday_year
//!         source: birthday
//!         formula: extract_year
//! relationships:
//!   - id: contacts_employee_companies
//!     predicate: employee
//!     subject: contacts
//!     object: companies
//!     multiplicity: false
//!     reverse_multiplicity: true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::data_schema::{
    Class, ClassPropertyLocation, DataSchema, Derivation, Property, PropertyDataType,
    Relationship, ReverseRegistration,
};
use super::derivation::DerivationFormula;
use super::errors::SchemaConfigError;

#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub classes: Vec<ClassDef>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyDef {
    pub id: String,
    pub compact_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub data_type: PropertyDataType,
    #[serde(default)]
    pub multivalue: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassDef {
    pub id: String,
    pub compact_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_predicate: bool,
    #[serde(default)]
    pub properties: Vec<PlacementDef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlacementDef {
    pub property: String,
    /// Source path of a derived placement; may name a property, `id`, or
    /// a relationship-qualified path.
    #[serde(default)]
    pub source: Option<String>,
    /// Builtin transform name.
    #[serde(default)]
    pub formula: Option<String>,
    /// Positional numeric template, e.g. `"{0}*10"`.
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelationshipDef {
    pub id: String,
    pub predicate: String,
    pub subject: String,
    pub object: String,
    #[serde(default)]
    pub multiplicity: bool,
    /// Registers the reverse traversal direction with the given
    /// multiplicity. Absent means the relationship is not reversible.
    #[serde(default)]
    pub reverse_multiplicity: Option<bool>,
}

impl SchemaConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| SchemaConfigError::ConfigRead {
            error: e.to_string(),
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| SchemaConfigError::ConfigParse {
            error: e.to_string(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaConfigError> {
        serde_json::from_str(json).map_err(|e| SchemaConfigError::ConfigParse {
            error: e.to_string(),
        })
    }

    /// Validate the definitions and build an immutable schema snapshot.
    pub fn build(self) -> Result<DataSchema, SchemaConfigError> {
        let properties: Vec<Property> = self
            .properties
            .into_iter()
            .map(|def| Property {
                name: def.name.unwrap_or_else(|| def.id.clone()),
                id: def.id,
                compact_id: def.compact_id,
                data_type: def.data_type,
                multivalue: def.multivalue,
            })
            .collect();

        let mut classes = Vec::new();
        let mut locations = Vec::new();
        for def in self.classes {
            for placement in &def.properties {
                locations.push(ClassPropertyLocation {
                    class_id: def.id.clone(),
                    property_id: placement.property.clone(),
                    derivation: placement_derivation(&def.id, placement)?,
                });
            }
            classes.push(Class {
                name: def.name.unwrap_or_else(|| def.id.clone()),
                id: def.id,
                compact_id: def.compact_id,
                is_predicate: def.is_predicate,
            });
        }

        let mut relationships = Vec::new();
        let mut reverses = Vec::new();
        for def in self.relationships {
            if let Some(multiplicity) = def.reverse_multiplicity {
                reverses.push(ReverseRegistration {
                    relationship_id: def.id.clone(),
                    multiplicity,
                });
            }
            relationships.push(Relationship {
                id: def.id,
                predicate_class_id: def.predicate,
                subject_class_id: def.subject,
                object_class_id: def.object,
                multiplicity: def.multiplicity,
                reversed: false,
            });
        }

        DataSchema::build(classes, properties, relationships, locations, reverses)
    }
}

fn placement_derivation(
    class_id: &str,
    placement: &PlacementDef,
) -> Result<Option<Derivation>, SchemaConfigError> {
    match (&placement.source, &placement.formula, &placement.template) {
        (None, None, None) => Ok(None),
        (Some(source), Some(formula), None) => Ok(Some(Derivation {
            source_path: source.clone(),
            formula: DerivationFormula::Builtin(formula.clone()),
        })),
        (Some(source), None, Some(template)) => Ok(Some(Derivation {
            source_path: source.clone(),
            formula: DerivationFormula::Template(template.clone()),
        })),
        _ => Err(SchemaConfigError::AmbiguousDerivation {
            class_id: class_id.to_string(),
            property_id: placement.property.clone(),
        }),
    }
}
