use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::derivation::DerivationFormula;
use super::errors::{SchemaConfigError, SchemaError};

/// Data type of a property value; selects the physical attribute table.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PropertyDataType {
    Integer,
    Decimal,
    String,
    Boolean,
    DateTime,
}

impl fmt::Display for PropertyDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyDataType::Integer => f.write_str("integer"),
            PropertyDataType::Decimal => f.write_str("decimal"),
            PropertyDataType::String => f.write_str("string"),
            PropertyDataType::Boolean => f.write_str("boolean"),
            PropertyDataType::DateTime => f.write_str("datetime"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: String,
    /// Small surrogate key partitioning the attribute tables.
    pub compact_id: i64,
    pub name: String,
    pub data_type: PropertyDataType,
    /// An object may hold 0..N values for this property. Never usable as
    /// a sort key or a single-valued filter operand.
    pub multivalue: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub id: String,
    pub compact_id: i64,
    pub name: String,
    /// Classes that exist solely to name a relationship type.
    pub is_predicate: bool,
}

/// Derived-property declaration: the value is computed from the resolved
/// column of `source_path` wrapped by `formula`. The source may itself be
/// derived or relationship-qualified, as long as the chain stays finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub source_path: String,
    pub formula: DerivationFormula,
}

/// Binds a property to a class, optionally as a derived placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassPropertyLocation {
    pub class_id: String,
    pub property_id: String,
    pub derivation: Option<Derivation>,
}

/// Predicate-discriminated link between a subject and an object class.
///
/// `reversed` marks a registration whose physical rows are stored in the
/// opposite orientation: traversal starts at the `object_id` column.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub predicate_class_id: String,
    pub subject_class_id: String,
    pub object_class_id: String,
    /// One subject may link to many objects along this direction.
    pub multiplicity: bool,
    pub reversed: bool,
}

impl Relationship {
    /// Relation-table columns matched against the near (current) and far
    /// (joined) object identifiers.
    pub fn near_far_columns(&self) -> (&'static str, &'static str) {
        if self.reversed {
            ("object_id", "subject_id")
        } else {
            ("subject_id", "object_id")
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Subject={}; Predicate={}; Object={}]",
            self.subject_class_id, self.predicate_class_id, self.object_class_id
        )
    }
}

/// Explicit opt-in for object-side traversal of a declared relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseRegistration {
    pub relationship_id: String,
    /// Multiplicity of the reversed direction.
    pub multiplicity: bool,
}

/// Immutable schema snapshot.
///
/// Constructed once, then only read; callers publish a new snapshot to
/// change metadata. Lookups go by stable string identifiers and never
/// fuzzy-match.
#[derive(Debug, Clone)]
pub struct DataSchema {
    classes: HashMap<String, Class>,
    properties: HashMap<String, Property>,
    relationships: HashMap<String, Relationship>,
    class_properties: HashMap<(String, String), ClassPropertyLocation>,
    class_property_ids: HashMap<String, Vec<String>>,
    /// (predicate class, subject class) -> relationship id
    forward_index: HashMap<(String, String), String>,
    /// (predicate class, traversal-subject class) -> synthesized reversed
    /// relationship; populated only from explicit reverse registrations
    reverse_index: HashMap<(String, String), Relationship>,
}

impl DataSchema {
    pub fn build(
        classes: Vec<Class>,
        properties: Vec<Property>,
        relationships: Vec<Relationship>,
        locations: Vec<ClassPropertyLocation>,
        reverses: Vec<ReverseRegistration>,
    ) -> Result<DataSchema, SchemaConfigError> {
        let mut class_map = HashMap::new();
        let mut class_compact_ids = HashSet::new();
        for class in classes {
            if class_compact_ids.contains(&class.compact_id) {
                return Err(SchemaConfigError::DuplicateCompactId {
                    kind: "class",
                    compact_id: class.compact_id,
                });
            }
            class_compact_ids.insert(class.compact_id);
            if class_map.insert(class.id.clone(), class.clone()).is_some() {
                return Err(SchemaConfigError::DuplicateId {
                    kind: "class",
                    id: class.id,
                });
            }
        }

        let mut property_map = HashMap::new();
        let mut property_compact_ids = HashSet::new();
        for property in properties {
            if property_compact_ids.contains(&property.compact_id) {
                return Err(SchemaConfigError::DuplicateCompactId {
                    kind: "property",
                    compact_id: property.compact_id,
                });
            }
            property_compact_ids.insert(property.compact_id);
            if property_map
                .insert(property.id.clone(), property.clone())
                .is_some()
            {
                return Err(SchemaConfigError::DuplicateId {
                    kind: "property",
                    id: property.id,
                });
            }
        }

        let mut relationship_map: HashMap<String, Relationship> = HashMap::new();
        let mut forward_index = HashMap::new();
        for relationship in relationships {
            for (kind, class_id) in [
                ("predicate class", &relationship.predicate_class_id),
                ("subject class", &relationship.subject_class_id),
                ("object class", &relationship.object_class_id),
            ] {
                if !class_map.contains_key(class_id) {
                    return Err(SchemaConfigError::DanglingReference {
                        context: format!("relationship `{}`", relationship.id),
                        kind,
                        id: class_id.clone(),
                    });
                }
            }
            let predicate = &class_map[&relationship.predicate_class_id];
            if !predicate.is_predicate {
                return Err(SchemaConfigError::PredicateExpected {
                    relationship_id: relationship.id.clone(),
                    class_id: predicate.id.clone(),
                });
            }
            forward_index.insert(
                (
                    relationship.predicate_class_id.clone(),
                    relationship.subject_class_id.clone(),
                ),
                relationship.id.clone(),
            );
            if relationship_map
                .insert(relationship.id.clone(), relationship.clone())
                .is_some()
            {
                return Err(SchemaConfigError::DuplicateId {
                    kind: "relationship",
                    id: relationship.id,
                });
            }
        }

        let mut class_properties = HashMap::new();
        let mut class_property_ids: HashMap<String, Vec<String>> = HashMap::new();
        for location in locations {
            if !class_map.contains_key(&location.class_id) {
                return Err(SchemaConfigError::DanglingReference {
                    context: format!("placement of `{}`", location.property_id),
                    kind: "class",
                    id: location.class_id.clone(),
                });
            }
            if !property_map.contains_key(&location.property_id) {
                return Err(SchemaConfigError::DanglingReference {
                    context: format!("placement on `{}`", location.class_id),
                    kind: "property",
                    id: location.property_id.clone(),
                });
            }
            if let Some(derivation) = &location.derivation {
                if let DerivationFormula::Builtin(name) = &derivation.formula {
                    if !DerivationFormula::is_known_builtin(name) {
                        return Err(SchemaConfigError::UnknownFormula {
                            class_id: location.class_id.clone(),
                            property_id: location.property_id.clone(),
                            name: name.clone(),
                        });
                    }
                }
            }
            class_property_ids
                .entry(location.class_id.clone())
                .or_default()
                .push(location.property_id.clone());
            if class_properties
                .insert(
                    (location.class_id.clone(), location.property_id.clone()),
                    location.clone(),
                )
                .is_some()
            {
                return Err(SchemaConfigError::DuplicateId {
                    kind: "class property placement",
                    id: format!("{}.{}", location.class_id, location.property_id),
                });
            }
        }

        let mut reverse_index = HashMap::new();
        for reverse in reverses {
            let forward = relationship_map.get(&reverse.relationship_id).ok_or_else(|| {
                SchemaConfigError::DanglingReference {
                    context: "reverse registration".to_string(),
                    kind: "relationship",
                    id: reverse.relationship_id.clone(),
                }
            })?;
            reverse_index.insert(
                (
                    forward.predicate_class_id.clone(),
                    forward.object_class_id.clone(),
                ),
                Relationship {
                    id: forward.id.clone(),
                    predicate_class_id: forward.predicate_class_id.clone(),
                    subject_class_id: forward.object_class_id.clone(),
                    object_class_id: forward.subject_class_id.clone(),
                    multiplicity: reverse.multiplicity,
                    reversed: !forward.reversed,
                },
            );
        }

        let schema = DataSchema {
            classes: class_map,
            properties: property_map,
            relationships: relationship_map,
            class_properties,
            class_property_ids,
            forward_index,
            reverse_index,
        };
        schema.check_derivation_cycles()?;
        Ok(schema)
    }

    /// Same-class derivation chains must be finite. Relationship-qualified
    /// sources switch class and are checked per path at translation time.
    fn check_derivation_cycles(&self) -> Result<(), SchemaConfigError> {
        for ((class_id, property_id), location) in &self.class_properties {
            if location.derivation.is_none() {
                continue;
            }
            let mut visited = HashSet::new();
            let mut current = location;
            while let Some(derivation) = &current.derivation {
                if !visited.insert(current.property_id.clone()) {
                    return Err(SchemaConfigError::DerivationCycle {
                        class_id: class_id.clone(),
                        property_id: property_id.clone(),
                    });
                }
                if derivation.source_path.contains('.') || derivation.source_path == "id" {
                    break;
                }
                match self
                    .class_properties
                    .get(&(class_id.clone(), derivation.source_path.clone()))
                {
                    Some(next) => current = next,
                    None => {
                        return Err(SchemaConfigError::DanglingReference {
                            context: format!(
                                "derivation of `{property_id}` on `{class_id}`"
                            ),
                            kind: "property",
                            id: derivation.source_path.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn find_class(&self, class_id: &str) -> Result<&Class, SchemaError> {
        self.classes.get(class_id).ok_or_else(|| SchemaError::Class {
            class_id: class_id.to_string(),
        })
    }

    pub fn find_property(&self, property_id: &str) -> Result<&Property, SchemaError> {
        self.properties
            .get(property_id)
            .ok_or_else(|| SchemaError::Property {
                property_id: property_id.to_string(),
            })
    }

    pub fn find_relationship(&self, relationship_id: &str) -> Result<&Relationship, SchemaError> {
        self.relationships
            .get(relationship_id)
            .ok_or_else(|| SchemaError::Relationship {
                relationship_id: relationship_id.to_string(),
            })
    }

    pub fn get_relationship_opt(&self, relationship_id: &str) -> Option<&Relationship> {
        self.relationships.get(relationship_id)
    }

    /// Property placement (possibly derived) of a property on a class.
    pub fn find_class_property(
        &self,
        class_id: &str,
        property_id: &str,
    ) -> Result<&ClassPropertyLocation, SchemaError> {
        self.class_properties
            .get(&(class_id.to_string(), property_id.to_string()))
            .ok_or_else(|| SchemaError::ClassProperty {
                class_id: class_id.to_string(),
                property_id: property_id.to_string(),
            })
    }

    /// Property ids placed on a class, in declaration order.
    pub fn class_property_ids(&self, class_id: &str) -> &[String] {
        self.class_property_ids
            .get(class_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reversed registration usable to traverse from `from_class_id` over
    /// the given predicate. `None` when no reverse was registered.
    pub fn find_reverse_relationship(
        &self,
        predicate_class_id: &str,
        from_class_id: &str,
    ) -> Option<&Relationship> {
        self.reverse_index
            .get(&(predicate_class_id.to_string(), from_class_id.to_string()))
    }

    /// Class-scoped relationship lookup through the bidirectional index.
    pub fn find_class_relationship(
        &self,
        class_id: &str,
        predicate_class_id: &str,
        other_class_id: &str,
        reverse: bool,
    ) -> Result<&Relationship, SchemaError> {
        let found = if reverse {
            self.find_reverse_relationship(predicate_class_id, class_id)
                .filter(|rel| rel.object_class_id == other_class_id)
        } else {
            self.forward_index
                .get(&(predicate_class_id.to_string(), class_id.to_string()))
                .and_then(|id| self.relationships.get(id))
                .filter(|rel| rel.object_class_id == other_class_id)
        };
        found.ok_or_else(|| SchemaError::Relationship {
            relationship_id: format!("{predicate_class_id}:{class_id}->{other_class_id}"),
        })
    }
}
