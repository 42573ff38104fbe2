use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("No class found for `{class_id}`.")]
    Class { class_id: String },
    #[error("No property found for `{property_id}`.")]
    Property { property_id: String },
    #[error("No relationship found for `{relationship_id}`.")]
    Relationship { relationship_id: String },
    #[error("Property `{property_id}` is not placed on class `{class_id}`.")]
    ClassProperty {
        class_id: String,
        property_id: String,
    },
    #[error("No derivation function registered under `{name}`.")]
    DerivationFunction { name: String },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaConfigError {
    #[error("cannot read schema config: {error}")]
    ConfigRead { error: String },
    #[error("cannot parse schema config: {error}")]
    ConfigParse { error: String },
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
    #[error("duplicate {kind} compact id {compact_id}")]
    DuplicateCompactId { kind: &'static str, compact_id: i64 },
    #[error("{context} references unknown {kind} `{id}`")]
    DanglingReference {
        context: String,
        kind: &'static str,
        id: String,
    },
    #[error("relationship `{relationship_id}` predicate `{class_id}` is not a predicate class")]
    PredicateExpected {
        relationship_id: String,
        class_id: String,
    },
    #[error(
        "derived placement of `{property_id}` on `{class_id}` must declare exactly one of `formula` or `template`"
    )]
    AmbiguousDerivation {
        class_id: String,
        property_id: String,
    },
    #[error("derived placement of `{property_id}` on `{class_id}` uses unknown formula `{name}`")]
    UnknownFormula {
        class_id: String,
        property_id: String,
        name: String,
    },
    #[error("derivation of `{property_id}` on `{class_id}` forms a cycle")]
    DerivationCycle {
        class_id: String,
        property_id: String,
    },
}
