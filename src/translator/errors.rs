use thiserror::Error;

use crate::query_model::parser::QueryParseError;
use crate::schema_catalog::errors::SchemaError;
use crate::sql_generator::errors::SqlGeneratorError;

/// Terminal schema-violation errors raised during query translation.
///
/// Resolution never drops a clause or substitutes a default; every
/// failure carries the specific reason.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslationError {
    #[error("No class found for `{class_id}`.")]
    UnknownClass { class_id: String },

    #[error("Property `{property_id}` doesn't exist on class `{class_id}`.")]
    UnknownProperty {
        class_id: String,
        property_id: String,
    },

    #[error("Path segment `{segment}` is not a relationship known to class `{class_id}`.")]
    UnknownPathSegment { segment: String, class_id: String },

    #[error("Field reference has no path segments.")]
    EmptyFieldPath,

    #[error("Relationship `{relationship_id}` cannot be used with `{class_id}`.")]
    RelationshipNotApplicable {
        relationship_id: String,
        class_id: String,
    },

    #[error("Relationship `{relationship_id}` cannot be used in reverse direction.")]
    RelationshipNotReversible { relationship_id: String },

    #[error(
        "Traversal across relationship `{relationship_id}` is ambiguous because of multiplicity."
    )]
    MultiplicityAmbiguity { relationship_id: String },

    #[error("Cannot sort by multivalue property `{property_id}`.")]
    MultivalueSort { property_id: String },

    #[error("Multivalue property `{property_id}` can only be filtered as a membership test.")]
    MultivalueOperand { property_id: String },

    #[error("Derivation of `{property_id}` on `{class_id}` does not terminate.")]
    DerivationCycle {
        class_id: String,
        property_id: String,
    },

    #[error("A nested query operand can only feed an In condition.")]
    SubqueryOperand,

    #[error("SchemaError: {0}")]
    Schema(#[from] SchemaError),

    #[error("SqlGeneratorError: {0}")]
    Generator(#[from] SqlGeneratorError),

    #[error("QueryParseError: {0}")]
    Parse(#[from] QueryParseError),
}
