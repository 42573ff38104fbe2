pub mod config;
pub mod data_schema;
pub mod derivation;
pub mod errors;

pub use config::SchemaConfig;
pub use data_schema::{
    Class, ClassPropertyLocation, DataSchema, Derivation, Property, PropertyDataType,
    Relationship, ReverseRegistration,
};
pub use derivation::DerivationFormula;
pub use errors::{SchemaConfigError, SchemaError};
