use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

use super::errors::SchemaError;

lazy_static! {
    /// Builtin derivation transforms, name -> positional SQL template.
    static ref BUILTIN_DERIVATIONS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("extract_year", "EXTRACT(YEAR FROM {0})");
        m.insert("extract_month", "EXTRACT(MONTH FROM {0})");
        m.insert("extract_day", "EXTRACT(DAY FROM {0})");
        m.insert("lowercase", "LOWER({0})");
        m.insert("uppercase", "UPPER({0})");
        m
    };
}

/// Formula applied to a derived property's resolved source column.
#[derive(Debug, PartialEq, Clone)]
pub enum DerivationFormula {
    /// Named builtin transform from the registry.
    Builtin(String),
    /// Positional numeric template, e.g. `"{0}*10"`.
    Template(String),
}

impl DerivationFormula {
    pub fn is_known_builtin(name: &str) -> bool {
        BUILTIN_DERIVATIONS.contains_key(name)
    }

    /// Wrap a resolved column reference with this formula.
    pub fn apply(&self, column: &str) -> Result<String, SchemaError> {
        match self {
            DerivationFormula::Builtin(name) => {
                let template =
                    BUILTIN_DERIVATIONS
                        .get(name.as_str())
                        .ok_or_else(|| SchemaError::DerivationFunction {
                            name: name.clone(),
                        })?;
                Ok(template.replace("{0}", column))
            }
            DerivationFormula::Template(template) => Ok(template.replace("{0}", column)),
        }
    }
}

impl fmt::Display for DerivationFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivationFormula::Builtin(name) => write!(f, "{name}"),
            DerivationFormula::Template(template) => f.write_str(template),
        }
    }
}
