use thiserror::Error;

/// Faults of the pure expression compiler. An untranslated subquery
/// reaching it is a programming error in the calling layer and is never
/// suppressed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SqlGeneratorError {
    #[error("subquery operand was not lowered before SQL rendering")]
    UntranslatedSubquery,
}
