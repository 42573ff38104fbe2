use thiserror::Error;

use crate::executor::ExecutorError;
use crate::translator::errors::TranslationError;

/// Top level error for storage query operations.
///
/// Translation failures are terminal schema violations; executor failures
/// propagate unchanged from the backing store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("TranslationError: {0}")]
    Translation(#[from] TranslationError),
    #[error("ExecutorError: {0}")]
    Executor(#[from] ExecutorError),
}
