use shiprocket_client::ShiprocketError;
use shiprocket_core::validation::ValidationError;
use shiprocket_core::{CoreError, ProviderResult, StoreError};

/// Errors raised inside provider operations.
///
/// Only [`ProviderError::Store`] (and, for the package endpoint,
/// [`ProviderError::Validation`]) ever leave a public operation; everything
/// else is folded into a failed [`ProviderResult`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Remote(#[from] ShiprocketError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A workflow step could not proceed.
    #[error("{0}")]
    Workflow(String),
}

/// Fold an operation outcome into the result envelope, letting persistence
/// failures through.
pub(crate) fn into_envelope(
    outcome: Result<ProviderResult, ProviderError>,
) -> Result<ProviderResult, StoreError> {
    match outcome {
        Ok(result) => Ok(result),
        Err(ProviderError::Store(e)) => Err(e),
        Err(e) => Ok(ProviderResult::from_error(&e)),
    }
}
