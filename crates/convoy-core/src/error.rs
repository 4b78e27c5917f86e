//! Error types for `convoy-core`.

use thiserror::Error;

use crate::provider::Capability;

#[derive(Debug, Error)]
pub enum Error {
  /// The key-value provider failed to read or write.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// A stored value exists but does not decode as an obstacle list.
  #[error("stored obstacle list is corrupt: {0}")]
  Corrupt(#[source] serde_json::Error),

  #[error("{0} permission denied")]
  PermissionDenied(Capability),

  #[error("provider error: {0}")]
  Provider(String),

  #[error("address is empty")]
  EmptyAddress,

  #[error("address not found: {0:?}")]
  AddressNotFound(String),

  #[error("contact not found: {0:?}")]
  ContactNotFound(String),
}

impl Error {
  /// Wrap any backend error as [`Error::Storage`].
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
