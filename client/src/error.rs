//! [`Error`]-related definitions.

use derive_more::{Display, Error as StdError, From};

use crate::{catalog, draft::Rejection, infra::storage};

/// Failure of a client-side operation.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Backend refused a malformed [`Land`] (or another request body).
    ///
    /// [`Land`]: service::domain::Land
    #[display("validation failed: {_0}")]
    Validation(#[error(not(source))] String),

    /// Request failed to complete.
    #[display("request failed: {_0}")]
    Transient(#[error(not(source))] String),

    /// Operation was rejected by the local state guards.
    #[display("operation rejected: {_0}")]
    #[from]
    Rejected(Rejection),

    /// Confirmed [`Land`] is already present in the [`Catalog`].
    ///
    /// [`Catalog`]: crate::Catalog
    /// [`Land`]: service::domain::Land
    #[display("{_0}")]
    #[from]
    Duplicate(catalog::Duplicate),

    /// Local [`storage`] failed.
    #[display("storage failed: {_0}")]
    #[from]
    Storage(storage::Error),
}

impl Error {
    /// Indicates whether this [`Error`] is a [`Error::Validation`] one.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Indicates whether this [`Error`] is a [`Error::Transient`] one.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
