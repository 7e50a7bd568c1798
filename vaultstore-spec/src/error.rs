use thiserror::Error;

/// Result alias for secret store operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Canonical secret store error surface.
///
/// Backends translate their transport-specific failures into one of these
/// variants at the call site. "Not found" is deliberately absent: lookups
/// report it as `None` and deletions as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("vault configuration error: {0}")]
    VaultConfig(String),
    #[error("malformed principal: {principal}")]
    MalformedPrincipal { principal: String },
    #[error("invalid key {key:?}: keys must not contain the reserved separator")]
    InvalidKey { key: String },
    #[error("entry already exists: {key}")]
    Exists { key: String },
    #[error("store error: {0}")]
    Store(String),
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl Error {
    pub fn vault_config(msg: impl Into<String>) -> Self {
        Self::VaultConfig(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn malformed_principal(principal: impl Into<String>) -> Self {
        Self::MalformedPrincipal {
            principal: principal.into(),
        }
    }

    /// True for errors raised locally before any remote call was made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::VaultConfig(_) | Self::MalformedPrincipal { .. } | Self::InvalidKey { .. }
        )
    }
}

/// Compatibility aliases preferred by downstream callers.
pub type StoreResult<T> = Result<T>;
pub type StoreError = Error;
