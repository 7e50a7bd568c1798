use crate::error::Result;
use crate::value::SecretValue;
use std::sync::Arc;

/// Key/value pair returned by range lookups.
pub type SpanEntry = (String, Vec<u8>);

/// Storage interface implemented by backing stores.
///
/// Keys are `/`-separated paths. Implementations must treat a missing entry
/// as `Ok(None)` from `get` and `Ok(false)` from `cut`, reserving errors for
/// genuine faults.
pub trait SecretStore: Send + Sync {
    /// Fetch the raw bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`.
    ///
    /// Without `replace`, writing an existing key fails with
    /// [`crate::Error::Exists`].
    fn set(&self, key: &str, value: SecretValue, replace: bool) -> Result<()>;

    /// List leaf names of stored keys, optionally restricted to those whose
    /// full path starts with `prefix`.
    fn list(&self, prefix: Option<&str>) -> Result<Vec<String>>;

    /// Delete `key`, returning whether an entry was removed.
    fn cut(&self, key: &str) -> Result<bool>;

    /// Range retrieval of every entry below `key`.
    fn span(&self, key: &str) -> Result<Vec<SpanEntry>>;
}

impl<T> SecretStore for Arc<T>
where
    T: SecretStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: SecretValue, replace: bool) -> Result<()> {
        (**self).set(key, value, replace)
    }

    fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        (**self).list(prefix)
    }

    fn cut(&self, key: &str) -> Result<bool> {
        (**self).cut(key)
    }

    fn span(&self, key: &str) -> Result<Vec<SpanEntry>> {
        (**self).span(key)
    }
}

impl<T> SecretStore for Box<T>
where
    T: SecretStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: SecretValue, replace: bool) -> Result<()> {
        (**self).set(key, value, replace)
    }

    fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        (**self).list(prefix)
    }

    fn cut(&self, key: &str) -> Result<bool> {
        (**self).cut(key)
    }

    fn span(&self, key: &str) -> Result<Vec<SpanEntry>> {
        (**self).span(key)
    }
}
