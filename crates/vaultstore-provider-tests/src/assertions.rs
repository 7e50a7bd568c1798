use anyhow::Result;
use vaultstore_spec::{Error, SecretStore};

pub fn assert_get_eq<S: SecretStore + ?Sized>(
    store: &S,
    store_name: &str,
    key: &str,
    expected: &[u8],
) -> Result<()> {
    let Some(actual) = store.get(key)? else {
        anyhow::bail!("expected value for {store_name}:{key}, got none");
    };
    if actual != expected {
        anyhow::bail!(
            "value mismatch for {store_name}:{key} ({} vs {} bytes)",
            actual.len(),
            expected.len()
        );
    }
    Ok(())
}

pub fn assert_absent<S: SecretStore + ?Sized>(
    store: &S,
    store_name: &str,
    key: &str,
) -> Result<()> {
    if store.get(key)?.is_some() {
        anyhow::bail!("expected no value for {store_name}:{key}");
    }
    Ok(())
}

/// Check that `result` failed with an error matching `expected`.
pub fn assert_err<T>(
    result: vaultstore_spec::Result<T>,
    what: &str,
    expected: impl Fn(&Error) -> bool,
) -> Result<()> {
    match result {
        Ok(_) => anyhow::bail!("{what}: expected an error, got success"),
        Err(err) if expected(&err) => Ok(()),
        Err(err) => anyhow::bail!("{what}: unexpected error {err}"),
    }
}
