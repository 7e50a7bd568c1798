//! FreeIPA vault backend for the vaultstore secret store contract.
//!
//! Hierarchical keys are flattened into vault names (`a/b` becomes `a__b`)
//! and stored in a user, service or shared vault. The vault type is taken
//! from [`IpaVaultOptions`] or, when unset, inferred from the Kerberos
//! principal the transport authenticated as. The transport itself is
//! supplied by the caller as a [`VaultClient`].

pub mod config;
pub mod memory;
pub mod principal;
pub mod scope;
pub mod session;
mod store;

pub use config::IpaVaultOptions;
pub use memory::{MemoryVault, VaultCall, VaultCommand};
pub use principal::PrincipalName;
pub use scope::{ResolvedScope, VaultScope, VaultType};
pub use session::{
    RemoteError, RemoteResult, Session, SessionHandle, VaultClient, VaultConfigInfo, VaultEntry,
    VaultKind,
};
pub use store::IpaVault;

use anyhow::{Context, Result};
use vaultstore_spec::SecretStore;

/// Construct the vault store from `IPA_*` environment configuration.
pub fn build_store<C>(client: C) -> Result<Box<dyn SecretStore>>
where
    C: VaultClient + 'static,
{
    let options = IpaVaultOptions::from_env();
    let store = IpaVault::new(client, &options).context("failed to configure ipa vault store")?;
    Ok(Box::new(store))
}
