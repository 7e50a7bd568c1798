//! Remote vault command surface and scoped session handling.

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use thiserror::Error;
use tracing::{debug, warn};

use crate::scope::VaultScope;

/// Failure reported by the remote vault service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate entry: {0}")]
    Duplicate(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    Other(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Vault kind used when creating and searching entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultKind {
    #[default]
    Standard,
    Symmetric,
    Asymmetric,
}

impl VaultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Symmetric => "symmetric",
            Self::Asymmetric => "asymmetric",
        }
    }
}

impl fmt::Display for VaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a `vault_find` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    pub name: String,
}

impl VaultEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Server-side vault configuration, as returned by `vaultconfig_show`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfigInfo {
    #[serde(default)]
    pub kra_servers: Vec<String>,
}

/// Commands exposed by an authenticated connection to the vault service.
///
/// Implementations own the transport and its authentication. Connection
/// bookkeeping is driven by [`SessionHandle`]; the remaining methods assume
/// a live connection.
pub trait VaultClient: Send {
    fn is_connected(&self) -> bool;
    fn connect(&mut self) -> RemoteResult<()>;
    fn disconnect(&mut self) -> RemoteResult<()>;

    /// Principal the transport authenticated as.
    fn principal(&self) -> RemoteResult<String>;

    fn ping(&mut self) -> RemoteResult<String>;
    fn vaultconfig_show(&mut self) -> RemoteResult<VaultConfigInfo>;

    fn vault_retrieve(&mut self, name: &str, scope: &VaultScope) -> RemoteResult<Vec<u8>>;
    fn vault_add(&mut self, name: &str, scope: &VaultScope, kind: VaultKind) -> RemoteResult<()>;
    fn vault_archive(&mut self, name: &str, data: &[u8], scope: &VaultScope) -> RemoteResult<()>;
    fn vault_find(&mut self, scope: &VaultScope, kind: VaultKind) -> RemoteResult<Vec<VaultEntry>>;
    fn vault_del(&mut self, name: &str, scope: &VaultScope) -> RemoteResult<()>;
}

impl<T> VaultClient for Box<T>
where
    T: VaultClient + ?Sized,
{
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn connect(&mut self) -> RemoteResult<()> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> RemoteResult<()> {
        (**self).disconnect()
    }

    fn principal(&self) -> RemoteResult<String> {
        (**self).principal()
    }

    fn ping(&mut self) -> RemoteResult<String> {
        (**self).ping()
    }

    fn vaultconfig_show(&mut self) -> RemoteResult<VaultConfigInfo> {
        (**self).vaultconfig_show()
    }

    fn vault_retrieve(&mut self, name: &str, scope: &VaultScope) -> RemoteResult<Vec<u8>> {
        (**self).vault_retrieve(name, scope)
    }

    fn vault_add(&mut self, name: &str, scope: &VaultScope, kind: VaultKind) -> RemoteResult<()> {
        (**self).vault_add(name, scope, kind)
    }

    fn vault_archive(&mut self, name: &str, data: &[u8], scope: &VaultScope) -> RemoteResult<()> {
        (**self).vault_archive(name, data, scope)
    }

    fn vault_find(&mut self, scope: &VaultScope, kind: VaultKind) -> RemoteResult<Vec<VaultEntry>> {
        (**self).vault_find(scope, kind)
    }

    fn vault_del(&mut self, name: &str, scope: &VaultScope) -> RemoteResult<()> {
        (**self).vault_del(name, scope)
    }
}

/// Owner of the vault connection; hands out one [`Session`] at a time.
pub struct SessionHandle<C> {
    client: Mutex<C>,
}

impl<C: VaultClient> SessionHandle<C> {
    pub fn new(client: C) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    /// Connect (unless already connected) and return a guard that
    /// disconnects when dropped.
    pub fn acquire(&self) -> RemoteResult<Session<'_, C>> {
        let mut client = self.client.lock();
        if !client.is_connected() {
            debug!("connecting to vault service");
            client.connect()?;
        }
        Ok(Session { client })
    }

    /// Principal of the underlying transport; does not open a session.
    pub fn principal(&self) -> RemoteResult<String> {
        self.client.lock().principal()
    }

    pub fn into_inner(self) -> C {
        self.client.into_inner()
    }
}

/// Live session on the vault connection.
pub struct Session<'a, C: VaultClient> {
    client: MutexGuard<'a, C>,
}

impl<C: VaultClient> Deref for Session<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.client
    }
}

impl<C: VaultClient> DerefMut for Session<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.client
    }
}

impl<C: VaultClient> Drop for Session<'_, C> {
    fn drop(&mut self) {
        if !self.client.is_connected() {
            return;
        }
        debug!("disconnecting from vault service");
        if let Err(err) = self.client.disconnect() {
            warn!(?err, "failed to disconnect from vault service");
        }
    }
}
