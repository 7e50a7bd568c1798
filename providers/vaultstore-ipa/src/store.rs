use tracing::{debug, error, info, warn};
use vaultstore_spec::{
    Error, Result, SecretStore, SecretValue, SpanEntry, decode_key, encode_key, leaf_segment,
};

use crate::config::IpaVaultOptions;
use crate::scope::{ResolvedScope, VaultScope, VaultType};
use crate::session::{RemoteError, Session, SessionHandle, VaultClient, VaultKind};

/// Secret store backed by FreeIPA vaults.
///
/// The vault scope is resolved once in [`IpaVault::new`]; every operation
/// then runs inside its own session on the shared connection.
pub struct IpaVault<C> {
    session: SessionHandle<C>,
    resolved: ResolvedScope,
}

impl<C: VaultClient> IpaVault<C> {
    /// Check the service is reachable and resolve the vault scope.
    pub fn new(client: C, options: &IpaVaultOptions) -> Result<Self> {
        let session = SessionHandle::new(client);
        {
            let mut conn = session
                .acquire()
                .map_err(|err| remote_fault("connect to vault service", None, err))?;
            match conn.vaultconfig_show() {
                Ok(config) => info!("KRA server(s) {}", config.kra_servers.join(", ")),
                Err(err) => warn!(?err, "failed to query vault configuration"),
            }
            let summary = conn
                .ping()
                .map_err(|err| remote_fault("ping vault service", None, err))?;
            info!(%summary, "vault service reachable");
        }

        let resolved = ResolvedScope::resolve(options, || {
            session
                .principal()
                .map_err(|err| remote_fault("discover kerberos principal", None, err))
        })?;
        info!(scope = %resolved.scope(), "vault store configured");

        Ok(Self { session, resolved })
    }

    pub fn vault_type(&self) -> VaultType {
        self.resolved.vault_type()
    }

    pub fn user(&self) -> Option<&str> {
        self.resolved.user()
    }

    pub fn principal(&self) -> Option<&str> {
        self.resolved.principal()
    }

    pub fn scope(&self) -> &VaultScope {
        self.resolved.scope()
    }

    pub fn into_client(self) -> C {
        self.session.into_inner()
    }

    fn open(&self, action: &str, name: Option<&str>) -> Result<Session<'_, C>> {
        self.session
            .acquire()
            .map_err(|err| remote_fault(action, name, err))
    }
}

impl<C: VaultClient> SecretStore for IpaVault<C> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let name = encode_key(key)?;
        let mut conn = self.open("retrieve entry", Some(name.as_str()))?;
        debug!(name = %name, "vault retrieve");
        match conn.vault_retrieve(&name, self.scope()) {
            Ok(data) => Ok(Some(data)),
            Err(RemoteError::NotFound(detail)) => {
                info!(name = %name, %detail, "vault entry not found");
                Ok(None)
            }
            Err(err) => Err(remote_fault("retrieve entry", Some(name.as_str()), err)),
        }
    }

    fn set(&self, key: &str, value: SecretValue, replace: bool) -> Result<()> {
        let name = encode_key(key)?;
        let mut conn = self.open("add entry", Some(name.as_str()))?;
        debug!(name = %name, replace, "vault add");
        match conn.vault_add(&name, self.scope(), VaultKind::Standard) {
            Ok(()) => {}
            Err(RemoteError::Duplicate(_)) if replace => {
                debug!(name = %name, "vault entry exists, replacing payload");
            }
            Err(RemoteError::Duplicate(_)) => {
                return Err(Error::Exists {
                    key: key.to_string(),
                });
            }
            Err(err) => return Err(remote_fault("add entry", Some(name.as_str()), err)),
        }

        debug!(name = %name, "vault archive");
        conn.vault_archive(&name, value.as_bytes(), self.scope())
            .map_err(|err| remote_fault("archive entry", Some(name.as_str()), err))
    }

    fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let entries = {
            let mut conn = self.open("list entries", None)?;
            debug!(scope = %self.scope(), "vault find");
            conn.vault_find(self.scope(), VaultKind::Standard)
                .map_err(|err| remote_fault("list entries", None, err))?
        };

        Ok(entries
            .into_iter()
            .map(|entry| decode_key(&entry.name))
            .filter(|path| prefix.is_none_or(|prefix| path.starts_with(prefix)))
            .map(|path| leaf_segment(&path).to_string())
            .collect())
    }

    fn cut(&self, key: &str) -> Result<bool> {
        let name = encode_key(key)?;
        let mut conn = self.open("delete entry", Some(name.as_str()))?;
        debug!(name = %name, "vault del");
        match conn.vault_del(&name, self.scope()) {
            Ok(()) => Ok(true),
            Err(RemoteError::NotFound(_)) => Ok(false),
            Err(err) => Err(remote_fault("delete entry", Some(name.as_str()), err)),
        }
    }

    fn span(&self, _key: &str) -> Result<Vec<SpanEntry>> {
        Err(Error::NotImplemented("span"))
    }
}

fn remote_fault(action: &str, name: Option<&str>, err: RemoteError) -> Error {
    match name {
        Some(name) => {
            error!(name = %name, ?err, "failed to {action}");
            Error::store(format!("failed to {action} {name}: {err}"))
        }
        None => {
            error!(?err, "failed to {action}");
            Error::store(format!("failed to {action}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryVault, VaultCall, VaultCommand};

    fn service_options() -> IpaVaultOptions {
        IpaVaultOptions {
            vault_type: Some("service".into()),
            principal: Some("custodia/ipa.example".into()),
            ..Default::default()
        }
    }

    fn store() -> (IpaVault<MemoryVault>, MemoryVault) {
        let remote = MemoryVault::new("custodia/ipa.example@IPA.EXAMPLE");
        let store = IpaVault::new(remote.clone(), &service_options()).unwrap();
        remote.clear_calls();
        (store, remote)
    }

    #[test]
    fn construction_pings_once_and_releases_session() {
        let remote = MemoryVault::new("custodia/ipa.example@IPA.EXAMPLE");
        let store = IpaVault::new(remote.clone(), &IpaVaultOptions::default()).unwrap();
        assert_eq!(remote.calls_of(VaultCommand::Ping).len(), 1);
        assert_eq!(remote.calls_of(VaultCommand::ConfigShow).len(), 1);
        assert!(!remote.is_connected());
        assert_eq!(store.vault_type(), VaultType::Service);
    }

    #[test]
    fn config_show_failure_is_not_fatal() {
        let remote = MemoryVault::new("john@IPA.EXAMPLE");
        remote.inject_fault(VaultCommand::ConfigShow, RemoteError::Other("denied".into()));
        let store = IpaVault::new(remote, &IpaVaultOptions::default()).unwrap();
        assert_eq!(store.user(), Some("john"));
    }

    #[test]
    fn ping_failure_aborts_construction() {
        let remote = MemoryVault::new("john@IPA.EXAMPLE");
        remote.inject_fault(VaultCommand::Ping, RemoteError::Transport("refused".into()));
        let err = IpaVault::new(remote.clone(), &IpaVaultOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::Store(_)));
        assert!(!remote.is_connected());
    }

    #[test]
    fn invalid_key_never_reaches_remote() {
        let (store, remote) = store();
        let err = store.get("a__b").unwrap_err();
        assert_eq!(err, Error::InvalidKey { key: "a__b".into() });
        assert!(store.set("a__b", "v".into(), false).is_err());
        assert!(store.cut("a__b").is_err());
        assert!(remote.calls().is_empty());
        assert_eq!(remote.connect_count(), 1);
    }

    #[test]
    fn set_adds_then_archives() {
        let (store, remote) = store();
        store.set("directory/testkey", "testvalue".into(), false).unwrap();
        let scope = VaultScope::Service {
            principal: "custodia/ipa.example".into(),
        };
        assert_eq!(
            remote.calls(),
            vec![
                VaultCall::Add {
                    name: "directory__testkey".into(),
                    scope: scope.clone(),
                    kind: VaultKind::Standard,
                },
                VaultCall::Archive {
                    name: "directory__testkey".into(),
                    data: b"testvalue".to_vec(),
                    scope,
                },
            ]
        );
    }

    #[test]
    fn replace_archives_after_duplicate() {
        let (store, remote) = store();
        store.set("k", "v1".into(), false).unwrap();
        remote.clear_calls();
        store.set("k", "v2".into(), true).unwrap();
        let commands: Vec<_> = remote.calls().iter().map(VaultCall::command).collect();
        assert_eq!(commands, vec![VaultCommand::Add, VaultCommand::Archive]);
        assert_eq!(store.get("k").unwrap(), Some(b"v2".to_vec()));
    }

    #[test]
    fn duplicate_without_replace_skips_archive() {
        let (store, remote) = store();
        store.set("k", "v1".into(), false).unwrap();
        remote.clear_calls();
        let err = store.set("k", "v2".into(), false).unwrap_err();
        assert_eq!(err, Error::Exists { key: "k".into() });
        assert!(remote.calls_of(VaultCommand::Archive).is_empty());
        assert!(!remote.is_connected());
    }

    #[test]
    fn add_fault_is_a_store_error() {
        let (store, remote) = store();
        remote.inject_fault(VaultCommand::Add, RemoteError::Other("insufficient access".into()));
        let err = store.set("k", "v".into(), true).unwrap_err();
        assert!(matches!(err, Error::Store(msg) if msg.contains("k")));
        assert!(remote.calls_of(VaultCommand::Archive).is_empty());
    }

    #[test]
    fn archive_fault_is_a_store_error() {
        let (store, remote) = store();
        remote.inject_fault(VaultCommand::Archive, RemoteError::Transport("reset".into()));
        let err = store.set("k", "v".into(), false).unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert!(!remote.is_connected());
    }

    #[test]
    fn retrieve_fault_is_not_absent() {
        let (store, remote) = store();
        remote.inject_fault(VaultCommand::Retrieve, RemoteError::Transport("reset".into()));
        assert!(matches!(store.get("k"), Err(Error::Store(_))));
    }

    #[test]
    fn delete_fault_is_not_false() {
        let (store, remote) = store();
        remote.inject_fault(VaultCommand::Del, RemoteError::Other("denied".into()));
        assert!(matches!(store.cut("k"), Err(Error::Store(_))));
    }

    #[test]
    fn list_fault_is_a_store_error() {
        let (store, remote) = store();
        remote.inject_fault(VaultCommand::Find, RemoteError::Other("denied".into()));
        assert!(matches!(store.list(None), Err(Error::Store(_))));
        assert!(!remote.is_connected());
    }

    #[test]
    fn list_returns_leaf_names_under_prefix() {
        let (store, _remote) = store();
        store.set("directory/testkey", "v".into(), false).unwrap();
        store.set("other/key", "v".into(), false).unwrap();
        store.set("top", "v".into(), false).unwrap();
        assert_eq!(store.list(Some("directory")).unwrap(), vec!["testkey"]);
        let mut all = store.list(None).unwrap();
        all.sort();
        assert_eq!(all, vec!["key", "testkey", "top"]);
    }

    #[test]
    fn span_is_not_implemented() {
        let (store, remote) = store();
        assert_eq!(store.span("a").unwrap_err(), Error::NotImplemented("span"));
        assert!(remote.calls().is_empty());
    }
}
