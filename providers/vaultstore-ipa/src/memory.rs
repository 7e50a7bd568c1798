//! In-memory simulation of the FreeIPA vault commands.
//!
//! Entries are partitioned by vault scope the way the KRA partitions user,
//! service and shared vaults. Cloned handles share state, so a test can keep
//! one clone for assertions while the store owns another.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::scope::VaultScope;
use crate::session::{
    RemoteError, RemoteResult, VaultClient, VaultConfigInfo, VaultEntry, VaultKind,
};

const DEFAULT_KRA_SERVER: &str = "ipa.example";
const PING_SUMMARY: &str = "IPA server version 4.4.3. API version 2.215";

/// Vault command names, used for fault injection and call assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultCommand {
    Ping,
    ConfigShow,
    Retrieve,
    Add,
    Archive,
    Find,
    Del,
}

/// One recorded command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultCall {
    Ping,
    ConfigShow,
    Retrieve {
        name: String,
        scope: VaultScope,
    },
    Add {
        name: String,
        scope: VaultScope,
        kind: VaultKind,
    },
    Archive {
        name: String,
        data: Vec<u8>,
        scope: VaultScope,
    },
    Find {
        scope: VaultScope,
        kind: VaultKind,
    },
    Del {
        name: String,
        scope: VaultScope,
    },
}

impl VaultCall {
    pub fn command(&self) -> VaultCommand {
        match self {
            Self::Ping => VaultCommand::Ping,
            Self::ConfigShow => VaultCommand::ConfigShow,
            Self::Retrieve { .. } => VaultCommand::Retrieve,
            Self::Add { .. } => VaultCommand::Add,
            Self::Archive { .. } => VaultCommand::Archive,
            Self::Find { .. } => VaultCommand::Find,
            Self::Del { .. } => VaultCommand::Del,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredVault {
    kind: VaultKind,
    data: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct State {
    principal: String,
    kra_servers: Vec<String>,
    connected: bool,
    connects: usize,
    disconnects: usize,
    vaults: HashMap<VaultScope, BTreeMap<String, StoredVault>>,
    calls: Vec<VaultCall>,
    faults: HashMap<VaultCommand, RemoteError>,
    connect_fault: Option<RemoteError>,
}

/// In-memory [`VaultClient`] with call recording and fault injection.
#[derive(Debug, Clone)]
pub struct MemoryVault {
    state: Arc<Mutex<State>>,
}

impl MemoryVault {
    /// Simulated service authenticated as `principal`.
    pub fn new(principal: impl Into<String>) -> Self {
        let state = State {
            principal: principal.into(),
            kra_servers: vec![DEFAULT_KRA_SERVER.to_string()],
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with_kra_servers<I, S>(self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().kra_servers = servers.into_iter().map(Into::into).collect();
        self
    }

    /// Make every later invocation of `command` fail with `error`.
    pub fn inject_fault(&self, command: VaultCommand, error: RemoteError) {
        self.state.lock().faults.insert(command, error);
    }

    pub fn fail_connect(&self, error: RemoteError) {
        self.state.lock().connect_fault = Some(error);
    }

    pub fn clear_faults(&self) {
        let mut state = self.state.lock();
        state.faults.clear();
        state.connect_fault = None;
    }

    pub fn calls(&self) -> Vec<VaultCall> {
        self.state.lock().calls.clone()
    }

    /// Recorded calls of one command.
    pub fn calls_of(&self, command: VaultCommand) -> Vec<VaultCall> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.command() == command)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().connects
    }

    pub fn disconnect_count(&self) -> usize {
        self.state.lock().disconnects
    }

    /// Raw payload stored under an encoded name, bypassing the command log.
    pub fn stored(&self, scope: &VaultScope, name: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .vaults
            .get(scope)
            .and_then(|vaults| vaults.get(name))
            .and_then(|vault| vault.data.clone())
    }

    /// Encoded names present in `scope`, in listing order.
    pub fn names(&self, scope: &VaultScope) -> Vec<String> {
        self.state
            .lock()
            .vaults
            .get(scope)
            .map(|vaults| vaults.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl State {
    fn begin(&mut self, call: VaultCall) -> RemoteResult<()> {
        let command = call.command();
        debug!(?command, "memory vault command");
        self.calls.push(call);
        if !self.connected {
            return Err(RemoteError::Transport("not connected".into()));
        }
        match self.faults.get(&command) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl VaultClient for MemoryVault {
    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    fn connect(&mut self) -> RemoteResult<()> {
        let mut state = self.state.lock();
        if let Some(err) = state.connect_fault.clone() {
            return Err(err);
        }
        state.connected = true;
        state.connects += 1;
        Ok(())
    }

    fn disconnect(&mut self) -> RemoteResult<()> {
        let mut state = self.state.lock();
        state.connected = false;
        state.disconnects += 1;
        Ok(())
    }

    fn principal(&self) -> RemoteResult<String> {
        Ok(self.state.lock().principal.clone())
    }

    fn ping(&mut self) -> RemoteResult<String> {
        self.state.lock().begin(VaultCall::Ping)?;
        Ok(PING_SUMMARY.to_string())
    }

    fn vaultconfig_show(&mut self) -> RemoteResult<VaultConfigInfo> {
        let mut state = self.state.lock();
        state.begin(VaultCall::ConfigShow)?;
        Ok(VaultConfigInfo {
            kra_servers: state.kra_servers.clone(),
        })
    }

    fn vault_retrieve(&mut self, name: &str, scope: &VaultScope) -> RemoteResult<Vec<u8>> {
        let mut state = self.state.lock();
        state.begin(VaultCall::Retrieve {
            name: name.to_string(),
            scope: scope.clone(),
        })?;
        let vault = state
            .vaults
            .get(scope)
            .and_then(|vaults| vaults.get(name))
            .ok_or_else(|| RemoteError::NotFound(format!("{name}: vault not found")))?;
        vault
            .data
            .clone()
            .ok_or_else(|| RemoteError::Other(format!("{name}: vault has no archived data")))
    }

    fn vault_add(&mut self, name: &str, scope: &VaultScope, kind: VaultKind) -> RemoteResult<()> {
        let mut state = self.state.lock();
        state.begin(VaultCall::Add {
            name: name.to_string(),
            scope: scope.clone(),
            kind,
        })?;
        let vaults = state.vaults.entry(scope.clone()).or_default();
        if vaults.contains_key(name) {
            return Err(RemoteError::Duplicate(format!(
                "vault with name \"{name}\" already exists"
            )));
        }
        vaults.insert(name.to_string(), StoredVault { kind, data: None });
        Ok(())
    }

    fn vault_archive(&mut self, name: &str, data: &[u8], scope: &VaultScope) -> RemoteResult<()> {
        let mut state = self.state.lock();
        state.begin(VaultCall::Archive {
            name: name.to_string(),
            data: data.to_vec(),
            scope: scope.clone(),
        })?;
        let vault = state
            .vaults
            .get_mut(scope)
            .and_then(|vaults| vaults.get_mut(name))
            .ok_or_else(|| RemoteError::NotFound(format!("{name}: vault not found")))?;
        vault.data = Some(data.to_vec());
        Ok(())
    }

    fn vault_find(&mut self, scope: &VaultScope, kind: VaultKind) -> RemoteResult<Vec<VaultEntry>> {
        let mut state = self.state.lock();
        state.begin(VaultCall::Find {
            scope: scope.clone(),
            kind,
        })?;
        Ok(state
            .vaults
            .get(scope)
            .map(|vaults| {
                vaults
                    .iter()
                    .filter(|(_, vault)| vault.kind == kind)
                    .map(|(name, _)| VaultEntry::new(name.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn vault_del(&mut self, name: &str, scope: &VaultScope) -> RemoteResult<()> {
        let mut state = self.state.lock();
        state.begin(VaultCall::Del {
            name: name.to_string(),
            scope: scope.clone(),
        })?;
        state
            .vaults
            .get_mut(scope)
            .and_then(|vaults| vaults.remove(name))
            .map(|_| ())
            .ok_or_else(|| RemoteError::NotFound(format!("{name}: vault not found")))
    }
}
