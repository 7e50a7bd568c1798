use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const ENV_VAULT_TYPE: &str = "IPA_VAULT_TYPE";
const ENV_VAULT_USER: &str = "IPA_VAULT_USER";
const ENV_VAULT_PRINCIPAL: &str = "IPA_VAULT_PRINCIPAL";
const ENV_KRB5_CONFIG: &str = "IPA_KRB5_CONFIG";
const ENV_KEYTAB: &str = "IPA_KEYTAB";
const ENV_CCACHE: &str = "IPA_CCACHE";

/// Options accepted by the FreeIPA vault store.
///
/// Every field is optional; unset vault settings are auto-discovered from
/// the Kerberos principal the transport authenticated as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IpaVaultOptions {
    /// One of `user`, `service`, `shared`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_type: Option<String>,
    /// User name for user vaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Service principal (`service/host`) for service vaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
    /// Path to an alternative `krb5.conf`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub krb5config: Option<String>,
    /// Client keytab used to acquire credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keytab: Option<String>,
    /// Credential cache name, e.g. `FILE:/path/to/ccache`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ccache: Option<String>,
}

impl IpaVaultOptions {
    pub fn from_toml_str(data: &str) -> Result<Self> {
        toml::from_str(data).context("invalid toml vault options")
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("invalid json vault options")
    }

    /// Load options from a file; `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read vault options {}", path.display()))?;
        if path.extension().map(|ext| ext == "json").unwrap_or(false) {
            serde_json::from_str(&data)
                .with_context(|| format!("invalid json vault options {}", path.display()))
        } else {
            toml::from_str(&data)
                .with_context(|| format!("invalid toml vault options {}", path.display()))
        }
    }

    /// Options taken from `IPA_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            vault_type: get(ENV_VAULT_TYPE),
            user: get(ENV_VAULT_USER),
            principal: get(ENV_VAULT_PRINCIPAL),
            krb5config: get(ENV_KRB5_CONFIG),
            keytab: get(ENV_KEYTAB),
            ccache: get(ENV_CCACHE),
        }
    }

    /// Layer `overlay` on top of `self`; fields set in `overlay` win.
    pub fn merge(self, overlay: Self) -> Self {
        Self {
            vault_type: overlay.vault_type.or(self.vault_type),
            user: overlay.user.or(self.user),
            principal: overlay.principal.or(self.principal),
            krb5config: overlay.krb5config.or(self.krb5config),
            keytab: overlay.keytab.or(self.keytab),
            ccache: overlay.ccache.or(self.ccache),
        }
    }

    /// Environment the transport bootstrap exports before authenticating.
    ///
    /// NSS must be allowed to survive a fork of the hosting process, so
    /// `NSS_STRICT_NOFORK` is always present.
    pub fn kerberos_environment(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![("NSS_STRICT_NOFORK", "DISABLED".to_string())];
        if let Some(path) = &self.krb5config {
            vars.push(("KRB5_CONFIG", path.clone()));
        }
        if let Some(keytab) = &self.keytab {
            vars.push(("KRB5_CLIENT_KTNAME", keytab.clone()));
        }
        if let Some(ccache) = &self.ccache {
            vars.push(("KRB5CCNAME", ccache.clone()));
        }
        vars
    }
}
