//! Vault ownership scope and its one-shot resolution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::info;
use vaultstore_spec::{Error, Result};

use crate::config::IpaVaultOptions;
use crate::principal::PrincipalName;

/// Configured vault ownership type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultType {
    User,
    Service,
    Shared,
}

impl VaultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Service => "service",
            Self::Shared => "shared",
        }
    }
}

impl FromStr for VaultType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Self::User),
            "service" => Ok(Self::Service),
            "shared" => Ok(Self::Shared),
            other => Err(Error::vault_config(format!("invalid vault type `{other}`"))),
        }
    }
}

impl fmt::Display for VaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership partition every remote call is issued against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VaultScope {
    Shared,
    User { username: String },
    Service { principal: String },
}

impl VaultScope {
    pub fn vault_type(&self) -> VaultType {
        match self {
            Self::Shared => VaultType::Shared,
            Self::User { .. } => VaultType::User,
            Self::Service { .. } => VaultType::Service,
        }
    }

    /// Parameter set attached to vault commands.
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        match self {
            Self::Shared => {
                params.insert("shared".into(), Value::Bool(true));
            }
            Self::User { username } => {
                params.insert("username".into(), Value::String(username.clone()));
            }
            Self::Service { principal } => {
                params.insert("service".into(), Value::String(principal.clone()));
            }
        }
        params
    }
}

impl fmt::Display for VaultScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => f.write_str("shared"),
            Self::User { username } => write!(f, "user:{username}"),
            Self::Service { principal } => write!(f, "service:{principal}"),
        }
    }
}

/// Outcome of scope resolution, fixed for the lifetime of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    vault_type: VaultType,
    user: Option<String>,
    principal: Option<String>,
    scope: VaultScope,
}

impl ResolvedScope {
    pub fn vault_type(&self) -> VaultType {
        self.vault_type
    }

    /// Effective user name; set only for user vaults.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Effective service principal; set only for service vaults.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    pub fn scope(&self) -> &VaultScope {
        &self.scope
    }

    /// Resolve the vault scope from configuration.
    ///
    /// `discover` yields the authenticated principal and is invoked at most
    /// once, only when the configuration leaves something to infer.
    pub fn resolve<F>(options: &IpaVaultOptions, discover: F) -> Result<Self>
    where
        F: FnOnce() -> Result<String>,
    {
        let mut discovery = Discovery::new(discover);

        let vault_type = match options.vault_type.as_deref() {
            Some(raw) => raw.parse::<VaultType>()?,
            None => {
                let inferred = if discovery.principal()?.is_service() {
                    VaultType::Service
                } else {
                    VaultType::User
                };
                info!(vault_type = %inferred, "setting vault type from kerberos principal");
                inferred
            }
        };

        match vault_type {
            VaultType::Shared => Ok(Self {
                vault_type,
                user: options.user.clone(),
                principal: options.principal.clone(),
                scope: VaultScope::Shared,
            }),
            VaultType::User => {
                let username = match options.user.clone() {
                    Some(user) => user,
                    None => {
                        let principal = discovery.principal()?;
                        if principal.is_service() {
                            return Err(Error::vault_config(
                                "user vault requires user parameter",
                            ));
                        }
                        let user = principal.owner().to_string();
                        info!(user = %user, "setting username from kerberos principal");
                        user
                    }
                };
                Ok(Self {
                    vault_type,
                    user: Some(username.clone()),
                    principal: options.principal.clone(),
                    scope: VaultScope::User { username },
                })
            }
            VaultType::Service => {
                let service = match options.principal.clone() {
                    Some(principal) => principal,
                    None => {
                        let derived = discovery.principal()?.service_principal().ok_or_else(
                            || Error::vault_config("service vault requires principal parameter"),
                        )?;
                        info!(principal = %derived, "setting principal from kerberos principal");
                        derived
                    }
                };
                Ok(Self {
                    vault_type,
                    user: options.user.clone(),
                    principal: Some(service.clone()),
                    scope: VaultScope::Service { principal: service },
                })
            }
        }
    }
}

/// Lazily discovered and parsed principal.
struct Discovery<F> {
    discover: Option<F>,
    parsed: Option<PrincipalName>,
}

impl<F> Discovery<F>
where
    F: FnOnce() -> Result<String>,
{
    fn new(discover: F) -> Self {
        Self {
            discover: Some(discover),
            parsed: None,
        }
    }

    fn principal(&mut self) -> Result<&PrincipalName> {
        if self.parsed.is_none() {
            let discover = self
                .discover
                .take()
                .ok_or_else(|| Error::vault_config("principal discovery already failed"))?;
            let raw = discover()?;
            self.parsed = Some(PrincipalName::parse(&raw)?);
        }
        self.parsed
            .as_ref()
            .ok_or_else(|| Error::vault_config("principal unavailable"))
    }
}
