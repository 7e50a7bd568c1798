use std::fmt;
use std::str::FromStr;
use vaultstore_spec::{Error, Result};

/// Kerberos principal split into its structural parts.
///
/// `service/host@REALM` yields a service principal; `user@REALM` a user
/// principal with no service component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrincipalName {
    service: Option<String>,
    owner: String,
    realm: String,
}

impl PrincipalName {
    pub fn parse(principal: &str) -> Result<Self> {
        let malformed = || Error::malformed_principal(principal);

        let mut parts = principal.split('@');
        let (Some(prefix), Some(realm), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        if prefix.is_empty() || realm.is_empty() {
            return Err(malformed());
        }

        let (service, owner) = match prefix.rsplit_once('/') {
            Some((service, host)) => {
                if service.is_empty() || host.is_empty() {
                    return Err(malformed());
                }
                (Some(service.to_string()), host.to_string())
            }
            None => (None, prefix.to_string()),
        };

        Ok(Self {
            service,
            owner,
            realm: realm.to_string(),
        })
    }

    /// Service component, e.g. `HTTP` or `custodia`.
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Host name for service principals, user name otherwise.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn is_service(&self) -> bool {
        self.service.is_some()
    }

    /// `service/host` without the realm, as used for service vaults.
    pub fn service_principal(&self) -> Option<String> {
        self.service
            .as_deref()
            .map(|service| format!("{service}/{}", self.owner))
    }
}

impl FromStr for PrincipalName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PrincipalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(service) = &self.service {
            write!(f, "{service}/")?;
        }
        write!(f, "{}@{}", self.owner, self.realm)
    }
}
