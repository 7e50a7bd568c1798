use anyhow::Result;
use std::sync::Arc;
use vaultstore_provider_ipa::{IpaVault, IpaVaultOptions, MemoryVault, VaultClient, VaultScope};
use vaultstore_provider_tests::{Capabilities, ConformanceSuite, TestEnv, TestPrefix};
use vaultstore_spec::{DynSecretStore, SecretStore};

fn options(toml: &str) -> IpaVaultOptions {
    IpaVaultOptions::from_toml_str(toml).expect("options")
}

fn run_suite(name: &str, store: &dyn SecretStore) -> Result<()> {
    let env = TestEnv {
        prefix: TestPrefix::new(name, format!("conformance/{name}")),
        cleanup: true,
    };
    ConformanceSuite::new(name, store, Capabilities::default().with_list())
        .with_env(env)
        .run()
}

#[test]
fn conformance_service_vault() -> Result<()> {
    let remote = MemoryVault::new("custodia/ipa.example@IPA.EXAMPLE");
    let store = IpaVault::new(
        remote.clone(),
        &options("vault_type = \"service\"\nprincipal = \"custodia/ipa.example\""),
    )?;
    run_suite("ipa-service", &store)?;
    assert!(!remote.is_connected());
    Ok(())
}

#[test]
fn conformance_user_vault() -> Result<()> {
    let remote = MemoryVault::new("john@IPA.EXAMPLE");
    let store = IpaVault::new(remote, &options("vault_type = \"user\"\nuser = \"john\""))?;
    run_suite("ipa-user", &store)
}

#[test]
fn conformance_shared_vault_through_dyn_store() -> Result<()> {
    let remote = MemoryVault::new("john@IPA.EXAMPLE");
    let store: DynSecretStore =
        Arc::new(IpaVault::new(remote.clone(), &options("vault_type = \"shared\""))?);
    run_suite("ipa-shared", store.as_ref())?;
    assert!(remote.names(&VaultScope::Shared).is_empty());
    Ok(())
}

#[test]
fn conformance_autodiscovered_vault() -> Result<()> {
    let remote = MemoryVault::new("HTTP/web.ipa.example@IPA.EXAMPLE");
    let store = IpaVault::new(remote, &IpaVaultOptions::default())?;
    assert_eq!(
        store.scope(),
        &VaultScope::Service {
            principal: "HTTP/web.ipa.example".into()
        }
    );
    run_suite("ipa-autodiscover", &store)
}
