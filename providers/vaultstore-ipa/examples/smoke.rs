//! Exercise the store end to end against the in-memory vault service.
//!
//! `RUST_LOG=debug cargo run -p vaultstore-provider-ipa --example smoke`

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vaultstore_provider_ipa::{IpaVault, IpaVaultOptions, MemoryVault};
use vaultstore_spec::SecretStore;

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .ok();

    let remote = MemoryVault::new("custodia/ipa.example@IPA.EXAMPLE")
        .with_kra_servers(["kra1.ipa.example", "kra2.ipa.example"]);
    let options = IpaVaultOptions::from_env();
    let store = IpaVault::new(remote, &options)?;

    store.set("foo", "bar".into(), true)?;
    let value = store.get("foo")?.unwrap_or_default();
    println!("{}", String::from_utf8_lossy(&value));
    println!("{:?}", store.list(None)?);
    store.cut("foo")?;
    println!("{:?}", store.list(None)?);
    Ok(())
}
