use crate::{
    Capabilities, TestEnv, assert_absent, assert_err, assert_get_eq, binary_payload, payload,
    text_payload,
};
use anyhow::{Context, Result};
use vaultstore_spec::{Error, SecretStore, SecretValue, leaf_segment};

/// Runs the shared conformance suite against a store.
pub struct ConformanceSuite<'a, S: SecretStore + ?Sized> {
    store_name: String,
    store: &'a S,
    caps: Capabilities,
    env: TestEnv,
}

impl<'a, S: SecretStore + ?Sized> ConformanceSuite<'a, S> {
    pub fn new(store_name: impl Into<String>, store: &'a S, caps: Capabilities) -> Self {
        let store_name = store_name.into();
        Self {
            env: TestEnv::from_env(&store_name),
            store_name,
            store,
            caps,
        }
    }

    /// Override the environment-derived settings, e.g. a fixed prefix.
    pub fn with_env(mut self, env: TestEnv) -> Self {
        self.env = env;
        self
    }

    pub fn run(&self) -> Result<()> {
        self.create_and_read()
            .with_context(|| format!("create/read for {}", self.env.prefix.to_metadata()))?;
        self.missing_entries()?;
        self.reserved_keys()?;
        if self.caps.list {
            self.listing()?;
        }
        self.span()?;
        Ok(())
    }

    fn create_and_read(&self) -> Result<()> {
        let name = &self.store_name;
        let key = self.env.prefix.key("secret");
        let initial = text_payload(24);
        let updated = payload(1024);

        self.store
            .set(&key, SecretValue::from(initial.as_str()), false)
            .with_context(|| format!("set failed for {name}:{key}"))?;
        assert_get_eq(self.store, name, &key, initial.as_bytes())?;

        assert_err(
            self.store.set(&key, SecretValue::from(updated.clone()), false),
            "set without replace on existing key",
            |err| matches!(err, Error::Exists { key: existing } if *existing == key),
        )?;
        assert_get_eq(self.store, name, &key, initial.as_bytes())?;

        self.store
            .set(&key, SecretValue::from(updated.clone()), true)
            .with_context(|| format!("replace failed for {name}:{key}"))?;
        assert_get_eq(self.store, name, &key, &updated)?;

        let binary_key = self.env.prefix.key("binary");
        let binary = binary_payload();
        self.store
            .set(&binary_key, SecretValue::from(binary.clone()), true)
            .with_context(|| format!("replacing set on new key failed for {name}:{binary_key}"))?;
        assert_get_eq(self.store, name, &binary_key, &binary)?;

        if self.env.cleanup {
            for key in [&key, &binary_key] {
                if !self.store.cut(key)? {
                    anyhow::bail!("cut reported nothing removed for {name}:{key}");
                }
                assert_absent(self.store, name, key)?;
            }
        }
        Ok(())
    }

    fn missing_entries(&self) -> Result<()> {
        let name = &self.store_name;
        let key = self.env.prefix.key("missing");
        assert_absent(self.store, name, &key)?;
        if self.store.cut(&key)? {
            anyhow::bail!("cut of missing key reported removal for {name}:{key}");
        }
        Ok(())
    }

    fn reserved_keys(&self) -> Result<()> {
        let key = format!("{}/bad__key", self.env.prefix.base());
        assert_err(self.store.get(&key), "get with reserved separator", |err| {
            matches!(err, Error::InvalidKey { .. })
        })?;
        assert_err(
            self.store.set(&key, SecretValue::from("v"), true),
            "set with reserved separator",
            |err| matches!(err, Error::InvalidKey { .. }),
        )?;
        assert_err(self.store.cut(&key), "cut with reserved separator", |err| {
            matches!(err, Error::InvalidKey { .. })
        })
    }

    fn listing(&self) -> Result<()> {
        let name = &self.store_name;
        let inside = self.env.prefix.key("listed");
        let outside = format!("elsewhere/{}", leaf_segment(&self.env.prefix.key("unlisted")));
        self.store.set(&inside, SecretValue::from("in"), true)?;
        self.store.set(&outside, SecretValue::from("out"), true)?;

        let prefix = format!("{}/", self.env.prefix.base());
        let listed = self
            .store
            .list(Some(prefix.as_str()))
            .with_context(|| format!("list failed for {name}:{prefix}"))?;
        if !listed.iter().any(|item| item == leaf_segment(&inside)) {
            anyhow::bail!("list did not return {inside} for {name}: {listed:?}");
        }
        if listed.iter().any(|item| item == leaf_segment(&outside)) {
            anyhow::bail!("list under {prefix} leaked {outside} for {name}");
        }

        if self.env.cleanup {
            self.store.cut(&inside)?;
            self.store.cut(&outside)?;
        }
        Ok(())
    }

    fn span(&self) -> Result<()> {
        let key = self.env.prefix.base();
        let result = self.store.span(key);
        if self.caps.span {
            result.with_context(|| format!("span failed for {}", self.store_name))?;
            return Ok(());
        }
        assert_err(result, "span on store without range support", |err| {
            matches!(err, Error::NotImplemented(_))
        })
    }
}
