use serde_json::json;
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const PREFIX_ENV: &str = "VAULTSTORE_TEST_PREFIX";
const KEEP_ENV: &str = "VAULTSTORE_TEST_KEEP";

/// Parsed test environment configuration.
#[derive(Debug, Clone)]
pub struct TestEnv {
    pub prefix: TestPrefix,
    pub cleanup: bool,
}

impl TestEnv {
    pub fn from_env(store: &str) -> Self {
        Self {
            prefix: TestPrefix::from_env(store),
            cleanup: !parse_bool_env(KEEP_ENV),
        }
    }
}

/// Generator of unique, collision-free key paths for one test run.
#[derive(Debug, Clone)]
pub struct TestPrefix {
    store: String,
    base: String,
    counter: Arc<AtomicU64>,
}

impl TestPrefix {
    pub fn from_env(store: &str) -> Self {
        if let Ok(explicit) = env::var(PREFIX_ENV)
            && !explicit.trim().is_empty()
        {
            return Self::new(store, explicit);
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let pid = std::process::id();
        Self::new(store, format!("conformance/{store}/{now}-{pid}"))
    }

    pub fn new(store: &str, base: impl Into<String>) -> Self {
        Self {
            store: store.to_string(),
            base: base.into(),
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Common path prefix of every key handed out.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Derive a unique key path for a test case.
    pub fn key(&self, suffix: &str) -> String {
        let next = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}/{suffix}-{next}", self.base)
    }

    /// Minimal JSON metadata used in failure output.
    pub fn to_metadata(&self) -> serde_json::Value {
        json!({
            "store": self.store,
            "prefix": self.base,
        })
    }
}

/// Parse a truthy env var in a tolerant way.
pub fn parse_bool_env(var: &str) -> bool {
    env::var(var)
        .ok()
        .map(|v| ["1", "true", "yes"].iter().any(|pat| v.eq_ignore_ascii_case(pat)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_and_nested() {
        let prefix = TestPrefix::new("ipa", "local/test");
        let k1 = prefix.key("a");
        let k2 = prefix.key("a");
        assert_ne!(k1, k2);
        assert!(k1.starts_with("local/test/"));
        assert!(!k1.contains("__"));
    }

    #[test]
    fn metadata_names_store_and_prefix() {
        let prefix = TestPrefix::new("ipa", "local/test");
        assert_eq!(prefix.to_metadata()["store"], "ipa");
        assert_eq!(prefix.to_metadata()["prefix"], "local/test");
    }
}
