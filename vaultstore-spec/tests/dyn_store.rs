use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use vaultstore_spec::{
    DynSecretStore, Error, Result, SecretStore, SecretValue, SpanEntry, decode_key, encode_key,
    leaf_segment,
};

/// Flat-namespace store used to check the trait plumbing.
#[derive(Default)]
struct FlatStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl SecretStore for FlatStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let name = encode_key(key)?;
        Ok(self.entries.lock().unwrap().get(&name).cloned())
    }

    fn set(&self, key: &str, value: SecretValue, replace: bool) -> Result<()> {
        let name = encode_key(key)?;
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(&name) && !replace {
            return Err(Error::Exists {
                key: key.to_string(),
            });
        }
        entries.insert(name, value.into_bytes());
        Ok(())
    }

    fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .keys()
            .map(|name| decode_key(name))
            .filter(|path| prefix.is_none_or(|prefix| path.starts_with(prefix)))
            .map(|path| leaf_segment(&path).to_string())
            .collect())
    }

    fn cut(&self, key: &str) -> Result<bool> {
        let name = encode_key(key)?;
        Ok(self.entries.lock().unwrap().remove(&name).is_some())
    }

    fn span(&self, _key: &str) -> Result<Vec<SpanEntry>> {
        Err(Error::NotImplemented("span"))
    }
}

#[test]
fn arc_store_delegates() {
    let store: DynSecretStore = Arc::new(FlatStore::default());
    store.set("a/b", SecretValue::from("v"), false).unwrap();
    assert_eq!(store.get("a/b").unwrap(), Some(b"v".to_vec()));
    assert_eq!(store.list(Some("a/")).unwrap(), vec!["b"]);
    assert!(store.cut("a/b").unwrap());
    assert!(!store.cut("a/b").unwrap());
}

#[test]
fn boxed_store_delegates() {
    let store: Box<dyn SecretStore> = Box::new(FlatStore::default());
    store.set("k", SecretValue::from(vec![0u8, 1, 2]), false).unwrap();
    let err = store.set("k", SecretValue::from("x"), false).unwrap_err();
    assert_eq!(err, Error::Exists { key: "k".into() });
    assert_eq!(store.span("k").unwrap_err(), Error::NotImplemented("span"));
}

#[test]
fn reserved_separator_rejected_through_trait_object() {
    let store: DynSecretStore = Arc::new(FlatStore::default());
    let err = store.get("a__b").unwrap_err();
    assert!(err.is_validation());
}
