//! Backend-agnostic secret store contract.
//!
//! Front ends program against [`SecretStore`]; provider crates implement it
//! for a concrete backing service. The key codec in [`key`] is shared by
//! providers whose remote name space is flat.

pub mod error;
pub mod key;
pub mod store;
pub mod value;

pub use error::{Error, Result, StoreError, StoreResult};
pub use key::{KEY_SEPARATOR, decode_key, encode_key, leaf_segment};
pub use store::{SecretStore, SpanEntry};
pub use value::SecretValue;

use std::sync::Arc;

pub type DynSecretStore = Arc<dyn SecretStore>;

pub mod prelude {
    pub use crate::{
        DynSecretStore, SecretStore, SecretValue, StoreError, StoreResult, decode_key, encode_key,
    };
}
