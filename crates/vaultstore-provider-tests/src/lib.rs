//! Shared conformance test harness for vaultstore backends.
//! Intended for use in integration tests with provider crates.

mod assertions;
mod capabilities;
mod contract;
mod env;
mod fixtures;

pub use assertions::*;
pub use capabilities::*;
pub use contract::*;
pub use env::*;
pub use fixtures::*;
