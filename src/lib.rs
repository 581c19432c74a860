//! sealbox — parameterized secret encryption and opaque token issuance.
//!
//! Two cooperating subsystems over external storage seams:
//!
//! - **Secrets**: a pure cipher pipeline ([`crypto`]) with explicit
//!   algorithm/IV/salt/iteration/digest/encoding/format parameters,
//!   key-reference indirection ([`resolver`]), and the
//!   create/get/update/delete/rotate orchestration ([`store`]).
//! - **Tokens**: unguessable one-time plaintext tokens whose salted
//!   HMAC fingerprint is all that ever persists, with expiry
//!   enforcement and a sweep predicate ([`tokens`]).
//!
//! Persistence, transport, and scheduling stay outside the crate;
//! the `SecretBackend`, `TokenBackend`, and `KeySource` traits are the
//! seams an embedding application implements.

pub mod config;
pub mod crypto;
pub mod errors;
pub mod resolver;
pub mod store;
pub mod tokens;

pub use config::Settings;
pub use errors::{Result, SealboxError};
