//! Keystore-backed TLS configuration
//!
//! Decodes the client identity, selects the crypto provider and random
//! source, and builds the rustls client configuration used by secure dials.

pub mod context;
pub mod entropy;
pub mod errors;
pub mod key_manager;
pub mod keystore;
pub mod protocol;
pub mod provider;
pub mod sealed;
pub mod trust;

pub use context::{TlsContext, TlsContextCache};
pub use entropy::{EntropySeeder, RandomSource};
pub use errors::TlsError;
pub use key_manager::{KeyManager, KeyManagerAlgorithm};
pub use keystore::{KeyEntry, Keystore, KeystoreFormat};
pub use protocol::TlsProtocol;
